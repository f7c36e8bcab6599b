use log::info;
use molder::{ContextBuilder, Grammar, MolderError};
use serde_json::Value;
use std::env;
use std::fs;

/// Seeds a context from a JSON object of variables and renders a template with it.
fn main() -> Result<(), MolderError> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!("Renders a template with variables from a JSON file.");
        eprintln!();
        eprintln!(
            "Usage: {} <path/to/variables.json> <path/to/template> [xml|json]",
            args[0]
        );
        eprintln!();
        eprintln!("  xml   replaces {{reference}} tokens (default)");
        eprintln!("  json  replaces @identifier tokens");
        std::process::exit(1);
    }

    let grammar = match args.get(3).map(String::as_str) {
        None | Some("xml") => Grammar::Xml,
        Some("json") => Grammar::Json,
        Some(other) => return Err(MolderError::UnknownGrammar(other.to_string())),
    };

    info!("Loading variables from {}", args[1]);
    let variables = match serde_json::from_str::<Value>(&fs::read_to_string(&args[1])?)? {
        Value::Object(map) => map,
        other => return Err(MolderError::NotAnObject(json_kind(&other))),
    };

    info!("Loading template from {}", args[2]);
    let template = fs::read_to_string(&args[2])?;

    let context = ContextBuilder::new().with_seed(variables).build();
    for reference in context.unresolved(&template, grammar) {
        log::warn!("Reference '{}' has no variable; it is left as written", reference);
    }
    let rendered = context.substitutor(grammar).render(&template)?;
    print!("{}", rendered);
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
