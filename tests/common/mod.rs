pub mod fixtures;

use molder::VariableContext;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A context holding one variable of every stored shape.
pub fn populated_context() -> VariableContext {
    init_logging();
    let mut ctx = VariableContext::new();
    fixtures::register_all(&mut ctx);
    ctx
}
