mod common;

use common::{TestResult, init_logging, populated_context};
use molder::{ContextBuilder, Grammar, VarType, VarValue, VariableContext, scan_references};
use serde_json::json;

#[test]
fn unknown_reference_is_echoed_until_declared() -> TestResult {
    init_logging();
    let mut ctx = VariableContext::new();
    assert_eq!(ctx.substitute_xml("value={unset}")?, "value=unset");
    ctx.set_variable("unset", VarType::String, VarValue::from("X"));
    assert_eq!(ctx.substitute_xml("value={unset}")?, "value=X");
    Ok(())
}

#[test]
fn parenthesised_tokens_pass_through() -> TestResult {
    let mut ctx = populated_context();
    assert_eq!(ctx.substitute_xml("{(1+1)}")?, "(1+1)");
    ctx.set_variable("(1+1)", VarType::String, VarValue::from("2"));
    assert_eq!(ctx.substitute_xml("{(1+1)}")?, "(1+1)");
    assert_eq!(ctx.substitute_xml("{}")?, "");
    Ok(())
}

#[test]
fn xml_body_with_every_value_shape() -> TestResult {
    let ctx = populated_context();
    let body = r#"<request user="{login}" tries="{attempts}">
  <city>{customer.$.address.city}</city>
  <first>{invoice.lines/line[1]}</first>
  <balance>{accounts[0][balance]}</balance>
  <tags>{tags}</tags>
  <token>{token}</token>
</request>"#;
    let expected = r#"<request user="ada" tries="3">
  <city>London</city>
  <first><line sku="A1">2</line></first>
  <balance>10.5</balance>
  <tags>new, vip</tags>
  <token>token</token>
</request>"#;
    assert_eq!(ctx.substitute_xml(body)?, expected);
    Ok(())
}

#[test]
fn json_body_uses_at_tokens() -> TestResult {
    let ctx = populated_context();
    let body = r#"{"login": "@login", "attempts": @attempts, "session": "@session"}"#;
    assert_eq!(
        ctx.substitute_json(body)?,
        r#"{"login": "ada", "attempts": 3, "session": "session"}"#
    );
    // Braces are literal text under the JSON grammar.
    assert_eq!(ctx.substitute_json("{login}")?, "{login}");
    Ok(())
}

#[test]
fn callbacks_shape_found_and_missing_values() -> TestResult {
    let ctx = populated_context();
    let quoted = ctx
        .substitutor(Grammar::Json)
        .on_found(|value| match value {
            Some(value) => serde_json::to_string(&value.to_string()).unwrap_or_default(),
            None => "null".to_string(),
        })
        .on_not_found(|_| "null".to_string())
        .render(r#"{"user": @login, "session": @session}"#)?;
    assert_eq!(quoted, r#"{"user": "ada", "session": null}"#);
    Ok(())
}

#[test]
fn declared_variable_with_unmatched_query_stays_on_found_path() -> TestResult {
    let ctx = populated_context();
    assert_eq!(ctx.substitute_xml("<phone>{customer.$.phone}</phone>")?, "<phone></phone>");

    let rendered = ctx
        .substitutor(Grammar::Xml)
        .on_found(|value| match value {
            Some(value) => value.to_string(),
            None => "<empty/>".to_string(),
        })
        .on_not_found(|reference| format!("<missing ref=\"{}\"/>", reference))
        .render("{customer.$.phone}{invoiceDoc./invoice/@missing}{nobody}")?;
    assert_eq!(rendered, r#"<empty/><empty/><missing ref="nobody"/>"#);
    Ok(())
}

#[test]
fn indexing_errors_abort_the_render() {
    let ctx = populated_context();
    let err = ctx.substitute_xml("ok {login} then {tags[7]}").unwrap_err();
    assert!(err.is_indexing_error());
}

#[test]
fn single_pass_leaves_substituted_tokens_alone() -> TestResult {
    init_logging();
    let ctx = ContextBuilder::new()
        .with_seed([("a", json!("{b}")), ("b", json!("never"))])
        .build();
    assert_eq!(ctx.substitute_xml("{a}|{b}")?, "{b}|never");
    Ok(())
}

#[test]
fn unresolved_reports_undeclared_references() {
    let ctx = populated_context();
    let template = "{login}{token}{customer.$.x}{(skip)}{token}{other[1]}";
    assert_eq!(ctx.unresolved(template, Grammar::Xml), vec!["token", "other[1]"]);
    assert_eq!(
        ctx.unresolved("@login @nonce", Grammar::Json),
        vec!["nonce"]
    );
}

#[test]
fn scan_reports_spans() {
    let text = "a {x} b @y";
    let xml = scan_references(text, Grammar::Xml);
    assert_eq!(xml.len(), 1);
    assert_eq!(&text[xml[0].span.clone()], "{x}");
    // `@y` has a lead character but no word characters after it.
    assert!(scan_references(text, Grammar::Json).is_empty());
    let json = scan_references("a @yz", Grammar::Json);
    assert_eq!(&"a @yz"[json[0].span.clone()], "@yz");
}
