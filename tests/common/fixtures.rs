use molder::{TabularResult, VarType, VarValue, VariableContext, XmlValue};
use serde_json::json;

pub const CUSTOMER_JSON: &str = r#"{
    "id": 1001,
    "name": "Ada Lovelace",
    "address": { "city": "London", "zip": "NW1" },
    "orders": [ { "sku": "A1", "qty": 2 }, { "sku": "B7", "qty": 1 } ]
}"#;

pub const INVOICE_XML: &str = r#"<invoice number="INV-7">
    <customer>Ada Lovelace</customer>
    <lines>
        <line sku="A1">2</line>
        <line sku="B7">1</line>
    </lines>
</invoice>"#;

pub fn accounts_table() -> TabularResult {
    TabularResult::from_records(&[
        json!({ "col1": "x", "balance": 10.5 }),
        json!({ "col1": "y", "balance": 0 }),
    ])
    .expect("fixture records are objects")
}

pub fn register_all(ctx: &mut VariableContext) {
    ctx.set_variable("login", VarType::String, VarValue::from("ada"));
    ctx.set_variable("attempts", VarType::Integer, VarValue::from(3i64));
    ctx.set_variable("customer", VarType::JsonObject, VarValue::from(CUSTOMER_JSON));
    ctx.set_variable("invoice", VarType::XmlElement, VarValue::from(INVOICE_XML));
    ctx.set_variable(
        "invoiceDoc",
        VarType::XmlDocument,
        VarValue::from(XmlValue::document(INVOICE_XML).expect("fixture XML parses")),
    );
    ctx.set_variable("accounts", VarType::Tabular, VarValue::from(accounts_table()));
    ctx.set_variable(
        "tags",
        VarType::array_of(VarType::String),
        VarValue::Array(vec!["new".into(), "vip".into()]),
    );
}
