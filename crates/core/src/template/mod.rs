//! Template scanning and substitution.
//!
//! Two token grammars are supported. XML-oriented bodies use `{reference}`;
//! JSON-oriented bodies use `@identifier`. A token whose reference is empty or
//! starts with `(` is an escape and is emitted without its delimiters.

mod scanner;
mod substitutor;

pub use scanner::{Grammar, TemplateToken, scan_references};
pub use substitutor::Substitutor;
