//! # molder
//!
//! Typed variables for test automation. Values are stored under a declared
//! type, addressed with references such as `user.$.name`, `items[2]` or
//! `rows[0][email]`, and interpolated into XML (`{ref}`) or JSON (`@ref`)
//! request bodies.
//!
//! ```
//! use molder::{ContextBuilder, Grammar};
//! use serde_json::json;
//!
//! let ctx = ContextBuilder::new()
//!     .with_seed([("host", json!("api.local")), ("user", json!({ "id": 7 }))])
//!     .build();
//! let body = ctx.substitute_xml("<req host=\"{host}\">{user.$.id}</req>").unwrap();
//! assert_eq!(body, "<req host=\"api.local\">7</req>");
//! assert_eq!(ctx.unresolved("@token", Grammar::Json), vec!["token"]);
//! ```

pub mod error;

pub use molder_core as core;
pub use molder_jpath as jpath;
pub use molder_types as types;
pub use molder_xpath1 as xpath;

pub use error::MolderError;
pub use molder_core::{
    Address, ColumnSelector, ContextBuilder, ContextConfig, Grammar, Resolver, ResolveError,
    Substitutor, TemplateToken, Variable, VariableContext, VariableRegistry, normalize_name,
    scan_references,
};
pub use molder_types::{JsonNode, Scalar, TabularResult, ValueError, VarType, VarValue, XmlValue};
