//! # molder-core
//!
//! Variables for test automation: a registry of typed values, a resolver that
//! addresses into scalars, arrays, JSON and XML trees and tabular result sets,
//! and a substitutor that interpolates references into request bodies.
//!
//! ```
//! use molder_core::{VarType, VarValue, VariableContext};
//!
//! let mut ctx = VariableContext::new();
//! ctx.set_variable("user", VarType::JsonObject, VarValue::from(r#"{"name":"Ada"}"#));
//! assert_eq!(ctx.get_variable_value_text("user.$.name").unwrap().as_deref(), Some("Ada"));
//! assert_eq!(ctx.substitute_xml("<n>{missing}</n>").unwrap(), "<n>missing</n>");
//! ```

pub use molder_types as types;

pub mod address;
pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod template;

pub use address::{Address, ColumnSelector};
pub use builder::ContextBuilder;
pub use config::ContextConfig;
pub use context::VariableContext;
pub use error::ResolveError;
pub use registry::{Variable, VariableRegistry, normalize_name};
pub use resolver::Resolver;
pub use template::{Grammar, Substitutor, TemplateToken, scan_references};
pub use types::{JsonNode, Scalar, TabularResult, ValueError, VarType, VarValue, XmlValue};
