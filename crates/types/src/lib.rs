//! The value model shared by the variable registry and resolver.

pub mod error;
pub mod json;
pub mod scalar;
pub mod table;
pub mod value;
pub mod var_type;
pub mod xml;

pub use error::ValueError;
pub use json::JsonNode;
pub use scalar::Scalar;
pub use table::TabularResult;
pub use value::VarValue;
pub use var_type::VarType;
pub use xml::{XmlNodeRef, XmlTree, XmlValue};
