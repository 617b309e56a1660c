//! Common utilities for connector service

pub mod consts;
pub mod errors;
pub mod id_type;
pub mod request;
pub mod types;
pub mod xml;

// Re-export commonly used items
pub use errors::{CustomResult, ParsingError, ValidationError};
pub use id_type::{IdGenerator, UuidGenerator};
pub use request::{Method, Request, RequestContent};
pub use types::{AmountConvertor, MinorUnit, StringMinorUnit, StringMinorUnitForConnector};
pub use xml::{XmlContent, XmlElement};
