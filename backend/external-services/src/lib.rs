pub mod configs;
pub mod logger;
pub mod service;
pub use service::*;
