pub mod connectors;
pub mod utils;

pub use connectors::Wirecard;
