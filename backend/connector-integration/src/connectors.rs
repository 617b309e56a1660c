pub mod wirecard;
pub use self::wirecard::Wirecard;
