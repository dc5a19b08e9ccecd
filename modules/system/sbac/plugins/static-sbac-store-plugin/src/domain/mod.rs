pub mod client;
pub mod error;
pub mod service;

pub use error::ConfigError;
pub use service::Service;
