#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static SBAC store plugin: principals, strategies and resource ownership served from YAML configuration.

pub mod config;
pub mod domain;
pub mod module;

pub use config::StaticSbacStoreConfig;
pub use module::StaticSbacStorePlugin;
