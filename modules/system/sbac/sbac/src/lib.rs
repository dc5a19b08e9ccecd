#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! SBAC engine
//!
//! Strategy-based access control for the control plane's business servers.
//! Resolves the caller token to a principal, evaluates the caller's
//! strategies against the resources a call touches, and wraps each business
//! server with a decorator that forwards only authorized calls.
//!
//! Store access goes through [`sbac_sdk::SbacStorePluginClient`]; see the
//! static store plugin for a configuration-backed implementation.

pub mod config;
pub mod decorators;
pub mod domain;
pub mod module;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::SbacConfig;
pub use module::SbacModule;
