//! Storefront verification CLI library
//!
//! Exposes configuration, the persona runner and report writing for
//! integration testing.

pub mod cli;
pub mod config;
pub mod report;
pub mod runner;

pub use config::Config;
pub use runner::VerifyRunner;
