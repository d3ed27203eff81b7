//! Journey orchestration for storefront verification
//!
//! Provides:
//! - Persona catalog with expected deviations
//! - Journey definitions (steps, scoped checks, checkpoints)
//! - `SessionOrchestrator`, which threads one page handle through a journey
//! - Latency comparison between independent runs

pub mod catalog;
pub mod comparison;
pub mod errors;
pub mod executor;
pub mod persona;
pub mod types;

pub use catalog::*;
pub use comparison::*;
pub use errors::*;
pub use executor::*;
pub use persona::*;
pub use types::*;
