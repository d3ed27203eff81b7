//! Action primitives shared by the resolution layers
//!
//! This crate provides the vocabulary every upper layer speaks:
//! - `LogicalAction` / `CandidateStrategy` and the per-candidate `StrategyResult`
//! - `ActionOutcome` and the `ActionError` taxonomy
//! - Timing instrumentation for any future
//! - The popup vs same-page navigation race

pub mod errors;
mod navigation;
mod pattern;
mod primitives;
mod timing;
pub mod types;

pub use errors::*;
pub use navigation::*;
pub use pattern::*;
pub use primitives::*;
pub use timing::*;
pub use types::*;
