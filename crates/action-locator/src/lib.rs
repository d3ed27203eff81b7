//! Candidate-strategy resolution for logical actions
//!
//! A [`LocatorStrategyResolver`] walks an action's candidates in declared
//! order: absent candidates are skipped without waiting, present candidates
//! are executed under a bounded budget, and the first successful execution
//! wins. When every candidate fails the configured failure diagnostics run
//! exactly once.

pub mod resolver;

pub use resolver::*;
