//! Page-state assertions
//!
//! - `Assertion` vocabulary (URL, visibility, text, counts, input values, ordering)
//! - `PollingValidator` re-checks an assertion until it holds or the bound expires
//! - A final mismatch surfaces as `ActionError::AssertionMismatch`

pub mod assertion;
pub mod errors;
pub mod validator;

pub use assertion::*;
pub use errors::*;
pub use validator::*;
