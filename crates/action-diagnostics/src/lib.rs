//! Failure diagnostics for exhausted action resolutions.
//!
//! [`DiagnosticsCapture`] takes one full-page screenshot per failure and hands
//! it to an [`page_adapter::ArtifactSink`], labelled with the scenario and the
//! action description. Checkpoint screenshots go through the same sinks but are
//! not failure diagnostics.

mod capture;
mod errors;
mod sink;

pub use action_primitives::DiagnosticBundle;
pub use capture::{capture_checkpoint, slug, DiagnosticsCapture, FailureDiagnostics};
pub use errors::DiagnosticsError;
pub use sink::{FsArtifactSink, MemoryArtifactSink, StoredArtifact};

pub const PNG_MIME: &str = "image/png";
