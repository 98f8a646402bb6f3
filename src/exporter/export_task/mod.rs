//! Export task execution -- batch lifecycle and per-document export.
//!
//! Split into focused submodules:
//! - [`context`] - Shared state for one run (provider, delivery, cancellation)
//! - [`orchestration`] - Sequential batch loop, progress and pacing
//! - [`document`] - Export and delivery of a single document
//! - [`finalization`] - Archive packaging and final status

mod context;
mod document;
mod finalization;
mod orchestration;


pub(crate) use context::ExportTaskContext;
pub(crate) use orchestration::{BatchOutcome, run_batch};
