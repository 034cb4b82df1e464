//! Feature components. Each submodule owns its logic and its private helpers.

pub mod preview_generator;

pub use preview_generator::{PreviewGenerator, PreviewOrchestrator, PreviewOutcome};
