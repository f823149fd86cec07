//! Canned [`Backend`](medica_core::Backend) implementations for tests.

mod backend;

pub use backend::{FailingBackend, FixedBackend, RecordingBackend};
