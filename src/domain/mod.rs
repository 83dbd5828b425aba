//! Domain specific structures, implementations, and logic

mod identity;
mod payload;
mod template;

pub use identity::*;
pub use payload::*;
pub use template::*;

use thiserror::Error;

/// Error raised when a template lacks a field that has to be overwritten
///
/// This can only happen when the templates and the binary are out of sync.
#[derive(Debug, Error)]
#[error("{kind} template is missing `{field}`")]
pub struct BindingError {
    /// Kind of the template that could not be bound
    pub kind: ManifestKind,
    /// Path of the missing field
    pub field: &'static str,
}

impl BindingError {
    /// Creates a new instance for the given kind and missing field
    pub fn new(kind: ManifestKind, field: &'static str) -> Self {
        Self { kind, field }
    }
}
