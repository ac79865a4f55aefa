//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    #[error("Property form error: {0}")]
    Form(#[from] crate::property_editor::FormError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Session has no document store attached")]
    NoStore,
}
