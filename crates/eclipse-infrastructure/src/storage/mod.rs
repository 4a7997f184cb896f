//! Storage layer for atomic file operations and secrets.

mod atomic_file;
mod secret_storage;

pub use atomic_file::{AtomicFileError, AtomicTextFile};
pub use secret_storage::{SecretStorage, SecretStorageError};
