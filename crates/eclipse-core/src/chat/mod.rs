//! Chat domain module.
//!
//! # Module Structure
//!
//! - `model`: the `Chat` aggregate and the auto-title rule
//! - `message`: message types (`MessageRole`, `Message`)

mod message;
mod model;

pub use message::{Message, MessageRole};
pub use model::{Chat, TITLE_PREFIX_CHARS, derive_title};
