//! CLI operation handlers.
//!
//! - [`search`]: find pull requests in the configured repository
//!
//! Output formatting utilities are in [`output`].

pub mod output;
pub mod search;
