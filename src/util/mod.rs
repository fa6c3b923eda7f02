//! Utility functions for common operations.
//!
//! - **Text processing**: HTML entity decoding for titles and link labels
//! - **File writes**: write-to-temp-then-rename persistence

mod atomic;
mod text;

pub use atomic::atomic_write;
pub use text::unescape_html;
