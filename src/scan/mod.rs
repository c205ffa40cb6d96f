//! Content scanning
//!
//! Everything between the content corpus on disk and the per-family
//! character sets handed to the coverage oracle.

pub mod charset;
pub mod classify;
pub mod scanner;

pub use charset::{always_include, CharacterSet};
pub use classify::{classify, family_characters, is_renderable};
pub use scanner::{scan, ContentScan};
