//! Shared byte-level scanning

pub mod cursor;

pub use cursor::Cursor;
