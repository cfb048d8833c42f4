//! Loading content from documents and directories.

pub mod catalog;
pub mod decode;
