//! Infrastructure layer - file storage.

mod file;

pub use file::JsonFile;
