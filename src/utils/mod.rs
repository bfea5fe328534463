// Utilities

pub mod file;

pub use file::{FileUtils, TEST_FILE_SUFFIX};
