pub mod assert;
pub mod cli;
pub mod config;
pub mod execution;
pub mod logging;
pub mod parser;
pub mod report;
pub mod state;
pub mod utils;

pub use execution::SuiteRunner;
pub use parser::{parse_test_file, validate_test_file};
