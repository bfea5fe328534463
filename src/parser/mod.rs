// Test file parser
// Loads *_xrtest.yaml files into the test model and checks them before running

pub mod ast;
pub mod core;
pub mod validator;

pub use ast::TestFile;
pub use core::{parse_test_file, parse_test_file_from_str};
pub use validator::{
    ErrorSeverity, ValidationError, validate_test_file, validate_test_file_diagnostics,
};
