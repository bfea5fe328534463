// Execution module

pub mod process;
pub mod runner;
pub mod template;

pub use process::{CommandOutput, run_command, run_shell};
pub use runner::SuiteRunner;
