// Assertion module

pub mod engine;

pub use engine::{AssertionEngine, AssertionKind};
