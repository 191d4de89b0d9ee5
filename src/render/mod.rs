//! Artifact text that is not file content

pub mod header;

pub use header::instructions;
