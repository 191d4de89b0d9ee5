//! Bounded concatenation of file contents into the output artifact.

pub mod budget;
pub mod reader;
pub mod writer;

pub use budget::ReadBudget;
pub use reader::{read_bounded, read_bounded_path, FileSource, FsSource, ReadOutcome};
pub use writer::{Aggregator, Plan};
