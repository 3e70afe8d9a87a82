//! Terminal input helpers.

pub mod line_reader;

pub use line_reader::{Input, LineReader};
