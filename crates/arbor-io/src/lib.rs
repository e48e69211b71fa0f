//! File I/O for arbor: CSV datasets, JSON build requests, and tree JSON.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{BuildRequest, TabularData};
pub use error::IoError;
pub use reader::{CsvReader, RequestReader, TreeReader};
pub use writer::TreeWriter;
