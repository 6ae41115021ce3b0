//! wirestereo-io: File I/O for wirestereo.
//!
//! Event files are read through memory-mapped files via memmap2 and parsed
//! as JSON. Tracks are written back as CSV space points or JSON results.
//!

mod error;
mod reader;
mod settings;
mod writer;

pub use error::{Error, Result};
pub use reader::{EventFileReader, MappedFileReader};
pub use settings::Settings;
pub use writer::TrackFileWriter;
