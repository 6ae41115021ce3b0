//! Memory-mapped event readers.
//!

use crate::{Error, Result};
use memmap2::Mmap;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use wirestereo_core::cluster::Event;

/// A memory-mapped file reader.
///
/// Uses memmap2 to access file contents without copying them into a buffer.
pub struct MappedFileReader {
    mmap: Option<Mmap>,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // zero-length files cannot be mapped on every platform
        let mmap = if file.metadata()?.len() == 0 {
            None
        } else {
            // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
            // This is the standard safety contract for memory mapping.
            #[allow(unsafe_code)]
            let mmap = unsafe { Mmap::map(&file)? };
            Some(mmap)
        };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Returns the path the reader was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Accepted top-level layouts of an event file.
#[derive(Deserialize)]
#[serde(untagged)]
enum EventFile {
    List(Vec<Event>),
    Wrapped { events: Vec<Event> },
    Single(Event),
}

/// Reader for JSON event files.
///
/// The file holds either an array of events, an object with an `events`
/// array, or a single event object.
pub struct EventFileReader {
    reader: MappedFileReader,
}

impl EventFileReader {
    /// Opens an event file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            reader: MappedFileReader::open(path)?,
        })
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.reader.len()
    }

    /// Parses every event in the file.
    ///
    /// # Errors
    /// Returns an error for empty files and for content that is not a
    /// recognised event layout.
    pub fn read_events(&self) -> Result<Vec<Event>> {
        if self.reader.is_empty() {
            return Err(Error::InvalidFormat(format!(
                "event file is empty (file: {})",
                self.reader.path().display()
            )));
        }

        let parsed: EventFile = serde_json::from_slice(self.reader.as_bytes())?;
        let events = match parsed {
            EventFile::List(events) | EventFile::Wrapped { events } => events,
            EventFile::Single(event) => vec![event],
        };
        log::debug!(
            "read {} event(s) from {}",
            events.len(),
            self.reader.path().display()
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TWO_EVENTS: &str = r#"[
        {"id": 1, "hits": [{"channel": 10, "peak_time": 100.0}],
         "clusters": [{"plane": 0, "hits": [0], "start_wire": 10.0, "start_time": 100.0, "dt_dw": 0.0}]},
        {"id": 2, "hits": [], "clusters": [], "vertices": [{"plane": 1, "wire": 4.0, "drift_time": 50.0}]}
    ]"#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_mapped_file_reader() {
        let mut file = NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..64).collect();
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        let reader = MappedFileReader::open(file.path()).unwrap();
        assert_eq!(reader.len(), 64);
        assert!(!reader.is_empty());
        assert_eq!(reader.as_bytes(), &data[..]);
    }

    #[test]
    fn test_read_event_list() {
        let file = write_temp(TWO_EVENTS);
        let reader = EventFileReader::open(file.path()).unwrap();
        let events = reader.read_events().unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, 1);
        assert_eq!(events[0].clusters[0].hits, vec![0]);
        assert_eq!(events[1].vertices.len(), 1);
    }

    #[test]
    fn test_read_wrapped_and_single() {
        let wrapped = write_temp(r#"{"events": [{"hits": [], "clusters": []}]}"#);
        let events = EventFileReader::open(wrapped.path())
            .unwrap()
            .read_events()
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, 0);

        let single = write_temp(r#"{"id": 9, "hits": [], "clusters": []}"#);
        let events = EventFileReader::open(single.path())
            .unwrap()
            .read_events()
            .unwrap();
        assert_eq!(events[0].id, 9);
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = NamedTempFile::new().unwrap();
        let reader = EventFileReader::open(file.path()).unwrap();
        assert_eq!(reader.file_size(), 0);
        assert!(matches!(reader.read_events(), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let file = write_temp(r#"{"hits": "#);
        let reader = EventFileReader::open(file.path()).unwrap();
        assert!(matches!(reader.read_events(), Err(Error::Json(_))));
    }
}
