//! File writers for reconstructed tracks.

use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use wirestereo_algorithms::EventReconstruction;

/// Writer for reconstruction output.
///
/// Writes space points as CSV, one row per point, or whole event results
/// as JSON.
pub struct TrackFileWriter {
    writer: BufWriter<File>,
}

impl TrackFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }

    /// Writes the space points of every track as CSV.
    ///
    /// Columns: `event,track,point,x,y,z,induction_hit,collection_hit`.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_tracks_csv(&mut self, results: &[EventReconstruction], header: bool) -> Result<()> {
        if header {
            writeln!(
                self.writer,
                "event,track,point,x,y,z,induction_hit,collection_hit"
            )?;
        }

        for result in results {
            for (track_index, track) in result.tracks.iter().enumerate() {
                for (point_index, point) in track.points.iter().enumerate() {
                    let p = point.position;
                    writeln!(
                        self.writer,
                        "{},{},{},{},{},{},{},{}",
                        result.event,
                        track_index,
                        point_index,
                        p.x,
                        p.y,
                        p.z,
                        point.induction_hit,
                        point.collection_hit
                    )?;
                }
            }
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Writes the full event results, tracks and counters, as a JSON array.
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn write_json(&mut self, results: &[EventReconstruction]) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, results)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
