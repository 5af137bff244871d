use std::path::{Path, PathBuf};

use anyhow::Result;
use log::debug;

use super::filter::select_range;
use super::loader::load_file;
use super::model::{SweepBatch, TimeRange};

/// Something that can serve the sweeps of one series for a time range.
pub trait SweepSource {
    fn fetch(&mut self, range: &TimeRange) -> Result<SweepBatch>;
}

/// Serve range selections out of an already materialised batch.
fn slice_batch(batch: &SweepBatch, range: &TimeRange) -> SweepBatch {
    SweepBatch {
        series_id: batch.series_id.clone(),
        axis: batch.axis,
        sweeps: select_range(&batch.sweeps, range),
    }
}

/// In-memory source useful for tests and deterministic playback.
pub struct MemorySource {
    batch: SweepBatch,
}

impl MemorySource {
    pub fn new(batch: SweepBatch) -> Self {
        Self { batch }
    }
}

impl SweepSource for MemorySource {
    fn fetch(&mut self, range: &TimeRange) -> Result<SweepBatch> {
        Ok(slice_batch(&self.batch, range))
    }
}

/// File-backed source: the file is read on first fetch and kept in memory.
pub struct FileSource {
    path: PathBuf,
    cached: Option<SweepBatch>,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cached: None,
        }
    }
}

impl SweepSource for FileSource {
    fn fetch(&mut self, range: &TimeRange) -> Result<SweepBatch> {
        let batch = match self.cached.take() {
            Some(batch) => batch,
            None => load_file(&self.path)?,
        };
        let selected = slice_batch(&batch, range);
        debug!(
            "selected {}/{} sweeps in [{}, {}]",
            selected.len(),
            batch.len(),
            range.start_ms,
            range.end_ms
        );
        self.cached = Some(batch);
        Ok(selected)
    }
}
