//! JsonFileSink - appends forwarded records to a JSON-lines file

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::{ContractError, RecordSink, SinkRecord};
use serde::Serialize;
use tracing::{debug, instrument};

/// Sink that appends one JSON object per forwarded entry.
///
/// Each line carries the full envelope: timestamp, channel, level, source,
/// record. Writes go through a buffered writer; `flush`/`close` push them
/// to the OS.
pub struct JsonFileSink {
    name: String,
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonFileSink {
    /// Create a new JsonFileSink appending to `path`.
    ///
    /// Parent directories are created if missing; an existing file is
    /// appended to, never truncated.
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            name: name.into(),
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./records.jsonl"));
        Self::new(name, path)
    }

    /// Output file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: Serialize + Sync> RecordSink<T> for JsonFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, entry: &SinkRecord<T>) -> Result<(), ContractError> {
        // Serialize the full line up front; a payload that fails mid-way
        // must not leave a partial prefix in the writer
        let mut line = serde_json::to_vec(entry)
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        Ok(())
    }

    #[instrument(name = "json_file_sink_flush", skip(self), fields(sink = %self.name))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer.flush()?;
        Ok(())
    }

    #[instrument(name = "json_file_sink_close", skip(self), fields(sink = %self.name))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.writer.flush()?;
        debug!(path = %self.path.display(), "JsonFileSink closed");
        Ok(())
    }
}
