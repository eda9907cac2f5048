//! Exported table persistence
//!
//! The downloaded payload is already CSV; it is written to the tables-out
//! directory verbatim, without parsing or re-encoding. A zero-byte payload
//! is a legitimate Completed export with no rows: nothing is written and
//! the run still succeeds.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::output::{Manifest, OutputResult};
use crate::Endpoint;

/// Writes exported tables and their manifests into one output directory.
pub struct TableWriter {
    tables_dir: PathBuf,
}

impl TableWriter {
    /// Create a writer for the given tables-out directory.
    /// The directory is created if it does not exist.
    pub fn new<P: Into<PathBuf>>(tables_dir: P) -> OutputResult<Self> {
        let tables_dir = tables_dir.into();
        std::fs::create_dir_all(&tables_dir)?;
        Ok(Self { tables_dir })
    }

    /// The directory tables are written into
    pub fn tables_dir(&self) -> &Path {
        &self.tables_dir
    }

    /// Persist a downloaded export.
    ///
    /// Returns the table path, or `None` when the payload was empty and
    /// nothing was written. Non-empty payloads also get a manifest with the
    /// endpoint's primary key.
    pub fn write(&self, endpoint: Endpoint, data: &[u8]) -> OutputResult<Option<PathBuf>> {
        if data.is_empty() {
            info!(
                %endpoint,
                "The export reached state Completed, but no data were transferred from the API"
            );
            return Ok(None);
        }

        let table_path = self.tables_dir.join(endpoint.table_file_name());
        std::fs::write(&table_path, data)?;

        Manifest::for_endpoint(endpoint).save(&table_path)?;

        info!(%endpoint, path = %table_path.display(), "Endpoint exported");
        Ok(Some(table_path))
    }
}
