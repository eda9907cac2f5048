//! Table manifest output
//!
//! Each exported table is accompanied by a `<file>.manifest` JSON document
//! describing how downstream consumers should load it: the primary key
//! columns and the incremental-load flag.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::output::OutputResult;
use crate::Endpoint;

/// Manifest accompanying an exported table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Destination table override; empty means the consumer's default
    pub destination: String,
    /// Whether the table should be loaded incrementally
    pub incremental: bool,
    /// Primary key columns of the table
    pub primary_key: Vec<String>,
}

impl Manifest {
    /// Build the manifest for an endpoint's exported table.
    ///
    /// Activities tables are keyed by the GUID-style `marketoGUID` column,
    /// Leads tables by the id-style `id` column. Exports are always loaded
    /// incrementally.
    pub fn for_endpoint(endpoint: Endpoint) -> Self {
        Self {
            destination: String::new(),
            incremental: true,
            primary_key: vec![endpoint.primary_key().to_string()],
        }
    }

    /// Write the manifest next to the table file as `<table>.manifest`.
    pub fn save(&self, table_path: &Path) -> OutputResult<()> {
        let mut manifest_path = table_path.as_os_str().to_owned();
        manifest_path.push(".manifest");
        let manifest_path = Path::new(&manifest_path);

        let json = serde_json::to_vec(self)?;
        std::fs::write(manifest_path, json)?;

        info!("Output manifest file ({}) produced", manifest_path.display());
        Ok(())
    }
}
