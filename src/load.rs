use crate::error::Result;
use crate::table::Table;
use async_trait::async_trait;
use chrono::Utc;
use std::fs;
use std::path::Path;
use tracing::info;

/// Boundary to the (external) load stage. The pipeline hands over one
/// table per invocation; transactions, retries and connection lifecycle
/// for the actual bulk write live on the other side of this seam.
#[async_trait]
pub trait LoadStage: Send + Sync {
    /// Writes one table as a named artifact and returns its location.
    async fn write_table(&self, table: &Table, name: &str) -> Result<String>;
}

/// File-based load stage: one JSON artifact per table, dense records with
/// nulls for absent cells, timestamped filename per run.
pub struct JsonFileLoader {
    output_dir: String,
}

impl JsonFileLoader {
    pub fn new(output_dir: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl LoadStage for JsonFileLoader {
    async fn write_table(&self, table: &Table, name: &str) -> Result<String> {
        fs::create_dir_all(&self.output_dir)?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{name}_{timestamp}.json");
        let filepath = Path::new(&self.output_dir).join(&filename);

        let records = table.to_dense_records();
        let json_content = serde_json::to_string_pretty(&records)?;
        fs::write(&filepath, json_content)?;

        info!(
            "Wrote {} rows x {} columns to {}",
            table.row_count(),
            table.columns().len(),
            filepath.display()
        );
        Ok(filepath.to_string_lossy().to_string())
    }
}
