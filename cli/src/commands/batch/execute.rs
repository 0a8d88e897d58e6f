use std::error::Error;
use std::fs;

use quarry::{Batch, Dctor, Field, Query, Value, field};
use serde::Serialize;
use tracing::info;

use super::BatchCmd;
use crate::commands::{Execute, binder_for};
use crate::config::DatabaseConfig;

type Item = serde_json::Map<String, serde_json::Value>;

/// Per-item affected row counts of a batch
#[derive(Debug, Default, Serialize)]
pub struct BatchResult {
    pub items: usize,
    pub total: u64,
    pub counts: Vec<u64>,
}

/// Deconstructor reading each placeholder from the object key of the same name.
fn object_dctor(names: &[String]) -> Dctor<Item> {
    let fields: Vec<Field<Item>> = names
        .iter()
        .map(|name| {
            let key = name.clone();
            field(name.clone(), move |item: &Item| {
                item.get(&key).cloned().map_or(Value::Null, Value::from)
            })
        })
        .collect();
    Dctor::new(fields)
}

impl Execute for BatchCmd {
    type Output = BatchResult;

    fn execute(self, db: &DatabaseConfig) -> Result<Self::Output, Box<dyn Error>> {
        let content = fs::read_to_string(&self.file)
            .map_err(|e| format!("Failed to read {}: {}", self.file.display(), e))?;
        let items: Vec<Item> = serde_json::from_str(&content)
            .map_err(|e| format!("Expected a JSON array of objects in {}: {}", self.file.display(), e))?;

        let conn = db.connect()?;
        let query = Query::new(self.sql).with_binder(binder_for(conn.as_ref()));
        let batch = Batch::new(items, object_dctor(query.names()));
        let counts = query.execute_batch(&batch, conn.as_ref())?;

        info!(items = batch.len(), "batch complete");
        Ok(BatchResult {
            items: batch.len(),
            total: counts.iter().sum(),
            counts,
        })
    }
}
