use std::error::Error;

use quarry::{Query, parser};
use serde::Serialize;

use super::QueryCmd;
use crate::commands::{Execute, binder_for, to_params};
use crate::config::DatabaseConfig;
use crate::output::cell;

/// Rows returned by a read
#[derive(Debug, Default, Serialize)]
pub struct QueryResult {
    /// Column names, taken from the first row
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryResult {
    fn from_rows(rows: Vec<Vec<(String, quarry::Value)>>) -> Self {
        let columns = rows
            .first()
            .map(|row| row.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default();
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|(_, v)| cell(v)).collect())
            .collect();
        QueryResult { columns, rows }
    }
}

impl Execute for QueryCmd {
    type Output = QueryResult;

    fn execute(self, db: &DatabaseConfig) -> Result<Self::Output, Box<dyn Error>> {
        let conn = db.connect()?;
        let query = Query::new(self.sql).with_binder(binder_for(conn.as_ref()));
        let rows = query
            .on(to_params(self.params))?
            .fetch(&parser::columns().list(), conn.as_ref())?;
        Ok(QueryResult::from_rows(rows))
    }
}
