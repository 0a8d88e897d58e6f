use std::error::Error;

use quarry::{Placeholder, Query};
use serde::Serialize;

use super::PlaceholdersCmd;
use crate::commands::Execute;
use crate::config::DatabaseConfig;

/// Placeholder names of a statement and its positional renderings
#[derive(Debug, Serialize)]
pub struct PlaceholdersResult {
    pub sql: String,
    pub names: Vec<String>,
    /// SQLite form (`?1`, `?2`, ...)
    pub sqlite: String,
    /// PostgreSQL form (`$1`, `$2`, ...)
    pub postgres: String,
}

impl Execute for PlaceholdersCmd {
    type Output = PlaceholdersResult;

    /// Pure text analysis; the database is never opened.
    fn execute(self, _db: &DatabaseConfig) -> Result<Self::Output, Box<dyn Error>> {
        let query = Query::new(self.sql);
        Ok(PlaceholdersResult {
            names: query.names().to_vec(),
            sqlite: query.render(Placeholder::Question),
            postgres: query.render(Placeholder::Dollar),
            sql: query.sql().to_string(),
        })
    }
}
