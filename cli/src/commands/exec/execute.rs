use std::error::Error;

use quarry::Query;
use serde::Serialize;

use super::ExecCmd;
use crate::commands::{Execute, binder_for, to_params};
use crate::config::DatabaseConfig;
use crate::output::cell;

/// Outcome of a write
#[derive(Debug, Default, Serialize)]
pub struct ExecResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<serde_json::Value>>,
}

impl Execute for ExecCmd {
    type Output = ExecResult;

    fn execute(self, db: &DatabaseConfig) -> Result<Self::Output, Box<dyn Error>> {
        let conn = db.connect()?;
        let query = Query::new(self.sql).with_binder(binder_for(conn.as_ref()));
        let bound = query.on(to_params(self.params))?;

        if self.keys {
            let keys = bound.execute_insert(conn.as_ref())?;
            Ok(ExecResult {
                affected: None,
                keys: Some(keys.iter().map(cell).collect()),
            })
        } else {
            Ok(ExecResult {
                affected: Some(bound.execute(conn.as_ref())?),
                keys: None,
            })
        }
    }
}
