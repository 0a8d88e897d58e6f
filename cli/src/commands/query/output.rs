//! Output formatting for query command results.

use super::execute::QueryResult;
use crate::output::{Outputable, cell_text, format_table};

impl Outputable for QueryResult {
    fn to_table(&self) -> String {
        if self.rows.is_empty() {
            return "No rows.".to_string();
        }

        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        let noun = if rows.len() == 1 { "row" } else { "rows" };

        format!("{}\n\n({} {})", format_table(&self.columns, &rows), rows.len(), noun)
    }
}
