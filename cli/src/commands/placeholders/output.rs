//! Output formatting for placeholders command results.

use super::execute::PlaceholdersResult;
use crate::output::Outputable;

impl Outputable for PlaceholdersResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        if self.names.is_empty() {
            lines.push("No placeholders.".to_string());
        } else {
            lines.push(format!("Placeholders ({}):", self.names.len()));
            for (i, name) in self.names.iter().enumerate() {
                lines.push(format!("  {}. {}", i + 1, name));
            }
        }
        lines.push(String::new());
        lines.push(format!("SQLite:     {}", self.sqlite));
        lines.push(format!("PostgreSQL: {}", self.postgres));

        lines.join("\n")
    }
}
