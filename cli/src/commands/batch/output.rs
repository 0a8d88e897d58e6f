//! Output formatting for batch command results.

use super::execute::BatchResult;
use crate::output::Outputable;

impl Outputable for BatchResult {
    fn to_table(&self) -> String {
        if self.items == 0 {
            return "Batch: no items.".to_string();
        }

        let mut lines = vec![format!("Batch: {} items, {} rows affected", self.items, self.total)];
        for (i, count) in self.counts.iter().enumerate() {
            lines.push(format!("  [{}] {}", i, count));
        }
        lines.join("\n")
    }
}
