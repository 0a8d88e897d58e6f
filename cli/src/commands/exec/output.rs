//! Output formatting for exec command results.

use super::execute::ExecResult;
use crate::output::{Outputable, cell_text};

impl Outputable for ExecResult {
    fn to_table(&self) -> String {
        match (&self.affected, &self.keys) {
            (_, Some(keys)) if keys.is_empty() => "No keys generated.".to_string(),
            (_, Some(keys)) => {
                let keys: Vec<String> = keys.iter().map(cell_text).collect();
                format!("Generated keys: {}", keys.join(", "))
            }
            (Some(1), None) => "1 row affected.".to_string(),
            (Some(n), None) => format!("{} rows affected.", n),
            (None, None) => String::new(),
        }
    }
}
