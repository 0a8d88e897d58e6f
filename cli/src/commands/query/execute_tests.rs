//! Execute tests for query command.

#[cfg(test)]
mod tests {
    use super::super::QueryCmd;
    use quarry::Value;
    use rstest::{fixture, rstest};

    crate::execute_test_fixture! {
        fixture_name: populated_db,
    }

    crate::execute_test! {
        test_name: test_select_all_books,
        fixture: populated_db,
        cmd: QueryCmd {
            sql: "SELECT isbn, title FROM book ORDER BY id".to_string(),
            params: vec![],
        },
        assertions: |result| {
            assert_eq!(result.columns, vec!["isbn", "title"]);
            assert_eq!(result.rows.len(), 3);
            assert_eq!(result.rows[0][1], serde_json::json!("Dune"));
        },
    }

    crate::execute_test! {
        test_name: test_select_by_param,
        fixture: populated_db,
        cmd: QueryCmd {
            sql: "SELECT title, published FROM book WHERE isbn = :isbn".to_string(),
            params: vec![("isbn".to_string(), Value::from("978-0553293357"))],
        },
        assertions: |result| {
            assert_eq!(result.rows, vec![vec![serde_json::json!("Foundation"), serde_json::Value::Null]]);
        },
    }

    crate::execute_test! {
        test_name: test_no_match_is_empty,
        fixture: populated_db,
        cmd: QueryCmd {
            sql: "SELECT * FROM book WHERE id = {id}".to_string(),
            params: vec![("id".to_string(), Value::Int(9999))],
        },
        assertions: |result| {
            assert!(result.rows.is_empty());
            assert!(result.columns.is_empty());
        },
    }

    crate::execute_error_test! {
        test_name: test_missing_param_fails,
        fixture: populated_db,
        cmd: QueryCmd {
            sql: "SELECT * FROM book WHERE id = :id".to_string(),
            params: vec![],
        },
        contains: "Missing value for placeholder 'id'",
    }

    crate::execute_error_test! {
        test_name: test_unknown_table_fails,
        fixture: populated_db,
        cmd: QueryCmd {
            sql: "SELECT * FROM shelf".to_string(),
            params: vec![],
        },
        contains: "no such table",
    }
}
