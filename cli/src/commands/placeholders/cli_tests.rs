//! CLI parsing tests for placeholders command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "placeholders",
        test_name: test_requires_sql,
        required_arg: "<SQL>",
    }

    crate::cli_option_test! {
        command: "placeholders",
        variant: Placeholders,
        test_name: test_with_sql,
        args: ["SELECT :a"],
        field: sql,
        expected: "SELECT :a",
    }
}
