//! Declarative macros for generating CLI parsing, execute, and output tests.
//!
//! Instead of writing repetitive test functions, declare the test cases and let
//! the macro generate the actual test code. Expand inside a `#[cfg(test)]`
//! module that imports `rstest` (and `fixture` for the execute macros).

// =============================================================================
// CLI Parsing Test Macros
// =============================================================================

/// Generate a single CLI option test.
#[macro_export]
macro_rules! cli_option_test {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        test_name: $test_name:ident,
        args: [$($arg:literal),+],
        field: $field:ident,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let args = Args::try_parse_from([
                "quarry",
                $cmd,
                $($arg),+
            ]).unwrap();
            match args.command {
                crate::commands::Command::$variant(cmd) => {
                    assert_eq!(cmd.$field, $expected,
                        concat!("Field ", stringify!($field), " mismatch"));
                }
                #[allow(unreachable_patterns)]
                _ => panic!(concat!("Expected ", stringify!($variant), " command")),
            }
        }
    };
}

/// Generate a test that verifies a command fails without a required argument.
///
/// # Example
///
/// ```ignore
/// cli_required_arg_test! {
///     command: "query",
///     test_name: test_requires_sql,
///     required_arg: "<SQL>",
/// }
/// ```
#[macro_export]
macro_rules! cli_required_arg_test {
    (
        command: $cmd:literal,
        test_name: $test_name:ident,
        required_arg: $arg:literal $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let result = Args::try_parse_from(["quarry", $cmd]);
            assert!(result.is_err(), concat!("Command should require ", $arg));
            assert!(
                result.unwrap_err().to_string().contains($arg),
                concat!("Error should mention ", $arg)
            );
        }
    };
}

/// Generate a test that verifies parsing fails with specific invalid args.
#[macro_export]
macro_rules! cli_error_test {
    (
        command: $cmd:literal,
        test_name: $test_name:ident,
        args: [$($arg:literal),+] $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let result = Args::try_parse_from([
                "quarry",
                $cmd,
                $($arg),+
            ]);
            assert!(result.is_err());
        }
    };
}

// =============================================================================
// Execute Test Macros
// =============================================================================

/// Generate a fixture holding a file-backed SQLite book store seeded with the
/// three fixture books through the `batch` command.
#[macro_export]
macro_rules! execute_test_fixture {
    (
        fixture_name: $name:ident $(,)?
    ) => {
        #[fixture]
        fn $name() -> tempfile::NamedTempFile {
            use crate::commands::{BatchCmd, Execute};

            let db_file = quarry::test_utils::bookstore_file_db();
            let json_file = quarry::test_utils::create_temp_json_file(quarry::fixtures::BOOKS);

            let seed = BatchCmd {
                sql: "INSERT INTO book (isbn, title, published) VALUES (:isbn, :title, :published)".to_string(),
                file: json_file.path().to_path_buf(),
            };
            let db = crate::config::DatabaseConfig::Sqlite {
                path: db_file.path().to_path_buf(),
            };
            seed.execute(&db).expect("Seeding books should succeed");
            db_file
        }
    };
}

/// Generate a test that runs a command against a fixture database.
#[macro_export]
macro_rules! execute_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        cmd: $cmd:expr,
        assertions: |$result:ident| $body:block $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: tempfile::NamedTempFile) {
            use crate::commands::Execute;
            let db = crate::config::DatabaseConfig::Sqlite {
                path: $fixture.path().to_path_buf(),
            };
            let $result = $cmd.execute(&db).expect("Execute should succeed");
            $body
        }
    };
}

/// Generate a test that verifies a command fails with a message containing `contains`.
#[macro_export]
macro_rules! execute_error_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        cmd: $cmd:expr,
        contains: $needle:literal $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: tempfile::NamedTempFile) {
            use crate::commands::Execute;
            let db = crate::config::DatabaseConfig::Sqlite {
                path: $fixture.path().to_path_buf(),
            };
            let err = $cmd.execute(&db).expect_err("Execute should fail");
            assert!(
                err.to_string().contains($needle),
                "Error {:?} should contain {:?}",
                err.to_string(),
                $needle
            );
        }
    };
}

// =============================================================================
// Output Test Macros
// =============================================================================

/// Generate a test that verifies table output matches expected string.
///
/// Works with rstest fixtures by accepting a fixture parameter.
#[macro_export]
macro_rules! output_table_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::Outputable;
            assert_eq!($fixture.to_table(), $expected);
        }
    };
}

/// Generate a test that verifies table output contains expected strings.
#[macro_export]
macro_rules! output_table_contains_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        contains: [$($needle:literal),* $(,)?] $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::Outputable;
            let output = $fixture.to_table();
            $(
                assert!(output.contains($needle), concat!("Table output should contain: ", $needle));
            )*
        }
    };
}

/// Generate a test that verifies JSON output is valid and has the expected fields.
#[macro_export]
macro_rules! output_json_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        assertions: { $($field:literal : $expected:expr),* $(,)? } $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::{Outputable, OutputFormat};
            let output = $fixture.format(OutputFormat::Json);
            let parsed: serde_json::Value = serde_json::from_str(&output)
                .expect("Should produce valid JSON");
            $(
                assert_eq!(parsed[$field], $expected, concat!("JSON field mismatch: ", $field));
            )*
        }
    };
}

/// Generate a test that verifies Toon output contains expected strings.
#[macro_export]
macro_rules! output_toon_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        contains: [$($needle:literal),* $(,)?] $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::{Outputable, OutputFormat};
            let output = $fixture.format(OutputFormat::Toon);
            $(
                assert!(output.contains($needle), concat!("Toon output should contain: ", $needle));
            )*
        }
    };
}
