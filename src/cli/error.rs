// Error classification and argument validation for the CLI

use crate::error::TodoError;

/// Exit code for bad input, missing todos and conflicts
pub const EXIT_USER_ERROR: i32 = 1;
/// Exit code for storage or I/O failures
pub const EXIT_INTERNAL_ERROR: i32 = 2;

/// Decide the process exit code for an error returned by a command
///
/// Anything whose cause chain contains a database or I/O failure is internal;
/// everything else was caused by the invocation.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(todo_err) = cause.downcast_ref::<TodoError>() {
            return if todo_err.is_user_error() { EXIT_USER_ERROR } else { EXIT_INTERNAL_ERROR };
        }
        if cause.is::<rusqlite::Error>() || cause.is::<std::io::Error>() {
            return EXIT_INTERNAL_ERROR;
        }
    }
    EXIT_USER_ERROR
}

/// Validate that a todo ID is valid (positive integer)
pub fn validate_todo_id(id_str: &str) -> Result<i64, String> {
    id_str.trim().parse::<i64>()
        .map_err(|_| format!("Invalid todo ID: '{}'. Todo ID must be a number.", id_str))
        .and_then(|id| {
            if id > 0 {
                Ok(id)
            } else {
                Err(format!("Invalid todo ID: {}. Todo ID must be positive.", id))
            }
        })
}

/// Parse a numeric field value such as `urgency=3`; range checks happen in the repository
pub fn parse_number_field(field: &str, value: &str) -> Result<i64, String> {
    value.trim().parse::<i64>()
        .map_err(|_| format!("Invalid {}: '{}'. Expected a whole number.", field, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_validate_todo_id() {
        assert_eq!(validate_todo_id("1"), Ok(1));
        assert_eq!(validate_todo_id(" 42 "), Ok(42));
        assert!(validate_todo_id("0").is_err());
        assert!(validate_todo_id("-1").is_err());
        assert!(validate_todo_id("abc").is_err());
        assert!(validate_todo_id("").is_err());
    }

    #[test]
    fn test_parse_number_field() {
        assert_eq!(parse_number_field("urgency", "3"), Ok(3));
        assert!(parse_number_field("effort", "lots").unwrap_err().contains("effort"));
    }

    #[test]
    fn test_exit_code_classification() {
        let not_found = anyhow::Error::new(TodoError::todo_not_found(3));
        assert_eq!(exit_code(&not_found), EXIT_USER_ERROR);

        let validation: anyhow::Result<()> = Err(TodoError::validation("bad")).context("Failed to add todo");
        assert_eq!(exit_code(&validation.unwrap_err()), EXIT_USER_ERROR);

        let db = anyhow::Error::new(TodoError::Database(rusqlite::Error::InvalidQuery));
        assert_eq!(exit_code(&db), EXIT_INTERNAL_ERROR);

        let io = anyhow::Error::new(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(exit_code(&io), EXIT_INTERNAL_ERROR);

        assert_eq!(exit_code(&anyhow::anyhow!("plain message")), EXIT_USER_ERROR);
    }
}
