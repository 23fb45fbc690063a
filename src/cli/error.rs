// Error handling utilities for consistent error messages and exit codes

use crate::models::{StageDefinition, STAGE_CATALOG};
use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, refused stage operations, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exit with an internal error (exit code 2)
/// Internal errors are for unexpected system failures: database, filesystem, etc.
pub fn internal_error(error: &anyhow::Error) -> ! {
    eprintln!("Internal error: {}", error);
    let mut causes = error.chain().skip(1).peekable();
    if causes.peek().is_some() {
        eprintln!("\nCaused by:");
        for (indent, cause) in causes.enumerate() {
            eprintln!("{:indent$}  {}", "", cause, indent = indent + 1);
        }
    }
    process::exit(2);
}

/// Validate a stage number against the catalog size
pub fn validate_stage_id(id: u32) -> Result<u32, String> {
    StageDefinition::find(id)
        .map(|def| def.id)
        .ok_or_else(|| format!("Invalid stage: {}. Stages are numbered 1 to {}.", id, STAGE_CATALOG.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_stage_id() {
        assert_eq!(validate_stage_id(1), Ok(1));
        assert_eq!(validate_stage_id(10), Ok(10));
        assert!(validate_stage_id(0).is_err());
        assert!(validate_stage_id(11).is_err());
    }
}
