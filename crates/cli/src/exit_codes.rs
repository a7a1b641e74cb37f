//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract. Scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-5     | list             | Reading, parsing and importing lists     |
//! | 50-59   | fetch            | Remote list and X API access             |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant `From<…> for CliError` conversion

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// List (3-5)
// =============================================================================

/// File could not be read or written.
pub const EXIT_IO: u8 = 3;

/// List, settings or index file is not valid YAML / TOML / JSON, or names an
/// unknown platform.
pub const EXIT_PARSE: u8 = 4;

/// Tabular source could not be imported (bad CSV, unreadable workbook,
/// missing sheet).
pub const EXIT_IMPORT: u8 = 5;

// =============================================================================
// Fetch (50-59)
// =============================================================================

/// Credentials missing (environment variable unset).
pub const EXIT_FETCH_NOT_AUTH: u8 = 50;

/// Auth rejected by upstream (401/403).
pub const EXIT_FETCH_AUTH: u8 = 51;

/// Bad request rejected by upstream (other 4xx).
pub const EXIT_FETCH_VALIDATION: u8 = 52;

/// Still rate limited after the allowed number of waits (429).
pub const EXIT_FETCH_RATE_LIMIT: u8 = 53;

/// Upstream error (5xx), network failure or malformed response.
pub const EXIT_FETCH_UPSTREAM: u8 = 54;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_IO,
            EXIT_PARSE,
            EXIT_IMPORT,
            EXIT_FETCH_NOT_AUTH,
            EXIT_FETCH_AUTH,
            EXIT_FETCH_VALIDATION,
            EXIT_FETCH_RATE_LIMIT,
            EXIT_FETCH_UPSTREAM,
        ];
        let unique: std::collections::BTreeSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_fetch_range() {
        for code in [
            EXIT_FETCH_NOT_AUTH,
            EXIT_FETCH_AUTH,
            EXIT_FETCH_VALIDATION,
            EXIT_FETCH_RATE_LIMIT,
            EXIT_FETCH_UPSTREAM,
        ] {
            assert!((50..60).contains(&code));
        }
    }
}
