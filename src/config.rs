//! Configuration parsing for cursorlock
//!
//! This module handles parsing of environment variables that can optionally
//! override settings from the config file. The primary configuration source
//! is config.toml (see config_file module).
//!
//! Environment variables (all optional):
//! - CURSORLOCK_CONDITION_POLL_MS: Override the condition poll interval
//! - CURSORLOCK_RECENTER_MS: Override the re-centering interval

use crate::constants::{
    CONDITION_POLL_MAX_MS, CONDITION_POLL_MIN_MS, RECENTER_MAX_MS, RECENTER_MIN_MS,
};
use log::{debug, info, warn};
use std::env;

/// Parse the CURSORLOCK_CONDITION_POLL_MS environment variable
///
/// Returns Some(milliseconds) if a valid interval is configured (100-5000)
/// Returns None if not set or invalid
pub fn parse_condition_poll_override() -> Option<u64> {
    match env::var("CURSORLOCK_CONDITION_POLL_MS") {
        Ok(val) => match val.parse::<u64>() {
            Ok(ms) if (CONDITION_POLL_MIN_MS..=CONDITION_POLL_MAX_MS).contains(&ms) => {
                info!("Condition poll interval overridden: {} ms", ms);
                Some(ms)
            }
            Ok(ms) => {
                warn!(
                    "Invalid condition poll interval: {} (must be {}-{} ms). Using default.",
                    ms, CONDITION_POLL_MIN_MS, CONDITION_POLL_MAX_MS
                );
                None
            }
            Err(e) => {
                warn!(
                    "Failed to parse CURSORLOCK_CONDITION_POLL_MS: {}. Using default.",
                    e
                );
                None
            }
        },
        Err(_) => {
            debug!("CURSORLOCK_CONDITION_POLL_MS not set.");
            None
        }
    }
}

/// Parse the CURSORLOCK_RECENTER_MS environment variable
///
/// Returns Some(milliseconds) if a valid interval is configured (10-200)
/// Returns None if not set or invalid
pub fn parse_recenter_override() -> Option<u64> {
    match env::var("CURSORLOCK_RECENTER_MS") {
        Ok(val) => match val.parse::<u64>() {
            Ok(ms) if (RECENTER_MIN_MS..=RECENTER_MAX_MS).contains(&ms) => {
                info!("Re-centering interval overridden: {} ms", ms);
                Some(ms)
            }
            Ok(ms) => {
                warn!(
                    "Invalid re-centering interval: {} (must be {}-{} ms). Using default.",
                    ms, RECENTER_MIN_MS, RECENTER_MAX_MS
                );
                None
            }
            Err(e) => {
                warn!(
                    "Failed to parse CURSORLOCK_RECENTER_MS: {}. Using default.",
                    e
                );
                None
            }
        },
        Err(_) => {
            debug!("CURSORLOCK_RECENTER_MS not set.");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_condition_poll_override() {
        // Not set
        env::remove_var("CURSORLOCK_CONDITION_POLL_MS");
        assert_eq!(
            parse_condition_poll_override(),
            None,
            "Should return None when not set"
        );

        // Boundaries
        env::set_var("CURSORLOCK_CONDITION_POLL_MS", "100");
        assert_eq!(
            parse_condition_poll_override(),
            Some(100),
            "Should accept 100 ms"
        );

        env::set_var("CURSORLOCK_CONDITION_POLL_MS", "5000");
        assert_eq!(
            parse_condition_poll_override(),
            Some(5000),
            "Should accept 5000 ms"
        );

        env::set_var("CURSORLOCK_CONDITION_POLL_MS", "99");
        assert_eq!(
            parse_condition_poll_override(),
            None,
            "Should reject value below 100"
        );

        env::set_var("CURSORLOCK_CONDITION_POLL_MS", "5001");
        assert_eq!(
            parse_condition_poll_override(),
            None,
            "Should reject value above 5000"
        );

        // Unparseable
        env::set_var("CURSORLOCK_CONDITION_POLL_MS", "fast");
        assert_eq!(
            parse_condition_poll_override(),
            None,
            "Should reject non-numeric value"
        );

        env::remove_var("CURSORLOCK_CONDITION_POLL_MS");
    }

    #[test]
    fn test_parse_recenter_override() {
        env::remove_var("CURSORLOCK_RECENTER_MS");
        assert_eq!(
            parse_recenter_override(),
            None,
            "Should return None when not set"
        );

        env::set_var("CURSORLOCK_RECENTER_MS", "10");
        assert_eq!(parse_recenter_override(), Some(10), "Should accept 10 ms");

        env::set_var("CURSORLOCK_RECENTER_MS", "200");
        assert_eq!(parse_recenter_override(), Some(200), "Should accept 200 ms");

        env::set_var("CURSORLOCK_RECENTER_MS", "9");
        assert_eq!(
            parse_recenter_override(),
            None,
            "Should reject value below 10"
        );

        env::set_var("CURSORLOCK_RECENTER_MS", "201");
        assert_eq!(
            parse_recenter_override(),
            None,
            "Should reject value above 200"
        );

        env::set_var("CURSORLOCK_RECENTER_MS", "-30");
        assert_eq!(
            parse_recenter_override(),
            None,
            "Should reject negative value"
        );

        env::remove_var("CURSORLOCK_RECENTER_MS");
    }
}
