//! Logging utilities
//!
//! Subscriber setup and helpers that keep log lines short

use crate::config::settings::LoggingConfig;
use anyhow::{Context, Result};

/// Longest message body written to the log before truncation
pub const MAX_LOGGED_BODY_CHARS: usize = 200;

/// Install the global tracing subscriber
///
/// `json` format is meant for production, `text` for local use.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        )
    } else {
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    tracing::info!("Logging system initialized");
    Ok(())
}

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_chars: usize) -> String {
    let total = s.chars().count();
    if total > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}... ({} chars truncated)", head, total - max_chars)
    } else {
        s.to_string()
    }
}

/// Mask all but the last four characters, e.g. for account ids in logs
pub fn mask(value: &str) -> String {
    let total = value.chars().count();
    if total <= 4 {
        return "*".repeat(total);
    }
    let tail: String = value.chars().skip(total - 4).collect();
    format!("{}{}", "*".repeat(total - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_content() {
        assert_eq!(truncate_content("short", 10), "short");
        assert_eq!(truncate_content("abcdef", 3), "abc... (3 chars truncated)");
        // Multi-byte characters are counted, not bytes
        assert_eq!(truncate_content("ééé", 2), "éé... (1 chars truncated)");
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("AC123456"), "****3456");
        assert_eq!(mask("abc"), "***");
    }
}
