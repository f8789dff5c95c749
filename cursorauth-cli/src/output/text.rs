//! Text output formatting with colors.

use std::time::Duration;

use cursorauth_sync::{AttemptOutcome, SyncOutcome};

use super::StatusOutput;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats a sync outcome. `verbose` lists every attempt.
    pub fn format_sync(&self, outcome: &SyncOutcome, verbose: bool) -> String {
        let mut lines = Vec::new();

        match &outcome.result {
            Ok(account) => {
                lines.push(format!(
                    "{} Logged in as {}",
                    self.color(GREEN, "✓"),
                    self.bold(&account.email)
                ));

                let mut details = vec![
                    format!("status {}", account.status),
                    format!("pulls {}", account.pull_count),
                ];
                if let Some(usage) = account.usage {
                    details.push(format!("usage {usage}"));
                }
                details.push(format!("{} keys written", account.keys_written));
                lines.push(format!("  {}", self.dim(&details.join(" · "))));
            }
            Err(e) => {
                lines.push(format!(
                    "{} Sync failed ({}): {e}",
                    self.color(RED, "✗"),
                    e.reason_code()
                ));
            }
        }

        if verbose || outcome.result.is_err() {
            for attempt in &outcome.attempts {
                let marker = match attempt.outcome {
                    AttemptOutcome::Committed => self.color(GREEN, "●"),
                    AttemptOutcome::Excluded(_) | AttemptOutcome::Incomplete(_) => {
                        self.color(YELLOW, "●")
                    }
                    AttemptOutcome::Failed(_) => self.color(RED, "●"),
                };
                let who = attempt.email.as_deref().unwrap_or("-");
                lines.push(format!(
                    "  {marker} attempt {} {who} {} {}",
                    attempt.attempt,
                    attempt.outcome,
                    self.dim(&format_duration(attempt.duration))
                ));
            }
        }

        lines.join("\n")
    }

    /// Formats the current session.
    pub fn format_status(&self, status: &StatusOutput, verbose: bool) -> String {
        let mut lines = Vec::new();

        let state = if status.logged_in {
            self.color(GREEN, "logged in")
        } else {
            self.color(YELLOW, "logged out")
        };
        lines.push(format!("{} ({state})", self.bold("Cursor session")));
        lines.push(format!("  Email:         {}", status.email));
        lines.push(format!("  Access token:  {}", yes_no(status.has_access_token)));
        lines.push(format!("  Refresh token: {}", yes_no(status.has_refresh_token)));
        lines.push(format!(
            "  Bearer token:  {}",
            status.bearer_token.as_deref().unwrap_or("none")
        ));

        if verbose {
            lines.push(format!("  State db:      {}", self.dim(&status.state_db)));
            for field in &status.fields {
                lines.push(format!("    {}", self.dim(field)));
            }
        }

        lines.join("\n")
    }

    fn bold(&self, s: &str) -> String {
        self.color(BOLD, s)
    }

    fn dim(&self, s: &str) -> String {
        self.color(DIM, s)
    }

    fn color(&self, code: &str, s: &str) -> String {
        if self.use_colors {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }
}

fn yes_no(present: bool) -> &'static str {
    if present { "present" } else { "missing" }
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
