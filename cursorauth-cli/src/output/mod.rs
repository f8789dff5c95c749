//! Output formatting for CLI.

mod json;
mod text;

pub use json::{ActivationOutput, JsonFormatter, PathsOutput, StatusOutput, SyncOutput};
pub use text::TextFormatter;
