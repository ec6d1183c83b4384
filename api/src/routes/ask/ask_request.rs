use serde::Deserialize;

use crate::error_handler::{AppError, AppResult};

/// Query string of `/ask`.
#[derive(Debug, Default, Deserialize)]
pub struct AskQuery {
    /// Natural language question.
    #[serde(default)]
    pub q: Option<String>,
    /// Optional download name; turns the answer into an attachment.
    #[serde(default)]
    pub filename: Option<String>,
}

impl AskQuery {
    /// The question as sent by the caller.
    ///
    /// # Errors
    /// [`AppError::MissingQuestion`] if `q` is absent or blank.
    pub fn question(&self) -> AppResult<&str> {
        match self.q.as_deref() {
            Some(q) if !q.trim().is_empty() => Ok(q),
            _ => Err(AppError::MissingQuestion),
        }
    }

    /// The requested filename, ignoring an empty value.
    pub fn attachment_name(&self) -> Option<&str> {
        self.filename.as_deref().filter(|f| !f.is_empty())
    }
}
