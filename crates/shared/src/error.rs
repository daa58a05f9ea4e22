use serde::{Deserialize, Serialize};

/// Error object the backend returns for non-validation failures. Extra
/// fields such as a code are ignored; only `message` is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
