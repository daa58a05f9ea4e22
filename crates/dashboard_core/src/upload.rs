//! Spreadsheet import: client-side file checks and interpretation of the
//! import endpoint's error payloads.

use std::fmt;

use serde_json::Value;
use shared::{error::ApiError, protocol::RowValidationError};
use tracing::error;

use crate::gateway::{ErrorBody, UploadRejection};

pub const ALLOWED_EXTENSIONS: [&str; 2] = [".xlsx", ".xls"];

const REPORT_CHAR_LIMIT: usize = 200;
const REPORT_PREVIEW_LINES: usize = 5;
const GENERIC_FAILURE_REPORT: &str = "Failed to upload file to backend.";

#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("filename", &self.filename)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// Handle to whatever widget the user picks a file with. The controller takes
/// the selection from it and clears it once the upload reaches an outcome.
pub trait FileInput: Send {
    fn take_selected(&mut self) -> Option<SelectedFile>;
    fn reset(&mut self);
}

pub fn has_allowed_extension(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower
        .rfind('.')
        .map(|dot| ALLOWED_EXTENSIONS.contains(&&lower[dot..]))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Refreshing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFailureKind {
    InvalidFileType,
    ValidationErrors,
    ServerMessage,
    Unknown,
}

impl UploadFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadFailureKind::InvalidFileType => "invalid-file-type",
            UploadFailureKind::ValidationErrors => "validation-errors",
            UploadFailureKind::ServerMessage => "server-message",
            UploadFailureKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for UploadFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error payload after its one and only parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPayload {
    ValidationErrors(Vec<RowValidationError>),
    Message(String),
    Raw(String),
    Unknown,
}

impl ErrorPayload {
    pub fn parse(body: ErrorBody) -> Self {
        match body {
            ErrorBody::Text(text) if text.trim().is_empty() => ErrorPayload::Unknown,
            ErrorBody::Text(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => Self::from_json(value).unwrap_or(ErrorPayload::Raw(text)),
                Err(_) => ErrorPayload::Raw(text),
            },
            ErrorBody::Structured(value) => Self::from_json(value).unwrap_or(ErrorPayload::Unknown),
            ErrorBody::Absent => ErrorPayload::Unknown,
        }
    }

    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Array(ref items) if !items.is_empty() => {
                serde_json::from_value::<Vec<RowValidationError>>(value)
                    .ok()
                    .map(ErrorPayload::ValidationErrors)
            }
            Value::Object(_) => serde_json::from_value::<ApiError>(value)
                .ok()
                .filter(|error| !error.message.trim().is_empty())
                .map(|error| ErrorPayload::Message(error.message)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    pub kind: UploadFailureKind,
    pub title: String,
    /// Notification body, already shortened for display.
    pub report: String,
}

impl UploadFailure {
    pub fn invalid_file_type() -> Self {
        Self {
            kind: UploadFailureKind::InvalidFileType,
            title: "Invalid File Type".to_string(),
            report: "Please upload an Excel file (.xlsx or .xls)".to_string(),
        }
    }

    pub fn from_rejection(rejection: UploadRejection) -> Self {
        Self::from_payload(ErrorPayload::parse(rejection.body))
    }

    pub fn from_payload(payload: ErrorPayload) -> Self {
        let (kind, title, report) = match payload {
            ErrorPayload::ValidationErrors(rows) => (
                UploadFailureKind::ValidationErrors,
                format!("Validation Errors ({} found)", rows.len()),
                rows.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            ErrorPayload::Message(text) | ErrorPayload::Raw(text) => (
                UploadFailureKind::ServerMessage,
                "Upload Failed".to_string(),
                text,
            ),
            ErrorPayload::Unknown => (
                UploadFailureKind::Unknown,
                "Upload Failed".to_string(),
                GENERIC_FAILURE_REPORT.to_string(),
            ),
        };

        error!(kind = %kind, %report, "upload failed");
        Self {
            kind,
            title,
            report: truncate_report(report),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success { filename: String },
    Failure(UploadFailure),
}

impl UploadOutcome {
    pub fn failure_kind(&self) -> Option<UploadFailureKind> {
        match self {
            UploadOutcome::Success { .. } => None,
            UploadOutcome::Failure(failure) => Some(failure.kind),
        }
    }

    pub fn notice(&self) -> crate::Notice {
        match self {
            UploadOutcome::Success { filename } => crate::Notice::success(
                "File Imported",
                format!("File \"{filename}\" uploaded successfully."),
            ),
            UploadOutcome::Failure(failure) => {
                crate::Notice::error(failure.title.clone(), failure.report.clone())
            }
        }
    }
}

/// Long reports keep their first lines and point at the logs for the rest.
pub fn truncate_report(report: String) -> String {
    if report.chars().count() <= REPORT_CHAR_LIMIT {
        return report;
    }

    let line_count = report.split('\n').count();
    if line_count <= REPORT_PREVIEW_LINES {
        return report;
    }

    let preview = report
        .split('\n')
        .take(REPORT_PREVIEW_LINES)
        .collect::<Vec<_>>()
        .join("\n");
    let remaining = line_count - REPORT_PREVIEW_LINES;
    format!("{preview}\n\n... and {remaining} more error(s). Check logs for full details.")
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
