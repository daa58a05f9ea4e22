//! File picked on the command line, standing in for the upload widget.

use std::path::Path;

use anyhow::{Context, Result};
use dashboard_core::{upload::has_allowed_extension, FileInput, SelectedFile};

pub struct PathFileInput {
    selected: Option<SelectedFile>,
}

impl PathFileInput {
    /// Selects the file at `path`. Contents are only read for spreadsheet
    /// extensions; anything else is selected by name alone so the controller
    /// can reject it without loading it.
    pub async fn open(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("'{}' does not name a file", path.display()))?;
        let bytes = if has_allowed_extension(&filename) {
            tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read '{}'", path.display()))?
        } else {
            Vec::new()
        };
        Ok(Self {
            selected: Some(SelectedFile::new(filename, bytes)),
        })
    }
}

impl FileInput for PathFileInput {
    fn take_selected(&mut self) -> Option<SelectedFile> {
        self.selected.take()
    }

    fn reset(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
#[path = "tests/file_input_tests.rs"]
mod tests;
