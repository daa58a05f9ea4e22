use std::{fs, path::Path};

use anyhow::Context;
use dashboard_core::{DashboardOptions, DEFAULT_PAGE_SIZE};
use serde::Deserialize;
use shared::domain::{SortDirection, SortSpec};
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    pub api_base_url: String,
    pub page_size: u32,
    pub sort_field: String,
    pub sort_direction: SortDirection,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        let sort = SortSpec::default();
        Self {
            api_base_url: "http://localhost:8080/api".into(),
            page_size: DEFAULT_PAGE_SIZE,
            sort_field: sort.field,
            sort_direction: sort.direction,
        }
    }
}

impl DashboardSettings {
    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            page_size: self.page_size,
            sort: SortSpec::new(self.sort_field.clone(), self.sort_direction),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    page_size: Option<u32>,
    sort_field: Option<String>,
    sort_direction: Option<String>,
}

pub fn load_settings() -> DashboardSettings {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE))
}

/// Defaults, then the toml file when present, then environment overrides.
pub fn load_settings_from(path: &Path) -> DashboardSettings {
    let mut settings = DashboardSettings::default();

    if path.exists() {
        if let Err(error) = apply_file(&mut settings, path) {
            warn!(
                path = %path.display(),
                error = %format!("{error:#}"),
                "ignoring unreadable dashboard config"
            );
        }
    }

    apply_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut DashboardSettings, path: &Path) -> anyhow::Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let file_cfg: FileSettings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse '{}'", path.display()))?;

    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.page_size.filter(|size| *size > 0) {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.sort_field {
        settings.sort_field = v;
    }
    if let Some(v) = file_cfg.sort_direction.and_then(|raw| raw.parse().ok()) {
        settings.sort_direction = v;
    }
    Ok(())
}

fn apply_overrides(settings: &mut DashboardSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("DASHBOARD_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.parse::<u32>() {
            if parsed > 0 {
                settings.page_size = parsed;
            }
        }
    }

    if let Some(v) = lookup("APP__SORT_FIELD") {
        settings.sort_field = v;
    }

    if let Some(v) = lookup("APP__SORT_DIRECTION") {
        if let Ok(parsed) = v.parse::<SortDirection>() {
            settings.sort_direction = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
