use super::defaults::{MAX_LAYOUT_BYTES, MAX_THRESHOLD, MIN_THRESHOLD};
use super::AppConfig;
use crate::calibration::CalibrationStore;
use crate::engine::{EngineConfig, PanelLayout, SelectionEngine};
use crate::region::RegionTable;
use anyhow::{anyhow, bail, Context, Result};
use std::{fs, path::Path};

impl AppConfig {
    /// Check CLI values and normalize paths.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&self.threshold) {
            bail!(
                "--threshold must be between {MIN_THRESHOLD} and {MAX_THRESHOLD}, got {}",
                self.threshold
            );
        }

        self.region_table()?;

        if self.calibration_file.as_os_str().is_empty() {
            bail!("--calibration-file must not be empty");
        }
        if self.calibration_file.is_dir() {
            bail!(
                "--calibration-file '{}' is a directory",
                self.calibration_file.display()
            );
        }

        if let Some(layout) = &mut self.layout {
            let metadata = fs::metadata(&*layout)
                .with_context(|| format!("--layout '{}' is not readable", layout.display()))?;
            if !metadata.is_file() {
                bail!("--layout '{}' is not a file", layout.display());
            }
            if metadata.len() > MAX_LAYOUT_BYTES {
                bail!("--layout file exceeds {MAX_LAYOUT_BYTES} bytes");
            }
            *layout = layout
                .canonicalize()
                .with_context(|| format!("failed to canonicalize --layout '{}'", layout.display()))?;
        }
        self.panel_layout()?;

        Ok(())
    }

    /// Region geometry for the configured radii.
    pub fn region_table(&self) -> Result<RegionTable> {
        RegionTable::with_radii(self.inner_radius, self.outer_radius)
            .context("invalid --inner-radius/--outer-radius")
    }

    /// The configured layout file, or the standard layout.
    pub fn panel_layout(&self) -> Result<PanelLayout> {
        match &self.layout {
            Some(path) => PanelLayout::load(path)
                .with_context(|| format!("invalid --layout '{}'", path.display())),
            None => Ok(PanelLayout::standard()),
        }
    }

    pub fn engine_config(&self, max_display_chars: usize) -> EngineConfig {
        EngineConfig {
            threshold: self.threshold,
            max_display_chars,
        }
    }

    pub fn selection_engine(&self, max_display_chars: usize) -> Result<SelectionEngine> {
        let layout = self.panel_layout()?;
        SelectionEngine::new(&layout, self.engine_config(max_display_chars))
            .context("panel layout rejected")
    }

    /// Open the calibration store, loading the profile when the file exists.
    pub fn calibration_store(&self) -> Result<CalibrationStore> {
        CalibrationStore::open(&self.calibration_file).with_context(|| {
            format!(
                "failed to load calibration from '{}'",
                self.calibration_file.display()
            )
        })
    }
}

/// Allow either a known binary name or an absolute path.
pub fn sanitize_binary(value: &str, flag: &str, allowlist: &[&str]) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{flag} cannot be empty");
    }
    if let Some(allowed) = allowlist
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
    {
        return Ok((*allowed).to_string());
    }

    let path = Path::new(trimmed);
    if path.is_absolute() || trimmed.contains(std::path::MAIN_SEPARATOR) {
        let canonical = path
            .canonicalize()
            .with_context(|| format!("failed to canonicalize {flag} '{trimmed}'"))?;
        let metadata = fs::metadata(&canonical)
            .with_context(|| format!("failed to inspect {flag} '{}'", canonical.display()))?;
        if !metadata.is_file() {
            bail!("{flag} '{}' is not a file", canonical.display());
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = metadata.permissions().mode();
            if mode & 0o111 == 0 {
                bail!(
                    "{flag} '{}' exists but is not executable (mode {:o})",
                    canonical.display(),
                    mode
                );
            }
        }
        return canonical
            .to_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("{flag} must be valid UTF-8"));
    }

    bail!("{flag} must be one of {allowlist:?} or an existing binary path");
}
