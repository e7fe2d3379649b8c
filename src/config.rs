//! Engine configuration, loadable from JSON.
use crate::error::{ErrorKind, PublishError};
use gridpress_layout::GridSettings;
use gridpress_style::{Margins, PageSize};
use gridpress_types::Size;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One centimetre in points.
const CM: f64 = 72.0 / 2.54;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base name of the aux file (`<jobname>-aux.xml`).
    pub jobname: String,
    pub aux_dir: PathBuf,
    pub write_aux: bool,
    pub page_size: PageSize,
    pub margins: Margins,
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap_x: f64,
    pub gap_y: f64,
    pub font_size: f64,
    pub leading: f64,
    /// Advance of one glyph as a fraction of the font size.
    pub glyph_advance: f64,
    pub search_paths: Vec<PathBuf>,
    /// An unresolved `sd:pagenumber()` fails the run instead of yielding `??`.
    pub strict_references: bool,
    pub ignore_version: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            jobname: "gridpress".to_string(),
            aux_dir: PathBuf::from("."),
            write_aux: true,
            page_size: PageSize::A4,
            margins: Margins::all(CM),
            cell_width: CM,
            cell_height: CM,
            gap_x: 0.0,
            gap_y: 0.0,
            font_size: 10.0,
            leading: 12.0,
            glyph_advance: 0.5,
            search_paths: vec![PathBuf::from(".")],
            strict_references: true,
            ignore_version: false,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, PublishError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PublishError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            ErrorKind::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Rejects values that would make layout impossible.
    pub fn validate(&self) -> Result<(), PublishError> {
        let positive = [
            ("cell_width", self.cell_width),
            ("cell_height", self.cell_height),
            ("font_size", self.font_size),
            ("leading", self.leading),
            ("glyph_advance", self.glyph_advance),
        ];
        for (name, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(ErrorKind::Config(format!("{} must be positive, got {}", name, value)).into());
            }
        }
        if self.gap_x < 0.0 || self.gap_y < 0.0 {
            return Err(ErrorKind::Config("grid gaps must not be negative".into()).into());
        }
        if self.jobname.trim().is_empty() {
            return Err(ErrorKind::Config("jobname must not be empty".into()).into());
        }
        Ok(())
    }

    pub fn page_dimensions(&self) -> Size {
        let (width, height) = self.page_size.dimensions_pt();
        Size::new(width, height)
    }

    pub fn grid_settings(&self) -> GridSettings {
        GridSettings {
            cell_width: self.cell_width,
            cell_height: self.cell_height,
            gap_x: self.gap_x,
            gap_y: self.gap_y,
            columns: None,
            rows: None,
        }
    }

    pub fn aux_file(&self) -> PathBuf {
        gridpress_xref::aux_path(&self.aux_dir, &self.jobname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(
            r#"{ "jobname": "catalog", "page_size": "letter", "gap_x": 2.0, "strict_references": false }"#,
        )
        .unwrap();
        assert_eq!(config.jobname, "catalog");
        assert_eq!(config.page_dimensions(), Size::new(612.0, 792.0));
        assert_eq!(config.grid_settings().gap_x, 2.0);
        assert!(!config.strict_references);
        assert_eq!(config.font_size, 10.0);
        assert!(config.aux_file().ends_with("catalog-aux.xml"));
    }

    #[test]
    fn test_custom_page_size() {
        let config =
            EngineConfig::from_json(r#"{ "page_size": { "custom": { "width": 200.0, "height": 100.0 } } }"#)
                .unwrap();
        assert_eq!(config.page_dimensions(), Size::new(200.0, 100.0));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = EngineConfig::from_json(r#"{ "cell_width": 0 }"#).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Config(_)));
        assert!(EngineConfig::from_json(r#"{ "jobname": " " }"#).is_err());
        assert!(EngineConfig::from_json("{ not json").is_err());
    }
}
