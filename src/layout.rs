use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::debug::DebugLogger;
use crate::error::PriceListError;
use crate::types::{Margins, Pt, Rect, Size};

/// Print layout constants. Lengths are millimetres, font sizes points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_top_mm: f32,
    pub margin_right_mm: f32,
    pub margin_bottom_mm: f32,
    pub margin_left_mm: f32,
    /// Data columns per grid segment before the table wraps.
    pub columns_per_line: usize,
    pub header_column_width_mm: f32,
    pub column_width_mm: f32,
    pub row_height_mm: f32,
    pub title_height_mm: f32,
    pub label_height_mm: f32,
    /// Vertical space reserved before every block except the first on a page.
    pub block_gap_mm: f32,
    pub title_font_size: f32,
    pub label_font_size: f32,
    pub cell_font_size: f32,
    pub banner: Option<BannerConfig>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_top_mm: 10.0,
            margin_right_mm: 10.0,
            margin_bottom_mm: 7.0,
            margin_left_mm: 10.0,
            columns_per_line: 13,
            header_column_width_mm: 16.0,
            column_width_mm: 13.0,
            row_height_mm: 7.0,
            title_height_mm: 10.0,
            label_height_mm: 7.0,
            block_gap_mm: 2.0,
            title_font_size: 14.0,
            label_font_size: 11.0,
            cell_font_size: 9.0,
            banner: None,
        }
    }
}

/// Letterhead drawn at the top of every page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    pub title: String,
    pub contact_lines: Vec<String>,
    /// Asset name of the logo image, if any.
    pub logo: Option<String>,
    pub height_mm: f32,
    pub logo_width_mm: f32,
    pub title_font_size: f32,
    pub contact_font_size: f32,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            contact_lines: Vec::new(),
            logo: None,
            height_mm: 25.0,
            logo_width_mm: 22.0,
            title_font_size: 18.0,
            contact_font_size: 9.0,
        }
    }
}

impl LayoutConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, PriceListError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_string(&self) -> Result<String, PriceListError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PriceListError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// A missing file yields the defaults; a malformed one is still an error.
    pub(crate) fn load_or_default(
        path: &Path,
        debug: Option<&DebugLogger>,
    ) -> Result<Self, PriceListError> {
        if !path.exists() {
            if let Some(logger) = debug {
                logger.log_event(
                    "layout.fallback",
                    json!({
                        "path": path.display().to_string(),
                        "reason": "missing",
                    }),
                );
                logger.increment("layout.fallback", 1);
            }
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn page_size(&self) -> Size {
        Size::from_mm(self.page_width_mm, self.page_height_mm)
    }

    pub fn margins(&self) -> Margins {
        Margins::from_mm(
            self.margin_top_mm,
            self.margin_right_mm,
            self.margin_bottom_mm,
            self.margin_left_mm,
        )
    }

    pub fn header_column_width(&self) -> Pt {
        Pt::from_mm(self.header_column_width_mm)
    }

    pub fn column_width(&self) -> Pt {
        Pt::from_mm(self.column_width_mm)
    }

    pub fn row_height(&self) -> Pt {
        Pt::from_mm(self.row_height_mm)
    }

    pub fn block_gap(&self) -> Pt {
        Pt::from_mm(self.block_gap_mm)
    }

    /// Width of a full segment: header column plus `columns_per_line` data columns.
    pub fn segment_width(&self) -> Pt {
        self.header_column_width() + self.column_width() * self.columns_per_line as i32
    }

    pub(crate) fn validate(&self, content: Rect) -> Result<(), PriceListError> {
        if self.columns_per_line == 0 {
            return Err(PriceListError::InvalidConfiguration(
                "columns_per_line must be at least 1".to_string(),
            ));
        }
        let lengths = [
            ("header_column_width_mm", self.header_column_width_mm),
            ("column_width_mm", self.column_width_mm),
            ("row_height_mm", self.row_height_mm),
            ("title_height_mm", self.title_height_mm),
            ("label_height_mm", self.label_height_mm),
            ("title_font_size", self.title_font_size),
            ("label_font_size", self.label_font_size),
            ("cell_font_size", self.cell_font_size),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value <= 0.0 {
                return Err(PriceListError::InvalidConfiguration(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !self.block_gap_mm.is_finite() || self.block_gap_mm < 0.0 {
            return Err(PriceListError::InvalidConfiguration(format!(
                "block_gap_mm must not be negative, got {}",
                self.block_gap_mm
            )));
        }
        if content.width <= Pt::ZERO || content.height <= Pt::ZERO {
            return Err(PriceListError::InvalidConfiguration(
                "margins leave no content area".to_string(),
            ));
        }
        let needed = self.segment_width();
        if needed > content.width {
            return Err(PriceListError::InvalidConfiguration(format!(
                "{} columns of {}mm plus a {}mm header need {:.1}mm, content width is {:.1}mm",
                self.columns_per_line,
                self.column_width_mm,
                self.header_column_width_mm,
                needed.to_mm(),
                content.width.to_mm()
            )));
        }
        if let Some(banner) = &self.banner {
            if !banner.height_mm.is_finite() || banner.height_mm < 0.0 {
                return Err(PriceListError::InvalidConfiguration(
                    "banner height must not be negative".to_string(),
                ));
            }
            if Pt::from_mm(banner.height_mm) >= content.height {
                return Err(PriceListError::InvalidConfiguration(
                    "banner leaves no room for content".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::tests::{read_lines, temp_log_path};

    #[test]
    fn defaults_fit_a4() {
        let layout = LayoutConfig::default();
        let content = layout.margins().content_rect(layout.page_size());
        layout.validate(content).expect("defaults valid");
        assert!((content.height.to_mm() - 280.0).abs() < 0.01);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let layout = LayoutConfig::from_json_str(
            r#"{"columns_per_line": 10, "banner": {"title": "Tailors"}}"#,
        )
        .expect("parse");
        assert_eq!(layout.columns_per_line, 10);
        assert_eq!(layout.column_width_mm, 13.0);
        let banner = layout.banner.expect("banner");
        assert_eq!(banner.title, "Tailors");
        assert_eq!(banner.height_mm, 25.0);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = match LayoutConfig::from_json_str("{\"columns_per_line\": \"many\"}") {
            Ok(_) => panic!("expected error"),
            Err(err) => err,
        };
        assert!(matches!(err, PriceListError::Config(_)));
    }

    #[test]
    fn too_wide_layout_is_rejected() {
        let layout = LayoutConfig {
            columns_per_line: 20,
            ..LayoutConfig::default()
        };
        let content = layout.margins().content_rect(layout.page_size());
        let err = match layout.validate(content) {
            Ok(_) => panic!("expected error"),
            Err(err) => err,
        };
        assert!(matches!(err, PriceListError::InvalidConfiguration(_)));
    }

    #[test]
    fn missing_file_falls_back_and_logs() {
        let log_path = temp_log_path("layout_fallback");
        let logger = DebugLogger::new(&log_path).expect("logger");
        let missing = std::env::temp_dir().join("pricelist_no_such_layout.json");
        let layout =
            LayoutConfig::load_or_default(&missing, Some(&logger)).expect("fallback");
        assert_eq!(layout, LayoutConfig::default());
        logger.flush();
        let lines = read_lines(&log_path);
        assert_eq!(lines[0]["type"], "layout.fallback");
        assert_eq!(lines[0]["reason"], "missing");
    }

    #[test]
    fn existing_file_is_loaded() {
        let path = temp_log_path("layout_file");
        let layout = LayoutConfig {
            block_gap_mm: 0.0,
            ..LayoutConfig::default()
        };
        std::fs::write(&path, layout.to_json_string().expect("json")).expect("write");
        let loaded = LayoutConfig::load_or_default(&path, None).expect("load");
        assert_eq!(loaded, layout);
    }
}
