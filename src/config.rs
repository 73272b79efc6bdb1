//! Layout tunables and their JSON form (camelCase keys, all optional).

use crate::measure::TableMetrics;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const DEFAULT_PALETTE: [&str; 8] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#06b6d4", "#84cc16",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub metrics: TableMetrics,
    /// Offset of the first group from the canvas origin.
    pub canvas_margin: f64,
    /// Inner padding between a group border and its tables.
    pub group_padding: f64,
    pub group_gap_x: f64,
    pub group_gap_y: f64,
    pub min_group_width: f64,
    pub min_group_height: f64,
    pub small_group_max_tables: usize,
    pub small_group_padding: f64,
    pub medium_group_max_tables: usize,
    pub grid_cell_padding: f64,
    pub area_padding_factor: f64,
    /// Width / height of area-sized groups.
    pub group_aspect_ratio: f64,
    pub circular_max_tables: usize,
    pub circular_radius_divisor: f64,
    pub isolated_table_gap: f64,
    pub merge_isolated: bool,
    pub isolated_group_label: String,
    pub palette: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            metrics: TableMetrics::default(),
            canvas_margin: 50.0,
            group_padding: 60.0,
            group_gap_x: 120.0,
            group_gap_y: 120.0,
            min_group_width: 500.0,
            min_group_height: 400.0,
            small_group_max_tables: 4,
            small_group_padding: 200.0,
            medium_group_max_tables: 10,
            grid_cell_padding: 80.0,
            area_padding_factor: 2.5,
            group_aspect_ratio: 4.0 / 3.0,
            circular_max_tables: 8,
            circular_radius_divisor: 2.5,
            isolated_table_gap: 40.0,
            merge_isolated: true,
            isolated_group_label: "Isolated Tables".to_string(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl LayoutConfig {
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: LayoutConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.metrics;
        let positive = [
            ("metrics.tableWidth", m.table_width),
            ("metrics.headerHeight", m.header_height),
            ("metrics.rowHeight", m.row_height),
            ("metrics.charWidth", m.char_width),
            ("minGroupWidth", self.min_group_width),
            ("minGroupHeight", self.min_group_height),
            ("areaPaddingFactor", self.area_padding_factor),
            ("groupAspectRatio", self.group_aspect_ratio),
            ("circularRadiusDivisor", self.circular_radius_divisor),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(ConfigError::Invalid(format!("{} must be positive", name)));
        }
        let non_negative = [
            ("metrics.paddingX", m.padding_x),
            ("canvasMargin", self.canvas_margin),
            ("groupPadding", self.group_padding),
            ("groupGapX", self.group_gap_x),
            ("groupGapY", self.group_gap_y),
            ("smallGroupPadding", self.small_group_padding),
            ("gridCellPadding", self.grid_cell_padding),
            ("isolatedTableGap", self.isolated_table_gap),
        ];
        if let Some((name, _)) = non_negative.iter().find(|(_, v)| !(*v >= 0.0)) {
            return Err(ConfigError::Invalid(format!("{} must not be negative", name)));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::Invalid("palette must not be empty".to_string()));
        }
        if self.circular_max_tables < 2 {
            return Err(ConfigError::Invalid(
                "circularMaxTables must be at least 2".to_string(),
            ));
        }
        if self.medium_group_max_tables < self.small_group_max_tables {
            return Err(ConfigError::Invalid(
                "mediumGroupMaxTables must not be below smallGroupMaxTables".to_string(),
            ));
        }
        Ok(())
    }

    /// Palette entry for `index`, wrapping around. An empty palette falls
    /// back to the built-in colors.
    pub fn color(&self, index: usize) -> &str {
        match self.palette.len() {
            0 => DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()],
            len => &self.palette[index % len],
        }
    }
}

/// Load a config file, falling back to defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<LayoutConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    LayoutConfig::from_json(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            LayoutConfig::from_json(r#"{"groupGapX": 10, "metrics": {"rowHeight": 30}}"#).unwrap();

        assert_eq!(config.group_gap_x, 10.0);
        assert_eq!(config.metrics.row_height, 30.0);
        assert_eq!(config.metrics.table_width, 250.0);
        assert_eq!(config.circular_max_tables, 8);
    }

    #[test]
    fn test_rejects_empty_palette() {
        let err = LayoutConfig::from_json(r#"{"palette": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_non_positive_metric() {
        let err = LayoutConfig::from_json(r#"{"metrics": {"tableWidth": 0}}"#).unwrap_err();
        assert!(err.to_string().contains("metrics.tableWidth"));
    }

    #[test]
    fn test_rejects_negative_gap() {
        let err = LayoutConfig::from_json(r#"{"groupGapX": -1000, "mergeIsolated": false}"#)
            .unwrap_err();
        assert!(err.to_string().contains("groupGapX"));

        for key in ["canvasMargin", "groupPadding", "groupGapY", "isolatedTableGap", "gridCellPadding"] {
            let json = format!(r#"{{"{}": -1}}"#, key);
            assert!(LayoutConfig::from_json(&json).is_err(), "{} accepted", key);
        }
        assert!(LayoutConfig::from_json(r#"{"groupGapX": 0}"#).is_ok());
    }

    #[test]
    fn test_empty_palette_color_falls_back() {
        let config = LayoutConfig {
            palette: Vec::new(),
            ..LayoutConfig::default()
        };
        assert_eq!(config.color(0), DEFAULT_PALETTE[0]);
        assert_eq!(config.color(9), DEFAULT_PALETTE[1]);
    }

    #[test]
    fn test_color_cycles() {
        let config = LayoutConfig::default();
        assert_eq!(config.color(0), config.color(config.palette.len()));
    }

    #[test]
    fn test_load_without_path() {
        assert_eq!(load_config(None).unwrap(), LayoutConfig::default());
    }
}
