use serde::{Deserialize, Serialize};

use crate::core::LayoutMetrics;
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, FontSpec};

pub const CONFIGURATION_JSON_SCHEMA_V1: u32 = 1;

/// Palette shared by the bundled plugins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub up_color: Color,
    pub down_color: Color,
    pub caption_color: Color,
    pub grid_color: Color,
    pub background_color: Color,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            up_color: Color::from_hex(0x2dbd85),
            down_color: Color::from_hex(0xf6465d),
            caption_color: Color::from_hex(0x8a8f99),
            grid_color: Color::rgba(0.5, 0.5, 0.5, 0.15),
            background_color: Color::from_hex(0x10131a),
        }
    }
}

impl ChartStyle {
    pub fn validate(self) -> ChartResult<Self> {
        for color in [
            self.up_color,
            self.down_color,
            self.caption_color,
            self.grid_color,
            self.background_color,
        ] {
            color
                .validate()
                .map_err(|err| ChartError::InvalidConfiguration(err.to_string()))?;
        }
        Ok(self)
    }
}

/// Immutable per-chart settings shared by every plugin.
///
/// This type is serializable so hosts can keep chart setup next to their
/// own settings without inventing an ad-hoc format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfiguration {
    #[serde(default = "default_bar_width")]
    pub bar_width: f64,
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    #[serde(default = "default_shadow_line_width")]
    pub shadow_line_width: f64,
    #[serde(default)]
    pub caption_font: FontSpec,
    #[serde(default)]
    pub style: ChartStyle,
    /// Physical pixels per logical point.
    #[serde(default = "default_pixel_scale")]
    pub pixel_scale: f64,
    /// Minimum rendered height of a bar body, in points.
    #[serde(default = "default_min_bar_height")]
    pub min_bar_height: f64,
    #[serde(default = "default_min_horizontal_grid_pitch")]
    pub min_horizontal_grid_pitch: f64,
    #[serde(default = "default_min_vertical_grid_pitch")]
    pub min_vertical_grid_pitch: f64,
    /// Decimals used by the default value formatter.
    #[serde(default = "default_price_precision")]
    pub price_precision: u8,
}

impl Default for ChartConfiguration {
    fn default() -> Self {
        Self {
            bar_width: default_bar_width(),
            spacing: default_spacing(),
            shadow_line_width: default_shadow_line_width(),
            caption_font: FontSpec::default(),
            style: ChartStyle::default(),
            pixel_scale: default_pixel_scale(),
            min_bar_height: default_min_bar_height(),
            min_horizontal_grid_pitch: default_min_horizontal_grid_pitch(),
            min_vertical_grid_pitch: default_min_vertical_grid_pitch(),
            price_precision: default_price_precision(),
        }
    }
}

impl ChartConfiguration {
    /// Sets bar width and inter-bar spacing.
    #[must_use]
    pub fn with_bar_geometry(mut self, bar_width: f64, spacing: f64) -> Self {
        self.bar_width = bar_width;
        self.spacing = spacing;
        self
    }

    #[must_use]
    pub fn with_shadow_line_width(mut self, width: f64) -> Self {
        self.shadow_line_width = width;
        self
    }

    #[must_use]
    pub fn with_pixel_scale(mut self, pixel_scale: f64) -> Self {
        self.pixel_scale = pixel_scale;
        self
    }

    #[must_use]
    pub fn with_min_bar_height(mut self, min_bar_height: f64) -> Self {
        self.min_bar_height = min_bar_height;
        self
    }

    #[must_use]
    pub fn with_caption_font(mut self, font: FontSpec) -> Self {
        self.caption_font = font;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_grid_pitch(mut self, horizontal: f64, vertical: f64) -> Self {
        self.min_horizontal_grid_pitch = horizontal;
        self.min_vertical_grid_pitch = vertical;
        self
    }

    #[must_use]
    pub fn with_price_precision(mut self, precision: u8) -> Self {
        self.price_precision = precision;
        self
    }

    #[must_use]
    pub fn bar_pitch(&self) -> f64 {
        self.bar_width + self.spacing
    }

    #[must_use]
    pub fn layout_metrics(&self) -> LayoutMetrics {
        LayoutMetrics {
            bar_width: self.bar_width,
            spacing: self.spacing,
            min_horizontal_grid_pitch: self.min_horizontal_grid_pitch,
            min_vertical_grid_pitch: self.min_vertical_grid_pitch,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.layout_metrics().validate()?;
        for (value, name) in [
            (self.shadow_line_width, "shadow_line_width"),
            (self.pixel_scale, "pixel_scale"),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidConfiguration(format!(
                    "`{name}` must be finite and > 0"
                )));
            }
        }
        if !self.min_bar_height.is_finite() || self.min_bar_height < 0.0 {
            return Err(ChartError::InvalidConfiguration(
                "`min_bar_height` must be finite and >= 0".to_owned(),
            ));
        }
        if self.shadow_line_width > self.bar_width {
            return Err(ChartError::InvalidConfiguration(
                "`shadow_line_width` must not exceed `bar_width`".to_owned(),
            ));
        }
        if self.price_precision > 12 {
            return Err(ChartError::InvalidConfiguration(
                "`price_precision` must be <= 12".to_owned(),
            ));
        }
        self.caption_font
            .validate()
            .map_err(|err| ChartError::InvalidConfiguration(err.to_string()))?;
        self.style.validate()?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        let payload = ConfigurationJsonContractV1 {
            schema_version: CONFIGURATION_JSON_SCHEMA_V1,
            configuration: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidConfiguration(format!("failed to serialize configuration: {e}"))
        })
    }

    /// Parses either a bare configuration object or a versioned payload,
    /// then validates it.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let value: serde_json::Value = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidConfiguration(format!("failed to parse configuration json: {e}"))
        })?;
        let versioned = value
            .as_object()
            .is_some_and(|object| object.contains_key("schema_version"));
        let configuration = if versioned {
            let payload: ConfigurationJsonContractV1 =
                serde_json::from_value(value).map_err(|e| {
                    ChartError::InvalidConfiguration(format!(
                        "failed to parse versioned configuration: {e}"
                    ))
                })?;
            if payload.schema_version != CONFIGURATION_JSON_SCHEMA_V1 {
                return Err(ChartError::InvalidConfiguration(format!(
                    "unsupported configuration schema version: {}",
                    payload.schema_version
                )));
            }
            payload.configuration
        } else {
            serde_json::from_value(value).map_err(|e| {
                ChartError::InvalidConfiguration(format!("failed to parse configuration: {e}"))
            })?
        };
        configuration.validate()?;
        Ok(configuration)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ConfigurationJsonContractV1 {
    schema_version: u32,
    configuration: ChartConfiguration,
}

fn default_bar_width() -> f64 {
    6.0
}

fn default_spacing() -> f64 {
    2.0
}

fn default_shadow_line_width() -> f64 {
    1.0
}

fn default_pixel_scale() -> f64 {
    1.0
}

fn default_min_bar_height() -> f64 {
    1.0
}

fn default_min_horizontal_grid_pitch() -> f64 {
    80.0
}

fn default_min_vertical_grid_pitch() -> f64 {
    40.0
}

fn default_price_precision() -> u8 {
    2
}
