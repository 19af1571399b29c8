//! Chart descriptor model: the declarative request a client may ask us to draw.
//!
//! A descriptor arrives as JSON text in the request's `code` field, is parsed
//! into [`ChartSpec`] and handed to [`render::render`]. Nothing here executes
//! caller logic; unknown shapes fail with a textual error.

pub mod encode;
pub mod font;
pub mod function;
pub mod render;

pub use render::render;

use serde::Deserialize;
use thiserror::Error;

/// Canvas size limits. Requested dimensions are clamped, the same way the
/// pack's image renderers clamp client-controlled widths.
const MIN_WIDTH: u32 = 160;
const MAX_WIDTH: u32 = 2048;
const MIN_HEIGHT: u32 = 120;
const MAX_HEIGHT: u32 = 2048;

const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;

/// Failure while turning a descriptor into an image.
///
/// Only the `Display` text crosses the service boundary; internal error
/// objects stay inside the process.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid chart descriptor: {0}")]
    Parse(String),
    #[error("{0}")]
    Invalid(String),
    #[error("png encoding failed: {0}")]
    Encode(String),
}

/// A complete chart description.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x_label: Option<String>,
    #[serde(default)]
    pub y_label: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default = "default_grid")]
    pub grid: bool,
    pub series: Vec<Series>,
}

fn default_grid() -> bool {
    true
}

/// One data series and how to draw it.
#[derive(Debug, Clone, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: SeriesKind,
    /// Optional `#rrggbb` override; defaults to the palette cycle.
    #[serde(default)]
    pub color: Option<String>,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    #[default]
    Line,
    Scatter,
    Bars,
}

impl ChartSpec {
    /// Parse and validate the JSON text of a `code` field.
    pub fn parse(code: &str) -> Result<Self, RenderError> {
        let spec: ChartSpec =
            serde_json::from_str(code).map_err(|e| RenderError::Parse(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.series.is_empty() {
            return Err(RenderError::Invalid("descriptor contains no series".into()));
        }
        for (i, series) in self.series.iter().enumerate() {
            let label = series
                .name
                .clone()
                .unwrap_or_else(|| format!("series {}", i + 1));
            if series.points.is_empty() {
                return Err(RenderError::Invalid(format!("{label} has no points")));
            }
            if series
                .points
                .iter()
                .any(|(x, y)| !x.is_finite() || !y.is_finite())
            {
                return Err(RenderError::Invalid(format!(
                    "{label} contains a non-finite point"
                )));
            }
            if let Some(color) = &series.color {
                parse_color(color)?;
            }
        }
        Ok(())
    }

    /// Canvas size, clamped to the supported range.
    pub fn dimensions(&self) -> (u32, u32) {
        let w = self.width.unwrap_or(DEFAULT_WIDTH).clamp(MIN_WIDTH, MAX_WIDTH);
        let h = self
            .height
            .unwrap_or(DEFAULT_HEIGHT)
            .clamp(MIN_HEIGHT, MAX_HEIGHT);
        (w, h)
    }
}

/// Parse a `#rrggbb` color string.
pub(crate) fn parse_color(s: &str) -> Result<[u8; 3], RenderError> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RenderError::Invalid(format!(
            "invalid color '{s}' (expected #rrggbb)"
        )));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
    Ok([channel(0), channel(2), channel(4)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_descriptor() {
        let spec = ChartSpec::parse(
            r##"{
                "title": "Speed over time",
                "xLabel": "t",
                "yLabel": "v",
                "series": [
                    {"name": "run 1", "kind": "scatter", "color": "#d62728",
                     "points": [[0, 1], [1, 2.5]]}
                ]
            }"##,
        )
        .unwrap();
        assert_eq!(spec.title.as_deref(), Some("Speed over time"));
        assert_eq!(spec.x_label.as_deref(), Some("t"));
        assert_eq!(spec.series.len(), 1);
        assert_eq!(spec.series[0].kind, SeriesKind::Scatter);
        assert!(spec.grid);
    }

    #[test]
    fn kind_defaults_to_line() {
        let spec = ChartSpec::parse(r#"{"series": [{"points": [[0, 0]]}]}"#).unwrap();
        assert_eq!(spec.series[0].kind, SeriesKind::Line);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = ChartSpec::parse("plt.plot([1,2,3])").unwrap_err();
        assert!(matches!(err, RenderError::Parse(_)));
    }

    #[test]
    fn rejects_unknown_series_kind() {
        let err =
            ChartSpec::parse(r#"{"series": [{"kind": "pie", "points": [[0, 0]]}]}"#).unwrap_err();
        assert!(err.to_string().contains("pie"));
    }

    #[test]
    fn rejects_empty_series_list() {
        let err = ChartSpec::parse(r#"{"series": []}"#).unwrap_err();
        assert!(err.to_string().contains("no series"));
    }

    #[test]
    fn rejects_series_without_points() {
        let err = ChartSpec::parse(r#"{"series": [{"name": "empty", "points": []}]}"#).unwrap_err();
        assert!(err.to_string().contains("empty has no points"));
    }

    #[test]
    fn rejects_bad_color() {
        let err = ChartSpec::parse(
            r#"{"series": [{"color": "red", "points": [[0, 0]]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected #rrggbb"));
    }

    #[test]
    fn color_parses_hex() {
        assert_eq!(parse_color("#1f77b4").unwrap(), [0x1f, 0x77, 0xb4]);
        assert_eq!(parse_color("ff0000").unwrap(), [255, 0, 0]);
    }

    #[test]
    fn dimensions_are_clamped() {
        let mut spec = ChartSpec::parse(r#"{"series": [{"points": [[0, 0]]}]}"#).unwrap();
        assert_eq!(spec.dimensions(), (640, 480));
        spec.width = Some(10);
        spec.height = Some(1_000_000);
        assert_eq!(spec.dimensions(), (160, 2048));
    }
}
