//! Curve-family requests: a named function type plus numeric parameters.
//!
//! This is the constrained replacement for the old "send code for the
//! function you want" contract: the caller picks a family from a fixed set
//! and the parameters are typed, defaulted and validated here.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::{ChartSpec, RenderError, Series, SeriesKind};

const MAX_SAMPLES: u32 = 4096;
const MIN_SAMPLES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Line,
    Quadratic,
    Cubic,
    Sqrt,
    Abs,
    Sine,
    Cosine,
    Tangent,
    Exponential,
    Logarithm,
}

impl FromStr for FunctionKind {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "line" | "linear" => Ok(Self::Line),
            "quadratic" => Ok(Self::Quadratic),
            "cubic" => Ok(Self::Cubic),
            "sqrt" => Ok(Self::Sqrt),
            "abs" => Ok(Self::Abs),
            "sine" | "sin" => Ok(Self::Sine),
            "cosine" | "cos" => Ok(Self::Cosine),
            "tangent" | "tan" => Ok(Self::Tangent),
            "exponential" | "exp" => Ok(Self::Exponential),
            "logarithm" | "log" => Ok(Self::Logarithm),
            other => Err(RenderError::Invalid(format!(
                "unknown function type '{other}'"
            ))),
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Line => "line",
            Self::Quadratic => "quadratic",
            Self::Cubic => "cubic",
            Self::Sqrt => "sqrt",
            Self::Abs => "abs",
            Self::Sine => "sine",
            Self::Cosine => "cosine",
            Self::Tangent => "tangent",
            Self::Exponential => "exponential",
            Self::Logarithm => "logarithm",
        };
        f.write_str(name)
    }
}

/// Parameters applied as `y = amplitude * f(frequency * x + phase) + offset`,
/// sampled uniformly over `[x_min, x_max]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionParams {
    #[serde(default = "one")]
    pub amplitude: f64,
    #[serde(default = "one")]
    pub frequency: f64,
    #[serde(default)]
    pub phase: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default = "default_x_min")]
    pub x_min: f64,
    #[serde(default = "default_x_max")]
    pub x_max: f64,
    #[serde(default = "default_samples")]
    pub samples: u32,
}

fn one() -> f64 {
    1.0
}

fn default_x_min() -> f64 {
    -10.0
}

fn default_x_max() -> f64 {
    10.0
}

fn default_samples() -> u32 {
    200
}

impl Default for FunctionParams {
    fn default() -> Self {
        Self {
            amplitude: one(),
            frequency: one(),
            phase: 0.0,
            offset: 0.0,
            x_min: default_x_min(),
            x_max: default_x_max(),
            samples: default_samples(),
        }
    }
}

impl FunctionParams {
    fn validate(&self) -> Result<(), RenderError> {
        let values = [
            self.amplitude,
            self.frequency,
            self.phase,
            self.offset,
            self.x_min,
            self.x_max,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(RenderError::Invalid(
                "function parameters must be finite numbers".into(),
            ));
        }
        if self.x_min >= self.x_max {
            return Err(RenderError::Invalid(format!(
                "empty sample range: xMin {} >= xMax {}",
                self.x_min, self.x_max
            )));
        }
        Ok(())
    }
}

/// Build a renderable chart for a curve family. Samples where the function
/// is undefined or overflows (log of a non-positive, tangent poles) are
/// dropped; a curve with no finite samples at all is an error.
pub fn chart_for(kind: FunctionKind, params: &FunctionParams) -> Result<ChartSpec, RenderError> {
    params.validate()?;
    let samples = params.samples.clamp(MIN_SAMPLES, MAX_SAMPLES);

    let span = params.x_max - params.x_min;
    let mut points = Vec::with_capacity(samples as usize);
    for i in 0..samples {
        let x = params.x_min + span * i as f64 / (samples - 1) as f64;
        let t = params.frequency * x + params.phase;
        let base = match kind {
            FunctionKind::Line => t,
            FunctionKind::Quadratic => t * t,
            FunctionKind::Cubic => t * t * t,
            FunctionKind::Sqrt => t.sqrt(),
            FunctionKind::Abs => t.abs(),
            FunctionKind::Sine => t.sin(),
            FunctionKind::Cosine => t.cos(),
            FunctionKind::Tangent => t.tan(),
            FunctionKind::Exponential => t.exp(),
            FunctionKind::Logarithm => t.ln(),
        };
        let y = params.amplitude * base + params.offset;
        if y.is_finite() {
            points.push((x, y));
        }
    }

    if points.is_empty() {
        return Err(RenderError::Invalid(format!(
            "{kind} has no finite values over [{}, {}]",
            params.x_min, params.x_max
        )));
    }

    Ok(ChartSpec {
        title: Some(kind.to_string()),
        x_label: Some("x".into()),
        y_label: Some("y".into()),
        width: None,
        height: None,
        grid: true,
        series: vec![Series {
            name: Some(kind.to_string()),
            kind: SeriesKind::Line,
            color: None,
            points,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds_case_insensitively() {
        assert_eq!("sine".parse::<FunctionKind>().unwrap(), FunctionKind::Sine);
        assert_eq!("Cos".parse::<FunctionKind>().unwrap(), FunctionKind::Cosine);
        assert_eq!("EXP".parse::<FunctionKind>().unwrap(), FunctionKind::Exponential);
    }

    #[test]
    fn unknown_kind_is_reported_by_name() {
        let err = "polynomial".parse::<FunctionKind>().unwrap_err();
        assert!(err.to_string().contains("unknown function type 'polynomial'"));
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let p: FunctionParams = serde_json::from_str(r#"{"amplitude": 2.5}"#).unwrap();
        assert_eq!(p.amplitude, 2.5);
        assert_eq!(p.frequency, 1.0);
        assert_eq!(p.samples, 200);
        assert_eq!((p.x_min, p.x_max), (-10.0, 10.0));
    }

    #[test]
    fn sine_applies_amplitude_and_offset() {
        let params = FunctionParams {
            amplitude: 3.0,
            offset: 1.0,
            x_min: 0.0,
            x_max: std::f64::consts::PI,
            samples: 3,
            ..FunctionParams::default()
        };
        let spec = chart_for(FunctionKind::Sine, &params).unwrap();
        let points = &spec.series[0].points;
        // Samples at 0, pi/2, pi.
        assert!((points[0].1 - 1.0).abs() < 1e-9);
        assert!((points[1].1 - 4.0).abs() < 1e-9);
        assert!((points[2].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sqrt_drops_negative_domain() {
        let params = FunctionParams {
            x_min: -4.0,
            x_max: 4.0,
            samples: 9,
            ..FunctionParams::default()
        };
        let spec = chart_for(FunctionKind::Sqrt, &params).unwrap();
        // Samples land on integers -4..=4; only 0..=4 are defined.
        assert_eq!(spec.series[0].points.len(), 5);
        assert!(spec.series[0].points.iter().all(|&(x, _)| x >= 0.0));
    }

    #[test]
    fn logarithm_over_negative_range_is_an_error() {
        let params = FunctionParams {
            x_min: -10.0,
            x_max: -1.0,
            ..FunctionParams::default()
        };
        let err = chart_for(FunctionKind::Logarithm, &params).unwrap_err();
        assert!(err.to_string().contains("no finite values"));
    }

    #[test]
    fn empty_range_is_an_error() {
        let params = FunctionParams {
            x_min: 1.0,
            x_max: 1.0,
            ..FunctionParams::default()
        };
        assert!(chart_for(FunctionKind::Sine, &params).is_err());
    }

    #[test]
    fn sample_count_is_clamped() {
        let params = FunctionParams {
            samples: 1_000_000,
            ..FunctionParams::default()
        };
        let spec = chart_for(FunctionKind::Line, &params).unwrap();
        assert_eq!(spec.series[0].points.len(), MAX_SAMPLES as usize);
    }
}
