// Rate selector configuration: the preset list, custom slider range, label
// formatting and the optional custom-rate hook. `RateSettings` is the raw
// `[playback_rate]` table from config.toml; `RateConfig` is what a controller
// is bound with and never changes for the lifetime of one binding.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::normalize::DEFAULT_PLAYBACK_RATE;

pub const DEFAULT_RATE_SUFFIX: &str = "x";
pub const DEFAULT_CUSTOM_RANGE_LABEL: &str = "Custom";
/// Marker some localized preset labels carry, e.g. `Personalizado(1.3x)`.
pub const DEFAULT_LABEL_MARKER: &str = "Personalizado";

pub const DEFAULT_MIN_CUSTOM_RATE: f64 = 0.5;
pub const DEFAULT_MAX_CUSTOM_RATE: f64 = 2.0;
pub const DEFAULT_CUSTOM_RATE_STEP: f64 = 0.1;

/// Formats a preset label for display on the rate button.
pub type LabelFormatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Hook invoked with every rate chosen on the custom slider. Runs
/// synchronously; an error is handed back to whoever moved the slider.
pub type CustomRangeCallback = Arc<dyn Fn(f64) -> anyhow::Result<()> + Send + Sync>;

/// One selectable speed in the preset list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatePreset {
    pub value: f64,
    pub label: String,
}

impl RatePreset {
    pub fn new(value: f64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

pub fn default_presets() -> Vec<RatePreset> {
    vec![
        RatePreset::new(0.5, "0.5x"),
        RatePreset::new(0.75, "0.75x"),
        RatePreset::new(1.0, "Normal"),
        RatePreset::new(1.5, "1.5x"),
        RatePreset::new(2.0, "2x"),
    ]
}

/// Bounds and granularity of the custom-rate slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for CustomRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_CUSTOM_RATE,
            max: DEFAULT_MAX_CUSTOM_RATE,
            step: DEFAULT_CUSTOM_RATE_STEP,
        }
    }
}

impl CustomRange {
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.step.is_finite()
            && self.min < self.max
            && self.step > 0.0
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Nearest slider position for `value`: clamped, then rounded to a whole
    /// number of steps above `min`.
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = self.clamp(value);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        round_rate(self.min + steps * self.step).min(self.max)
    }

    /// Move `steps` slider notches away from `value` (negative moves down).
    /// An off-grid `value` counts the first notch in the direction of travel
    /// as one step, so 0.75 moves to 0.8 or 0.7 on a 0.1 grid.
    pub fn step_from(&self, value: f64, steps: i32) -> f64 {
        let clamped = self.clamp(value);
        if self.step <= 0.0 {
            return clamped;
        }
        let position = round_rate((clamped - self.min) / self.step);
        let base = match steps.signum() {
            1 => position.floor(),
            -1 => position.ceil(),
            _ => position.round(),
        };
        self.snap(self.min + (base + f64::from(steps)) * self.step)
    }

    /// Slider value at `fraction` (0.0 = left edge, 1.0 = right edge).
    pub fn value_at(&self, fraction: f64) -> f64 {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.snap(self.min + fraction * (self.max - self.min))
    }

    /// How much of the slider track is filled for `rate`, in percent.
    ///
    /// Not clamped: a rate above `max` yields more than 100.
    pub fn fill_percent(&self, rate: f64) -> f64 {
        rate * 100.0 / self.max
    }
}

// Step arithmetic drifts (0.5 + 8 * 0.1 = 1.3000000000000003).
fn round_rate(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Remove `marker(` and its matching `)` from a label, keeping the text in
/// between: `Personalizado(1.3x)` becomes `1.3x`. Labels without the marker
/// are returned unchanged.
pub fn strip_marker(label: &str, marker: &str) -> String {
    if marker.is_empty() {
        return label.to_string();
    }
    let token = format!("{marker}(");
    let Some(start) = label.find(&token) else {
        return label.to_string();
    };

    let mut out = String::with_capacity(label.len());
    out.push_str(&label[..start]);
    let rest = &label[start + token.len()..];
    match rest.find(')') {
        Some(end) => {
            out.push_str(&rest[..end]);
            out.push_str(&rest[end + 1..]);
        }
        None => out.push_str(rest),
    }
    out
}

pub fn marker_formatter(marker: impl Into<String>) -> LabelFormatter {
    let marker = marker.into();
    Arc::new(move |label: &str| strip_marker(label, &marker))
}

/// Everything a [`RateController`](super::RateController) is bound with.
#[derive(Clone)]
pub struct RateConfig {
    pub presets: Vec<RatePreset>,
    pub default_value: f64,
    pub rate_suffix: String,
    pub custom_range: CustomRange,
    pub custom_range_label: String,
    pub custom_range_callback: Option<CustomRangeCallback>,
    pub label_formatter: LabelFormatter,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            presets: default_presets(),
            default_value: DEFAULT_PLAYBACK_RATE,
            rate_suffix: DEFAULT_RATE_SUFFIX.to_string(),
            custom_range: CustomRange::default(),
            custom_range_label: DEFAULT_CUSTOM_RANGE_LABEL.to_string(),
            custom_range_callback: None,
            label_formatter: marker_formatter(DEFAULT_LABEL_MARKER),
        }
    }
}

impl fmt::Debug for RateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateConfig")
            .field("presets", &self.presets)
            .field("default_value", &self.default_value)
            .field("rate_suffix", &self.rate_suffix)
            .field("custom_range", &self.custom_range)
            .field("custom_range_label", &self.custom_range_label)
            .field(
                "custom_range_callback",
                &self.custom_range_callback.as_ref().map(|_| "<fn>"),
            )
            .finish_non_exhaustive()
    }
}

impl RateConfig {
    pub fn with_custom_range_callback(mut self, callback: CustomRangeCallback) -> Self {
        self.custom_range_callback = Some(callback);
        self
    }

    pub fn with_label_formatter(mut self, formatter: LabelFormatter) -> Self {
        self.label_formatter = formatter;
        self
    }

    pub fn format_label(&self, label: &str) -> String {
        (self.label_formatter)(label)
    }

    /// A rate followed by the configured suffix, e.g. `1.25x`.
    pub fn format_rate(&self, rate: f64) -> String {
        format!("{}{}", rate, self.rate_suffix)
    }
}

/// `[playback_rate]` section of config.toml. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RateSettings {
    pub options: Option<Vec<RatePreset>>,
    pub default_value: Option<f64>,
    pub rate_suffix: Option<String>,
    pub custom_range: Option<RangeSettings>,
    /// Older spelling of `custom_range`, read when `custom_range` is absent.
    pub playback_custom_range: Option<RangeSettings>,
    pub custom_range_label: Option<String>,
    pub label_marker: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct RangeSettings {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

// Zero and NaN count as "not set", as do non-finite numbers.
fn set_number(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

fn set_text(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

impl RateSettings {
    /// Resolve the settings into a bindable config, filling gaps with defaults.
    pub fn to_rate_config(&self) -> RateConfig {
        let range = self
            .custom_range
            .or(self.playback_custom_range)
            .unwrap_or_default();
        let mut custom_range = CustomRange {
            min: set_number(range.min).unwrap_or(DEFAULT_MIN_CUSTOM_RATE),
            max: set_number(range.max).unwrap_or(DEFAULT_MAX_CUSTOM_RATE),
            step: set_number(range.step).unwrap_or(DEFAULT_CUSTOM_RATE_STEP),
        };
        if !custom_range.is_valid() {
            tracing::warn!(?custom_range, "invalid custom playback-rate range, using defaults");
            custom_range = CustomRange::default();
        }

        let marker = self
            .label_marker
            .clone()
            .unwrap_or_else(|| DEFAULT_LABEL_MARKER.to_string());

        RateConfig {
            presets: self.options.clone().unwrap_or_else(default_presets),
            default_value: set_number(self.default_value).unwrap_or(DEFAULT_PLAYBACK_RATE),
            rate_suffix: set_text(&self.rate_suffix)
                .unwrap_or_else(|| DEFAULT_RATE_SUFFIX.to_string()),
            custom_range,
            custom_range_label: set_text(&self.custom_range_label)
                .unwrap_or_else(|| DEFAULT_CUSTOM_RANGE_LABEL.to_string()),
            custom_range_callback: None,
            label_formatter: marker_formatter(marker),
        }
    }
}
