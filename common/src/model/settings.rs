//! Render configuration for a certificate batch.
//!
//! Clients send a [`SettingsInput`], a loose bag of user-typed values where any
//! field may be missing or garbage. [`SettingsInput::resolve`] turns it into the
//! immutable [`RenderSettings`] snapshot used for one generation run. A field
//! that is unset, unparsable or zero falls back to its documented default.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SERIAL_PREFIX: &str = "CBA";
pub const DEFAULT_START_INDEX: u64 = 0;
pub const DEFAULT_DIGIT_WIDTH: usize = 4;
pub const DEFAULT_ZIP_NAME_PREFIX: &str = "KNCCI_Certificates";

/// RGB color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };

    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Rgb {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }
}

/// Horizontal reference used when centering replacement text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CenterMode {
    /// Center inside the wipe rectangle.
    #[default]
    Region,
    /// Center on the full page width.
    Page,
}

/// Anchor point, size and color of a single text element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextPlacement {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Rgb,
}

/// Rectangle painted white before replacement text is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WipeRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A template region that is wiped and then refilled with centered text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionText {
    pub wipe: WipeRegion,
    pub baseline: f32,
    pub size: f32,
    pub color: Rgb,
    pub center: CenterMode,
}

/// Immutable configuration snapshot for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSettings {
    pub serial_prefix: String,
    pub start_index: u64,
    pub digit_width: usize,
    pub zip_name_prefix: String,
    pub serial: TextPlacement,
    pub name: TextPlacement,
    pub course: RegionText,
    pub date: RegionText,
}

impl Default for RenderSettings {
    fn default() -> Self {
        SettingsInput::default().resolve()
    }
}

/// A loosely typed user value: clients may send `"12.5"` or `12.5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    Number(f64),
    Text(String),
}

impl LooseValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LooseValue::Number(n) if n.is_finite() => Some(*n),
            LooseValue::Number(_) => None,
            LooseValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// Integer reading, truncating any fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LooseValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .or_else(|| self.as_f64().map(|n| n.trunc() as i64)),
            LooseValue::Number(_) => self.as_f64().map(|n| n.trunc() as i64),
        }
    }
}

impl From<f64> for LooseValue {
    fn from(value: f64) -> Self {
        LooseValue::Number(value)
    }
}

impl From<&str> for LooseValue {
    fn from(value: &str) -> Self {
        LooseValue::Text(value.to_string())
    }
}

/// Loose RGB triple in `0..=255` per channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RgbInput {
    #[serde(default)]
    pub r: Option<LooseValue>,
    #[serde(default)]
    pub g: Option<LooseValue>,
    #[serde(default)]
    pub b: Option<LooseValue>,
}

impl RgbInput {
    /// Channels are clamped to `0..=255`; anything non-numeric reads as 0.
    pub fn resolve(&self) -> Rgb {
        let channel = |v: &Option<LooseValue>| -> u8 {
            v.as_ref()
                .and_then(LooseValue::as_i64)
                .map(|n| n.clamp(0, 255) as u8)
                .unwrap_or(0)
        };
        Rgb::from_bytes(channel(&self.r), channel(&self.g), channel(&self.b))
    }
}

/// User-facing configuration as typed into the settings form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsInput {
    pub serial_prefix: Option<String>,
    pub start_serial: Option<LooseValue>,
    pub serial_digits: Option<LooseValue>,
    pub zip_name_prefix: Option<String>,

    pub serial_x: Option<LooseValue>,
    pub serial_y: Option<LooseValue>,
    pub serial_size: Option<LooseValue>,
    pub name_x: Option<LooseValue>,
    pub name_y: Option<LooseValue>,
    pub name_size: Option<LooseValue>,

    pub course_wipe_x: Option<LooseValue>,
    pub course_wipe_y: Option<LooseValue>,
    pub course_wipe_w: Option<LooseValue>,
    pub course_wipe_h: Option<LooseValue>,
    pub course_text_y: Option<LooseValue>,
    pub course_size: Option<LooseValue>,
    pub course_align: Option<String>,

    pub date_wipe_x: Option<LooseValue>,
    pub date_wipe_y: Option<LooseValue>,
    pub date_wipe_w: Option<LooseValue>,
    pub date_wipe_h: Option<LooseValue>,
    pub date_text_y: Option<LooseValue>,
    pub date_size: Option<LooseValue>,
    pub date_align: Option<String>,

    /// Color of the serial and name; also the fallback for course and date.
    pub text_color: Option<RgbInput>,
    pub course_color: Option<RgbInput>,
    pub date_color: Option<RgbInput>,
}

fn text_or(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn float_or(value: &Option<LooseValue>, default: f32) -> f32 {
    value
        .as_ref()
        .and_then(LooseValue::as_f64)
        .filter(|n| *n != 0.0)
        .map(|n| n as f32)
        .unwrap_or(default)
}

fn center_mode(value: &Option<String>) -> CenterMode {
    match value.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
        Some(mode) if mode == "page" => CenterMode::Page,
        _ => CenterMode::Region,
    }
}

impl SettingsInput {
    pub fn resolve(&self) -> RenderSettings {
        let text_color = self
            .text_color
            .as_ref()
            .map(RgbInput::resolve)
            .unwrap_or(Rgb::BLACK);
        let course_color = self
            .course_color
            .as_ref()
            .map(RgbInput::resolve)
            .unwrap_or(text_color);
        let date_color = self
            .date_color
            .as_ref()
            .map(RgbInput::resolve)
            .unwrap_or(text_color);

        let start_index = self
            .start_serial
            .as_ref()
            .and_then(LooseValue::as_i64)
            .filter(|n| *n > 0)
            .map(|n| n as u64)
            .unwrap_or(DEFAULT_START_INDEX);
        let digit_width = self
            .serial_digits
            .as_ref()
            .and_then(LooseValue::as_i64)
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_DIGIT_WIDTH);

        RenderSettings {
            serial_prefix: text_or(&self.serial_prefix, DEFAULT_SERIAL_PREFIX),
            start_index,
            digit_width,
            zip_name_prefix: text_or(&self.zip_name_prefix, DEFAULT_ZIP_NAME_PREFIX),
            serial: TextPlacement {
                x: float_or(&self.serial_x, 708.0),
                y: float_or(&self.serial_y, 558.0),
                size: float_or(&self.serial_size, 14.0),
                color: text_color,
            },
            name: TextPlacement {
                x: float_or(&self.name_x, 421.0),
                y: float_or(&self.name_y, 340.0),
                size: float_or(&self.name_size, 20.0),
                color: text_color,
            },
            course: RegionText {
                wipe: WipeRegion {
                    x: float_or(&self.course_wipe_x, 100.0),
                    y: float_or(&self.course_wipe_y, 290.0),
                    width: float_or(&self.course_wipe_w, 700.0),
                    height: float_or(&self.course_wipe_h, 45.0),
                },
                baseline: float_or(&self.course_text_y, 310.0),
                size: float_or(&self.course_size, 16.0),
                color: course_color,
                center: center_mode(&self.course_align),
            },
            date: RegionText {
                wipe: WipeRegion {
                    x: float_or(&self.date_wipe_x, 250.0),
                    y: float_or(&self.date_wipe_y, 246.0),
                    width: float_or(&self.date_wipe_w, 350.0),
                    height: float_or(&self.date_wipe_h, 22.0),
                },
                baseline: float_or(&self.date_text_y, 264.0),
                size: float_or(&self.date_size, 16.0),
                color: date_color,
                center: center_mode(&self.date_align),
            },
        }
    }
}
