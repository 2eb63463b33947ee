//! Inline `style` attribute parsing
//!
//! Only the declarations the intermediate model carries are read: `font-size`,
//! `font-weight`, `font-family` and `color`. Everything else is ignored.

use crate::document::{BOLD_FONT_WEIGHT, DEFAULT_FONT_SIZE, DEFAULT_FONT_WEIGHT};

/// Declarations read from one `style` attribute
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    /// Pixels
    pub font_size: Option<f32>,
    pub font_weight: Option<u16>,
    pub font_family: Option<String>,
    pub color: Option<String>,
}

impl InlineStyle {
    pub fn parse(style: &str) -> Self {
        let mut parsed = InlineStyle::default();

        for declaration in style.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let value = strip_important(value.trim());
            if value.is_empty() {
                continue;
            }

            // Later declarations win, as in CSS
            match property.trim().to_ascii_lowercase().as_str() {
                "font-size" => {
                    if let Some(size) = parse_font_size(value) {
                        parsed.font_size = Some(size);
                    }
                }
                "font-weight" => {
                    if let Some(weight) = parse_font_weight(value) {
                        parsed.font_weight = Some(weight);
                    }
                }
                "font-family" => parsed.font_family = Some(value.to_string()),
                "color" => parsed.color = Some(value.to_string()),
                _ => {}
            }
        }

        parsed
    }
}

fn strip_important(value: &str) -> &str {
    match value.len().checked_sub(10) {
        Some(at) if value.is_char_boundary(at)
            && value[at..].eq_ignore_ascii_case("!important") =>
        {
            value[..at].trim_end()
        }
        _ => value,
    }
}

/// Font size in pixels; relative units resolve against the default size
fn parse_font_size(value: &str) -> Option<f32> {
    let value = value.to_ascii_lowercase();
    let (number, factor) = if let Some(n) = value.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix("pt") {
        (n, 4.0 / 3.0)
    } else if let Some(n) = value.strip_suffix("rem") {
        (n, DEFAULT_FONT_SIZE)
    } else if let Some(n) = value.strip_suffix("em") {
        (n, DEFAULT_FONT_SIZE)
    } else {
        (value.as_str(), 1.0)
    };

    number
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n * factor)
}

fn parse_font_weight(value: &str) -> Option<u16> {
    match value.to_ascii_lowercase().as_str() {
        "normal" | "lighter" => Some(DEFAULT_FONT_WEIGHT),
        "bold" | "bolder" => Some(BOLD_FONT_WEIGHT),
        other => other
            .parse::<f32>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|n| n.round().clamp(1.0, 1000.0) as u16),
    }
}
