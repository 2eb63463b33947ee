//! Configuration management for the codecs

use std::env;
use std::str::FromStr;

use crate::document::{DEFAULT_FONT_SIZE, DEFAULT_FONT_WEIGHT};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub html: HtmlConfig,
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone)]
pub struct HtmlConfig {
    /// Font size of runs without an inline `font-size` (pixels)
    pub default_font_size: f32,
    /// Font weight of runs without an inline `font-weight`
    pub default_font_weight: u16,
    /// Width of the synthesized page; 0 when unknown
    pub page_width: f32,
    /// Height of the synthesized page; 0 when unknown
    pub page_height: f32,
}

#[derive(Debug, Clone)]
pub struct PdfConfig {
    /// Scale passed to the engine viewport
    pub viewport_scale: f32,
    /// Outline siblings resolved at the same time
    pub outline_concurrency: usize,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        HtmlConfig {
            default_font_size: DEFAULT_FONT_SIZE,
            default_font_weight: DEFAULT_FONT_WEIGHT,
            page_width: 0.0,
            page_height: 0.0,
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        PdfConfig {
            viewport_scale: 1.0,
            outline_concurrency: 8,
        }
    }
}

impl Config {
    /// Load configuration from the environment (and a `.env` file if present)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let html = HtmlConfig::default();
        let pdf = PdfConfig::default();

        Config {
            html: HtmlConfig {
                default_font_size: var_or("HAMSTER_HTML_DEFAULT_FONT_SIZE", html.default_font_size),
                default_font_weight: var_or(
                    "HAMSTER_HTML_DEFAULT_FONT_WEIGHT",
                    html.default_font_weight,
                ),
                page_width: var_or("HAMSTER_HTML_PAGE_WIDTH", html.page_width),
                page_height: var_or("HAMSTER_HTML_PAGE_HEIGHT", html.page_height),
            },
            pdf: PdfConfig {
                viewport_scale: var_or("HAMSTER_PDF_VIEWPORT_SCALE", pdf.viewport_scale),
                outline_concurrency: var_or(
                    "HAMSTER_PDF_OUTLINE_CONCURRENCY",
                    pdf.outline_concurrency,
                )
                .max(1),
            },
        }
    }
}

fn var_or<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring malformed {}={:?}, using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}
