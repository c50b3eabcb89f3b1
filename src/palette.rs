// Copyright (c) 2026 rezky_nightky

use std::env;

use crossterm::style::Color;

use crate::render::Rgb;
use crate::runtime::ColorMode;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub mode: ColorMode,
    pub backdrop: Rgb,
    pub paint_bg: bool,
}

impl Palette {
    pub fn new(mode: ColorMode, paint_bg: bool) -> Self {
        Self {
            mode,
            backdrop: crate::render::BACKGROUND,
            paint_bg,
        }
    }

    pub fn fg(&self, rgb: Rgb) -> Option<Color> {
        match self.mode {
            ColorMode::Mono => None,
            _ => Some(self.convert(rgb)),
        }
    }

    pub fn bg(&self, rgb: Rgb) -> Option<Color> {
        if !self.paint_bg || self.mode == ColorMode::Mono {
            return None;
        }
        Some(self.convert(rgb))
    }

    fn convert(&self, Rgb(r, g, b): Rgb) -> Color {
        match self.mode {
            ColorMode::TrueColor => Color::Rgb { r, g, b },
            ColorMode::Color256 => Color::AnsiValue(rgb_to_ansi256(r, g, b)),
            ColorMode::Color16 | ColorMode::Mono => rgb_to_color16(r, g, b),
        }
    }
}

// Source-over compositing of `fg` at `alpha` onto `bg`.
pub fn blend(fg: Rgb, bg: Rgb, alpha: f32) -> Rgb {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |f: u8, b: u8| (b as f32 + (f as f32 - b as f32) * a).round() as u8;
    Rgb(mix(fg.0, bg.0), mix(fg.1, bg.1), mix(fg.2, bg.2))
}

fn dist2(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let d = |x: u8, y: u8| (x as i32 - y as i32).pow(2);
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (level(r), level(g), level(b));
    let cube = (
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    // 232..=255 is a 24-step grey ramp from 8 to 238
    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let ramp = (avg.saturating_sub(8) / 10).min(23);
    let grey = 8 + 10 * ramp;
    let grey_idx = 232 + ramp;

    if dist2((r, g, b), (grey, grey, grey)) < dist2((r, g, b), cube) {
        grey_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 8] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::Red, (255, 0, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::Blue, (0, 0, 255)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, rgb)| dist2((r, g, b), *rgb))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

pub fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }

    ColorMode::Color16
}

pub fn color_mode_from_bits(bits: u16) -> Option<ColorMode> {
    match bits {
        0 => Some(ColorMode::Mono),
        16 => Some(ColorMode::Color16),
        8 | 256 => Some(ColorMode::Color256),
        24 | 32 => Some(ColorMode::TrueColor),
        _ => None,
    }
}

pub fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Color16 => "16-color",
        ColorMode::Mono => "mono",
    }
}
