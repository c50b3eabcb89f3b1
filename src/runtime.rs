// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub font_size: f64,
    pub row_spacing: f64,
    pub stream_length: usize,
    pub step: f64,
}

impl Geometry {
    pub const FONT_SIZE: f64 = 24.0;
    pub const ROW_SPACING: f64 = 40.0;
    pub const STREAM_LENGTH: usize = 12;
    pub const STEP: f64 = 0.15;

    pub fn max_chars(&self, width: u32) -> f64 {
        if self.font_size <= 0.0 {
            return 0.0;
        }
        width as f64 / self.font_size
    }

    pub fn row_count(&self, height: u32) -> usize {
        if self.row_spacing <= 0.0 {
            return 0;
        }
        (height as f64 / self.row_spacing).floor() as usize
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            font_size: Self::FONT_SIZE,
            row_spacing: Self::ROW_SPACING,
            stream_length: Self::STREAM_LENGTH,
            step: Self::STEP,
        }
    }
}
