// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::rows::RowField;

pub const BACKGROUND: Rgb = Rgb(10, 10, 10);
pub const LEAD: Rgb = Rgb(255, 255, 255);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphPaint {
    pub color: Rgb,
    pub alpha: f32,
    pub glow: bool,
}

impl GlyphPaint {
    pub fn lead() -> Self {
        Self {
            color: LEAD,
            alpha: 1.0,
            glow: true,
        }
    }

    pub fn trail(j: usize, len: usize) -> Self {
        let fade = 1.0 - j as f32 / len.max(1) as f32;
        let v = (80.0 + fade * 175.0).floor() as u8;
        Self {
            color: Rgb(v, v, v),
            alpha: 0.3 + fade * 0.7,
            glow: false,
        }
    }
}

pub trait Canvas {
    fn fill_background(&mut self, color: Rgb);
    // `(x, y)` is the glyph's left edge and baseline, in pixels.
    fn fill_glyph(&mut self, ch: char, x: f64, y: f64, paint: GlyphPaint);
}

pub fn render_frame<C, R>(field: &mut RowField, alphabet: &[char], canvas: &mut C, rng: &mut R)
where
    C: Canvas + ?Sized,
    R: Rng + ?Sized,
{
    canvas.fill_background(BACKGROUND);

    let g = field.geometry();
    let width = field.width() as f64;
    let trail = g.stream_length;

    for row in field.rows() {
        let sign = row.direction.sign();
        for j in 0..trail {
            let x = (row.position - j as f64 * sign) * g.font_size;
            if x < -g.font_size || x > width + g.font_size {
                continue;
            }

            let ch = pick_glyph(alphabet, rng);
            let paint = if j == 0 {
                GlyphPaint::lead()
            } else {
                GlyphPaint::trail(j, trail)
            };
            canvas.fill_glyph(ch, x, row.y, paint);
        }
    }

    field.advance();
}

fn pick_glyph<R: Rng + ?Sized>(alphabet: &[char], rng: &mut R) -> char {
    if alphabet.is_empty() {
        return '0';
    }
    alphabet[rng.random_range(0..alphabet.len())]
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::charset::RAIN_GLYPHS;
    use crate::runtime::Geometry;
    use crate::surface::Surface;

    #[derive(Default)]
    pub struct Recorder {
        pub backgrounds: Vec<Rgb>,
        pub glyphs: Vec<(char, f64, f64, GlyphPaint)>,
    }

    impl Canvas for Recorder {
        fn fill_background(&mut self, color: Rgb) {
            self.backgrounds.push(color);
            self.glyphs.clear();
        }

        fn fill_glyph(&mut self, ch: char, x: f64, y: f64, paint: GlyphPaint) {
            self.glyphs.push((ch, x, y, paint));
        }
    }

    fn glyphs() -> Vec<char> {
        RAIN_GLYPHS.chars().collect()
    }

    #[test]
    fn every_frame_starts_from_opaque_background() {
        let mut f = RowField::init(Surface::new(800, 400), Geometry::default());
        let mut canvas = Recorder::default();
        let mut rng = StdRng::seed_from_u64(7);
        let a = glyphs();
        for _ in 0..3 {
            render_frame(&mut f, &a, &mut canvas, &mut rng);
        }
        assert_eq!(canvas.backgrounds, vec![BACKGROUND; 3]);
    }

    #[test]
    fn lead_is_bright_and_glowing_tail_fades() {
        let mut f = RowField::init(Surface::new(800, 400), Geometry::default());
        // centre a rightward row so the whole stream is visible
        f.rows_mut()[0].position = 20.0;
        let mut canvas = Recorder::default();
        let mut rng = StdRng::seed_from_u64(1);
        render_frame(&mut f, &glyphs(), &mut canvas, &mut rng);

        let row0: Vec<_> = canvas.glyphs.iter().filter(|g| g.2 == 40.0).collect();
        assert_eq!(row0.len(), 12);
        assert_eq!(row0[0].1, 20.0 * 24.0);
        assert_eq!(row0[0].3, GlyphPaint::lead());
        for (j, g) in row0.iter().enumerate().skip(1) {
            assert_eq!(g.1, (20.0 - j as f64) * 24.0);
            assert!(!g.3.glow);
            assert!(g.3.alpha < row0[j - 1].3.alpha);
        }

        let last = row0[11].3;
        let fade = 1.0 - 11.0 / 12.0;
        assert_eq!(last.color, Rgb(94, 94, 94));
        assert!((last.alpha - (0.3 + fade * 0.7)).abs() < 1e-6);
    }

    #[test]
    fn slots_outside_the_surface_are_skipped() {
        let mut f = RowField::init(Surface::new(800, 400), Geometry::default());
        for r in f.rows_mut() {
            r.position = -100.0;
        }
        let mut canvas = Recorder::default();
        let mut rng = StdRng::seed_from_u64(3);
        render_frame(&mut f, &glyphs(), &mut canvas, &mut rng);
        assert!(canvas.glyphs.is_empty());
    }

    #[test]
    fn drawn_x_stays_inside_padded_bounds() {
        let mut f = RowField::init(Surface::new(640, 360), Geometry::default());
        let mut canvas = Recorder::default();
        let mut rng = StdRng::seed_from_u64(11);
        let a = glyphs();
        for _ in 0..600 {
            render_frame(&mut f, &a, &mut canvas, &mut rng);
            for g in &canvas.glyphs {
                assert!(g.1 >= -24.0 && g.1 <= 640.0 + 24.0);
                assert!(a.contains(&g.0));
            }
        }
    }

    #[test]
    fn seeded_rng_reproduces_glyphs() {
        let a = glyphs();
        let run = |seed| {
            let mut f = RowField::init(Surface::new(800, 400), Geometry::default());
            let mut canvas = Recorder::default();
            let mut rng = StdRng::seed_from_u64(seed);
            render_frame(&mut f, &a, &mut canvas, &mut rng);
            canvas.glyphs.iter().map(|g| g.0).collect::<String>()
        };
        assert_eq!(run(42), run(42));
        assert!(!run(42).is_empty());
    }

    #[test]
    fn render_advances_rows_once() {
        let mut f = RowField::init(Surface::new(800, 400), Geometry::default());
        let before = f.rows()[0].position;
        let mut canvas = Recorder::default();
        let mut rng = StdRng::seed_from_u64(5);
        render_frame(&mut f, &glyphs(), &mut canvas, &mut rng);
        assert!((f.rows()[0].position - (before + 0.15)).abs() < 1e-12);
    }
}
