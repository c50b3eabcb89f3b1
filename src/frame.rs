// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::palette::{blend, Palette};
use crate::render::{Canvas, GlyphPaint, Rgb};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Cell {
    pub fn blank_with_bg(bg: Option<Color>) -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg,
            bold: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    blank: Cell,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
    painted: Vec<usize>,
    overlay: bool,
    under: Vec<(usize, Cell)>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank_with_bg(bg);
        Self {
            width,
            height,
            cells: vec![blank; len],
            blank,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
            painted: Vec::new(),
            overlay: false,
            under: Vec::new(),
        }
    }

    pub fn blank(&self) -> Cell {
        self.blank
    }

    pub fn repaint(&mut self, bg: Option<Color>) {
        if bg != self.blank.bg {
            self.blank = Cell::blank_with_bg(bg);
            self.cells.fill(self.blank);
            self.painted.clear();
            self.under.clear();
            self.dirty_all = true;
            self.dirty.clear();
            return;
        }

        let painted = std::mem::take(&mut self.painted);
        for &i in &painted {
            self.write(i, self.blank);
        }
        self.painted = painted;
        self.painted.clear();
    }

    // Next draw rewrites every cell.
    pub fn invalidate(&mut self) {
        self.dirty_all = true;
    }

    // Follows a terminal resize. The grid is rebuilt blank when the size differs.
    pub fn fit(&mut self, width: u16, height: u16) {
        if (width, height) == (self.width, self.height) {
            self.invalidate();
        } else {
            *self = Frame::new(width, height, self.blank.bg);
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(self.blank)
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else { return };
        if self.overlay {
            self.under.push((i, self.cells[i]));
            self.write(i, cell);
            return;
        }
        self.write(i, cell);
        if cell != self.blank {
            self.painted.push(i);
        }
    }

    // Writes made until `end_overlay` remember the cell they cover.
    pub fn begin_overlay(&mut self) {
        self.overlay = true;
    }

    pub fn end_overlay(&mut self) {
        self.overlay = false;
    }

    pub fn clear_overlay(&mut self) {
        while let Some((i, cell)) = self.under.pop() {
            self.write(i, cell);
        }
    }

    pub fn put_str(&mut self, x: u16, y: u16, text: &str, fg: Option<Color>, bold: bool) {
        let bg = self.blank.bg;
        for (dx, ch) in text.chars().enumerate() {
            let Ok(dx) = u16::try_from(dx) else { break };
            let Some(cx) = x.checked_add(dx) else { break };
            self.set(cx, y, Cell { ch, fg, bg, bold });
        }
    }

    pub fn draw_box(&mut self, col: u16, line: u16, inner_w: u16, text: &[&str], fg: Option<Color>) {
        let box_w = inner_w.saturating_add(4);
        let box_h = (text.len() as u16).saturating_add(2);
        for y in 0..box_h {
            let mut row = String::with_capacity(box_w as usize);
            for x in 0..box_w {
                let edge_x = x == 0 || x + 1 == box_w;
                let edge_y = y == 0 || y + 1 == box_h;
                row.push(match (edge_x, edge_y) {
                    (true, true) => '+',
                    (false, true) => '-',
                    (true, false) => '|',
                    (false, false) => ' ',
                });
            }
            self.put_str(col, line.saturating_add(y), &row, fg, false);
            if y > 0 && y + 1 < box_h {
                let content: String = text[(y - 1) as usize]
                    .chars()
                    .take(inner_w as usize)
                    .collect();
                self.put_str(col.saturating_add(2), line.saturating_add(y), &content, fg, true);
            }
        }
    }

    fn write(&mut self, i: usize, cell: Cell) {
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellMetrics {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl CellMetrics {
    pub fn pixel_box(&self, cols: u16, lines: u16) -> (u32, u32) {
        (
            (cols as f64 * self.cell_width) as u32,
            (lines as f64 * self.cell_height) as u32,
        )
    }

    // Cell holding a glyph whose left edge is `x` and whose baseline is `y`.
    pub fn cell_for(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        if self.cell_width <= 0.0 || self.cell_height <= 0.0 {
            return None;
        }
        let col = (x / self.cell_width).floor();
        let line = (y / self.cell_height).floor() - 1.0;
        if col < 0.0 || line < 0.0 || col > u16::MAX as f64 || line > u16::MAX as f64 {
            return None;
        }
        Some((col as u16, line as u16))
    }
}

pub struct CellCanvas<'a> {
    frame: &'a mut Frame,
    metrics: CellMetrics,
    palette: Palette,
}

impl<'a> CellCanvas<'a> {
    pub fn new(frame: &'a mut Frame, metrics: CellMetrics, palette: Palette) -> Self {
        Self {
            frame,
            metrics,
            palette,
        }
    }
}

impl Canvas for CellCanvas<'_> {
    fn fill_background(&mut self, color: Rgb) {
        self.palette.backdrop = color;
        self.frame.repaint(self.palette.bg(color));
    }

    fn fill_glyph(&mut self, ch: char, x: f64, y: f64, paint: GlyphPaint) {
        let Some((col, line)) = self.metrics.cell_for(x, y) else {
            return;
        };
        let rgb = blend(paint.color, self.palette.backdrop, paint.alpha);
        let cell = Cell {
            ch,
            fg: self.palette.fg(rgb),
            bg: self.frame.blank().bg,
            bold: paint.glow,
        };
        self.frame.set(col, line, cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::BACKGROUND;
    use crate::runtime::ColorMode;

    fn glyph(ch: char) -> Cell {
        Cell {
            ch,
            fg: None,
            bg: None,
            bold: false,
        }
    }

    #[test]
    fn repaint_blanks_only_what_was_painted() {
        let mut f = Frame::new(4, 2, None);
        f.clear_dirty();
        f.set(1, 0, glyph('x'));
        f.set(3, 1, glyph('y'));
        f.clear_dirty();

        f.repaint(None);
        assert_eq!(f.get(1, 0).unwrap().ch, ' ');
        assert_eq!(f.get(3, 1).unwrap().ch, ' ');
        let mut dirty = f.dirty_indices().to_vec();
        dirty.sort_unstable();
        assert_eq!(dirty, vec![1, 7]);
        assert!(!f.is_dirty_all());
    }

    #[test]
    fn repaint_with_new_background_dirties_everything() {
        let mut f = Frame::new(2, 2, None);
        f.clear_dirty();
        f.repaint(Some(Color::Black));
        assert!(f.is_dirty_all());
        assert_eq!(f.get(0, 0).unwrap().bg, Some(Color::Black));
    }

    #[test]
    fn fit_to_same_size_still_redraws_everything() {
        let mut f = Frame::new(4, 2, Some(Color::Black));
        f.set(1, 0, glyph('x'));
        f.clear_dirty();
        assert!(!f.is_dirty_all());

        f.fit(4, 2);
        assert!(f.is_dirty_all());
        assert_eq!(f.get(1, 0).unwrap().ch, 'x');
        f.clear_dirty();
        assert!(!f.is_dirty_all());
        assert!(f.dirty_indices().is_empty());
    }

    #[test]
    fn fit_to_new_size_rebuilds_blank_grid() {
        let mut f = Frame::new(4, 2, Some(Color::Black));
        f.set(1, 0, glyph('x'));
        f.clear_dirty();

        f.fit(6, 3);
        assert_eq!((f.width, f.height), (6, 3));
        assert!(f.is_dirty_all());
        assert_eq!(f.get(5, 2).unwrap().bg, Some(Color::Black));
        assert_eq!(f.get(1, 0).unwrap().ch, ' ');
    }

    #[test]
    fn unchanged_cell_is_not_dirtied() {
        let mut f = Frame::new(2, 2, None);
        f.set(0, 0, glyph('a'));
        f.clear_dirty();
        f.set(0, 0, glyph('a'));
        assert!(f.dirty_indices().is_empty());
    }

    #[test]
    fn clearing_an_overlay_restores_covered_cells() {
        let mut f = Frame::new(4, 1, None);
        f.set(1, 0, glyph('r'));
        f.clear_dirty();

        f.begin_overlay();
        f.put_str(0, 0, "ab", None, true);
        f.put_str(1, 0, "c", None, false);
        f.end_overlay();
        assert_eq!(f.get(1, 0).unwrap().ch, 'c');

        f.clear_overlay();
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
        assert_eq!(f.get(1, 0).unwrap().ch, 'r');

        f.repaint(None);
        assert_eq!(f.get(1, 0).unwrap().ch, ' ');
    }

    #[test]
    fn put_str_clips_at_right_edge() {
        let mut f = Frame::new(3, 1, None);
        f.put_str(1, 0, "abc", None, false);
        assert_eq!(f.get(1, 0).unwrap().ch, 'a');
        assert_eq!(f.get(2, 0).unwrap().ch, 'b');
    }

    #[test]
    fn draw_box_frames_text() {
        let mut f = Frame::new(12, 4, None);
        f.draw_box(1, 0, 5, &["hi"], None);
        let line = |y: u16| -> String { (0..12).map(|x| f.get(x, y).unwrap().ch).collect() };
        assert_eq!(line(0), " +-------+  ");
        assert_eq!(line(1), " | hi    |  ");
        assert_eq!(line(2), " +-------+  ");
        assert!(f.get(3, 1).unwrap().bold);
    }

    #[test]
    fn baseline_maps_to_the_line_above() {
        let m = CellMetrics {
            cell_width: 24.0,
            cell_height: 20.0,
        };
        assert_eq!(m.cell_for(0.0, 40.0), Some((0, 1)));
        assert_eq!(m.cell_for(47.9, 80.0), Some((1, 3)));
        assert_eq!(m.cell_for(-1.0, 40.0), None);
        assert_eq!(m.cell_for(0.0, 10.0), None);
        assert_eq!(m.pixel_box(80, 24), (1920, 480));
    }

    #[test]
    fn canvas_composites_alpha_and_glow() {
        let mut f = Frame::new(10, 4, None);
        let m = CellMetrics {
            cell_width: 24.0,
            cell_height: 20.0,
        };
        let palette = Palette::new(ColorMode::TrueColor, true);
        let mut canvas = CellCanvas::new(&mut f, m, palette);
        canvas.fill_background(BACKGROUND);
        canvas.fill_glyph('A', 48.0, 40.0, GlyphPaint::lead());
        canvas.fill_glyph(
            'B',
            72.0,
            40.0,
            GlyphPaint {
                color: Rgb(110, 110, 110),
                alpha: 0.5,
                glow: false,
            },
        );

        let bg = Some(Color::Rgb {
            r: 10,
            g: 10,
            b: 10,
        });
        let a = *f.get(2, 1).unwrap();
        assert_eq!(a.ch, 'A');
        assert!(a.bold);
        assert_eq!(
            a.fg,
            Some(Color::Rgb {
                r: 255,
                g: 255,
                b: 255
            })
        );
        assert_eq!(a.bg, bg);

        let b = *f.get(3, 1).unwrap();
        assert_eq!(b.fg, Some(Color::Rgb { r: 60, g: 60, b: 60 }));
        assert!(!b.bold);
        assert_eq!(f.get(0, 0).unwrap().bg, bg);
    }
}
