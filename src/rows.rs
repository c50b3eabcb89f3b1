// Copyright (c) 2026 rezky_nightky

use crate::runtime::Geometry;
use crate::surface::Surface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Right,
    Left,
}

impl Direction {
    pub fn for_index(i: usize) -> Self {
        if i % 2 == 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            Direction::Right => 1.0,
            Direction::Left => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Row {
    // Lead offset in character units.
    pub position: f64,
    pub direction: Direction,
    pub y: f64,
}

// Row state for one surface size. Rebuilt, never patched, when the size changes.
#[derive(Clone, Debug, PartialEq)]
pub struct RowField {
    rows: Vec<Row>,
    width: u32,
    geometry: Geometry,
}

impl RowField {
    pub fn init(surface: Surface, geometry: Geometry) -> Self {
        let count = geometry.row_count(surface.height);
        let max_chars = geometry.max_chars(surface.width);
        let trail = geometry.stream_length as f64;

        let rows = (0..count)
            .map(|i| {
                let direction = Direction::for_index(i);
                let stagger = if max_chars > 0.0 {
                    (i as f64 * (max_chars / count as f64)) % max_chars
                } else {
                    0.0
                };
                let position = match direction {
                    Direction::Right => stagger - trail,
                    Direction::Left => max_chars - stagger + trail,
                };
                Row {
                    position,
                    direction,
                    y: i as f64 * geometry.row_spacing + geometry.row_spacing,
                }
            })
            .collect();

        Self {
            rows,
            width: surface.width,
            geometry,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set_step(&mut self, step: f64) {
        self.geometry.step = step;
    }

    pub fn advance(&mut self) {
        let g = self.geometry;
        let trail = g.stream_length as f64;
        let max_chars = g.max_chars(self.width);
        let right_edge = self.width as f64 + trail * g.font_size;
        let left_edge = -trail * g.font_size;

        for row in &mut self.rows {
            row.position += g.step * row.direction.sign();
            let px = row.position * g.font_size;
            match row.direction {
                Direction::Right if px > right_edge => row.position = -trail,
                Direction::Left if px < left_edge => row.position = max_chars + trail,
                _ => {}
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }
}
