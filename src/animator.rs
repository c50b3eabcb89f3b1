// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info};

use crate::charset::RAIN_GLYPHS;
use crate::debounce::Debouncer;
use crate::render::{render_frame, Canvas};
use crate::rows::RowField;
use crate::runtime::Geometry;
use crate::scheduler::{
    earliest, FrameGate, GateState, Scheduler, Visibility, VISIBILITY_THRESHOLD,
};
use crate::surface::{Container, Surface};

#[derive(Clone, Debug)]
pub struct AnimatorSettings {
    pub geometry: Geometry,
    pub alphabet: Vec<char>,
    pub threshold: f32,
    pub resize_quiet: Duration,
}

impl Default for AnimatorSettings {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            alphabet: RAIN_GLYPHS.chars().collect(),
            threshold: VISIBILITY_THRESHOLD,
            resize_quiet: Debouncer::RESIZE_QUIET,
        }
    }
}

pub struct Animator<C, S, R> {
    container: C,
    surface: Surface,
    field: RowField,
    gate: FrameGate<S>,
    resize: Debouncer,
    rng: R,
    alphabet: Vec<char>,
    frames: u64,
}

impl<C, S, R> Animator<C, S, R>
where
    C: Container,
    S: Scheduler,
    R: Rng,
{
    // Returns `None` when the container is absent; there is nothing to animate.
    pub fn start(
        container: C,
        scheduler: S,
        rng: R,
        settings: AnimatorSettings,
        now: Instant,
    ) -> Option<Self> {
        let (width, height) = container.content_box()?;
        let surface = Surface::new(width, height);
        let field = RowField::init(surface, settings.geometry);
        info!(width, height, rows = field.len(), "rain field started");

        Some(Self {
            container,
            surface,
            field,
            gate: FrameGate::start(scheduler, settings.threshold, now),
            resize: Debouncer::new(settings.resize_quiet),
            rng,
            alphabet: settings.alphabet,
            frames: 0,
        })
    }

    #[cfg(test)]
    pub fn surface(&self) -> Surface {
        self.surface
    }

    #[cfg(test)]
    pub fn field(&self) -> &RowField {
        &self.field
    }

    #[cfg(test)]
    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    pub fn is_held(&self) -> bool {
        self.gate.is_held()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn geometry(&self) -> Geometry {
        self.field.geometry()
    }

    pub fn set_step(&mut self, step: f64) {
        self.field.set_step(step);
    }

    pub fn on_resize(&mut self, now: Instant) {
        self.resize.poke(now);
    }

    pub fn on_visibility(&mut self, seen: Visibility, now: Instant) -> Option<GateState> {
        self.gate.observe(seen, now)
    }

    pub fn set_held(&mut self, held: bool, now: Instant) -> Option<GateState> {
        self.gate.set_held(held, now)
    }

    pub fn rebuild(&mut self) {
        self.surface.resize(&self.container);
        self.field = RowField::init(self.surface, self.field.geometry());
        debug!(
            width = self.surface.width,
            height = self.surface.height,
            rows = self.field.len(),
            "rows rebuilt"
        );
    }

    pub fn settle_resize(&mut self, now: Instant) -> Option<Surface> {
        if !self.resize.poll(now) {
            return None;
        }
        if !self.surface.resize(&self.container) {
            return None;
        }
        self.field = RowField::init(self.surface, self.field.geometry());
        info!(
            width = self.surface.width,
            height = self.surface.height,
            rows = self.field.len(),
            "surface resized"
        );
        Some(self.surface)
    }

    pub fn tick<K: Canvas + ?Sized>(&mut self, now: Instant, canvas: &mut K) -> bool {
        if !self.gate.poll(now) {
            return false;
        }
        render_frame(&mut self.field, &self.alphabet, canvas, &mut self.rng);
        self.frames += 1;
        self.gate.frame_done(now);
        true
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(self.gate.next_deadline(), self.resize.deadline())
    }
}
