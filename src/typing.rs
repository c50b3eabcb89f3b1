// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crossterm::style::Color;

use crate::frame::Frame;

pub const DEFAULT_ROLES: &[&str] = &[
    "Data Engineer",
    "AI Specialist",
    "Web Scraping Expert",
    "Automation Pro",
];

const START_DELAY: Duration = Duration::from_millis(1000);
const TYPE_DELAY: Duration = Duration::from_millis(100);
const DELETE_DELAY: Duration = Duration::from_millis(50);
const HOLD_DELAY: Duration = Duration::from_millis(2000);
const NEXT_ROLE_DELAY: Duration = Duration::from_millis(500);

// a stalled loop catches up at most this many keystrokes before skipping ahead
const MAX_CATCH_UP: usize = 64;

#[derive(Clone, Debug)]
pub struct Typewriter {
    roles: Vec<Vec<char>>,
    role: usize,
    typed: usize,
    deleting: bool,
    next_at: Instant,
    widest: usize,
}

impl Typewriter {
    pub fn new<S: AsRef<str>>(roles: &[S], now: Instant) -> Option<Self> {
        let roles: Vec<Vec<char>> = roles
            .iter()
            .map(|r| r.as_ref().trim().chars().collect::<Vec<char>>())
            .filter(|r| !r.is_empty())
            .collect();
        if roles.is_empty() {
            return None;
        }
        let widest = roles.iter().map(Vec::len).max().unwrap_or(0);
        Some(Self {
            roles,
            role: 0,
            typed: 0,
            deleting: false,
            next_at: now + START_DELAY,
            widest,
        })
    }

    pub fn text(&self) -> String {
        self.roles[self.role][..self.typed].iter().collect()
    }

    #[cfg(test)]
    pub fn role_index(&self) -> usize {
        self.role
    }

    pub fn next_at(&self) -> Instant {
        self.next_at
    }

    // Runs every keystroke due by `now`. Returns true if the text changed.
    pub fn update(&mut self, now: Instant) -> bool {
        let mut changed = false;
        let mut steps = 0;
        while now >= self.next_at {
            let delay = self.step();
            changed = true;
            steps += 1;
            if steps >= MAX_CATCH_UP {
                self.next_at = now + delay;
                break;
            }
            self.next_at += delay;
        }
        changed
    }

    fn step(&mut self) -> Duration {
        let len = self.roles[self.role].len();
        let mut delay = if self.deleting {
            self.typed = self.typed.saturating_sub(1);
            DELETE_DELAY
        } else {
            self.typed = (self.typed + 1).min(len);
            TYPE_DELAY
        };

        if !self.deleting && self.typed == len {
            self.deleting = true;
            delay = HOLD_DELAY;
        } else if self.deleting && self.typed == 0 {
            self.deleting = false;
            self.role = (self.role + 1) % self.roles.len();
            delay = NEXT_ROLE_DELAY;
        }
        delay
    }

    pub fn draw(&self, frame: &mut Frame, fg: Option<Color>) {
        let inner = u16::try_from(self.widest)
            .unwrap_or(u16::MAX)
            .saturating_add(1);
        let box_w = inner.saturating_add(4);
        if frame.width < box_w || frame.height < 3 {
            return;
        }
        let col = frame.width / 2 - box_w / 2;
        let line = frame.height / 2 - 1;
        let shown = format!("{}_", self.text());
        frame.draw_box(col, line, inner, &[shown.as_str()], fg);
    }
}
