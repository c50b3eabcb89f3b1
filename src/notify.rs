// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crossterm::style::Color;

use crate::frame::Frame;

const ENTER: Duration = Duration::from_millis(10);
const VISIBLE_FOR: Duration = Duration::from_millis(3000);
const LEAVE: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastPhase {
    Entering,
    Shown,
    Leaving,
    Gone,
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    created: Instant,
}

impl Toast {
    pub fn phase(&self, now: Instant) -> ToastPhase {
        let age = now.saturating_duration_since(self.created);
        if age < ENTER {
            ToastPhase::Entering
        } else if age < VISIBLE_FOR {
            ToastPhase::Shown
        } else if age < VISIBLE_FOR + LEAVE {
            ToastPhase::Leaving
        } else {
            ToastPhase::Gone
        }
    }
}

#[derive(Debug, Default)]
pub struct Notifier {
    current: Option<Toast>,
}

impl Notifier {
    pub fn show(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) {
        self.current = Some(Toast {
            message: message.into(),
            kind,
            created: now,
        });
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    // Drops a finished toast. Returns true while a toast is on screen or just left it.
    pub fn update(&mut self, now: Instant) -> bool {
        match &self.current {
            Some(t) if t.phase(now) == ToastPhase::Gone => {
                self.current = None;
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn draw(&self, frame: &mut Frame, now: Instant, colored: bool) {
        let Some(toast) = &self.current else {
            return;
        };
        let phase = toast.phase(now);
        if phase == ToastPhase::Gone {
            return;
        }

        let inner = toast.message.chars().count() as u16;
        let box_w = inner.saturating_add(4);
        if frame.width < box_w || frame.height < 3 {
            return;
        }

        let fg = colored.then(|| match (toast.kind, phase) {
            (ToastKind::Success, ToastPhase::Shown) => Color::Green,
            (ToastKind::Error, ToastPhase::Shown) => Color::Red,
            (ToastKind::Success, _) => Color::DarkGreen,
            (ToastKind::Error, _) => Color::DarkRed,
        });
        let col = frame.width - box_w;
        frame.draw_box(col, 0, inner, &[toast.message.as_str()], fg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn phases_follow_enter_show_leave_timing() {
        let t0 = Instant::now();
        let mut n = Notifier::default();
        n.show("saved", ToastKind::Success, t0);
        let t = n.current().unwrap();
        assert_eq!(t.phase(t0), ToastPhase::Entering);
        assert_eq!(t.phase(t0 + ms(10)), ToastPhase::Shown);
        assert_eq!(t.phase(t0 + ms(2999)), ToastPhase::Shown);
        assert_eq!(t.phase(t0 + ms(3000)), ToastPhase::Leaving);
        assert_eq!(t.phase(t0 + ms(3300)), ToastPhase::Gone);
    }

    #[test]
    fn finished_toast_is_removed() {
        let t0 = Instant::now();
        let mut n = Notifier::default();
        n.show("x", ToastKind::Error, t0);
        assert!(n.update(t0 + ms(3299)));
        assert!(n.current().is_some());
        assert!(n.update(t0 + ms(3300)));
        assert!(n.current().is_none());
        assert!(!n.update(t0 + ms(3400)));
    }

    #[test]
    fn newer_toast_replaces_older() {
        let t0 = Instant::now();
        let mut n = Notifier::default();
        n.show("one", ToastKind::Success, t0);
        n.show("two", ToastKind::Error, t0 + ms(100));
        let t = n.current().unwrap();
        assert_eq!(t.message, "two");
        assert_eq!(t.kind, ToastKind::Error);
        assert_eq!(t.phase(t0 + ms(3050)), ToastPhase::Shown);
    }

    #[test]
    fn draws_in_top_right_corner() {
        let t0 = Instant::now();
        let mut n = Notifier::default();
        n.show("ok", ToastKind::Success, t0);
        let mut f = Frame::new(10, 4, None);
        n.draw(&mut f, t0 + ms(20), true);
        assert_eq!(f.get(4, 0).unwrap().ch, '+');
        assert_eq!(f.get(6, 1).unwrap().ch, 'o');
        assert_eq!(f.get(6, 1).unwrap().fg, Some(Color::Green));
        assert_eq!(f.get(9, 2).unwrap().ch, '+');
    }
}
