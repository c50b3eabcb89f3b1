// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::frame::{Cell, CellMetrics, Frame};
use crate::surface::Container;

#[derive(Clone, Copy, Debug)]
pub struct TerminalContainer {
    pub metrics: CellMetrics,
}

impl Container for TerminalContainer {
    fn content_box(&self) -> Option<(u32, u32)> {
        let (cols, lines) = terminal::size().ok()?;
        Some(self.metrics.pixel_box(cols, lines))
    }
}

#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    at: Option<(u16, u16)>,
}

pub struct Terminal {
    stdout: Stdout,
    last_size: Option<(u16, u16)>,
    run_buf: String,
    order: Vec<usize>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            // not every terminal reports focus; without it the gate simply stays open
            let _ = out.execute(event::EnableFocusChange);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore(&mut out);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last_size: None,
            run_buf: String::with_capacity(64),
            order: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let size = (frame.width, frame.height);
        let full = frame.is_dirty_all() || self.last_size != Some(size);
        let mut pen = Pen::default();

        if self.last_size != Some(size) {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.last_size = Some(size);
        }

        self.order.clear();
        if full {
            self.order
                .extend(0..frame.width as usize * frame.height as usize);
        } else {
            self.order.extend_from_slice(frame.dirty_indices());
            self.order.sort_unstable();
        }

        let width = frame.width.max(1) as usize;
        let mut i = 0usize;
        while i < self.order.len() {
            let idx0 = self.order[i];
            let cell0 = frame.cell_at_index(idx0);
            let x0 = (idx0 % width) as u16;
            let y0 = (idx0 / width) as u16;

            // extend the run while cells are adjacent on the same line and share a style
            self.run_buf.clear();
            self.run_buf.push(cell0.ch);
            let mut j = i + 1;
            while j < self.order.len() {
                let idx1 = self.order[j];
                let cell1 = frame.cell_at_index(idx1);
                if idx1 != self.order[j - 1] + 1 || idx1 % width == 0 || !same_style(&cell0, &cell1)
                {
                    break;
                }
                self.run_buf.push(cell1.ch);
                j += 1;
            }

            if pen.at != Some((x0, y0)) {
                self.stdout.queue(cursor::MoveTo(x0, y0))?;
            }
            self.apply_style(&mut pen, &cell0)?;
            self.stdout.queue(Print(self.run_buf.as_str()))?;

            let next_x = x0.saturating_add((j - i) as u16);
            pen.at = (next_x < frame.width).then_some((next_x, y0));
            i = j;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn apply_style(&mut self, pen: &mut Pen, cell: &Cell) -> Result<()> {
        if cell.fg != pen.fg {
            self.stdout
                .queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            pen.fg = cell.fg;
        }
        if cell.bg != pen.bg {
            self.stdout
                .queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            pen.bg = cell.bg;
        }
        if cell.bold != pen.bold {
            self.stdout.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            pen.bold = cell.bold;
        }
        Ok(())
    }
}

fn same_style(a: &Cell, b: &Cell) -> bool {
    a.fg == b.fg && a.bg == b.bg && a.bold == b.bold
}

fn restore(out: &mut Stdout) {
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(event::DisableFocusChange);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore(&mut self.stdout);
    }
}

pub fn restore_terminal_best_effort() {
    restore(&mut stdout());
}
