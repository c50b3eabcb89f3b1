// Copyright (c) 2026 rezky_nightky

mod animator;
mod charset;
mod config;
mod debounce;
mod frame;
mod notify;
mod palette;
mod render;
mod rows;
mod runtime;
mod scheduler;
mod surface;
mod terminal;
mod typing;

use std::env;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::animator::{Animator, AnimatorSettings};
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_list_charsets, Args,
};
use crate::frame::{CellCanvas, CellMetrics, Frame};
use crate::notify::{Notifier, ToastKind};
use crate::palette::{color_mode_label, detect_color_mode_auto, Palette};
use crate::render::{BACKGROUND, LEAD};
use crate::runtime::ColorMode;
use crate::scheduler::{
    earliest, GateState, TickScheduler, Visibility, VISIBILITY_THRESHOLD,
};
use crate::terminal::{restore_terminal_best_effort, Terminal, TerminalContainer};
use crate::typing::Typewriter;

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

// longest sleep when nothing is scheduled, so toasts and the end timer stay responsive
const IDLE_WAIT: Duration = Duration::from_millis(250);
const TOAST_TICK: Duration = Duration::from_millis(50);

fn build_info() -> String {
    let sha = env!("RAINFIELD_GIT_SHA");
    if sha.is_empty() {
        env!("RAINFIELD_BUILD").to_string()
    } else {
        format!("{} ({})", env!("RAINFIELD_BUILD"), sha)
    }
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn init_logging(path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn step_up(step: f64) -> f64 {
    let next = if step < 0.05 { step * 2.0 } else { step + 0.05 };
    next.min(10.0)
}

fn step_down(step: f64) -> f64 {
    let next = if step <= 0.05 { step / 2.0 } else { step - 0.05 };
    next.max(0.001)
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return Ok(());
    }

    let settings = match args.validate() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let auto_mode = detect_color_mode_auto();
    let color_mode = settings.color_mode.unwrap_or(auto_mode);

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();

        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() {
                "(unset)"
            } else {
                &colorterm
            }
        );
        println!(
            "  TERM: {}",
            if term.is_empty() { "(unset)" } else { &term }
        );
        println!("  auto_detected: {}", color_mode_label(auto_mode));
        if settings.color_mode.is_some() {
            println!("  forced: {}", color_mode_label(color_mode));
        }
        println!("  effective: {}", color_mode_label(color_mode));
        return Ok(());
    }

    if let Some(path) = &args.log_file {
        if let Err(e) = init_logging(path) {
            eprintln!("failed to open log file {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }

    let palette = Palette::new(color_mode, settings.paint_bg);
    let colored = color_mode != ColorMode::Mono;
    let banner_fg = palette.fg(LEAD);
    let metrics = CellMetrics {
        cell_width: settings.geometry.font_size,
        cell_height: settings.cell_height,
    };

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut term = Terminal::new()?;
    let start_time = Instant::now();

    let Some(mut animator) = Animator::start(
        TerminalContainer { metrics },
        TickScheduler::with_fps(settings.fps),
        rng,
        AnimatorSettings {
            geometry: settings.geometry,
            alphabet: settings.alphabet.clone(),
            threshold: VISIBILITY_THRESHOLD,
            resize_quiet: settings.resize_quiet,
        },
        start_time,
    ) else {
        drop(term);
        warn!("terminal size unavailable, nothing to animate");
        return Ok(());
    };

    let (w, h) = term.size()?;
    let mut frame = Frame::new(w, h, palette.bg(BACKGROUND));
    let mut typewriter = Typewriter::new(&settings.roles, start_time);
    let mut notifier = Notifier::default();
    let end_time = settings.duration.map(|d| start_time + d);
    let mut running = true;

    while running {
        let now = Instant::now();
        if end_time.is_some_and(|end| now >= end) {
            info!("duration elapsed");
            break;
        }

        let mut wake = earliest(animator.next_deadline(), end_time);
        wake = earliest(wake, typewriter.as_ref().map(Typewriter::next_at));
        if notifier.current().is_some() {
            wake = earliest(wake, Some(now + TOAST_TICK));
        }
        let timeout = wake
            .map(|t| t.saturating_duration_since(now))
            .unwrap_or(IDLE_WAIT)
            .min(IDLE_WAIT);

        let mut ready = Terminal::poll_event(timeout)?;
        while ready {
            let now = Instant::now();
            match Terminal::read_event()? {
                Event::Resize(cols, lines) => {
                    debug!(cols, lines, "resize event");
                    // rows wait for the burst to settle, the screen is repainted now
                    frame.fit(cols, lines);
                    animator.on_resize(now);
                }
                Event::FocusLost => {
                    if animator.on_visibility(Visibility::HIDDEN, now).is_some() {
                        notifier.show("Paused: window hidden", ToastKind::Success, now);
                    }
                }
                Event::FocusGained => {
                    if animator.on_visibility(Visibility::SHOWN, now) == Some(GateState::Running)
                    {
                        notifier.show("Resumed", ToastKind::Success, now);
                    }
                }
                Event::Key(k) if k.kind == KeyEventKind::Press => {
                    if args.screensaver {
                        running = false;
                        break;
                    }

                    match (k.code, k.modifiers) {
                        (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => running = false,
                        (KeyCode::Char('c'), KeyModifiers::CONTROL) => running = false,
                        (KeyCode::Char('p'), _) => {
                            let hold = !animator.is_held();
                            let state = animator.set_held(hold, now);
                            let msg = match (hold, state) {
                                (true, _) => "Paused",
                                (false, Some(GateState::Running)) => "Resumed",
                                (false, _) => "Unpaused, waiting for focus",
                            };
                            notifier.show(msg, ToastKind::Success, now);
                        }
                        (KeyCode::Char(' '), _) => {
                            animator.rebuild();
                            notifier.show("Rows rebuilt", ToastKind::Success, now);
                        }
                        (KeyCode::Up, _) | (KeyCode::Down, _) => {
                            let step = animator.geometry().step;
                            let next = if k.code == KeyCode::Up {
                                step_up(step)
                            } else {
                                step_down(step)
                            };
                            if next == step {
                                notifier.show("Speed limit reached", ToastKind::Error, now);
                            } else {
                                debug!(step = next, "step changed");
                                animator.set_step(next);
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
            ready = running && Terminal::poll_event(Duration::ZERO)?;
        }

        if !running {
            break;
        }

        let now = Instant::now();
        if animator.settle_resize(now).is_some() {
            let (w, h) = term.size()?;
            frame.fit(w, h);
        }

        frame.clear_overlay();
        animator.tick(now, &mut CellCanvas::new(&mut frame, metrics, palette));
        if let Some(t) = typewriter.as_mut() {
            t.update(now);
        }
        notifier.update(now);

        frame.begin_overlay();
        if let Some(t) = &typewriter {
            t.draw(&mut frame, banner_fg);
        }
        notifier.draw(&mut frame, now, colored);
        frame.end_overlay();

        if frame.is_dirty_all() || !frame.dirty_indices().is_empty() {
            term.draw(&mut frame)?;
        }
    }

    info!(frames = animator.frames(), "stopped");
    Ok(())
}
