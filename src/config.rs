// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::charset::{build_chars, charset_from_str, PRESETS};
use crate::palette::color_mode_from_bits;
use crate::runtime::{ColorMode, Geometry};
use crate::typing::DEFAULT_ROLES;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  rainfield --fps 60 --font-size 24 --row-spacing 40 --cell-height 20 --stream-length 12 --step 0.15 --debounce-ms 250 --charset rain --color-bg black";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn default_params_usage_for_help() -> String {
    if !color_enabled_stdout() {
        return DEFAULT_PARAMS_USAGE.to_string();
    }
    let (head, rest) = DEFAULT_PARAMS_USAGE
        .split_once('\n')
        .unwrap_or((DEFAULT_PARAMS_USAGE, ""));
    format!("\x1b[1;36m{}\x1b[0m\n\x1b[33m{}\x1b[0m", head, rest)
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
    #[value(name = "transparent")]
    Transparent,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("failed to apply {name} {value} (min {min} max {max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("failed to apply {name} {value} (must be a finite number)")]
    NotFinite { name: &'static str, value: f64 },
    #[error("invalid --colormode: {0} (allowed: 0,16,8/256,24/32)")]
    ColorMode(u16),
    #[error("{0}")]
    Charset(String),
}

pub fn default_to_ascii() -> bool {
    let lang = std::env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

#[derive(Parser, Debug, Clone)]
#[command(name = "rainfield", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed for glyph selection (random when omitted)"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write logs to this file (filter with RUST_LOG)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "font-size",
        default_value_t = Geometry::FONT_SIZE,
        help_heading = "GEOMETRY",
        help = "Glyph advance in pixels; one terminal column (min 4 max 256)"
    )]
    pub font_size: f64,

    #[arg(
        long = "row-spacing",
        default_value_t = Geometry::ROW_SPACING,
        help_heading = "GEOMETRY",
        help = "Pixels between rows (min 4 max 512)"
    )]
    pub row_spacing: f64,

    #[arg(
        long = "cell-height",
        default_value_t = 20.0,
        help_heading = "GEOMETRY",
        help = "Pixel height of one terminal line (min 1 max 256)"
    )]
    pub cell_height: f64,

    #[arg(
        long = "stream-length",
        default_value_t = Geometry::STREAM_LENGTH,
        help_heading = "GEOMETRY",
        help = "Glyphs per stream (min 1 max 128)"
    )]
    pub stream_length: usize,

    #[arg(
        short = 'S',
        long = "step",
        default_value_t = Geometry::STEP,
        help_heading = "GEOMETRY",
        help = "Characters each lead moves per frame (min 0.001 max 10)"
    )]
    pub step: f64,

    #[arg(
        long = "debounce-ms",
        default_value_t = 250,
        help_heading = "PERFORMANCE",
        help = "Quiet period before a resize rebuilds the rows (min 0 max 10000)"
    )]
    pub debounce_ms: u64,

    #[arg(
        long = "charset",
        default_value = "rain",
        help_heading = "CHARSET",
        help = "Charset preset (see --list-charsets)"
    )]
    pub charset: String,

    #[arg(
        long = "chars",
        help_heading = "CHARSET",
        help = "Literal alphabet override, e.g. \"01\""
    )]
    pub chars: Option<String>,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background, transparent)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        short = 'r',
        long = "role",
        help_heading = "BANNER",
        help = "Role for the typing banner; repeat for several"
    )]
    pub roles: Vec<String>,

    #[arg(
        long = "no-typing",
        help_heading = "BANNER",
        help = "Disable the typing banner"
    )]
    pub no_typing: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub fps: f64,
    pub geometry: Geometry,
    pub alphabet: Vec<char>,
    pub cell_height: f64,
    pub resize_quiet: Duration,
    pub color_mode: Option<ColorMode>,
    pub paint_bg: bool,
    pub duration: Option<Duration>,
    pub roles: Vec<String>,
}

fn require_range(name: &'static str, v: f64, min: f64, max: f64) -> Result<f64, ConfigError> {
    if !v.is_finite() {
        return Err(ConfigError::NotFinite { name, value: v });
    }
    if v < min || v > max {
        return Err(ConfigError::OutOfRange {
            name,
            value: v,
            min,
            max,
        });
    }
    Ok(v)
}

impl Args {
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let fps = require_range("--fps", self.fps, 1.0, 240.0)?;
        let geometry = Geometry {
            font_size: require_range("--font-size", self.font_size, 4.0, 256.0)?,
            row_spacing: require_range("--row-spacing", self.row_spacing, 4.0, 512.0)?,
            stream_length: require_range(
                "--stream-length",
                self.stream_length as f64,
                1.0,
                128.0,
            )? as usize,
            step: require_range("--step", self.step, 0.001, 10.0)?,
        };
        let cell_height = require_range("--cell-height", self.cell_height, 1.0, 256.0)?;
        let debounce_ms = require_range("--debounce-ms", self.debounce_ms as f64, 0.0, 10000.0)?;

        let charset =
            charset_from_str(&self.charset, default_to_ascii()).map_err(ConfigError::Charset)?;
        let alphabet = build_chars(charset, self.chars.as_deref());

        let color_mode = match self.colormode {
            Some(bits) => Some(color_mode_from_bits(bits).ok_or(ConfigError::ColorMode(bits))?),
            None => None,
        };

        let duration = match self.duration {
            Some(s) if !s.is_finite() => {
                return Err(ConfigError::NotFinite {
                    name: "--duration",
                    value: s,
                })
            }
            Some(s) if s > 0.0 => Some(Duration::from_secs_f64(require_range(
                "--duration",
                s,
                0.1,
                86400.0,
            )?)),
            _ => None,
        };

        let roles = if self.no_typing {
            Vec::new()
        } else if self.roles.is_empty() {
            DEFAULT_ROLES.iter().map(|r| r.to_string()).collect()
        } else {
            self.roles.clone()
        };

        Ok(Settings {
            fps,
            geometry,
            alphabet,
            cell_height,
            resize_quiet: Duration::from_millis(debounce_ms as u64),
            color_mode,
            paint_bg: self.color_bg == ColorBg::Black,
            duration,
            roles,
        })
    }
}

pub fn print_list_charsets() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE CHARSET PRESETS:\x1b[0m");
        println!("\x1b[2mNOTE: Use only the VALUE (left side) with --charset.\x1b[0m");
    } else {
        println!("AVAILABLE CHARSET PRESETS:");
        println!("NOTE: Use only the VALUE (left side) with --charset.");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    for (name, desc) in PRESETS {
        println!("{:<12} {}", name, desc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::AnimatorSettings;
    use crate::scheduler::VISIBILITY_THRESHOLD;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("rainfield").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_reference_geometry() {
        let s = parse(&[]).validate().unwrap();
        assert_eq!(s.geometry, Geometry::default());
        assert_eq!(s.fps, 60.0);
        assert_eq!(s.cell_height, 20.0);
        assert_eq!(s.resize_quiet, Duration::from_millis(250));
        assert!(s.paint_bg);
        assert_eq!(s.duration, None);
        assert_eq!(s.roles.len(), DEFAULT_ROLES.len());
    }

    #[test]
    fn out_of_range_values_are_rejected_with_the_flag_name() {
        let err = parse(&["--fps", "500"]).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to apply --fps 500 (min 1 max 240)"
        );
        assert!(parse(&["--stream-length", "0"]).validate().is_err());
        assert!(parse(&["--step", "11"]).validate().is_err());
    }

    #[test]
    fn visibility_threshold_is_not_configurable() {
        let err = Args::try_parse_from(["rainfield", "--threshold", "0.5"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
        assert_eq!(AnimatorSettings::default().threshold, VISIBILITY_THRESHOLD);
    }

    #[test]
    fn colormode_must_be_a_known_depth() {
        let s = parse(&["--colormode", "256"]).validate().unwrap();
        assert_eq!(s.color_mode, Some(ColorMode::Color256));
        assert_eq!(
            parse(&["--colormode", "9"]).validate().unwrap_err(),
            ConfigError::ColorMode(9)
        );
    }

    #[test]
    fn charset_and_literal_alphabet() {
        let s = parse(&[]).validate().unwrap();
        assert_eq!(s.alphabet.len(), 56);
        let s = parse(&["--charset", "binary"]).validate().unwrap();
        assert_eq!(s.alphabet, vec!['0', '1']);
        let s = parse(&["--chars", "xy"]).validate().unwrap();
        assert_eq!(s.alphabet, vec!['x', 'y']);
        assert!(matches!(
            parse(&["--charset", "runes"]).validate(),
            Err(ConfigError::Charset(_))
        ));
    }

    #[test]
    fn non_positive_duration_disables_the_timer() {
        assert_eq!(parse(&["--duration", "0"]).validate().unwrap().duration, None);
        assert_eq!(
            parse(&["--duration", "2.5"]).validate().unwrap().duration,
            Some(Duration::from_millis(2500))
        );
        assert!(parse(&["--duration", "0.05"]).validate().is_err());
    }

    #[test]
    fn roles_override_and_disable() {
        let s = parse(&["-r", "Rustacean", "-r", "Tinkerer"]).validate().unwrap();
        assert_eq!(s.roles, vec!["Rustacean", "Tinkerer"]);
        let s = parse(&["--no-typing", "-r", "x"]).validate().unwrap();
        assert!(s.roles.is_empty());
    }

    #[test]
    fn transparent_background_skips_painting() {
        let s = parse(&["--color-bg", "transparent"]).validate().unwrap();
        assert!(!s.paint_bg);
    }
}
