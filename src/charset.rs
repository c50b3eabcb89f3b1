// Copyright (c) 2026 rezky_nightky

use std::char;

pub const RAIN_GLYPHS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789@#$%^&*(){}[]<>?/\\|~";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Charset {
    Rain,
    Ascii,
    Letters,
    Digits,
    Binary,
    Hex,
    Katakana,
    Blocks,
}

pub const PRESETS: &[(&str, &str)] = &[
    ("auto", "katakana when the locale is UTF-8, otherwise rain"),
    ("rain", "A-Z, 0-9 and @#$%^&*(){}[]<>?/\\|~"),
    ("ascii", "Letters, digits and punctuation"),
    ("letters", "A-Z only (alias: english)"),
    ("digits", "0-9 only (aliases: dec, decimal)"),
    ("binary", "0 and 1 (aliases: bin, 01)"),
    ("hex", "0-9 and A-F (alias: hexadecimal)"),
    ("katakana", "Half-width katakana"),
    ("blocks", "Block elements"),
];

pub fn charset_from_str(spec: &str, default_to_ascii: bool) -> Result<Charset, String> {
    let spec = spec.trim().to_ascii_lowercase();
    match spec.as_str() {
        "auto" => Ok(if default_to_ascii {
            Charset::Rain
        } else {
            Charset::Katakana
        }),
        "rain" => Ok(Charset::Rain),
        "ascii" => Ok(Charset::Ascii),
        "letters" | "english" => Ok(Charset::Letters),
        "digits" | "dec" | "decimal" => Ok(Charset::Digits),
        "bin" | "binary" | "01" => Ok(Charset::Binary),
        "hex" | "hexadecimal" => Ok(Charset::Hex),
        "katakana" => Ok(Charset::Katakana),
        "blocks" => Ok(Charset::Blocks),
        _ => Err(format!(
            "unsupported charset: {} (see --list-charsets)",
            spec
        )),
    }
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    out.extend((start..=end).filter_map(char::from_u32));
}

pub fn build_chars(charset: Charset, custom: Option<&str>) -> Vec<char> {
    let mut out: Vec<char> = Vec::new();

    if let Some(custom) = custom {
        out.extend(custom.chars().filter(|c| !c.is_control() && !c.is_whitespace()));
        out.dedup();
    }

    if out.is_empty() {
        match charset {
            Charset::Rain => out.extend(RAIN_GLYPHS.chars()),
            Charset::Ascii => push_range(&mut out, 0x21, 0x7E),
            Charset::Letters => push_range(&mut out, 0x41, 0x5A),
            Charset::Digits => push_range(&mut out, 0x30, 0x39),
            Charset::Binary => push_range(&mut out, 0x30, 0x31),
            Charset::Hex => {
                push_range(&mut out, 0x30, 0x39);
                push_range(&mut out, 0x41, 0x46);
            }
            Charset::Katakana => push_range(&mut out, 0xFF66, 0xFF9D),
            Charset::Blocks => push_range(&mut out, 0x2580, 0x259F),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_alphabet_is_letters_digits_and_symbols() {
        let out = build_chars(Charset::Rain, None);
        assert_eq!(out.len(), 26 + 10 + 20);
        assert!(out.contains(&'Z'));
        assert!(out.contains(&'7'));
        assert!(out.contains(&'\\'));
        assert!(!out.contains(&'a'));
    }

    #[test]
    fn charset_auto_stays_ascii_when_non_utf() {
        assert_eq!(charset_from_str("auto", true).unwrap(), Charset::Rain);
        assert_eq!(charset_from_str("AUTO", false).unwrap(), Charset::Katakana);
    }

    #[test]
    fn unknown_charset_is_rejected() {
        assert!(charset_from_str("klingon", false).is_err());
    }

    #[test]
    fn custom_chars_override_preset_and_blank_falls_back() {
        assert_eq!(build_chars(Charset::Rain, Some("01 ")), vec!['0', '1']);
        assert_eq!(build_chars(Charset::Binary, Some("  ")), vec!['0', '1']);
    }

    #[test]
    fn every_preset_is_parseable_and_non_empty() {
        for (name, _) in PRESETS {
            let cs = charset_from_str(name, false).unwrap();
            assert!(!build_chars(cs, None).is_empty(), "{name}");
        }
    }
}
