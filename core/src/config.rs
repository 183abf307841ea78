use serde::{Deserialize, Serialize};

pub const MIN_FACTOR: u8 = 1;
pub const MAX_FACTOR: u8 = 20;
pub const DEFAULT_FACTOR: u8 = 12;
pub const ROUND_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default = "default_max_factor")]
    pub max_factor: u8,
    #[serde(default = "default_round_secs")]
    pub round_secs: u32,
}

fn default_max_factor() -> u8 {
    DEFAULT_FACTOR
}

fn default_round_secs() -> u32 {
    ROUND_SECS
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            max_factor: DEFAULT_FACTOR,
            round_secs: ROUND_SECS,
        }
    }
}

impl QuizConfig {
    pub fn with_max_factor(max_factor: u8) -> Self {
        Self {
            max_factor: clamp_factor(i64::from(max_factor)),
            ..Self::default()
        }
    }

    /// Settings read back from disk are not trusted.
    pub fn clamped(self) -> Self {
        Self {
            max_factor: clamp_factor(i64::from(self.max_factor)),
            round_secs: if self.round_secs == 0 {
                ROUND_SECS
            } else {
                self.round_secs
            },
        }
    }
}

fn clamp_factor(value: i64) -> u8 {
    // Clamped into 1..=20, so the cast cannot truncate.
    value.clamp(i64::from(MIN_FACTOR), i64::from(MAX_FACTOR)) as u8
}

/// Reads the integer at the start of `text`, ignoring surrounding whitespace
/// and anything after the digits. `"7 apples"` is 7, `"abc"` is `None`.
pub fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Overlong inputs saturate; they are clamped by every caller anyway.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Max factor typed on the start screen. Blank, non-numeric and zero input
/// fall back to the default before clamping.
pub fn parse_max_factor(text: &str) -> u8 {
    match leading_integer(text) {
        Some(0) | None => DEFAULT_FACTOR,
        Some(n) => clamp_factor(n),
    }
}

pub fn step_up(text: &str) -> u8 {
    clamp_factor(step_base(text).saturating_add(1))
}

pub fn step_down(text: &str) -> u8 {
    clamp_factor(step_base(text).saturating_sub(1))
}

fn step_base(text: &str) -> i64 {
    match leading_integer(text) {
        Some(0) | None => 1,
        Some(n) => n,
    }
}
