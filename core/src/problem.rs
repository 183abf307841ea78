use serde::{Deserialize, Serialize};
use std::fmt;

/// A multiplication question as shown to the player. Order is significant:
/// `3 × 7` and `7 × 3` are different questions on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactorPair {
    pub a: u8,
    pub b: u8,
}

impl FactorPair {
    pub fn new(a: u8, b: u8) -> Self {
        Self { a, b }
    }

    pub fn answer(&self) -> u32 {
        self.a as u32 * self.b as u32
    }

    pub fn display(&self) -> String {
        self.to_string()
    }

    /// Identity used for repeat detection.
    pub fn key(&self) -> String {
        format!("{}×{}", self.a, self.b)
    }

    /// The tier a pair belongs to is its larger factor.
    pub fn tier(&self) -> u8 {
        self.a.max(self.b)
    }

    pub fn swapped(&self) -> Self {
        Self::new(self.b, self.a)
    }
}

impl fmt::Display for FactorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.a, self.b)
    }
}
