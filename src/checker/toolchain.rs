//! Rust toolchain version parsing

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `MAJOR.MINOR.PATCH` compiler version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ToolchainVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ToolchainVersion {
    #[inline]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `1.86`, `1.86.0` or `1.90.0-nightly`. A missing patch is zero.
    #[inline]
    pub fn parse(text: &str) -> Option<Self> {
        let core = text.trim().split(['-', '+']).next()?;
        let mut parts = core.split('.');

        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };

        if parts.next().is_some() {
            return None;
        }

        Some(Self::new(major, minor, patch))
    }

    /// Parse the output of `rustc --version`, e.g. `rustc 1.86.0 (05f9846f8 2025-03-31)`
    #[inline]
    pub fn from_rustc_output(output: &str) -> Option<Self> {
        let mut words = output.split_whitespace();
        if words.next()? != "rustc" {
            return None;
        }
        Self::parse(words.next()?)
    }
}

impl fmt::Display for ToolchainVersion {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
