//! Habit field rules and public sharing ids.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::ValidationError;

pub const NAME_MAX_LEN: u64 = 100;
pub const DESCRIPTION_MAX_LEN: u64 = 500;
pub const ICON_MAX_LEN: u64 = 50;

pub const DEFAULT_COLOR: &str = "#3B82F6";
pub const DEFAULT_ICON: &str = "star";

/// Number of random bytes behind a public id (rendered as lowercase hex).
const PUBLIC_ID_BYTES: usize = 8;

static HEX_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("hex color regex is valid")
});

/// How often a habit is meant to be performed.
///
/// Informational only: the streak calculator always works in calendar days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    #[default]
    Daily,
    Weekly,
    Custom,
}

impl HabitFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            HabitFrequency::Daily => "daily",
            HabitFrequency::Weekly => "weekly",
            HabitFrequency::Custom => "custom",
        }
    }
}

impl fmt::Display for HabitFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HabitFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(HabitFrequency::Daily),
            "weekly" => Ok(HabitFrequency::Weekly),
            "custom" => Ok(HabitFrequency::Custom),
            other => Err(format!("Unknown frequency '{other}'")),
        }
    }
}

/// `validator` hook for `#RGB` / `#RRGGBB` colors.
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    if HEX_COLOR_RE.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("hex_color");
        err.message =
            Some("Invalid color format. Must be a valid hex color (e.g., #3B82F6)".into());
        Err(err)
    }
}

/// Generate a fresh opaque public sharing id.
pub fn generate_public_id() -> String {
    let mut bytes = [0u8; PUBLIC_ID_BYTES];
    rand::rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// The public id a habit must carry given its visibility.
///
/// Private habits never keep an id. A habit that stays public keeps its
/// current id; one that becomes public gets a new one.
pub fn resolve_public_id(is_public: bool, current: Option<&str>) -> Option<String> {
    if !is_public {
        return None;
    }
    Some(
        current
            .map(str::to_owned)
            .unwrap_or_else(generate_public_id),
    )
}
