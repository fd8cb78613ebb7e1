use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// Disc categories. Ordinal values are part of the wire contract and must
/// not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum DiscCategory {
    Putter = 1,
    Mid = 2,
    Fairway = 3,
    Driver = 4,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown disc category: {0}")]
pub struct UnknownCategory(String);

impl DiscCategory {
    pub const ALL: [DiscCategory; 4] = [
        DiscCategory::Putter,
        DiscCategory::Mid,
        DiscCategory::Fairway,
        DiscCategory::Driver,
    ];

    pub fn id(&self) -> i64 {
        *self as i64
    }

    pub fn name(&self) -> &'static str {
        match self {
            DiscCategory::Putter => "Putter",
            DiscCategory::Mid => "Mid",
            DiscCategory::Fairway => "Fairway",
            DiscCategory::Driver => "Driver",
        }
    }
}

impl Display for DiscCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<DiscCategory> for i64 {
    fn from(category: DiscCategory) -> Self {
        category.id()
    }
}

impl TryFrom<i64> for DiscCategory {
    type Error = UnknownCategory;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DiscCategory::Putter),
            2 => Ok(DiscCategory::Mid),
            3 => Ok(DiscCategory::Fairway),
            4 => Ok(DiscCategory::Driver),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Accepts the ordinal or the case-insensitive name, as path parameters do.
impl FromStr for DiscCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(ordinal) = s.parse::<i64>() {
            return DiscCategory::try_from(ordinal);
        }
        DiscCategory::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
