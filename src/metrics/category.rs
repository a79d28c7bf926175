use serde::Serialize;
use std::fmt;

/// Lowest score counted as a promoter.
pub const PROMOTER_MIN: u8 = 9;
/// Lowest score counted as a passive. Everything below is a detractor.
pub const PASSIVE_MIN: u8 = 7;

/// Respondent category derived from a 0–10 recommendation score.
///
/// | Score | Category  |
/// |-------|-----------|
/// | 9–10  | Promoter  |
/// | 7–8   | Passive   |
/// | 0–6   | Detractor |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NpsCategory {
    Promoter,
    Passive,
    Detractor,
}

impl NpsCategory {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= PROMOTER_MIN => NpsCategory::Promoter,
            s if s >= PASSIVE_MIN => NpsCategory::Passive,
            _ => NpsCategory::Detractor,
        }
    }
}

impl fmt::Display for NpsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NpsCategory::Promoter => "promoter",
            NpsCategory::Passive => "passive",
            NpsCategory::Detractor => "detractor",
        })
    }
}
