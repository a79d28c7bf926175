//! Column discovery by case-insensitive header matching.
//!
//! Each semantic field has an ordered list of [`Matcher`]s. Fields are
//! resolved in a fixed priority order and a column claimed by one field
//! cannot be claimed by a later one. Within a field, earlier matchers take
//! precedence; a matcher accepting several headers picks the leftmost.
//!
//! The defaults reproduce the French satisfaction survey this tool was built
//! for. A JSON file with the same shape as [`DiscoveryConfig`] overrides them:
//!
//! ```json
//! {
//!   "recommendation": [{ "all": ["recommend"], "none": ["why"] }],
//!   "services": ["pool", "coach"]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Accepts a header when it contains every `all` substring and no `none`
/// substring, compared lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matcher {
    pub all: Vec<String>,
    #[serde(default)]
    pub none: Vec<String>,
}

impl Matcher {
    pub fn contains(all: &[&str]) -> Self {
        Self {
            all: all.iter().map(|s| s.to_lowercase()).collect(),
            none: Vec::new(),
        }
    }

    pub fn excluding(mut self, none: &[&str]) -> Self {
        self.none = none.iter().map(|s| s.to_lowercase()).collect();
        self
    }

    pub fn matches(&self, header: &str) -> bool {
        let header = header.to_lowercase();
        !self.all.is_empty()
            && self.all.iter().all(|s| header.contains(&s.to_lowercase()))
            && !self.none.iter().any(|s| header.contains(&s.to_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub timestamp: Vec<Matcher>,
    pub recommendation: Vec<Matcher>,
    pub retention: Vec<Matcher>,
    pub retention_comment: Vec<Matcher>,
    pub comment: Vec<Matcher>,
    pub services: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timestamp: vec![
                Matcher::contains(&["horodateur"]),
                Matcher::contains(&["timestamp"]),
                Matcher::contains(&["date"]),
            ],
            recommendation: vec![
                Matcher::contains(&["recommand"]).excluding(&["pourquoi"]),
                Matcher::contains(&["recommend"]).excluding(&["why"]),
            ],
            retention: vec![
                Matcher::contains(&["probabilité"]).excluding(&["pourquoi"]),
                Matcher::contains(&["probabilite"]).excluding(&["pourquoi"]),
                Matcher::contains(&["likely"]).excluding(&["why", "recommend"]),
            ],
            retention_comment: vec![
                Matcher::contains(&["pourquoi", "abonn"]),
                Matcher::contains(&["pourquoi", "probabilit"]),
                Matcher::contains(&["why", "renew"]),
            ],
            comment: vec![
                Matcher::contains(&["pourquoi"]),
                Matcher::contains(&["commentaire"]),
                Matcher::contains(&["avis"]),
                Matcher::contains(&["comment"]),
            ],
            services: [
                "piscine",
                "pool",
                "coach",
                "équipement",
                "equipement",
                "equipment",
                "accueil",
                "reception",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl DiscoveryConfig {
    /// Loads a discovery config from a JSON file. Missing fields keep their
    /// defaults.
    pub fn load(path: &str) -> Result<Self, IngestError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| IngestError::Config(format!("cannot read '{path}': {e}")))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, IngestError> {
        serde_json::from_str(content).map_err(|e| IngestError::Config(e.to_string()))
    }

    /// Resolves semantic fields against the (already unique) header list.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Schema`] if no recommendation column exists.
    pub fn discover(&self, headers: &[String]) -> Result<ColumnMap, IngestError> {
        let mut claimed: Vec<usize> = Vec::new();

        let mut pick = |matchers: &[Matcher]| -> Option<usize> {
            let idx = matchers.iter().find_map(|m| {
                headers
                    .iter()
                    .enumerate()
                    .find_map(|(i, h)| (!claimed.contains(&i) && m.matches(h)).then_some(i))
            })?;
            claimed.push(idx);
            Some(idx)
        };

        let recommendation = pick(&self.recommendation).ok_or(IngestError::Schema {
            field: "recommendation",
        })?;
        let retention = pick(&self.retention);
        let timestamp = pick(&self.timestamp);
        let retention_comment = pick(&self.retention_comment);
        let comment = pick(&self.comment);

        let services = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| {
                let lower = h.to_lowercase();
                !claimed.contains(i)
                    && self
                        .services
                        .iter()
                        .any(|s| lower.contains(&s.to_lowercase()))
            })
            .map(|(i, _)| i)
            .collect();

        Ok(ColumnMap {
            timestamp,
            recommendation,
            retention,
            retention_comment,
            comment,
            services,
        })
    }
}

/// Column indices resolved for each semantic field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub timestamp: Option<usize>,
    pub recommendation: usize,
    pub retention: Option<usize>,
    pub retention_comment: Option<usize>,
    pub comment: Option<usize>,
    pub services: Vec<usize>,
}

impl ColumnMap {
    /// Pairs each semantic field with the header it resolved to, for diagnostics.
    pub fn describe<'a>(&self, headers: &'a [String]) -> Vec<(&'static str, &'a str)> {
        let name = |i: usize| headers.get(i).map(String::as_str).unwrap_or("");
        let mut out = vec![("recommendation", name(self.recommendation))];
        let optional = [
            ("retention", self.retention),
            ("timestamp", self.timestamp),
            ("retention_comment", self.retention_comment),
            ("comment", self.comment),
        ];
        out.extend(
            optional
                .into_iter()
                .filter_map(|(field, idx)| idx.map(|i| (field, name(i)))),
        );
        out.extend(self.services.iter().map(|&i| ("service", name(i))));
        out
    }
}
