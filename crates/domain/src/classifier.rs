//! Lobby classification.
//!
//! A record is relevant when any include token occurs in its name or map
//! label, and no exclude token occurs in its map label. Matching is
//! case-insensitive, and whitespace inside a token matches any run of
//! whitespace, including none ("hero line" matches "HeroLine" and "Hero  Line").

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::entities::{Lobby, RawLobby};
use crate::error::DomainError;
use crate::ids::LobbyId;
use crate::value_objects::Category;

/// Token lists the classifier is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRules {
    /// Matched against name and map label.
    pub include: Vec<String>,
    /// Matched against map label only; wins over `include`.
    pub exclude: Vec<String>,
    /// Matched against map label to tag a lobby [`Category::Beta`].
    pub beta: Vec<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            include: vec!["hlw".into(), "heroline".into(), "hero line".into()],
            exclude: vec!["w8.".into()],
            beta: vec!["beta".into(), "test".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Relevant(Lobby),
    Irrelevant(IrrelevantReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrrelevantReason {
    NoTokenMatch,
    ExcludedMap,
    /// Record carries no identifier and cannot be tracked across polls.
    MissingId,
}

/// Compiled form of [`ClassifierRules`]. Pure and deterministic.
#[derive(Debug, Clone)]
pub struct LobbyClassifier {
    include: Option<Regex>,
    exclude: Option<Regex>,
    beta: Option<Regex>,
}

impl LobbyClassifier {
    pub fn new(rules: &ClassifierRules) -> Result<Self, DomainError> {
        Ok(Self {
            include: compile_tokens(&rules.include)?,
            exclude: compile_tokens(&rules.exclude)?,
            beta: compile_tokens(&rules.beta)?,
        })
    }

    pub fn classify(&self, raw: &RawLobby) -> Classification {
        let name = raw.name.as_deref().unwrap_or_default();
        let map = raw.map.as_deref().unwrap_or_default();

        if !self.is_relevant_text(name, map) {
            return Classification::Irrelevant(IrrelevantReason::NoTokenMatch);
        }
        if matches_any(self.exclude.as_ref(), map) {
            return Classification::Irrelevant(IrrelevantReason::ExcludedMap);
        }
        let Some(id) = raw.id else {
            return Classification::Irrelevant(IrrelevantReason::MissingId);
        };

        let category = if matches_any(self.beta.as_ref(), map) {
            Category::Beta
        } else {
            Category::Standard
        };
        Classification::Relevant(Lobby::from_raw(LobbyId::new(id), raw, category))
    }

    fn is_relevant_text(&self, name: &str, map: &str) -> bool {
        matches_any(self.include.as_ref(), name) || matches_any(self.include.as_ref(), map)
    }
}

fn matches_any(pattern: Option<&Regex>, text: &str) -> bool {
    pattern.is_some_and(|re| re.is_match(text))
}

/// Build one case-insensitive alternation from the tokens; `None` if there are none.
fn compile_tokens(tokens: &[String]) -> Result<Option<Regex>, DomainError> {
    let alternatives: Vec<String> = tokens
        .iter()
        .map(|token| {
            token
                .split_whitespace()
                .map(regex_lite::escape)
                .collect::<Vec<_>>()
                .join(r"\s*")
        })
        .filter(|alt| !alt.is_empty())
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    let pattern = format!("(?i)(?:{})", alternatives.join("|"));
    Regex::new(&pattern)
        .map(Some)
        .map_err(|e| DomainError::validation(format!("invalid classifier tokens: {e}")))
}
