//! Lobby records: the raw feed shape and the normalized entity.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::LobbyId;
use crate::value_objects::{Category, Occupancy};

/// One record from the lobby feed, as loosely typed as the feed itself.
///
/// Every field is optional. Numbers may arrive as integers, floats or strings;
/// anything unreadable becomes `None` instead of failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLobby {
    #[serde(deserialize_with = "lenient_number")]
    pub id: Option<u64>,
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub map: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub host: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub server: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub slots_taken: Option<u64>,
    #[serde(deserialize_with = "lenient_number")]
    pub slots_total: Option<u64>,
    /// Seconds the lobby has been open, when the feed reports it.
    #[serde(deserialize_with = "lenient_number")]
    pub uptime: Option<u64>,
}

/// A relevant lobby with normalized fields, produced by the classifier.
///
/// Display fields are replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lobby {
    pub id: LobbyId,
    pub name: String,
    pub map: String,
    pub host: String,
    pub realm: String,
    pub occupancy: Occupancy,
    pub uptime_secs: Option<u64>,
    pub category: Category,
}

impl Lobby {
    pub(crate) fn from_raw(id: LobbyId, raw: &RawLobby, category: Category) -> Self {
        Self {
            id,
            name: raw.name.clone().unwrap_or_default(),
            map: raw.map.clone().unwrap_or_default(),
            host: raw.host.clone().unwrap_or_default(),
            realm: raw.server.clone().unwrap_or_default(),
            occupancy: Occupancy::new(
                saturate(raw.slots_taken.unwrap_or(0)),
                saturate(raw.slots_total.unwrap_or(0)),
            ),
            uptime_secs: raw.uptime,
            category,
        }
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(LooseValue::Unsigned(n)) => Some(n),
        Some(LooseValue::Float(f)) if f.is_finite() && f >= 0.0 => Some(f.trunc() as u64),
        Some(LooseValue::Text(s)) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
        }
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(LooseValue::Text(s)) => Some(s),
        Some(LooseValue::Unsigned(n)) => Some(n.to_string()),
        Some(LooseValue::Signed(n)) => Some(n.to_string()),
        Some(LooseValue::Float(f)) => Some(f.to_string()),
        _ => None,
    })
}
