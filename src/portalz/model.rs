//! # Data Model
//!
//! Two families of types live here:
//!
//! - **Wire types** ([`Character`], [`Episode`], [`CharacterPage`]): what the
//!   character API sends. None of it is trusted. Every field deserializes
//!   leniently: a missing key, a `null`, or a value of the wrong shape falls back
//!   to the type's default instead of failing the whole record. Display accessors
//!   then substitute readable fallbacks so an empty string never reaches output.
//!
//! - **Cart types** ([`Snapshot`], [`CartEntry`]): what we persist. A snapshot
//!   copies just enough of a character to show it in the cart later without
//!   going back to the network.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const UNKNOWN: &str = "Unknown";

/// Accepts anything and falls back to `T::default()` when it does not fit.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

fn or_unknown(s: &str) -> &str {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        UNKNOWN
    } else {
        trimmed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    Alive,
    Dead,
    #[default]
    Unknown,
}

impl Status {
    pub fn from_api(s: &str) -> Self {
        match s {
            "Alive" => Status::Alive,
            "Dead" => Status::Dead,
            _ => Status::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Alive => "Alive",
            Status::Dead => "Dead",
            Status::Unknown => "unknown",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Status::Alive => "🟢",
            Status::Dead => "🔴",
            Status::Unknown => "⚪",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Status::from_api(&raw))
    }
}

pub fn species_emoji(species: &str) -> &'static str {
    match species.trim().to_lowercase().as_str() {
        "human" => "👤",
        "alien" => "👽",
        "robot" => "🤖",
        "mythological creature" => "🐉",
        "animal" => "🐾",
        "cronenberg" => "🧬",
        "disease" => "🦠",
        "parasite" => "🪱",
        _ => "👾",
    }
}

/// A `{name, url}` reference, as used for origin and location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(default, deserialize_with = "lenient")]
    pub id: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Status,
    #[serde(default, deserialize_with = "lenient")]
    pub species: String,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient")]
    pub gender: String,
    #[serde(default, deserialize_with = "lenient")]
    pub origin: NamedRef,
    #[serde(default, deserialize_with = "lenient")]
    pub location: NamedRef,
    #[serde(default, deserialize_with = "lenient")]
    pub image: String,
    #[serde(rename = "episode", default, deserialize_with = "lenient")]
    pub episodes: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub created: Option<DateTime<Utc>>,
}

impl Character {
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            "Unnamed character"
        } else {
            trimmed
        }
    }

    pub fn display_species(&self) -> &str {
        or_unknown(&self.species)
    }

    pub fn display_gender(&self) -> &str {
        or_unknown(&self.gender)
    }

    pub fn display_origin(&self) -> &str {
        or_unknown(&self.origin.name)
    }

    pub fn display_location(&self) -> &str {
        or_unknown(&self.location.name)
    }

    /// The free-text type, only when the API actually filled it in.
    pub fn display_kind(&self) -> Option<&str> {
        let trimmed = self.kind.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }

    pub fn snapshot(&self, price: u64) -> Snapshot {
        Snapshot {
            id: self.id,
            name: self.display_name().to_string(),
            image: self.image.clone(),
            price,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    #[serde(default, deserialize_with = "lenient")]
    pub id: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    /// Display code, e.g. `S01E01`.
    #[serde(rename = "episode", default, deserialize_with = "lenient")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient")]
    pub air_date: String,
}

impl Episode {
    pub fn display_code(&self) -> &str {
        let trimmed = self.code.trim();
        if trimmed.is_empty() {
            "S??E??"
        } else {
            trimmed
        }
    }

    pub fn display_name(&self) -> &str {
        or_unknown(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub count: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub pages: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub next: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub prev: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterPage {
    #[serde(default, deserialize_with = "lenient")]
    pub info: PageInfo,
    #[serde(default, deserialize_with = "lenient")]
    pub results: Vec<Character>,
}

/// What the cart remembers about a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub image: String,
    /// Unit price at the time it was last added.
    pub price: u64,
}

/// Per-character bookkeeping inside the cart.
///
/// `line_total == quantity * snapshot.price` always holds. An entry that drops
/// to zero stays in the map so its snapshot can be reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub quantity: u32,
    pub line_total: u64,
    pub snapshot: Snapshot,
}

impl CartEntry {
    pub fn empty(snapshot: Snapshot) -> Self {
        Self {
            quantity: 0,
            line_total: 0,
            snapshot,
        }
    }

    pub fn unit_price(&self) -> u64 {
        self.snapshot.price
    }

    pub fn is_active(&self) -> bool {
        self.quantity > 0
    }
}
