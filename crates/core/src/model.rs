//! Catalog entities as served by the API.
//!
//! Films and characters cross-reference each other by URL. Descriptive fields
//! default to empty so a partial payload still yields a listable entity; the
//! display name and self URL are required.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::selection::id_from_url;

/// The two browsable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Films,
    Characters,
}

impl Kind {
    /// Path of the collection endpoint below the API root.
    pub fn endpoint(self) -> &'static str {
        match self {
            Kind::Films => "films",
            Kind::Characters => "people",
        }
    }

    /// Name of the view section (and first route segment).
    pub fn section(self) -> &'static str {
        match self {
            Kind::Films => "films",
            Kind::Characters => "characters",
        }
    }

    /// Kind listed in this kind's cross-reference field.
    pub fn related(self) -> Kind {
        match self {
            Kind::Films => Kind::Characters,
            Kind::Characters => Kind::Films,
        }
    }

    /// Cache key of the whole collection.
    pub fn collection_key(self) -> String {
        format!("collection:{}", self.section())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "films" => Ok(Kind::Films),
            "characters" => Ok(Kind::Characters),
            other => Err(Error::InvalidInput(format!("unknown section: {other}"))),
        }
    }
}

/// A labelled value shown in the detail panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DetailField {
    pub label: String,
    pub value: String,
}

impl DetailField {
    fn new(label: &str, value: impl ToString) -> Self {
        Self { label: label.to_string(), value: value.to_string() }
    }
}

/// Behaviour shared by every catalog entity.
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Kind of this entity.
    const KIND: Kind;

    /// Entity type referenced by [`Resource::related_urls`].
    type Related: Resource;

    /// Display name used for listing and search matching.
    fn name(&self) -> &str;

    /// Self-referential URL; the entity's identity.
    fn url(&self) -> &str;

    /// URLs of related entities, in API order.
    fn related_urls(&self) -> &[String];

    /// Labelled fields for the detail panel.
    fn details(&self) -> Vec<DetailField>;

    /// Short text for list cards.
    fn excerpt(&self, _max_chars: usize) -> Option<String> {
        None
    }

    /// Identifier derived from the self URL.
    fn id(&self) -> Option<&str> {
        id_from_url(self.url())
    }
}

/// A film.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Film {
    pub title: String,
    #[serde(default)]
    pub episode_id: u32,
    #[serde(default)]
    pub opening_crawl: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub producer: String,
    #[serde(default)]
    pub release_date: String,
    /// Character URLs.
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub planets: Vec<String>,
    #[serde(default)]
    pub starships: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub edited: Option<String>,
    pub url: String,
}

impl Resource for Film {
    const KIND: Kind = Kind::Films;
    type Related = Character;

    fn name(&self) -> &str {
        &self.title
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn related_urls(&self) -> &[String] {
        &self.characters
    }

    fn details(&self) -> Vec<DetailField> {
        vec![
            DetailField::new("Episode", self.episode_id),
            DetailField::new("Director", &self.director),
            DetailField::new("Producer", &self.producer),
            DetailField::new("Release Date", &self.release_date),
            DetailField::new("Opening Crawl", &self.opening_crawl),
        ]
    }

    fn excerpt(&self, max_chars: usize) -> Option<String> {
        Some(truncate(&self.opening_crawl, max_chars))
    }
}

/// A character ("people" in the API).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub mass: String,
    #[serde(default)]
    pub hair_color: String,
    #[serde(default)]
    pub skin_color: String,
    #[serde(default)]
    pub eye_color: String,
    #[serde(default)]
    pub birth_year: String,
    #[serde(default)]
    pub gender: String,
    /// Film URLs.
    #[serde(default)]
    pub films: Vec<String>,
    pub url: String,
}

impl Resource for Character {
    const KIND: Kind = Kind::Characters;
    type Related = Film;

    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn related_urls(&self) -> &[String] {
        &self.films
    }

    fn details(&self) -> Vec<DetailField> {
        vec![
            DetailField::new("Height", &self.height),
            DetailField::new("Mass", &self.mass),
            DetailField::new("Hair", &self.hair_color),
            DetailField::new("Skin", &self.skin_color),
            DetailField::new("Eye color", &self.eye_color),
            DetailField::new("Birth year", &self.birth_year),
            DetailField::new("Gender", &self.gender),
        ]
    }
}

/// Cut `text` to `max_chars` characters, marking the cut with `...`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}
