//! View paths.
//!
//! Two sections, each optionally suffixed by an entity id. The root path
//! redirects to the films section.

use std::fmt;

use crate::Error;
use crate::model::Kind;

/// A parsed view path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub section: Kind,
    pub id: Option<String>,
}

impl Route {
    pub fn section(section: Kind) -> Self {
        Self { section, id: None }
    }

    pub fn entity(section: Kind, id: impl Into<String>) -> Self {
        Self { section, id: Some(id.into()) }
    }

    /// Parse a path such as `/characters/4`.
    ///
    /// An empty path or `/` yields the films section.
    pub fn parse(path: &str) -> Result<Self, Error> {
        let mut segments = path.trim().split('/').filter(|s| !s.is_empty());

        let Some(first) = segments.next() else {
            return Ok(Self::section(Kind::Films));
        };

        let section = first
            .parse::<Kind>()
            .map_err(|_| Error::InvalidInput(format!("unknown route: {path}")))?;
        let id = segments.next().map(str::to_string);

        if segments.next().is_some() {
            return Err(Error::InvalidInput(format!("unknown route: {path}")));
        }

        Ok(Self { section, id })
    }

    /// Render back to a path.
    pub fn to_path(&self) -> String {
        match &self.id {
            Some(id) => format!("/{}/{}", self.section.section(), id),
            None => format!("/{}", self.section.section()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}
