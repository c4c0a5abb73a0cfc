//! In-memory JSON source for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use holocron_core::Error;
use serde_json::{Value, json};

use crate::fetch::JsonSource;

/// Canned responses keyed by URL, with per-URL latency and call counting.
#[derive(Default)]
pub(crate) struct StubSource {
    responses: HashMap<String, (Duration, Result<Value, Error>)>,
    calls: Mutex<Vec<String>>,
}

impl StubSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(self, url: &str, value: Value) -> Self {
        self.with_delay(url, Duration::ZERO, value)
    }

    pub(crate) fn with_delay(mut self, url: &str, delay: Duration, value: Value) -> Self {
        self.responses.insert(url.to_string(), (delay, Ok(value)));
        self
    }

    pub(crate) fn failing(mut self, url: &str, error: Error) -> Self {
        self.responses.insert(url.to_string(), (Duration::ZERO, Err(error)));
        self
    }

    pub(crate) fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl JsonSource for StubSource {
    async fn get_json(&self, url: &str) -> Result<Value, Error> {
        self.calls.lock().unwrap().push(url.to_string());

        let Some((delay, result)) = self.responses.get(url).cloned() else {
            return Err(Error::Fetch(format!("status 404 for {url}")));
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

pub(crate) fn character_json(id: usize, name: &str, films: &[&str]) -> Value {
    json!({
        "name": name,
        "height": "172",
        "mass": "77",
        "hair_color": "blond",
        "skin_color": "fair",
        "eye_color": "blue",
        "birth_year": "19BBY",
        "gender": "male",
        "films": films,
        "url": format!("https://swapi.info/api/people/{id}"),
    })
}

pub(crate) fn film_json(id: usize, title: &str, characters: &[&str]) -> Value {
    json!({
        "title": title,
        "episode_id": id + 3,
        "opening_crawl": "It is a period of civil war.",
        "director": "George Lucas",
        "producer": "Gary Kurtz",
        "release_date": "1977-05-25",
        "characters": characters,
        "url": format!("https://swapi.info/api/films/{id}"),
    })
}
