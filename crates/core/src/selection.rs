//! Resolving the selected entity from a route identifier.

use crate::model::Resource;

/// Identifier of an entity: the final non-empty path segment of its URL.
///
/// Query strings and fragments are ignored, so `https://host/api/people/4/`
/// and `https://host/api/people/4?format=json` both yield `4`.
pub fn id_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let path = path.split_once("://").map_or(path, |(_, rest)| rest.split_once('/').map_or("", |(_, p)| p));
    path.rsplit('/').find(|segment| !segment.is_empty())
}

/// Find the entity whose URL-derived id equals `route_id`.
///
/// Returns `None` when the collection is not loaded, no id is routed, or
/// nothing matches; all three render an empty detail panel.
pub fn resolve<'a, E: Resource>(collection: Option<&'a [E]>, route_id: Option<&str>) -> Option<&'a E> {
    let route_id = route_id?;
    collection?.iter().find(|entity| entity.id() == Some(route_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Character;

    fn character(name: &str, url: &str) -> Character {
        serde_json::from_value(serde_json::json!({ "name": name, "url": url })).unwrap()
    }

    #[test]
    fn test_id_trailing_slash() {
        assert_eq!(id_from_url("https://swapi.info/api/people/4/"), Some("4"));
    }

    #[test]
    fn test_id_no_trailing_slash() {
        assert_eq!(id_from_url("https://swapi.info/api/films/1"), Some("1"));
    }

    #[test]
    fn test_id_ignores_query_and_fragment() {
        assert_eq!(id_from_url("https://swapi.info/api/people/5?format=json"), Some("5"));
        assert_eq!(id_from_url("https://swapi.info/api/people/5/#top"), Some("5"));
    }

    #[test]
    fn test_id_relative_path() {
        assert_eq!(id_from_url("/api/people/12//"), Some("12"));
    }

    #[test]
    fn test_id_missing() {
        assert_eq!(id_from_url(""), None);
        assert_eq!(id_from_url("https://swapi.info/"), None);
        assert_eq!(id_from_url("https://swapi.info"), None);
    }

    #[test]
    fn test_resolve_exact_match() {
        let people = vec![
            character("Luke Skywalker", "https://swapi.info/api/people/1/"),
            character("Darth Vader", "https://swapi.info/api/people/4/"),
            character("Leia Organa", "https://swapi.info/api/people/5/"),
        ];

        let selected = resolve(Some(people.as_slice()), Some("4")).unwrap();
        assert_eq!(selected.name, "Darth Vader");
    }

    #[test]
    fn test_resolve_no_prefix_match() {
        let people = vec![character("Obi-Wan Kenobi", "https://swapi.info/api/people/10/")];
        assert!(resolve(Some(people.as_slice()), Some("1")).is_none());
    }

    #[test]
    fn test_resolve_absent_inputs() {
        let people = vec![character("Luke Skywalker", "https://swapi.info/api/people/1/")];
        assert!(resolve::<Character>(None, Some("1")).is_none());
        assert!(resolve(Some(people.as_slice()), None).is_none());
    }
}
