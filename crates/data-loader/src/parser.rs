//! Parser for catalog dataset files.
//!
//! A dataset directory holds two JSON documents:
//! - catalog.json: array of content items
//! - peer_actions.json: array of `{user_id, content_id, action}` rows
//!
//! Parsing only checks shape and per-row values; cross-file references are
//! checked by `DataIndex::validate`.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read a JSON array file into a Vec, mapping failures onto `DataLoadError`.
fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| DataLoadError::ParseError {
        file: file_name(path),
        reason: e.to_string(),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse catalog.json
///
/// Genres are de-duplicated (first occurrence wins), ratings must be within
/// 0.0..=10.0 and ids must be unique.
pub fn parse_catalog(path: &Path) -> Result<Vec<ContentItem>> {
    let raw: Vec<ContentItem> = read_json_array(path)?;
    let mut seen = HashSet::with_capacity(raw.len());
    let mut items = Vec::with_capacity(raw.len());

    for mut item in raw {
        if !seen.insert(item.id) {
            return Err(DataLoadError::DuplicateId { id: item.id });
        }
        if !(0.0..=10.0).contains(&item.rating) {
            return Err(DataLoadError::InvalidValue {
                field: format!("rating of item {}", item.id),
                value: item.rating.to_string(),
            });
        }
        let genres = std::mem::take(&mut item.genres);
        items.push(item.with_genres(genres));
    }
    Ok(items)
}

/// Parse peer_actions.json
pub fn parse_peer_actions(path: &Path) -> Result<Vec<PeerAction>> {
    read_json_array(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_catalog() {
        let file = write_temp(
            r#"[
                {"id": 1, "title": "Parasite", "genres": ["Thriller", "Drama", "Thriller"],
                 "language": "ko", "release_date": "2019-05-30", "rating": 8.5,
                 "vote_count": 17000, "popularity": 61.2, "director": "Bong Joon-ho",
                 "poster_path": "/parasite.jpg"},
                {"id": 2, "title": "Minimal"}
            ]"#,
        );

        let items = parse_catalog(file.path()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].genres, vec!["Thriller".to_string(), "Drama".to_string()]);
        assert_eq!(items[0].release_year(), Some(2019));
        assert_eq!(items[0].director.as_deref(), Some("Bong Joon-ho"));
        assert_eq!(items[1].content_type, ContentType::Movie);
        assert!(items[1].genres.is_empty());
    }

    #[test]
    fn test_parse_catalog_rejects_duplicate_ids() {
        let file = write_temp(r#"[{"id": 1, "title": "A"}, {"id": 1, "title": "B"}]"#);
        let result = parse_catalog(file.path());
        assert!(matches!(result, Err(DataLoadError::DuplicateId { id: 1 })));
    }

    #[test]
    fn test_parse_catalog_rejects_out_of_range_rating() {
        let file = write_temp(r#"[{"id": 1, "title": "A", "rating": 11.0}]"#);
        let result = parse_catalog(file.path());
        assert!(matches!(result, Err(DataLoadError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_peer_actions() {
        let file = write_temp(
            r#"[{"user_id": 2, "content_id": 1, "action": "like"},
                {"user_id": 3, "content_id": 1, "action": "save_for_later"}]"#,
        );
        let actions = parse_peer_actions(file.path()).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1].action, ActionKind::SaveForLater);
    }

    #[test]
    fn test_parse_errors() {
        let file = write_temp("{not json");
        assert!(matches!(
            parse_peer_actions(file.path()),
            Err(DataLoadError::ParseError { .. })
        ));
        assert!(matches!(
            parse_catalog(Path::new("/definitely/missing/catalog.json")),
            Err(DataLoadError::FileNotFound { .. })
        ));
    }
}
