// Persistence - full-overwrite story snapshots in a key-value blob
// store, plus file export/import of the same serialized form.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::settings::VisualSettings;
use crate::story::Story;

/// Blob key prefix; the full key is `story-<story id>`.
pub const STORY_KEY_PREFIX: &str = "story-";

#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("failed to encode story: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode story: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage backend is not available")]
    Unavailable,
}

/// The minimal store surface the editor needs: load and full-overwrite
/// save of one UTF-8 blob per key.
pub trait BlobStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), PersistError>;
}

/// What a story blob holds: the document plus the canvas settings that
/// ride along with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySnapshot {
    pub story: Story,
    #[serde(default)]
    pub settings: VisualSettings,
}

pub fn story_key(id: &str) -> String {
    format!("{STORY_KEY_PREFIX}{id}")
}

pub fn encode(snapshot: &StorySnapshot) -> Result<String, PersistError> {
    serde_json::to_string_pretty(snapshot).map_err(PersistError::Encode)
}

pub fn decode(blob: &str) -> Result<StorySnapshot, PersistError> {
    serde_json::from_str(blob).map_err(PersistError::Decode)
}

pub fn save_story(
    blobs: &mut dyn BlobStore,
    story: &Story,
    settings: &VisualSettings,
) -> Result<(), PersistError> {
    let snapshot = StorySnapshot {
        story: story.clone(),
        settings: settings.clone(),
    };
    blobs.set(&story_key(&story.id), encode(&snapshot)?)
}

/// Load the story stored under `id`. A missing key is not an error: it
/// yields the default empty story. A present but unreadable blob is.
pub fn load_story(
    blobs: &dyn BlobStore,
    id: &str,
) -> Result<StorySnapshot, PersistError> {
    match blobs.get(&story_key(id)) {
        Some(blob) => decode(&blob),
        None => Ok(StorySnapshot {
            story: Story::empty(id),
            settings: VisualSettings::default(),
        }),
    }
}

// ------------------------------------------------------------------
// Store backends
// ------------------------------------------------------------------

/// Adapter over the storage eframe hands the app. Saves flush
/// immediately: persistence is write-through, never batched.
pub struct EframeStore<'a>(pub &'a mut dyn eframe::Storage);

impl BlobStore for EframeStore<'_> {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get_string(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PersistError> {
        self.0.set_string(key, value);
        self.0.flush();
        Ok(())
    }
}

/// Stand-in used when the frame exposes no storage; reads find
/// nothing and writes surface as persistence failures.
pub struct UnavailableStore;

impl BlobStore for UnavailableStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, _key: &str, _value: String) -> Result<(), PersistError> {
        Err(PersistError::Unavailable)
    }
}

/// In-memory store for tests and headless use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: std::collections::HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.blobs.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PersistError> {
        self.blobs.insert(key.to_string(), value);
        Ok(())
    }
}

// ------------------------------------------------------------------
// File export / import
// ------------------------------------------------------------------

#[cfg(not(target_arch = "wasm32"))]
pub fn export_to_file(
    path: &std::path::Path,
    snapshot: &StorySnapshot,
) -> Result<(), PersistError> {
    std::fs::write(path, encode(snapshot)?).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub fn import_from_file(
    path: &std::path::Path,
) -> Result<StorySnapshot, PersistError> {
    let blob =
        std::fs::read_to_string(path).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    decode(&blob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::StoryNode;

    fn sample_story() -> Story {
        let mut story = Story::empty("tale-1");
        story.title = String::from("The Cave");
        story.main_link = String::from("https://example.org/cave");
        story.nodes.push(StoryNode {
            id: String::from("node-1"),
            title: String::from("Start"),
            body: String::from("go to [[End]]"),
            main: true,
            x: 120.0,
            y: 80.0,
            expanded: true,
        });
        story
    }

    #[test]
    fn save_then_load_round_trips_structurally() {
        let mut blobs = MemoryStore::new();
        let story = sample_story();
        let settings = VisualSettings::default();
        save_story(&mut blobs, &story, &settings).unwrap();

        let loaded = load_story(&blobs, "tale-1").unwrap();
        assert_eq!(loaded.story, story);
        assert_eq!(loaded.settings, settings);
    }

    #[test]
    fn loading_a_missing_key_yields_the_default_empty_story() {
        let blobs = MemoryStore::new();
        let loaded = load_story(&blobs, "nothing-here").unwrap();
        assert_eq!(loaded.story, Story::empty("nothing-here"));
        assert_eq!(loaded.story.title, "Untitled Story");
    }

    #[test]
    fn snapshots_missing_optional_fields_load_with_defaults() {
        let blob = r#"{
            "story": {
                "id": "old",
                "title": "Old Save",
                "nodes": [
                    {"id": "n", "title": "A", "body": "", "x": 1.0, "y": 2.0}
                ]
            }
        }"#;
        let snapshot = decode(blob).unwrap();
        assert!(!snapshot.story.nodes[0].main);
        assert!(!snapshot.story.nodes[0].expanded);
        assert!(snapshot.story.main_link.is_empty());
        assert_eq!(snapshot.settings, VisualSettings::default());
    }

    #[test]
    fn corrupt_blobs_decode_to_an_error() {
        let mut blobs = MemoryStore::new();
        blobs
            .set(&story_key("bad"), String::from("not json"))
            .unwrap();
        assert!(matches!(
            load_story(&blobs, "bad"),
            Err(PersistError::Decode(_))
        ));
    }

    #[test]
    fn unavailable_store_fails_writes_and_reads_empty() {
        let mut blobs = UnavailableStore;
        assert!(blobs.get("story-x").is_none());
        let story = sample_story();
        assert!(matches!(
            save_story(&mut blobs, &story, &VisualSettings::default()),
            Err(PersistError::Unavailable)
        ));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn file_export_import_round_trips() {
        let snapshot = StorySnapshot {
            story: sample_story(),
            settings: VisualSettings::default(),
        };
        let path = std::env::temp_dir().join("storymapper_export_test.json");
        export_to_file(&path, &snapshot).unwrap();
        let imported = import_from_file(&path).unwrap();
        assert_eq!(imported, snapshot);
        std::fs::remove_file(&path).ok();
    }
}
