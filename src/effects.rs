// Effects - deferred IO produced by the reducer. Runs synchronously
// between flushing actions and the next redraw, so every persisted
// snapshot reflects the mutations of the event that triggered it.

use std::path::PathBuf;

use crate::persistence::{self, BlobStore};
#[cfg(not(target_arch = "wasm32"))]
use crate::persistence::StorySnapshot;
use crate::store::Store;

#[derive(Debug, Clone)]
pub enum Effect {
    /// Write-through snapshot of the whole story to the blob store.
    SaveStory,
    /// Export the current snapshot to a user-chosen file.
    ExportStory { path: PathBuf },
    /// Replace the session story with the snapshot in a file.
    ImportStory { path: PathBuf },
}

pub fn run(store: &mut Store, blobs: &mut dyn BlobStore, effect: Effect) {
    match effect {
        Effect::SaveStory => {
            if let Err(e) =
                persistence::save_story(blobs, &store.story, &store.settings)
            {
                log::warn!("story save failed: {e}");
                store.error_message =
                    Some(format!("Could not save the story: {e}"));
            }
        }
        Effect::ExportStory { path } => {
            #[cfg(not(target_arch = "wasm32"))]
            {
                let snapshot = StorySnapshot {
                    story: store.story.clone(),
                    settings: store.settings.clone(),
                };
                if let Err(e) = persistence::export_to_file(&path, &snapshot) {
                    log::warn!("story export failed: {e}");
                    store.error_message =
                        Some(format!("Could not export the story: {e}"));
                }
            }
            #[cfg(target_arch = "wasm32")]
            {
                let _ = path;
                store.error_message =
                    Some(String::from("Export is not available in the browser"));
            }
        }
        Effect::ImportStory { path } => {
            #[cfg(not(target_arch = "wasm32"))]
            match persistence::import_from_file(&path) {
                Ok(snapshot) => {
                    store.replace_snapshot(snapshot);
                    // Adopt the import under the session key right away.
                    run(store, blobs, Effect::SaveStory);
                }
                Err(e) => {
                    log::warn!("story import failed: {e}");
                    store.error_message =
                        Some(format!("Could not import the story: {e}"));
                }
            }
            #[cfg(target_arch = "wasm32")]
            {
                let _ = path;
                store.error_message =
                    Some(String::from("Import is not available in the browser"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, UnavailableStore, story_key};
    use crate::settings::VisualSettings;
    use crate::story::{Story, StoryNode};

    fn store_with_one_node() -> Store {
        let mut story = Story::empty("fx");
        story.nodes.push(StoryNode {
            id: String::from("n1"),
            title: String::from("Start"),
            body: String::new(),
            main: false,
            x: 0.0,
            y: 0.0,
            expanded: false,
        });
        Store::new(StorySnapshot {
            story,
            settings: VisualSettings::default(),
        })
    }

    #[test]
    fn save_effect_writes_the_snapshot_under_the_story_key() {
        let mut store = store_with_one_node();
        let mut blobs = MemoryStore::new();
        run(&mut store, &mut blobs, Effect::SaveStory);
        assert!(store.error_message.is_none());

        let loaded = persistence::load_story(&blobs, "fx").unwrap();
        assert_eq!(loaded.story, store.story);
        assert!(blobs.get(&story_key("fx")).is_some());
    }

    #[test]
    fn failed_save_surfaces_a_warning_and_keeps_the_story() {
        let mut store = store_with_one_node();
        let mut blobs = UnavailableStore;
        run(&mut store, &mut blobs, Effect::SaveStory);
        assert!(store.error_message.is_some());
        assert_eq!(store.story.nodes.len(), 1);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn import_replaces_the_story_and_persists_it() {
        let mut imported = Story::empty("foreign");
        imported.title = String::from("Imported Tale");
        let snapshot = StorySnapshot {
            story: imported,
            settings: VisualSettings::default(),
        };
        let path = std::env::temp_dir().join("storymapper_import_fx.json");
        persistence::export_to_file(&path, &snapshot).unwrap();

        let mut store = store_with_one_node();
        let mut blobs = MemoryStore::new();
        run(&mut store, &mut blobs, Effect::ImportStory { path: path.clone() });
        std::fs::remove_file(&path).ok();

        assert_eq!(store.story.title, "Imported Tale");
        assert_eq!(store.story.id, "fx");
        let saved = persistence::load_story(&blobs, "fx").unwrap();
        assert_eq!(saved.story.title, "Imported Tale");
    }
}
