// Story model - the authoritative document edited by the session

use eframe::egui::Pos2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Half-width of the square region around the viewport center in which
/// freshly created nodes are scattered, in world units.
pub const SPAWN_JITTER: f32 = 50.0;

/// A single story passage: free text plus a position on the canvas.
///
/// The body may embed `[[Title]]` references to other passages; those
/// are never stored as edges, they are re-derived on every render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryNode {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Designated story entry point. Cosmetic: at most one node is
    /// expected to carry it, but this is not enforced.
    #[serde(default)]
    pub main: bool,
    pub x: f32,
    pub y: f32,
    /// Whether the body panel is shown next to the node circle.
    #[serde(default)]
    pub expanded: bool,
}

impl StoryNode {
    pub fn pos(&self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub main_link: String,
    #[serde(default)]
    pub nodes: Vec<StoryNode>,
}

impl Story {
    /// Empty story used when nothing is stored under the session id yet.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::from("Untitled Story"),
            main_link: String::new(),
            nodes: Vec::new(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&StoryNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut StoryNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Index of the designated entry point, first match in list order.
    pub fn main_node_index(&self) -> Option<usize> {
        self.nodes.iter().position(|n| n.main)
    }
}

/// Generate a fresh node id derived from wall-clock milliseconds.
///
/// Ids must stay unique within the story for the whole session, so a
/// same-millisecond collision bumps the stamp until it is free.
pub fn next_node_id(story: &Story) -> String {
    let mut stamp = timestamp_millis();
    loop {
        let id = format!("node-{stamp}");
        if story.node(&id).is_none() {
            return id;
        }
        stamp += 1;
    }
}

/// A spawn position scattered around `center` so consecutive new nodes
/// don't stack exactly on top of each other.
pub fn spawn_position(center: Pos2) -> Pos2 {
    let mut rng = rand::rng();
    Pos2::new(
        center.x + rng.random_range(-SPAWN_JITTER..SPAWN_JITTER),
        center.y + rng.random_range(-SPAWN_JITTER..SPAWN_JITTER),
    )
}

#[cfg(not(target_arch = "wasm32"))]
fn timestamp_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
fn timestamp_millis() -> u64 {
    js_sys::Date::now() as u64
}
