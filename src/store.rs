use eframe::egui::{Pos2, Vec2};

use crate::actions::{self, Action};
use crate::effects::{self, Effect};
use crate::persistence::{BlobStore, StorySnapshot};
use crate::settings::VisualSettings;
use crate::story::{Story, StoryNode};
use crate::viewport::Viewport;

/// The pointer gesture state machine. Exactly one gesture is live at a
/// time; pointer-up or pointer-leave from any state returns to `Idle`.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerState {
    Idle,
    /// Secondary-button pan. `anchor` is the press position minus the
    /// viewport offset at press time, so each move recomputes the
    /// offset absolutely instead of accumulating deltas.
    Panning { anchor: Vec2 },
    /// Primary-button drag bound to one node.
    Dragging { node_id: String },
}

/// Authoritative session state: the story document plus everything the
/// canvas and form panels read and mutate. Owned by the app, handed to
/// the reducer; nothing here is global.
pub struct Store {
    pub story: Story,
    pub settings: VisualSettings,
    /// Always `None` or an id present in `story.nodes`.
    pub current_node_id: Option<String>,
    pub viewport: Viewport,
    pub pointer: PointerState,
    /// Canvas size in screen units, refreshed by the app every frame;
    /// new nodes spawn near its center.
    pub surface_size: Vec2,

    // Form buffers, committed to the story on the explicit saves.
    pub node_title_input: String,
    pub node_body_input: String,
    pub node_main_input: bool,
    pub story_title_input: String,
    pub main_link_input: String,

    pub error_message: Option<String>,

    action_queue: Vec<Action>,
    effect_queue: Vec<Effect>,
}

impl Store {
    pub fn new(snapshot: StorySnapshot) -> Self {
        let mut store = Self {
            story_title_input: snapshot.story.title.clone(),
            main_link_input: snapshot.story.main_link.clone(),
            current_node_id: snapshot.story.nodes.first().map(|n| n.id.clone()),
            story: snapshot.story,
            settings: snapshot.settings,
            viewport: Viewport::default(),
            pointer: PointerState::Idle,
            surface_size: Vec2::ZERO,
            node_title_input: String::new(),
            node_body_input: String::new(),
            node_main_input: false,
            error_message: None,
            action_queue: Vec::new(),
            effect_queue: Vec::new(),
        };
        store.load_selection_inputs();
        store
    }

    pub fn dispatch(&mut self, action: Action) {
        self.action_queue.push(action);
    }

    pub fn flush_actions(&mut self) {
        let actions = std::mem::take(&mut self.action_queue);
        for action in actions {
            let mut effects = actions::update(self, action);
            self.effect_queue.append(&mut effects);
        }
    }

    pub fn flush_effects(&mut self, blobs: &mut dyn BlobStore) {
        let effects = std::mem::take(&mut self.effect_queue);
        for effect in effects {
            effects::run(self, blobs, effect);
        }
    }

    pub fn current_node(&self) -> Option<&StoryNode> {
        self.current_node_id
            .as_deref()
            .and_then(|id| self.story.node(id))
    }

    pub fn current_node_mut(&mut self) -> Option<&mut StoryNode> {
        let id = self.current_node_id.clone()?;
        self.story.node_mut(&id)
    }

    /// Select a node for editing. Unknown ids fail silently.
    pub fn select(&mut self, id: &str) {
        if self.story.node(id).is_some() {
            self.current_node_id = Some(id.to_string());
            self.load_selection_inputs();
        }
    }

    /// Copy the selected node's fields into the form buffers.
    pub fn load_selection_inputs(&mut self) {
        match self.current_node().cloned() {
            Some(node) => {
                self.node_title_input = node.title;
                self.node_body_input = node.body;
                self.node_main_input = node.main;
            }
            None => {
                self.node_title_input.clear();
                self.node_body_input.clear();
                self.node_main_input = false;
            }
        }
    }

    /// Hit-test a world-space point against the node circles.
    ///
    /// When circles overlap the last node in list order wins: that is
    /// the one painted on top. Deliberately the opposite tie-break from
    /// the link resolver's first-title-match, which orders a list, not
    /// a paint stack.
    pub fn node_at(&self, world: Pos2) -> Option<&StoryNode> {
        self.story.nodes.iter().rev().find(|n| {
            let r = self.settings.radius_for(n.main);
            (world - n.pos()).length() < r
        })
    }

    /// Replace the session document with an imported snapshot. The
    /// session keeps its blob key, so the import is adopted under the
    /// current story id.
    pub fn replace_snapshot(&mut self, mut snapshot: StorySnapshot) {
        snapshot.story.id = self.story.id.clone();
        self.story = snapshot.story;
        self.settings = snapshot.settings;
        self.story_title_input = self.story.title.clone();
        self.main_link_input = self.story.main_link.clone();
        self.current_node_id = self.story.nodes.first().map(|n| n.id.clone());
        self.pointer = PointerState::Idle;
        self.load_selection_inputs();
    }
}
