// Actions - everything that mutates the session state goes through
// `update`, one synchronous reducer over form commands and canvas
// input events. IO never happens here; it is returned as effects.

use eframe::egui::Pos2;
use std::path::PathBuf;

use crate::effects::Effect;
use crate::story::{self, StoryNode};
use crate::store::{PointerState, Store};
use crate::viewport::ZoomDirection;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Every state mutation, form and canvas alike. Canvas input arrives
/// as the pointer/wheel variants in screen coordinates; the reducer
/// does all hit-testing in world coordinates itself, so the event
/// source stays backend-agnostic.
#[derive(Debug, Clone)]
pub enum Action {
    // Node form
    CreateNode,
    SaveCurrentNode,
    DeleteCurrentNode,
    SelectNode { id: String },
    // Story form
    SaveStoryDetails,
    // Canvas input
    PointerPressed {
        pos: Pos2,
        button: PointerButton,
        double: bool,
    },
    PointerMoved { pos: Pos2 },
    PointerReleased,
    PointerLeft,
    /// Wheel turn over the canvas; positive `delta` zooms in.
    Wheel { pos: Pos2, delta: f32 },
    // View settings
    SetHighlightUnreachable { on: bool },
    // File IO
    ExportStory { path: PathBuf },
    ImportStory { path: PathBuf },
    ClearErrorMessage,
}

/// Apply a single action. Runs to completion before the next event is
/// processed; any returned effects are flushed before the next redraw.
pub fn update(store: &mut Store, action: Action) -> Vec<Effect> {
    match action {
        Action::CreateNode => {
            let id = story::next_node_id(&store.story);
            let center = store
                .viewport
                .screen_to_world((store.surface_size / 2.0).to_pos2());
            let pos = story::spawn_position(center);
            store.story.nodes.push(StoryNode {
                id: id.clone(),
                title: String::from("New Node"),
                body: String::new(),
                main: false,
                x: pos.x,
                y: pos.y,
                expanded: false,
            });
            store.select(&id);
            vec![Effect::SaveStory]
        }
        Action::SaveCurrentNode => {
            let title = store.node_title_input.clone();
            let body = store.node_body_input.clone();
            let main = store.node_main_input;
            match store.current_node_mut() {
                Some(node) => {
                    node.title = title;
                    node.body = body;
                    node.main = main;
                    vec![Effect::SaveStory]
                }
                None => vec![],
            }
        }
        Action::DeleteCurrentNode => {
            let Some(id) = store.current_node_id.clone() else {
                return vec![];
            };
            store.story.nodes.retain(|n| n.id != id);
            store.current_node_id =
                store.story.nodes.first().map(|n| n.id.clone());
            store.load_selection_inputs();
            vec![Effect::SaveStory]
        }
        Action::SelectNode { id } => {
            store.select(&id);
            vec![]
        }
        Action::SaveStoryDetails => {
            store.story.title = store.story_title_input.clone();
            store.story.main_link = store.main_link_input.clone();
            vec![Effect::SaveStory]
        }
        Action::PointerPressed {
            pos,
            button,
            double,
        } => pointer_pressed(store, pos, button, double),
        Action::PointerMoved { pos } => pointer_moved(store, pos),
        Action::PointerReleased | Action::PointerLeft => {
            store.pointer = PointerState::Idle;
            vec![]
        }
        Action::Wheel { pos, delta } => {
            let direction = if delta > 0.0 {
                ZoomDirection::In
            } else {
                ZoomDirection::Out
            };
            store.viewport.zoom_at(pos, direction);
            vec![]
        }
        Action::SetHighlightUnreachable { on } => {
            store.settings.highlight_unreachable = on;
            vec![Effect::SaveStory]
        }
        Action::ExportStory { path } => vec![Effect::ExportStory { path }],
        Action::ImportStory { path } => vec![Effect::ImportStory { path }],
        Action::ClearErrorMessage => {
            store.error_message = None;
            vec![]
        }
    }
}

fn pointer_pressed(
    store: &mut Store,
    pos: Pos2,
    button: PointerButton,
    double: bool,
) -> Vec<Effect> {
    match button {
        PointerButton::Secondary => {
            store.pointer = PointerState::Panning {
                anchor: pos.to_vec2() - store.viewport.offset,
            };
            vec![]
        }
        PointerButton::Primary => {
            let world = store.viewport.screen_to_world(pos);
            let hit = store.node_at(world).map(|n| n.id.clone());
            match hit {
                Some(id) if double => {
                    // Expansion toggle; the gesture ends here.
                    if let Some(node) = store.story.node_mut(&id) {
                        node.expanded = !node.expanded;
                    }
                    store.pointer = PointerState::Idle;
                    vec![Effect::SaveStory]
                }
                Some(id) => {
                    store.pointer = PointerState::Dragging { node_id: id };
                    vec![]
                }
                None => vec![],
            }
        }
    }
}

fn pointer_moved(store: &mut Store, pos: Pos2) -> Vec<Effect> {
    match store.pointer.clone() {
        PointerState::Dragging { node_id } => {
            let world = store.viewport.screen_to_world(pos);
            if let Some(node) = store.story.node_mut(&node_id) {
                node.x = world.x;
                node.y = world.y;
                return vec![Effect::SaveStory];
            }
            vec![]
        }
        PointerState::Panning { anchor } => {
            store.viewport.offset = pos.to_vec2() - anchor;
            vec![]
        }
        PointerState::Idle => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::StorySnapshot;
    use crate::settings::VisualSettings;
    use crate::story::Story;
    use eframe::egui::Vec2;

    fn node(id: &str, title: &str, x: f32, y: f32) -> StoryNode {
        StoryNode {
            id: id.to_string(),
            title: title.to_string(),
            body: String::new(),
            main: false,
            x,
            y,
            expanded: false,
        }
    }

    fn store_with(nodes: Vec<StoryNode>) -> Store {
        let mut story = Story::empty("s");
        story.nodes = nodes;
        let mut store = Store::new(StorySnapshot {
            story,
            settings: VisualSettings::default(),
        });
        store.surface_size = Vec2::new(800.0, 600.0);
        store
    }

    fn saves(effects: &[Effect]) -> bool {
        effects.iter().any(|e| matches!(e, Effect::SaveStory))
    }

    #[test]
    fn create_node_appends_selects_and_persists() {
        let mut store = store_with(vec![]);
        let effects = update(&mut store, Action::CreateNode);
        assert!(saves(&effects));
        assert_eq!(store.story.nodes.len(), 1);
        let node = &store.story.nodes[0];
        assert_eq!(node.title, "New Node");
        assert!(!node.main && !node.expanded);
        assert_eq!(store.current_node_id.as_deref(), Some(node.id.as_str()));
        // Spawned near the viewport center.
        assert!((node.x - 400.0).abs() <= story::SPAWN_JITTER);
        assert!((node.y - 300.0).abs() <= story::SPAWN_JITTER);
    }

    #[test]
    fn save_current_node_commits_the_form_buffers() {
        let mut store = store_with(vec![node("n1", "Old", 0.0, 0.0)]);
        store.node_title_input = String::from("New Title");
        store.node_body_input = String::from("body text");
        store.node_main_input = true;
        let effects = update(&mut store, Action::SaveCurrentNode);
        assert!(saves(&effects));
        let n = &store.story.nodes[0];
        assert_eq!(n.title, "New Title");
        assert_eq!(n.body, "body text");
        assert!(n.main);
    }

    #[test]
    fn mutations_without_a_selection_are_no_ops() {
        let mut store = store_with(vec![]);
        assert!(update(&mut store, Action::SaveCurrentNode).is_empty());
        assert!(update(&mut store, Action::DeleteCurrentNode).is_empty());
        assert!(store.story.nodes.is_empty());
    }

    #[test]
    fn deleting_the_only_node_clears_the_selection() {
        let mut store = store_with(vec![node("n1", "Only", 0.0, 0.0)]);
        let effects = update(&mut store, Action::DeleteCurrentNode);
        assert!(saves(&effects));
        assert!(store.story.nodes.is_empty());
        assert!(store.current_node_id.is_none());
        // Follow-up field saves must now no-op.
        store.node_title_input = String::from("ghost");
        assert!(update(&mut store, Action::SaveCurrentNode).is_empty());
    }

    #[test]
    fn deleting_moves_the_selection_to_the_first_remaining_node() {
        let mut store = store_with(vec![
            node("n1", "A", 0.0, 0.0),
            node("n2", "B", 100.0, 0.0),
        ]);
        update(&mut store, Action::SelectNode { id: "n2".into() });
        update(&mut store, Action::DeleteCurrentNode);
        assert_eq!(store.current_node_id.as_deref(), Some("n1"));
        assert_eq!(store.node_title_input, "A");
    }

    #[test]
    fn drag_updates_the_node_position_and_persists() {
        let mut store = store_with(vec![node("n1", "A", 100.0, 100.0)]);
        let effects = update(
            &mut store,
            Action::PointerPressed {
                pos: Pos2::new(100.0, 100.0),
                button: PointerButton::Primary,
                double: false,
            },
        );
        assert!(effects.is_empty());
        assert_eq!(
            store.pointer,
            PointerState::Dragging {
                node_id: String::from("n1")
            }
        );

        let effects = update(
            &mut store,
            Action::PointerMoved {
                pos: Pos2::new(150.0, 175.0),
            },
        );
        assert!(saves(&effects));
        assert_eq!(store.story.nodes[0].x, 150.0);
        assert_eq!(store.story.nodes[0].y, 175.0);

        update(&mut store, Action::PointerReleased);
        assert_eq!(store.pointer, PointerState::Idle);
    }

    #[test]
    fn drag_honors_the_viewport_transform() {
        let mut store = store_with(vec![node("n1", "A", 100.0, 100.0)]);
        store.viewport.offset = Vec2::new(50.0, -20.0);
        store.viewport.scale = 2.0;
        let screen = store.viewport.world_to_screen(Pos2::new(100.0, 100.0));
        update(
            &mut store,
            Action::PointerPressed {
                pos: screen,
                button: PointerButton::Primary,
                double: false,
            },
        );
        assert!(matches!(store.pointer, PointerState::Dragging { .. }));
        let target = store.viewport.world_to_screen(Pos2::new(120.0, 90.0));
        update(&mut store, Action::PointerMoved { pos: target });
        assert!((store.story.nodes[0].x - 120.0).abs() < 1e-3);
        assert!((store.story.nodes[0].y - 90.0).abs() < 1e-3);
    }

    #[test]
    fn double_click_toggles_expansion_without_moving_the_node() {
        let mut store = store_with(vec![node("n1", "A", 100.0, 100.0)]);
        let press = Action::PointerPressed {
            pos: Pos2::new(100.0, 100.0),
            button: PointerButton::Primary,
            double: true,
        };
        let effects = update(&mut store, press.clone());
        assert!(saves(&effects));
        assert!(store.story.nodes[0].expanded);
        assert_eq!(store.pointer, PointerState::Idle);
        assert_eq!(store.story.nodes[0].x, 100.0);

        update(&mut store, press);
        assert!(!store.story.nodes[0].expanded);
    }

    #[test]
    fn secondary_press_pans_instead_of_dragging() {
        let mut store = store_with(vec![node("n1", "A", 100.0, 100.0)]);
        update(
            &mut store,
            Action::PointerPressed {
                pos: Pos2::new(100.0, 100.0),
                button: PointerButton::Secondary,
                double: false,
            },
        );
        assert!(matches!(store.pointer, PointerState::Panning { .. }));
        update(
            &mut store,
            Action::PointerMoved {
                pos: Pos2::new(130.0, 90.0),
            },
        );
        // The node never moved, only the viewport did.
        assert_eq!(store.story.nodes[0].x, 100.0);
        assert_eq!(store.viewport.offset, Vec2::new(30.0, -10.0));

        update(&mut store, Action::PointerLeft);
        assert_eq!(store.pointer, PointerState::Idle);
    }

    #[test]
    fn primary_press_on_empty_space_stays_idle() {
        let mut store = store_with(vec![node("n1", "A", 100.0, 100.0)]);
        update(
            &mut store,
            Action::PointerPressed {
                pos: Pos2::new(500.0, 500.0),
                button: PointerButton::Primary,
                double: false,
            },
        );
        assert_eq!(store.pointer, PointerState::Idle);
    }

    #[test]
    fn wheel_zooms_regardless_of_gesture_state() {
        let mut store = store_with(vec![node("n1", "A", 100.0, 100.0)]);
        update(
            &mut store,
            Action::PointerPressed {
                pos: Pos2::new(0.0, 0.0),
                button: PointerButton::Secondary,
                double: false,
            },
        );
        update(
            &mut store,
            Action::Wheel {
                pos: Pos2::new(200.0, 150.0),
                delta: 1.0,
            },
        );
        assert!(store.viewport.scale > 1.0);
        assert!(matches!(store.pointer, PointerState::Panning { .. }));

        update(
            &mut store,
            Action::Wheel {
                pos: Pos2::new(200.0, 150.0),
                delta: -1.0,
            },
        );
        assert!((store.viewport.scale - 1.0).abs() < 1e-5);
    }

    #[test]
    fn toggling_unreachable_highlighting_persists_settings() {
        let mut store = store_with(vec![]);
        let effects =
            update(&mut store, Action::SetHighlightUnreachable { on: false });
        assert!(saves(&effects));
        assert!(!store.settings.highlight_unreachable);
    }

    #[test]
    fn save_story_details_commits_title_and_link() {
        let mut store = store_with(vec![]);
        store.story_title_input = String::from("My Tale");
        store.main_link_input = String::from("https://example.org/start");
        let effects = update(&mut store, Action::SaveStoryDetails);
        assert!(saves(&effects));
        assert_eq!(store.story.title, "My Tale");
        assert_eq!(store.story.main_link, "https://example.org/start");
    }
}
