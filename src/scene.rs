// Scene building - turns the story into a world-space display list.
//
// Building is pure: the same story, settings and text measure always
// produce the same scene, which is what makes render idempotence
// testable without a live surface. The app layer maps the scene
// through the viewport onto painter primitives.

use eframe::egui::{Pos2, Rect, Vec2};

use crate::links;
use crate::settings::VisualSettings;
use crate::story::Story;

/// Gap between a node circle and its body panel.
const PANEL_GAP: f32 = 10.0;
/// Inset of the wrapped text inside the panel.
const PANEL_TEXT_INSET: f32 = 5.0;
/// First baseline offset from the panel top.
const PANEL_TEXT_TOP: f32 = 15.0;

/// Measures the advance width of a one-line string, world units.
pub type TextMeasure<'a> = &'a dyn Fn(&str) -> f32;

/// A quadratic edge curve from source center to target center.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeCurve {
    pub from: Pos2,
    pub control: Pos2,
    pub to: Pos2,
}

/// The expanded body panel anchored right of a node circle.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPanel {
    pub rect: Rect,
    pub text_pos: Pos2,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSprite {
    pub center: Pos2,
    pub radius: f32,
    pub main: bool,
    /// False only when unreachable-highlighting is on, the story has a
    /// main node, and no directed path leads here from it.
    pub reachable: bool,
    pub title: String,
    pub panel: Option<BodyPanel>,
}

/// World-space display list. Edges come first so they always paint
/// under the nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub edges: Vec<EdgeCurve>,
    pub nodes: Vec<NodeSprite>,
}

/// Control point for the curve between two node centers: the midpoint
/// pushed sideways by a deterministic function of both endpoints, so
/// distinct edges get visually distinct curves.
pub fn edge_control_point(a: Pos2, b: Pos2) -> Pos2 {
    Pos2::new(
        (a.x + b.x) / 2.0 + 20.0 * ((a.y + b.y) / 50.0).sin(),
        (a.y + b.y) / 2.0 + 20.0 * ((a.x + b.x) / 50.0).cos(),
    )
}

/// Greedy word wrap at `max_width`, breaking at spaces only.
///
/// A word that alone exceeds the width still gets its own line; words
/// are never hyphenated. Each returned line keeps its trailing space,
/// which is invisible when painted but keeps the measure consistent.
pub fn wrap_text(text: &str, max_width: f32, measure: TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for (i, word) in text.split(' ').enumerate() {
        let test = format!("{line}{word} ");
        if measure(&test) > max_width && i > 0 {
            lines.push(line);
            line = format!("{word} ");
        } else {
            line = test;
        }
    }
    lines.push(line);
    lines
}

pub fn build(story: &Story, settings: &VisualSettings, measure: TextMeasure) -> Scene {
    let mut scene = Scene::default();

    for (source, target) in links::resolve_edges(story) {
        let from = story.nodes[source].pos();
        let to = story.nodes[target].pos();
        scene.edges.push(EdgeCurve {
            from,
            control: edge_control_point(from, to),
            to,
        });
    }

    let reached = if settings.highlight_unreachable {
        links::reachable_from_main(story)
    } else {
        None
    };

    for (i, node) in story.nodes.iter().enumerate() {
        let radius = settings.radius_for(node.main);
        let panel = node.expanded.then(|| {
            let rect = Rect::from_min_size(
                Pos2::new(
                    node.x + radius + PANEL_GAP,
                    node.y - settings.panel_height / 2.0,
                ),
                Vec2::new(settings.panel_width, settings.panel_height),
            );
            BodyPanel {
                rect,
                text_pos: Pos2::new(
                    rect.min.x + PANEL_TEXT_INSET,
                    rect.min.y + PANEL_TEXT_TOP,
                ),
                lines: wrap_text(
                    &node.body,
                    settings.panel_width - 2.0 * PANEL_TEXT_INSET,
                    measure,
                ),
            }
        });
        scene.nodes.push(NodeSprite {
            center: node.pos(),
            radius,
            main: node.main,
            reachable: reached.as_ref().map_or(true, |r| r[i]),
            title: node.title.clone(),
            panel,
        });
    }

    scene
}
