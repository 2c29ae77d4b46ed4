// App shell - egui panels, canvas painting, and the translation from
// egui input to the backend-agnostic canvas actions.

use eframe::egui::{
    self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke,
    epaint::QuadraticBezierShape,
};

use crate::actions::{Action, PointerButton};
use crate::persistence::{self, EframeStore, StorySnapshot, UnavailableStore};
use crate::scene::{self, Scene};
use crate::settings::VisualSettings;
use crate::store::Store;
use crate::story::Story;
use crate::viewport::Viewport;

const CANVAS_BACKGROUND: Color32 = Color32::from_rgb(24, 26, 31);
const EDGE_STROKE_WIDTH: f32 = 2.0;
// Premultiplied translucent white.
const EDGE_COLOR: Color32 = Color32::from_rgba_premultiplied(77, 77, 77, 77);
const NODE_OUTLINE_WIDTH: f32 = 2.0;
const NODE_OUTLINE: Color32 = Color32::from_rgb(0x2c, 0x3e, 0x50);
const NODE_FILL: Color32 = Color32::from_rgb(0x34, 0x98, 0xdb);
const MAIN_FILL: Color32 = Color32::from_rgb(0xf1, 0xc4, 0x0f);
const TEXT_COLOR: Color32 = Color32::WHITE;
const PANEL_FILL: Color32 = Color32::from_black_alpha(191);
/// Extra label size granted to the main node.
const MAIN_LABEL_BONUS: f32 = 2.0;
/// How dim an unreachable node is painted.
const UNREACHABLE_DIM: f32 = 0.35;

pub struct StoryMapperApp {
    store: Store,
}

/// Build the app from the launch-provided story id and whatever the
/// frame storage holds under it. A missing id is a non-fatal warning
/// and falls back to a scratch story; a corrupt blob likewise.
pub fn create_app(
    cc: &eframe::CreationContext<'_>,
    story_id: Option<String>,
) -> StoryMapperApp {
    let mut warning = None;
    let id = match story_id.filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => {
            log::warn!("no story id provided, using the scratch story");
            warning = Some(String::from(
                "No story id provided! Editing the scratch story instead.",
            ));
            String::from("scratch")
        }
    };

    let blob = cc
        .storage
        .and_then(|s| s.get_string(&persistence::story_key(&id)));
    let snapshot = match blob {
        Some(blob) => match persistence::decode(&blob) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("stored story is unreadable: {e}");
                warning = Some(format!(
                    "Stored story could not be read ({e}); starting empty."
                ));
                StorySnapshot {
                    story: Story::empty(&id),
                    settings: VisualSettings::default(),
                }
            }
        },
        None => StorySnapshot {
            story: Story::empty(&id),
            settings: VisualSettings::default(),
        },
    };

    let mut store = Store::new(snapshot);
    store.error_message = warning;
    StoryMapperApp { store }
}

impl eframe::App for StoryMapperApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.menu_bar(ctx);
        self.story_panel(ctx);
        self.canvas_panel(ctx, frame);

        if let Some(error) = self.store.error_message.clone() {
            egui::Window::new("Warning")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&error);
                    if ui.button("OK").clicked() {
                        self.store.dispatch(Action::ClearErrorMessage);
                    }
                });
        }
    }
}

impl StoryMapperApp {
    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                #[cfg(not(target_arch = "wasm32"))]
                ui.menu_button("File", |ui| {
                    if ui.button("Export…").clicked() {
                        ui.close();
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .save_file()
                        {
                            self.store.dispatch(Action::ExportStory { path });
                        }
                    }
                    if ui.button("Import…").clicked() {
                        ui.close();
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .pick_file()
                        {
                            self.store.dispatch(Action::ImportStory { path });
                        }
                    }
                });
                ui.menu_button("View", |ui| {
                    let mut on = self.store.settings.highlight_unreachable;
                    if ui.checkbox(&mut on, "Dim unreachable nodes").changed() {
                        self.store
                            .dispatch(Action::SetHighlightUnreachable { on });
                    }
                });
            });
        });
    }

    fn story_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("story_panel")
            .default_width(260.0)
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(8.0))
            .show(ctx, |ui| {
                ui.heading("Story");
                ui.separator();
                ui.label("Title");
                ui.text_edit_singleline(&mut self.store.story_title_input);
                ui.label("Main link");
                ui.text_edit_singleline(&mut self.store.main_link_input);
                if ui.button("Save Story").clicked() {
                    self.store.dispatch(Action::SaveStoryDetails);
                }

                ui.add_space(12.0);
                ui.heading("Nodes");
                ui.separator();
                if ui.button("New Node").clicked() {
                    self.store.dispatch(Action::CreateNode);
                }

                let entries: Vec<(String, String)> = self
                    .store
                    .story
                    .nodes
                    .iter()
                    .map(|n| (n.id.clone(), n.title.clone()))
                    .collect();
                let current = self.store.current_node_id.clone();
                let selected_title = current
                    .as_deref()
                    .and_then(|id| self.store.story.node(id))
                    .map(|n| display_title(&n.title))
                    .unwrap_or_else(|| String::from("(no node)"));

                let mut selected = None;
                egui::ComboBox::from_id_salt("node_select")
                    .selected_text(selected_title)
                    .width(ui.available_width())
                    .show_ui(ui, |ui| {
                        for (id, title) in &entries {
                            let is_current = current.as_deref() == Some(id);
                            if ui
                                .selectable_label(is_current, display_title(title))
                                .clicked()
                            {
                                selected = Some(id.clone());
                            }
                        }
                    });
                if let Some(id) = selected {
                    self.store.dispatch(Action::SelectNode { id });
                }

                let has_selection = self.store.current_node_id.is_some();
                ui.add_enabled_ui(has_selection, |ui| {
                    ui.label("Node title");
                    ui.text_edit_singleline(&mut self.store.node_title_input);
                    ui.label("Body");
                    ui.add(
                        egui::TextEdit::multiline(&mut self.store.node_body_input)
                            .desired_rows(8)
                            .hint_text("Link passages with [[Title]]"),
                    );
                    ui.checkbox(&mut self.store.node_main_input, "Main node");
                    ui.horizontal(|ui| {
                        if ui.button("Save Node").clicked() {
                            self.store.dispatch(Action::SaveCurrentNode);
                        }
                        if ui.button("Delete Node").clicked() {
                            self.store.dispatch(Action::DeleteCurrentNode);
                        }
                    });
                });

                ui.with_layout(
                    egui::Layout::bottom_up(egui::Align::LEFT),
                    |ui| {
                        ui.label(format!(
                            "Nodes: {}",
                            self.store.story.nodes.len()
                        ));
                        ui.separator();
                    },
                );
            });
    }

    fn canvas_panel(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();
                let response = ui.allocate_rect(rect, Sense::click_and_drag());
                self.store.surface_size = rect.size();

                for action in canvas_actions(ui, &response, rect) {
                    self.store.dispatch(action);
                }
                self.store.flush_actions();
                // Write-through persistence before this frame paints.
                match frame.storage_mut() {
                    Some(storage) => {
                        let mut blobs = EframeStore(storage);
                        self.store.flush_effects(&mut blobs);
                    }
                    None => {
                        let mut blobs = UnavailableStore;
                        self.store.flush_effects(&mut blobs);
                    }
                }

                let painter = ui.painter_at(rect);
                painter.rect_filled(rect, 0.0, CANVAS_BACKGROUND);

                let body_font =
                    FontId::proportional(self.store.settings.body_font_size);
                let measure = |s: &str| {
                    ui.fonts_mut(|f| {
                        f.layout_no_wrap(s.to_owned(), body_font.clone(), TEXT_COLOR)
                            .size()
                            .x
                    })
                };
                let scene = scene::build(
                    &self.store.story,
                    &self.store.settings,
                    &measure,
                );
                paint_scene(
                    &painter,
                    &scene,
                    &self.store.viewport,
                    &self.store.settings,
                    rect,
                );
            });
    }
}

fn display_title(title: &str) -> String {
    if title.is_empty() {
        String::from("(untitled)")
    } else {
        title.to_string()
    }
}

/// Map this frame's egui input on the canvas to canvas actions, with
/// positions local to the canvas rect.
fn canvas_actions(
    ui: &egui::Ui,
    response: &egui::Response,
    rect: Rect,
) -> Vec<Action> {
    let local = |p: Pos2| p - rect.min.to_vec2();
    let mut actions = Vec::new();

    if response.double_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            actions.push(Action::PointerPressed {
                pos: local(pos),
                button: PointerButton::Primary,
                double: true,
            });
        }
    } else if response.drag_started_by(egui::PointerButton::Primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            actions.push(Action::PointerPressed {
                pos: local(pos),
                button: PointerButton::Primary,
                double: false,
            });
        }
    }
    if response.drag_started_by(egui::PointerButton::Secondary) {
        if let Some(pos) = response.interact_pointer_pos() {
            actions.push(Action::PointerPressed {
                pos: local(pos),
                button: PointerButton::Secondary,
                double: false,
            });
        }
    }
    if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            actions.push(Action::PointerMoved { pos: local(pos) });
        }
    }
    if response.drag_stopped() {
        actions.push(Action::PointerReleased);
    }
    let pointer_gone = ui.input(|i| {
        i.events
            .iter()
            .any(|e| matches!(e, egui::Event::PointerGone))
    });
    if pointer_gone {
        actions.push(Action::PointerLeft);
    }
    if response.hovered() {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 {
            if let Some(pos) = response.hover_pos() {
                actions.push(Action::Wheel {
                    pos: local(pos),
                    delta: scroll,
                });
            }
        }
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_color_is_premultiplied_translucent_white() {
        let [r, g, b, a] = EDGE_COLOR.to_array();
        assert_eq!((r, g, b), (a, a, a));
        assert!(a < 255);
    }
}

/// Paint a world-space scene through the viewport into the canvas
/// rect. Purely a projection: no state is touched, so repainting an
/// unchanged scene yields the same raster.
fn paint_scene(
    painter: &egui::Painter,
    scene: &Scene,
    viewport: &Viewport,
    settings: &VisualSettings,
    rect: Rect,
) {
    let s = viewport.scale;
    let to_screen = |p: Pos2| rect.min + viewport.world_to_screen(p).to_vec2();

    for edge in &scene.edges {
        painter.add(QuadraticBezierShape::from_points_stroke(
            [
                to_screen(edge.from),
                to_screen(edge.control),
                to_screen(edge.to),
            ],
            false,
            Color32::TRANSPARENT,
            Stroke::new(EDGE_STROKE_WIDTH * s, EDGE_COLOR),
        ));
    }

    for node in &scene.nodes {
        let center = to_screen(node.center);
        let fill = if node.main { MAIN_FILL } else { NODE_FILL };
        let fill = if node.reachable {
            fill
        } else {
            fill.gamma_multiply(UNREACHABLE_DIM)
        };
        painter.circle(
            center,
            node.radius * s,
            fill,
            Stroke::new(NODE_OUTLINE_WIDTH * s, NODE_OUTLINE),
        );

        let label_size = if node.main {
            settings.label_font_size + MAIN_LABEL_BONUS
        } else {
            settings.label_font_size
        };
        painter.text(
            center,
            Align2::CENTER_CENTER,
            &node.title,
            FontId::proportional(label_size * s),
            TEXT_COLOR,
        );

        if let Some(panel) = &node.panel {
            let panel_rect = Rect::from_min_max(
                to_screen(panel.rect.min),
                to_screen(panel.rect.max),
            );
            painter.rect_filled(panel_rect, 0.0, PANEL_FILL);
            let body_font = FontId::proportional(settings.body_font_size * s);
            for (i, line) in panel.lines.iter().enumerate() {
                let baseline = Pos2::new(
                    panel.text_pos.x,
                    panel.text_pos.y + i as f32 * settings.line_height,
                );
                painter.text(
                    to_screen(baseline),
                    Align2::LEFT_BOTTOM,
                    line,
                    body_font.clone(),
                    TEXT_COLOR,
                );
            }
        }
    }
}
