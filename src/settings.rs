use serde::{Deserialize, Serialize};

/// Visual parameters of the graph canvas.
///
/// Persisted inside the story snapshot; every field is defaulted so
/// snapshots written by older builds keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSettings {
    /// Circle radius of a regular node, world units.
    #[serde(default = "VisualSettings::default_node_radius")]
    pub node_radius: f32,
    /// Circle radius of the main node.
    #[serde(default = "VisualSettings::default_main_radius")]
    pub main_radius: f32,
    /// Width of the expanded body panel.
    #[serde(default = "VisualSettings::default_panel_width")]
    pub panel_width: f32,
    /// Height of the expanded body panel.
    #[serde(default = "VisualSettings::default_panel_height")]
    pub panel_height: f32,
    /// Vertical advance between wrapped body lines.
    #[serde(default = "VisualSettings::default_line_height")]
    pub line_height: f32,
    #[serde(default = "VisualSettings::default_label_font_size")]
    pub label_font_size: f32,
    #[serde(default = "VisualSettings::default_body_font_size")]
    pub body_font_size: f32,
    /// Dim nodes with no directed path from the main node.
    #[serde(default = "VisualSettings::default_highlight_unreachable")]
    pub highlight_unreachable: bool,
}

impl VisualSettings {
    pub const fn default_node_radius() -> f32 {
        35.0
    }

    pub const fn default_main_radius() -> f32 {
        50.0
    }

    pub const fn default_panel_width() -> f32 {
        220.0
    }

    pub const fn default_panel_height() -> f32 {
        100.0
    }

    pub const fn default_line_height() -> f32 {
        16.0
    }

    pub const fn default_label_font_size() -> f32 {
        12.0
    }

    pub const fn default_body_font_size() -> f32 {
        12.0
    }

    pub const fn default_highlight_unreachable() -> bool {
        true
    }

    pub fn radius_for(&self, main: bool) -> f32 {
        if main { self.main_radius } else { self.node_radius }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            node_radius: Self::default_node_radius(),
            main_radius: Self::default_main_radius(),
            panel_width: Self::default_panel_width(),
            panel_height: Self::default_panel_height(),
            line_height: Self::default_line_height(),
            label_font_size: Self::default_label_font_size(),
            body_font_size: Self::default_body_font_size(),
            highlight_unreachable: Self::default_highlight_unreachable(),
        }
    }
}
