#![cfg(not(target_arch = "wasm32"))]

use crate::create_app;

/// Entry point used by the native executable. The story id comes from
/// the command line; `None` falls back to the scratch story with an
/// on-screen warning.
pub fn run(story_id: Option<String>) -> eframe::Result<()> {
    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Story Mapper",
        native_options,
        Box::new(move |cc| Ok(Box::new(create_app(cc, story_id)))),
    )
}
