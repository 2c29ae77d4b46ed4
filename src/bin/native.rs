#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();
    let story_id = std::env::args().nth(1);
    storymapper::native::run(story_id)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // This binary is not meant to be used for WASM.
    // Use the library's start() function instead.
}
