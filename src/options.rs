/// How a preview pane is set up.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewOptions {
    /// Pane size in physical pixels; the window's size when unset.
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Background as `0xRRGGBB`.
    pub clear_colour: u32,
    /// Id of the canvas element to render into (web only).
    pub canvas_id: String,
    /// Where relative model names are resolved: a directory natively, a path
    /// below the page origin on the web.
    pub assets_dir: String,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            clear_colour: 0x87cefa,
            canvas_id: "canvas".to_string(),
            assets_dir: default_assets_dir(),
        }
    }
}

/// `assets/` inside the build output, where `build.rs` copies the bundled models.
#[cfg(not(target_arch = "wasm32"))]
fn default_assets_dir() -> String {
    match option_env!("OUT_DIR") {
        Some(out_dir) => std::path::Path::new(out_dir)
            .join("assets")
            .to_string_lossy()
            .into_owned(),
        None => "assets".to_string(),
    }
}

#[cfg(target_arch = "wasm32")]
fn default_assets_dir() -> String {
    String::new()
}
