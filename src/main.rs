#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use clap::Parser;

    use model_preview::{
        PreviewOptions,
        diagnostics::{
            metrics,
            report::{self, LogSink},
        },
        resources::{load_model_gltf, validate::validate_glb},
    };

    #[derive(Parser, Debug)]
    #[command(name = "model-preview")]
    #[command(about = "Preview a glTF model and report its quality diagnostics")]
    struct Cli {
        /// Path to a .glb file, absolute or relative to the assets directory
        source: PathBuf,

        /// Validate the file and log its statistics without opening a window
        #[arg(long)]
        stats: bool,

        /// Vertical field of view in degrees
        #[arg(long)]
        fov: Option<f32>,
    }

    /// Validate a local file and log its statistics without opening a window.
    fn print_stats(source: &str) -> anyhow::Result<()> {
        let bytes = std::fs::read(source)?;
        let summary = validate_glb(source, &bytes)?;
        log::info!(
            "Accepted {}: {} vertices, {} triangles",
            source,
            summary.vertex_count,
            summary.triangle_count
        );
        let assets_dir = Path::new(source)
            .parent()
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_default();
        let runtime = tokio::runtime::Runtime::new()?;
        let model = runtime.block_on(load_model_gltf(&bytes, &assets_dir))?;
        let snapshot = metrics::collect(&*model.scene, &model.animations);
        report::publish(&snapshot, &mut LogSink::default());
        Ok(())
    }

    pub fn main() -> anyhow::Result<()> {
        let cli = Cli::parse();
        let source = cli.source.to_string_lossy().into_owned();
        if cli.stats {
            if let Err(e) = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or("info"),
            )
            .try_init()
            {
                println!("Warning: Could not initialize logger: {}", e);
            }
            return print_stats(&source);
        }

        let mut options = PreviewOptions::default();
        if let Some(fov) = cli.fov {
            options.fov = fov;
        }
        model_preview::run(&source, options)
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}

// The web build starts through the exported `showModel` instead.
#[cfg(target_arch = "wasm32")]
fn main() {}
