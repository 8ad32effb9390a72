//! Fetching raw asset bytes with progress reporting.
//!
//! Native builds read from the filesystem (a path, or a name relative to the
//! assets directory); the web build fetches the URL relative to the page
//! origin.

/// Progress of a transfer as a fraction in `[0, 1]`, or `None` while the
/// total size is unknown (or zero).
pub fn progress_fraction(loaded: u64, total: Option<u64>) -> Option<f32> {
    match total {
        Some(total) if total > 0 => Some((loaded as f64 / total as f64).clamp(0.0, 1.0) as f32),
        _ => None,
    }
}

/// Status line shown while a model is downloading.
pub fn progress_text(fraction: Option<f32>) -> String {
    match fraction {
        Some(fraction) => format!("Loading model... {:.1}%", fraction * 100.0),
        None => "Loading model... 0%".to_string(),
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str, base_dir: &str) -> anyhow::Result<reqwest::Url> {
    if let Ok(url) = reqwest::Url::parse(file_name) {
        return Ok(url);
    }
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no window available"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page origin is not readable"))?;
    let base = if file_name.starts_with('/') || base_dir.is_empty() {
        format!("{}/", origin)
    } else {
        format!("{}/{}/", origin, base_dir.trim_matches('/'))
    };
    Ok(reqwest::Url::parse(&base)?.join(file_name)?)
}

#[cfg(not(target_arch = "wasm32"))]
const CHUNK_SIZE: usize = 64 * 1024;

/// Load `file_name` completely, calling `on_progress(loaded, total)` as bytes arrive.
pub async fn load_binary(
    file_name: &str,
    base_dir: &str,
    on_progress: &mut dyn FnMut(u64, Option<u64>),
) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name, base_dir)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        let total = response.content_length();
        on_progress(0, total);
        let data = response.bytes().await?.to_vec();
        on_progress(data.len() as u64, total.or(Some(data.len() as u64)));
        data
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        use std::io::Read;

        let direct = std::path::Path::new(file_name);
        let path = if direct.exists() {
            direct.to_path_buf()
        } else {
            std::path::Path::new(base_dir).join(file_name)
        };
        let mut file = std::fs::File::open(&path)
            .map_err(|e| anyhow::anyhow!("cannot open {}: {}", path.display(), e))?;
        let total = file.metadata().ok().map(|meta| meta.len());
        let mut data = Vec::with_capacity(total.unwrap_or(0) as usize);
        let mut chunk = vec![0u8; CHUNK_SIZE];
        on_progress(0, total);
        // TODO: switch to tokio::fs once loading runs on a spawned task instead of block_on
        loop {
            let read = file.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
            on_progress(data.len() as u64, total);
        }
        data
    };

    Ok(data)
}
