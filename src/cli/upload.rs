use crate::cli::UploadArgs;
use crate::config::Config;
use crate::telemetry;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::path::Path;

/// Handle upload command - push one image through the uploader
pub fn handle(cmd: &UploadArgs, config: &Config) -> Result<()> {
    let (image_data, default_name) = if cmd.image.starts_with("data:") {
        (cmd.image.clone(), "inline".to_string())
    } else {
        let path = Path::new(&cmd.image);
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image file: {}", cmd.image))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        (BASE64.encode(bytes), name)
    };

    let image_name = cmd.name.clone().unwrap_or(default_name);

    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let guard = telemetry::init(config)?;

        let destination = guard.image_uploader.upload_base64_image(
            &cmd.trace_id,
            &cmd.span_id,
            &image_name,
            &image_data,
        );
        println!("{}", destination);

        // Uploads are fire-and-forget; give the background task a moment
        // before tearing the runtime down.
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;

        let errors = guard.metrics.get_image_upload_errors();
        let uploaded = guard.metrics.get_images_uploaded();
        guard.shutdown().await;

        if errors > 0 {
            anyhow::bail!("Upload failed; see logs");
        }
        if uploaded == 0 {
            log::warn!("Upload still pending at exit");
        }
        Ok(())
    })
}
