use std::path::PathBuf;

use anyhow::Context;
use splice_probe::{media_source_from_path, probe::probe_file};

pub async fn run(files: Vec<PathBuf>) -> anyhow::Result<()> {
    let mut results = Vec::with_capacity(files.len());

    for path in &files {
        let source = media_source_from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let probe = probe_file(path)
            .await
            .with_context(|| format!("Failed to probe {}", path.display()))?;
        tracing::info!(file = %path.display(), duration = %probe.duration_us, "Probed");
        results.push(serde_json::json!({ "source": source, "probe": probe }));
    }

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
