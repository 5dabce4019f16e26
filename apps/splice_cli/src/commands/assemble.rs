use std::path::PathBuf;

use anyhow::{bail, Context};
use serde::Serialize;
use splice_core::config::EditorConfig;
use splice_core::export::ExportClip;
use splice_core::project;
use splice_core::types::*;
use splice_core::Editor;
use splice_probe::{media_source_from_path, FfprobeProber, ProberOptions};
use tokio::runtime::Handle;

#[derive(Serialize)]
struct AssembleOutput<'a> {
    project: &'a Project,
    assets: &'a [MediaAsset],
    export_clips: Vec<ExportClip>,
}

pub async fn run(
    config: EditorConfig,
    files: Vec<PathBuf>,
    name: String,
    preset: Option<String>,
    cache_dir: Option<PathBuf>,
    fast: bool,
) -> anyhow::Result<()> {
    let settings = match preset.as_deref() {
        Some(preset) => preset_settings(preset)?,
        None => config.project_settings(),
    };

    let cache_dir = cache_dir.unwrap_or_else(|| std::env::temp_dir().join("splice-cache"));
    let options = ProberOptions {
        thumbnails: !fast,
        waveforms: !fast,
        ..Default::default()
    };
    let prober = FfprobeProber::new(Handle::current(), cache_dir, options);

    let mut editor = Editor::new(config, Box::new(prober));
    let project = editor.create_project(&name, Some(settings.resolution), Some(settings.fps));
    let (video_track, audio_track) = (project.tracks[0].id, project.tracks[1].id);

    let mut asset_ids = Vec::with_capacity(files.len());
    for path in &files {
        let source = media_source_from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        asset_ids.push(editor.import_asset(source).id);
    }

    let report = editor.settle_probes().await;
    tracing::info!(probed = report.updated.len(), failed = report.failed.len(), "Probing finished");

    let mut video_end = TimeUs::ZERO;
    let mut audio_end = TimeUs::ZERO;
    for asset_id in asset_ids {
        let asset = editor.asset(asset_id)?.clone();
        if asset.duration_us <= TimeUs::ZERO {
            tracing::warn!(asset = %asset.name, "No duration, leaving it off the timeline");
            continue;
        }
        let (track, cursor) = match asset.kind {
            MediaKind::Audio => (audio_track, &mut audio_end),
            MediaKind::Video | MediaKind::Image => (video_track, &mut video_end),
        };
        let clip = editor.add_clip(track, &asset, *cursor)?;
        *cursor = clip.end_us;
    }

    let project = editor.project().context("Project closed unexpectedly")?;
    let fps = project.settings.fps;
    tracing::info!(
        clips = project.clip_count(),
        duration = %project.duration_us.to_timecode(fps),
        "Timeline assembled"
    );

    let output = AssembleOutput {
        project,
        assets: editor.assets(),
        export_clips: editor.export_clips()?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn preset_settings(name: &str) -> anyhow::Result<ProjectSettings> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "1080p" => project::preset_1080p(),
        "1080p60" => project::preset_1080p_60(),
        "720p" => project::preset_720p(),
        "4k" => project::preset_4k(),
        "shorts" | "vertical" => project::preset_shorts(),
        other => bail!("Unknown preset '{other}' (expected 1080p, 1080p60, 720p, 4k or shorts)"),
    })
}
