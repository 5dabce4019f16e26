use crate::types::*;

/// Find the nearest snap point within the threshold.
/// Returns the snapped position if within threshold, otherwise the original position.
pub fn find_snap_point(position_us: TimeUs, snap_points: &[TimeUs], threshold_us: TimeUs) -> TimeUs {
    let nearest = snap_points
        .iter()
        .copied()
        .min_by_key(|p| position_us.0.abs_diff(p.0));

    match nearest {
        Some(point) if position_us.0.abs_diff(point.0) <= threshold_us.0.max(0) as u64 => point,
        _ => position_us,
    }
}

/// Collect every clip edge in the project, plus zero.
pub fn collect_snap_points(project: &Project, exclude_clip_id: Option<uuid::Uuid>) -> Vec<TimeUs> {
    let mut points = vec![TimeUs::ZERO];

    for clip in project.tracks.iter().flat_map(|t| t.clips.iter()) {
        if Some(clip.id) == exclude_clip_id {
            continue;
        }
        points.push(clip.start_us);
        points.push(clip.end_us);
    }

    points.sort();
    points.dedup();
    points
}

/// Round `position_us` to the nearest multiple of `grid_us`.
/// A non-positive grid leaves the position unchanged.
pub fn quantize(position_us: TimeUs, grid_us: TimeUs) -> TimeUs {
    if grid_us.0 <= 0 {
        return position_us;
    }
    let steps = (position_us.0 as f64 / grid_us.0 as f64).round() as i64;
    TimeUs(steps.saturating_mul(grid_us.0))
}
