use super::cleaning::normalize;
use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::LightCurve;

/// Join per-quarter light curves into a single series.
///
/// Each segment is normalized by its own median first so quarter-to-quarter
/// offsets in instrumental flux disappear; the result is sorted by time.
pub fn stitch(segments: &[LightCurve]) -> ExplorerResult<LightCurve> {
    let first = segments.first().ok_or_else(|| {
        ExplorerError::no_data_with_context(
            "no light curves to stitch",
            ErrorContext::new("stitch"),
        )
    })?;

    let mut samples = Vec::with_capacity(segments.iter().map(LightCurve::len).sum());
    for segment in segments {
        let normalized = normalize(segment).map_err(|e| e.with_operation("stitch"))?;
        samples.extend(normalized.samples);
    }
    samples.sort_by(|a, b| a.time.total_cmp(&b.time));

    log::debug!(
        "Stitched {} segments into {} samples for '{}'",
        segments.len(),
        samples.len(),
        first.target
    );
    Ok(LightCurve::new(first.target.clone(), samples))
}
