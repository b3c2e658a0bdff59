mod header;
mod locator;
mod rewriter;
mod types;

use crate::config::ResumeConfig;
use crate::error::ResumeError;
use crate::parser::split_lines;
use std::path::Path;

pub use header::build_header;
pub use locator::locate;
pub use rewriter::rewrite;
pub use types::{Resolution, RewriteStats, TransformResult};

/// Rewrite G-code `text` so printing resumes at the first layer reaching
/// `target_height` millimeters.
///
/// Nothing is produced on failure.
///
/// # Errors
///
/// [`ResumeError::NoLayerData`] when the file has no layer markers and no
/// `G0`/`G1 Z` moves, [`ResumeError::HeightNotReached`] when every height in
/// the file is below `target_height`.
pub fn transform(
    text: &str,
    target_height: f64,
    original_filename: &str,
    config: &ResumeConfig,
) -> Result<TransformResult, ResumeError> {
    let lines = split_lines(text);
    let resolution = locate(&lines, target_height, config.marker_lookahead)?;

    tracing::info!(
        original_filename,
        target_height,
        resolved_height = resolution.resolved_height,
        target_line = resolution.target_line_index,
        "resuming print"
    );

    Ok(rewrite(
        &lines,
        resolution,
        target_height,
        original_filename,
        &config.skip_anchor,
    ))
}

/// `<stem>_resume_Z<height>mm.gcode`, where `<stem>` is the basename of
/// `original_filename` without its last extension.
pub fn output_filename(original_filename: &str, requested_height: f64) -> String {
    let stem = Path::new(original_filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("unknown");
    format!("{stem}_resume_Z{}mm.gcode", format_height(requested_height))
}

/// Millimeter value as text. Whole numbers keep one decimal (`5.0`).
pub fn format_height(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
