use super::types::Resolution;
use crate::error::ResumeError;
use crate::parser::{find_layer_markers, find_vertical_moves};

/// Resolve the line where playback restarts for `target_height`.
///
/// Layer markers win when the file has any; otherwise raw `G0`/`G1 Z` moves
/// are used. Either way the first entry in file order whose height reaches the
/// target is chosen, so equal heights resolve to the earliest line.
pub fn locate(
    lines: &[&str],
    target_height: f64,
    lookahead: usize,
) -> Result<Resolution, ResumeError> {
    let markers = find_layer_markers(lines, lookahead);

    let candidates: Vec<(usize, f64)> = if markers.is_empty() {
        let moves = find_vertical_moves(lines);
        tracing::debug!(
            count = moves.len(),
            "no layer markers, falling back to vertical moves"
        );
        moves.iter().map(|m| (m.line_index, m.z_height)).collect()
    } else {
        markers.iter().map(|m| (m.line_index(), m.z_height)).collect()
    };

    if candidates.is_empty() {
        return Err(ResumeError::NoLayerData);
    }

    match candidates.iter().find(|(_, z)| *z >= target_height) {
        Some(&(target_line_index, resolved_height)) => Ok(Resolution {
            target_line_index,
            resolved_height,
        }),
        None => {
            let max_found = candidates
                .iter()
                .map(|(_, z)| *z)
                .fold(f64::NEG_INFINITY, f64::max);
            Err(ResumeError::HeightNotReached {
                requested: target_height,
                max_found,
            })
        }
    }
}
