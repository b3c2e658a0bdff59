use super::commands::{is_comment, vertical_move_z};
use super::types::{LayerMarker, VerticalMove};
use regex::Regex;
use std::sync::LazyLock;

static LAYER_CHANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i);\s*LAYER_CHANGE").expect("layer change pattern"));

static HEIGHT_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i);\s*Z:\s*(\d+\.?\d*)").expect("height annotation pattern"));

/// Scan for `;LAYER_CHANGE` markers, pairing each with the first `;Z:` annotation
/// within `lookahead` lines after it. Markers without an annotation are dropped.
///
/// Results are in file order. Heights are not checked for monotonicity.
pub fn find_layer_markers(lines: &[&str], lookahead: usize) -> Vec<LayerMarker> {
    let mut markers = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let marker_text = line.trim();
        if !LAYER_CHANGE.is_match(marker_text) {
            continue;
        }

        let window_end = lines.len().min(i + 1 + lookahead);
        let paired = lines[i + 1..window_end].iter().find_map(|candidate| {
            let height_text = candidate.trim();
            let caps = HEIGHT_ANNOTATION.captures(height_text)?;
            // Unparseable annotations are not height markers; keep looking.
            let z_height = caps[1].parse::<f64>().ok()?;
            Some((z_height, height_text))
        });

        if let Some((z_height, height_text)) = paired {
            markers.push(LayerMarker {
                line_number: i + 1,
                z_height,
                marker_text: marker_text.to_string(),
                height_text: height_text.to_string(),
            });
        }
    }

    tracing::debug!(count = markers.len(), "layer markers found");
    markers
}

/// Legacy layer detection: every non-comment `G0`/`G1` line with a Z coordinate.
pub fn find_vertical_moves(lines: &[&str]) -> Vec<VerticalMove> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !is_comment(line))
        .filter_map(|(i, line)| {
            vertical_move_z(line).map(|z_height| VerticalMove {
                line_index: i,
                z_height,
                text: line.trim().to_string(),
            })
        })
        .collect()
}
