use super::header::build_header;
use super::output_filename;
use super::types::{Resolution, RewriteStats, TransformResult};
use crate::parser::{find_executable_blocks, find_skip_anchor, is_comment, is_homing, is_vertical_move};

const REMOVED_HOMING: &str = "; REMOVED G28: ";
const REMOVED_VERTICAL_MOVE: &str = "; REMOVED Z-MOVE: ";
const SKIPPED: &str = "; SKIPPED: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    Homing,
    VerticalMove,
}

/// What the passes decided about one line before the target.
#[derive(Debug, Clone, Copy, Default)]
struct LineMarks {
    removed: Option<Removal>,
    skipped: bool,
}

impl LineMarks {
    /// A line that is a comment once its marks are applied.
    fn is_commented(&self, line: &str) -> bool {
        self.removed.is_some() || self.skipped || is_comment(line)
    }

    fn render(&self, line: &str) -> String {
        let prefix = match (self.removed, self.skipped) {
            (Some(Removal::Homing), _) => REMOVED_HOMING,
            (Some(Removal::VerticalMove), _) => REMOVED_VERTICAL_MOVE,
            (None, true) => SKIPPED,
            (None, false) => return line.to_string(),
        };
        format!("{prefix}{line}")
    }
}

/// Rewrite everything before `resolution.target_line_index` so playback can
/// start there, and prepend the provenance header.
///
/// The input is left alone and lines from the target onwards are copied
/// verbatim. Callers must pass a target index no greater than `lines.len()`.
pub fn rewrite(
    lines: &[&str],
    resolution: Resolution,
    requested_height: f64,
    original_filename: &str,
    skip_anchor: &str,
) -> TransformResult {
    let target = resolution.target_line_index.min(lines.len());
    let before = &lines[..target];
    let mut marks = vec![LineMarks::default(); target];

    let homing_removed = neutralize(before, &mut marks, Removal::Homing, is_homing);
    let vertical_moves_removed =
        neutralize(before, &mut marks, Removal::VerticalMove, is_vertical_move);

    let executable_blocks_processed = find_executable_blocks(lines)
        .iter()
        .filter(|block| block.end < target)
        .count();

    let skip_start = find_skip_anchor(lines, skip_anchor).unwrap_or(0);
    for (line, mark) in before.iter().zip(marks.iter_mut()).skip(skip_start) {
        if !mark.is_commented(line) {
            mark.skipped = true;
        }
    }

    let mut stats = RewriteStats {
        homing_removed,
        vertical_moves_removed,
        executable_blocks_processed,
        skipped_line_count: target.saturating_sub(skip_start),
        resolved_z_height: resolution.resolved_height,
        requested_z_height: requested_height,
        target_line_index: target,
        total_output_lines: 0,
    };

    let header = build_header(original_filename, &stats);
    stats.total_output_lines = header.len() + lines.len();

    let mut rewritten_lines = header;
    rewritten_lines.reserve(lines.len());
    rewritten_lines.extend(before.iter().zip(&marks).map(|(line, mark)| mark.render(line)));
    rewritten_lines.extend(lines[target..].iter().map(|line| line.to_string()));

    tracing::debug!(
        target_line = target,
        homing_removed,
        vertical_moves_removed,
        executable_blocks_processed,
        "rewrite complete"
    );

    TransformResult {
        rewritten_lines,
        output_filename: output_filename(original_filename, requested_height),
        stats,
    }
}

/// Mark every uncommented line matching `matches` as removed; returns how many were marked.
fn neutralize(
    before: &[&str],
    marks: &mut [LineMarks],
    removal: Removal,
    matches: fn(&str) -> bool,
) -> usize {
    let mut count = 0;
    for (line, mark) in before.iter().zip(marks.iter_mut()) {
        if !mark.is_commented(line) && matches(line) {
            mark.removed = Some(removal);
            count += 1;
        }
    }
    count
}
