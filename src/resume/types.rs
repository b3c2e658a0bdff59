use serde::Serialize;

/// Where playback restarts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// 0-based index of the first line left untouched.
    pub target_line_index: usize,
    /// Height of the marker (or move) the target was resolved to.
    pub resolved_height: f64,
}

/// Counters gathered while rewriting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteStats {
    pub homing_removed: usize,
    pub vertical_moves_removed: usize,
    pub executable_blocks_processed: usize,
    pub skipped_line_count: usize,
    pub resolved_z_height: f64,
    pub requested_z_height: f64,
    pub target_line_index: usize,
    pub total_output_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub rewritten_lines: Vec<String>,
    pub output_filename: String,
    pub stats: RewriteStats,
}

impl TransformResult {
    /// Rewritten file text, lines joined with `\n`.
    pub fn to_text(&self) -> String {
        self.rewritten_lines.join("\n")
    }
}
