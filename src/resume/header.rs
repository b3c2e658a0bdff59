use super::format_height;
use super::types::RewriteStats;

const RULE: &str = "; ================================";

const CAUTIONS: [&str; 5] = [
    "; IMPORTANT: Ensure hotend and bed are at proper temperatures",
    "; IMPORTANT: Manually position nozzle near resume point",
    "; IMPORTANT: Ensure filament is loaded and primed",
    "; IMPORTANT: ALL Z-moves before target layer have been removed",
    "; IMPORTANT: Content AFTER target layer remains unchanged",
];

/// Provenance comment block placed at the top of a rewritten file. Ends with a
/// blank line.
pub fn build_header(original_filename: &str, stats: &RewriteStats) -> Vec<String> {
    let mut header = vec![
        RULE.to_string(),
        "; MODIFIED GCODE - RESUME PRINT".to_string(),
        format!("; Original file: {original_filename}"),
        format!(
            "; Target Z Height: {}mm",
            format_height(stats.requested_z_height)
        ),
        format!(
            "; Actual Start Z: {}mm",
            format_height(stats.resolved_z_height)
        ),
        format!(
            "; G28 homing commands removed (before target): {}",
            stats.homing_removed
        ),
        format!(
            "; ALL Z-moves removed (before target): {}",
            stats.vertical_moves_removed
        ),
        format!(
            "; Executable blocks processed (before target): {}",
            stats.executable_blocks_processed
        ),
        format!(
            "; Lines skipped (before target): {}",
            stats.skipped_line_count
        ),
        RULE.to_string(),
    ];
    header.extend(CAUTIONS.iter().map(|line| line.to_string()));
    header.push(RULE.to_string());
    header.push(String::new());
    header
}
