use regex::Regex;
use std::sync::LazyLock;

// Axis words may follow with no space (`G28X0Y0`); `G280` is a different code.
static HOMING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^G28(?:[^0-9.]|$)").expect("homing pattern"));

// Inline comments after `;` are not part of the motion word list.
static VERTICAL_MOVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^G[01]\s+[^;]*?Z\s*(-?(?:\d+\.?\d*|\.\d+))").expect("vertical move pattern")
});

/// Split file text into lines on `\n`. Carriage returns stay with their line so
/// the rewritten file keeps its original line endings.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Decode file bytes as UTF-8, dropping invalid sequences.
pub fn decode_lossy(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Check if line is a G-code comment
pub fn is_comment(line: &str) -> bool {
    line.trim().starts_with(';')
}

/// Check if line is a `G28` homing command
pub fn is_homing(line: &str) -> bool {
    HOMING.is_match(line.trim())
}

/// Z coordinate of a non-comment `G0`/`G1` line, if it has one.
pub fn vertical_move_z(line: &str) -> Option<f64> {
    let caps = VERTICAL_MOVE.captures(line.trim())?;
    caps[1].parse().ok()
}

/// Check if line is a `G0`/`G1` move with a Z coordinate
pub fn is_vertical_move(line: &str) -> bool {
    vertical_move_z(line).is_some()
}
