use super::types::ExecutableBlock;
use regex::Regex;
use std::sync::LazyLock;

static BLOCK_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i);\s*EXECUTABLE_BLOCK_START").expect("block start pattern")
});

static BLOCK_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i);\s*EXECUTABLE_BLOCK_END").expect("block end pattern"));

/// Pair each `EXECUTABLE_BLOCK_START` with the next `EXECUTABLE_BLOCK_END`.
///
/// Scanning resumes after the end marker, so starts nested inside a block are
/// absorbed by it. A start with no end after it closes nothing.
pub fn find_executable_blocks(lines: &[&str]) -> Vec<ExecutableBlock> {
    let mut blocks = Vec::new();
    let mut i = 0usize;

    while i < lines.len() {
        if !BLOCK_START.is_match(lines[i]) {
            i += 1;
            continue;
        }

        let end = lines[i + 1..]
            .iter()
            .position(|line| BLOCK_END.is_match(line))
            .map(|offset| i + 1 + offset);

        match end {
            Some(end) => {
                blocks.push(ExecutableBlock { start: i, end });
                i = end + 1;
            }
            None => break,
        }
    }

    blocks
}

/// Index of the first line containing `anchor` verbatim.
pub fn find_skip_anchor(lines: &[&str], anchor: &str) -> Option<usize> {
    lines.iter().position(|line| line.contains(anchor))
}
