use serde::Serialize;

/// A `;LAYER_CHANGE` comment paired with the `;Z:` annotation that follows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerMarker {
    /// 1-based line number of the `;LAYER_CHANGE` line.
    pub line_number: usize,
    pub z_height: f64,
    /// Trimmed marker line.
    pub marker_text: String,
    /// Trimmed annotation line.
    pub height_text: String,
}

impl LayerMarker {
    /// 0-based index of the marker line.
    pub fn line_index(&self) -> usize {
        self.line_number - 1
    }
}

/// A non-comment `G0`/`G1` line carrying a Z coordinate (legacy layer detection).
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalMove {
    /// 0-based line index.
    pub line_index: usize,
    pub z_height: f64,
    pub text: String,
}

/// Line span of an `EXECUTABLE_BLOCK_START` / `EXECUTABLE_BLOCK_END` pair (both inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutableBlock {
    pub start: usize,
    pub end: usize,
}
