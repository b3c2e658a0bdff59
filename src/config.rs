use std::path::PathBuf;

/// Number of lines after a `;LAYER_CHANGE` marker searched for its `;Z:` annotation.
pub const DEFAULT_MARKER_LOOKAHEAD: usize = 4;

/// Comment that opens the region commented out ahead of the resume point.
pub const DEFAULT_SKIP_ANCHOR: &str = "; Filament gcode";

/// Tunables for the transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeConfig {
    pub marker_lookahead: usize,
    pub skip_anchor: String,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            marker_lookahead: DEFAULT_MARKER_LOOKAHEAD,
            skip_anchor: DEFAULT_SKIP_ANCHOR.to_string(),
        }
    }
}

/// Where the service is allowed to read and write.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Sandbox root. Every path handed to the service must resolve inside it.
    pub root: PathBuf,
    /// Directory listed when a request names no usable directory.
    pub gcodes_dir: PathBuf,
    pub resume: ResumeConfig,
}

impl ServiceConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            gcodes_dir: root.clone(),
            root,
            resume: ResumeConfig::default(),
        }
    }

    pub fn with_gcodes_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.gcodes_dir = dir.into();
        self
    }

    pub fn with_resume(mut self, resume: ResumeConfig) -> Self {
        self.resume = resume;
        self
    }
}
