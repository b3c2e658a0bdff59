use miette::Diagnostic;
use std::path::PathBuf;

use crate::resume::format_height;

/// Failures of the layer-resume transformer.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Diagnostic)]
pub enum ResumeError {
    #[error(
        "Target Z height {}mm not reached. Maximum Z in file: {}mm",
        mm(.requested),
        mm(.max_found)
    )]
    #[diagnostic(
        code(gcode_resume::height_not_reached),
        help("pick a height at or below the maximum Z found in the file")
    )]
    HeightNotReached { requested: f64, max_found: f64 },

    #[error("No Z-axis movements or layer changes found in the file")]
    #[diagnostic(
        code(gcode_resume::no_layer_data),
        help("the file needs ;LAYER_CHANGE/;Z: comments or G0/G1 moves with a Z coordinate")
    )]
    NoLayerData,
}

fn mm(value: &f64) -> String {
    format_height(*value)
}

/// Failures of the host surface (service requests and file access).
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ServiceError {
    #[error("I/O error on {}", .path.display())]
    #[diagnostic(code(gcode_resume::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(gcode_resume::json))]
    Json(#[from] serde_json::Error),

    #[error("Access denied: {} is outside {}", .path.display(), .root.display())]
    #[diagnostic(code(gcode_resume::access_denied))]
    AccessDenied { path: PathBuf, root: PathBuf },

    #[error("File not found: {}", .0.display())]
    #[diagnostic(code(gcode_resume::not_found))]
    NotFound(PathBuf),

    #[error("Path is not a directory: {}", .0.display())]
    #[diagnostic(code(gcode_resume::not_a_directory))]
    NotADirectory(PathBuf),

    #[error("Invalid file type - only .gcode and .g files are supported: {}", .0.display())]
    #[diagnostic(code(gcode_resume::invalid_file_type))]
    InvalidFileType(PathBuf),

    #[error("Invalid filename - filename cannot be empty")]
    #[diagnostic(code(gcode_resume::invalid_filename))]
    InvalidFilename,

    #[error("Invalid request data: {0}")]
    #[diagnostic(code(gcode_resume::invalid_request))]
    InvalidRequest(String),

    #[error("Malformed frame: {0}")]
    #[diagnostic(
        code(gcode_resume::framing),
        help("every message needs a `Content-Length: N` header followed by a blank line")
    )]
    Framing(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resume(#[from] ResumeError),
}

impl ServiceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
