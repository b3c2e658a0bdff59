mod files;
mod protocol;
mod server;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use std::io;

pub use files::{has_gcode_extension, EntryKind, FileEntry, FileHost, Listing, SavedFile};
pub use protocol::{read_message, write_message, Message, MessageContent};
pub use server::ResumeServer;

/// Serve framed requests on stdin, answering on stdout.
pub fn run_stdio(config: ServiceConfig) -> Result<(), ServiceError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut server = ResumeServer::new(stdin.lock(), stdout.lock(), config);
    server.run()
}
