use super::files::FileHost;
use super::protocol::{read_message, write_message, Message, MessageContent};
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::parser::{find_layer_markers, split_lines};
use crate::resume;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{BufRead, Write};

const COMMANDS: [&str; 8] = [
    "initialize",
    "listFiles",
    "readFile",
    "analyzeLayers",
    "process",
    "saveFile",
    "terminate",
    "disconnect",
];

#[derive(Debug, Default, Deserialize)]
struct ListFilesArgs {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReadFileArgs {
    filepath: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeArgs {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessArgs {
    content: String,
    #[serde(alias = "target_z")]
    target_z: f64,
    #[serde(default = "default_original_filename", alias = "original_filename")]
    original_filename: String,
}

fn default_original_filename() -> String {
    "unknown.gcode".to_string()
}

#[derive(Debug, Deserialize)]
struct SaveFileArgs {
    filename: String,
    content: String,
    directory: Option<String>,
}

/// What the loop does after answering a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Request/response loop over a framed reader/writer pair.
///
/// Each request is answered in order; the loop owns all of its state.
#[derive(Debug)]
pub struct ResumeServer<R, W> {
    reader: R,
    writer: W,
    seq: u64,
    config: ServiceConfig,
    files: FileHost,
}

impl<R: BufRead, W: Write> ResumeServer<R, W> {
    pub fn new(reader: R, writer: W, config: ServiceConfig) -> Self {
        let files = FileHost::new(&config.root, &config.gcodes_dir);
        Self {
            reader,
            writer,
            seq: 0,
            config,
            files,
        }
    }

    /// Serve until `terminate`/`disconnect` or end of input.
    pub fn run(&mut self) -> Result<(), ServiceError> {
        tracing::info!(root = %self.files.root().display(), "service started");

        loop {
            let msg = match read_message(&mut self.reader) {
                Ok(Some(msg)) => msg,
                Ok(None) => {
                    tracing::info!("input closed");
                    break;
                }
                Err(err @ ServiceError::Json(_)) => {
                    tracing::warn!(error = %err, "unreadable message");
                    self.send_response(0, "unknown".to_string(), Err(err))?;
                    continue;
                }
                // The body of a bad frame was never consumed; resyncing would read it as a header.
                Err(err @ ServiceError::Framing(_)) => {
                    tracing::error!(error = %err, "lost frame sync, closing session");
                    self.send_response(0, "unknown".to_string(), Err(err))?;
                    break;
                }
                Err(err) => return Err(err),
            };

            match msg.content {
                MessageContent::Request { command, arguments } => {
                    if self.handle_request(msg.seq, command, arguments)? == Flow::Stop {
                        break;
                    }
                }
                other => tracing::debug!(?other, "ignoring non-request message"),
            }
        }

        tracing::info!("service stopped");
        Ok(())
    }

    fn handle_request(
        &mut self,
        seq: u64,
        command: String,
        arguments: Option<Value>,
    ) -> Result<Flow, ServiceError> {
        tracing::debug!(seq, command = command.as_str(), "request");

        let result = match command.as_str() {
            "initialize" => Ok(Some(json!({ "commands": COMMANDS }))),
            "listFiles" => self.list_files(arguments),
            "readFile" => self.read_file(arguments),
            "analyzeLayers" => self.analyze_layers(arguments),
            "process" => self.process(arguments),
            "saveFile" => self.save_file(arguments),
            "terminate" | "disconnect" => {
                self.send_response(seq, command, Ok(None))?;
                self.send_event("terminated", None)?;
                return Ok(Flow::Stop);
            }
            _ => Err(ServiceError::InvalidRequest(format!(
                "unknown command: {command}"
            ))),
        };

        let initialize = command == "initialize";
        self.send_response(seq, command, result)?;
        if initialize {
            self.send_event("initialized", None)?;
        }
        Ok(Flow::Continue)
    }

    fn list_files(&self, arguments: Option<Value>) -> Result<Option<Value>, ServiceError> {
        let args: ListFilesArgs = parse_args(arguments)?;
        let listing = self.files.list(args.path.as_deref())?;
        Ok(Some(serde_json::to_value(listing)?))
    }

    fn read_file(&self, arguments: Option<Value>) -> Result<Option<Value>, ServiceError> {
        let args: ReadFileArgs = parse_args(arguments)?;
        let content = self.files.read_gcode(&args.filepath)?;
        Ok(Some(json!({ "content": content })))
    }

    fn analyze_layers(&self, arguments: Option<Value>) -> Result<Option<Value>, ServiceError> {
        let args: AnalyzeArgs = parse_args(arguments)?;
        let lines = split_lines(&args.content);
        let layers = find_layer_markers(&lines, self.config.resume.marker_lookahead);
        tracing::info!(count = layers.len(), "layer analysis complete");
        Ok(Some(json!({ "count": layers.len(), "layers": layers })))
    }

    fn process(&self, arguments: Option<Value>) -> Result<Option<Value>, ServiceError> {
        let args: ProcessArgs = parse_args(arguments)?;
        let result = resume::transform(
            &args.content,
            args.target_z,
            &args.original_filename,
            &self.config.resume,
        )?;
        Ok(Some(json!({
            "content": result.to_text(),
            "filename": result.output_filename,
            "stats": result.stats,
        })))
    }

    fn save_file(&self, arguments: Option<Value>) -> Result<Option<Value>, ServiceError> {
        let args: SaveFileArgs = parse_args(arguments)?;
        let saved = self
            .files
            .save(&args.filename, &args.content, args.directory.as_deref())?;
        Ok(Some(serde_json::to_value(saved)?))
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn send_response(
        &mut self,
        request_seq: u64,
        command: String,
        result: Result<Option<Value>, ServiceError>,
    ) -> Result<(), ServiceError> {
        let (success, message, body) = match result {
            Ok(body) => (true, None, body),
            Err(err) => {
                tracing::warn!(command = command.as_str(), error = %err, "request failed");
                (false, Some(err.to_string()), None)
            }
        };
        let msg = Message {
            seq: self.next_seq(),
            content: MessageContent::Response {
                request_seq,
                success,
                command,
                message,
                body,
            },
        };
        self.send(&msg)
    }

    fn send_event(&mut self, event: &str, body: Option<Value>) -> Result<(), ServiceError> {
        let msg = Message {
            seq: self.next_seq(),
            content: MessageContent::Event {
                event: event.to_string(),
                body,
            },
        };
        self.send(&msg)
    }

    fn send(&mut self, msg: &Message) -> Result<(), ServiceError> {
        write_message(&mut self.writer, msg).map_err(|e| ServiceError::io("<output>", e))
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Missing arguments are read as an empty object.
fn parse_args<T: DeserializeOwned>(arguments: Option<Value>) -> Result<T, ServiceError> {
    let value = arguments.unwrap_or_else(|| json!({}));
    serde_json::from_value(value).map_err(|e| ServiceError::InvalidRequest(e.to_string()))
}
