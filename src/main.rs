use clap::{Args, Parser, Subcommand};
use gcode_resume::config::{DEFAULT_MARKER_LOOKAHEAD, DEFAULT_SKIP_ANCHOR};
use gcode_resume::error::ServiceError;
use gcode_resume::parser::{decode_lossy, find_layer_markers, split_lines};
use gcode_resume::resume::format_height;
use gcode_resume::{logging, service, transform, ResumeConfig, ServiceConfig};
use miette::IntoDiagnostic;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// Resume an interrupted 3D print from a chosen layer height.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Lines searched after ;LAYER_CHANGE for its ;Z: annotation
    #[arg(long, global = true, default_value_t = DEFAULT_MARKER_LOOKAHEAD)]
    lookahead: usize,

    /// Comment that starts the region commented out before the resume point
    #[arg(long, global = true, default_value = DEFAULT_SKIP_ANCHOR)]
    skip_anchor: String,

    /// Log level written to stderr (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the layer markers found in a G-code file
    Layers {
        file: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write a copy of FILE that starts printing at the given height
    Resume {
        file: PathBuf,
        /// Target height in millimeters
        #[arg(long = "z", short = 'z')]
        height: f64,
        /// Directory for the rewritten file (default: next to FILE)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Serve framed JSON requests on stdin/stdout
    Serve {
        /// Sandbox root; every path must resolve inside it
        #[arg(long)]
        root: PathBuf,
        /// Directory listed by default, relative to the root
        #[arg(long)]
        gcodes_dir: Option<PathBuf>,
    },
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.global.log_level);

    let resume_config = ResumeConfig {
        marker_lookahead: cli.global.lookahead,
        skip_anchor: cli.global.skip_anchor,
    };

    match cli.command {
        Command::Layers { file, json } => list_layers(&file, json, &resume_config)?,
        Command::Resume {
            file,
            height,
            output_dir,
            json,
        } => resume_file(&file, height, output_dir.as_deref(), json, &resume_config)?,
        Command::Serve { root, gcodes_dir } => {
            let root = fs::canonicalize(&root).map_err(|e| ServiceError::io(&root, e))?;
            let mut config = ServiceConfig::new(&root).with_resume(resume_config);
            if let Some(dir) = gcodes_dir {
                config = config.with_gcodes_dir(root.join(dir));
            }
            service::run_stdio(config)?;
        }
    }

    Ok(())
}

fn read_gcode(path: &Path) -> Result<String, ServiceError> {
    let bytes = fs::read(path).map_err(|e| ServiceError::io(path, e))?;
    Ok(decode_lossy(&bytes))
}

fn list_layers(path: &Path, as_json: bool, config: &ResumeConfig) -> miette::Result<()> {
    let text = read_gcode(path)?;
    let lines = split_lines(&text);
    let layers = find_layer_markers(&lines, config.marker_lookahead);

    if as_json {
        let out = json!({ "count": layers.len(), "layers": layers });
        println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
        return Ok(());
    }

    if layers.is_empty() {
        println!("No ;LAYER_CHANGE markers found in {}", path.display());
        return Ok(());
    }
    println!("{:>6}  {:>10}  Z", "layer", "line");
    for (i, layer) in layers.iter().enumerate() {
        println!(
            "{:>6}  {:>10}  {}mm",
            i + 1,
            layer.line_number,
            format_height(layer.z_height)
        );
    }
    Ok(())
}

fn resume_file(
    path: &Path,
    height: f64,
    output_dir: Option<&Path>,
    as_json: bool,
    config: &ResumeConfig,
) -> miette::Result<()> {
    let text = read_gcode(path)?;
    let original_filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown.gcode".to_string());

    let result = transform(&text, height, &original_filename, config)?;

    let output_dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| path.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let output_path = output_dir.join(&result.output_filename);
    fs::write(&output_path, result.to_text()).map_err(|e| ServiceError::io(&output_path, e))?;
    tracing::info!(output = %output_path.display(), "wrote resume file");

    let stats = &result.stats;
    if as_json {
        let out = json!({
            "filename": result.output_filename,
            "filepath": output_path,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
        return Ok(());
    }

    println!("Wrote {}", output_path.display());
    println!(
        "  Target Z {}mm, starting at Z {}mm (line {})",
        format_height(stats.requested_z_height),
        format_height(stats.resolved_z_height),
        stats.target_line_index + 1
    );
    println!("  G28 homing commands removed: {}", stats.homing_removed);
    println!("  Z moves removed:             {}", stats.vertical_moves_removed);
    println!("  Executable blocks processed: {}", stats.executable_blocks_processed);
    println!("  Lines skipped:               {}", stats.skipped_line_count);
    println!("  Total output lines:          {}", stats.total_output_lines);
    Ok(())
}
