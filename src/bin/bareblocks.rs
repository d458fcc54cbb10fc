//! bareblocks CLI - inspects image containers and dumps byte ranges.
//!
//! Usage:
//!   bareblocks inspect image.png
//!   bareblocks inspect image.png --format summary --config inspect.json
//!   bareblocks range image.png 33 64

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use bareblocks::inspect::IOUtils;
use bareblocks::logging::{init_tracing, init_tracing_json};
use bareblocks::{InspectConfig, InspectionReport, Inspector};

#[derive(Parser)]
#[command(name = "bareblocks")]
#[command(about = "Layered image container inspector", version)]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect one image file and print the report
    Inspect {
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// JSON configuration file; omitted keys keep their defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Hex-dump a byte range of a file
    Range {
        file: PathBuf,
        offset: u64,
        length: u64,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
    Summary,
}

fn print_summary(report: &InspectionReport) {
    let s = report.summary();
    let st = report.structure();
    let an = report.anomalies();
    println!("file:        {} ({} bytes)", s.file_name, s.file_size);
    println!("sha256:      {}", s.sha256);
    println!(
        "container:   {} ({} confidence, mime {})",
        s.container.family, s.container.confidence, s.mime_hint
    );
    println!(
        "records:     {} (pixel {} / non-pixel {}, ratio {:.3})",
        s.record_count, st.pixel_bytes, st.non_pixel_bytes, an.non_pixel_ratio
    );
    if let Some(props) = &report.metadata().image_properties {
        println!("image:       {}x{} {}", props.width, props.height, props.mode);
    }
    println!("payloads:    {}", report.payloads().len());
    for p in report.payloads() {
        println!(
            "  {:<24} @{:#x} {} bytes, {}",
            p.source_tag,
            p.byte_offset,
            p.byte_size,
            p.content.classification()
        );
    }
    let ai = report.ai_metadata();
    if let Some(tool) = &ai.tool {
        println!(
            "ai tool:     {} (graph: {}, wildcards: {})",
            tool, ai.graph_detected, ai.wildcards_present
        );
    }
    if !an.flags.is_empty() {
        let flags: Vec<&str> = an.flags.iter().map(|f| f.as_str()).collect();
        println!("flags:       {}", flags.join(", "));
    }
    for w in report.warnings() {
        println!("warning:     {}", w);
    }
    for u in report.uncertainties() {
        println!("uncertain:   {}", u);
    }
}

fn hex_dump(offset: u64, data: &[u8]) {
    for (i, line) in data.chunks(16).enumerate() {
        let ascii: String = line
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        println!(
            "{:08x}  {:<32}  {}",
            offset + (i * 16) as u64,
            hex::encode(line),
            ascii
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.quiet { "error" } else { "warn" };
    if cli.log_json {
        init_tracing_json(level);
    } else {
        init_tracing(level);
    }

    match cli.command {
        Command::Inspect {
            file,
            format,
            config,
        } => {
            let config = match config {
                Some(path) => InspectConfig::from_json_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => InspectConfig::default(),
            };
            let inspector = Inspector::new(config)?;
            let report = inspector
                .inspect_path(&file)
                .with_context(|| format!("inspecting {}", file.display()))?;
            match format {
                OutputFormat::Json => println!("{}", report.to_json_string()?),
                OutputFormat::Pretty => println!("{}", report.to_json_string_pretty()?),
                OutputFormat::Summary => print_summary(&report),
            }
        }
        Command::Range {
            file,
            offset,
            length,
        } => {
            let data = IOUtils::read_file_range(&file, offset, length)
                .with_context(|| format!("reading range of {}", file.display()))?;
            hex_dump(offset, &data);
        }
    }
    Ok(())
}
