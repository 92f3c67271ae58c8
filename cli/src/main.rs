//! docmark CLI - DOCX/PDF to Markdown conversion tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docmark::render::{fields_to_markdown, output_file_name, to_json};
use docmark::{
    CleanupPreset, ConvertOutput, Docmark, DocumentKind, ExtractedFields, JsonFormat,
    PatternRegistry,
};

#[derive(Parser)]
#[command(name = "docmark")]
#[command(version)]
#[command(about = "Convert DOCX and PDF documents to Markdown", long_about = None)]
struct Cli {
    /// Input DOCX or PDF files
    #[arg(value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Output directory (next to each input if not specified)
    #[arg(short, long, value_name = "DIR", env = "DOCMARK_OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Text cleanup preset
    #[arg(long, value_enum, env = "DOCMARK_CLEANUP")]
    cleanup: Option<CleanupLevel>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input DOCX or PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Text cleanup preset
        #[arg(long, value_enum, env = "DOCMARK_CLEANUP")]
        cleanup: Option<CleanupLevel>,

        /// Escape Markdown syntax characters in DOCX text
        #[arg(long)]
        escape: bool,

        /// Reconstruct PDF pages on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Extract key fields from a PDF
    Fields {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output JSON instead of a Markdown report
        #[arg(long)]
        json: bool,

        /// Output compact JSON
        #[arg(long, requires = "json")]
        compact: bool,

        /// Custom field pattern as NAME=REGEX (repeatable; replaces the built-in fields)
        #[arg(short, long = "pattern", value_name = "NAME=REGEX")]
        patterns: Vec<String>,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Unicode normalization only
    Minimal,
    /// Normalization, ligature repair, replacement-character removal
    Standard,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Markdown {
            input,
            output,
            cleanup,
            escape,
            sequential,
        }) => cmd_markdown(&input, output.as_deref(), cleanup, escape, sequential),
        Some(Commands::Fields {
            input,
            output,
            json,
            compact,
            patterns,
        }) => cmd_fields(&input, output.as_deref(), json, compact, &patterns),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if cli.inputs.is_empty() {
                println!("{}", "Usage: docmark <FILE>... [-o DIR]".yellow());
                println!("       docmark --help for more information");
                Ok(())
            } else {
                cmd_convert(&cli.inputs, cli.output.as_deref(), cli.cleanup)
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Convert each input by its extension and write the result next to it
/// (or into `output_dir`). A failed file is reported and skipped.
fn cmd_convert(
    inputs: &[PathBuf],
    output_dir: Option<&Path>,
    cleanup: Option<CleanupLevel>,
) -> CliResult<()> {
    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)?;
    }

    let pb = if inputs.len() > 1 {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{pos}/{len}] {msg}")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let mut written = Vec::new();
    let mut failed = 0usize;
    for input in inputs {
        if let Some(pb) = &pb {
            pb.set_message(input.display().to_string());
        }
        match convert_one(input, output_dir, cleanup) {
            Ok(path) => written.push(path),
            Err(e) => {
                failed += 1;
                let line = format!("{} {}: {}", "Failed".red(), input.display(), e);
                match &pb {
                    Some(pb) => pb.println(line),
                    None => eprintln!("{}", line),
                }
            }
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    for path in &written {
        println!("{} {}", "Saved to".green(), path.display());
    }

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, inputs.len()).into());
    }
    Ok(())
}

fn convert_one(
    input: &Path,
    output_dir: Option<&Path>,
    cleanup: Option<CleanupLevel>,
) -> CliResult<PathBuf> {
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("invalid file name: {}", input.display()))?;
    let kind = DocumentKind::from_file_name(file_name)?;

    let mut builder = Docmark::new();
    if kind == DocumentKind::Pdf {
        builder = builder.fields();
    }
    if let Some(level) = cleanup {
        builder = builder.with_cleanup(level.into());
    }

    let markdown = builder.convert_file(input)?.to_markdown();
    let target = output_path(input, output_dir, kind, file_name);
    fs::write(&target, markdown)?;
    log::debug!("wrote {}", target.display());
    Ok(target)
}

fn output_path(input: &Path, output_dir: Option<&Path>, kind: DocumentKind, file_name: &str) -> PathBuf {
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(output_file_name(file_name, kind))
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    cleanup: Option<CleanupLevel>,
    escape: bool,
    sequential: bool,
) -> CliResult<()> {
    let mut builder = Docmark::new().with_escape(escape);
    if sequential {
        builder = builder.sequential();
    }
    if let Some(level) = cleanup {
        builder = builder.with_cleanup(level.into());
    }

    let markdown = builder.convert_file(input)?.to_markdown();
    emit(output, &markdown)
}

fn cmd_fields(
    input: &Path,
    output: Option<&Path>,
    json: bool,
    compact: bool,
    patterns: &[String],
) -> CliResult<()> {
    let mut builder = Docmark::new().fields();
    if !patterns.is_empty() {
        builder = builder.with_patterns(parse_patterns(patterns)?);
    }

    let fields: ExtractedFields = match builder.convert_file(input)? {
        ConvertOutput::Fields(fields) => fields,
        ConvertOutput::Markdown(_) => return Err("field extraction produced Markdown".into()),
    };

    let text = if json {
        let format = if compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        to_json(&fields, format)?
    } else {
        fields_to_markdown(&fields)
    };
    emit(output, &text)
}

/// Parse `NAME=REGEX` arguments into a pattern registry.
fn parse_patterns(args: &[String]) -> CliResult<PatternRegistry> {
    let mut pairs = Vec::with_capacity(args.len());
    for arg in args {
        let (name, regex) = arg
            .split_once('=')
            .ok_or_else(|| format!("pattern must be NAME=REGEX: {}", arg))?;
        pairs.push((name.trim(), regex));
    }
    Ok(PatternRegistry::from_pairs(pairs)?)
}

fn emit(output: Option<&Path>, text: &str) -> CliResult<()> {
    if let Some(path) = output {
        fs::write(path, text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docmark".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("DOCX and PDF to Markdown conversion tool");
    println!();
    println!("License: MIT");
}
