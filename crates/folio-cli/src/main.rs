//! Folio CLI - markdown to HTML with attribute shorthand and author files.

use clap::{Parser, Subcommand};
use folio::{Diagnostic, FilesMap, Processed, Processor, ProcessorOptions};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Markdown to HTML converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a markdown document to HTML
    Convert {
        /// Input file (use - for stdin)
        input: PathBuf,

        /// Output file (use - for stdout, or omit to use stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Id of the author whose uploaded files the document references
        #[arg(long, default_value = "")]
        author_id: String,

        /// JSON object mapping bare filenames to URLs
        #[arg(long)]
        files_map: Option<PathBuf>,

        /// Write the files referenced by the body as JSON (use - for stderr)
        #[arg(long)]
        body_files: Option<PathBuf>,

        /// Ignore render hints on definitions when rendering image references
        #[arg(long)]
        baseline_references: bool,

        /// Parse GFM tables and strikethrough
        #[arg(long)]
        gfm: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Folio(#[from] folio::Error),
}

impl CliError {
    fn io(path: &Path, source: io::Error) -> Self {
        CliError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,folio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            author_id,
            files_map,
            body_files,
            baseline_references,
            gfm,
        } => {
            let files_map = match files_map {
                Some(path) => read_files_map(&path)?,
                None => FilesMap::new(),
            };
            let options = ProcessorOptions::new()
                .author_id(author_id)
                .files_map(files_map)
                .reference_definition_data(!baseline_references)
                .gfm(gfm);

            let processed = convert(&input, options)?;
            write_output(output.as_deref(), processed.html.as_bytes())?;

            if let Some(path) = body_files {
                let json = serde_json::to_string_pretty(&processed.document.data)?;
                write_body_files(&path, &json)?;
            }
        }
    }

    Ok(())
}

fn convert(input: &Path, options: ProcessorOptions) -> Result<Processed, CliError> {
    let processor = Processor::new(options)?;
    let processed = if is_dash(input) {
        processor.process_reader(io::stdin().lock())?
    } else {
        let file = fs::File::open(input).map_err(|e| CliError::io(input, e))?;
        processor.process_reader(file)?
    };
    report(&processed.diagnostics);
    tracing::info!(
        files = processed.body_files_map().map_or(0, |m| m.len()),
        "converted {}",
        input.display()
    );
    Ok(processed)
}

fn read_files_map(path: &Path) -> Result<FilesMap, CliError> {
    let text = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    parse_files_map(&text)
}

fn parse_files_map(text: &str) -> Result<FilesMap, CliError> {
    Ok(serde_json::from_str(text)?)
}

fn write_output(output: Option<&Path>, bytes: &[u8]) -> Result<(), CliError> {
    match output {
        Some(path) if !is_dash(path) => fs::write(path, bytes).map_err(|e| CliError::io(path, e)),
        _ => io::stdout()
            .write_all(bytes)
            .map_err(|e| CliError::io(Path::new("<stdout>"), e)),
    }
}

fn write_body_files(path: &Path, json: &str) -> Result<(), CliError> {
    if is_dash(path) {
        eprintln!("{json}");
        Ok(())
    } else {
        fs::write(path, json).map_err(|e| CliError::io(path, e))
    }
}

/// Report diagnostics to stderr
fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("warning: {diagnostic}");
    }
}

fn is_dash(path: &Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert_args() {
        let cli = Cli::try_parse_from([
            "folio",
            "convert",
            "post.md",
            "--author-id",
            "XYZ",
            "--files-map",
            "files.json",
            "--baseline-references",
            "--gfm",
        ])
        .unwrap();
        let Commands::Convert {
            input,
            author_id,
            files_map,
            baseline_references,
            output,
            body_files,
            gfm,
        } = cli.command;
        assert_eq!(input, PathBuf::from("post.md"));
        assert_eq!(author_id, "XYZ");
        assert_eq!(files_map, Some(PathBuf::from("files.json")));
        assert!(baseline_references);
        assert!(gfm);
        assert!(output.is_none());
        assert!(body_files.is_none());
    }

    #[test]
    fn test_parse_files_map() {
        let map = parse_files_map(r#"{"cat.png": "http://host/cat.png"}"#).unwrap();
        assert_eq!(
            map.get("cat.png").map(String::as_str),
            Some("http://host/cat.png")
        );
    }

    #[test]
    fn test_parse_files_map_rejects_non_strings() {
        assert!(matches!(
            parse_files_map(r#"{"cat.png": 1}"#),
            Err(CliError::Json(_))
        ));
    }
}
