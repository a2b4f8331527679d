//! CLI for citelink - Link numeric citations in Markdown documents.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};
use log::debug;

use citelink::{
    cited_numbers, config::ConfigError, generate_output, load_sources, parse_document,
    refs::RefsError, render_html, render_references, standalone_page, Config, Node, Pipeline,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Link numeric bracket citations in Markdown documents
#[derive(Parser)]
#[command(name = "citelink")]
#[command(version)]
#[command(after_help = "\
Examples:
  citelink render answer.md --sources sources.json
  citelink render answer.md -s sources.json -o answer.html --standalone
  echo 'Rates rose [1].' | citelink render -
  citelink link tree.json --pretty
  citelink citations answer.md")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Markdown file to HTML with linked citations
    #[command(after_help = "\
Examples:
  citelink render answer.md --sources sources.json
  citelink render answer.md -s sources.json --refs-header 'References'
  citelink render answer.md --no-refs

Citation syntax: [1], [23]. Citation [n] refers to the n-th source.")]
    Render {
        /// Input Markdown file (use '-' for stdin)
        input: PathBuf,

        /// Sources file (JSON array, JSONL, or an object with a 'citations' array)
        #[arg(short, long)]
        sources: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Don't include the references list
        #[arg(long)]
        no_refs: bool,

        /// Custom references header
        #[arg(long)]
        refs_header: Option<String>,

        /// Wrap the output in a complete HTML page
        #[arg(long)]
        standalone: bool,
    },

    /// Link citations in an mdast JSON tree
    Link {
        /// Input JSON tree (use '-' for stdin)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List the distinct citation numbers in a Markdown file
    Citations {
        /// Input Markdown file (use '-' for stdin)
        input: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// AppError: semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10: input file not found / unreadable / not a valid tree
    InputFile(String),
    /// Exit 11: sources file not found / invalid
    SourcesFile(String),
    /// Exit 12: configuration file not found / invalid
    Config(String),
    /// Exit 15: cannot write output file
    OutputFile(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::InputFile(_) => 10,
            AppError::SourcesFile(_) => 11,
            AppError::Config(_) => 12,
            AppError::OutputFile(_) => 15,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InputFile(msg) => {
                write!(f, "{}\n  hint: verify the file path is correct", msg)
            }
            AppError::SourcesFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: the file must be a JSON array of URLs or {{\"url\", \"title\"}} objects, JSONL, or an object with a 'citations' array",
                    msg
                )
            }
            AppError::Config(msg) => {
                write!(
                    f,
                    "{}\n  hint: known keys are references_header, include_references, standalone, official_domains, log_level",
                    msg
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path).map_err(|e| map_config_error(path, e))?,
        None => Config::default(),
    };

    // Logging is best effort; a broken RUST_LOG spec must not stop a render.
    let _logger = match init_logger(cli.verbose, &config.log_level) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("warning: logger setup failed: {}", e);
            None
        }
    };

    match cli.command {
        Commands::Render {
            input,
            sources,
            output,
            no_refs,
            refs_header,
            standalone,
        } => {
            let options = RenderOptions {
                sources: sources.as_deref(),
                include_references: config.include_references && !no_refs,
                references_header: refs_header.as_deref().unwrap_or(&config.references_header),
                standalone: standalone || config.standalone,
                official_domains: &config.official_domains,
            };
            render_command(&input, output.as_deref(), &options)?;
        }
        Commands::Link {
            input,
            output,
            pretty,
        } => {
            link_command(&input, output.as_deref(), pretty)?;
        }
        Commands::Citations { input } => {
            citations_command(&input)?;
        }
    }

    Ok(())
}

/// Starts the stderr logger. `RUST_LOG` wins, then `--verbose`, then the config.
fn init_logger(verbose: bool, configured: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    let fallback = if verbose { "debug" } else { configured };
    Logger::try_with_env_or_str(fallback)?.log_to_stderr().start()
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

struct RenderOptions<'a> {
    sources: Option<&'a Path>,
    include_references: bool,
    references_header: &'a str,
    standalone: bool,
    official_domains: &'a [String],
}

/// Render a Markdown file to HTML.
fn render_command(
    input: &Path,
    output: Option<&Path>,
    options: &RenderOptions<'_>,
) -> Result<(), AppError> {
    // 1. Read the Markdown file (support '-' for stdin)
    let markdown = read_input(input)?;

    // 2. Load sources
    let sources = match options.sources {
        Some(path) => load_sources(path, options.official_domains)
            .map_err(|e| map_refs_error(path, e))?,
        None => Vec::new(),
    };
    debug!("loaded {} source(s)", sources.len());

    // 3. Parse and run the passes
    let mut tree = parse_document(&markdown);
    Pipeline::default().apply(&mut tree);

    // 4. Render body and references
    let body = render_html(&tree);
    let references = if options.include_references {
        render_references(&markdown, &sources)
    } else {
        None
    };

    // 5. Assemble
    let mut result = generate_output(&body, references.as_deref(), options.references_header);
    if options.standalone {
        result = standalone_page(&result, &page_title(input));
    }

    // 6. Write to file or stdout
    write_output(output, &result)?;
    if let Some(output_path) = output {
        eprintln!(
            "found {} distinct citation(s), wrote {}",
            cited_numbers(&markdown).len(),
            output_path.display()
        );
    }

    Ok(())
}

/// Link citations in an mdast JSON tree.
fn link_command(input: &Path, output: Option<&Path>, pretty: bool) -> Result<(), AppError> {
    let content = read_input(input)?;
    let mut tree: Node = serde_json::from_str(&content)
        .map_err(|e| AppError::InputFile(format!("'{}': invalid tree: {}", input.display(), e)))?;

    Pipeline::default().apply(&mut tree);

    let json = if pretty {
        serde_json::to_string_pretty(&tree)
    } else {
        serde_json::to_string(&tree)
    }
    .map_err(|e| AppError::OutputFile(format!("failed to serialize tree: {}", e)))?;

    write_output(output, &format!("{}\n", json))?;
    if let Some(output_path) = output {
        eprintln!("wrote {}", output_path.display());
    }

    Ok(())
}

/// List distinct citation numbers, one per line.
fn citations_command(input: &Path) -> Result<(), AppError> {
    let markdown = read_input(input)?;
    let mut listing = String::new();
    for number in cited_numbers(&markdown) {
        listing.push_str(&number);
        listing.push('\n');
    }
    write_output(None, &listing)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_input(input: &Path) -> Result<String, AppError> {
    if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| AppError::InputFile(format!("failed to read from stdin: {}", e)))?;
        Ok(buf)
    } else {
        fs::read_to_string(input)
            .map_err(|e| AppError::InputFile(format!("'{}': {}", input.display(), e)))
    }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), AppError> {
    if let Some(output_path) = output {
        fs::write(output_path, content)
            .map_err(|e| AppError::OutputFile(format!("'{}': {}", output_path.display(), e)))
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{}", content)
            .map_err(|e| AppError::OutputFile(format!("stdout: {}", e)))
    }
}

fn page_title(input: &Path) -> String {
    if input == Path::new("-") {
        return "citelink".to_string();
    }
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "citelink".to_string())
}

fn map_refs_error(path: &Path, e: RefsError) -> AppError {
    AppError::SourcesFile(format!("'{}': {}", path.display(), e))
}

fn map_config_error(path: &Path, e: ConfigError) -> AppError {
    AppError::Config(format!("'{}': {}", path.display(), e))
}
