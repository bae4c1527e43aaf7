//! ExtractKit CLI - structured extraction from the command line

use clap::{Args, Parser, Subcommand, ValueEnum};
use extractkit::{BatchResult, FieldSet, Pipeline, PipelineBuilder};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Output format for extraction results
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// CSV with a header from the first record
    Csv,
    /// One status line per item
    Summary,
}

/// ExtractKit - structured web content extraction
#[derive(Parser, Debug)]
#[command(name = "extractkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print the JSON schema for field-set files and exit
    #[arg(long)]
    schema: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract a structured record from one URL
    Extract {
        /// URL to extract from
        url: String,

        #[command(flatten)]
        options: PipelineOptions,

        /// Output format
        #[arg(long, short, default_value = "json")]
        output: OutputFormat,
    },
    /// Run the pipeline over a file of URLs, one per line
    Batch {
        /// File containing URLs (blank lines and # comments ignored)
        file: PathBuf,

        #[command(flatten)]
        options: PipelineOptions,

        /// Output format
        #[arg(long, short, default_value = "summary")]
        output: OutputFormat,

        /// Bounded parallelism across URLs
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },
}

/// Pipeline flags shared by both subcommands
#[derive(Args, Debug)]
struct PipelineOptions {
    /// Field-set JSON file (defaults to the built-in article fields)
    #[arg(long)]
    fields: Option<PathBuf>,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Custom User-Agent
    #[arg(long)]
    user_agent: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.schema {
        let schema = serde_json::to_string_pretty(&Pipeline::schema_json())
            .unwrap_or_else(|_| "{}".to_string());
        writeln_safe(&schema);
        return;
    }

    match cli.command {
        Some(Commands::Extract {
            url,
            options,
            output,
        }) => {
            let pipeline = build_pipeline(&options, 1);
            let result = pipeline.extract(&url).await;
            let failed = !result.succeeded();

            match output {
                OutputFormat::Json => print_json(&result),
                OutputFormat::Csv => {
                    writeln_safe(extractkit::to_csv_string(std::slice::from_ref(&result)).trim_end())
                }
                OutputFormat::Summary => writeln_safe(&format_item(&result)),
            }

            if failed {
                std::process::exit(1);
            }
        }
        Some(Commands::Batch {
            file,
            options,
            output,
            concurrency,
        }) => {
            let urls = match read_url_file(&file) {
                Ok(urls) => urls,
                Err(err) => {
                    eprintln!("Error reading {}: {}", file.display(), err);
                    std::process::exit(1);
                }
            };
            if urls.is_empty() {
                eprintln!("No URLs found in {}", file.display());
                std::process::exit(1);
            }

            let pipeline = build_pipeline(&options, concurrency);
            let batch = pipeline.run_batch(&urls).await;
            print_batch(&batch, output);

            if batch.summary().succeeded == 0 {
                std::process::exit(1);
            }
        }
        None => {
            eprintln!("Usage: extractkit extract <URL>");
            eprintln!("   or: extractkit batch <FILE>");
            eprintln!("   or: extractkit --help");
            std::process::exit(1);
        }
    }
}

fn build_pipeline(options: &PipelineOptions, concurrency: usize) -> Pipeline {
    let mut builder: PipelineBuilder = Pipeline::builder()
        .timeout(Duration::from_secs(options.timeout))
        .concurrency(concurrency);

    if let Some(ref path) = options.fields {
        match load_field_set(path) {
            Ok(fields) => builder = builder.schema(fields),
            Err(err) => {
                eprintln!("Error loading field set {}: {}", path.display(), err);
                std::process::exit(1);
            }
        }
    }

    if let Some(ref user_agent) = options.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }

    builder.build()
}

/// Load a field set from a JSON config file
fn load_field_set(path: &Path) -> Result<FieldSet, String> {
    let text = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&text).map_err(|err| err.to_string())
}

/// Read URLs from a file, one per line, skipping blanks and # comments
fn read_url_file(path: &Path) -> io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_url_lines(&text))
}

fn parse_url_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

fn print_batch(batch: &BatchResult, output: OutputFormat) {
    match output {
        OutputFormat::Json => print_json(batch),
        OutputFormat::Csv => writeln_safe(extractkit::to_csv_string(batch.results()).trim_end()),
        OutputFormat::Summary => {
            for result in batch.iter() {
                writeln_safe(&format_item(result));
            }
            writeln_safe(&batch.summary().to_string());
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|err| {
        eprintln!("Error serializing result: {}", err);
        std::process::exit(1);
    });
    writeln_safe(&json);
}

/// One status line per extraction result
fn format_item(result: &extractkit::ExtractionResult) -> String {
    let status = if result.succeeded() { "ok  " } else { "FAIL" };
    let mut line = format!(
        "{status} {} (fetch {}ms, structure {}ms)",
        result.url, result.diagnostics.fetch_ms, result.diagnostics.structure_ms
    );
    if let Some(first_error) = result.diagnostics.errors.first() {
        line.push_str(": ");
        line.push_str(first_error);
    }
    line
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
