//! CLI binary for mcq2slots.
//!
//! A thin shim over the library crate that maps CLI flags to `ParseConfig`,
//! writes filled templates as JSON and prints unresolved-question warnings.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mcq2slots::pipeline::input::{output_path, output_stem, split_lines, STDIN_PATH};
use mcq2slots::{
    fill_tables, parse_file, process_files, FilledDocument, MarkerPolicy, McqError, ParseConfig,
    ParseProgressCallback, ParseResult, ProgressCallback, TableSink, TemplateSize,
};
use serde::Serialize;
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over files (or chunks), one log line
/// per finished item. Items may finish out of order when files are parsed
/// concurrently.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:32.green/238}] {pos:>3}/{len}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Parsing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ParseProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_chunks: usize) {
        self.bar.set_length(total_chunks as u64);
    }

    fn on_chunk_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_chunk_complete(&self, _index: usize, _total: usize, name: &str, questions: usize) {
        self.bar.println(format!(
            "  {} {:<24} {}",
            green("✓"),
            name,
            dim(&format!("{questions} questions"))
        ));
        self.bar.inc(1);
    }

    fn on_chunk_error(&self, _index: usize, _total: usize, name: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {:<24} {}", red("✗"), name, red(&msg)));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, _total_chunks: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"INPUT FORMAT:
  1. What is 2+2?          question stem (numbering is stripped)
  (A) 3                    options: (A) A) [a] 1) or A. to D.
  (B) 4 @                  the marker (default @) flags the answer
  (C) 5

  ---chapter2---           with --chunks: starts a new named output

EXAMPLES:
  # Summary of one file
  mcq2slots questions.txt

  # Fill a 50-slot template per file, JSON into ./out
  mcq2slots -t 50 -o out chapter1.txt chapter2.txt

  # One output per ---name--- chunk
  mcq2slots --chunks -t 100 -o out bank.txt

  # Inline text, structured JSON on stdout
  mcq2slots --json --text $'Q1) Capital of France?\nA. Paris @\nB. Lyon'

  # Read stdin, strip the marker from option text
  cat questions.txt | mcq2slots --strip-marker --json -

ENVIRONMENT VARIABLES:
  RUST_LOG                 tracing filter (overrides -v / -q)
  MCQ2SLOTS_*              every long flag, e.g. MCQ2SLOTS_TEMPLATE_SIZE=50
"#;

/// Parse plain-text multiple-choice questions into template slots.
#[derive(Parser, Debug)]
#[command(
    name = "mcq2slots",
    version,
    about = "Parse plain-text multiple-choice questions into template slots",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Text files to parse ("-" reads stdin).
    #[arg(required_unless_present = "text")]
    inputs: Vec<PathBuf>,

    /// Parse this text instead of files.
    #[arg(long, conflicts_with = "inputs")]
    text: Option<String>,

    /// Write one JSON file per output into this directory.
    #[arg(short, long, env = "MCQ2SLOTS_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Template size in slots: 25, 50, 100, 125, 150 or 200.
    #[arg(short, long, env = "MCQ2SLOTS_TEMPLATE_SIZE", value_parser = parse_template_size)]
    template_size: Option<TemplateSize>,

    /// Stop after this many questions per output.
    #[arg(long, env = "MCQ2SLOTS_MAX_RECORDS")]
    max_records: Option<usize>,

    /// Split input on ---name--- delimiter lines.
    #[arg(long, env = "MCQ2SLOTS_CHUNKS")]
    chunks: bool,

    /// Name prefix for outputs without a delimiter name.
    #[arg(long, env = "MCQ2SLOTS_CHUNK_PREFIX", default_value = "output")]
    chunk_prefix: String,

    /// Character marking the correct option.
    #[arg(long, env = "MCQ2SLOTS_MARKER", default_value_t = '@')]
    marker: char,

    /// Remove the marker from emitted option text.
    #[arg(long, env = "MCQ2SLOTS_STRIP_MARKER")]
    strip_marker: bool,

    /// Number of files parsed concurrently.
    #[arg(short, long, env = "MCQ2SLOTS_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Print structured JSON instead of a summary.
    #[arg(long, env = "MCQ2SLOTS_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "MCQ2SLOTS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MCQ2SLOTS_VERBOSE")]
    verbose: bool,

    /// Suppress progress, summary and warnings; errors, -o files and --json
    /// output are still produced.
    #[arg(short, long, env = "MCQ2SLOTS_QUIET")]
    quiet: bool,
}

fn parse_template_size(s: &str) -> std::result::Result<TemplateSize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    TemplateSize::from_slots(n).map_err(|e| e.to_string())
}

/// One written output: a chunk's parse result and its filled tables.
#[derive(Serialize)]
struct OutputFile<'a> {
    source: String,
    name: &'a str,
    result: Option<&'a ParseResult>,
    template: &'a TableSink,
}

/// Where the parsed results go.
#[derive(Debug, PartialEq, Eq)]
enum Report {
    Files(PathBuf),
    Json,
    Summary,
    Silent,
}

impl Report {
    fn from_cli(cli: &Cli) -> Self {
        match (&cli.output_dir, cli.json, cli.quiet) {
            (Some(dir), _, _) => Report::Files(dir.clone()),
            (None, true, _) => Report::Json,
            (None, false, false) => Report::Summary,
            (None, false, true) => Report::Silent,
        }
    }
}

/// A parsed input document.
struct Parsed {
    source: PathBuf,
    document: FilledDocument,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    source: String,
    #[serde(flatten)]
    document: &'a FilledDocument,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let reads_stdin = cli.inputs.iter().any(|p| p.as_os_str() == STDIN_PATH);
    let show_progress =
        !cli.quiet && !cli.no_progress && !cli.json && cli.text.is_none() && !reads_stdin;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ParseProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Parse ────────────────────────────────────────────────────────────
    let mut parsed = Vec::new();
    let mut failures = 0usize;

    if let Some(ref text) = cli.text {
        parsed.push(Parsed {
            source: PathBuf::from(STDIN_PATH),
            document: fill_tables(&split_lines(text), &config),
        });
    } else if reads_stdin {
        // stdin can only be read synchronously, so go one input at a time.
        for path in &cli.inputs {
            match parse_file(path, &config) {
                Ok(document) => parsed.push(Parsed {
                    source: path.clone(),
                    document,
                }),
                Err(e) => {
                    failures += 1;
                    eprintln!("{} {}", red("✗"), e);
                }
            }
        }
    } else {
        for (path, outcome) in process_files(&cli.inputs, &config).await {
            match outcome {
                Ok(document) => parsed.push(Parsed {
                    source: path,
                    document,
                }),
                Err(e) => {
                    failures += 1;
                    eprintln!("{} {}", red("✗"), e);
                }
            }
        }
    }

    if parsed.is_empty() && failures > 0 {
        anyhow::bail!("All {failures} input(s) failed");
    }

    // ── Output ───────────────────────────────────────────────────────────
    match Report::from_cli(&cli) {
        Report::Files(dir) => {
            let written = write_outputs(&dir, &parsed, cli.chunks).await?;
            if !cli.quiet {
                eprintln!(
                    "{} wrote {} file(s) to {}",
                    green("✔"),
                    bold(&written.to_string()),
                    bold(&dir.display().to_string())
                );
            }
        }
        Report::Json => {
            let docs: Vec<JsonDocument<'_>> = parsed
                .iter()
                .map(|p| JsonDocument {
                    source: p.source.display().to_string(),
                    document: &p.document,
                })
                .collect();
            let json =
                serde_json::to_string_pretty(&docs).context("Failed to serialise output")?;
            println!("{json}");
        }
        Report::Summary => print_summary(&parsed).context("Failed to write to stdout")?,
        Report::Silent => {}
    }

    if !cli.quiet {
        print_warnings(&parsed);
    }

    Ok(())
}

/// Map CLI args to `ParseConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ParseConfig> {
    let mut builder = ParseConfig::builder()
        .marker(cli.marker)
        .marker_policy(if cli.strip_marker {
            MarkerPolicy::Strip
        } else {
            MarkerPolicy::Keep
        })
        .chunk_mode(cli.chunks)
        .default_chunk_prefix(cli.chunk_prefix.clone())
        .concurrency(cli.concurrency);

    if let Some(size) = cli.template_size {
        builder = builder.template_size(size);
    }
    if let Some(n) = cli.max_records {
        builder = builder.max_records(n);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// File name for one chunk's output.
///
/// Named chunks use their own name; otherwise the source file stem, with
/// the chunk name appended when a file produced more than one chunk.
fn output_name(source: &Path, chunk: &str, named: bool, chunk_count: usize) -> String {
    if named {
        chunk.to_string()
    } else if chunk_count > 1 {
        format!("{}_{}", output_stem(source), chunk)
    } else {
        format!("{}_output", output_stem(source))
    }
}

/// Resolve `dir/<name>.json`, suffixing `_2`, `_3`, ... when an earlier
/// output of this run already took the path.
fn unique_output_path(dir: &Path, name: &str, used: &mut HashSet<PathBuf>) -> PathBuf {
    let mut path = output_path(dir, name);
    let mut n = 1;
    while !used.insert(path.clone()) {
        n += 1;
        path = output_path(dir, &format!("{name}_{n}"));
    }
    if n > 1 {
        warn!("Output name '{}' already used, writing {}", name, path.display());
    }
    path
}

/// Write one JSON file per filled template. Returns the number written.
async fn write_outputs(dir: &Path, parsed: &[Parsed], chunk_mode: bool) -> Result<usize> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut used = HashSet::new();
    let mut written = 0;
    for p in parsed {
        let chunk_count = p.document.batch.chunks.len();
        for filled in &p.document.templates {
            let chunk = p.document.chunk_of(filled);
            let named = chunk_mode && chunk.is_some_and(|c| c.named);
            let name = output_name(&p.source, &filled.name, named, chunk_count);
            let path = unique_output_path(dir, &name, &mut used);

            let file = OutputFile {
                source: p.source.display().to_string(),
                name: &filled.name,
                result: chunk.map(|c| &c.result),
                template: &filled.template,
            };
            let json = serde_json::to_string_pretty(&file).context("Failed to serialise output")?;

            // Atomic write: write to temp, then rename
            let tmp_path = path.with_extension("json.tmp");
            let write = async {
                tokio::fs::write(&tmp_path, json).await?;
                tokio::fs::rename(&tmp_path, &path).await
            };
            write.await.map_err(|source| McqError::OutputWriteFailed {
                path: path.clone(),
                source,
            })?;
            written += 1;
        }
    }
    Ok(written)
}

fn print_summary(parsed: &[Parsed]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for p in parsed {
        for chunk in &p.document.batch.chunks {
            let r = &chunk.result;
            let resolved = r.questions.len() - r.unresolved_indices.len();
            writeln!(
                out,
                "{}  {}: {} questions ({} with answer), {} slots filled",
                p.source.display(),
                chunk.name,
                r.questions.len(),
                resolved,
                chunk.slots_filled
            )?;
            for (i, q) in r.questions.iter().enumerate() {
                let first_line = q.stem.lines().next().unwrap_or("");
                writeln!(
                    out,
                    "  {:>3}. {}  [{} options, answer {}]",
                    i + 1,
                    first_line,
                    q.options.len(),
                    q.correct_option()
                        .map(|o| o.label.as_str())
                        .unwrap_or("?")
                )?;
            }
        }
    }
    Ok(())
}

/// Report unresolved questions (1-based line numbers), truncation and chunk errors.
fn print_warnings(parsed: &[Parsed]) {
    for p in parsed {
        for chunk in &p.document.batch.chunks {
            if let Some(ref e) = chunk.error {
                eprintln!("{} {}", red("✗"), e);
            }
            let r = &chunk.result;
            if !r.unresolved_indices.is_empty() {
                let lines: Vec<String> = r
                    .unresolved_indices
                    .iter()
                    .map(|i| (i + 1).to_string())
                    .collect();
                eprintln!(
                    "{} {} [{}]: no answer marked for questions at line(s) {}",
                    yellow("⚠"),
                    p.source.display(),
                    chunk.name,
                    lines.join(", ")
                );
            }
            if r.unconsumed_blocks > 0 {
                eprintln!(
                    "{} {} [{}]: {} question(s) did not fit and were skipped",
                    yellow("⚠"),
                    p.source.display(),
                    chunk.name,
                    r.unconsumed_blocks
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_size_flag() {
        assert_eq!(parse_template_size("50").unwrap(), TemplateSize::T50);
        assert!(parse_template_size("60").is_err());
        assert!(parse_template_size("lots").is_err());
    }

    #[test]
    fn output_names() {
        let src = Path::new("dir/bank.txt");
        assert_eq!(output_name(src, "doc1", true, 2), "doc1");
        assert_eq!(output_name(src, "output_1", false, 1), "bank_output");
        assert_eq!(output_name(src, "output_1", false, 3), "bank_output_1");
    }

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    /// Stem recorded in the parse result and the stem cell of the first table.
    fn stems(v: &serde_json::Value) -> (&str, &str) {
        (
            v["result"]["questions"][0]["stem"].as_str().unwrap(),
            v["template"]["tables"][0]["cells"][0][1].as_str().unwrap(),
        )
    }

    #[tokio::test]
    async fn repeated_chunk_names_get_their_own_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = ParseConfig::builder().chunk_mode(true).build().unwrap();
        let lines = ["---doc1---", "First?", "A. a@", "---doc1---", "Second?", "A. b@"];
        let parsed = vec![Parsed {
            source: PathBuf::from("bank.txt"),
            document: fill_tables(&lines, &config),
        }];

        let written = write_outputs(dir.path(), &parsed, true).await.unwrap();
        assert_eq!(written, 2);

        let first = read_json(&dir.path().join("doc1.json"));
        let second = read_json(&dir.path().join("doc1_2.json"));
        assert_eq!(stems(&first), ("First?", "First?"));
        assert_eq!(stems(&second), ("Second?", "Second?"));
    }

    #[tokio::test]
    async fn inputs_sharing_a_stem_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let config = ParseConfig::default();
        let parsed = vec![
            Parsed {
                source: PathBuf::from("a/q.txt"),
                document: fill_tables(&["Alpha?", "A. x@"], &config),
            },
            Parsed {
                source: PathBuf::from("b/q.txt"),
                document: fill_tables(&["Beta?", "A. y@"], &config),
            },
        ];

        let written = write_outputs(dir.path(), &parsed, false).await.unwrap();
        assert_eq!(written, 2);
        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 2);
        assert_eq!(stems(&read_json(&dir.path().join("q_output.json"))).0, "Alpha?");
        assert_eq!(stems(&read_json(&dir.path().join("q_output_2.json"))).0, "Beta?");
    }

    #[test]
    fn unique_paths_skip_taken_names() {
        let mut used = HashSet::new();
        let dir = Path::new("out");
        assert_eq!(unique_output_path(dir, "doc", &mut used), dir.join("doc.json"));
        assert_eq!(unique_output_path(dir, "doc_2", &mut used), dir.join("doc_2.json"));
        assert_eq!(unique_output_path(dir, "doc", &mut used), dir.join("doc_3.json"));
    }

    #[test]
    fn quiet_silences_summary_but_not_requested_output() {
        let parse = |args: &[&str]| {
            let mut argv = vec!["mcq2slots"];
            argv.extend_from_slice(args);
            Report::from_cli(&Cli::try_parse_from(argv).unwrap())
        };
        assert_eq!(parse(&["a.txt"]), Report::Summary);
        assert_eq!(parse(&["-q", "a.txt"]), Report::Silent);
        assert_eq!(parse(&["-q", "--json", "a.txt"]), Report::Json);
        assert_eq!(
            parse(&["-q", "-o", "out", "a.txt"]),
            Report::Files(PathBuf::from("out"))
        );
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "mcq2slots", "-t", "100", "--chunks", "--strip-marker", "--marker", "*", "a.txt",
        ])
        .unwrap();
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.effective_max_records(), Some(100));
        assert!(config.chunk_mode);
        assert_eq!(config.marker, '*');
        assert_eq!(config.marker_policy, MarkerPolicy::Strip);
    }
}
