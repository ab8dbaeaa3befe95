//! Insight CLI - Command-line interface for Nursery Insight
//!
//! Commands:
//! - observe: Record an observation for a child
//! - observations: List a child's observations (newest first)
//! - analyze: Run the analysis for one child and store the record
//! - history: List stored analyses for a child
//! - batch: Run the analysis for every child in the store
//! - summarize: Analyze observations from a file without touching the store
//! - doctor: Diagnose store health and configuration

use chrono::{DateTime, FixedOffset, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use nursery_insight::config::{InsightConfig, DEFAULT_STORE_PATH, STORE_ENV};
use nursery_insight::types::{AuthorType, INSUFFICIENT_DATA_MESSAGE};
use nursery_insight::{
    synthesize, AnalysisEngine, AnalysisError, AnalysisOutcome, ChildId, JsonFileStore, Locale,
    Observation, ObservationDraft, ObservationJournal, ObservationSource, INSIGHT_VERSION,
    PRODUCER_NAME,
};

/// Insight - Observation analysis engine for childcare coordination
#[derive(Parser)]
#[command(name = "insight")]
#[command(author = "Nursery Platform Team")]
#[command(version = INSIGHT_VERSION)]
#[command(about = "Analyze children's behavioral observations", long_about = None)]
struct Cli {
    /// Store file path (defaults to $NURSERY_INSIGHT_STORE, then .nursery/insight.json)
    #[arg(long, global = true)]
    store: Option<String>,

    /// Wording locale for summaries and suggestions (fr, en)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output format
    #[arg(long, global = true, default_value = "json-pretty")]
    output_format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an observation for a child
    Observe {
        /// Child identifier
        #[arg(long)]
        child: String,

        /// Kind of behavior (e.g. "émotion", "sommeil")
        #[arg(long)]
        category: String,

        /// Intensity from 1 to 5
        #[arg(long)]
        intensity: i32,

        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Free-text description
        #[arg(long)]
        description: Option<String>,

        /// Who wrote the observation
        #[arg(long, default_value = "parent")]
        author: AuthorArg,

        /// When the behavior occurred (RFC 3339, keeps its offset); defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// List a child's observations, newest first
    Observations {
        /// Child identifier
        #[arg(long)]
        child: String,
    },

    /// Run the analysis for one child and store the record
    Analyze {
        /// Child identifier
        #[arg(long)]
        child: String,

        /// End of the 30-day window (RFC 3339); defaults to now
        #[arg(long)]
        now: Option<String>,
    },

    /// List stored analyses for a child, newest first
    History {
        /// Child identifier
        #[arg(long)]
        child: String,
    },

    /// Run the analysis for every child in the store
    Batch {
        /// End of the 30-day window (RFC 3339); defaults to now
        #[arg(long)]
        now: Option<String>,
    },

    /// Analyze observations from a file without reading or writing the store
    Summarize {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,
    },

    /// Diagnose store health and configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one observation per line)
    Ndjson,
    /// JSON array of observations
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum AuthorArg {
    Parent,
    Animator,
}

impl From<AuthorArg> for AuthorType {
    fn from(value: AuthorArg) -> Self {
        match value {
            AuthorArg::Parent => AuthorType::Parent,
            AuthorArg::Animator => AuthorType::Animator,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), InsightCliError> {
    let config = InsightConfig::resolve(cli.store.as_deref(), cli.locale.as_deref())
        .map_err(InsightCliError::Config)?;
    let format = cli.output_format;

    match cli.command {
        Commands::Observe {
            child,
            category,
            intensity,
            tags,
            description,
            author,
            at,
        } => {
            let mut draft = ObservationDraft::new(ChildId::new(child), category, intensity)
                .with_author(author.into())
                .with_tags(tags);
            if let Some(description) = description {
                draft = draft.with_description(description);
            }
            if let Some(at) = at {
                draft = draft.observed_at(parse_timestamp(&at)?);
            }
            cmd_observe(&config, draft, &format)
        }

        Commands::Observations { child } => {
            cmd_observations(&config, &ChildId::new(child), &format)
        }

        Commands::Analyze { child, now } => {
            let now = parse_now(now.as_deref())?;
            cmd_analyze(&config, &ChildId::new(child), now, &format)
        }

        Commands::History { child } => cmd_history(&config, &ChildId::new(child), &format),

        Commands::Batch { now } => {
            let now = parse_now(now.as_deref())?;
            cmd_batch(&config, now, &format)
        }

        Commands::Summarize {
            input,
            input_format,
        } => cmd_summarize(&input, input_format, config.locale, &format),

        Commands::Doctor { json } => cmd_doctor(&config, json),
    }
}

fn cmd_observe(
    config: &InsightConfig,
    draft: ObservationDraft,
    format: &OutputFormat,
) -> Result<(), InsightCliError> {
    let store = JsonFileStore::open(&config.store_path);
    let observation = ObservationJournal::new(&store).record_observation(draft)?;
    print_output(&observation, format)
}

fn cmd_observations(
    config: &InsightConfig,
    child: &ChildId,
    format: &OutputFormat,
) -> Result<(), InsightCliError> {
    let store = JsonFileStore::open(&config.store_path);
    let observations = ObservationJournal::new(&store).observations_for_child(child)?;
    print_output(&observations, format)
}

fn cmd_analyze(
    config: &InsightConfig,
    child: &ChildId,
    now: DateTime<Utc>,
    format: &OutputFormat,
) -> Result<(), InsightCliError> {
    let store = JsonFileStore::open(&config.store_path);
    let engine = AnalysisEngine::new(&store, &store).with_locale(config.locale);
    let outcome = engine.run_at(child, now)?;
    print_output(&outcome, format)
}

fn cmd_history(
    config: &InsightConfig,
    child: &ChildId,
    format: &OutputFormat,
) -> Result<(), InsightCliError> {
    let store = JsonFileStore::open(&config.store_path);
    let engine = AnalysisEngine::new(&store, &store);
    let history = engine.analytics_history(child)?;
    print_output(&history, format)
}

fn cmd_batch(
    config: &InsightConfig,
    now: DateTime<Utc>,
    format: &OutputFormat,
) -> Result<(), InsightCliError> {
    let store = JsonFileStore::open(&config.store_path);
    let engine = AnalysisEngine::new(&store, &store).with_locale(config.locale);
    let entries = engine.run_all(now)?;

    let mut failed = 0usize;
    let report: Vec<BatchReportEntry> = entries
        .into_iter()
        .map(|entry| match entry.result {
            Ok(outcome) => BatchReportEntry {
                child_id: entry.child_id.to_string(),
                outcome: Some(outcome),
                error: None,
            },
            Err(e) => {
                failed += 1;
                BatchReportEntry {
                    child_id: entry.child_id.to_string(),
                    outcome: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    print_output(&report, format)?;

    if failed > 0 {
        Err(InsightCliError::BatchFailed(failed))
    } else {
        Ok(())
    }
}

fn cmd_summarize(
    input: &Path,
    input_format: InputFormat,
    locale: Locale,
    format: &OutputFormat,
) -> Result<(), InsightCliError> {
    // Read input
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    // Parse observations
    let mut observations: Vec<Observation> = match input_format {
        InputFormat::Ndjson => input_data
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?,
        InputFormat::Json => serde_json::from_str(&input_data)?,
    };
    observations.sort_by_key(|o| o.observed_at);

    let outcome = match synthesize(&observations, locale) {
        Some(synthesis) => SummarizeReport::Completed { synthesis },
        None => SummarizeReport::InsufficientData {
            message: INSUFFICIENT_DATA_MESSAGE.to_string(),
        },
    };

    print_output(&outcome, format)
}

fn cmd_doctor(config: &InsightConfig, json: bool) -> Result<(), InsightCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "insight_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Insight version {}", INSIGHT_VERSION),
    });

    let source = if std::env::var(STORE_ENV).is_ok() {
        format!("from ${STORE_ENV}")
    } else if config.store_path == Path::new(DEFAULT_STORE_PATH) {
        "default".to_string()
    } else {
        "from --store".to_string()
    };
    checks.push(DoctorCheck {
        name: "store_path".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} ({})", config.store_path.display(), source),
    });

    // Check the store file itself
    let store = JsonFileStore::open(&config.store_path);
    if config.store_path.exists() {
        match store.load() {
            Ok(snapshot) => {
                let children = store.child_ids().map(|c| c.len()).unwrap_or(0);
                checks.push(DoctorCheck {
                    name: "store".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Store valid ({} observations, {} children, {} analyses)",
                        snapshot.observations.len(),
                        children,
                        snapshot.analytics.len()
                    ),
                });
            }
            Err(e) => {
                checks.push(DoctorCheck {
                    name: "store".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read store: {}", e),
                });
            }
        }
    } else {
        checks.push(DoctorCheck {
            name: "store".to_string(),
            status: CheckStatus::Warning,
            message: "Store file does not exist yet (created on first write)".to_string(),
        });
    }

    checks.push(DoctorCheck {
        name: "locale".to_string(),
        status: CheckStatus::Ok,
        message: format!("{:?}", config.locale).to_lowercase(),
    });

    // Check stdin is available (for summarize -)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (summarize -i - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: INSIGHT_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Insight Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(InsightCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn print_output<T: Serialize>(value: &T, format: &OutputFormat) -> Result<(), InsightCliError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    };
    println!("{}", rendered);
    Ok(())
}

fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, InsightCliError> {
    DateTime::parse_from_rfc3339(raw)
        .map_err(|e| InsightCliError::InvalidTimestamp(format!("{raw}: {e}")))
}

fn parse_now(raw: Option<&str>) -> Result<DateTime<Utc>, InsightCliError> {
    match raw {
        Some(raw) => Ok(parse_timestamp(raw)?.with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

#[derive(Debug)]
enum InsightCliError {
    Io(io::Error),
    Analysis(AnalysisError),
    Json(serde_json::Error),
    Config(String),
    InvalidTimestamp(String),
    BatchFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for InsightCliError {
    fn from(e: io::Error) -> Self {
        InsightCliError::Io(e)
    }
}

impl From<AnalysisError> for InsightCliError {
    fn from(e: AnalysisError) -> Self {
        InsightCliError::Analysis(e)
    }
}

impl From<serde_json::Error> for InsightCliError {
    fn from(e: serde_json::Error) -> Self {
        InsightCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<InsightCliError> for CliError {
    fn from(e: InsightCliError) -> Self {
        match e {
            InsightCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            InsightCliError::Analysis(e) => {
                let (code, hint) = match &e {
                    AnalysisError::Load(_) | AnalysisError::History(_) => {
                        ("LOAD_FAILED", "Check that the store file is readable")
                    }
                    AnalysisError::Persist(_) | AnalysisError::Record(_) => {
                        ("PERSIST_FAILED", "Check that the store file is writable")
                    }
                    AnalysisError::InvalidObservation(_) => (
                        "INVALID_OBSERVATION",
                        "Category must be set and intensity between 1 and 5",
                    ),
                    AnalysisError::JsonError(_) => ("JSON_ERROR", "Check JSON syntax"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            InsightCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            InsightCliError::Config(msg) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Supported locales: fr, en".to_string()),
            },
            InsightCliError::InvalidTimestamp(msg) => CliError {
                code: "INVALID_TIMESTAMP".to_string(),
                message: msg,
                hint: Some("Use RFC 3339, e.g. 2024-03-10T14:05:00+01:00".to_string()),
            },
            InsightCliError::BatchFailed(count) => CliError {
                code: "BATCH_FAILED".to_string(),
                message: format!("{} analyses failed", count),
                hint: Some("Review the batch report for details".to_string()),
            },
            InsightCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct BatchReportEntry {
    child_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<AnalysisOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum SummarizeReport {
    InsufficientData {
        message: String,
    },
    Completed {
        synthesis: nursery_insight::Synthesis,
    },
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
