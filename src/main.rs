use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use checklist_engine::checklist::{self, ChecklistDefinition};
use checklist_engine::completion::{
    self, CompletionEvent, EventSink, LocalStore, LogEvents, SubmitError, Submitted,
};
use checklist_engine::config::{self, Config};
use checklist_engine::draft::{self, Draft};
use checklist_engine::output;
use checklist_engine::remote;
use checklist_engine::scoring::{self, CompletionResult};

const EXIT_SUCCESS: i32 = 0;
const EXIT_BLOCKED: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_INTEGRITY: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show item statuses, submission readiness and the score preview
    Evaluate {
        /// Checklist definition file, or checklist id on the configured remote
        checklist: String,
    },
    /// Record an answer for one item in the draft
    Answer {
        checklist: String,
        item_id: String,
        /// Answer value ("yes"/"no", a temperature, or text). Pass "" to clear it.
        value: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Gate, score and record the draft as a completion
    Submit {
        checklist: String,
        /// Notes for the completion as a whole
        #[arg(long)]
        notes: Option<String>,
        /// Keep the draft after a successful submission
        #[arg(long)]
        keep_draft: bool,
        /// Name recorded as the person completing the checklist
        #[arg(long)]
        user: Option<String>,
    },
    /// List locally stored completions
    List,
    /// Show a stored completion by id (or unique id prefix)
    Show { record_id: String },
    /// Attach a review to a stored completion
    Review {
        record_id: String,
        #[arg(long)]
        reviewer: String,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "checklist-engine")]
#[command(about = "Food-safety checklist scoring and submission", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/checklist-engine/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn exit_with(code: i32, message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(code);
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "checklist_engine=debug"
    } else {
        "checklist_engine=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn create_remote_client(remote_config: &config::RemoteConfig) -> remote::RemoteClient {
    match remote::create_client(remote_config, remote::get_token_from_env()) {
        Ok(client) => client,
        Err(e) => exit_with(EXIT_CONFIG, format!("Remote config error: {:#}", e)),
    }
}

/// Load a checklist from a file path, or fetch it by id from the remote
async fn resolve_checklist(arg: &str, config: &Config) -> ChecklistDefinition {
    let path = Path::new(arg);
    if path.exists() {
        return match checklist::load_checklist(path) {
            Ok(c) => c,
            Err(e) => exit_with(EXIT_CONFIG, format!("Checklist error: {:#}", e)),
        };
    }

    let Some(remote_config) = &config.remote else {
        exit_with(
            EXIT_CONFIG,
            format!(
                "No checklist file at '{}' and no remote configured to fetch it by id",
                arg
            ),
        );
    };

    let client = create_remote_client(remote_config);
    match remote::fetch_checklist_cached(&client, &remote::get_cache_path(), arg).await {
        Ok(c) => c,
        Err(e) => exit_with(EXIT_NETWORK, format!("Failed to fetch checklist '{}': {:#}", arg, e)),
    }
}

fn load_draft_or_exit(config: &Config, checklist: &ChecklistDefinition) -> (PathBuf, Draft) {
    let path = draft::draft_path(&config.drafts_dir(), &checklist.id);
    match draft::load_draft(&path, &checklist.id) {
        Ok(d) => (path, d),
        Err(e) => exit_with(EXIT_CONFIG, format!("Draft error: {:#}", e)),
    }
}

fn print_evaluation(checklist: &ChecklistDefinition, result: &CompletionResult, use_colors: bool) {
    if use_colors {
        println!("{}", checklist.name.bold());
    } else {
        println!("{}", checklist.name);
    }
    println!("{}", output::format_item_table(checklist, result, use_colors));
    println!();
    println!(
        "{}",
        output::format_score_line(result, checklist.passing_score(), use_colors)
    );
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.map(PathBuf::from);
    let config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => exit_with(EXIT_CONFIG, format!("Config error: {:#}", e)),
    };
    let use_colors = output::should_use_colors();

    match cli.command {
        Commands::Evaluate { checklist } => {
            let checklist = resolve_checklist(&checklist, &config).await;
            let (_, draft) = load_draft_or_exit(&config, &checklist);

            let result = match scoring::score_checklist(&checklist, &draft.responses) {
                Ok(r) => r,
                Err(e) => exit_with(EXIT_INTEGRITY, format!("Scoring error: {}", e)),
            };
            print_evaluation(&checklist, &result, use_colors);

            let gate = scoring::can_submit(&checklist.items, &draft.responses);
            println!("{}", output::format_gate(&gate, &checklist, use_colors));
        }
        Commands::Answer {
            checklist,
            item_id,
            value,
            notes,
        } => {
            let checklist = resolve_checklist(&checklist, &config).await;
            let Some(item) = checklist.item(&item_id) else {
                let known: Vec<_> = checklist.items.iter().map(|i| i.id.as_str()).collect();
                exit_with(
                    EXIT_CONFIG,
                    format!(
                        "Unknown item '{}'. Items in {}: {}",
                        item_id,
                        checklist.id,
                        known.join(", ")
                    ),
                );
            };

            let (path, mut draft) = load_draft_or_exit(&config, &checklist);
            draft.answer(&item.id, value.clone(), notes);
            if let Err(e) = draft::save_draft(&path, &draft) {
                exit_with(EXIT_CONFIG, format!("Failed to save draft: {:#}", e));
            }

            let status = scoring::evaluate(item, &value);
            println!(
                "{} {}  {}",
                output::format_status(status, use_colors),
                item.display_name(),
                value
            );
            println!(
                "{}/{} items answered",
                draft.answered(),
                checklist.items.len()
            );
        }
        Commands::Submit {
            checklist,
            notes,
            keep_draft,
            user,
        } => {
            let checklist = resolve_checklist(&checklist, &config).await;
            let (path, mut draft) = load_draft_or_exit(&config, &checklist);

            if notes.is_some() {
                draft.notes = notes;
                if let Err(e) = draft::save_draft(&path, &draft) {
                    exit_with(EXIT_CONFIG, format!("Failed to save draft: {:#}", e));
                }
            }

            let user = user
                .or_else(|| config.user.clone())
                .or_else(|| std::env::var("USER").ok());

            let outcome = match &config.remote {
                Some(remote_config) => {
                    let client = create_remote_client(remote_config);
                    completion::submit_completion(
                        &client,
                        &LogEvents,
                        &checklist,
                        &draft,
                        user.as_deref(),
                    )
                    .await
                }
                None => {
                    let store = LocalStore::new(config.store_path());
                    completion::submit_completion(
                        &store,
                        &LogEvents,
                        &checklist,
                        &draft,
                        user.as_deref(),
                    )
                    .await
                }
            };

            match outcome {
                Ok(Submitted {
                    record_id,
                    completion,
                }) => {
                    let result = CompletionResult {
                        items: completion.items,
                        score: completion.score,
                        overall_status: completion.overall_status,
                    };
                    print_evaluation(&checklist, &result, use_colors);
                    println!("Recorded completion {}", record_id);

                    if !keep_draft {
                        if let Err(e) = draft::discard_draft(&path) {
                            eprintln!("Warning: {:#}", e);
                        }
                    }
                }
                Err(SubmitError::Blocked { gate, .. }) => {
                    exit_with(
                        EXIT_BLOCKED,
                        output::format_gate(&gate, &checklist, use_colors),
                    );
                }
                Err(e @ SubmitError::Scoring(_)) => exit_with(EXIT_INTEGRITY, e),
                Err(e @ SubmitError::Transport(_)) => {
                    eprintln!("{}", e);
                    exit_with(
                        EXIT_NETWORK,
                        format!(
                            "Your answers are kept in {}. Run submit again to retry.",
                            path.display()
                        ),
                    );
                }
            }
        }
        Commands::List => {
            let store = LocalStore::new(config.store_path());
            let records = match store.list() {
                Ok(r) => r,
                Err(e) => exit_with(EXIT_CONFIG, format!("Store error: {:#}", e)),
            };
            if records.is_empty() {
                println!("No completions recorded.");
            }
            for record in records.iter().rev() {
                println!("{}", output::format_record_line(record, use_colors));
            }
        }
        Commands::Show { record_id } => {
            let store = LocalStore::new(config.store_path());
            match store.get(&record_id) {
                Ok(Some(record)) => {
                    println!("{}", output::format_record_detail(&record, use_colors))
                }
                Ok(None) => exit_with(
                    EXIT_CONFIG,
                    format!("No completion record matches '{}'", record_id),
                ),
                Err(e) => exit_with(EXIT_CONFIG, format!("Store error: {:#}", e)),
            }
        }
        Commands::Review {
            record_id,
            reviewer,
            notes,
        } => {
            let store = LocalStore::new(config.store_path());
            match store.attach_review(&record_id, &reviewer, notes) {
                Ok(record) => {
                    LogEvents.emit(&CompletionEvent::Reviewed {
                        record_id: record.id.clone(),
                        reviewer: reviewer.trim().to_string(),
                    });
                    println!("{}", output::format_record_detail(&record, use_colors));
                }
                Err(e) => exit_with(EXIT_CONFIG, format!("Review failed: {:#}", e)),
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
