use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use counsel_rank::config::Config;
use counsel_rank::llm::{ChatBackend, LlmError};
use counsel_rank::output;
use counsel_rank::roster::{self, Firm};
use counsel_rank::scoring::{self, ScoringConfig, Weights};

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_RATE_LIMIT: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_DATA: i32 = 5;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank law firms for a claim or a cluster/jurisdiction pair
    Recommend {
        /// Claim row (0-based) from the claims dataset
        #[arg(long, conflicts_with_all = ["cluster", "jurisdiction"])]
        claim: Option<usize>,

        /// Litigation cluster to draw firms from
        #[arg(long, requires = "jurisdiction")]
        cluster: Option<String>,

        /// State code the firm must serve (e.g. TX)
        #[arg(long, requires = "cluster")]
        jurisdiction: Option<String>,

        /// Weight for (scale - cycle time)
        #[arg(long)]
        cycle_weight: Option<f64>,

        /// Weight for win rate
        #[arg(long)]
        win_weight: Option<f64>,

        /// Weight for (scale - cost per case)
        #[arg(long)]
        cost_weight: Option<f64>,

        /// Number of firms to show
        #[arg(long)]
        top_k: Option<usize>,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show cluster averages for a claim's cluster or a named cluster
    Summary {
        #[arg(long, conflicts_with = "cluster")]
        claim: Option<usize>,

        #[arg(long)]
        cluster: Option<String>,
    },
    /// List the claims most similar to a claim id
    Similar {
        claim_id: String,

        #[arg(long)]
        json: bool,
    },
    /// Summarize exhibit files (.txt, .md, .png, .jpg) with the LLM
    Exhibit {
        /// Files or glob patterns
        #[arg(required = true)]
        paths: Vec<String>,

        /// Exhibits processed at once (overrides llm.concurrency)
        #[arg(long)]
        concurrency: Option<usize>,

        #[arg(long)]
        json: bool,
    },
    /// Flag litigation indicators in claim notes
    Flags {
        /// Claim id from the similarity dataset, whose notes are used
        #[arg(long, conflicts_with = "notes_file", required_unless_present = "notes_file")]
        claim_id: Option<String>,

        /// Plain-text file of claim notes
        #[arg(long)]
        notes_file: Option<PathBuf>,
    },
    /// Write a starter config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "counsel-rank")]
#[command(about = "Litigation firm recommendation and claim triage CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/counsel-rank/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Bypass the LLM response cache
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

/// An error paired with the process exit code it maps to
struct Failure {
    code: i32,
    error: anyhow::Error,
}

impl Failure {
    fn new(code: i32, error: impl Into<anyhow::Error>) -> Self {
        Self {
            code,
            error: error.into(),
        }
    }

    fn msg(code: i32, message: impl std::fmt::Display) -> Self {
        Self::new(code, anyhow::anyhow!("{}", message))
    }
}

impl From<LlmError> for Failure {
    fn from(e: LlmError) -> Self {
        let code = match &e {
            LlmError::MissingApiKey | LlmError::Auth { .. } => EXIT_AUTH,
            LlmError::RateLimited => EXIT_RATE_LIMIT,
            LlmError::Io { .. } => EXIT_CONFIG,
            _ => EXIT_NETWORK,
        };
        Failure::new(code, e)
    }
}

trait OrExit<T> {
    fn or_exit(self, code: i32) -> Result<T, Failure>;
}

impl<T> OrExit<T> for anyhow::Result<T> {
    fn or_exit(self, code: i32) -> Result<T, Failure> {
        self.map_err(|e| Failure::new(code, e))
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "counsel_rank=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // OPENAI_API_KEY may live in .env
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let start_time = Instant::now();

    let code = match run(cli).await {
        Ok(()) => EXIT_SUCCESS,
        Err(failure) => {
            eprintln!("Error: {:#}", failure.error);
            failure.code
        }
    };

    tracing::debug!(elapsed = ?start_time.elapsed(), code, "done");
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), Failure> {
    let config_path = cli.config.map(PathBuf::from);

    // Init runs before any config exists
    let command = match cli.command {
        Commands::Init { force } => return init(config_path, force),
        command => command,
    };

    let config = counsel_rank::config::load_config(config_path).or_exit(EXIT_CONFIG)?;

    // Validate scoring config at startup
    let scoring_config = config.scoring();
    check_scoring(&scoring_config)?;

    let use_colors = output::should_use_colors();

    match command {
        Commands::Recommend {
            claim,
            cluster,
            jurisdiction,
            cycle_weight,
            win_weight,
            cost_weight,
            top_k,
            format,
        } => {
            let base = scoring_config.effective_weights();
            let effective = ScoringConfig {
                weights: Some(Weights::new(
                    cycle_weight.unwrap_or(base.cycle_time),
                    win_weight.unwrap_or(base.win_rate),
                    cost_weight.unwrap_or(base.cost),
                )),
                inversion_scale: Some(scoring_config.effective_scale()),
                top_k: Some(top_k.unwrap_or_else(|| scoring_config.effective_top_k())),
            };
            check_scoring(&effective)?;

            let firms = load_firms(&config)?;
            let weights = effective.effective_weights();
            let scale = effective.effective_scale();
            for warning in scoring::range_warnings(&firms, &weights, scale) {
                tracing::warn!("{}", warning);
            }

            let (claim_record, cluster_id, state) = match claim {
                Some(index) => {
                    let claims = roster::load_claims(&config.data.claims_path()).or_exit(EXIT_DATA)?;
                    let found = roster::find_claim(&claims, index).cloned().ok_or_else(|| {
                        Failure::msg(
                            EXIT_CONFIG,
                            format!("Claim {} not found (dataset has {} claims)", index, claims.len()),
                        )
                    })?;
                    let cluster_id = found.cluster.clone();
                    let state = found.jurisdiction.clone();
                    (Some(found), cluster_id, state)
                }
                None => match (cluster, jurisdiction) {
                    (Some(c), Some(j)) => (None, c, j),
                    _ => {
                        return Err(Failure::msg(
                            EXIT_CONFIG,
                            "Pass --claim N, or both --cluster and --jurisdiction",
                        ))
                    }
                },
            };

            let recs = scoring::recommend_firms_with_scale(
                &firms,
                &cluster_id,
                &state,
                &weights,
                effective.effective_top_k(),
                scale,
            );

            match format {
                OutputFormat::Json => {
                    println!("{}", output::format_json(&recs).or_exit(EXIT_DATA)?);
                }
                OutputFormat::Tsv => {
                    let tsv = output::format_tsv(&recs);
                    if !tsv.is_empty() {
                        println!("{}", tsv);
                    }
                }
                OutputFormat::Table => {
                    if let Some(c) = &claim_record {
                        println!("{}", output::format_claim_header(c, use_colors));
                        println!();
                    }
                    if cli.verbose && !recs.is_empty() {
                        for rec in &recs {
                            println!("{}", output::format_recommendation_detail(rec, use_colors));
                            println!();
                        }
                    } else {
                        println!("{}", output::format_recommendation_table(&recs, use_colors));
                    }
                }
            }
        }
        Commands::Summary { claim, cluster } => {
            let firms = load_firms(&config)?;
            let cluster_id = match (claim, cluster) {
                (Some(index), _) => {
                    let claims = roster::load_claims(&config.data.claims_path()).or_exit(EXIT_DATA)?;
                    roster::find_claim(&claims, index)
                        .map(|c| c.cluster.clone())
                        .ok_or_else(|| Failure::msg(EXIT_CONFIG, format!("Claim {} not found", index)))?
                }
                (None, Some(c)) => c,
                (None, None) => {
                    return Err(Failure::msg(EXIT_CONFIG, "Pass --claim N or --cluster NAME"))
                }
            };

            let summary = scoring::cluster_summary(&firms, &cluster_id);
            println!(
                "{}",
                output::format_cluster_card(&cluster_id, summary.as_ref(), use_colors)
            );
        }
        Commands::Similar { claim_id, json } => {
            let records =
                roster::load_similarity(&config.data.similarity_path()).or_exit(EXIT_DATA)?;
            if !records.iter().any(|r| r.claim_id == claim_id.trim()) {
                return Err(Failure::msg(
                    EXIT_CONFIG,
                    format!("Claim {} not found in similarity dataset", claim_id.trim()),
                ));
            }

            let matches = counsel_rank::similar::similar_claims(&records, &claim_id).or_exit(EXIT_DATA)?;
            if json {
                println!("{}", output::format_json(&matches).or_exit(EXIT_DATA)?);
            } else {
                println!("{}", output::format_similar_claims(claim_id.trim(), &matches, use_colors));
            }
        }
        Commands::Exhibit {
            paths,
            concurrency,
            json,
        } => {
            let files = expand_paths(&paths)?;
            let (backend, settings) = build_backend(&config, cli.no_cache)?;
            let limit = concurrency.unwrap_or(settings.concurrency);

            let results =
                counsel_rank::llm::summarize_exhibits(backend.as_ref(), &settings, &files, limit).await;

            if json {
                let entries: Vec<serde_json::Value> = results
                    .iter()
                    .map(|(path, result)| match result {
                        Ok(report) => serde_json::to_value(report).unwrap_or_default(),
                        Err(e) => serde_json::json!({
                            "path": path,
                            "status": "error",
                            "error": e.to_string(),
                        }),
                    })
                    .collect();
                println!("{}", output::format_json(&entries).or_exit(EXIT_DATA)?);
            } else {
                let blocks: Vec<String> = results
                    .iter()
                    .map(|(path, result)| output::format_exhibit_report(path, result, use_colors))
                    .collect();
                println!("{}", blocks.join("\n\n"));
            }

            // Partial failure is fine; all-failed is not
            if results.iter().all(|(_, r)| r.is_err()) {
                if let Some((_, Err(e))) = results.into_iter().next() {
                    return Err(Failure::from(e));
                }
            }
        }
        Commands::Flags {
            claim_id,
            notes_file,
        } => {
            let notes = match (claim_id, notes_file) {
                (Some(id), _) => {
                    let records =
                        roster::load_similarity(&config.data.similarity_path()).or_exit(EXIT_DATA)?;
                    records
                        .into_iter()
                        .find(|r| r.claim_id == id.trim())
                        .map(|r| r.notes)
                        .ok_or_else(|| {
                            Failure::msg(EXIT_CONFIG, format!("Claim {} not found in similarity dataset", id.trim()))
                        })?
                }
                (None, Some(path)) => std::fs::read_to_string(&path).map_err(|e| {
                    Failure::msg(EXIT_CONFIG, format!("Failed to read {}: {}", path.display(), e))
                })?,
                (None, None) => {
                    return Err(Failure::msg(EXIT_CONFIG, "Pass --claim-id ID or --notes-file FILE"))
                }
            };

            if notes.trim().is_empty() {
                return Err(Failure::msg(EXIT_CONFIG, "Claim notes are empty"));
            }

            let (backend, settings) = build_backend(&config, cli.no_cache)?;
            let flags =
                counsel_rank::llm::flag_litigation_indicators(backend.as_ref(), &settings, &notes).await?;
            println!("{}", flags);
        }
        // Handled before the config is loaded
        Commands::Init { .. } => {}
    }

    Ok(())
}

fn init(path: Option<PathBuf>, force: bool) -> Result<(), Failure> {
    let path = match path {
        Some(p) => p,
        None => counsel_rank::config::get_config_path().or_exit(EXIT_CONFIG)?,
    };
    counsel_rank::config::write_default_config(&path, force).or_exit(EXIT_CONFIG)?;
    println!("Config written to {}", path.display());
    Ok(())
}

fn check_scoring(config: &ScoringConfig) -> Result<(), Failure> {
    if let Err(errors) = scoring::validate_scoring(config) {
        let listed: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
        return Err(Failure::msg(
            EXIT_CONFIG,
            format!("Scoring config errors:\n{}", listed.join("\n")),
        ));
    }
    Ok(())
}

fn load_firms(config: &Config) -> Result<Vec<Firm>, Failure> {
    roster::load_firms(&config.data.firms_path()).or_exit(EXIT_DATA)
}

/// Expand glob patterns; plain paths pass through as given
fn expand_paths(patterns: &[String]) -> Result<Vec<PathBuf>, Failure> {
    let mut files = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            files.push(PathBuf::from(pattern));
            continue;
        }

        let matches = glob::glob(pattern)
            .map_err(|e| Failure::msg(EXIT_CONFIG, format!("Bad pattern '{}': {}", pattern, e)))?;
        let before = files.len();
        for entry in matches {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "skipping unreadable path"),
            }
        }
        if files.len() == before {
            tracing::warn!(pattern = %pattern, "pattern matched no files");
        }
    }

    if files.is_empty() {
        return Err(Failure::msg(EXIT_CONFIG, "No exhibit files matched"));
    }
    Ok(files)
}

fn build_backend(
    config: &Config,
    no_cache: bool,
) -> Result<(Box<dyn ChatBackend>, counsel_rank::llm::LlmSettings), Failure> {
    let api_key = counsel_rank::llm::api_key_from_env().unwrap_or_default();
    let settings =
        counsel_rank::llm::LlmSettings::from_config(&config.llm(), api_key).or_exit(EXIT_CONFIG)?;
    tracing::debug!(?settings, "LLM settings");

    let client = counsel_rank::llm::OpenAiClient::new(settings.clone())?;
    let backend: Box<dyn ChatBackend> = if no_cache {
        tracing::debug!("Cache: disabled (--no-cache)");
        Box::new(client)
    } else {
        let path = counsel_rank::llm::get_cache_path();
        tracing::debug!(path = %path.display(), "Cache: enabled");
        Box::new(counsel_rank::llm::CachedBackend::new(client, path))
    };

    Ok((backend, settings))
}
