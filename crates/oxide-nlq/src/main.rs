//! oxide-nlq CLI
//!
//! Command-line front end for asking a database questions in natural language.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use oxide_nlq::model::read_saved_response;
use oxide_nlq::prelude::*;
use oxide_nlq::sample;
use oxide_nlq_core::{Extractor, SchemaDescription};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// Natural language questions over SQLite through a local model.
#[derive(Parser)]
#[command(name = "oxide-nlq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = oxide_nlq::config::DEFAULT_DATABASE_URL)]
    database: String,

    /// Ollama server URL.
    #[arg(long, env = "OLLAMA_URL", default_value = oxide_nlq::model::DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    /// Model used to generate SQL.
    #[arg(short, long, env = "OLLAMA_MODEL", default_value = oxide_nlq::model::DEFAULT_MODEL)]
    model: String,

    /// JSON file with additional ambiguity rules.
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Qualify columns by line-level substring replacement.
    #[arg(long)]
    legacy_substring: bool,

    /// Do not derive ambiguity rules from foreign keys.
    #[arg(long)]
    no_derive_rules: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the sample company database if the database is empty.
    Init,

    /// Print the database schema.
    Schema,

    /// Print example questions for the sample database.
    Examples,

    /// Answer a single question.
    Ask {
        /// The question, in plain language.
        question: String,
    },

    /// Answer questions read from standard input, one per line.
    Shell,

    /// Extract and normalize SQL from a saved model response.
    Extract {
        /// File holding the response (standard input if not specified).
        file: Option<PathBuf>,
    },
}

impl Cli {
    fn config(&self) -> AssistantConfig {
        AssistantConfig {
            database_url: self.database.clone(),
            ollama_url: self.ollama_url.clone(),
            model: self.model.clone(),
            rules_path: self.rules.clone(),
            legacy_substring: self.legacy_substring,
            derive_rules: !self.no_derive_rules,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.config();

    match cli.command {
        Commands::Init => {
            let store = Store::connect(&config.database_url).await?;
            if store.bootstrap_sample().await? {
                info!("Sample database created.");
            } else {
                info!("Database already has tables; nothing to do.");
            }
        }

        Commands::Schema => {
            let store = Store::connect(&config.database_url).await?;
            store.bootstrap_sample().await?;
            print!("{}", store.describe().await?.display_text());
        }

        Commands::Examples => {
            print!("{}", sample::examples_text());
        }

        Commands::Ask { question } => {
            let assistant = Assistant::connect(&config).await?;
            assistant.model().check_model().await;

            let answer = assistant.ask(&question).await?;
            print_answer(&answer);
        }

        Commands::Shell => {
            let assistant = Arc::new(Assistant::connect(&config).await?);
            assistant.model().check_model().await;
            run_shell(assistant).await?;
        }

        Commands::Extract { file } => {
            let raw = read_saved_response(file.as_deref()).await?;

            let normalizer = config.build_normalizer(&SchemaDescription::default())?;
            let candidate = Extractor::default()
                .extract(&raw)
                .map_err(AssistantError::from)?;
            println!("{}", normalizer.normalize(&candidate.sql));
        }
    }

    Ok(())
}

async fn run_shell(assistant: Arc<Assistant<OllamaClient>>) -> anyhow::Result<()> {
    println!("{}", sample::examples_text());
    println!("Type a question, or 'quit' to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.eq_ignore_ascii_case("quit") || question.eq_ignore_ascii_case("exit") {
            break;
        }

        match Arc::clone(&assistant).submit_and_wait(question).await {
            Ok(answer) => print_answer(&answer),
            Err(e) => eprintln!("{e}"),
        }
    }

    Ok(())
}

fn print_answer(answer: &Answer) {
    println!("\nGenerated SQL:\n{}\n", answer.sql);
    println!("{}\n", answer.render());
}
