//! Question answering: prompt, generate, extract, normalize, execute.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use oxide_nlq_core::{Extractor, Normalizer, PromptBuilder};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::AssistantConfig;
use crate::error::{AssistantError, Result};
use crate::model::{ModelService, OllamaClient};
use crate::render::{QueryResult, render_execution_error, render_table};
use crate::store::Store;

/// What happened when the generated SQL was executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The statement ran and returned these rows.
    Rows(QueryResult),
    /// The database rejected the statement.
    ExecutionFailed {
        /// Database error message.
        message: String,
    },
}

/// The answer to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// The normalized SQL that was executed.
    pub sql: String,
    /// Execution result.
    pub outcome: Outcome,
}

impl Answer {
    /// Renders the result table, or the error together with the attempted SQL.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.outcome {
            Outcome::Rows(result) => render_table(result),
            Outcome::ExecutionFailed { message } => render_execution_error(message, &self.sql),
        }
    }

    /// Returns true if the statement executed.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Rows(_))
    }
}

/// Releases the in-flight slot when dropped.
struct SlotGuard(Arc<AtomicBool>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Answers natural language questions against a database.
#[derive(Debug)]
pub struct Assistant<M> {
    model: M,
    store: Store,
    prompt: PromptBuilder,
    extractor: Extractor,
    normalizer: Normalizer,
    busy: Arc<AtomicBool>,
}

impl Assistant<OllamaClient> {
    /// Connects to the configured database and model server.
    ///
    /// Creates the sample database if the database has no tables and builds
    /// the ambiguity rules from the resulting schema.
    pub async fn connect(config: &AssistantConfig) -> Result<Self> {
        let store = Store::connect(&config.database_url).await?;
        store.bootstrap_sample().await?;
        let schema = store.describe().await?;
        let normalizer = config.build_normalizer(&schema)?;
        let model = OllamaClient::new(&config.ollama_url, &config.model);
        Ok(Self::new(model, store, normalizer))
    }
}

impl<M: ModelService> Assistant<M> {
    /// Creates an assistant with the default prompt and extractor.
    pub fn new(model: M, store: Store, normalizer: Normalizer) -> Self {
        Self {
            model,
            store,
            prompt: PromptBuilder::default(),
            extractor: Extractor::default(),
            normalizer,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replaces the extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replaces the prompt builder.
    #[must_use]
    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    /// The model service.
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// The database.
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// The normalizer applied to extracted SQL.
    pub const fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Returns true while a submitted question is being answered.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Asks the model for SQL answering `question` and cleans it up.
    ///
    /// A response with no SQL in it fails with
    /// [`AssistantError::NoSqlGenerated`] before normalization.
    pub async fn generate_sql(&self, question: &str) -> Result<String> {
        let schema = self.store.describe().await?;
        let prompt = self.prompt.build(&schema, question);

        info!(model = %self.model.name(), "Generating SQL with local LLM...");
        let raw = self.model.generate(&prompt).await?;
        debug!(raw_len = raw.len(), "Received model response");

        let candidate = self.extractor.extract(&raw).map_err(|e| {
            warn!("No SQL found in model response");
            AssistantError::from(e)
        })?;

        let sql = self.normalizer.normalize(&candidate.sql);
        if sql != candidate.sql {
            debug!(before = %candidate.sql, after = %sql, "Qualified ambiguous columns");
        }
        info!("SQL extracted successfully");
        Ok(sql)
    }

    /// Generates SQL for `question` and executes it.
    ///
    /// Execution errors are part of the [`Answer`]; only failures before
    /// execution are returned as errors.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }

        let sql = self.generate_sql(question).await?;
        let outcome = match self.store.run(&sql).await {
            Ok(result) => {
                info!(rows = result.rows.len(), "Query executed successfully");
                Outcome::Rows(result)
            }
            Err(e) => {
                warn!(error = %e, "SQL execution failed");
                Outcome::ExecutionFailed {
                    message: e.to_string(),
                }
            }
        };

        Ok(Answer { sql, outcome })
    }
}

impl<M: ModelService + 'static> Assistant<M> {
    /// Answers `question` on a background task.
    ///
    /// Only one question is answered at a time: while a submitted question
    /// is outstanding, further submissions fail with [`AssistantError::Busy`].
    /// The slot is freed when the task ends, whatever its result.
    pub fn submit(self: Arc<Self>, question: impl Into<String>) -> Result<JoinHandle<Result<Answer>>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Rejecting question, another one is in flight");
            return Err(AssistantError::Busy);
        }

        let guard = SlotGuard(Arc::clone(&self.busy));
        let question = question.into();
        Ok(tokio::spawn(async move {
            let _guard = guard;
            self.ask(&question).await
        }))
    }

    /// Submits `question` and waits for its answer.
    ///
    /// A task that panicked or was aborted is reported as
    /// [`AssistantError::Task`].
    pub async fn submit_and_wait(self: Arc<Self>, question: impl Into<String>) -> Result<Answer> {
        self.submit(question)?.await?
    }
}
