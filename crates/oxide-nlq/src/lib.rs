//! Ask a SQLite database questions in natural language.
//!
//! `oxide-nlq` wires the pure pipeline of [`oxide_nlq_core`] to its
//! collaborators:
//!
//! - **Model** - a [`model::ModelService`] that turns a prompt into text,
//!   with an Ollama implementation
//! - **Store** - a SQLite database that is introspected for the prompt and
//!   runs the generated SQL
//! - **Assistant** - prompt, generate, extract, normalize, execute; one
//!   question in flight at a time
//! - **Render** - plain-text result tables and execution errors
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_nlq::prelude::*;
//!
//! let assistant = Assistant::connect(&AssistantConfig::default()).await?;
//! let answer = assistant.ask("Top 5 Customers by Total Purchase Amount").await?;
//! println!("{}\n\n{}", answer.sql, answer.render());
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Create the sample database
//! oxide-nlq init
//!
//! # Ask one question
//! oxide-nlq ask "Employees with Above-Average Salaries"
//!
//! # Clean up a saved model response without a model or database
//! oxide-nlq extract response.txt
//! ```

pub mod assistant;
pub mod config;
pub mod error;
pub mod model;
pub mod render;
pub mod sample;
pub mod store;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::assistant::{Answer, Assistant, Outcome};
    pub use crate::config::{AssistantConfig, load_rules};
    pub use crate::error::{AssistantError, Result};
    pub use crate::model::{ModelService, OllamaClient};
    pub use crate::render::{QueryResult, render_execution_error, render_table};
    pub use crate::store::Store;
}
