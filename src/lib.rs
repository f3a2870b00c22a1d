//! aierror - explain errors and panics with an LLM
//!
//! Hands an error message or panic payload to a hosted model (Gemini,
//! DeepSeek, OpenAI, in that order) or a local Ollama server, and prints
//! the model's four-section analysis to the terminal.
//!
//! ```no_run
//! aierror::init();
//! aierror::catch(|| {
//!     let v: Vec<u8> = Vec::new();
//!     v[3]
//! });
//! let _ = aierror::check(std::fs::read_to_string("missing.toml"));
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod hooks;
pub mod output;
pub mod providers;

// Re-export commonly used types
pub use analyzer::{analyze, Analyzer, Outcome};
pub use cli::Cli;
pub use config::Config;
pub use hooks::{catch, check, check_error, init, install_panic_hook};
pub use output::{print_report, Section};
pub use providers::{Credentials, ProviderError, ProviderKind};
