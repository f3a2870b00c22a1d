//! Provider selection and the fallback chain.
//!
//! Hosted providers are tried one at a time in [`ProviderKind::PRIORITY`]
//! order. The first non-empty answer wins; any failure moves on to the next
//! provider, then to the local Ollama server.

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::io::{self, Write};
use std::sync::Arc;

use crate::config::Config;
use crate::output::{format_error, print_debug_section, write_report};
use crate::providers::{
    get_api_key_env_var, ExplanationResult, HttpTransport, LocalProvider, Provider,
    ProviderDescriptor, ProviderError, ProviderKind, RemoteProvider, Transport,
};

/// Fixed instruction describing the four-section answer format
pub const SYSTEM_PROMPT: &str = r#"You are a senior software debugging expert.
Analyze the error and respond ONLY in this format:

ROOT CAUSE:
WHY IT HAPPENED:
HOW TO FIX:
EXAMPLE FIX CODE:"#;

/// User half of the prompt
pub fn build_user_prompt(error_text: &str) -> String {
    format!("Error:\n{}", error_text)
}

/// How an analysis ended
#[derive(Debug)]
pub enum Outcome {
    /// A provider answered and the report was printed
    Explained(ExplanationResult),
    /// No hosted provider answered and the local server failed too
    LocalFailed(ProviderError),
    /// Hosted providers were configured but all failed, and local fallback is off
    Exhausted,
    /// No credentials and local fallback is off; nothing was sent
    NoCredentials,
}

/// Runs one error through the provider chain
pub struct Analyzer {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl Analyzer {
    /// Create an analyzer that talks HTTP
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hosted providers that have a credential, in priority order
    pub fn remote_providers(&self) -> Vec<RemoteProvider> {
        self.resolve_remote().0
    }

    /// Split the hosted providers into usable ones and the reasons the rest were skipped
    fn resolve_remote(&self) -> (Vec<RemoteProvider>, Vec<ProviderError>) {
        let mut usable = Vec::new();
        let mut skipped = Vec::new();

        for kind in ProviderKind::PRIORITY {
            let Some(descriptor) = self
                .config
                .models
                .for_provider(kind)
                .and_then(|model| ProviderDescriptor::remote(kind, model))
            else {
                continue;
            };

            match RemoteProvider::from_credentials(
                self.transport.clone(),
                descriptor,
                &self.config.credentials,
            ) {
                Ok(provider) => usable.push(provider),
                Err(err) => skipped.push(err),
            }
        }

        (usable, skipped)
    }

    /// Analyze `error_text`, writing status lines and the report to `out`
    pub async fn run<W: Write + ?Sized>(
        &self,
        error_text: &str,
        out: &mut W,
    ) -> io::Result<Outcome> {
        let user_prompt = build_user_prompt(error_text);
        let (remote, skipped) = self.resolve_remote();

        if self.config.debug {
            for err in &skipped {
                writeln!(out, "{} Skipping: {}", "·".dimmed(), err)?;
            }
        }

        for provider in &remote {
            writeln!(out, "{} Using {}", "▸".blue(), provider.name().bold())?;

            match provider.explain(SYSTEM_PROMPT, &user_prompt).await {
                Ok(result) => {
                    write_report(out, &result.raw_response)?;
                    return Ok(Outcome::Explained(result));
                }
                Err(err) => {
                    self.debug_dump(provider.name(), &err);
                    writeln!(
                        out,
                        "{} {} failed: {}, falling back...",
                        "!".yellow(),
                        provider.name(),
                        err
                    )?;
                }
            }
        }

        if !self.config.local.enabled {
            if remote.is_empty() {
                let env_vars = ProviderKind::PRIORITY
                    .map(get_api_key_env_var)
                    .join(", ");
                writeln!(
                    out,
                    "{}",
                    format_error(
                        "No API key found.",
                        Some(&format!("Set one of {}", env_vars))
                    )
                )?;
                return Ok(Outcome::NoCredentials);
            }
            writeln!(
                out,
                "{}",
                format_error("All configured providers failed.", None)
            )?;
            return Ok(Outcome::Exhausted);
        }

        self.run_local(&user_prompt, out).await
    }

    async fn run_local<W: Write + ?Sized>(
        &self,
        user_prompt: &str,
        out: &mut W,
    ) -> io::Result<Outcome> {
        let local = LocalProvider::new(self.transport.clone(), self.config.local.clone());
        writeln!(
            out,
            "{} No working cloud provider found, switching to {} ({})",
            "▸".blue(),
            local.name().bold(),
            local.model_name()
        )?;

        match local.explain(SYSTEM_PROMPT, user_prompt).await {
            Ok(result) => {
                write_report(out, &result.raw_response)?;
                Ok(Outcome::Explained(result))
            }
            Err(err) => {
                self.debug_dump(local.name(), &err);
                match &err {
                    ProviderError::Network(_) => writeln!(
                        out,
                        "{}",
                        format_error(
                            "Local provider unavailable: Ollama not running.",
                            Some(&local.install_hint())
                        )
                    )?,
                    ProviderError::EmptyResponse { .. } => writeln!(
                        out,
                        "{} {}",
                        "!".yellow(),
                        "Ollama returned an empty response".yellow()
                    )?,
                    ProviderError::InvalidResponse { body, .. } => {
                        writeln!(out, "{}", format_error("Failed to parse Ollama response", None))?;
                        writeln!(out, "{}", body)?;
                    }
                    other => writeln!(
                        out,
                        "{}",
                        format_error(&other.to_string(), Some(&local.install_hint()))
                    )?,
                }
                Ok(Outcome::LocalFailed(err))
            }
        }
    }

    fn debug_dump(&self, provider: &str, err: &ProviderError) {
        if !self.config.debug {
            return;
        }
        if let Some(body) = err.raw_body() {
            print_debug_section(
                &format!("{} response", provider),
                body,
                Some(format!("({} chars)", body.len())),
            );
        }
    }
}

/// Analyze an error with configuration from the environment, printing to stdout.
///
/// Blocks until the chain finishes. Never returns an error to the caller;
/// internal failures are printed to stderr.
pub fn analyze(error_text: &str) {
    let config = Config::from_env();
    let error_text = error_text.to_string();
    let task = move || run_blocking(config, &error_text);

    // block_on panics inside an existing runtime, so hop to a fresh thread there
    let result = if tokio::runtime::Handle::try_current().is_ok() {
        std::thread::spawn(task)
            .join()
            .unwrap_or_else(|_| Err(anyhow!("analyzer thread panicked")))
    } else {
        task()
    };

    if let Err(err) = result {
        eprintln!("{}", format_error(&format!("{err:#}"), None));
    }
}

fn run_blocking(config: Config, error_text: &str) -> Result<Outcome> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let analyzer = Analyzer::new(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    runtime
        .block_on(analyzer.run(error_text, &mut out))
        .context("Failed to write analysis")
}
