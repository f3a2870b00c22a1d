use aierror::config::print_default_config;
use aierror::providers::list_providers;
use aierror::{Analyzer, Cli, Config};
use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io::{self, BufRead, IsTerminal};

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "aierror", &mut io::stdout());
}

fn print_providers(config: &Config) {
    println!("{}", "Providers".bold());
    println!();
    for (kind, description, available) in
        list_providers(&config.credentials, config.local.enabled)
    {
        let status = if available {
            "ready".green().bold()
        } else {
            "not configured".dimmed()
        };
        println!("  {:<10} {:<24} {}", kind.to_string(), description, status);
    }
    println!();
}

fn get_input(cli: &Cli) -> Result<String> {
    // If error args provided, use them
    if !cli.error.is_empty() {
        return Ok(cli.error.join(" "));
    }

    // Otherwise read from stdin if piped
    if !io::stdin().is_terminal() {
        let stdin = io::stdin();
        let mut input = String::new();
        for line in stdin.lock().lines() {
            input.push_str(&line.context("Failed to read stdin")?);
            input.push('\n');
        }
        let trimmed = input.trim().to_string();
        if !trimmed.is_empty() {
            return Ok(trimmed);
        }
    }

    let message = format!(
        "{} {}\n{} {}",
        "Error:".red().bold(),
        "No input provided. Usage: aierror <error message>",
        "Tip:".blue().bold(),
        "Use 2>&1 to capture stderr: command 2>&1 | aierror".dimmed()
    );
    bail!(message)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        print_completions(shell);
        return Ok(());
    }

    if cli.print_config {
        print_default_config();
        return Ok(());
    }

    let mut config = Config::from_env();
    if cli.debug {
        config.debug = true;
    }
    if cli.no_local {
        config.local.enabled = false;
    }

    if cli.list_providers {
        print_providers(&config);
        return Ok(());
    }

    let input = get_input(&cli)?;
    let analyzer = Analyzer::new(config);
    let mut stdout = io::stdout();
    analyzer
        .run(&input, &mut stdout)
        .await
        .context("Failed to write analysis")?;

    Ok(())
}
