//! Report formatting and terminal output.

use colored::{Color, Colorize};
use std::io::{self, Write};

/// Width of the `=` banner lines
const BANNER_WIDTH: usize = 50;

/// Section labels a model is asked to answer with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    RootCause,
    WhyItHappened,
    HowToFix,
    ExampleFixCode,
    Other,
}

impl Section {
    /// Labeled sections, in match order
    pub const LABELED: [Section; 4] = [
        Section::RootCause,
        Section::WhyItHappened,
        Section::HowToFix,
        Section::ExampleFixCode,
    ];

    pub fn label(&self) -> Option<&'static str> {
        match self {
            Section::RootCause => Some("ROOT CAUSE:"),
            Section::WhyItHappened => Some("WHY IT HAPPENED:"),
            Section::HowToFix => Some("HOW TO FIX:"),
            Section::ExampleFixCode => Some("EXAMPLE FIX CODE:"),
            Section::Other => None,
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Section::RootCause => Some(Color::Red),
            Section::WhyItHappened => Some(Color::Yellow),
            Section::HowToFix | Section::ExampleFixCode => Some(Color::Cyan),
            Section::Other => None,
        }
    }

    /// Classify a line by exact, case-sensitive label prefix. First match wins.
    pub fn classify(line: &str) -> Section {
        Section::LABELED
            .into_iter()
            .find(|section| section.label().is_some_and(|label| line.starts_with(label)))
            .unwrap_or(Section::Other)
    }
}

fn banner() -> String {
    "=".repeat(BANNER_WIDTH)
}

/// Render one body line
pub fn render_line(line: &str) -> String {
    match Section::classify(line).color() {
        Some(color) => line.color(color).to_string(),
        None => format!("  {line}"),
    }
}

/// Render a model response into the framed report, one entry per output line
pub fn render_report(text: &str) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        banner(),
        format!("{} {}", "●".red(), "AI ERROR ANALYSIS".red().bold()),
        banner(),
    ];

    lines.extend(
        text.split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .map(render_line),
    );

    lines.push(banner());
    lines.push(String::new());
    lines
}

/// Write the framed report to `out`
pub fn write_report<W: Write + ?Sized>(out: &mut W, text: &str) -> io::Result<()> {
    for line in render_report(text) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Print the framed report to stdout
pub fn print_report(text: &str) {
    let stdout = io::stdout();
    let _ = write_report(&mut stdout.lock(), text);
}

/// Format an error with an optional tip
pub fn format_error(message: &str, tip: Option<&str>) -> String {
    let mut output = format!("{} {}", "Error:".red().bold(), message);
    if let Some(tip) = tip {
        output.push('\n');
        output.push_str(&format!("{} {}", "Tip:".blue().bold(), tip));
    }
    output
}

pub fn print_debug_section(title: &str, body: &str, footer: Option<String>) {
    eprintln!("{}", format!("=== DEBUG: {title} ===").yellow().bold());
    if body.trim().is_empty() {
        eprintln!("{}", "| <empty>".dimmed());
    } else {
        for line in body.lines() {
            eprintln!("{}", format!("| {line}").bright_white());
        }
    }
    if let Some(footer) = footer {
        eprintln!("{}", footer.dimmed());
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_label() {
        assert_eq!(Section::classify("ROOT CAUSE: nil map"), Section::RootCause);
        assert_eq!(
            Section::classify("WHY IT HAPPENED: never initialized"),
            Section::WhyItHappened
        );
        assert_eq!(Section::classify("HOW TO FIX: call make"), Section::HowToFix);
        assert_eq!(
            Section::classify("EXAMPLE FIX CODE:"),
            Section::ExampleFixCode
        );
    }

    #[test]
    fn test_classify_requires_exact_prefix() {
        assert_eq!(Section::classify("root cause: lowercase"), Section::Other);
        assert_eq!(Section::classify("  ROOT CAUSE: indented"), Section::Other);
        assert_eq!(Section::classify("The ROOT CAUSE: is"), Section::Other);
        assert_eq!(Section::classify("**ROOT CAUSE:**"), Section::Other);
        assert_eq!(Section::classify(""), Section::Other);
    }

    #[test]
    fn test_section_colors() {
        assert_eq!(Section::RootCause.color(), Some(Color::Red));
        assert_eq!(Section::WhyItHappened.color(), Some(Color::Yellow));
        assert_eq!(Section::HowToFix.color(), Some(Color::Cyan));
        assert_eq!(Section::ExampleFixCode.color(), Some(Color::Cyan));
        assert_eq!(Section::Other.color(), None);
    }

    #[test]
    fn test_unlabeled_line_is_indented_and_plain() {
        assert_eq!(render_line("m := map[string]int{}"), "  m := map[string]int{}");
    }

    #[test]
    fn test_labeled_line_keeps_text() {
        let rendered = render_line("HOW TO FIX: initialize the map");
        assert!(rendered.contains("HOW TO FIX: initialize the map"));
        assert!(!rendered.starts_with("  "));
    }

    #[test]
    fn test_report_framing() {
        let text = "ROOT CAUSE: a\nWHY IT HAPPENED: b\nHOW TO FIX: c\nEXAMPLE FIX CODE:\nfix()";
        let lines = render_report(text);

        assert_eq!(lines.len(), 5 + 6);
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "=".repeat(50));
        assert!(lines[2].contains("AI ERROR ANALYSIS"));
        assert_eq!(lines[3], "=".repeat(50));
        assert_eq!(lines[8], "  fix()");
        assert_eq!(lines[9], "=".repeat(50));
        assert_eq!(lines[10], "");
    }

    #[test]
    fn test_report_never_shorter_than_input_plus_framing() {
        for text in ["x", "a\nb", "a\n\n\nb\n", "ROOT CAUSE:\n\n"] {
            let input_lines = text.split('\n').count();
            assert!(render_report(text).len() >= input_lines + 4);
        }
    }

    #[test]
    fn test_single_line_without_breaks() {
        let lines = render_report("something odd happened");
        let body = &lines[4..lines.len() - 2];
        assert_eq!(body, ["  something odd happened".to_string()]);
    }

    #[test]
    fn test_empty_input() {
        let lines = render_report("");
        let body = &lines[4..lines.len() - 2];
        assert_eq!(body, ["  ".to_string()]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let lines = render_report("first\r\nsecond");
        assert_eq!(lines[4], "  first");
        assert_eq!(lines[5], "  second");
    }

    #[test]
    fn test_write_report_matches_render() {
        let mut out = Vec::new();
        write_report(&mut out, "a\nb").unwrap();
        let written = String::from_utf8(out).unwrap();
        assert_eq!(written, render_report("a\nb").join("\n") + "\n");
    }

    #[test]
    fn test_format_error_with_tip() {
        let output = format_error("Ollama not running.", Some("ollama pull phi3"));
        assert!(output.contains("Ollama not running."));
        assert!(output.contains("ollama pull phi3"));
    }
}
