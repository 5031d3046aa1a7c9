//! Output formatting utilities for agctl

use crate::cli::OutputFormat;
use agrogate_core::errors::CoreResult;
use agrogate_core::persona::Persona;
use agrogate_core::types::{CompletionResponse, RateLimitStatus};
use agrogate_core::HealthReport;
use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::{Table, Tabled};

fn print_json<T: Serialize + ?Sized>(value: &T) -> CoreResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Display answer text
pub fn display_text(text: &str, format: &OutputFormat) -> CoreResult<()> {
    match format {
        OutputFormat::Table => println!("{}", text),
        OutputFormat::Json => print_json(&serde_json::json!({ "text": text }))?,
    }
    Ok(())
}

/// Display a full completion response
pub fn display_response(response: &CompletionResponse, format: &OutputFormat) -> CoreResult<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", "Completion".bold().blue());
            println!("{:<12} {}", "ID:".bold(), response.id);
            println!("{:<12} {}", "Model:".bold(), response.model);
            println!(
                "{:<12} {} prompt / {} completion / {} total",
                "Tokens:".bold(),
                response.usage.prompt_tokens,
                response.usage.completion_tokens,
                response.usage.total_tokens
            );
            if response.is_no_answer() {
                println!("{:<12} {}", "Answer:".bold(), response.first_response().yellow());
            } else {
                let finish = response
                    .choices
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
                    .unwrap_or("-");
                println!("{:<12} {}", "Finish:".bold(), finish);
                println!();
                println!("{}", response.first_response());
            }
        }
        OutputFormat::Json => print_json(response)?,
    }
    Ok(())
}

/// Display the rate window
pub fn display_status(status: &RateLimitStatus, format: &OutputFormat) -> CoreResult<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", "Rate Limit".bold().blue());
            println!(
                "{:<16} {}/{}",
                "Requests:".bold(),
                status.current_requests,
                status.max_requests
            );
            println!("{:<16} {}ms", "Resets in:".bold(), status.millis_until_reset);
            println!("{:<16} {}", "State:".bold(), format_limit(status));
        }
        OutputFormat::Json => print_json(status)?,
    }
    Ok(())
}

/// Display the persona list
pub fn display_personas(personas: &[Persona], format: &OutputFormat) -> CoreResult<()> {
    match format {
        OutputFormat::Table => {
            if personas.is_empty() {
                println!("No personas configured");
                return Ok(());
            }

            let rows: Vec<PersonaTableRow> = personas
                .iter()
                .map(|p| PersonaTableRow {
                    name: p.name.clone(),
                    system_prompt: truncate(p.system_prompt.lines().next().unwrap_or_default(), 60),
                    fallback: truncate(&p.fallback_text, 60),
                })
                .collect();
            println!("{}", Table::new(rows));
        }
        OutputFormat::Json => print_json(personas)?,
    }
    Ok(())
}

/// Display outcome counts of a burst
pub fn display_burst(
    outcomes: &BTreeMap<String, usize>,
    status: &RateLimitStatus,
    format: &OutputFormat,
) -> CoreResult<()> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<OutcomeTableRow> = outcomes
                .iter()
                .map(|(outcome, count)| OutcomeTableRow {
                    outcome: outcome.clone(),
                    count: *count,
                })
                .collect();
            println!("{}", Table::new(rows));
            println!();
            display_status(status, format)?;
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "outcomes": outcomes,
            "rate_limit": status,
        }))?,
    }
    Ok(())
}

/// Display a health report
pub fn display_health(report: &HealthReport, format: &OutputFormat) -> CoreResult<()> {
    match format {
        OutputFormat::Table => {
            if report.connected {
                println!("{}", "✓ Completion service is reachable".green().bold());
            } else {
                println!("{}", "✗ Completion service is not answering".red().bold());
            }
            println!("Status: {}", report.status);
            println!("Transport: {}", report.transport);
            println!("Checked: {}", report.checked_at.format("%Y-%m-%d %H:%M:%S UTC"));
            println!(
                "Rate limit: {}/{}",
                report.rate_limit.current_requests, report.rate_limit.max_requests
            );
        }
        OutputFormat::Json => print_json(report)?,
    }
    Ok(())
}

/// Format limit state with color
fn format_limit(status: &RateLimitStatus) -> String {
    if status.limit_exceeded() {
        "exhausted".red().to_string()
    } else {
        "available".green().to_string()
    }
}

/// Cut `value` to `max` characters for table cells
fn truncate(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &value[..cut]),
        None => value.to_string(),
    }
}

/// Table row for persona display
#[derive(Tabled)]
struct PersonaTableRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "System Prompt")]
    system_prompt: String,
    #[tabled(rename = "Fallback")]
    fallback: String,
}

/// Table row for burst outcome display
#[derive(Tabled)]
struct OutcomeTableRow {
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Count")]
    count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }

    #[test]
    fn test_format_limit() {
        colored::control::set_override(false);
        let status = RateLimitStatus { current_requests: 60, max_requests: 60, millis_until_reset: 10 };
        assert_eq!(format_limit(&status), "exhausted");
        let status = RateLimitStatus { current_requests: 1, ..status };
        assert_eq!(format_limit(&status), "available");
    }
}
