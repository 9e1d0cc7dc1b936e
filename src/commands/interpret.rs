//! Interpret command - show how a query would be parsed.

use anyhow::Result;
use colored::Colorize;

use crate::search::engine::SearchEngine;

pub fn run(query: &str, json: bool) -> Result<()> {
    let engine = SearchEngine::from_env();
    let params = engine.interpret(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&params)?);
        return Ok(());
    }

    println!("{} {}", "Query:".bold(), query.cyan());
    println!(
        "{} {}",
        "Keywords:".bold(),
        if params.keywords.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            params.keywords.join(", ")
        }
    );
    print_field("Time filter", params.time_filter.as_deref());
    print_field("User filter", params.user_filter.as_deref());
    print_field("Content type", params.content_type.as_deref());
    print_field("Sentiment", params.sentiment.as_deref());
    println!(
        "{} {}",
        "Channel hints:".bold(),
        if params.channel_hints.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            params
                .channel_hints
                .iter()
                .map(|c| format!("#{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        }
    );

    Ok(())
}

fn print_field(label: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("{} {}", format!("{label}:").bold(), v),
        None => println!("{} {}", format!("{label}:").bold(), "(none)".dimmed()),
    }
}
