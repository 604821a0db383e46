// Colored terminal output for analyses, batches and searches.
//
// This module handles all terminal-specific formatting: colors and tables.
// The main.rs command handlers delegate here unless --json is set.

use colored::Colorize;

use crate::api::{BatchAnalyzeResponse, ErrorResponse, SearchResponse};
use crate::db::models::{AnalysisMetadata, AnalysisRecord, Sentiment, StoreStats};

/// Display one freshly produced analysis.
pub fn display_analysis(id: &str, summary: &str, metadata: &AnalysisMetadata, confidence: f64) {
    println!("\n{}", "=== Analysis ===".bold());
    println!("  ID:         {}", id.dimmed());
    if !metadata.title.is_empty() {
        println!("  Title:      {}", metadata.title.bold());
    }
    println!("  Summary:    {}", summary);
    println!("  Topics:     {}", metadata.topics.join(", "));
    println!("  Keywords:   {}", metadata.keywords.join(", "));
    println!("  Sentiment:  {}", colorize_sentiment(metadata.sentiment));
    println!("  Confidence: {}", colorize_confidence(confidence));
}

/// Display a stored record, including the source text and timing.
pub fn display_record(record: &AnalysisRecord) {
    display_analysis(
        &record.id,
        &record.summary,
        &record.metadata,
        record.confidence,
    );
    println!(
        "  Created:    {} ({} ms)",
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        record.processing_ms
    );
    println!("\n  {}", super::truncate_chars(&record.text, 500).dimmed());
}

/// Display the outcome of a batch: successes first, then failures.
pub fn display_batch(response: &BatchAnalyzeResponse) {
    let total = response.results.len() + response.failed.len();
    println!(
        "\n{}",
        format!(
            "=== Batch ({}/{} succeeded) ===",
            response.results.len(),
            total
        )
        .bold()
    );
    println!();

    for result in &response.results {
        println!(
            "  {}  {:>5}  {}",
            result.id.dimmed(),
            colorize_confidence(result.confidence),
            super::truncate_chars(&result.summary, 80),
        );
    }

    if !response.failed.is_empty() {
        println!();
        for failure in &response.failed {
            println!(
                "  {} item {}: {}",
                "!!".red().bold(),
                failure.index,
                failure.error
            );
        }
    }
}

/// Display a page of search results.
pub fn display_search(response: &SearchResponse) {
    if response.results.is_empty() {
        println!("No analyses match. Run `knowledge-extractor analyze <TEXT>` to add some.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Search Results ({}) ===", response.count).bold()
    );
    println!();

    println!(
        "  {:<36}  {:>5}  {:<8}  {:<32}  {}",
        "ID".dimmed(),
        "Conf".dimmed(),
        "Tone".dimmed(),
        "Topics".dimmed(),
        "Summary".dimmed(),
    );
    println!("  {}", "-".repeat(110).dimmed());

    for record in &response.results {
        println!(
            "  {:<36}  {:>5}  {:<8}  {:<32}  {}",
            record.id,
            colorize_confidence(record.confidence),
            colorize_sentiment(record.metadata.sentiment),
            super::truncate_chars(&record.metadata.topics.join(", "), 29),
            super::truncate_chars(&record.summary, 60),
        );
    }
}

/// Display aggregate statistics.
pub fn display_stats(stats: &StoreStats) {
    println!("Analyses stored: {}", stats.total_analyses);
    if stats.total_analyses == 0 {
        return;
    }
    println!("Average confidence: {:.2}", stats.average_confidence);
    println!(
        "Average processing time: {:.0} ms",
        stats.average_processing_ms
    );
    if let Some(last) = stats.last_analysis {
        println!("Last analysis: {}", last.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

/// Display a boundary error on stderr.
pub fn display_error(err: &ErrorResponse) {
    eprintln!("{} {} [{}]", "error:".red().bold(), err.error, err.code);
    if let Some(details) = &err.details {
        eprintln!("  {}", details.dimmed());
    }
}

fn colorize_sentiment(sentiment: Sentiment) -> colored::ColoredString {
    match sentiment {
        Sentiment::Positive => sentiment.as_str().green(),
        Sentiment::Neutral => sentiment.as_str().normal(),
        Sentiment::Negative => sentiment.as_str().red(),
    }
}

fn colorize_confidence(confidence: f64) -> colored::ColoredString {
    let text = format!("{confidence:.2}");
    if confidence >= 0.8 {
        text.green()
    } else if confidence >= 0.6 {
        text.yellow()
    } else {
        text.red()
    }
}
