//! `sitecarbon analyze <url>`: estimate the emissions of a single page.

use crate::advisor::AdvisoryClient;
use crate::cli::output::{self, Styled};
use anyhow::{bail, Context, Result};
use sitecarbon::format::{format_bytes, format_emissions, format_load_time};
use sitecarbon::{AnalysisResult, Coordinator};
use std::time::Instant;

/// Run the analyze command.
pub async fn run(
    coordinator: &Coordinator,
    url: &str,
    model: &str,
    advisor: Option<&AdvisoryClient>,
) -> Result<()> {
    if !coordinator.registry().contains(model) {
        bail!(
            "unknown model '{model}' (available: {})",
            coordinator.registry().ids().join(", ")
        );
    }

    let s = Styled::new();
    let start = Instant::now();

    if !output::is_quiet() && !output::is_json() {
        output::print_header(&s);
        eprintln!("  Analyzing {url}...");
        eprintln!();
    }

    let result = coordinator
        .analyze(url)
        .await
        .with_context(|| format!("failed to analyze {url}; check the URL and try again"))?;

    let tips = match advisor {
        Some(client) => Some(client.tips_for(&result, model).await),
        None => None,
    };

    if output::is_json() {
        let mut value = serde_json::to_value(&*result)?;
        value["duration_ms"] = serde_json::json!(start.elapsed().as_millis() as u64);
        if let Some(tips) = &tips {
            value["tips"] = match tips {
                Ok(text) => serde_json::json!(text),
                Err(e) => serde_json::json!({ "error": format!("{e:#}") }),
            };
        }
        output::print_json(&value);
        return Ok(());
    }

    print_result(&s, &result, model);

    if let Some(tips) = tips {
        eprintln!();
        output::print_section(&s, "Eco tips");
        match tips {
            Ok(text) => {
                for line in text.lines() {
                    eprintln!("    {line}");
                }
            }
            Err(e) => {
                eprintln!("    {} Failed to get eco-tips: {e:#}", s.fail_sym());
            }
        }
    }

    if output::is_verbose() {
        eprintln!();
        eprintln!("  {} Done in {:.1}s", s.ok_sym(), start.elapsed().as_secs_f64());
    }
    Ok(())
}

fn print_result(s: &Styled, result: &AnalysisResult, selected: &str) {
    output::print_section(s, &result.url);
    for (id, estimate) in &result.estimates {
        let marker = if id == selected { "*" } else { " " };
        eprintln!(
            "   {marker}{:<16} {}  {}",
            format!("{id}:"),
            s.grade(estimate.grade),
            format_emissions(estimate.grams)
        );
    }
    eprintln!();

    let m = &result.metrics;
    output::print_field("Page size:", &format_bytes(m.byte_size));
    output::print_field("Requests:", &m.request_count.to_string());
    output::print_field("Load time:", &format_load_time(m.load_time_ms));
    let hosting = if m.is_green_hosting {
        format!("{} green", s.leaf_sym())
    } else {
        "standard grid".to_string()
    };
    output::print_field("Hosting:", &hosting);
}
