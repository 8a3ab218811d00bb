//! `sitecarbon rank`: analyze the whole catalog and print per-category rankings.

use crate::cli::output::{self, Styled};
use anyhow::{bail, Result};
use sitecarbon::format::format_emissions;
use sitecarbon::{filter_category, Coordinator, RankedRow, RankingState};
use std::time::Instant;

/// Run the rank command.
pub async fn run(coordinator: &Coordinator, model: &str, category: Option<&str>) -> Result<()> {
    let registry = coordinator.registry();
    let Some(model_info) = registry.get(model) else {
        bail!(
            "unknown model '{model}' (available: {})",
            registry.ids().join(", ")
        );
    };
    let catalog = coordinator.catalog();
    if let Some(tag) = category {
        if !catalog.categories().contains(&tag) {
            bail!(
                "unknown category '{tag}' (available: {})",
                catalog.categories().join(", ")
            );
        }
    }

    let s = Styled::new();
    let start = Instant::now();
    if !output::is_quiet() && !output::is_json() {
        output::print_header(&s);
        eprintln!("  Ranking {} sites...", catalog.len());
        eprintln!();
    }

    if let RankingState::Failed(reason) = coordinator.refresh_rankings().await {
        bail!("ranking failed: {reason}");
    }
    let view = coordinator.ranking(model).await?;

    let categories: Vec<&str> = match category {
        Some(tag) => vec![tag],
        None => catalog.categories(),
    };

    if output::is_json() {
        let rows: Vec<_> = categories
            .iter()
            .flat_map(|tag| filter_category(&view, tag))
            .map(|row| {
                serde_json::json!({
                    "category": row.entry.category,
                    "position": row.position,
                    "name": row.entry.name,
                    "url": row.entry.url,
                    "grams": row.grams,
                    "grade": row.result.grade(model),
                })
            })
            .collect();
        output::print_json(&serde_json::json!({
            "model": model,
            "ranked": view.len(),
            "catalog": catalog.len(),
            "rankings": rows,
            "duration_ms": start.elapsed().as_millis() as u64,
        }));
        return Ok(());
    }

    for tag in categories {
        output::print_section(&s, &format!("{tag} Sites Ranking ({} model)", model_info.name));
        let rows = filter_category(&view, tag);
        if rows.is_empty() {
            eprintln!("    {}", s.dim("(no results)"));
        }
        for row in &rows {
            print_row(&s, row, model);
        }
        eprintln!();
    }

    if output::is_verbose() {
        eprintln!(
            "  {} Ranked {} of {} sites in {:.1}s",
            s.ok_sym(),
            view.len(),
            catalog.len(),
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

fn print_row(s: &Styled, row: &RankedRow, model: &str) {
    let position = format!("#{}", row.position);
    let position = if row.position <= 3 {
        s.green(&position)
    } else {
        position
    };
    let grade = row
        .result
        .grade(model)
        .map(|g| s.grade(g))
        .unwrap_or_else(|| "?".to_string());
    let green = if row.result.metrics.is_green_hosting {
        s.leaf_sym()
    } else {
        " "
    };
    eprintln!(
        "    {position:>4}  {:<20} {:>16}  Grade {grade} {green}",
        row.entry.name,
        format_emissions(row.grams),
    );
}
