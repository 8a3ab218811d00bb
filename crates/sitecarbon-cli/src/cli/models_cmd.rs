//! `sitecarbon models`: list the registered emissions models.

use crate::cli::output::{self, Styled};
use anyhow::Result;
use sitecarbon::ModelRegistry;

pub fn run(registry: &ModelRegistry) -> Result<()> {
    if output::is_json() {
        let models: Vec<_> = registry
            .iter()
            .map(|m| serde_json::json!({ "id": m.id, "name": m.name }))
            .collect();
        output::print_json(&serde_json::json!({ "models": models }));
        return Ok(());
    }

    let s = Styled::new();
    output::print_section(&s, "Emissions models");
    for model in registry.iter() {
        output::print_field(model.id, model.name);
    }
    Ok(())
}
