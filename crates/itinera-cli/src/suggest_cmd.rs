use anyhow::Context;

use itinera_core::{ModelClient, Suggestion, suggest};

/// Ask a free-text travel question and print the answer.
pub async fn run_suggest(
    client: &dyn ModelClient,
    destination: &str,
    query: &str,
    json: bool,
) -> anyhow::Result<Suggestion> {
    let suggestion = suggest(client, destination, query)
        .await
        .with_context(|| format!("could not get a suggestion for {destination}"))?;

    if json {
        crate::output::write_json(&suggestion, None)?;
    } else {
        println!("{}", suggestion.suggestion.trim());
    }
    Ok(suggestion)
}
