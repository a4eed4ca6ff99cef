use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};

use itinera_core::{FallbackPolicy, GeneratedPlan, GenerationRequest, ModelClient, PlanGenerator};

use crate::output::write_json;

/// Options for `itinera plan`.
#[derive(Debug, Default)]
pub struct PlanOptions {
    /// Bound on the whole generation run, retries included.
    pub timeout: Option<Duration>,
    pub output: Option<PathBuf>,
}

/// Generate a plan and write it as JSON.
pub async fn run_plan(
    client: Arc<dyn ModelClient>,
    fallback: Arc<dyn FallbackPolicy>,
    request: GenerationRequest,
    options: &PlanOptions,
) -> anyhow::Result<GeneratedPlan> {
    let generator = PlanGenerator::new(client, fallback);
    let destination = request.destination.clone();

    let generated = match options.timeout {
        Some(limit) => match tokio::time::timeout(limit, generator.generate(request)).await {
            Ok(result) => result,
            Err(_) => bail!(
                "plan generation for {destination} timed out after {}s",
                limit.as_secs()
            ),
        },
        None => generator.generate(request).await,
    }
    .with_context(|| format!("could not generate a plan for {destination}"))?;

    write_json(&generated, options.output.as_deref())?;

    eprintln!(
        "Generated {}-day plan for {} (retries: {}{})",
        generated.plan.days.len(),
        generated.destination,
        generated.retry_count,
        if generated.used_fallback {
            ", fallback plan"
        } else {
            ""
        }
    );
    if !generated.repairs.is_empty() {
        eprintln!("  {} activity time(s) reset to 09:00-11:00", generated.repairs.len());
    }

    Ok(generated)
}
