use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

use itinera_core::itinerary::DEFAULT_INTERESTS;
use itinera_core::{DayRegeneration, ModelClient, TravelPlan, regenerate_day};

use crate::output::write_json;

/// Options for `itinera regenerate-day`.
#[derive(Debug)]
pub struct RegenerateOptions {
    pub plan_file: PathBuf,
    pub day: u32,
    /// Defaults to the plan's own destination.
    pub destination: Option<String>,
    pub interests: Option<String>,
    /// Treat an unchanged plan as an error.
    pub strict: bool,
    pub output: Option<PathBuf>,
}

/// Read a plan from a JSON file. Accepts either a bare plan or the output of
/// `itinera plan` (with the plan under `"plan"`).
pub fn read_plan(path: &Path) -> anyhow::Result<TravelPlan> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan file {}", path.display()))?;
    let mut value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("plan file {} is not valid JSON", path.display()))?;
    if let Some(inner) = value.get_mut("plan").map(serde_json::Value::take) {
        value = inner;
    }
    serde_json::from_value(value)
        .with_context(|| format!("plan file {} is not a travel plan", path.display()))
}

/// Regenerate one day of a saved plan and write the result.
pub async fn run_regenerate(
    client: &dyn ModelClient,
    options: &RegenerateOptions,
) -> anyhow::Result<DayRegeneration> {
    if options.day == 0 {
        bail!("day numbers start at 1");
    }

    let plan = read_plan(&options.plan_file)?;
    let destination = options
        .destination
        .clone()
        .unwrap_or_else(|| plan.destination.clone());
    let interests = options
        .interests
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or(DEFAULT_INTERESTS);

    let result = regenerate_day(client, &plan, options.day, &destination, interests).await;

    if options.strict && !result.changed() {
        bail!("day {} was not regenerated: {:?}", options.day, result.status);
    }
    write_json(&result, options.output.as_deref())?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    use itinera_core::RegenerationStatus;
    use itinera_test_utils::{Reply, ScriptedModelClient, day_json, plan_value};

    fn options(dir: &Path, strict: bool) -> RegenerateOptions {
        RegenerateOptions {
            plan_file: dir.join("plan.json"),
            day: 2,
            destination: None,
            interests: None,
            strict,
            output: Some(dir.join("out.json")),
        }
    }

    fn write_plan(dir: &Path, wrapped: bool) {
        let plan = plan_value("Kyoto, Japan", 3);
        let value = if wrapped {
            serde_json::json!({ "destination": "Kyoto, Japan", "duration": 3, "plan": plan })
        } else {
            plan
        };
        std::fs::write(dir.join("plan.json"), value.to_string()).unwrap();
    }

    #[test]
    fn reads_bare_and_wrapped_plans() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_plan(tmp.path(), false);
        assert_eq!(read_plan(&tmp.path().join("plan.json")).unwrap().days.len(), 3);

        write_plan(tmp.path(), true);
        assert_eq!(read_plan(&tmp.path().join("plan.json")).unwrap().days.len(), 3);
    }

    #[tokio::test]
    async fn uses_plan_destination_and_default_interests() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_plan(tmp.path(), true);
        let client = ScriptedModelClient::always(Reply::text(day_json(2)));

        let result = run_regenerate(&client, &options(tmp.path(), false))
            .await
            .unwrap();
        assert_eq!(result.status, RegenerationStatus::Replaced);

        let prompt = &client.prompts()[0];
        assert!(prompt.user.contains("trip to Kyoto, Japan"));
        assert!(prompt.user.contains(DEFAULT_INTERESTS));
        assert!(tmp.path().join("out.json").exists());
    }

    #[tokio::test]
    async fn strict_mode_fails_on_unchanged_plan() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_plan(tmp.path(), false);
        let client = ScriptedModelClient::always(Reply::fail("down"));

        let err = run_regenerate(&client, &options(tmp.path(), true))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("day 2 was not regenerated"));

        let result = run_regenerate(&client, &options(tmp.path(), false))
            .await
            .unwrap();
        assert!(!result.changed());
    }
}
