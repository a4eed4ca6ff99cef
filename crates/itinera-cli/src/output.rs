use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

/// Write `value` as pretty JSON to `output`, or to stdout when `None`.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;

    let mut writer: Box<dyn Write> = if let Some(path) = output {
        Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("cannot create output file: {}", path.display()))?,
        )
    } else {
        Box::new(std::io::stdout().lock())
    };
    writeln!(writer, "{json}")?;
    writer.flush()?;

    if let Some(path) = output {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
