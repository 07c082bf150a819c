use crate::config::Config;
use schemars::schema_for;

/// JSON Schema for `chatgrade.yaml`, for editor validation
pub fn execute() -> anyhow::Result<()> {
    let schema = serde_json::to_string_pretty(&schema_for!(Config))?;
    println!("{}", schema);
    Ok(())
}
