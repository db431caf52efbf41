use anyhow::{Context, Result};
use jsk_flags::{FlagRegistry, FlagSource, FlagType, FlagValue};
use serde::Serialize;
use std::io::Write;

/// One row of `jsk list`.
#[derive(Debug, Serialize)]
pub struct FlagRow {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FlagType,
    pub value: FlagValue,
    pub source: FlagSource,
    pub env: String,
}

/// Applies `--set` assignments in order; a later assignment replaces an earlier one.
///
/// # Errors
/// Returns an error naming the assignment when the flag is unknown or the value does not
/// convert to the flag's type.
pub fn apply_overrides(registry: &FlagRegistry, overrides: &[(String, String)]) -> Result<()> {
    for (name, raw) in overrides {
        registry.set_parsed(name, raw).with_context(|| format!("--set {name}={raw}"))?;
    }
    Ok(())
}

/// Resolves every flag in declaration order.
///
/// # Errors
/// Propagates the first resolution failure.
pub fn rows(registry: &FlagRegistry) -> Result<Vec<FlagRow>> {
    registry
        .definitions()
        .map(|definition| -> Result<FlagRow> {
            let name = definition.name();
            let resolved = registry.resolve(name)?;
            Ok(FlagRow {
                name: name.to_owned(),
                ty: definition.flag_type(),
                value: resolved.value,
                source: resolved.source,
                env: registry.env_key(name)?,
            })
        })
        .collect()
}

/// Writes the `jsk list` output.
///
/// # Errors
/// Returns an error if resolution fails or `out` cannot be written.
pub fn list(registry: &FlagRegistry, json: bool, out: &mut impl Write) -> Result<()> {
    let rows = rows(registry)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &rows)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{:<18} {:<6} {:<12} {:<20} {:<28}", "Flag", "Type", "Source", "Value", "Env")?;
    writeln!(out, "{:-<86}", "")?;
    for row in &rows {
        writeln!(
            out,
            "{:<18} {:<6} {:<12} {:<20} {:<28}",
            row.name,
            row.ty,
            row.source,
            display_value(&row.value),
            row.env
        )?;
    }
    Ok(())
}

/// Writes the `jsk get` output.
///
/// # Errors
/// Returns an error if the flag is unknown, resolution fails or `out` cannot be written.
pub fn get(registry: &FlagRegistry, name: &str, json: bool, out: &mut impl Write) -> Result<()> {
    let resolved = registry.resolve(name)?;
    if json {
        serde_json::to_writer(&mut *out, &resolved)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", resolved.value)?;
    }
    Ok(())
}

fn display_value(value: &FlagValue) -> String {
    match value {
        FlagValue::Str(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}
