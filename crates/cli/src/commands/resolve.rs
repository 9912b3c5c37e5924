use anyhow::Result;
use serde::Serialize;
use template_schema::{Context, TemplateKind};

use crate::commands::{
    build_context, load_config, parse_platform, resolution_failure, ContextOptions,
};

/// Resolve a template and print the result.
///
/// With `absolute`, path templates are joined onto their storage root for
/// `platform` (the running platform when not given).
pub fn resolve_command(
    root: &str,
    file: Option<&str>,
    name: &str,
    options: &ContextOptions,
    absolute: bool,
    platform: Option<&str>,
) -> Result<()> {
    let config = load_config(root, file)?;
    let context = build_context(&config, options)?;

    let is_path = config.schema.template(name).is_some_and(|t| t.kind == TemplateKind::Path);
    let resolved = if absolute && is_path {
        let platform = parse_platform(platform)?;
        config.resolve_path(name, &context, platform)
    } else {
        config.schema.resolve(name, &context)
    };

    let resolved = resolved.map_err(|err| resolution_failure(name, err))?;
    println!("{}", resolved);
    Ok(())
}

/// Print the required keys still missing for `name`, one per line.
pub fn missing_keys_command(
    root: &str,
    file: Option<&str>,
    name: &str,
    options: &ContextOptions,
) -> Result<()> {
    let config = load_config(root, file)?;
    let context = build_context(&config, options)?;
    let missing =
        config.schema.missing_keys(name, &context).map_err(|err| resolution_failure(name, err))?;

    if missing.is_empty() {
        println!("Nothing missing for '{}'.", name);
    } else {
        for key in missing {
            println!("{}", key);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ParsedFields<'a> {
    template: &'a str,
    input: &'a str,
    fields: &'a Context,
}

/// Recover field values from a resolved path or string.
pub fn parse_command(
    root: &str,
    file: Option<&str>,
    name: &str,
    input: &str,
    json: bool,
) -> Result<()> {
    let config = load_config(root, file)?;
    let fields = config.schema.get_fields(name, input)?;

    if json {
        let parsed = ParsedFields { template: name, input, fields: &fields };
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }

    for (key, value) in fields.iter() {
        println!("{key}={value}");
    }
    Ok(())
}
