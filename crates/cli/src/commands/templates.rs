use anyhow::{anyhow, Result};
use template_schema::{Template, TemplateKind};

use crate::commands::load_config;

pub fn parse_kind(raw: &str) -> Result<TemplateKind> {
    match raw {
        "path" | "paths" => Ok(TemplateKind::Path),
        "string" | "strings" => Ok(TemplateKind::String),
        other => Err(anyhow!("Invalid template kind '{}'. Allowed: path, string", other)),
    }
}

/// List declared templates, optionally only one kind.
pub fn list_templates_command(
    root: &str,
    file: Option<&str>,
    kind: Option<&str>,
    json: bool,
) -> Result<()> {
    let kind = kind.map(parse_kind).transpose()?;
    let config = load_config(root, file)?;
    let templates: Vec<&Template> =
        config.schema.templates().filter(|t| kind.map_or(true, |k| t.kind == k)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    if templates.is_empty() {
        println!("No templates found.");
        return Ok(());
    }

    println!("Templates:");
    for template in templates {
        let root = match template.kind {
            TemplateKind::Path => config
                .root_name_for(&template.name)
                .map(|r| format!(" [root: {r}]"))
                .unwrap_or_default(),
            TemplateKind::String => String::new(),
        };
        println!(
            "- {} ({}){} -- {}",
            template.name,
            template.kind.as_str(),
            root,
            template.definition
        );
    }

    Ok(())
}
