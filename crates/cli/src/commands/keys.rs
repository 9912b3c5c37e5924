use anyhow::Result;
use serde::Serialize;
use template_schema::{Key, IMPLICIT_KEYS};

use crate::commands::load_config;

#[derive(Serialize)]
struct KeyListing<'a> {
    keys: Vec<&'a Key>,
    implicit: &'static [&'static str],
}

/// List the declared keys, plus the implicit tokens available everywhere.
pub fn list_keys_command(root: &str, file: Option<&str>, json: bool) -> Result<()> {
    let config = load_config(root, file)?;
    let keys: Vec<&Key> = config.schema.keys().collect();

    if json {
        let listing = KeyListing { keys, implicit: IMPLICIT_KEYS };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if keys.is_empty() {
        println!("No keys declared.");
    } else {
        println!("Keys:");
        for key in keys {
            println!("- {}", describe_key(key));
        }
    }
    println!("Implicit: {}", IMPLICIT_KEYS.join(", "));

    Ok(())
}

/// One-line summary of a key: `name (type) ...`.
pub fn describe_key(key: &Key) -> String {
    let mut line = format!("{} ({})", key.name, key.key_type.as_str());
    if let Some(width) = key.width {
        line.push_str(&format!(" width={width}"));
    }
    if key.has_choices() {
        line.push_str(&format!(" choices=[{}]", key.choice_values().join(", ")));
    }
    if let Some(default) = &key.default {
        line.push_str(&format!(" default={default}"));
    }
    if let Some(binding) = &key.binding {
        line.push_str(&format!(" entity={}.{}", binding.entity_type, binding.field_name));
    }
    line
}
