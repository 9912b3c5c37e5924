use anyhow::Result;
use serde::Serialize;

use crate::commands::{config_layout, print_file_status};
use crate::{infer_config_name, sha256_file};

#[derive(Serialize)]
pub struct ConfigInfoSnapshot {
    pub name: String,
    pub root: String,
    pub templates_file: String,
    pub templates_sha256: String,
    pub roots_file: String,
    pub keys: usize,
    pub paths: usize,
    pub strings: usize,
    pub roots: Vec<RootInfo>,
    pub default_root: Option<String>,
}

#[derive(Serialize)]
pub struct RootInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linux_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows_path: Option<String>,
}

/// Show basic information about a pipeline configuration.
pub fn info_command(root: &str, file: Option<&str>, json: bool) -> Result<()> {
    let layout = config_layout(root, file)?;
    let config = template_schema::PipelineConfig::from_layout(layout.clone())?;
    let fingerprint = sha256_file(&layout.templates_path)?;
    let schema = &config.schema;

    let roots: Vec<RootInfo> = config
        .roots
        .iter()
        .map(|(name, root)| RootInfo {
            name: name.to_string(),
            linux_path: root.linux_path.clone(),
            mac_path: root.mac_path.clone(),
            windows_path: root.windows_path.clone(),
        })
        .collect();

    let snapshot = ConfigInfoSnapshot {
        name: infer_config_name(&layout.root),
        root: layout.root.display().to_string(),
        templates_file: layout.templates_path_relative_string(),
        templates_sha256: fingerprint,
        roots_file: layout.roots_path.display().to_string(),
        keys: schema.keys().count(),
        paths: schema.paths().count(),
        strings: schema.strings().count(),
        roots,
        default_root: config.roots.default_name().map(str::to_string),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Pipeline Configuration Info");
    println!("===========================");
    println!("Name: {}", snapshot.name);
    println!("Root: {}", snapshot.root);
    println!("Templates file: {}", snapshot.templates_file);
    println!("Templates SHA-256: {}", snapshot.templates_sha256);
    println!();

    println!("Files:");
    print_file_status("Templates", &layout.templates_path);
    print_file_status("Storage roots", &layout.roots_path);
    println!();

    println!("Keys: {}", snapshot.keys);
    println!("Path templates: {}", snapshot.paths);
    println!("String templates: {}", snapshot.strings);

    if !snapshot.roots.is_empty() {
        println!("\nStorage roots:");
        for root in &snapshot.roots {
            let marker = if snapshot.default_root.as_deref() == Some(root.name.as_str()) {
                " (default)"
            } else {
                ""
            };
            println!("- {}{}", root.name, marker);
            for (label, path) in [
                ("linux", &root.linux_path),
                ("mac", &root.mac_path),
                ("windows", &root.windows_path),
            ] {
                if let Some(path) = path {
                    println!("    {label}: {path}");
                }
            }
        }
    }

    Ok(())
}
