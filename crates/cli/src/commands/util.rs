use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Result};
use template_schema::{ConfigLayout, Context, PipelineConfig, Platform, ResolutionError};

use crate::{canonicalize_or_current, parse_field};

/// Compute the layout for `root`, honoring an explicit templates file.
pub fn config_layout(root: &str, file: Option<&str>) -> Result<ConfigLayout> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ConfigLayout::new(&root_path);
    Ok(match file {
        Some(file) => layout.with_templates_path(file),
        None => layout,
    })
}

/// Load and validate the configuration at `root` (delegates to core helper).
pub fn load_config(root: &str, file: Option<&str>) -> Result<PipelineConfig> {
    PipelineConfig::from_layout(config_layout(root, file)?)
}

/// Options that build a resolution context from the command line.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    /// `key=value` pairs.
    pub fields: Vec<String>,
    /// Fill YYYY/MM/DD with the local date.
    pub today: bool,
    /// Entity type whose bound keys are filled from `record`.
    pub entity: Option<String>,
    /// `field=value` pairs of a production-tracking record.
    pub record: Vec<String>,
}

/// Build a context: entity record first, then today's date, then explicit
/// fields, so explicit fields always win.
pub fn build_context(config: &PipelineConfig, options: &ContextOptions) -> Result<Context> {
    let mut context = Context::new();

    match (&options.entity, options.record.is_empty()) {
        (Some(entity), _) => {
            let record: BTreeMap<String, String> =
                options.record.iter().map(|raw| parse_field(raw)).collect::<Result<_>>()?;
            let filled = context.apply_entity(&config.schema, entity, &record);
            tracing::debug!(entity = %entity, filled, "applied entity record");
        }
        (None, false) => return Err(anyhow!("--record requires --entity")),
        (None, true) => {}
    }

    if options.today {
        context = context.with_date(chrono::Local::now().date_naive());
    }

    for raw in &options.fields {
        let (key, value) = parse_field(raw)?;
        context.insert(key, value);
    }
    Ok(context)
}

pub fn parse_platform(raw: Option<&str>) -> Result<Platform> {
    match raw {
        None => Ok(Platform::current()),
        Some(raw) => Platform::parse(raw)
            .ok_or_else(|| anyhow!("Invalid platform '{}'. Allowed: linux, mac, windows", raw)),
    }
}

/// Wrap a resolution failure, flagging incomplete input as missing information.
pub fn resolution_failure(template: &str, err: ResolutionError) -> anyhow::Error {
    if err.is_missing_information() {
        anyhow::Error::new(err).context(format!("Missing information to resolve '{template}'"))
    } else {
        anyhow::Error::new(err)
    }
}

/// Helper to print whether a file exists.
pub fn print_file_status(label: &str, path: &Path) {
    let exists = path.is_file();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}
