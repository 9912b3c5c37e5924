use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use template_cli::commands::{
    info_command, list_keys_command, list_templates_command, missing_keys_command, parse_command,
    resolve_command, validate_command, ContextOptions,
};
use template_cli::init_logging;

/// Path and string template tool for a production pipeline configuration.
///
/// This CLI is a thin wrapper around `template-schema` (exposed in code as
/// `template_schema`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "template-cli",
    version,
    about = "Declare, validate and resolve pipeline templates",
    long_about = None
)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Where the configuration lives.
#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Configuration root directory. Defaults to the current working directory.
    #[arg(long, default_value = ".")]
    root: String,

    /// Templates document to use instead of `core/templates.yml`.
    #[arg(long)]
    file: Option<String>,
}

/// Values used to build the resolution context.
#[derive(Args, Debug, Clone, Default)]
struct ContextArgs {
    /// Field value as `key=value`. Repeatable.
    #[arg(long = "field", short = 'f')]
    fields: Vec<String>,

    /// Fill YYYY, MM and DD with today's date.
    #[arg(long, default_value_t = false)]
    today: bool,

    /// Entity type whose bound keys are filled from `--record`.
    #[arg(long)]
    entity: Option<String>,

    /// Entity field value as `field=value`. Repeatable, requires `--entity`.
    #[arg(long = "record")]
    record: Vec<String>,
}

impl From<ContextArgs> for ContextOptions {
    fn from(args: ContextArgs) -> Self {
        ContextOptions {
            fields: args.fields,
            today: args.today,
            entity: args.entity,
            record: args.record,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show basic information about a configuration.
    ///
    /// Reports file locations, a SHA-256 fingerprint of the templates document,
    /// declaration counts and the storage roots.
    Info {
        #[command(flatten)]
        config: ConfigArgs,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Declare the templates document and report any inconsistency.
    Validate {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// List declared keys and the implicit tokens.
    ListKeys {
        #[command(flatten)]
        config: ConfigArgs,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List declared path and string templates.
    ListTemplates {
        #[command(flatten)]
        config: ConfigArgs,

        /// Only list one kind (`path` or `string`).
        #[arg(long)]
        kind: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Resolve a template against field values.
    Resolve {
        #[command(flatten)]
        config: ConfigArgs,

        /// Template name (e.g. `unreal.movie_publish`).
        name: String,

        #[command(flatten)]
        context: ContextArgs,

        /// Join a path template onto its storage root.
        #[arg(long, default_value_t = false)]
        absolute: bool,

        /// Platform for `--absolute` (linux, mac, windows). Defaults to the current one.
        #[arg(long)]
        platform: Option<String>,
    },

    /// List the required keys a template still needs.
    Missing {
        #[command(flatten)]
        config: ConfigArgs,

        /// Template name.
        name: String,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Recover field values from a resolved path or string.
    Parse {
        #[command(flatten)]
        config: ConfigArgs,

        /// Template name.
        name: String,

        /// Resolved path or string to parse.
        input: String,

        /// Emit JSON instead of `key=value` lines.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Info { config, json } => info_command(&config.root, config.file.as_deref(), json)?,
        Command::Validate { config } => validate_command(&config.root, config.file.as_deref())?,
        Command::ListKeys { config, json } => {
            list_keys_command(&config.root, config.file.as_deref(), json)?
        }
        Command::ListTemplates { config, kind, json } => list_templates_command(
            &config.root,
            config.file.as_deref(),
            kind.as_deref(),
            json,
        )?,
        Command::Resolve { config, name, context, absolute, platform } => resolve_command(
            &config.root,
            config.file.as_deref(),
            &name,
            &context.into(),
            absolute,
            platform.as_deref(),
        )?,
        Command::Missing { config, name, context } => {
            missing_keys_command(&config.root, config.file.as_deref(), &name, &context.into())?
        }
        Command::Parse { config, name, input, json } => {
            parse_command(&config.root, config.file.as_deref(), &name, &input, json)?
        }
    }

    Ok(())
}
