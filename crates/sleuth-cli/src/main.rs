mod tasks;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sleuth_core::{App, AppBuilder, Entity, InvocationRequest, RunnerConfig, UserOption};

use crate::tasks::BUILTIN_TASKS;

/// sleuth - run one task against one entity and deliver the result
#[derive(Parser)]
#[command(name = "sleuth")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Run deadline in seconds (overrides SLEUTH_MAX_TASK_DURATION_SECS)
    #[arg(long, global = true)]
    max_duration: Option<u64>,

    /// Base directory for file delivery (overrides SLEUTH_BASEDIR)
    #[arg(long, global = true)]
    basedir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered task types
    List,

    /// Run a task against one entity
    Run {
        /// Task name, e.g. dns_forward_lookup
        task: String,

        #[arg(long)]
        entity_type: String,

        /// Value of the entity's `name` attribute
        #[arg(long)]
        name: String,

        /// User option as key=value (repeatable)
        #[arg(long = "option", value_parser = parse_option)]
        options: Vec<UserOption>,

        /// file, webhook, or anything else to discard the result
        #[arg(long, default_value = "file")]
        handler: String,

        #[arg(long)]
        hook_uri: Option<String>,

        /// Invocation id (a new ULID when omitted)
        #[arg(long)]
        id: Option<String>,
    },

    /// Run an invocation described by a JSON file
    RunJson {
        /// Path to a JSON InvocationRequest
        path: PathBuf,
    },
}

fn parse_option(raw: &str) -> Result<UserOption, String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if name.trim().is_empty() {
        return Err(format!("option name is empty in '{raw}'"));
    }
    Ok(UserOption::new(name.trim(), value))
}

/// Initialize logging with tracing
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<RunnerConfig> {
    let mut config = RunnerConfig::from_env().context("invalid environment configuration")?;
    if let Some(secs) = cli.max_duration {
        config = config.with_max_task_duration(Duration::from_secs(secs));
    }
    if let Some(dir) = &cli.basedir {
        config = config.with_base_dir(dir.clone());
    }
    Ok(config)
}

fn build_app(config: RunnerConfig) -> Result<App> {
    let names: Vec<&str> = BUILTIN_TASKS.iter().map(|c| c.name).collect();
    let app = AppBuilder::new()
        .register_all(BUILTIN_TASKS)?
        .with_config(config)
        .expect_tasks(&names)
        .build()?;
    Ok(app)
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env が無いのは普通なので無視する
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::debug!(?config, "runner configuration");
    let app = build_app(config)?;

    match cli.command {
        Commands::List => list(&app),
        Commands::Run {
            task,
            entity_type,
            name,
            options,
            handler,
            hook_uri,
            id,
        } => {
            let request = InvocationRequest {
                task_id: id.unwrap_or_else(|| ulid::Ulid::new().to_string()),
                task_name: task,
                entity: Some(Entity::named(entity_type, name)),
                options,
                handler_type: handler,
                hook_uri,
            };
            execute(&app, request).await?;
        }
        Commands::RunJson { path } => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read invocation file: {}", path.display()))?;
            let request: InvocationRequest = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse invocation file: {}", path.display()))?;
            execute(&app, request).await?;
        }
    }

    Ok(())
}

fn list(app: &App) {
    for task in app.registry.tasks() {
        let metadata = task.metadata();
        let types: Vec<&str> = metadata.allowed_types.iter().map(String::as_str).collect();
        println!("{}  [{}]", metadata.canonical_name(), types.join(", "));
        if !metadata.description.is_empty() {
            println!("    {}", metadata.description);
        }
        for spec in &metadata.allowed_options {
            println!(
                "    --option {}=<{}> ({}, default {})",
                spec.name(),
                spec.option_type(),
                spec.rule(),
                spec.default_value()
            );
        }
    }
}

async fn execute(app: &App, request: InvocationRequest) -> Result<()> {
    let report = app
        .execute(request)
        .await
        .map_err(|err| anyhow!("{err}. Run `sleuth list` to see registered tasks"))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
