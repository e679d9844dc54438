// crates/milady-config-cli/src/main.rs
// ============================================================================
// Module: Settings CLI Entry Point
// Description: Command dispatcher for plugin settings workflows.
// Purpose: Render, validate, edit, and save plugin settings from a terminal.
// Dependencies: clap, milady-config-cli, milady-config-core, milady-config-ui, tokio
// ============================================================================

//! ## Overview
//! `milady-settings` drives the config engine as a host would. Documents come
//! from a local JSON file (`--document`) or the agent API (`--plugin`).
//! Rendered trees and backend payloads are written to stdout as JSON; engine
//! events go to the sink selected in the `[log]` config section.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use milady_config_cli::BackendClient;
use milady_config_cli::BackendClientConfig;
use milady_config_cli::BackendError;
use milady_config_cli::BackendRevealer;
use milady_config_cli::CliConfig;
use milady_config_cli::CliConfigError;
use milady_config_cli::LogSinkKind;
use milady_config_cli::PluginConfigDocument;
use milady_config_cli::SessionError;
use milady_config_cli::SessionOptions;
use milady_config_cli::SettingsSession;
use milady_config_core::ConfigSchema;
use milady_config_core::EngineEventSink;
use milady_config_core::FileEventSink;
use milady_config_core::NoopEventSink;
use milady_config_core::StderrEventSink;
use milady_config_core::UiHints;
use milady_config_ui::FieldRegistry;
use milady_config_ui::FieldRenderProps;
use milady_config_ui::render_field;
use milady_config_ui::standard_registry;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "milady-settings", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (overrides `MILADY_SETTINGS_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a plugin's settings form as JSON.
    Render(RenderCommand),
    /// Validate a plugin's values; exits non-zero when invalid.
    Validate(DocumentArgs),
    /// Describe the field catalog, or a document's resolved fields.
    Catalog(CatalogCommand),
    /// List plugins from the backend.
    Plugins,
    /// Fetch a plugin's config document from the backend.
    Fetch(FetchCommand),
    /// Set values and save them through the backend.
    Set(SetCommand),
    /// Reveal a stored secret and render its field.
    Reveal(RevealCommand),
}

/// Where a plugin config document comes from.
#[derive(Args, Debug)]
struct DocumentArgs {
    /// Local JSON document path.
    #[arg(long, value_name = "FILE", conflicts_with = "plugin")]
    document: Option<PathBuf>,
    /// Plugin id fetched from the backend.
    #[arg(long, value_name = "ID")]
    plugin: Option<String>,
}

/// Arguments for `render`.
#[derive(Args, Debug)]
struct RenderCommand {
    /// Document source.
    #[command(flatten)]
    source: DocumentArgs,
    /// Run a full validation pass before rendering.
    #[arg(long)]
    validate: bool,
}

/// Arguments for `catalog`.
#[derive(Args, Debug)]
struct CatalogCommand {
    /// Local JSON document whose fields are described.
    #[arg(long, value_name = "FILE")]
    document: Option<PathBuf>,
}

/// Arguments for `fetch`.
#[derive(Args, Debug)]
struct FetchCommand {
    /// Plugin id.
    plugin: String,
}

/// Arguments for `set`.
#[derive(Args, Debug)]
struct SetCommand {
    /// Plugin id.
    plugin: String,
    /// Assignments as `key=value`.
    #[arg(required = true, value_name = "KEY=VALUE")]
    assignments: Vec<String>,
    /// Validate and print the values without saving.
    #[arg(long)]
    dry_run: bool,
}

/// Arguments for `reveal`.
#[derive(Args, Debug)]
struct RevealCommand {
    /// Plugin id.
    plugin: String,
    /// Secret field key.
    key: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failures.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration failed to load.
    #[error(transparent)]
    Config(#[from] CliConfigError),
    /// Backend request failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// Session failure.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Invalid command input.
    #[error("{0}")]
    Input(String),
    /// Output could not be written.
    #[error("failed to write {stream}: {message}")]
    Output {
        /// Stream name.
        stream: &'static str,
        /// I/O error text.
        message: String,
    },
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    let context = Context::new(config)?;
    match cli.command {
        Commands::Render(command) => command_render(&context, command).await,
        Commands::Validate(source) => command_validate(&context, source).await,
        Commands::Catalog(command) => command_catalog(&context, &command),
        Commands::Plugins => command_plugins(&context).await,
        Commands::Fetch(command) => command_fetch(&context, &command).await,
        Commands::Set(command) => command_set(&context, &command).await,
        Commands::Reveal(command) => command_reveal(&context, &command).await,
    }
}

/// Shared state for command handlers.
struct Context {
    /// Loaded configuration.
    config: CliConfig,
    /// Field registry shared by sessions.
    registry: Arc<FieldRegistry>,
    /// Engine event sink from `[log]`.
    sink: Arc<dyn EngineEventSink>,
}

impl Context {
    /// Builds the registry and event sink.
    fn new(config: CliConfig) -> CliResult<Self> {
        let sink: Arc<dyn EngineEventSink> = match (config.log.sink, &config.log.path) {
            (LogSinkKind::File, Some(path)) => {
                let sink = FileEventSink::new(path).map_err(|err| {
                    CliError::Input(format!("failed to open log file {}: {err}", path.display()))
                })?;
                Arc::new(sink)
            }
            (LogSinkKind::None, _) => Arc::new(NoopEventSink),
            _ => Arc::new(StderrEventSink),
        };
        Ok(Self {
            config,
            registry: Arc::new(standard_registry()),
            sink,
        })
    }

    /// Builds a backend client from `[backend]`.
    fn client(&self) -> CliResult<BackendClient> {
        Ok(BackendClient::new(BackendClientConfig::from_config(&self.config.backend))?)
    }

    /// Session options from `[render]`.
    const fn options(&self, can_reveal: bool) -> SessionOptions {
        SessionOptions {
            show_advanced: self.config.render.show_advanced,
            suppress_error_summary: self.config.render.suppress_error_summary,
            can_reveal,
        }
    }

    /// Opens a session over a document.
    fn session(&self, document: PluginConfigDocument, can_reveal: bool) -> SettingsSession {
        SettingsSession::open(
            document,
            Arc::clone(&self.registry),
            Arc::clone(&self.sink),
            self.options(can_reveal),
        )
    }

    /// Loads a document from a file or the backend.
    async fn document(&self, source: DocumentArgs) -> CliResult<PluginConfigDocument> {
        match (source.document, source.plugin) {
            (Some(path), _) => Ok(self.document_file(&path)?),
            (None, Some(plugin)) => Ok(self.client()?.get_config(&plugin).await?),
            (None, None) => Err(CliError::Input("pass --document or --plugin".to_string())),
        }
    }

    /// Loads a local document under the configured size limit.
    fn document_file(&self, path: &std::path::Path) -> CliResult<PluginConfigDocument> {
        milady_config_cli::config::validate_path(path)?;
        Ok(PluginConfigDocument::from_file(path, self.config.limits.max_document_bytes)?)
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `render`.
async fn command_render(context: &Context, command: RenderCommand) -> CliResult<ExitCode> {
    let document = context.document(command.source).await?;
    let mut session = context.session(document, false);
    if command.validate {
        let _ = session.invalid_fields();
    }
    write_json(&session.render())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `validate`.
async fn command_validate(context: &Context, source: DocumentArgs) -> CliResult<ExitCode> {
    let document = context.document(source).await?;
    let mut session = context.session(document, false);
    let invalid = session.invalid_fields();
    if invalid.is_empty() {
        write_stdout_line("ok")?;
        return Ok(ExitCode::SUCCESS);
    }
    for key in &invalid {
        for message in session.renderer().errors_for(key) {
            write_stdout_line(&format!("{key}: {message}"))?;
        }
    }
    Ok(ExitCode::FAILURE)
}

/// Executes `catalog`.
fn command_catalog(context: &Context, command: &CatalogCommand) -> CliResult<ExitCode> {
    let catalog = context.registry.catalog();
    let Some(path) = &command.document else {
        write_stdout_line(catalog.prompt().trim_end())?;
        return Ok(ExitCode::SUCCESS);
    };
    let document = context.document_file(path)?;
    let (schema, _) = ConfigSchema::parse_lenient(&document.schema)
        .map_err(|err| CliError::Input(format!("schema is unusable: {err}")))?;
    let (hints, _) = UiHints::from_value(&document.merged_hints());
    write_stdout_line(catalog.describe_schema(&schema, &hints).trim_end())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `plugins`.
async fn command_plugins(context: &Context) -> CliResult<ExitCode> {
    let plugins = context.client()?.list_plugins().await?;
    write_json(&plugins)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `fetch`.
async fn command_fetch(context: &Context, command: &FetchCommand) -> CliResult<ExitCode> {
    let document = context.client()?.get_config(&command.plugin).await?;
    write_json(&document)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `set`.
async fn command_set(context: &Context, command: &SetCommand) -> CliResult<ExitCode> {
    let client = context.client()?;
    let document = client.get_config(&command.plugin).await?;
    let mut session = context.session(document, false);
    for assignment in &command.assignments {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| CliError::Input(format!("expected KEY=VALUE, got {assignment}")))?;
        session.set_text(key.trim(), raw)?;
    }
    if command.dry_run {
        let invalid = session.invalid_fields();
        write_json(session.values())?;
        return Ok(if invalid.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }
    let changed = session.dirty_keys().len();
    session.save(&client).await?;
    write_stdout_line(&format!("saved {changed} field(s) for {}", command.plugin))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `reveal`.
async fn command_reveal(context: &Context, command: &RevealCommand) -> CliResult<ExitCode> {
    let client = context.client()?;
    let document = client.get_config(&command.plugin).await?;
    let mut session = context.session(document, true);
    let revealer = BackendRevealer::new(&client);
    if !session.renderer_mut().reveal(&command.key, &revealer).await {
        write_stdout_line("nothing to reveal")?;
        return Ok(ExitCode::FAILURE);
    }
    let renderer = session.renderer();
    let field = renderer
        .field(&command.key)
        .ok_or_else(|| CliError::Input(format!("unknown field: {}", command.key)))?;
    let ui = renderer.ui_state(&command.key).cloned().unwrap_or_default();
    let props = FieldRenderProps {
        plugin_id: renderer.plugin_id(),
        field,
        value: session.values().get(&command.key),
        is_set: session.set_keys().contains(&command.key),
        errors: renderer.errors_for(&command.key),
        readonly: field.readonly,
        can_reveal: true,
        registry: renderer.registry(),
    };
    let node = render_field(&props, renderer.registry().renderer(field.field_type), &ui);
    write_json(&node)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::Output {
        stream: "stdout",
        message: err.to_string(),
    })
}

/// Writes pretty JSON to stdout.
fn write_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::Input(format!("failed to serialize output: {err}")))?;
    write_stdout_line(&text)
}

/// Writes an error to stderr and returns a failure code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
    ExitCode::FAILURE
}
