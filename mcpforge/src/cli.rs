//! Command line interface.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use mcpforge_mcp::{serve, ArtifactToolset, McpServer, ServerMode, DEFAULT_HTTP_ADDR};
use mcpforge_tools::AugmentFailurePolicy;
use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::{GeneratorConfig, OpenAiConfig, DEFAULT_OPENAI_MODEL};
use crate::generator::{generate_server, OutputTarget};
use crate::templates::ServerManifest;
use crate::walker::CollisionPolicy;

/// Top-level command line.
#[derive(Debug, Parser)]
#[command(name = "mcpforge")]
#[command(about = "Compile Postman collections into MCP servers")]
#[command(version, args_override_self = true)]
pub struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate an MCP server from a collection
    #[command(args_override_self = true)]
    Generate(GenerateArgs),
    /// Serve a generated MCP server
    #[command(args_override_self = true)]
    Serve(ServeArgs),
}

/// Arguments of `generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Postman collection (v2.x JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Zip archive to write
    #[arg(short, long, default_value = "mcp-server.zip", conflicts_with = "out_dir")]
    pub output: PathBuf,

    /// Write the server unpacked into this directory instead of a zip
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Transport of the generated server (asked interactively when omitted)
    #[arg(short, long, value_parser = parse_mode)]
    pub mode: Option<ServerMode>,

    /// OpenAI API key used to name undocumented requests
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_key: Option<String>,

    /// OpenAI model
    #[arg(long, default_value = DEFAULT_OPENAI_MODEL)]
    pub openai_model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    /// What to do when two requests get the same tool name
    #[arg(long, default_value = "overwrite")]
    pub collision: CollisionPolicy,

    /// Fall back to local naming when the OpenAI call fails
    #[arg(long)]
    pub augment_fallback: bool,
}

/// Arguments of `serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Generated server directory
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Transport (defaults to the mode in mcp-server.json)
    #[arg(short, long, value_parser = parse_mode)]
    pub mode: Option<ServerMode>,

    /// Address for HTTP transports
    #[arg(long, default_value = DEFAULT_HTTP_ADDR)]
    pub addr: SocketAddr,
}

fn parse_mode(s: &str) -> Result<ServerMode, String> {
    s.parse().map_err(|e: mcpforge_mcp::McpError| e.to_string())
}

impl GenerateArgs {
    /// Build the generator configuration.
    pub fn config(&self, mode: ServerMode) -> GeneratorConfig {
        let mut config = GeneratorConfig::new()
            .with_server_mode(mode)
            .with_collision_policy(self.collision);
        if self.augment_fallback {
            config = config.with_augment_failure(AugmentFailurePolicy::Fallback);
        }
        if let Some(key) = self.openai_key.as_deref().filter(|k| !k.trim().is_empty()) {
            let mut openai = OpenAiConfig::new(key).with_model(&self.openai_model);
            if let Some(url) = &self.openai_base_url {
                openai = openai.with_base_url(url);
            }
            config = config.with_augment(openai);
        }
        config
    }

    /// Where the server goes.
    pub fn target(&self) -> OutputTarget {
        match &self.out_dir {
            Some(dir) => OutputTarget::Directory(dir.clone()),
            None => OutputTarget::Zip(self.output.clone()),
        }
    }
}

/// Install the tracing subscriber.
///
/// Logs go to stderr so the stdio transport keeps stdout to itself.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Run the parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::Serve(args) => run_serve(args).await,
    }
}

async fn run_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mode = match args.mode {
        Some(mode) => mode,
        None => select_mode()?,
    };
    let config = args.config(mode);
    if config.augment.is_some() {
        tracing::info!(model = %args.openai_model, "Naming augmentation enabled");
    }

    let report = generate_server(&args.input, &args.target(), config)
        .await
        .with_context(|| format!("Generation from '{}' failed", args.input.display()))?;

    tracing::info!(
        server = %report.server_name,
        tools = report.tools.len(),
        output = %report.output.display(),
        "Done"
    );
    Ok(())
}

/// Ask for the server mode when attached to a terminal.
fn select_mode() -> anyhow::Result<ServerMode> {
    if !std::io::stdin().is_terminal() {
        return Ok(ServerMode::default());
    }
    let items: Vec<String> = ServerMode::ALL
        .iter()
        .map(|mode| format!("{:<15} {}", mode.as_str(), mode.description()))
        .collect();
    let selection = dialoguer::Select::new()
        .with_prompt("Select the server mode")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(ServerMode::ALL[selection])
}

async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    let (manifest, server) = load_server(&args.dir, std::env::vars())?;
    let mode = args.mode.unwrap_or(manifest.mode);
    serve(Arc::new(server), mode, args.addr).await?;
    Ok(())
}

/// Build the server described by the manifest in `dir`.
fn load_server(
    dir: &Path,
    variables: impl IntoIterator<Item = (String, String)>,
) -> anyhow::Result<(ServerManifest, McpServer)> {
    let manifest = ServerManifest::load(dir)?;
    let tools = manifest.tools_path(dir);

    let toolset = ArtifactToolset::load(&tools)
        .with_context(|| format!("Failed to load tools from '{}'", tools.display()))?
        .with_variables(variables);
    let server = toolset.register(McpServer::new(&manifest.name, &manifest.version));
    Ok((manifest, server))
}
