// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! mini-agent CLI entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::sync::Mutex;
use tracing::debug;

use mini_agent::agent::{Agent, AgentConfig};
use mini_agent::config::{load_config, CliOptions, Config};
use mini_agent::error::Result;
use mini_agent::mcp::McpLifecycle;
use mini_agent::providers::{create_provider, ProviderType};
use mini_agent::telemetry::{init_telemetry, TelemetryConfig};
use mini_agent::tools::ToolRegistryBuilder;
use mini_agent::types::ProviderConfig;

#[derive(Parser)]
#[command(name = "mini-agent", version, about = "A compact tool-using agent")]
struct Cli {
    /// Prompt to run non-interactively.
    #[arg(short = 'P', long)]
    prompt: Option<String>,

    /// Provider to use (e.g. "anthropic").
    #[arg(long)]
    provider: Option<String>,

    /// Model identifier override.
    #[arg(long)]
    model: Option<String>,

    /// API base URL override.
    #[arg(long)]
    base_url: Option<String>,

    /// Path to the MCP server configuration file.
    #[arg(long)]
    mcp_config: Option<PathBuf>,

    /// Disable all tools (plain chat).
    #[arg(long)]
    no_tools: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved configuration.
    Config,
    /// Write a starter workspace config file.
    Init,
    /// Print version information.
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let telemetry = if cli.verbose {
        TelemetryConfig::verbose()
    } else {
        TelemetryConfig::default()
    };
    init_telemetry(&telemetry);

    let workspace = std::env::current_dir()?;
    let config = load_config(
        &workspace,
        CliOptions {
            provider: cli.provider,
            model: cli.model,
            base_url: cli.base_url,
            mcp_config: cli.mcp_config,
            no_tools: cli.no_tools,
        },
    )?;

    match cli.command {
        Some(Commands::Config) => {
            println!("provider:    {}", config.provider);
            println!("model:       {}", config.model.as_deref().unwrap_or("(provider default)"));
            println!("base_url:    {}", config.base_url.as_deref().unwrap_or("(provider default)"));
            println!("api_key:     {}", if config.api_key.is_some() { "(configured)" } else { "(from environment)" });
            println!("max_tokens:  {}", config.max_tokens);
            println!("mcp_config:  {}", config.mcp_config.display());
            println!("no_tools:    {}", config.no_tools);
            Ok(())
        }
        Some(Commands::Init) => init_workspace_config(&workspace),
        Some(Commands::Version) => {
            println!("mini-agent {}", mini_agent::VERSION);
            Ok(())
        }
        None => match cli.prompt {
            Some(prompt) => run_prompt(&prompt, config).await,
            None => {
                eprintln!("No prompt given. Use -P \"...\" or see --help.");
                std::process::exit(2);
            }
        },
    }
}

fn init_workspace_config(workspace: &std::path::Path) -> Result<()> {
    let path = workspace.join("mini-agent.yaml");
    if path.exists() {
        println!("{} already exists", path.display());
        return Ok(());
    }
    std::fs::write(
        &path,
        "# mini-agent workspace configuration\n\
         provider: anthropic\n\
         # model: claude-sonnet-4-20250514\n\
         # system_prompt: You are a helpful assistant.\n\
         # mcp_config: mcp.json\n",
    )?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn run_prompt(prompt: &str, config: Config) -> Result<()> {
    let provider_type: ProviderType = config.provider.parse()?;
    let provider = create_provider(
        provider_type,
        ProviderConfig {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            max_tokens: Some(config.max_tokens),
            temperature: config.temperature,
        },
    )?;
    debug!(provider = provider.name(), model = provider.model(), "provider ready");

    // The lifecycle is a plain value owned here; the mutex exists only so
    // the interrupt task can drive teardown from its own task.
    let lifecycle = Arc::new(Mutex::new(McpLifecycle::new()));

    let mut builder = ToolRegistryBuilder::new();
    if !config.no_tools {
        builder = builder.with_defaults();
        let remote_tools = lifecycle.lock().await.load_tools(&config.mcp_config).await;
        for handler in remote_tools {
            builder = builder.register_arc(handler);
        }
    }
    let registry = Arc::new(builder.build());

    // On ctrl-c, disconnect every MCP server before exiting. This runs in a
    // different task than the one that connected; connection teardown
    // tolerates that.
    let interrupt_lifecycle = Arc::clone(&lifecycle);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{}", "Interrupted, shutting down...".yellow());
            interrupt_lifecycle.lock().await.disconnect_all().await;
            std::process::exit(130);
        }
    });

    let mut agent = Agent::new(
        provider,
        registry,
        config.system_prompt.clone(),
        AgentConfig::default(),
    );

    let result = agent.chat(prompt).await;

    lifecycle.lock().await.disconnect_all().await;

    match result {
        Ok(answer) => {
            println!("{answer}");
            Ok(())
        }
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}
