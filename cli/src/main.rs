//! CLI entrypoint for toolrelay
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use toolrelay_application::{
    EmbeddingPort, EmbeddingToolRanker, ExecutionParams, LlmGateway, RunTurnInput, RunTurnUseCase,
    ToolDiscoveryPort, ToolExecutorPort, ToolSelector,
};
use toolrelay_domain::{ConversationTurn, ToolArguments, ToolContext, ToolInvocation};
use toolrelay_infrastructure::config::{FileLoggingConfig, Severity};
use toolrelay_infrastructure::tools::PathSandbox;
use toolrelay_infrastructure::{
    ConfigLoader, DescriptorSource, DiscoveryBackend, ExecutorBackend, FileConfig,
    HttpEmbeddingClient, JsonSchemaToolConverter, JsonlConversationLogger, LocalToolExecutor,
    OpenAiGateway, RetryConfig, ToolRegistry, ToolServerClient, default_registry,
};
use toolrelay_presentation::{Cli, Command, ConsoleFormatter, ToolsCommand, ToolserverCommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    let _guard = init_logging(cli.verbose, &config.logging)?;
    info!("Starting toolrelay");

    for issue in config.validate() {
        match issue.severity {
            Severity::Error => eprintln!("config {}", issue),
            Severity::Warning => warn!(issue = %issue.message, "Configuration warning"),
        }
    }

    match cli.command {
        Command::Config => show_config(cli.config.as_deref(), cli.no_config, &config),
        Command::Tools { command } => run_tools(command, &config).await,
        Command::Toolserver { command } => run_toolserver(command, &config).await,
        Command::Ask {
            message,
            conversation,
            force_refresh,
            trace,
            json,
        } => {
            let conversation_id = conversation.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            ask(&config, conversation_id, message, force_refresh, trace, json).await
        }
    }
}

/// Console logging from `RUST_LOG` or the `-v` count, plus an optional daily file.
fn init_logging(verbose: u8, logging: &FileLoggingConfig) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match &logging.file_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "toolrelay.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .ok();

    Ok(guard)
}

// ==================== Wiring ====================

fn build_registry(config: &FileConfig) -> ToolRegistry {
    let sandbox = Arc::new(match &config.tools.sandbox_root {
        Some(root) => PathSandbox::new(root),
        None => PathSandbox::unconfigured(),
    });
    let source = match &config.tools.definitions_dir {
        Some(dir) => DescriptorSource::Directory(dir.clone()),
        None => DescriptorSource::Embedded,
    };
    default_registry(sandbox, source)
}

fn toolserver(config: &FileConfig) -> Result<ToolServerClient> {
    let Some(url) = config.toolserver_url() else {
        bail!("toolserver.base_url must be set to use the tool server");
    };
    Ok(ToolServerClient::with_timeout(url, config.toolserver.timeout())?)
}

fn build_discovery(
    config: &FileConfig,
    registry: &ToolRegistry,
) -> Result<Option<Arc<dyn ToolDiscoveryPort>>> {
    match config.tools.parse_discovery().0 {
        DiscoveryBackend::None => Ok(None),
        DiscoveryBackend::ToolServer => {
            let client: Arc<dyn ToolDiscoveryPort> = Arc::new(toolserver(config)?);
            Ok(Some(client))
        }
        DiscoveryBackend::Embedding => {
            let mut ranker = EmbeddingToolRanker::new(registry.catalog());
            if config.embedding.enabled {
                let embedder: Arc<dyn EmbeddingPort> = Arc::new(
                    HttpEmbeddingClient::new(config.embedding_base_url(), &config.embedding.model)?
                        .with_api_key(config.embedding_api_key()),
                );
                ranker = ranker.with_embedder(embedder);
            }
            let ranker: Arc<dyn ToolDiscoveryPort> = Arc::new(ranker);
            Ok(Some(ranker))
        }
    }
}

fn build_selector(
    config: &FileConfig,
    registry: &ToolRegistry,
    params: ExecutionParams,
) -> Result<ToolSelector> {
    let mut selector = ToolSelector::new(registry.catalog(), params);
    if let Some(discovery) = build_discovery(config, registry)? {
        selector = selector.with_discovery(discovery);
    }
    Ok(selector)
}

fn build_executor(config: &FileConfig, registry: &ToolRegistry) -> Result<Arc<dyn ToolExecutorPort>> {
    let executor: Arc<dyn ToolExecutorPort> = match config.tools.parse_executor().0 {
        ExecutorBackend::Local => Arc::new(LocalToolExecutor::new(registry.clone())),
        ExecutorBackend::ToolServer => Arc::new(toolserver(config)?),
    };
    Ok(executor)
}

fn build_gateway(config: &FileConfig) -> Result<Arc<dyn LlmGateway>> {
    let model = &config.model;
    let gateway = OpenAiGateway::new(&model.base_url, &model.model)?
        .with_api_key(model.api_key.clone())
        .with_timeout(model.timeout())?
        .with_retry(RetryConfig::default().with_max_attempts(model.max_attempts));
    Ok(Arc::new(gateway))
}

// ==================== Commands ====================

async fn ask(
    config: &FileConfig,
    conversation_id: String,
    message: String,
    force_refresh: bool,
    show_trace: bool,
    json: bool,
) -> Result<()> {
    let registry = build_registry(config);
    let params = config.execution_params();
    let selector = Arc::new(build_selector(config, &registry, params.clone())?);

    let mut use_case = RunTurnUseCase::new(
        build_gateway(config)?,
        selector,
        build_executor(config, &registry)?,
        Arc::new(JsonSchemaToolConverter),
        params,
    );
    if let Some(path) = &config.logging.conversation_log {
        let logger = JsonlConversationLogger::open(path)
            .with_context(|| format!("opening conversation log {}", path.display()))?;
        use_case = use_case.with_conversation_logger(Arc::new(logger));
    }

    let input = RunTurnInput::new(conversation_id, vec![ConversationTurn::user(message)])
        .with_force_refresh(force_refresh);
    let output = use_case.execute(input).await?;

    if json {
        let value = serde_json::json!({
            "text": output.text,
            "trace": output.trace,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", ConsoleFormatter::format_answer(&output.text));
    if show_trace {
        println!("{}", ConsoleFormatter::format_trace(&output.trace));
    }
    Ok(())
}

async fn run_tools(command: ToolsCommand, config: &FileConfig) -> Result<()> {
    let registry = build_registry(config);

    match command {
        ToolsCommand::List => {
            let stats = registry.stats();
            println!("{}", ConsoleFormatter::format_catalog(&registry.catalog()));
            println!(
                "{} modules, {} callables, {} descriptions",
                stats.modules, stats.callables, stats.descriptors
            );
            for name in &stats.callables_without_descriptor {
                println!("  undescribed callable: {}", name);
            }
            for name in &stats.descriptors_without_callable {
                println!("  description without implementation: {}", name);
            }
            for module in stats
                .skipped_modules
                .iter()
                .chain(&stats.modules_without_descriptions)
            {
                println!("  incomplete module: {}", module);
            }
        }
        ToolsCommand::Select { message, k } => {
            let selector = build_selector(config, &registry, config.execution_params())?;
            let conversation = vec![ConversationTurn::user(message)];
            let selection = selector.select("cli", &conversation, k, true).await;
            println!("{}", ConsoleFormatter::format_selection(&selection));
        }
        ToolsCommand::Exec { name, args } => {
            let arguments: ToolArguments = serde_json::from_str(&args)
                .with_context(|| format!("--args must be a JSON object, got {}", args))?;
            let executor = LocalToolExecutor::new(registry);
            let result = executor
                .execute(&ToolInvocation::new(name, arguments), &ToolContext::new())
                .await;
            println!("{}", ConsoleFormatter::format_tool_result(&result));
            if !result.ok() {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

async fn run_toolserver(command: ToolserverCommand, config: &FileConfig) -> Result<()> {
    let client = toolserver(config)?;
    let response = match command {
        ToolserverCommand::Health => client.health().await?,
        ToolserverCommand::Config => client.server_config().await?,
        ToolserverCommand::Reload => {
            let response = client.reload_tools().await?;
            info!("Tool server reloaded its tool modules");
            response
        }
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn show_config(config_path: Option<&Path>, no_config: bool, config: &FileConfig) -> Result<()> {
    println!("Configuration sources (lowest priority first):");
    if no_config {
        println!("  (config files disabled by --no-config)");
    } else {
        for source in ConfigLoader::sources(config_path) {
            let marker = if source.found { "FOUND" } else { "     " };
            println!("  [{}] {:?}: {}", marker, source.kind, source.path.display());
        }
        println!("  [     ] Env:     {}*", toolrelay_infrastructure::config::ENV_PREFIX);
    }

    println!();
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
