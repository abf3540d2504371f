use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use voxsense::audio::{TempClip, wav};
use voxsense::cli::{Cli, Commands};
use voxsense::config::Config;
use voxsense::defaults;
use voxsense::server::{AppState, build_router, run_server};
use voxsense::service::VoiceService;
use voxsense::translation::parse_target_list;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            serve(config, None, None).await?;
        }
        Some(Commands::Serve { host, port }) => {
            let config = load_config(cli.config.as_deref())?;
            serve(config, host, port).await?;
        }
        Some(Commands::Analyze {
            file,
            language,
            translate_to,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            analyze_file(&config, &file, &language, translate_to.as_deref()).await?;
        }
        Some(Commands::Languages) => {
            let config = load_config(cli.config.as_deref())?;
            let service = VoiceService::from_config(&config)?;
            println!("{}", serde_json::to_string_pretty(&service.languages())?);
        }
        Some(Commands::Emotions) => {
            let config = load_config(cli.config.as_deref())?;
            let service = VoiceService::from_config(&config)?;
            println!("{}", serde_json::to_string_pretty(&service.emotions())?);
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "voxsense",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => defaults::LOG_FILTER,
            1 => "voxsense=debug,tower_http=debug",
            _ => "voxsense=trace,tower_http=trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/voxsense/config.toml)
/// 3. Built-in defaults
///
/// Environment variable overrides apply on top of all three.
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path).with_context(|| format!("Failed to load config from {}", path.display()))?
    } else {
        Config::load_or_default(&Config::default_path())?
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

async fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!(version = %voxsense::version_string(), "Starting voxsense");
    tracing::info!(
        prefer_unified = config.backends.prefer_unified,
        translation = config.translation.enabled,
        use_gpu = config.backends.use_gpu,
        "Configuration loaded"
    );

    let service = VoiceService::from_config(&config)?;
    service.warm_up(config.translation.eager).await;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let router = build_router(AppState::new(service), config.server.max_upload_mb);
    run_server(router, addr).await?;
    Ok(())
}

async fn analyze_file(
    config: &Config,
    file: &Path,
    language: &str,
    translate_to: Option<&str>,
) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let temp = TempClip::store(&bytes, content_type_for(file)).await?;
    if temp.clip().is_wav() {
        match wav::probe(temp.clip().path()) {
            Ok(info) => tracing::debug!(
                sample_rate = info.sample_rate,
                channels = info.channels,
                duration_secs = info.duration_secs,
                "Input WAV"
            ),
            Err(e) => tracing::warn!(error = %e, "Input is not a readable WAV file"),
        }
    }

    let service = VoiceService::from_config(config)?;
    let targets = translate_to.map(parse_target_list).unwrap_or_default();
    let result = service
        .analyze(temp.clip().clone(), language, &targets)
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Content type implied by a file extension.
fn content_type_for(file: &Path) -> &'static str {
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("webm") => "audio/webm",
        Some("ogg") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        _ => "audio/wav",
    }
}
