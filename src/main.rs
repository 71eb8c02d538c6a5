mod cli;

use playplan::{render, session::Session};
use pp_core::DeviceConfig;
use pp_plan::{PlanRequest, PlaybackPlanner};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "playplan=debug,pp_plan=debug,pp_core=debug".to_string()
        } else {
            "playplan=info,pp_plan=warn,pp_core=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Plan {
            session,
            seek,
            part,
            force_direct,
            force_transcode,
            no_direct_stream,
            json,
        } => {
            let mut request = PlanRequest::new()
                .seek_ms(seek)
                .allow_direct_stream(!no_direct_stream);
            if let Some(part) = part {
                request = request.current_part(part);
            }
            if force_direct {
                request = request.force_direct_play(true);
            } else if force_transcode {
                request = request.force_direct_play(false);
            }
            plan(&session, config_path, &request, json)
        }
        Commands::Walk { session, seek } => walk(&session, config_path, seek),
        Commands::Bif {
            session,
            offset,
            seek,
        } => bif(&session, config_path, offset, seek),
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("playplan {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_planner(session_path: &Path, config_path: Option<&Path>) -> Result<PlaybackPlanner> {
    let session = Session::load(session_path)?;
    let config = DeviceConfig::load_or_default(config_path);
    for warning in config.validate() {
        tracing::warn!("Config: {warning}");
    }
    Ok(session.planner(config))
}

fn plan(
    session_path: &Path,
    config_path: Option<&Path>,
    request: &PlanRequest,
    json: bool,
) -> Result<()> {
    let mut planner = load_planner(session_path, config_path)?;
    planner
        .build(request)
        .with_context(|| format!("no playable plan for {}", session_path.display()))?;

    if json {
        println!("{}", render::chain_json(planner.chain())?);
    } else {
        print!("{}", render::chain_text(planner.chain()));
    }
    Ok(())
}

fn walk(session_path: &Path, config_path: Option<&Path>, seek: u64) -> Result<()> {
    let mut planner = load_planner(session_path, config_path)?;
    planner
        .build(&PlanRequest::new().seek_ms(seek))
        .with_context(|| format!("no playable plan for {}", session_path.display()))?;

    let mut step = 1;
    loop {
        let active = planner
            .active()
            .context("chain lost its active part while walking")?;
        println!("Step {step}:");
        print!("{}", render::descriptor_text(active));
        if !planner.has_more_parts() {
            break;
        }
        planner.advance();
        step += 1;
    }

    println!("\nEnd of chain after {step} part(s)");
    Ok(())
}

fn bif(session_path: &Path, config_path: Option<&Path>, offset: u64, seek: u64) -> Result<()> {
    let mut planner = load_planner(session_path, config_path)?;
    planner
        .build(&PlanRequest::new().seek_ms(seek))
        .with_context(|| format!("no playable plan for {}", session_path.display()))?;

    match planner.timeline_thumbnail_url(offset) {
        Some(url) => {
            println!("{url}");
            Ok(())
        }
        None => anyhow::bail!("Active part has no timeline index"),
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let contents = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read config {}", p.display()))?;
            DeviceConfig::from_json(&contents)?
        }
        None => {
            println!("No config file specified, using defaults");
            DeviceConfig::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        println!("Configuration has {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }
    println!("  Transcode format: {}", config.preferences.transcode_format);
    println!("  Quality tiers: {}", config.quality.tiers.len());
    println!(
        "  Audio codecs: {}",
        config
            .device
            .audio_codecs
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}
