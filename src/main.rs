use anyhow::Context;
use area_merge::config::Command;
use area_merge::utils::{logger, monitor::SystemMonitor, validation::Validate};
use area_merge::{parse_area, AreaService, CliConfig, FileBoundaryStore, PcMilerSource};
use clap::Parser;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::info!("Starting area-merge CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = cli.merge_config().context("failed to load configuration")?;
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let mut source = PcMilerSource::new(config.source.endpoint.clone(), config.auth_token()?);
    if let Some(timeout) = config.source.timeout_seconds {
        source = source.with_timeout(Duration::from_secs(timeout));
    }
    let store = FileBoundaryStore::new(config.store.path.clone());
    let service = AreaService::new(source, store, config.settings());

    let monitor = SystemMonitor::new(cli.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    match &cli.command {
        Command::Merge { area } => {
            let json = std::fs::read_to_string(area)
                .with_context(|| format!("failed to read area file {}", area.display()))?;
            let spec = parse_area(&json).context("failed to parse area file")?;

            monitor.log_phase("before merge");
            let record = service.merge_area(&spec).await;
            monitor.log_phase("after merge");

            match record {
                Some(record) => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                    if let Some(message) = &record.error_message {
                        eprintln!("❌ Merge finished with error: {}", message);
                        std::process::exit(2);
                    }
                }
                None => println!("Area {} has no include selectors, boundary removed", spec.id),
            }
        }
        Command::Show { area_id } => match service.get_record(*area_id).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => {
                eprintln!("No boundary stored for area {}", area_id);
                std::process::exit(1);
            }
        },
        Command::Delete { area_id } => {
            service.delete_area(*area_id).await?;
            println!("🗑️ Boundary for area {} removed", area_id);
        }
    }

    Ok(())
}
