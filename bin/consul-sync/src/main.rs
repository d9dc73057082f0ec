use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use sync_api::ApplicationDefinition;
use sync_consul::{ConsulClient, ConsulConfig};
use sync_core::{translate, ServiceRegistrar, ServiceRegistry, SyncConfig, Synchronizer, SystemClock};
use sync_marathon::{MarathonClient, MarathonConfig};
use tracing::{error, info};

mod config;
mod logging;

use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    logging::init(config.log_format);

    if let Some(path) = &config.definition {
        return render_definition(path, &config);
    }

    let app_id = config
        .app_id
        .clone()
        .context("an application id is required")?;

    info!("Starting consul-sync for {}...", app_id);

    let source = Arc::new(MarathonClient::new(MarathonConfig {
        url: config.marathon_url(),
        timeout: config.timeout(),
    })?);

    let dry_run_registry = ServiceRegistry::new();
    let registrar: Arc<dyn ServiceRegistrar> = if config.dry_run {
        info!("Dry run: registrations are printed, Consul is left untouched");
        Arc::new(dry_run_registry.clone())
    } else {
        Arc::new(ConsulClient::new(ConsulConfig {
            url: config.consul_url(),
            token: config.consul_token.clone(),
            timeout: config.timeout(),
        })?)
    };

    let sync = Synchronizer::new(
        source,
        registrar,
        SyncConfig {
            app_id,
            port_overrides: config.port_overrides(),
        },
    );

    if config.once {
        sync.sync_once().await?;
        if config.dry_run {
            print_registrations(&dry_run_registry).await?;
        }
        return Ok(());
    }

    // Periodic synchronization loop
    loop {
        match sync.sync_once().await {
            Ok(_) => {
                if config.dry_run {
                    print_registrations(&dry_run_registry).await?;
                }
            }
            Err(e) => {
                error!("Error synchronizing services: {}", e);
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(config.interval()) => {}
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("Shutdown signal received, deregistering services...");
                break;
            }
        }
    }

    if let Err(e) = sync.deregister_all().await {
        error!("Error deregistering services: {}", e);
    }

    Ok(())
}

/// Translate a local definition file and print the registrations
fn render_definition(path: &Path, config: &Config) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    // YAML is a superset of JSON, both are accepted
    let app: ApplicationDefinition = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let translation = translate(&app, &config.port_overrides(), &SystemClock)?;
    info!(
        "{} translated into {} registrations ({} warnings)",
        app.id,
        translation.registrations.len(),
        translation.warnings.len()
    );

    println!("{}", serde_json::to_string_pretty(&translation.registrations)?);
    Ok(())
}

async fn print_registrations(registry: &ServiceRegistry) -> Result<()> {
    let registrations = registry.list_services().await;
    println!("{}", serde_json::to_string_pretty(&registrations)?);
    Ok(())
}
