// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;

/// Validate configuration and report the effective values.
pub fn run_validate(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");

    match config.validate() {
        Ok(()) => {
            log::info!("✓ Config OK");
            log::info!("    Street: {}", config.location.street);
            log::info!(
                "    Heat point: {} / Sector: {}",
                config.location.heat_point.display_name(),
                config.location.sector.display_name()
            );
            log::info!("    Source: {}", config.source.url);
            log::info!("    Interval: {} min", config.poll.interval_minutes);
            log::info!("    Publisher: {:?}", config.output.publisher);
            Ok(())
        }
        Err(e) => {
            log::error!("Config validation failed: {}", e);
            Err(e)
        }
    }
}
