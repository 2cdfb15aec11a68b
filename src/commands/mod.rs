pub mod config;
pub mod status;
pub mod sync;

use anyhow::Result;
use calblock_core::config::BlockConfig;
use calblock_core::provider::Provider;

/// The provider configured for this run, with its call timeout applied.
fn provider_for(config: &BlockConfig) -> Result<Provider> {
    Ok(Provider::new(&config.provider, config.provider_timeout()?))
}
