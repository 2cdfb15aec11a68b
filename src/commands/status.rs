use anyhow::Result;
use calblock_core::clock::{Clock, SystemClock};
use calblock_core::config::BlockConfig;
use calblock_core::reconcile::Reconciler;

use crate::render::Render;
use crate::utils::tui;

pub async fn run(config: BlockConfig) -> Result<()> {
    let provider = super::provider_for(&config)?;
    let reconciler = Reconciler::new(&provider, config);

    let spinner = tui::create_spinner("Checking calendars".to_string());
    let result = reconciler.plan(SystemClock.now()).await;
    spinner.finish_and_clear();

    let plan = result?;
    println!("{}", plan.render());

    if !plan.is_empty() {
        println!("\nRun `calblock sync` to apply.");
    }

    Ok(())
}
