use anyhow::Result;
use calblock_core::clock::{Clock, SystemClock};
use calblock_core::config::BlockConfig;
use calblock_core::reconcile::Reconciler;

use crate::render::Render;
use crate::utils::tui;

pub async fn run(config: BlockConfig) -> Result<()> {
    let provider = super::provider_for(&config)?;
    let reconciler = Reconciler::new(&provider, config);

    let spinner = tui::create_spinner("Updating blocks".to_string());
    let result = reconciler.update_blocks(SystemClock.now()).await;
    spinner.finish_and_clear();

    let report = result?;
    println!("{}", report.render());

    if !report.is_unchanged() {
        println!(
            "\n{} created, {} deleted",
            report.created.len(),
            report.deleted.len()
        );
    }

    if !report.is_success() {
        anyhow::bail!(
            "{} {} failed. The next sync will retry.",
            report.failures.len(),
            if report.failures.len() == 1 { "step" } else { "steps" }
        );
    }

    Ok(())
}
