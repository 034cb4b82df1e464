use crate::component::PreviewGenerator;
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_single_preview(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    let generator = PreviewGenerator::new(config.clone(), Arc::clone(shutdown_signal));

    if let Err(e) = generator.run_single() {
        eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());
    }

    pause(term)?;
    Ok(())
}

pub fn run_batch_preview(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let mut generator = PreviewGenerator::new(config.clone(), Arc::clone(shutdown_signal));

    if let Err(e) = generator.run_batch() {
        eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());
    }
    config.settings = generator.into_config().settings;

    pause(term)?;
    Ok(())
}
