use anyhow::{Result, bail};
use console::{Term, style};
use gif_preview::component::{PreviewOrchestrator, PreviewOutcome};
use gif_preview::config::Config;
use gif_preview::init;
use gif_preview::menu::show_main_menu;
use gif_preview::signal::setup_shutdown_signal;
use log::{info, warn};
use rust_i18n::t;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en-US");

fn main() -> ExitCode {
    init::init();
    let shutdown_signal = setup_shutdown_signal();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let result = match args.as_slice() {
        [] => run_menu(&shutdown_signal),
        [input, output] => run_once(Path::new(input), Path::new(output), &shutdown_signal),
        _ => {
            eprintln!("Usage: gif_preview [<input video> <output gif>]");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run_once(input: &Path, output: &Path, shutdown_signal: &Arc<AtomicBool>) -> Result<()> {
    let config = Config::new()?;
    rust_i18n::set_locale(config.settings.language.as_str());
    let orchestrator = PreviewOrchestrator::with_external_tools(
        config.settings.preview,
        Arc::clone(shutdown_signal),
    );

    match orchestrator.generate_preview(input, output) {
        Ok(PreviewOutcome::Generated { cuts }) => {
            println!(
                "{}",
                t!("preview.created", cuts = cuts, path = output.display())
            );
            Ok(())
        }
        Ok(PreviewOutcome::AlreadyExists) => {
            println!("{}", t!("preview.exists", path = output.display()));
            Ok(())
        }
        Err(e) => bail!(e),
    }
}

fn run_menu(shutdown_signal: &Arc<AtomicBool>) -> Result<()> {
    let term = Term::stdout();
    let mut config = Config::new()?;
    rust_i18n::set_locale(config.settings.language.as_str());

    loop {
        match show_main_menu(&term, shutdown_signal, &mut config) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
                info!("Program exited normally");
                return Ok(());
            }
            Err(e) => {
                warn!("Program error: {e}");
                return Err(e);
            }
        }
    }
}
