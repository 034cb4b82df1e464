use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Flag flipped by Ctrl-C. Running external tools are killed when it is set.
#[must_use]
pub fn setup_shutdown_signal() -> Arc<AtomicBool> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    ctrlc::set_handler(move || {
        signal_clone.store(true, Ordering::SeqCst);
        eprintln!("\nInterrupt received, cleaning up...");
    })
    .expect("Failed to install Ctrl-C handler");

    shutdown_signal
}
