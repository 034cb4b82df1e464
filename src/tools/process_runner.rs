//! Blocking execution of external tools.
//!
//! Every command runs without a shell. Output streams are drained on
//! background threads so a chatty child can never block on a full pipe,
//! and the caller's shutdown flag is polled while waiting so Ctrl-C kills
//! whatever is still running.

use log::{debug, warn};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Keep only the tail of stderr; ffmpeg can be very noisy on broken input.
const MAX_STDERR_BYTES: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("cannot start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} failed (code {code}): {stderr}")]
    Failed {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("{program} was terminated by shutdown request")]
    Cancelled { program: String },

    #[error("cannot wait for {program}: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },
}

impl CommandError {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Captured result of a successful command.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Run a single command to completion and capture its output.
pub fn run_command(
    mut command: Command,
    shutdown_signal: &AtomicBool,
) -> Result<CommandOutput, CommandError> {
    let program = program_name(&command);
    debug!("exec: {}", describe(&command));

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| CommandError::Spawn {
        program: program.clone(),
        source,
    })?;

    let stdout_reader = child.stdout.take().map(|s| spawn_reader(s, None));
    let stderr_reader = child
        .stderr
        .take()
        .map(|s| spawn_reader(s, Some(MAX_STDERR_BYTES)));

    let status = wait_for(&mut child, &program, shutdown_signal);
    let stdout = join_reader(stdout_reader);
    let stderr = stderr_text(&join_reader(stderr_reader));

    check_status(&program, status?, stderr.clone())?;
    Ok(CommandOutput { stdout, stderr })
}

/// Run `producer | consumer`, wiring the producer's stdout straight into the
/// consumer's stdin.
///
/// When both sides fail the producer's error is reported, since a consumer
/// fed with nothing usually fails as a consequence.
pub fn run_piped(
    mut producer: Command,
    mut consumer: Command,
    shutdown_signal: &AtomicBool,
) -> Result<(), CommandError> {
    let producer_program = program_name(&producer);
    let consumer_program = program_name(&consumer);
    debug!("exec: {} | {}", describe(&producer), describe(&consumer));

    producer
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut producer_child = producer.spawn().map_err(|source| CommandError::Spawn {
        program: producer_program.clone(),
        source,
    })?;

    let Some(pipe) = producer_child.stdout.take() else {
        terminate(&mut producer_child);
        return Err(CommandError::Io {
            program: producer_program,
            source: std::io::Error::other("stdout was not captured"),
        });
    };

    consumer
        .stdin(Stdio::from(pipe))
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    let mut consumer_child = match consumer.spawn() {
        Ok(child) => child,
        Err(source) => {
            terminate(&mut producer_child);
            return Err(CommandError::Spawn {
                program: consumer_program,
                source,
            });
        }
    };
    // The command still owns the read end of the pipe; release it so the
    // producer sees EPIPE if the consumer exits early.
    drop(consumer);

    let producer_stderr = producer_child
        .stderr
        .take()
        .map(|s| spawn_reader(s, Some(MAX_STDERR_BYTES)));
    let consumer_stderr = consumer_child
        .stderr
        .take()
        .map(|s| spawn_reader(s, Some(MAX_STDERR_BYTES)));

    let producer_status = wait_for(&mut producer_child, &producer_program, shutdown_signal);
    if producer_status.is_err() {
        terminate(&mut consumer_child);
    }
    let consumer_status = wait_for(&mut consumer_child, &consumer_program, shutdown_signal);

    let producer_stderr = stderr_text(&join_reader(producer_stderr));
    let consumer_stderr = stderr_text(&join_reader(consumer_stderr));

    check_status(&producer_program, producer_status?, producer_stderr)?;
    check_status(&consumer_program, consumer_status?, consumer_stderr)?;
    Ok(())
}

fn wait_for(
    child: &mut Child,
    program: &str,
    shutdown_signal: &AtomicBool,
) -> Result<ExitStatus, CommandError> {
    loop {
        if shutdown_signal.load(Ordering::SeqCst) {
            warn!("Terminating {program} [{}]", child.id());
            terminate(child);
            return Err(CommandError::Cancelled {
                program: program.to_string(),
            });
        }

        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                terminate(child);
                return Err(CommandError::Io {
                    program: program.to_string(),
                    source,
                });
            }
        }
    }
}

fn terminate(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn check_status(program: &str, status: ExitStatus, stderr: String) -> Result<(), CommandError> {
    if status.success() {
        return Ok(());
    }
    Err(CommandError::Failed {
        program: program.to_string(),
        code: status.code().unwrap_or(-1),
        stderr,
    })
}

fn spawn_reader<R: Read + Send + 'static>(
    mut reader: R,
    keep_tail: Option<usize>,
) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut collected = Vec::new();
        let mut chunk = [0_u8; 8192];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    collected.extend_from_slice(&chunk[..n]);
                    if let Some(limit) = keep_tail {
                        if collected.len() > limit {
                            let excess = collected.len() - limit;
                            collected.drain(..excess);
                        }
                    }
                }
            }
        }
        collected
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn stderr_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

fn program_name(command: &Command) -> String {
    command.get_program().to_string_lossy().into_owned()
}

fn describe(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
