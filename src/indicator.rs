//! Terminal "thinking" indicator shown while a generation call is in flight.
//!
//! The indicator runs as a tokio task that redraws a spinner frame on
//! stderr and waits on a `watch` channel between frames. The wait is bounded
//! by [`TICK`], so a stop signal is observed promptly. Nothing is drawn
//! when stderr is not a terminal.

use std::io::Write;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Redraw interval and upper bound on stop latency.
pub const TICK: Duration = Duration::from_millis(100);
/// How long [`ThinkingIndicator::stop`] waits for the task to exit.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(1);

const FRAMES: [&str; 4] = ["thinking   ", "thinking.  ", "thinking.. ", "thinking..."];

pub struct ThinkingIndicator {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ThinkingIndicator {
    /// Start drawing on stderr if it is a TTY.
    pub fn start() -> Self {
        Self::spawn(atty::is(atty::Stream::Stderr))
    }

    /// Start with drawing forced on or off.
    pub fn spawn(draw: bool) -> Self {
        let (cancel, mut cancelled) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut frame = 0usize;
            loop {
                if *cancelled.borrow() {
                    break;
                }
                if draw {
                    let mut stderr = std::io::stderr().lock();
                    let _ = write!(stderr, "\r{}", FRAMES[frame % FRAMES.len()]);
                    let _ = stderr.flush();
                }
                frame += 1;

                match tokio::time::timeout(TICK, cancelled.changed()).await {
                    // signalled, or the sender is gone
                    Ok(_) => break,
                    Err(_) => continue,
                }
            }
            if draw {
                let mut stderr = std::io::stderr().lock();
                let _ = write!(stderr, "\r{}\r", " ".repeat(FRAMES[0].len()));
                let _ = stderr.flush();
            }
        });

        Self { cancel, handle }
    }

    /// Signal the task and wait (bounded) for it to finish.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        let mut handle = self.handle;
        if tokio::time::timeout(STOP_TIMEOUT, &mut handle).await.is_err() {
            tracing::debug!("thinking indicator did not stop in time, aborting");
            handle.abort();
        }
    }
}
