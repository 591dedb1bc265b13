use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::error;

/// Runs a task on its own thread with a fixed delay between runs.
///
/// Cancelling signals the thread and joins it: a run already in progress
/// finishes, no further run starts.
pub struct RepeatingTimer {
    stop: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl RepeatingTimer {
    pub fn start<F>(name: &str, period: Duration, mut task: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new().name(name.to_string()).spawn(move || loop {
            match stopped.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => task(),
                // Stop requested, or the timer was dropped.
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        })?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stop the timer and wait for the thread to exit. Idempotent.
    pub fn cancel(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.stop.send(());
        if handle.join().is_err() {
            error!("timer thread panicked");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for RepeatingTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
