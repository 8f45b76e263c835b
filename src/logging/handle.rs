use std::time::{Duration, Instant};

use tracing_appender::non_blocking::WorkerGuard;

/// Keeps the non-blocking writers alive. Dropping the guard flushes pending
/// lines, so call [`LoggingHandle::shutdown`] before the process exits.
#[derive(Debug)]
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
    flush_timeout: Duration,
    shut_down: bool,
}

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            file_guard,
            flush_timeout: Duration::from_secs(5),
            shut_down: false,
        }
    }

    pub fn with_flush_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.flush_timeout = timeout;
        self
    }

    pub fn has_file_sink(&self) -> bool {
        self.file_guard.is_some()
    }

    /// Flushes and releases the file writer.
    pub fn shutdown(mut self) {
        self.shut_down = true;
        tracing::info!(
            file_sink = self.file_guard.is_some(),
            "Shutting down logging"
        );

        let start = Instant::now();
        drop(self.file_guard.take());
        let elapsed = start.elapsed();

        if elapsed > self.flush_timeout {
            eprintln!(
                "WARNING: logging shutdown took {}ms (timeout: {}ms)",
                elapsed.as_millis(),
                self.flush_timeout.as_millis()
            );
        }
    }

    /// Same as [`shutdown`](Self::shutdown) but flushes on a blocking thread
    /// and gives up after `timeout`.
    pub async fn shutdown_async(
        mut self,
        timeout: Duration,
    ) {
        self.shut_down = true;
        let guard = self.file_guard.take();

        match tokio::time::timeout(timeout, tokio::task::spawn_blocking(move || drop(guard))).await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => eprintln!("logging shutdown task panicked: {e}"),
            Err(_) => eprintln!(
                "WARNING: logging shutdown exceeded timeout of {}ms",
                timeout.as_millis()
            ),
        }
    }
}

impl Drop for LoggingHandle {
    fn drop(&mut self) {
        if !self.shut_down && self.file_guard.is_some() {
            eprintln!(
                "WARNING: LoggingHandle dropped without shutdown(), buffered log lines may be lost"
            );
        }
    }
}
