//! Structured logging utilities.
//!
//! Startup phases are reported with the `log_*` macros and timed with
//! [`OpTimer`], so a slow start shows which phase stalled.

use std::time::Instant;

/// Operation timer for measuring and logging execution duration.
///
/// # Examples
///
/// ```rust,ignore
/// use todo_api::logging::OpTimer;
///
/// let timer = OpTimer::new("database", "open");
/// let store = SqliteTaskStore::new("scheduler.db").await;
/// timer.finish_with_result(store.as_ref());
/// ```
#[derive(Debug)]
pub struct OpTimer {
    /// Component being timed (e.g., "database", "router").
    component: &'static str,
    /// Operation being performed (e.g., "open", "build").
    operation: &'static str,
    /// Start time of the operation.
    start: Instant,
}

impl OpTimer {
    /// Creates a new operation timer and logs the start.
    #[must_use]
    pub fn new(component: &'static str, operation: &'static str) -> Self {
        tracing::debug!(component, operation, "Operation started");

        Self {
            component,
            operation,
            start: Instant::now(),
        }
    }

    /// Milliseconds since the timer started.
    #[must_use]
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    /// Finishes the timer and logs the duration.
    pub fn finish(self) {
        tracing::info!(
            component = self.component,
            operation = self.operation,
            duration_ms = self.elapsed_ms(),
            "Operation completed"
        );
    }

    /// Finishes the timer, logging an error with context if `result` failed.
    pub fn finish_with_result<T, E: std::fmt::Display>(self, result: Result<&T, &E>) {
        let duration_ms = self.elapsed_ms();

        match result {
            Ok(_) => {
                tracing::info!(
                    component = self.component,
                    operation = self.operation,
                    duration_ms,
                    "Operation completed successfully"
                );
            }
            Err(e) => {
                tracing::error!(
                    component = self.component,
                    operation = self.operation,
                    duration_ms,
                    error = %e,
                    "Operation failed"
                );
            }
        }
    }
}

/// Log a numbered initialization step.
///
/// ```rust,ignore
/// log_init_step!(1, 4, "Task Store", "sqlite at scheduler.db");
/// ```
#[macro_export]
macro_rules! log_init_step {
    ($step:expr, $total:expr, $name:expr, $detail:expr) => {
        tracing::info!(
            step = $step,
            total = $total,
            "[{}/{}] {} - {}",
            $step,
            $total,
            $name,
            $detail
        );
    };
    ($step:expr, $total:expr, $name:expr) => {
        tracing::info!(step = $step, total = $total, "[{}/{}] {}", $step, $total, $name);
    };
}

/// Log a non-fatal problem found during startup.
#[macro_export]
macro_rules! log_init_warning {
    ($msg:expr) => {
        tracing::warn!("⚠️  {}", $msg);
    };
    ($msg:expr, $($arg:tt)*) => {
        tracing::warn!("⚠️  {}", format!($msg, $($arg)*));
    };
}

/// Log successful completion of a startup phase.
#[macro_export]
macro_rules! log_success {
    ($msg:expr) => {
        tracing::info!("✅ {}", $msg);
    };
    ($msg:expr, $($arg:tt)*) => {
        tracing::info!("✅ {}", format!($msg, $($arg)*));
    };
}

/// Log a startup banner.
///
/// ```rust,ignore
/// log_banner!("Todo API v0.1.0", "Store: sqlite | Auth: enabled");
/// ```
#[macro_export]
macro_rules! log_banner {
    ($title:expr) => {
        tracing::info!("───────────────────────────────────────────────");
        tracing::info!("  {}", $title);
        tracing::info!("───────────────────────────────────────────────");
    };
    ($title:expr, $subtitle:expr) => {
        tracing::info!("───────────────────────────────────────────────");
        tracing::info!("  {}", $title);
        tracing::info!("  {}", $subtitle);
        tracing::info!("───────────────────────────────────────────────");
    };
}
