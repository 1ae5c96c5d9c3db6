use std::time::{Duration, Instant};

use log::{debug, info};

/// Span timing for a layout run.
///
/// - logs a begin/end banner for the run
/// - logs total run time when dropped
/// - supports sequential spans (`span()` ends the previous span)
///
/// Spans log at debug level, the banners at info level.
pub struct LayoutStopwatch {
    name: String,
    started: Instant,
    span: Option<(String, Instant)>,
}

impl LayoutStopwatch {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        info!("--------- {name} begin ---------");
        Self {
            name,
            started: Instant::now(),
            span: None,
        }
    }

    /// Starts a new span, ending any previous span.
    pub fn span(&mut self, section_name: &str) {
        self.end_span();
        self.span = Some((section_name.to_owned(), Instant::now()));
    }

    /// Ends the current span, if any.
    pub fn end_span(&mut self) {
        if let Some((section, started)) = self.span.take() {
            debug!("{section}: {}", format_elapsed(started.elapsed()));
        }
    }

    /// Time since the stopwatch was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for LayoutStopwatch {
    fn drop(&mut self) {
        // Close any open span first.
        self.end_span();
        info!(
            "---------- {} end ({}) ----------",
            self.name,
            format_elapsed(self.elapsed())
        );
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.3} ms", elapsed.as_secs_f64() * 1000.0)
}
