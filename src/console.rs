//! Status events printed for a human watching the run.

use std::io::Write;

use delegate_protocols::status::{StatusEvent, StatusObserver};

/// Writes one line per status event to stderr.
#[derive(Debug, Default)]
pub(crate) struct ConsoleStatusObserver;

impl ConsoleStatusObserver {
    fn render(event: &StatusEvent) -> String {
        format!(
            "{} {}",
            event.timestamp.format("%H:%M:%S%.3f"),
            event
        )
    }
}

impl StatusObserver for ConsoleStatusObserver {
    fn observe(&self, event: StatusEvent) {
        // A closed stderr must not take the session down.
        let _ = writeln!(std::io::stderr().lock(), "{}", Self::render(&event));
    }
}
