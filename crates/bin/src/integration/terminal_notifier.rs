//! Prints fetch advisories to the terminal.

use indicatif::ProgressBar;
use std::io::{self, Write};
use volregime_data::{Advisory, Notifier, NotifyError};

/// Writes advisories to stderr, pausing the spinner so lines stay intact.
#[derive(Debug, Clone, Default)]
pub(crate) struct TerminalNotifier {
    progress: Option<ProgressBar>,
}

impl TerminalNotifier {
    /// Notifier that suspends `progress` while it writes.
    pub(crate) const fn with_progress(progress: ProgressBar) -> Self {
        Self {
            progress: Some(progress),
        }
    }

    fn write(advisory: &Advisory) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{advisory}")?;
        stderr.flush()
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, advisory: &Advisory) -> Result<(), NotifyError> {
        match &self.progress {
            Some(pb) => pb.suspend(|| Self::write(advisory))?,
            None => Self::write(advisory)?,
        }
        Ok(())
    }
}
