//! Progress reporting hooks for long-running operations.

/// Receives progress events from the install pipeline.
///
/// The core never prints; the CLI supplies an implementation that renders
/// to the terminal, and tests pass [`NullReporter`].
pub trait Reporter: Send + Sync {
    /// A download is starting. `total` is the byte size when known.
    fn downloading(&self, _name: &str, _total: Option<u64>) {}

    /// `received` more bytes of the current download have arrived.
    fn download_progress(&self, _received: u64) {}

    /// Verifying the downloaded file against a published digest.
    fn verifying(&self, _name: &str) {}

    /// Unpacking the downloaded archive.
    fn extracting(&self, _name: &str) {}

    fn info(&self, _message: &str) {}

    fn warning(&self, _message: &str) {}
}

/// Reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}
