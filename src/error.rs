use {crate::source::ReadError, std::io, tokio::task::JoinError};

/// a fatal error. nothing in the dashboard recovers from one of these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// a required metric source could not be opened, read, or parsed.
    #[error("unable to read {what}: {source}")]
    Source {
        what: &'static str,
        #[source]
        source: ReadError,
    },
    /// a feed hung up before every record was delivered.
    #[error("{what} feed closed early")]
    Transport { what: &'static str },
    /// a sampling task panicked.
    #[error("sampling task failed: {0}")]
    Task(#[from] JoinError),
    /// writing to the terminal, or reading from it, failed.
    #[error("terminal i/o failed: {0}")]
    Terminal(#[from] io::Error),
}

// === impl Error ===

impl Error {
    /// returns a closure that attributes a [`ReadError`] to `what`.
    pub(crate) fn reading(what: &'static str) -> impl FnOnce(ReadError) -> Self {
        move |source| Self::Source { what, source }
    }
}
