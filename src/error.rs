pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("recovered from panic: {0}")]
    Panicked(String),

    #[error("queue is closed")]
    QueueClosed,

    #[error("semaphore is closed")]
    SemaphoreClosed,

    #[error("promise was dropped before completing")]
    PromiseDropped,

    #[error("task failed: {0}")]
    TaskFailed(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn panicked<S: Into<String>>(payload: S) -> Self {
        Error::Panicked(payload.into())
    }

    pub fn task_failed<S: Into<String>>(msg: S) -> Self {
        Error::TaskFailed(msg.into())
    }

    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Whether this error originated as a recovered panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, Error::Panicked(_))
    }
}
