use thiserror::Error;

/// Failure surface of the orchestrator. By the time one of these is
/// returned, every user-visible effect (activity entry, notification) has
/// already been applied or deliberately withheld; callers only need the
/// variant to distinguish outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// Rejected locally; no network call was made and nothing was logged to
    /// the activity history.
    #[error("{0}")]
    Validation(String),
    /// The ledger rejected the request, or it never reached it.
    #[error("{0}")]
    Request(String),
    /// The response settled after the session it was issued for had ended;
    /// its result was discarded without user-visible effect.
    #[error("session is no longer active")]
    Stale,
    #[error("not logged in")]
    NotLoggedIn,
}
