use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;
use shared::protocol::{
    AmountRequest, BalanceSnapshot, InvestRequest, Operation, SendRequest, TransferRequest,
    UserRequest, UsersResponse,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod activity;
pub mod error;
pub mod gateway;
pub mod notify;

pub use activity::{ActivityEntry, ActivityLog, EntryKind, ACTIVITY_LOG_CAP};
pub use error::OperationError;
pub use gateway::{Gateway, RequestError};
pub use notify::{Notification, NotificationSlot, NOTIFICATION_TTL};

/// Emitted as the client's view changes so a driver can render reactively.
/// Senders never wait on receivers; a lagging or absent subscriber is fine.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    BalanceRefreshed(BalanceSnapshot),
    ActivityRecorded(ActivityEntry),
    Notified(Notification),
    SessionEnded,
}

struct SessionState {
    identity: Option<String>,
    snapshot: Option<BalanceSnapshot>,
    /// Bumped on every login and logout. A response whose captured
    /// generation no longer matches the current one belongs to a superseded
    /// session and must not touch user-visible state.
    generation: u64,
    activity: ActivityLog,
    notifications: NotificationSlot,
}

/// Client-side view over the remote ledger service: one identity's session,
/// its last-known balance snapshot, a bounded activity history, and a
/// single-slot notification surface.
///
/// All state lives behind one async mutex and is mutated only by the
/// orchestration methods below; suspension happens only at network-call
/// boundaries, so local mutations between resumption points are atomic with
/// respect to each other.
pub struct LedgerClient {
    gateway: Gateway,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<ClientEvent>,
}

impl LedgerClient {
    pub fn new(server_url: impl Into<String>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            gateway: Gateway::new(server_url),
            inner: Mutex::new(SessionState {
                identity: None,
                snapshot: None,
                generation: 0,
                activity: ActivityLog::default(),
                notifications: NotificationSlot::default(),
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Fetches the set of identities the ledger serves. The set is fixed for
    /// the lifetime of the remote service, so callers fetch it once at
    /// startup.
    pub async fn fetch_users(&self) -> Result<Vec<String>, RequestError> {
        let response: UsersResponse = self.gateway.get_json("/api/users").await?;
        Ok(response.users)
    }

    /// Starts a session for `identity` and fetches its first balance
    /// snapshot.
    ///
    /// The session is active as soon as the identity is set, even when the
    /// initial refresh fails: the snapshot stays empty and the failure is
    /// surfaced as a notification, the same as any later refresh failure.
    pub async fn login(&self, identity: &str) -> Result<(), RequestError> {
        let generation = {
            let mut guard = self.inner.lock().await;
            guard.generation += 1;
            guard.identity = Some(identity.to_string());
            guard.snapshot = None;
            guard.activity.clear();
            let entry = guard.activity.record("Logged in", EntryKind::Info);
            let _ = self.events.send(ClientEvent::ActivityRecorded(entry));
            guard.generation
        };
        info!(user = %identity, "session started");

        self.refresh_balance_as_of(generation, identity).await
    }

    /// Ends the current session: identity, snapshot, and activity history are
    /// reset unconditionally. In-flight requests are not aborted; the
    /// generation bump makes their late reconciliation a no-op.
    pub async fn logout(&self) {
        let identity = {
            let mut guard = self.inner.lock().await;
            guard.generation += 1;
            guard.snapshot = None;
            guard.activity.clear();
            guard.identity.take()
        };
        if let Some(identity) = identity {
            info!(user = %identity, "session ended");
        }
        let _ = self.events.send(ClientEvent::SessionEnded);
    }

    pub async fn identity(&self) -> Option<String> {
        self.inner.lock().await.identity.clone()
    }

    pub async fn snapshot(&self) -> Option<BalanceSnapshot> {
        self.inner.lock().await.snapshot.clone()
    }

    /// Newest-first copy of the activity history.
    pub async fn activity(&self) -> Vec<ActivityEntry> {
        self.inner
            .lock()
            .await
            .activity
            .entries()
            .cloned()
            .collect()
    }

    /// The currently visible notification, if one has not yet expired.
    pub async fn current_notification(&self) -> Option<Notification> {
        self.inner.lock().await.notifications.current().cloned()
    }

    /// Re-fetches the balance for the active identity and replaces the
    /// snapshot wholesale. On failure the previous snapshot is left
    /// untouched.
    pub async fn refresh_balance(&self) -> Result<(), OperationError> {
        let (identity, generation) = self.session().await?;
        self.refresh_balance_as_of(generation, &identity)
            .await
            .map_err(|err| OperationError::Request(err.message))
    }

    /// Validates, submits, and reconciles one operation: the single entry
    /// point for all six money movements.
    ///
    /// Every user-visible effect happens in here, exactly once per call, in
    /// order: a validation failure surfaces as a notification and stops
    /// before the network; a settled request appends one activity entry and
    /// notification; a success additionally triggers one balance refresh. The
    /// returned error is informational for the caller.
    pub async fn submit(&self, operation: Operation) -> Result<(), OperationError> {
        let (identity, generation) = {
            let mut guard = self.inner.lock().await;
            let identity = match guard.identity.clone() {
                Some(identity) => identity,
                None => return Err(OperationError::NotLoggedIn),
            };
            if let Err(message) = validate(&operation, &identity) {
                Self::show_notification(&mut guard, &self.events, &message, EntryKind::Error);
                return Err(OperationError::Validation(message));
            }
            (identity, guard.generation)
        };

        match self.dispatch(&operation, &identity).await {
            Ok(()) => {
                let message = success_message(&operation);
                if !self
                    .reconcile(generation, &message, EntryKind::Success)
                    .await
                {
                    return Err(OperationError::Stale);
                }
                info!(user = %identity, %message, "operation completed");
                // Refresh failures notify on their own; the operation itself
                // already succeeded remotely.
                let _ = self.refresh_balance_as_of(generation, &identity).await;
                Ok(())
            }
            Err(err) => {
                let message = failure_message(&operation, &err);
                if !self.reconcile(generation, &message, EntryKind::Error).await {
                    return Err(OperationError::Stale);
                }
                warn!(user = %identity, %message, "operation rejected");
                Err(OperationError::Request(err.message))
            }
        }
    }

    async fn session(&self) -> Result<(String, u64), OperationError> {
        let guard = self.inner.lock().await;
        match guard.identity.clone() {
            Some(identity) => Ok((identity, guard.generation)),
            None => Err(OperationError::NotLoggedIn),
        }
    }

    /// Exactly one gateway call per operation kind; atomicity of the
    /// underlying movement of funds is entirely the ledger's concern.
    async fn dispatch(&self, operation: &Operation, identity: &str) -> Result<(), RequestError> {
        match operation {
            Operation::Deposit { amount } => {
                self.gateway
                    .post_json::<_, Value>(
                        "/api/deposit",
                        &AmountRequest {
                            user: identity.to_string(),
                            amount: *amount,
                        },
                    )
                    .await?;
            }
            Operation::Withdraw { amount } => {
                self.gateway
                    .post_json::<_, Value>(
                        "/api/withdraw",
                        &AmountRequest {
                            user: identity.to_string(),
                            amount: *amount,
                        },
                    )
                    .await?;
            }
            Operation::Send { recipient, amount } => {
                self.gateway
                    .post_json::<_, Value>(
                        "/api/send",
                        &SendRequest {
                            from: identity.to_string(),
                            to: recipient.clone(),
                            amount: *amount,
                        },
                    )
                    .await?;
            }
            Operation::Transfer { direction, amount } => {
                self.gateway
                    .post_json::<_, Value>(
                        "/api/transfer",
                        &TransferRequest {
                            user: identity.to_string(),
                            direction: *direction,
                            amount: *amount,
                        },
                    )
                    .await?;
            }
            Operation::Invest { fund, amount } => {
                self.gateway
                    .post_json::<_, Value>(
                        "/api/invest",
                        &InvestRequest {
                            user: identity.to_string(),
                            fund: fund.clone(),
                            amount: *amount,
                        },
                    )
                    .await?;
            }
            Operation::LiquidateInvestments => {
                self.gateway
                    .post_json::<_, Value>(
                        "/api/withdraw-investments",
                        &UserRequest {
                            user: identity.to_string(),
                        },
                    )
                    .await?;
            }
        }
        Ok(())
    }

    /// Applies a settled operation's user-visible outcome, unless the
    /// session it was issued for has been superseded.
    async fn reconcile(&self, generation: u64, message: &str, kind: EntryKind) -> bool {
        let mut guard = self.inner.lock().await;
        if guard.generation != generation {
            info!(%message, "discarding result for a superseded session");
            return false;
        }
        let entry = guard.activity.record(message, kind);
        let _ = self.events.send(ClientEvent::ActivityRecorded(entry));
        Self::show_notification(&mut guard, &self.events, message, kind);
        true
    }

    async fn refresh_balance_as_of(
        &self,
        generation: u64,
        identity: &str,
    ) -> Result<(), RequestError> {
        let result = self
            .gateway
            .post_json::<_, BalanceSnapshot>(
                "/api/balance",
                &UserRequest {
                    user: identity.to_string(),
                },
            )
            .await;

        let mut guard = self.inner.lock().await;
        if guard.generation != generation {
            info!("discarding balance refresh for a superseded session");
            return Ok(());
        }

        match result {
            Ok(snapshot) => {
                guard.snapshot = Some(snapshot.clone());
                let _ = self.events.send(ClientEvent::BalanceRefreshed(snapshot));
                Ok(())
            }
            Err(err) => {
                let message = format!("Failed to load balance: {err}");
                Self::show_notification(&mut guard, &self.events, &message, EntryKind::Error);
                warn!(user = %identity, "balance refresh failed: {err}");
                Err(err)
            }
        }
    }

    fn show_notification(
        state: &mut SessionState,
        events: &broadcast::Sender<ClientEvent>,
        message: &str,
        kind: EntryKind,
    ) {
        let notification = state.notifications.show(message, kind);
        let _ = events.send(ClientEvent::Notified(notification));
    }
}

/// Local, pre-network checks. Checks run in form order: the field selections
/// a user fills in first are reported before the amount.
fn validate(operation: &Operation, identity: &str) -> Result<(), String> {
    match operation {
        Operation::Deposit { amount } | Operation::Withdraw { amount } => {
            require_positive(*amount)?;
        }
        Operation::Send { recipient, amount } => {
            if recipient.is_empty() {
                return Err("Please select a recipient".to_string());
            }
            require_positive(*amount)?;
            if recipient == identity {
                return Err("Cannot send money to yourself".to_string());
            }
        }
        Operation::Transfer { amount, .. } => {
            require_positive(*amount)?;
        }
        Operation::Invest { fund, amount } => {
            if fund.is_empty() {
                return Err("Please select a fund".to_string());
            }
            require_positive(*amount)?;
        }
        Operation::LiquidateInvestments => {}
    }
    Ok(())
}

fn require_positive(amount: Decimal) -> Result<(), String> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err("Amount must be positive".to_string())
    }
}

fn usd(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

fn success_message(operation: &Operation) -> String {
    match operation {
        Operation::Deposit { amount } => format!("Deposited {} to savings", usd(*amount)),
        Operation::Withdraw { amount } => format!("Withdrew {} from savings", usd(*amount)),
        Operation::Send { recipient, amount } => format!("Sent {} to {recipient}", usd(*amount)),
        Operation::Transfer { direction, amount } => {
            format!("Transferred {} ({})", usd(*amount), direction.describe())
        }
        Operation::Invest { fund, amount } => format!("Invested {} in {fund}", usd(*amount)),
        Operation::LiquidateInvestments => "Withdrew all investments".to_string(),
    }
}

fn failure_message(operation: &Operation, err: &RequestError) -> String {
    let label = match operation {
        Operation::Deposit { .. } => "Deposit",
        Operation::Withdraw { .. } | Operation::LiquidateInvestments => "Withdrawal",
        Operation::Send { .. } => "Send",
        Operation::Transfer { .. } => "Transfer",
        Operation::Invest { .. } => "Investment",
    };
    format!("{label} failed: {err}")
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
