use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::PollPolicy;
use crate::domain::transaction::{StatusSnapshot, Transaction, TransactionStatus};
use crate::error::{PaymentError, TerminalFailure};

/// Wall clock used by the watch loop. Injectable so tests can drive
/// expiry without sleeping.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Anything that can answer "what is this transaction's status right now".
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, transaction_id: &str) -> Result<StatusSnapshot, PaymentError>;
}

/// Lifecycle state of a watched PIX charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchState {
    Pending,
    Paid,
    Failed(TerminalFailure),
    Expired,
}

impl WatchState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WatchState::Pending)
    }

    /// The failure reported through the watch callback, if this state
    /// carries one. `Paid` and `Pending` carry none.
    pub fn terminal_failure(&self) -> Option<TerminalFailure> {
        match self {
            WatchState::Failed(reason) => Some(*reason),
            WatchState::Expired => Some(TerminalFailure::Expired),
            WatchState::Pending | WatchState::Paid => None,
        }
    }
}

/// What one tick of the watch decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Still pending, keep polling.
    Continue,
    /// This tick crossed into a terminal state; callbacks fire now.
    Terminal(WatchState),
    /// Already terminal before this tick. Nothing fires.
    Settled,
}

/// Pure state machine behind a payment watch. One `tick` consumes the
/// wall clock and at most one poll outcome; the async loop around it
/// owns timers and HTTP.
///
/// Expiry is checked before the poll result, so a late success against
/// an expired charge still reports expiry.
#[derive(Debug)]
pub struct PaymentWatch {
    state: WatchState,
    failures: u32,
    expires_at: DateTime<Utc>,
    max_attempts: u32,
}

impl PaymentWatch {
    pub fn new(expires_at: DateTime<Utc>, max_attempts: u32) -> Self {
        PaymentWatch {
            state: WatchState::Pending,
            failures: 0,
            expires_at,
            max_attempts,
        }
    }

    pub fn state(&self) -> &WatchState {
        &self.state
    }

    /// Count of polls that errored so far. Successful polls never
    /// reset it.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn tick(
        &mut self,
        now: DateTime<Utc>,
        poll: Option<Result<TransactionStatus, &PaymentError>>,
    ) -> Step {
        if self.state.is_terminal() {
            return Step::Settled;
        }

        if now >= self.expires_at {
            return self.settle(WatchState::Expired);
        }

        let poll = match poll {
            Some(poll) => poll,
            None => return Step::Continue,
        };

        match poll {
            Ok(TransactionStatus::Paid) => self.settle(WatchState::Paid),
            Ok(TransactionStatus::Cancelled) => {
                self.settle(WatchState::Failed(TerminalFailure::Cancelled))
            }
            Ok(TransactionStatus::Expired) => self.settle(WatchState::Expired),
            Ok(TransactionStatus::Pending) => Step::Continue,
            Err(_) => {
                self.failures += 1;
                if self.failures >= self.max_attempts {
                    self.settle(WatchState::Failed(TerminalFailure::Timeout))
                } else {
                    Step::Continue
                }
            }
        }
    }

    fn settle(&mut self, state: WatchState) -> Step {
        self.state = state.clone();
        Step::Terminal(state)
    }
}

/// Exactly-once completion callbacks for a watch. Each slot is taken
/// when it fires.
#[derive(Default)]
pub struct WatchCallbacks {
    pub on_paid: Option<Box<dyn FnOnce(StatusSnapshot) + Send>>,
    pub on_failure: Option<Box<dyn FnOnce(TerminalFailure) + Send>>,
}

impl WatchCallbacks {
    fn fire(&mut self, state: &WatchState, snapshot: Option<StatusSnapshot>) {
        match state {
            WatchState::Paid => {
                if let (Some(on_paid), Some(snapshot)) = (self.on_paid.take(), snapshot) {
                    on_paid(snapshot);
                }
            }
            other => {
                if let (Some(reason), Some(on_failure)) =
                    (other.terminal_failure(), self.on_failure.take())
                {
                    on_failure(reason);
                }
            }
        }
    }
}

/// Handle over a spawned watch loop.
///
/// `cancel` stops the loop without firing any callback; calling it
/// after the watch settled is a no-op.
pub struct WatchHandle {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
    task: JoinHandle<WatchState>,
}

impl WatchHandle {
    pub(crate) fn new(
        cancelled: Arc<AtomicBool>,
        notify: Arc<Notify>,
        task: JoinHandle<WatchState>,
    ) -> Self {
        WatchHandle {
            cancelled,
            notify,
            task,
        }
    }

    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            // notify_one stores a permit, so a cancel that lands before
            // the loop reaches its next wait still wakes it.
            self.notify.notify_one();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Waits for the loop to finish and returns its final state.
    pub async fn join(self) -> Option<WatchState> {
        self.task.await.ok()
    }
}

/// Drives a `PaymentWatch` against a live status source until it
/// settles or is cancelled.
pub async fn run_watch(
    source: Arc<dyn StatusSource>,
    transaction: Transaction,
    policy: PollPolicy,
    clock: Clock,
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
    mut callbacks: WatchCallbacks,
) -> WatchState {
    let mut watch = PaymentWatch::new(transaction.expires_at, policy.max_attempts);

    // The charge may already be past its window when the watch starts.
    if let Step::Terminal(state) = watch.tick((clock)(), None) {
        warn!(transaction_id = %transaction.id, "Watch started after PIX window closed");
        callbacks.fire(&state, None);
        return state;
    }

    loop {
        tokio::select! {
            _ = notify.notified() => {}
            _ = sleep(policy.interval()) => {}
        }

        if cancelled.load(Ordering::SeqCst) {
            info!(transaction_id = %transaction.id, "Payment watch cancelled");
            return watch.state().clone();
        }

        let poll = source.fetch_status(&transaction.id).await;

        // A cancel that raced the in-flight request discards its result.
        if cancelled.load(Ordering::SeqCst) {
            info!(transaction_id = %transaction.id, "Payment watch cancelled");
            return watch.state().clone();
        }

        if let Err(error) = &poll {
            warn!(
                transaction_id = %transaction.id,
                failures = watch.failures() + 1,
                "Status poll failed: {}",
                error
            );
        }

        let outcome = watch.tick((clock)(), Some(poll.as_ref().map(|snapshot| snapshot.status)));

        match outcome {
            Step::Continue => {
                debug!(transaction_id = %transaction.id, "Transaction still pending");
            }
            Step::Settled => return watch.state().clone(),
            Step::Terminal(state) => {
                match &state {
                    WatchState::Paid => {
                        info!(transaction_id = %transaction.id, "Transaction paid");
                    }
                    other => {
                        if let Some(reason) = other.terminal_failure() {
                            info!(
                                transaction_id = %transaction.id,
                                reason = reason.reason_code(),
                                "Payment watch settled without payment"
                            );
                        }
                    }
                }
                callbacks.fire(&state, poll.ok());
                return state;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn ten_minute_watch(max_attempts: u32) -> (PaymentWatch, DateTime<Utc>) {
        let now = base_time();
        (
            PaymentWatch::new(now + Duration::minutes(10), max_attempts),
            now,
        )
    }

    #[test]
    fn pending_poll_keeps_waiting() {
        let (mut watch, now) = ten_minute_watch(120);

        let step = watch.tick(now, Some(Ok(TransactionStatus::Pending)));

        assert_eq!(step, Step::Continue);
        assert_eq!(*watch.state(), WatchState::Pending);
        assert_eq!(watch.failures(), 0);
    }

    #[test]
    fn paid_poll_settles_the_watch() {
        let (mut watch, now) = ten_minute_watch(120);

        let step = watch.tick(now, Some(Ok(TransactionStatus::Paid)));

        assert_eq!(step, Step::Terminal(WatchState::Paid));
        assert!(watch.state().is_terminal());
    }

    #[test]
    fn cancelled_poll_fails_with_cancelled_reason() {
        let (mut watch, now) = ten_minute_watch(120);

        let step = watch.tick(now, Some(Ok(TransactionStatus::Cancelled)));

        assert_eq!(
            step,
            Step::Terminal(WatchState::Failed(TerminalFailure::Cancelled))
        );
        assert_eq!(
            watch.state().terminal_failure(),
            Some(TerminalFailure::Cancelled)
        );
    }

    #[test]
    fn gateway_expired_status_expires_the_watch() {
        let (mut watch, now) = ten_minute_watch(120);

        let step = watch.tick(now, Some(Ok(TransactionStatus::Expired)));

        assert_eq!(step, Step::Terminal(WatchState::Expired));
        assert_eq!(
            watch.state().terminal_failure(),
            Some(TerminalFailure::Expired)
        );
    }

    #[test]
    fn poll_errors_accumulate_until_timeout() {
        let (mut watch, now) = ten_minute_watch(3);
        let error = PaymentError::gateway(500, "transient");

        assert_eq!(watch.tick(now, Some(Err(&error))), Step::Continue);
        assert_eq!(watch.failures(), 1);
        assert_eq!(watch.tick(now, Some(Err(&error))), Step::Continue);
        assert_eq!(watch.failures(), 2);

        let step = watch.tick(now, Some(Err(&error)));
        assert_eq!(
            step,
            Step::Terminal(WatchState::Failed(TerminalFailure::Timeout))
        );
    }

    #[test]
    fn successful_polls_do_not_reset_the_failure_count() {
        let (mut watch, now) = ten_minute_watch(3);
        let error = PaymentError::gateway(500, "transient");

        watch.tick(now, Some(Err(&error)));
        watch.tick(now, Some(Err(&error)));
        watch.tick(now, Some(Ok(TransactionStatus::Pending)));
        assert_eq!(watch.failures(), 2);

        let step = watch.tick(now, Some(Err(&error)));
        assert_eq!(
            step,
            Step::Terminal(WatchState::Failed(TerminalFailure::Timeout))
        );
    }

    #[test]
    fn wall_clock_expiry_wins_over_a_late_paid_poll() {
        let (mut watch, now) = ten_minute_watch(120);
        let after_expiry = now + Duration::minutes(11);

        let step = watch.tick(after_expiry, Some(Ok(TransactionStatus::Paid)));

        assert_eq!(step, Step::Terminal(WatchState::Expired));
    }

    #[test]
    fn expiry_fires_without_any_poll() {
        let (mut watch, now) = ten_minute_watch(120);

        let step = watch.tick(now + Duration::minutes(10), None);

        assert_eq!(step, Step::Terminal(WatchState::Expired));
    }

    #[test]
    fn terminal_state_is_sticky() {
        let (mut watch, now) = ten_minute_watch(120);
        let error = PaymentError::gateway(500, "transient");

        watch.tick(now, Some(Ok(TransactionStatus::Paid)));
        let step = watch.tick(now, Some(Err(&error)));

        assert_eq!(step, Step::Settled);
        assert_eq!(*watch.state(), WatchState::Paid);
        assert_eq!(watch.failures(), 0);
    }

    #[test]
    fn callbacks_fire_at_most_once() {
        use std::sync::atomic::AtomicU32;

        let paid_calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&paid_calls);
        let mut callbacks = WatchCallbacks {
            on_paid: Some(Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
            on_failure: None,
        };

        let snapshot = StatusSnapshot {
            transaction_id: "tx-1".to_string(),
            status: TransactionStatus::Paid,
            amount_cents: Some(4590),
            paid_at: None,
        };

        callbacks.fire(&WatchState::Paid, Some(snapshot.clone()));
        callbacks.fire(&WatchState::Paid, Some(snapshot));

        assert_eq!(paid_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn paid_state_never_reaches_the_failure_callback() {
        let mut callbacks = WatchCallbacks {
            on_paid: None,
            on_failure: Some(Box::new(|_| panic!("failure callback fired for a paid charge"))),
        };

        callbacks.fire(&WatchState::Paid, None);
    }
}
