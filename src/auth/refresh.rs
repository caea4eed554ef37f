//! Single-flight gate for credential renewal.
//!
//! Every request racing an expired token goes through the gate: the first
//! caller becomes the leader and performs the renewal, everyone else parks a
//! continuation in the queue. The queue is drained in enqueue order with the
//! leader's single outcome, so at most one renewal call is in flight at any
//! time and no waiter is starved or resolved twice.

use crate::auth::error::Error;
use secrecy::SecretString;
use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;

type Waiter = oneshot::Sender<Result<SecretString, Error>>;

enum GateState {
    Idle,
    Refreshing { waiters: Vec<Waiter> },
}

/// What a caller drew at the gate.
pub(crate) enum Entry {
    /// This caller performs the renewal and must call [`RefreshGate::settle`].
    Leader,
    /// This caller suspends until the in-flight renewal settles.
    Waiter(oneshot::Receiver<Result<SecretString, Error>>),
}

pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

impl RefreshGate {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Idle),
        }
    }

    /// Claim the renewal or join the queue behind it.
    ///
    /// The flag flips inside the lock, before the caller reaches any await
    /// point, which is what makes a second concurrent renewal impossible.
    pub(crate) fn enter(&self) -> Entry {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *state {
            GateState::Idle => {
                *state = GateState::Refreshing {
                    waiters: Vec::new(),
                };
                Entry::Leader
            }
            GateState::Refreshing { waiters } => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Entry::Waiter(rx)
            }
        }
    }

    /// Resolve every queued waiter with the renewal outcome, in enqueue
    /// order, and reopen the gate.
    pub(crate) fn settle(&self, outcome: &Result<SecretString, Error>) {
        let waiters = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match std::mem::replace(&mut *state, GateState::Idle) {
                GateState::Refreshing { waiters } => waiters,
                GateState::Idle => Vec::new(),
            }
        };
        for waiter in waiters {
            // A waiter that gave up is allowed to miss the result.
            let _ = waiter.send(outcome.clone());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn first_caller_leads_later_callers_wait() {
        let gate = RefreshGate::new();
        assert!(matches!(gate.enter(), Entry::Leader));
        assert!(matches!(gate.enter(), Entry::Waiter(_)));
        assert!(matches!(gate.enter(), Entry::Waiter(_)));
    }

    #[test]
    fn settle_reopens_the_gate() {
        let gate = RefreshGate::new();
        assert!(matches!(gate.enter(), Entry::Leader));
        gate.settle(&Ok(secret("tok")));
        assert!(matches!(gate.enter(), Entry::Leader));
    }

    #[tokio::test]
    async fn waiters_resolve_in_enqueue_order() {
        use secrecy::ExposeSecret;

        let gate = Arc::new(RefreshGate::new());
        assert!(matches!(gate.enter(), Entry::Leader));

        let order = Arc::new(Mutex::new(Vec::new()));
        let mut handles = Vec::new();
        for index in 0..3 {
            let Entry::Waiter(rx) = gate.enter() else {
                panic!("expected a waiter while a renewal is in flight");
            };
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                let outcome = rx.await.unwrap();
                assert_eq!(outcome.unwrap().expose_secret(), "fresh");
                order.lock().unwrap().push(index);
            }));
        }

        gate.settle(&Ok(secret("fresh")));
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn failure_rejects_every_waiter_identically() {
        let gate = RefreshGate::new();
        assert!(matches!(gate.enter(), Entry::Leader));

        let mut receivers = Vec::new();
        for _ in 0..3 {
            let Entry::Waiter(rx) = gate.enter() else {
                panic!("expected a waiter while a renewal is in flight");
            };
            receivers.push(rx);
        }

        let failure = Error::RenewalFailed("renewal token rejected".to_string());
        gate.settle(&Err(failure.clone()));

        for rx in receivers {
            let outcome = rx.await.unwrap();
            assert_eq!(outcome.err(), Some(failure.clone()));
        }
    }
}
