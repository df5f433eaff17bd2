use crate::db::SqlitePool;
use crate::error::ConnectionError;
use crate::service::connector::{Connect, DbTarget};

use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::sync::Arc;
use tracing::{debug, error, info};

type ConnectReply = RpcReplyPort<Result<(), ConnectionError>>;

/// Messages handled by the connection actor.
#[derive(Debug)]
pub enum ConnectionMessage {
    /// Connect if needed; replies once the shared attempt has an outcome.
    EnsureConnected(ConnectReply),
    /// Reply with the live pool if connected. Never starts an attempt.
    CurrentPool(RpcReplyPort<Option<SqlitePool>>),

    // Internal messages (sent by the attempt task)
    /// The in-flight attempt finished.
    AttemptFinished(Result<SqlitePool, ConnectionError>),
}

/// Lifecycle of the shared connection. `Failed` is never stored: a failed
/// attempt drops straight back to `Unconnected`.
enum Phase {
    Unconnected,
    Connecting { waiters: Vec<ConnectReply> },
    Connected(SqlitePool),
}

/// Cloneable handle to the process-wide database connection.
///
/// Built once at startup and injected wherever the connection is needed.
/// Without a configured target no actor is spawned and every call reports
/// [`ConnectionError::MissingConfiguration`].
#[derive(Clone)]
pub struct ConnectionManager {
    actor: Option<ActorRef<ConnectionMessage>>,
}

impl ConnectionManager {
    pub async fn spawn(
        target: Option<DbTarget>,
        connector: Arc<dyn Connect>,
    ) -> Result<Self, ConnectionError> {
        let Some(target) = target else {
            return Ok(Self { actor: None });
        };
        let (actor, _join) = Actor::spawn(None, ConnectionActor, (target, connector))
            .await
            .map_err(|e| ConnectionError::message(format!("connection actor spawn failed: {e}")))?;
        Ok(Self { actor: Some(actor) })
    }

    pub fn is_configured(&self) -> bool {
        self.actor.is_some()
    }

    /// Idempotent connect. Concurrent callers share one underlying attempt
    /// and all observe its outcome.
    pub async fn ensure_connected(&self) -> Result<(), ConnectionError> {
        let Some(actor) = self.actor.as_ref() else {
            return Err(ConnectionError::MissingConfiguration);
        };
        ractor::call!(actor, ConnectionMessage::EnsureConnected)
            .map_err(|e| ConnectionError::message(format!("EnsureConnected RPC failed: {e}")))?
    }

    /// The live pool, or `None` while not connected.
    pub async fn current_pool(&self) -> Result<Option<SqlitePool>, ConnectionError> {
        let Some(actor) = self.actor.as_ref() else {
            return Err(ConnectionError::MissingConfiguration);
        };
        ractor::call!(actor, ConnectionMessage::CurrentPool)
            .map_err(|e| ConnectionError::message(format!("CurrentPool RPC failed: {e}")))
    }
}

struct ConnectionActorState {
    target: DbTarget,
    connector: Arc<dyn Connect>,
    phase: Phase,
}

struct ConnectionActor;

#[ractor::async_trait]
impl Actor for ConnectionActor {
    type Msg = ConnectionMessage;
    type State = ConnectionActorState;
    type Arguments = (DbTarget, Arc<dyn Connect>);

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let (target, connector) = args;
        debug!(url = %target.url, database = %target.name, "connection actor started");
        Ok(ConnectionActorState {
            target,
            connector,
            phase: Phase::Unconnected,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            ConnectionMessage::EnsureConnected(rp) => {
                self.handle_ensure_connected(state, myself, rp);
            }
            ConnectionMessage::CurrentPool(rp) => {
                let pool = match &state.phase {
                    Phase::Connected(pool) => Some(pool.clone()),
                    _ => None,
                };
                let _ = rp.send(pool);
            }
            ConnectionMessage::AttemptFinished(result) => {
                self.handle_attempt_finished(state, result);
            }
        }
        Ok(())
    }
}

impl ConnectionActor {
    fn handle_ensure_connected(
        &self,
        state: &mut ConnectionActorState,
        myself: ActorRef<ConnectionMessage>,
        reply_port: ConnectReply,
    ) {
        match state.phase {
            Phase::Connected(_) => {
                let _ = reply_port.send(Ok(()));
            }
            Phase::Connecting { ref mut waiters } => {
                waiters.push(reply_port);
            }
            Phase::Unconnected => {
                state.phase = Phase::Connecting {
                    waiters: vec![reply_port],
                };
                Self::start_attempt(&state.target, state.connector.clone(), myself);
            }
        }
    }

    /// Runs detached from any request so a disconnecting client cannot cancel
    /// the attempt other waiters depend on. The attempt gets its own task so a
    /// panic inside it still reaches the actor as `AttemptFinished`.
    fn start_attempt(
        target: &DbTarget,
        connector: Arc<dyn Connect>,
        myself: ActorRef<ConnectionMessage>,
    ) {
        let timeout = target.timeout;
        let target = target.clone();
        debug!(url = %target.url, database = %target.name, "starting database connection attempt");
        let attempt =
            tokio::spawn(async move { tokio::time::timeout(timeout, connector.connect(&target)).await });
        tokio::spawn(async move {
            let result = match attempt.await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(ConnectionError::Timeout(timeout)),
                Err(join_err) => Err(ConnectionError::other(join_err)),
            };
            if let Err(e) = ractor::cast!(myself, ConnectionMessage::AttemptFinished(result)) {
                error!("connection actor unreachable after attempt: {}", e);
            }
        });
    }

    fn handle_attempt_finished(
        &self,
        state: &mut ConnectionActorState,
        result: Result<SqlitePool, ConnectionError>,
    ) {
        let waiters = match std::mem::replace(&mut state.phase, Phase::Unconnected) {
            Phase::Connecting { waiters } => waiters,
            other => {
                // Not ours to resolve; keep whatever state we were in.
                state.phase = other;
                return;
            }
        };

        let outcome = match result {
            Ok(pool) => {
                info!(database = %state.target.name, "database connected");
                state.phase = Phase::Connected(pool);
                Ok(())
            }
            Err(e) => {
                error!(
                    url = %state.target.url,
                    database = %state.target.name,
                    error = %e,
                    "database connection failed"
                );
                Err(e)
            }
        };

        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::connector::SqliteConnector;
    use futures::future::{BoxFuture, join_all};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts attempts; fails the first `failures` of them.
    struct CountingConnector {
        attempts: Arc<AtomicUsize>,
        failures: usize,
        delay: Duration,
    }

    impl Connect for CountingConnector {
        fn connect(
            &self,
            target: &DbTarget,
        ) -> BoxFuture<'static, Result<SqlitePool, ConnectionError>> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst);
            let fail = n < self.failures;
            let delay = self.delay;
            let inner = SqliteConnector.connect(target);
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                if fail {
                    return Err(ConnectionError::message("endpoint unreachable"));
                }
                inner.await
            })
        }
    }

    fn memory_target() -> DbTarget {
        DbTarget::new("sqlite::memory:", "test")
    }

    async fn manager(failures: usize, delay: Duration) -> (ConnectionManager, Arc<AtomicUsize>) {
        let attempts = Arc::new(AtomicUsize::new(0));
        let connector = CountingConnector {
            attempts: attempts.clone(),
            failures,
            delay,
        };
        let manager = ConnectionManager::spawn(Some(memory_target()), Arc::new(connector))
            .await
            .expect("spawn connection actor");
        (manager, attempts)
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_attempt() {
        let (manager, attempts) = manager(0, Duration::from_millis(50)).await;

        let results = join_all((0..16).map(|_| {
            let m = manager.clone();
            async move { m.ensure_connected().await }
        }))
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r.is_ok()));

        // Already connected: no new attempt.
        manager.ensure_connected().await.expect("second call");
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(manager.current_pool().await.expect("rpc").is_some());
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_failure() {
        let (manager, attempts) = manager(1, Duration::from_millis(50)).await;

        let results = join_all((0..8).map(|_| {
            let m = manager.clone();
            async move { m.ensure_connected().await }
        }))
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(
            results
                .iter()
                .all(|r| matches!(r, Err(ConnectionError::Other(_))))
        );
    }

    #[tokio::test]
    async fn failure_resets_so_next_call_retries() {
        let (manager, attempts) = manager(1, Duration::ZERO).await;

        assert!(manager.ensure_connected().await.is_err());
        assert!(manager.current_pool().await.expect("rpc").is_none());

        manager.ensure_connected().await.expect("retry should connect");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn slow_attempt_times_out_and_can_be_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let connector = CountingConnector {
            attempts: attempts.clone(),
            failures: 0,
            delay: Duration::from_millis(500),
        };
        let target = memory_target().with_timeout(Duration::from_millis(20));
        let manager = ConnectionManager::spawn(Some(target), Arc::new(connector))
            .await
            .expect("spawn connection actor");

        let err = manager.ensure_connected().await.expect_err("should time out");
        assert!(matches!(err, ConnectionError::Timeout(d) if d == Duration::from_millis(20)));

        let _ = manager.ensure_connected().await;
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    /// Panics on the first attempt, connects on later ones.
    struct PanicOnceConnector {
        attempts: Arc<AtomicUsize>,
    }

    impl Connect for PanicOnceConnector {
        fn connect(
            &self,
            target: &DbTarget,
        ) -> BoxFuture<'static, Result<SqlitePool, ConnectionError>> {
            let first = self.attempts.fetch_add(1, Ordering::SeqCst) == 0;
            let inner = SqliteConnector.connect(target);
            Box::pin(async move {
                if first {
                    panic!("connector blew up");
                }
                inner.await
            })
        }
    }

    #[tokio::test]
    async fn panicking_attempt_fails_waiters_and_resets() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let connector = PanicOnceConnector {
            attempts: attempts.clone(),
        };
        let manager = ConnectionManager::spawn(Some(memory_target()), Arc::new(connector))
            .await
            .expect("spawn connection actor");

        let first = tokio::time::timeout(Duration::from_secs(3), manager.ensure_connected())
            .await
            .expect("waiter must not hang after a panicked attempt");
        assert!(matches!(first, Err(ConnectionError::Other(_))));
        assert!(manager.current_pool().await.expect("rpc").is_none());

        tokio::time::timeout(Duration::from_secs(3), manager.ensure_connected())
            .await
            .expect("second call must not hang")
            .expect("second attempt should connect");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_target_is_reported_without_an_attempt() {
        let manager = ConnectionManager::spawn(None, Arc::new(SqliteConnector))
            .await
            .expect("spawn");
        assert!(!manager.is_configured());
        assert!(matches!(
            manager.ensure_connected().await,
            Err(ConnectionError::MissingConfiguration)
        ));
    }
}
