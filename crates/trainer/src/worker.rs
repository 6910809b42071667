//! The session worker.
//!
//! All session mutation (move submission, engine turns, evaluations) runs on
//! one blocking task so engine latency never holds up the UI loop. Results
//! come back as [`WorkerEvent`]s carrying a fresh [`Snapshot`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};
use trainer_core::{GameSession, MoveReport, Notification, RulesProvider, Snapshot};
use trainer_engine::Engine;

const WORKER_CHANNEL_CAPACITY: usize = 16;

/// Work requested by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerCommand {
    /// Submit White's move.
    Submit(String),
    /// Ask the engine again for a pending Black move.
    RetryEngine,
    /// Refresh the evaluation of the current position.
    Evaluate,
    Shutdown,
}

/// Results delivered to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    /// A submitted or retried move was dispatched.
    Dispatched {
        report: MoveReport,
        snapshot: Snapshot,
    },
    /// A retry was requested but no engine turn was pending.
    NothingToRetry,
    /// The evaluation was refreshed.
    Evaluated(Snapshot),
}

pub struct Worker {
    tx: mpsc::Sender<WorkerCommand>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl Worker {
    /// Starts the worker on a blocking task.
    pub fn spawn<R, E>(session: Arc<GameSession<R, E>>) -> (Self, mpsc::Receiver<WorkerEvent>)
    where
        R: RulesProvider + 'static,
        E: Engine + 'static,
    {
        let (tx, commands) = mpsc::channel(WORKER_CHANNEL_CAPACITY);
        let (events_tx, events) = mpsc::channel(WORKER_CHANNEL_CAPACITY);
        let join = tokio::task::spawn_blocking(move || worker_loop(&session, commands, &events_tx));
        (
            Self {
                tx,
                join: Some(join),
            },
            events,
        )
    }

    /// Queues a command.
    ///
    /// # Errors
    ///
    /// Fails if the worker has stopped.
    pub async fn send(
        &self,
        command: WorkerCommand,
    ) -> Result<(), mpsc::error::SendError<WorkerCommand>> {
        self.tx.send(command).await
    }

    /// Stops the worker after the command in flight completes.
    pub async fn shutdown(&mut self) {
        let _ = self.tx.send(WorkerCommand::Shutdown).await;
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

fn worker_loop<R: RulesProvider, E: Engine>(
    session: &GameSession<R, E>,
    mut commands: mpsc::Receiver<WorkerCommand>,
    events: &mpsc::Sender<WorkerEvent>,
) {
    while let Some(command) = commands.blocking_recv() {
        debug!(?command, "worker command");
        let delivered = match command {
            WorkerCommand::Submit(uci) => {
                let report = session.submit_move(&uci);
                dispatched(session, report, events)
            }
            WorkerCommand::RetryEngine => match session.retry_engine() {
                Some(report) => dispatched(session, report, events),
                None => events.blocking_send(WorkerEvent::NothingToRetry).is_ok(),
            },
            WorkerCommand::Evaluate => evaluated(session, events),
            WorkerCommand::Shutdown => break,
        };
        if !delivered {
            break;
        }
    }
    info!("session worker stopped");
}

/// Sends the report first so the board repaints before the evaluation query
/// runs, then honours a reevaluation request.
fn dispatched<R: RulesProvider, E: Engine>(
    session: &GameSession<R, E>,
    report: MoveReport,
    events: &mpsc::Sender<WorkerEvent>,
) -> bool {
    let reevaluate = report.requests(Notification::Reevaluate);
    let event = WorkerEvent::Dispatched {
        report,
        snapshot: session.snapshot(),
    };
    if events.blocking_send(event).is_err() {
        return false;
    }
    !reevaluate || evaluated(session, events)
}

fn evaluated<R: RulesProvider, E: Engine>(
    session: &GameSession<R, E>,
    events: &mpsc::Sender<WorkerEvent>,
) -> bool {
    session.refresh_evaluation();
    events
        .blocking_send(WorkerEvent::Evaluated(session.snapshot()))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{session, FixedEngine};
    use trainer_core::{DispatchOutcome, Mode, Reply};
    use trainer_engine::Evaluation;

    #[tokio::test]
    async fn test_submit_dispatches_then_evaluates() {
        let session = session(&["e2e4", "e7e5", "g1f3"], FixedEngine::new());
        let (mut worker, mut events) = Worker::spawn(Arc::clone(&session));

        worker
            .send(WorkerCommand::Submit("e2e4".to_string()))
            .await
            .unwrap();

        let Some(WorkerEvent::Dispatched { report, snapshot }) = events.recv().await else {
            panic!("expected a dispatched event");
        };
        assert!(matches!(
            report.outcome,
            DispatchOutcome::Advanced {
                reply: Some(Reply::Scripted(_)),
                ..
            }
        ));
        assert_eq!(snapshot.state.cursor, 2);
        assert_eq!(snapshot.state.mode, Mode::Opening);

        let Some(WorkerEvent::Evaluated(snapshot)) = events.recv().await else {
            panic!("expected an evaluation");
        };
        assert_eq!(snapshot.evaluation.white, Evaluation::Centipawns(40));

        worker.shutdown().await;
    }

    #[tokio::test]
    async fn test_rejected_move_is_not_reevaluated() {
        let session = session(&["e2e4", "e7e5"], FixedEngine::new());
        let (mut worker, mut events) = Worker::spawn(Arc::clone(&session));

        worker
            .send(WorkerCommand::Submit("d2d4".to_string()))
            .await
            .unwrap();
        worker.send(WorkerCommand::RetryEngine).await.unwrap();

        let Some(WorkerEvent::Dispatched { report, .. }) = events.recv().await else {
            panic!("expected a dispatched event");
        };
        assert_eq!(
            report.outcome,
            DispatchOutcome::WrongOpeningMove {
                expected: "e2e4".to_string(),
                played: "d2d4".to_string(),
            }
        );
        assert!(report.notifications.is_empty());
        assert_eq!(events.recv().await, Some(WorkerEvent::NothingToRetry));

        worker.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_closes_events() {
        let session = session(&["e2e4", "e7e5"], FixedEngine::new());
        let (mut worker, mut events) = Worker::spawn(session);
        worker.shutdown().await;
        assert_eq!(events.recv().await, None);
    }
}
