use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, engine_info};
use fabric_core::{Notification, Operation, UserResult};
use thiserror::Error;

use crate::orchestrator::{Notifier, Orchestrator};

enum EngineCommand {
    Dispatch(Operation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine thread could not start; nothing enqueued will run.
    Unavailable(String),
    RunStateChanged(bool),
    Notification(Notification),
    Completed {
        operation: Operation,
        /// `None` when the operation reported through notifications.
        result: Option<UserResult>,
    },
}

/// The engine thread has exited and will send nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("engine stopped")]
pub struct EngineStopped;

/// Background thread owning a tokio runtime that executes operations.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(orchestrator: Orchestrator) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let orchestrator = Arc::new(orchestrator);

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Failed to start engine runtime: {}", err);
                    let _ = event_tx.send(EngineEvent::Unavailable(err.to_string()));
                    return;
                }
            };

            let mut watcher = orchestrator.run_state().subscribe();
            let state_tx = event_tx.clone();
            runtime.spawn(async move {
                while watcher.changed().await.is_ok() {
                    let running = *watcher.borrow_and_update();
                    if state_tx.send(EngineEvent::RunStateChanged(running)).is_err() {
                        break;
                    }
                }
            });

            while let Ok(command) = cmd_rx.recv() {
                let orchestrator = orchestrator.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(handle_command(orchestrator, command, event_tx));
            }
            engine_info!("Engine command channel closed");
        });

        Self { cmd_tx, event_rx }
    }

    pub fn enqueue(&self, operation: Operation) {
        let _ = self.cmd_tx.send(EngineCommand::Dispatch(operation));
    }

    /// Waits up to `timeout`; `Ok(None)` means nothing arrived in time.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineStopped> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineStopped),
        }
    }
}

struct ChannelNotifier {
    tx: mpsc::Sender<EngineEvent>,
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.tx.send(EngineEvent::Notification(notification));
    }
}

async fn handle_command(
    orchestrator: Arc<Orchestrator>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Dispatch(operation) => {
            let notifier = ChannelNotifier {
                tx: event_tx.clone(),
            };
            let name = operation.name();
            // Run in its own task so a panic still ends with a Completed event.
            let dispatched = tokio::spawn({
                let operation = operation.clone();
                async move { orchestrator.dispatch(operation, &notifier).await }
            });
            let result = match dispatched.await {
                Ok(result) => result,
                Err(err) => {
                    engine_error!("{} did not finish: {}", name, err);
                    let reason = if err.is_panic() { "panicked" } else { "was cancelled" };
                    Some(UserResult::Failed(format!("Internal error: {name} {reason}")))
                }
            };
            let _ = event_tx.send(EngineEvent::Completed { operation, result });
        }
    }
}
