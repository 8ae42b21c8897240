use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use fabric_core::{Effect, Msg, UserResult};
use fabric_engine::{EngineEvent, EngineHandle, Orchestrator};

/// Hands effects to the engine and turns its events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            engine: EngineHandle::new(orchestrator),
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Dispatch(operation) => {
                    engine_info!("Dispatch {}", operation.name());
                    self.engine.enqueue(operation);
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event. A vanished engine
    /// becomes [`Msg::EngineStopped`] so callers waiting on a run can finish.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        match self.engine.recv_timeout(timeout) {
            Ok(event) => event.map(map_event),
            Err(stopped) => {
                engine_warn!("Engine event channel closed");
                Some(Msg::EngineStopped(format!("Error: {stopped}")))
            }
        }
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::RunStateChanged(running) => Msg::RunStateChanged(running),
        EngineEvent::Notification(notification) => Msg::Notified(notification),
        EngineEvent::Completed { operation, result } => {
            if let Some(UserResult::Failed(message)) = &result {
                engine_warn!("{} failed: {}", operation.name(), message);
            }
            Msg::RunFinished(result)
        }
        EngineEvent::Unavailable(reason) => {
            Msg::EngineStopped(format!("Engine unavailable: {reason}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_core::{Notification, Operation, PatternArgs};
    use pretty_assertions::assert_eq;

    #[test]
    fn completion_becomes_run_finished() {
        let msg = map_event(EngineEvent::Completed {
            operation: Operation::RunPattern(PatternArgs::new("summarize")),
            result: Some(UserResult::Output("done".into())),
        });
        assert_eq!(msg, Msg::RunFinished(Some(UserResult::Output("done".into()))));
    }

    #[test]
    fn notifications_pass_through() {
        let notification = Notification::error("Error running command: boom");
        assert_eq!(
            map_event(EngineEvent::Notification(notification.clone())),
            Msg::Notified(notification)
        );
    }

    #[test]
    fn unavailable_engine_stops_the_run() {
        assert_eq!(
            map_event(EngineEvent::Unavailable("no threads".into())),
            Msg::EngineStopped("Engine unavailable: no threads".into())
        );
    }
}
