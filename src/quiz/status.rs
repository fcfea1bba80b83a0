// Game status state machine.
//
//   WAITING(0) -> ACTIVE(2) <-> PAUSED(1)
//   {WAITING, ACTIVE, PAUSED} -> ENDED(3)
//
// Storage applies a transition as `UPDATE games ... WHERE status IN (sources)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum GameStatus {
    Waiting = 0,
    Paused = 1,
    Active = 2,
    Ended = 3,
}

impl GameStatus {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn accepts_joins(self) -> bool {
        self == GameStatus::Waiting
    }
}

/// Host-issued lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Start,
    Pause,
    Resume,
    Stop,
}

impl LifecycleEvent {
    /// Statuses this event may be applied from.
    pub fn sources(self) -> &'static [GameStatus] {
        match self {
            LifecycleEvent::Start => &[GameStatus::Waiting],
            LifecycleEvent::Pause => &[GameStatus::Active],
            LifecycleEvent::Resume => &[GameStatus::Paused],
            LifecycleEvent::Stop => &[GameStatus::Waiting, GameStatus::Active, GameStatus::Paused],
        }
    }

    pub fn target(self) -> GameStatus {
        match self {
            LifecycleEvent::Start | LifecycleEvent::Resume => GameStatus::Active,
            LifecycleEvent::Pause => GameStatus::Paused,
            LifecycleEvent::Stop => GameStatus::Ended,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEvent::Start => "start",
            LifecycleEvent::Pause => "pause",
            LifecycleEvent::Resume => "resume",
            LifecycleEvent::Stop => "stop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: cannot {} a game that is {from:?}", .event.as_str())]
pub struct InvalidTransition {
    pub from: GameStatus,
    pub event: LifecycleEvent,
}

/// Compute the status reached by applying `event` in `from`.
pub fn compute_transition(
    from: GameStatus,
    event: LifecycleEvent,
) -> Result<GameStatus, InvalidTransition> {
    if event.sources().contains(&from) {
        Ok(event.target())
    } else {
        Err(InvalidTransition { from, event })
    }
}

/// `status IN (...)` fragment for an event's source statuses. Only internal
/// integer codes are formatted in, never caller input.
pub(crate) fn sources_sql(event: LifecycleEvent) -> String {
    let codes: Vec<String> = event
        .sources()
        .iter()
        .map(|s| s.code().to_string())
        .collect();
    format!("status IN ({})", codes.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let s = compute_transition(GameStatus::Waiting, LifecycleEvent::Start).unwrap();
        assert_eq!(s, GameStatus::Active);
        let s = compute_transition(s, LifecycleEvent::Pause).unwrap();
        assert_eq!(s, GameStatus::Paused);
        let s = compute_transition(s, LifecycleEvent::Resume).unwrap();
        assert_eq!(s, GameStatus::Active);
        let s = compute_transition(s, LifecycleEvent::Stop).unwrap();
        assert_eq!(s, GameStatus::Ended);
    }

    #[test]
    fn test_stop_from_any_live_status() {
        for from in [GameStatus::Waiting, GameStatus::Active, GameStatus::Paused] {
            assert_eq!(
                compute_transition(from, LifecycleEvent::Stop),
                Ok(GameStatus::Ended)
            );
        }
    }

    #[test]
    fn test_ended_is_terminal() {
        for event in [
            LifecycleEvent::Start,
            LifecycleEvent::Pause,
            LifecycleEvent::Resume,
            LifecycleEvent::Stop,
        ] {
            let err = compute_transition(GameStatus::Ended, event).unwrap_err();
            assert_eq!(err.from, GameStatus::Ended);
            assert_eq!(err.event, event);
        }
    }

    #[test]
    fn test_start_is_not_resume() {
        assert!(compute_transition(GameStatus::Paused, LifecycleEvent::Start).is_err());
        assert!(compute_transition(GameStatus::Waiting, LifecycleEvent::Resume).is_err());
        assert!(compute_transition(GameStatus::Waiting, LifecycleEvent::Pause).is_err());
        assert!(compute_transition(GameStatus::Active, LifecycleEvent::Start).is_err());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(GameStatus::Waiting.code(), 0);
        assert_eq!(GameStatus::Paused.code(), 1);
        assert_eq!(GameStatus::Active.code(), 2);
        assert_eq!(GameStatus::Ended.code(), 3);
    }

    #[test]
    fn test_sources_sql() {
        assert_eq!(sources_sql(LifecycleEvent::Start), "status IN (0)");
        assert_eq!(sources_sql(LifecycleEvent::Stop), "status IN (0, 2, 1)");
    }

    #[test]
    fn test_error_message() {
        let err = compute_transition(GameStatus::Ended, LifecycleEvent::Pause).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid transition: cannot pause a game that is Ended"
        );
    }
}
