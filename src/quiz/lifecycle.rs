use serde::Deserialize;

use super::status::{compute_transition, LifecycleEvent};
use super::{QuizService, MIN_PARTICIPANTS};
use crate::db::{Game, NewGame};
use crate::error::{QuizError, QuizResult};
use crate::metrics;
use crate::scoring::Difficulty;

/// Parameters for a new game. `difficulty` is the level 1-3.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGame {
    pub difficulty: i64,
    pub number_of_questions: i64,
    pub participants_number: i64,
    pub topic_id: i64,
    /// Defaults to private.
    pub is_private: Option<bool>,
}

impl QuizService {
    pub async fn create_game(&self, host_user_id: i64, req: CreateGame) -> QuizResult<Game> {
        let difficulty = Difficulty::from_level(req.difficulty).ok_or_else(|| {
            QuizError::InvalidArgument(format!("difficulty must be 1-3, got {}", req.difficulty))
        })?;
        if req.participants_number < MIN_PARTICIPANTS {
            return Err(QuizError::InvalidArgument(format!(
                "participants_number must be at least {MIN_PARTICIPANTS}"
            )));
        }
        if req.number_of_questions < 1 {
            return Err(QuizError::InvalidArgument(
                "number_of_questions must be at least 1".into(),
            ));
        }

        let new_game = NewGame {
            author_id: host_user_id,
            topic_id: req.topic_id,
            difficulty,
            number_of_questions: req.number_of_questions,
            participants_number: req.participants_number,
            is_private: req.is_private.unwrap_or(true),
        };
        let game = self
            .db
            .create_game(&new_game)
            .await?
            .ok_or_else(|| QuizError::NotFound(format!("user {host_user_id}")))?;

        metrics::GAMES_CREATED_TOTAL
            .with_label_values(&[difficulty.as_str()])
            .inc();
        tracing::info!(game_id = game.id, host_user_id, "game created");
        Ok(game)
    }

    pub async fn start_game(&self, game_id: i64) -> QuizResult<Game> {
        self.transition(game_id, LifecycleEvent::Start).await
    }

    pub async fn pause_game(&self, game_id: i64) -> QuizResult<Game> {
        self.transition(game_id, LifecycleEvent::Pause).await
    }

    pub async fn resume_game(&self, game_id: i64) -> QuizResult<Game> {
        self.transition(game_id, LifecycleEvent::Resume).await
    }

    /// End the game and release everyone still in its lobby.
    pub async fn stop_game(&self, game_id: i64) -> QuizResult<Game> {
        match self.db.stop_game(game_id).await? {
            Some(evicted) => {
                metrics::GAME_TRANSITIONS_TOTAL
                    .with_label_values(&[LifecycleEvent::Stop.as_str()])
                    .inc();
                metrics::PLAYERS_EVICTED_TOTAL.inc_by(evicted);
                tracing::info!(game_id, evicted, "game stopped");
                self.load_game(game_id).await
            }
            None => Err(self.rejected(game_id, LifecycleEvent::Stop).await),
        }
    }

    /// Remove a game in any status, evicting its participants first.
    pub async fn delete_game(&self, game_id: i64) -> QuizResult<()> {
        let evicted = self
            .db
            .delete_game(game_id)
            .await?
            .ok_or_else(|| QuizError::game_not_found(game_id))?;
        metrics::PLAYERS_EVICTED_TOTAL.inc_by(evicted);
        tracing::info!(game_id, evicted, "game deleted");
        Ok(())
    }

    pub async fn set_private(&self, game_id: i64, is_private: bool) -> QuizResult<()> {
        if !self.db.set_game_private(game_id, is_private).await? {
            return Err(QuizError::game_not_found(game_id));
        }
        Ok(())
    }

    /// Change the lobby cap. Refused if more players than `cap` are already in.
    pub async fn change_capacity(&self, game_id: i64, cap: i64) -> QuizResult<Game> {
        if cap < MIN_PARTICIPANTS {
            return Err(QuizError::InvalidArgument(format!(
                "participants_number must be at least {MIN_PARTICIPANTS}"
            )));
        }
        if !self.db.set_participants_number(game_id, cap).await? {
            self.load_game(game_id).await?;
            return Err(QuizError::Conflict(format!(
                "game {game_id} already has more than {cap} participants"
            )));
        }
        self.load_game(game_id).await
    }

    async fn transition(&self, game_id: i64, event: LifecycleEvent) -> QuizResult<Game> {
        if !self.db.apply_transition(game_id, event).await? {
            return Err(self.rejected(game_id, event).await);
        }
        metrics::GAME_TRANSITIONS_TOTAL
            .with_label_values(&[event.as_str()])
            .inc();
        tracing::info!(game_id, event = event.as_str(), "game status changed");
        self.load_game(game_id).await
    }

    /// Explain why a conditional transition changed nothing.
    async fn rejected(&self, game_id: i64, event: LifecycleEvent) -> QuizError {
        match self.db.game_status(game_id).await {
            Err(e) => e.into(),
            Ok(None) => QuizError::game_not_found(game_id),
            Ok(Some(from)) => match compute_transition(from, event) {
                Err(invalid) => invalid.into(),
                Ok(_) => QuizError::Conflict(format!(
                    "game {game_id} changed status concurrently"
                )),
            },
        }
    }
}
