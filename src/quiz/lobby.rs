use serde::{Deserialize, Serialize};

use super::status::GameStatus;
use super::{GameSnapshot, QuizService};
use crate::db::OpenGame;
use crate::error::{QuizError, QuizResult};
use crate::metrics;

/// Who is waiting in a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lobby {
    pub game_id: i64,
    pub status: GameStatus,
    pub participants: Vec<String>,
}

impl QuizService {
    /// Join a waiting game if it has a free slot.
    ///
    /// The capacity check and the assignment are one storage statement, so
    /// concurrent joins for the last slot cannot both succeed.
    pub async fn join_game(&self, session: &str, game_id: i64) -> QuizResult<GameSnapshot> {
        let user_id = self.resolve(session).await?;

        if !self.db.join_game(user_id, game_id).await? {
            let game = match self.db.get_game(game_id).await? {
                Some(game) => game,
                None => {
                    metrics::JOIN_ATTEMPTS_TOTAL.with_label_values(&["missing"]).inc();
                    return Err(QuizError::game_not_found(game_id));
                }
            };
            if !game.status.accepts_joins() {
                metrics::JOIN_ATTEMPTS_TOTAL.with_label_values(&["closed"]).inc();
                tracing::warn!(game_id, user_id, status = ?game.status, "join rejected: game not waiting");
                return Err(QuizError::Conflict(format!(
                    "game {game_id} is not accepting players"
                )));
            }
            metrics::JOIN_ATTEMPTS_TOTAL.with_label_values(&["full"]).inc();
            tracing::warn!(game_id, user_id, "join rejected: room full");
            return Err(QuizError::Conflict(format!("game {game_id} is full")));
        }

        metrics::JOIN_ATTEMPTS_TOTAL.with_label_values(&["joined"]).inc();
        tracing::info!(game_id, user_id, "player joined");

        let game = self.load_game(game_id).await?;
        let participants = self.db.participant_count(game_id).await?;
        Ok(GameSnapshot::new(game, participants))
    }

    /// Leave whatever game the user is in. A no-op when not in a game.
    pub async fn leave_game(&self, session: &str) -> QuizResult<()> {
        let user_id = self.resolve(session).await?;
        self.db.leave_game(user_id).await?;
        tracing::debug!(user_id, "player left");
        Ok(())
    }

    pub async fn lobby(&self, game_id: i64) -> QuizResult<Lobby> {
        let game = self.load_game(game_id).await?;
        let participants = self.db.participant_usernames(game_id).await?;
        Ok(Lobby {
            game_id,
            status: game.status,
            participants,
        })
    }

    /// Public games still accepting players, optionally for one topic.
    pub async fn open_games(&self, topic_id: Option<i64>) -> QuizResult<Vec<OpenGame>> {
        Ok(self.db.list_open_games(topic_id).await?)
    }
}
