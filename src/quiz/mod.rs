// Quiz core: game lifecycle, lobby capacity, question sequencing, answer
// scoring and leaderboards over an injected store and identity provider.

mod answers;
mod leaderboard;
mod lifecycle;
mod lobby;
mod players;
mod sequencer;
pub mod status;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::db::{Database, Game};
use crate::error::{QuizError, QuizResult};
use crate::scoring::Difficulty;
use status::GameStatus;

pub use answers::Submission;
pub use lifecycle::CreateGame;
pub use lobby::Lobby;

/// Smallest lobby a game may be configured for.
pub const MIN_PARTICIPANTS: i64 = 4;

/// Entries in the global leaderboard.
pub const GLOBAL_LEADERBOARD_SIZE: i64 = 100;

/// A game's preset plus its current lobby size, as returned from a join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub id: i64,
    pub author_id: i64,
    pub topic_id: i64,
    pub difficulty: Difficulty,
    pub status: GameStatus,
    pub number_of_questions: i64,
    pub participants_number: i64,
    pub participants: i64,
    pub is_private: bool,
}

impl GameSnapshot {
    fn new(game: Game, participants: i64) -> Self {
        GameSnapshot {
            id: game.id,
            author_id: game.author_id,
            topic_id: game.topic_id,
            difficulty: game.difficulty,
            status: game.status,
            number_of_questions: game.number_of_questions,
            participants_number: game.participants_number,
            participants,
            is_private: game.is_private,
        }
    }
}

#[derive(Clone)]
pub struct QuizService {
    db: Arc<Database>,
    identity: Arc<dyn Identity>,
}

impl QuizService {
    pub fn new(db: Arc<Database>, identity: Arc<dyn Identity>) -> Self {
        Self { db, identity }
    }

    async fn resolve(&self, session: &str) -> QuizResult<i64> {
        self.identity
            .resolve_user(session)
            .await?
            .ok_or(QuizError::Unauthenticated)
    }

    async fn load_game(&self, game_id: i64) -> QuizResult<Game> {
        self.db
            .get_game(game_id)
            .await?
            .ok_or_else(|| QuizError::game_not_found(game_id))
    }

    pub async fn game(&self, game_id: i64) -> QuizResult<Game> {
        self.load_game(game_id).await
    }
}
