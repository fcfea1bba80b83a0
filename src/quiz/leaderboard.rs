use super::{QuizService, GLOBAL_LEADERBOARD_SIZE};
use crate::db::{GameStanding, GlobalStanding};
use crate::error::QuizResult;

impl QuizService {
    /// Players currently in the game, highest current-game points first.
    pub async fn game_leaderboard(&self, game_id: i64) -> QuizResult<Vec<GameStanding>> {
        self.load_game(game_id).await?;
        Ok(self.db.game_standings(game_id).await?)
    }

    /// Top players by lifetime points; ties favour fewer possible points.
    pub async fn global_leaderboard(&self) -> QuizResult<Vec<GlobalStanding>> {
        Ok(self.db.global_standings(GLOBAL_LEADERBOARD_SIZE).await?)
    }
}
