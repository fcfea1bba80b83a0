use super::QuizService;
use crate::db::{PlayedGame, UserStats};
use crate::error::{QuizError, QuizResult};

impl QuizService {
    pub async fn stats(&self, session: &str) -> QuizResult<UserStats> {
        let user_id = self.resolve(session).await?;
        self.db
            .get_user_stats(user_id)
            .await?
            .ok_or_else(|| QuizError::NotFound(format!("user {user_id}")))
    }

    /// Finished games the player was in when they were stopped.
    pub async fn history(&self, session: &str) -> QuizResult<Vec<PlayedGame>> {
        let user_id = self.resolve(session).await?;
        Ok(self.db.games_played(user_id).await?)
    }
}
