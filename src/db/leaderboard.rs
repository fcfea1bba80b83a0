use super::models::{GameStanding, GlobalStanding};
use super::Database;

impl Database {
    /// Current participants of a game ranked by current-game points.
    pub async fn game_standings(&self, game_id: i64) -> Result<Vec<GameStanding>, sqlx::Error> {
        sqlx::query_as::<_, GameStanding>(
            "SELECT username, current_game_points AS points FROM users \
             WHERE current_game_id = ? \
             ORDER BY current_game_points DESC, username ASC",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Users ranked by lifetime points; ties go to the smaller possible-points
    /// total.
    pub async fn global_standings(&self, limit: i64) -> Result<Vec<GlobalStanding>, sqlx::Error> {
        sqlx::query_as::<_, GlobalStanding>(
            "SELECT id AS user_id, username, global_points, global_possible_points FROM users \
             ORDER BY global_points DESC, global_possible_points ASC, id ASC \
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
