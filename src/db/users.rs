use super::models::{PlayedGame, User, UserStats};
use super::Database;
use crate::quiz::status::GameStatus;

const USER_STATS_COLUMNS: &str = "id, username, current_game_id, global_points, \
     global_possible_points, current_game_points, games_played";

impl Database {
    // ── Accounts ──────────────────────────────────────────────────────

    pub async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES (?, ?) \
             RETURNING id, username, password_hash, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_user_stats(&self, id: i64) -> Result<Option<UserStats>, sqlx::Error> {
        let sql = format!("SELECT {USER_STATS_COLUMNS} FROM users WHERE id = ?");
        sqlx::query_as::<_, UserStats>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    // ── Participation ─────────────────────────────────────────────────

    /// Put a user into a waiting game's lobby if a slot is free.
    ///
    /// The status check, the participant count and the assignment happen in
    /// one statement. A user already in this lobby is accepted without
    /// counting twice; moving in from another game resets the current-game
    /// points. Returns false when the game is missing, not waiting or full.
    pub async fn join_game(&self, user_id: i64, game_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET current_game_points = CASE WHEN current_game_id IS ?1 THEN current_game_points ELSE 0 END,
                current_game_id = ?1
            WHERE id = ?2
              AND EXISTS (
                  SELECT 1 FROM games g
                  WHERE g.id = ?1
                    AND g.status = ?3
                    AND (users.current_game_id IS ?1
                         OR (SELECT COUNT(*) FROM users u WHERE u.current_game_id = ?1) < g.participants_number)
              )
            "#,
        )
        .bind(game_id)
        .bind(user_id)
        .bind(GameStatus::Waiting)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear a user's current game. Idempotent.
    pub async fn leave_game(&self, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET current_game_id = NULL WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ── Points ────────────────────────────────────────────────────────

    /// Credit one scored answer to a participant of `game_id`.
    ///
    /// `possible` always goes to the lifetime-possible ledger; `awarded` goes
    /// to both the lifetime and current-game ledgers. Returns false when the
    /// user is not in that game.
    pub async fn credit_answer(
        &self,
        user_id: i64,
        game_id: i64,
        awarded: i64,
        possible: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET global_possible_points = global_possible_points + ?1, \
                              global_points = global_points + ?2, \
                              current_game_points = current_game_points + ?2 \
             WHERE id = ?3 AND current_game_id = ?4",
        )
        .bind(possible)
        .bind(awarded)
        .bind(user_id)
        .bind(game_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── History ───────────────────────────────────────────────────────

    pub async fn games_played(&self, user_id: i64) -> Result<Vec<PlayedGame>, sqlx::Error> {
        sqlx::query_as::<_, PlayedGame>(
            r#"
            SELECT gp.game_id, g.topic_id, g.difficulty, gp.points, gp.finished_at
            FROM games_played gp
            JOIN games g ON g.id = gp.game_id
            WHERE gp.user_id = ?
            ORDER BY gp.finished_at DESC, gp.game_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
