use super::models::{Game, NewGame, OpenGame, GAME_COLUMNS};
use super::Database;
use crate::quiz::status::{self, GameStatus, LifecycleEvent};

impl Database {
    // ── Game CRUD ─────────────────────────────────────────────────────

    /// Insert a game owned by an existing user. `None` if the author does not exist.
    pub async fn create_game(&self, game: &NewGame) -> Result<Option<Game>, sqlx::Error> {
        let sql = format!(
            "INSERT INTO games (author_id, topic_id, difficulty, number_of_questions, participants_number, is_private) \
             SELECT ?1, ?2, ?3, ?4, ?5, ?6 WHERE EXISTS (SELECT 1 FROM users WHERE id = ?1) \
             RETURNING {GAME_COLUMNS}"
        );
        sqlx::query_as::<_, Game>(&sql)
            .bind(game.author_id)
            .bind(game.topic_id)
            .bind(game.difficulty)
            .bind(game.number_of_questions)
            .bind(game.participants_number)
            .bind(game.is_private)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_game(&self, id: i64) -> Result<Option<Game>, sqlx::Error> {
        let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?");
        sqlx::query_as::<_, Game>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn game_status(&self, id: i64) -> Result<Option<GameStatus>, sqlx::Error> {
        sqlx::query_scalar::<_, GameStatus>("SELECT status FROM games WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn set_game_private(&self, id: i64, is_private: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE games SET is_private = ? WHERE id = ?")
            .bind(is_private)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Change the participant cap unless the lobby already holds more users
    /// than the new cap allows.
    pub async fn set_participants_number(&self, id: i64, cap: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE games SET participants_number = ?2 \
             WHERE id = ?1 AND (SELECT COUNT(*) FROM users WHERE current_game_id = ?1) <= ?2",
        )
        .bind(id)
        .bind(cap)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Lifecycle ─────────────────────────────────────────────────────

    /// Apply a lifecycle event if the game is in one of the event's source
    /// statuses. Returns false when nothing changed.
    pub async fn apply_transition(
        &self,
        id: i64,
        event: LifecycleEvent,
    ) -> Result<bool, sqlx::Error> {
        let stamp = match event {
            LifecycleEvent::Start => ", started_at = COALESCE(started_at, datetime('now'))",
            LifecycleEvent::Stop => return Ok(self.stop_game(id).await?.is_some()),
            LifecycleEvent::Pause | LifecycleEvent::Resume => "",
        };
        let sql = format!(
            "UPDATE games SET status = ?{stamp} WHERE id = ? AND {}",
            status::sources_sql(event)
        );
        let result = sqlx::query(&sql)
            .bind(event.target())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// End a game and release its participants in one transaction.
    ///
    /// Records a history row and bumps the games-played counter for every
    /// user still in the lobby, then clears their current game. Returns the
    /// number of evicted users, or `None` if the game could not be stopped.
    pub async fn stop_game(&self, id: i64) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE games SET status = ?, ended_at = datetime('now') WHERE id = ? AND {}",
            status::sources_sql(LifecycleEvent::Stop)
        );
        let ended = sqlx::query(&sql)
            .bind(GameStatus::Ended)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if ended.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query(
            "INSERT OR IGNORE INTO games_played (user_id, game_id, points) \
             SELECT id, ?1, current_game_points FROM users WHERE current_game_id = ?1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let evicted = sqlx::query(
            "UPDATE users SET games_played = games_played + 1, current_game_id = NULL \
             WHERE current_game_id = ?",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(evicted.rows_affected()))
    }

    /// Evict participants and remove the game. Questions and history rows
    /// cascade. Returns the number of evicted users, or `None` if the game
    /// does not exist.
    pub async fn delete_game(&self, id: i64) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let evicted = sqlx::query("UPDATE users SET current_game_id = NULL WHERE current_game_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM games WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(evicted.rows_affected()))
    }

    // ── Lobby queries ─────────────────────────────────────────────────

    pub async fn participant_count(&self, id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE current_game_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn participant_usernames(&self, id: i64) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT username FROM users WHERE current_game_id = ? ORDER BY username")
            .bind(id)
            .fetch_all(&self.pool)
            .await
    }

    /// Public games still waiting for players, optionally for one topic.
    pub async fn list_open_games(&self, topic_id: Option<i64>) -> Result<Vec<OpenGame>, sqlx::Error> {
        sqlx::query_as::<_, OpenGame>(
            r#"
            SELECT g.id, g.topic_id, g.difficulty, g.participants_number,
                   (SELECT COUNT(*) FROM users u WHERE u.current_game_id = g.id) AS participants
            FROM games g
            WHERE g.status = ?1 AND g.is_private = 0 AND (?2 IS NULL OR g.topic_id = ?2)
            ORDER BY g.id
            "#,
        )
        .bind(GameStatus::Waiting)
        .bind(topic_id)
        .fetch_all(&self.pool)
        .await
    }
}
