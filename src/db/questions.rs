use super::models::{NewQuestion, QuestionRow};
use super::Database;

impl Database {
    /// Insert a game's question set in one transaction.
    ///
    /// Returns the number of inserted rows, or `None` if the game does not
    /// exist. A duplicate `(game_id, question_number)` fails with a unique
    /// violation and nothing is inserted.
    pub async fn insert_questions(
        &self,
        game_id: i64,
        questions: &[NewQuestion],
    ) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for q in questions {
            let [a1, a2, a3, a4] = answers(q);
            let result = sqlx::query(
                "INSERT INTO questions (game_id, question_number, question_text, \
                                        answer_1, answer_2, answer_3, answer_4, right_answer_number) \
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8 WHERE EXISTS (SELECT 1 FROM games WHERE id = ?1)",
            )
            .bind(game_id)
            .bind(q.question_number)
            .bind(&q.question_text)
            .bind(a1)
            .bind(a2)
            .bind(a3)
            .bind(a4)
            .bind(q.right_answer_number)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(None);
            }
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(Some(inserted))
    }

    /// Advance the cursor by one and return the new value.
    ///
    /// The cursor never passes the configured question count nor the number
    /// of loaded questions; `None` means it could not advance.
    pub async fn advance_cursor(&self, game_id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            UPDATE games SET current_question = current_question + 1
            WHERE id = ?1
              AND current_question < MIN(number_of_questions,
                                         (SELECT COUNT(*) FROM questions WHERE game_id = ?1))
            RETURNING current_question
            "#,
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_question(
        &self,
        game_id: i64,
        question_number: i64,
    ) -> Result<Option<QuestionRow>, sqlx::Error> {
        sqlx::query_as::<_, QuestionRow>(
            "SELECT game_id, question_number, question_text, answer_1, answer_2, answer_3, answer_4, \
                    right_answer_number \
             FROM questions WHERE game_id = ? AND question_number = ?",
        )
        .bind(game_id)
        .bind(question_number)
        .fetch_optional(&self.pool)
        .await
    }
}

/// The four answer texts; missing entries become empty strings. Callers
/// validate the count before loading.
fn answers(q: &NewQuestion) -> [&str; 4] {
    let at = |i: usize| q.answers.get(i).map(String::as_str).unwrap_or("");
    [at(0), at(1), at(2), at(3)]
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::*;

    #[tokio::test]
    async fn test_insert_and_fetch_questions() {
        let db = test_db().await;
        let host = user(&db, "host").await;
        let game = db.create_game(&new_game(host, 4, 2)).await.unwrap().unwrap();

        let inserted = db
            .insert_questions(game.id, &[question(1, 3), question(2, 4)])
            .await
            .unwrap();
        assert_eq!(inserted, Some(2));

        let q = db.get_question(game.id, 1).await.unwrap().unwrap();
        assert_eq!(q.question_text, "Question 1?");
        assert_eq!(q.answer_3, "third");
        assert_eq!(q.right_answer_number, 3);
        assert!(db.get_question(game.id, 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_questions_for_missing_game() {
        let db = test_db().await;
        assert_eq!(db.insert_questions(77, &[question(1, 1)]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reloading_questions_is_rejected_atomically() {
        let db = test_db().await;
        let host = user(&db, "host").await;
        let game = db.create_game(&new_game(host, 4, 2)).await.unwrap().unwrap();
        db.insert_questions(game.id, &[question(1, 1)]).await.unwrap();

        let err = db
            .insert_questions(game.id, &[question(2, 1), question(1, 1)])
            .await
            .unwrap_err();
        assert!(err
            .as_database_error()
            .is_some_and(|e| e.is_unique_violation()));
        assert!(db.get_question(game.id, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cursor_stops_at_loaded_count() {
        let db = test_db().await;
        let host = user(&db, "host").await;
        let game = db.create_game(&new_game(host, 4, 3)).await.unwrap().unwrap();
        assert_eq!(db.advance_cursor(game.id).await.unwrap(), None);

        db.insert_questions(game.id, &[question(1, 1), question(2, 2)])
            .await
            .unwrap();
        assert_eq!(db.advance_cursor(game.id).await.unwrap(), Some(1));
        assert_eq!(db.advance_cursor(game.id).await.unwrap(), Some(2));
        assert_eq!(db.advance_cursor(game.id).await.unwrap(), None);
        assert_eq!(db.get_game(game.id).await.unwrap().unwrap().current_question, 2);
    }
}
