use super::status::GameStatus;
use super::QuizService;
use crate::db::{NewQuestion, Question};
use crate::error::{QuizError, QuizResult};
use crate::metrics;

const ANSWERS_PER_QUESTION: usize = 4;

/// Reject sets that do not hold exactly the game's configured number of
/// questions, are not numbered `1..=n`, or are not made of four answers with
/// a correct index in `1..=4`.
fn validate_question_set(questions: &[NewQuestion], configured: i64) -> QuizResult<()> {
    if questions.is_empty() {
        return Err(QuizError::InvalidArgument("question set is empty".into()));
    }
    if questions.len() as i64 != configured {
        return Err(QuizError::InvalidArgument(format!(
            "{} questions given but the game is configured for {configured}",
            questions.len()
        )));
    }

    let mut numbers: Vec<i64> = questions.iter().map(|q| q.question_number).collect();
    numbers.sort_unstable();
    if numbers.iter().zip(1..).any(|(n, expected)| *n != expected) {
        return Err(QuizError::InvalidArgument(
            "question numbers must form 1..=n without gaps or repeats".into(),
        ));
    }

    for q in questions {
        if q.answers.len() != ANSWERS_PER_QUESTION {
            return Err(QuizError::InvalidArgument(format!(
                "question {} has {} answers, expected {ANSWERS_PER_QUESTION}",
                q.question_number,
                q.answers.len()
            )));
        }
        if !(1..=ANSWERS_PER_QUESTION as i64).contains(&q.right_answer_number) {
            return Err(QuizError::InvalidArgument(format!(
                "question {} has right answer {}, expected 1-{ANSWERS_PER_QUESTION}",
                q.question_number, q.right_answer_number
            )));
        }
    }
    Ok(())
}

impl QuizService {
    /// Bulk-load a game's questions. A second load for the same game is
    /// refused without inserting anything.
    pub async fn load_questions(&self, game_id: i64, questions: Vec<NewQuestion>) -> QuizResult<u64> {
        let game = self.load_game(game_id).await?;
        validate_question_set(&questions, game.number_of_questions)?;

        let inserted = match self.db.insert_questions(game_id, &questions).await {
            Ok(Some(n)) => n,
            Ok(None) => return Err(QuizError::game_not_found(game_id)),
            Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
                return Err(QuizError::Conflict(format!(
                    "questions for game {game_id} are already loaded"
                )))
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(game_id, inserted, "questions loaded");
        Ok(inserted)
    }

    /// Advance the cursor and serve the question it now points at.
    /// `OutOfRange` once every loaded question has been served.
    pub async fn next_question(&self, game_id: i64) -> QuizResult<Question> {
        let Some(number) = self.db.advance_cursor(game_id).await? else {
            self.load_game(game_id).await?;
            return Err(QuizError::OutOfRange(format!(
                "no more questions in game {game_id}"
            )));
        };

        let row = self
            .db
            .get_question(game_id, number)
            .await?
            .ok_or_else(|| QuizError::NotFound(format!("question {number} of game {game_id}")))?;
        metrics::QUESTIONS_SERVED_TOTAL.inc();
        tracing::debug!(game_id, number, "question served");
        Ok(row.into())
    }

    /// Re-fetch a question that has already been served.
    pub async fn question(&self, game_id: i64, question_number: i64) -> QuizResult<Question> {
        let game = self.load_game(game_id).await?;
        if question_number < 1 || question_number > game.current_question {
            return Err(QuizError::OutOfRange(format!(
                "question {question_number} of game {game_id} has not been served"
            )));
        }
        let row = self
            .db
            .get_question(game_id, question_number)
            .await?
            .ok_or_else(|| {
                QuizError::NotFound(format!("question {question_number} of game {game_id}"))
            })?;
        Ok(row.into())
    }

    /// Correct answer index, only while the game is active.
    pub async fn right_answer(&self, game_id: i64, question_number: i64) -> QuizResult<i64> {
        let game = self.load_game(game_id).await?;
        if game.status != GameStatus::Active {
            return Err(QuizError::Conflict(format!(
                "game {game_id} is not active"
            )));
        }
        self.db
            .get_question(game_id, question_number)
            .await?
            .map(|q| q.right_answer_number)
            .ok_or_else(|| QuizError::NotFound(format!("question {question_number} of game {game_id}")))
    }
}
