use serde::Deserialize;

use super::QuizService;
use crate::error::{QuizError, QuizResult};
use crate::metrics;
use crate::scoring::{score_answer, AnswerScore};

#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub question_number: i64,
    /// 1-based index of the chosen answer.
    pub answer_number: i64,
    pub elapsed_seconds: f64,
}

impl QuizService {
    /// Score an answer and credit the player's ledgers.
    ///
    /// Possible points are credited on every attempt, awarded points only on
    /// a correct one. The player must be in the game and the game active.
    pub async fn submit_answer(
        &self,
        session: &str,
        game_id: i64,
        submission: Submission,
    ) -> QuizResult<AnswerScore> {
        let user_id = self.resolve(session).await?;

        if !submission.elapsed_seconds.is_finite() || submission.elapsed_seconds < 0.0 {
            return Err(QuizError::InvalidArgument(
                "elapsed_seconds must be a non-negative number".into(),
            ));
        }
        if !(1..=4).contains(&submission.answer_number) {
            return Err(QuizError::InvalidArgument("answer_number must be 1-4".into()));
        }

        let game = self.load_game(game_id).await?;
        let right = self.right_answer(game_id, submission.question_number).await?;
        let score = score_answer(
            game.difficulty,
            submission.elapsed_seconds,
            submission.answer_number == right,
        );

        if !self
            .db
            .credit_answer(user_id, game_id, score.awarded, score.possible)
            .await?
        {
            return Err(QuizError::Conflict(format!(
                "user {user_id} is not playing game {game_id}"
            )));
        }

        let result = if score.correct { "correct" } else { "wrong" };
        metrics::ANSWERS_TOTAL.with_label_values(&[result]).inc();
        metrics::ANSWER_ELAPSED_SECONDS.observe(submission.elapsed_seconds);
        if score.awarded > 0 {
            metrics::POINTS_AWARDED_TOTAL
                .with_label_values(&[game.difficulty.as_str()])
                .inc_by(score.awarded as u64);
        }
        tracing::debug!(
            game_id,
            user_id,
            question = submission.question_number,
            awarded = score.awarded,
            "answer scored"
        );
        Ok(score)
    }
}
