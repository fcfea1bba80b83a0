// Row types shared by the storage layer and the quiz service.

use serde::{Deserialize, Serialize};

use crate::quiz::status::GameStatus;
use crate::scoring::Difficulty;

pub(crate) const GAME_COLUMNS: &str = "id, author_id, topic_id, difficulty, status, \
     number_of_questions, participants_number, current_question, is_private, \
     created_at, started_at, ended_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Game {
    pub id: i64,
    pub author_id: i64,
    pub topic_id: i64,
    pub difficulty: Difficulty,
    pub status: GameStatus,
    pub number_of_questions: i64,
    pub participants_number: i64,
    pub current_question: i64,
    pub is_private: bool,
    pub created_at: String,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewGame {
    pub author_id: i64,
    pub topic_id: i64,
    pub difficulty: Difficulty,
    pub number_of_questions: i64,
    pub participants_number: i64,
    pub is_private: bool,
}

/// A question as handed to the bulk loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub question_number: i64,
    pub question_text: String,
    pub answers: Vec<String>,
    pub right_answer_number: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuestionRow {
    pub game_id: i64,
    pub question_number: i64,
    pub question_text: String,
    pub answer_1: String,
    pub answer_2: String,
    pub answer_3: String,
    pub answer_4: String,
    pub right_answer_number: i64,
}

/// A question as served to players: never carries the correct index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub game_id: i64,
    pub question_number: i64,
    pub question_text: String,
    pub answers: Vec<String>,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Question {
            game_id: row.game_id,
            question_number: row.question_number,
            question_text: row.question_text,
            answers: vec![row.answer_1, row.answer_2, row.answer_3, row.answer_4],
        }
    }
}

/// Account row used by the identity layer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserStats {
    pub id: i64,
    pub username: String,
    pub current_game_id: Option<i64>,
    pub global_points: i64,
    pub global_possible_points: i64,
    pub current_game_points: i64,
    pub games_played: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OpenGame {
    pub id: i64,
    pub topic_id: i64,
    pub difficulty: Difficulty,
    pub participants: i64,
    pub participants_number: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayedGame {
    pub game_id: i64,
    pub topic_id: i64,
    pub difficulty: Difficulty,
    pub points: i64,
    pub finished_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GameStanding {
    pub username: String,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GlobalStanding {
    pub user_id: i64,
    pub username: String,
    pub global_points: i64,
    pub global_possible_points: i64,
}
