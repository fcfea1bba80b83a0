// Shared setup for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use quiz_backend::auth::{Session, SessionIdentity};
use quiz_backend::db::{Database, Game, NewQuestion};
use quiz_backend::quiz::{CreateGame, QuizService};

pub struct TestApp {
    pub quiz: QuizService,
    pub identity: Arc<SessionIdentity>,
    pub db: Arc<Database>,
}

impl TestApp {
    /// Single-connection in-memory store.
    pub async fn in_memory() -> Self {
        Self::with_url("sqlite::memory:", 1).await
    }

    /// A fresh database file in the temp dir, so several pooled connections
    /// share one store and genuinely race.
    pub async fn on_disk(connections: u32) -> Self {
        let path = std::env::temp_dir().join(format!("quiz-{}.sqlite", uuid::Uuid::new_v4()));
        let url = format!("sqlite://{}", path.display());
        Self::with_url(&url, connections).await
    }

    async fn with_url(url: &str, connections: u32) -> Self {
        let db = Arc::new(Database::connect(url, connections).await.unwrap());
        let identity = Arc::new(SessionIdentity::new(db.clone(), 24));
        let quiz = QuizService::new(db.clone(), identity.clone());
        TestApp { quiz, identity, db }
    }

    pub async fn player(&self, name: &str) -> Session {
        self.identity.register(name, "password123").await.unwrap()
    }

    pub async fn game(&self, host: i64, difficulty: i64, questions: i64, cap: i64) -> Game {
        self.quiz
            .create_game(
                host,
                CreateGame {
                    difficulty,
                    number_of_questions: questions,
                    participants_number: cap,
                    topic_id: 1,
                    is_private: Some(false),
                },
            )
            .await
            .unwrap()
    }
}

pub fn question(number: i64, right: i64) -> NewQuestion {
    NewQuestion {
        question_number: number,
        question_text: format!("Question {number}?"),
        answers: ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect(),
        right_answer_number: right,
    }
}
