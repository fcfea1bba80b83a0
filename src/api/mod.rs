// HTTP API routes (game lifecycle, lobby, questions, answers, leaderboards)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{FromRef, Json, Path, Query, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{self, CurrentUser, Identity, SessionIdentity};
use crate::db::{Game, NewQuestion};
use crate::error::AppError;
use crate::metrics;
use crate::quiz::{CreateGame, QuizService, Submission};

// ── Request types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetPrivateRequest {
    pub is_private: bool,
}

#[derive(Deserialize)]
pub struct ChangeCapacityRequest {
    pub participants_number: i64,
}

#[derive(Deserialize)]
pub struct LoadQuestionsRequest {
    pub questions: Vec<NewQuestion>,
}

#[derive(Deserialize)]
pub struct OpenGamesParams {
    pub topic_id: Option<i64>,
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub quiz: QuizService,
    pub identity: Arc<SessionIdentity>,
}

impl AppState {
    pub fn new(quiz: QuizService, identity: Arc<SessionIdentity>) -> Self {
        Self { quiz, identity }
    }
}

impl FromRef<AppState> for Arc<SessionIdentity> {
    fn from_ref(state: &AppState) -> Self {
        state.identity.clone()
    }
}

impl FromRef<AppState> for Arc<dyn Identity> {
    fn from_ref(state: &AppState) -> Self {
        state.identity.clone()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(me))
        .route("/api/users/me/games", get(my_games))
        // Games
        .route("/api/games", post(create_game))
        .route("/api/games/open", get(open_games))
        .route("/api/games/leave", post(leave_game))
        .route("/api/games/{id}", get(get_game).delete(delete_game))
        .route("/api/games/{id}/start", post(start_game))
        .route("/api/games/{id}/pause", post(pause_game))
        .route("/api/games/{id}/resume", post(resume_game))
        .route("/api/games/{id}/stop", post(stop_game))
        .route("/api/games/{id}/private", put(set_private))
        .route("/api/games/{id}/capacity", put(change_capacity))
        // Lobby
        .route("/api/games/{id}/join", post(join_game))
        .route("/api/games/{id}/lobby", get(get_lobby))
        // Questions and answers
        .route("/api/games/{id}/questions", post(load_questions))
        .route("/api/games/{id}/questions/next", post(next_question))
        .route("/api/games/{id}/questions/{n}", get(get_question))
        .route("/api/games/{id}/questions/{n}/answer", get(get_right_answer))
        .route("/api/games/{id}/answers", post(submit_answer))
        // Leaderboards
        .route("/api/games/{id}/leaderboard", get(game_leaderboard))
        .route("/api/leaderboard", get(global_leaderboard))
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Count and time every request, labelled by normalized path.
async fn track_metrics(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let endpoint = metrics::normalize_path(req.uri().path());
    let started = Instant::now();

    let response = next.run(req).await;

    metrics::API_REQUEST_DURATION_SECONDS
        .with_label_values(&[&endpoint])
        .observe(started.elapsed().as_secs_f64());
    metrics::API_REQUESTS_TOTAL
        .with_label_values(&[&method, &endpoint, response.status().as_str()])
        .inc();
    response
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "quiz-backend" }))
}

async fn metrics_handler() -> impl IntoResponse {
    (
        [("content-type", "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

/// Only the game's author may manage it.
fn ensure_author(game: &Game, user: &CurrentUser) -> Result<(), AppError> {
    if game.author_id != user.user_id {
        return Err(AppError::Forbidden(format!(
            "only the author may manage game {}",
            game.id
        )));
    }
    Ok(())
}

async fn authored_game(
    state: &AppState,
    id: i64,
    user: &CurrentUser,
) -> Result<Game, AppError> {
    let game = state.quiz.game(id).await?;
    ensure_author(&game, user)?;
    Ok(game)
}

// ── Players ──────────────────────────────────────────────────────────

async fn me(State(state): State<AppState>, user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.quiz.stats(&user.token).await?))
}

async fn my_games(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.quiz.history(&user.token).await?))
}

// ── Game lifecycle ───────────────────────────────────────────────────

/// Create a game and put its host in the lobby.
async fn create_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateGame>,
) -> Result<impl IntoResponse, AppError> {
    let game = state.quiz.create_game(user.user_id, req).await?;
    let snapshot = state.quiz.join_game(&user.token, game.id).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.quiz.game(id).await?))
}

async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    authored_game(&state, id, &user).await?;
    state.quiz.delete_game(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn start_game(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    authored_game(&state, id, &user).await?;
    Ok(Json(state.quiz.start_game(id).await?))
}

async fn pause_game(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    authored_game(&state, id, &user).await?;
    Ok(Json(state.quiz.pause_game(id).await?))
}

async fn resume_game(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    authored_game(&state, id, &user).await?;
    Ok(Json(state.quiz.resume_game(id).await?))
}

async fn stop_game(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    authored_game(&state, id, &user).await?;
    Ok(Json(state.quiz.stop_game(id).await?))
}

async fn set_private(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Json(req): Json<SetPrivateRequest>,
) -> Result<impl IntoResponse, AppError> {
    authored_game(&state, id, &user).await?;
    state.quiz.set_private(id, req.is_private).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn change_capacity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Json(req): Json<ChangeCapacityRequest>,
) -> Result<impl IntoResponse, AppError> {
    authored_game(&state, id, &user).await?;
    Ok(Json(
        state.quiz.change_capacity(id, req.participants_number).await?,
    ))
}

// ── Lobby ────────────────────────────────────────────────────────────

async fn join_game(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.quiz.join_game(&user.token, id).await?))
}

async fn leave_game(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    state.quiz.leave_game(&user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_lobby(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.quiz.lobby(id).await?))
}

async fn open_games(
    State(state): State<AppState>,
    Query(params): Query<OpenGamesParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.quiz.open_games(params.topic_id).await?))
}

// ── Questions and answers ────────────────────────────────────────────

async fn load_questions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Json(req): Json<LoadQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    authored_game(&state, id, &user).await?;
    let loaded = state.quiz.load_questions(id, req.questions).await?;
    Ok((StatusCode::CREATED, Json(json!({ "loaded": loaded }))))
}

async fn next_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.quiz.next_question(id).await?))
}

async fn get_question(
    State(state): State<AppState>,
    Path((id, n)): Path<(i64, i64)>,
    _user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.quiz.question(id, n).await?))
}

async fn get_right_answer(
    State(state): State<AppState>,
    Path((id, n)): Path<(i64, i64)>,
    _user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let right = state.quiz.right_answer(id, n).await?;
    Ok(Json(json!({ "question_number": n, "right_answer_number": right })))
}

async fn submit_answer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Json(submission): Json<Submission>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.quiz.submit_answer(&user.token, id, submission).await?))
}

// ── Leaderboards ─────────────────────────────────────────────────────

async fn game_leaderboard(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.quiz.game_leaderboard(id).await?))
}

async fn global_leaderboard(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.quiz.global_leaderboard().await?))
}
