// Prometheus metrics definitions for the quiz backend.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Counters ─────────────────────────────────────────────────────

    /// Games created, by difficulty.
    pub static ref GAMES_CREATED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("quiz_games_created_total", "Total games created"),
        &["difficulty"],
    )
    .unwrap();

    /// Applied lifecycle transitions, by event (start, pause, resume, stop).
    pub static ref GAME_TRANSITIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("quiz_game_transitions_total", "Applied game status transitions"),
        &["event"],
    )
    .unwrap();

    /// Join attempts, by outcome (joined, full, closed, missing).
    pub static ref JOIN_ATTEMPTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("quiz_join_attempts_total", "Lobby join attempts"),
        &["outcome"],
    )
    .unwrap();

    /// Players released from a lobby by stop or delete.
    pub static ref PLAYERS_EVICTED_TOTAL: IntCounter = IntCounter::new(
        "quiz_players_evicted_total",
        "Players evicted by stop or delete",
    )
    .unwrap();

    pub static ref QUESTIONS_SERVED_TOTAL: IntCounter = IntCounter::new(
        "quiz_questions_served_total",
        "Questions served by the sequencer",
    )
    .unwrap();

    /// Scored answers, by result (correct, wrong).
    pub static ref ANSWERS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("quiz_answers_total", "Scored answers"),
        &["result"],
    )
    .unwrap();

    /// Points awarded for correct answers, by difficulty.
    pub static ref POINTS_AWARDED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("quiz_points_awarded_total", "Points awarded"),
        &["difficulty"],
    )
    .unwrap();

    /// Total API requests, by method/endpoint/status.
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("quiz_api_requests_total", "Total API requests"),
        &["method", "endpoint", "status"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// Reported answer latency in seconds.
    pub static ref ANSWER_ELAPSED_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("quiz_answer_elapsed_seconds", "Reported answer latency in seconds")
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 30.0, 60.0]),
    )
    .unwrap();

    /// API request duration in seconds, by endpoint.
    pub static ref API_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "quiz_api_request_duration_seconds",
            "API request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]),
        &["endpoint"],
    )
    .unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the custom registry. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(GAMES_CREATED_TOTAL.clone()),
            Box::new(GAME_TRANSITIONS_TOTAL.clone()),
            Box::new(JOIN_ATTEMPTS_TOTAL.clone()),
            Box::new(PLAYERS_EVICTED_TOTAL.clone()),
            Box::new(QUESTIONS_SERVED_TOTAL.clone()),
            Box::new(ANSWERS_TOTAL.clone()),
            Box::new(POINTS_AWARDED_TOTAL.clone()),
            Box::new(API_REQUESTS_TOTAL.clone()),
            Box::new(ANSWER_ELAPSED_SECONDS.clone()),
            Box::new(API_REQUEST_DURATION_SECONDS.clone()),
        ];

        for c in collectors {
            if let Err(e) = REGISTRY.register(c) {
                tracing::error!("Failed to register metric: {e}");
            }
        }
    });
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Normalize a URL path for metric labels: replace numeric path segments with `:id`
/// to prevent cardinality explosion.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.parse::<i64>().is_ok() {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
