// Multiplayer quiz backend: game lifecycle, lobbies, question sequencing,
// answer scoring and leaderboards over SQLite, served with axum.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod quiz;
pub mod scoring;
