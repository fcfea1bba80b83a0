// Answer scoring.
//
// Points depend on the game's difficulty and on how quickly the answer
// arrived inside the answer window. Possible points are credited on every
// attempt; awarded points only on a correct answer.

use serde::{Deserialize, Serialize};

/// Nominal answer window in seconds.
pub const ANSWER_WINDOW_SECONDS: f64 = 20.0;

/// Difficulty of a game, stored as its level (1-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum Difficulty {
    Easy = 1,
    Medium = 2,
    Hard = 3,
}

impl Difficulty {
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            1 => Some(Difficulty::Easy),
            2 => Some(Difficulty::Medium),
            3 => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn level(self) -> i64 {
        self as i64
    }

    pub fn multiplier(self) -> i64 {
        match self {
            Difficulty::Easy => 100,
            Difficulty::Medium => 200,
            Difficulty::Hard => 300,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

/// `0.5 + 0.5 * (1 - elapsed / window)`.
///
/// Not clamped: elapsed times past the window give a value below 0.5 (and
/// eventually negative), negative elapsed times give a value above 1.
pub fn time_multiplier(elapsed_seconds: f64, window_seconds: f64) -> f64 {
    0.5 + 0.5 * (1.0 - elapsed_seconds / window_seconds)
}

pub fn possible_points(difficulty: Difficulty) -> i64 {
    difficulty.multiplier()
}

/// `floor(multiplier * time_multiplier)`, evaluated as
/// `multiplier * (2w - elapsed) / 2w` so whole results are not floored one short.
pub fn awarded_points(difficulty: Difficulty, elapsed_seconds: f64) -> i64 {
    let span = 2.0 * ANSWER_WINDOW_SECONDS;
    let raw = difficulty.multiplier() as f64 * (span - elapsed_seconds) / span;
    raw.floor() as i64
}

/// Result of scoring a single submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerScore {
    pub correct: bool,
    pub awarded: i64,
    pub possible: i64,
}

/// Score one attempt. `awarded` is zero for a wrong answer.
pub fn score_answer(difficulty: Difficulty, elapsed_seconds: f64, correct: bool) -> AnswerScore {
    AnswerScore {
        correct,
        awarded: if correct {
            awarded_points(difficulty, elapsed_seconds)
        } else {
            0
        },
        possible: possible_points(difficulty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipliers() {
        assert_eq!(Difficulty::Easy.multiplier(), 100);
        assert_eq!(Difficulty::Medium.multiplier(), 200);
        assert_eq!(Difficulty::Hard.multiplier(), 300);
    }

    #[test]
    fn test_from_level() {
        assert_eq!(Difficulty::from_level(1), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_level(3), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_level(0), None);
        assert_eq!(Difficulty::from_level(4), None);
        assert_eq!(Difficulty::Medium.level(), 2);
    }

    #[test]
    fn test_instant_hard_answer_gets_full_points() {
        assert_eq!(awarded_points(Difficulty::Hard, 0.0), 300);
    }

    #[test]
    fn test_answer_at_window_end_gets_half() {
        assert_eq!(awarded_points(Difficulty::Hard, 20.0), 150);
        assert_eq!(awarded_points(Difficulty::Easy, 20.0), 50);
    }

    #[test]
    fn test_half_window_easy() {
        // 0.5 + 0.5 * (1 - 10/20) = 0.75, so 75 and not 50: the formula is authoritative.
        assert_eq!(awarded_points(Difficulty::Easy, 10.0), 75);
    }

    #[test]
    fn test_awarded_points_are_floored() {
        // 200 * (0.5 + 0.5 * (1 - 5/20)) = 175
        assert_eq!(awarded_points(Difficulty::Medium, 5.0), 175);
        // 100 * (0.5 + 0.5 * (1 - 1/20)) = 97.5
        assert_eq!(awarded_points(Difficulty::Easy, 1.0), 97);
    }

    #[test]
    fn test_whole_second_answers_match_integer_formula() {
        for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            for t in 0..=20i64 {
                let expected = d.multiplier() * (40 - t) / 40;
                assert_eq!(awarded_points(d, t as f64), expected, "{d:?} at {t}s");
            }
        }
        assert_eq!(awarded_points(Difficulty::Medium, 17.0), 115);
        assert_eq!(awarded_points(Difficulty::Easy, 16.8), 58);
        assert_eq!(awarded_points(Difficulty::Hard, 12.4), 207);
    }

    #[test]
    fn test_time_multiplier_is_unclamped() {
        assert!(time_multiplier(60.0, ANSWER_WINDOW_SECONDS) < 0.0);
        assert!(time_multiplier(-4.0, ANSWER_WINDOW_SECONDS) > 1.0);
        assert_eq!(awarded_points(Difficulty::Easy, 40.0), 0);
        assert_eq!(awarded_points(Difficulty::Easy, 60.0), -50);
    }

    #[test]
    fn test_possible_points_ignore_correctness_and_time() {
        for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(score_answer(d, 0.0, true).possible, d.multiplier());
            assert_eq!(score_answer(d, 19.0, false).possible, d.multiplier());
        }
    }

    #[test]
    fn test_wrong_answer_awards_nothing() {
        let score = score_answer(Difficulty::Hard, 0.0, false);
        assert!(!score.correct);
        assert_eq!(score.awarded, 0);
        assert_eq!(score.possible, 300);
    }

    #[test]
    fn test_difficulty_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"HARD\"");
        let d: Difficulty = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(d, Difficulty::Medium);
    }
}
