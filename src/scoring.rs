//! Leaderboard computation: every prediction edge is checked against the result set and tallied
//! per user in one pass.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{OwnedPair, Pair, UserId, UserSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedScore {
    /// 1-based position on the leaderboard.
    pub rank: usize,
    pub user_id: UserId,
    pub user_name: Option<String>,
    pub correct_guesses: u32,
    pub total_guesses: u32,
}

impl RankedScore {
    /// Fraction of correct guesses, 0.0 for a user without predictions.
    pub fn accuracy(&self) -> f64 {
        if self.total_guesses == 0 {
            return 0.0;
        }
        f64::from(self.correct_guesses) / f64::from(self.total_guesses)
    }

    pub fn accuracy_percent(&self) -> f64 {
        self.accuracy() * 100.0
    }
}

/// One result edge and the users who predicted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedPair {
    pub pair: Pair,
    pub predicted_by: Vec<String>,
}

#[derive(Default)]
struct Tally {
    correct: u32,
    total: u32,
}

/// Scores every user in `users` plus any other owner found in `predictions`, and sorts them by
/// correct guesses (desc), total guesses (desc), name (asc, unnamed last), then user id.
///
/// An empty `results` set is valid and simply scores everyone at zero.
pub fn compute_leaderboard(
    users: &[UserSummary],
    predictions: &[OwnedPair],
    results: &[Pair],
) -> Vec<RankedScore> {
    let result_set: HashSet<&Pair> = results.iter().collect();

    let mut tallies: HashMap<UserId, Tally> =
        users.iter().map(|u| (u.id, Tally::default())).collect();
    for prediction in predictions {
        let tally = tallies.entry(prediction.user_id).or_default();
        tally.total += 1;
        if result_set.contains(&prediction.pair) {
            tally.correct += 1;
        }
    }

    let names: HashMap<UserId, &str> = users.iter().map(|u| (u.id, u.name.as_str())).collect();
    let mut scores: Vec<RankedScore> = tallies
        .into_iter()
        .map(|(user_id, tally)| RankedScore {
            rank: 0,
            user_id,
            user_name: names.get(&user_id).map(|n| n.to_string()),
            correct_guesses: tally.correct,
            total_guesses: tally.total,
        })
        .collect();

    scores.sort_by(|a, b| {
        b.correct_guesses
            .cmp(&a.correct_guesses)
            .then(b.total_guesses.cmp(&a.total_guesses))
            .then_with(|| compare_names(&a.user_name, &b.user_name))
            .then(a.user_id.cmp(&b.user_id))
    });
    for (i, score) in scores.iter_mut().enumerate() {
        score.rank = i + 1;
    }
    scores
}

fn compare_names(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// For every result edge, in result order, the sorted names of the users who predicted it.
/// Predictions from users missing in `users` are not attributed.
pub fn result_reveal(
    users: &[UserSummary],
    predictions: &[OwnedPair],
    results: &[Pair],
) -> Vec<RevealedPair> {
    let names: HashMap<UserId, &str> = users.iter().map(|u| (u.id, u.name.as_str())).collect();

    let mut by_pair: HashMap<Pair, Vec<String>> = HashMap::new();
    for prediction in predictions {
        if let Some(name) = names.get(&prediction.user_id) {
            by_pair
                .entry(prediction.pair)
                .or_default()
                .push(name.to_string());
        }
    }

    results
        .iter()
        .map(|pair| {
            let mut predicted_by = by_pair.remove(pair).unwrap_or_default();
            predicted_by.sort();
            RevealedPair {
                pair: *pair,
                predicted_by,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: i32 = 1;
    const B: i32 = 2;
    const C: i32 = 3;
    const D: i32 = 4;
    const E: i32 = 5;

    fn user(id: UserId, name: &str) -> UserSummary {
        UserSummary {
            id,
            name: name.to_string(),
        }
    }

    fn predict(user_id: UserId, gifter_id: i32, giftee_id: i32) -> OwnedPair {
        OwnedPair {
            user_id,
            pair: Pair::new(gifter_id, giftee_id),
        }
    }

    #[test]
    fn test_single_user_partial_match() {
        let users = vec![user(10, "Miriam")];
        let predictions = vec![predict(10, A, B), predict(10, C, E)];
        let results = vec![Pair::new(A, B), Pair::new(C, D)];

        let board = compute_leaderboard(&users, &predictions, &results);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].correct_guesses, 1);
        assert_eq!(board[0].total_guesses, 2);
        assert_eq!(board[0].rank, 1);
        assert!((board[0].accuracy() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_higher_score_ranks_first() {
        let users = vec![user(1, "Alex"), user(2, "Iris")];
        let results = vec![
            Pair::new(A, B),
            Pair::new(B, C),
            Pair::new(C, D),
            Pair::new(D, A),
        ];
        let predictions = vec![
            // Alex: one right out of four.
            predict(1, A, B),
            predict(1, B, D),
            predict(1, C, A),
            predict(1, D, C),
            // Iris: three right out of four.
            predict(2, A, B),
            predict(2, B, C),
            predict(2, C, D),
            predict(2, D, B),
        ];

        let board = compute_leaderboard(&users, &predictions, &results);
        assert_eq!(board[0].user_id, 2);
        assert_eq!(board[0].correct_guesses, 3);
        assert_eq!(board[1].user_id, 1);
        assert_eq!(board[1].correct_guesses, 1);
        assert_eq!(board[1].rank, 2);
    }

    #[test]
    fn test_user_without_predictions_has_zero_accuracy() {
        let users = vec![user(1, "Queso")];
        let board = compute_leaderboard(&users, &[], &[Pair::new(A, B)]);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].total_guesses, 0);
        assert_eq!(board[0].accuracy(), 0.0);
        assert!(!board[0].accuracy().is_nan());
    }

    #[test]
    fn test_empty_results_score_zero() {
        let users = vec![user(1, "Noé")];
        let predictions = vec![predict(1, A, B), predict(1, B, A)];
        let board = compute_leaderboard(&users, &predictions, &[]);
        assert_eq!(board[0].correct_guesses, 0);
        assert_eq!(board[0].total_guesses, 2);
        assert_eq!(board[0].accuracy(), 0.0);
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        // All three have one correct guess. Cesar made more guesses; Ilse and Esteban are
        // ordered by name.
        let users = vec![user(3, "Ilse"), user(1, "Esteban"), user(2, "Cesar")];
        let results = vec![Pair::new(A, B), Pair::new(B, A)];
        let predictions = vec![
            predict(3, A, B),
            predict(1, A, B),
            predict(2, A, B),
            predict(2, C, D),
        ];

        let board = compute_leaderboard(&users, &predictions, &results);
        let order: Vec<UserId> = board.iter().map(|s| s.user_id).collect();
        assert_eq!(order, vec![2, 1, 3]);
        let ranks: Vec<usize> = board.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_unknown_owner_scored_without_name() {
        let users = vec![user(1, "Martín")];
        let predictions = vec![predict(1, A, C), predict(99, A, B)];
        let board = compute_leaderboard(&users, &predictions, &[Pair::new(A, B)]);
        assert_eq!(board[0].user_id, 99);
        assert_eq!(board[0].user_name, None);
        assert_eq!(board[1].user_name, Some("Martín".to_string()));
    }

    #[test]
    fn test_three_way_example() {
        // Roster [A, B, C]; one user predicts the full cycle, the results differ in two edges.
        let users = vec![user(1, "U1")];
        let predictions = vec![predict(1, A, B), predict(1, B, C), predict(1, C, A)];
        let results = vec![Pair::new(A, B), Pair::new(B, A), Pair::new(C, C)];

        let board = compute_leaderboard(&users, &predictions, &results);
        assert_eq!(board[0].correct_guesses, 1);
        assert_eq!(board[0].total_guesses, 3);
        assert!((board[0].accuracy_percent() - 33.333).abs() < 0.01);
    }

    #[test]
    fn test_result_reveal() {
        let users = vec![user(1, "Miriam"), user(2, "Alex")];
        let predictions = vec![
            predict(2, A, B),
            predict(1, A, B),
            predict(1, B, C),
            predict(99, B, A),
        ];
        let results = vec![Pair::new(A, B), Pair::new(B, A)];

        let reveal = result_reveal(&users, &predictions, &results);
        assert_eq!(reveal.len(), 2);
        assert_eq!(reveal[0].pair, Pair::new(A, B));
        assert_eq!(reveal[0].predicted_by, vec!["Alex", "Miriam"]);
        assert!(reveal[1].predicted_by.is_empty());
    }
}
