// src/competition/leaderboard.rs
// Leaderboard aggregation over stored attempts

use std::collections::HashMap;

use super::types::{LeaderboardEntry, LeaderboardRow};
use crate::auth::types::display_name;

fn name_of(row: &LeaderboardRow) -> Option<String> {
    display_name(row.first_name.as_deref(), row.last_name.as_deref())
}

fn finished_before(a: &LeaderboardRow, b: &LeaderboardRow) -> bool {
    (a.completed_at, a.seq) < (b.completed_at, b.seq)
}

/// Best attempt per user within one competition. A higher score wins; on equal
/// scores the earlier attempt is kept.
fn best_attempts<'a, I>(rows: I) -> HashMap<&'a str, &'a LeaderboardRow>
where
    I: IntoIterator<Item = &'a LeaderboardRow>,
{
    let mut best: HashMap<&str, &LeaderboardRow> = HashMap::new();
    for row in rows {
        best.entry(row.user_id.as_str())
            .and_modify(|current| {
                if row.score > current.score
                    || (row.score == current.score && finished_before(row, current))
                {
                    *current = row;
                }
            })
            .or_insert(row);
    }
    best
}

/// Rank users of a single competition by their best score, earlier completion first on ties.
pub fn rank_competition(rows: &[LeaderboardRow]) -> Vec<LeaderboardEntry> {
    let mut best: Vec<&LeaderboardRow> = best_attempts(rows).into_values().collect();
    best.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.completed_at.cmp(&b.completed_at))
            .then(a.seq.cmp(&b.seq))
    });

    best.into_iter()
        .enumerate()
        .map(|(i, row)| LeaderboardEntry {
            rank: i + 1,
            user_id: row.user_id.clone(),
            display_name: name_of(row),
            score: row.score,
            competitions: None,
        })
        .collect()
}

/// Rank users across all competitions by the sum of their best score in each.
pub fn rank_global(rows: &[LeaderboardRow]) -> Vec<LeaderboardEntry> {
    let mut per_competition: HashMap<&str, Vec<&LeaderboardRow>> = HashMap::new();
    for row in rows {
        per_competition.entry(row.competition_id.as_str()).or_default().push(row);
    }

    // user_id -> (total, competitions taken, a row for the name)
    let mut totals: HashMap<&str, (i64, usize, &LeaderboardRow)> = HashMap::new();
    for attempts in per_competition.values() {
        for (user_id, row) in best_attempts(attempts.iter().copied()) {
            let entry = totals.entry(user_id).or_insert((0, 0, row));
            entry.0 += row.score;
            entry.1 += 1;
        }
    }

    let mut ranked: Vec<(&str, (i64, usize, &LeaderboardRow))> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.0.cmp(b.0)));

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, (user_id, (total, taken, row)))| LeaderboardEntry {
            rank: i + 1,
            user_id: user_id.to_string(),
            display_name: name_of(row),
            score: total,
            competitions: Some(taken),
        })
        .collect()
}
