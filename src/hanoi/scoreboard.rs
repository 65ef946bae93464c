use std::cmp::Ordering;

use serde::Serialize;

use crate::hanoi::solver::minimum_moves;
use crate::storage::ScoreEntry;

pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedScore {
    pub rank: usize,
    pub name: String,
    pub moves: u32,
    pub time: f64,
    pub time_label: String,
}

/// Top ten entries for `disks`, fewest moves first, then fastest.
pub fn leaderboard(entries: &[ScoreEntry], disks: u32) -> Vec<RankedScore> {
    let mut filtered = entries
        .iter()
        .filter(|e| e.disks == disks)
        .collect::<Vec<_>>();
    filtered.sort_by(|a, b| {
        a.moves
            .cmp(&b.moves)
            .then(a.time.partial_cmp(&b.time).unwrap_or(Ordering::Equal))
    });
    filtered
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .enumerate()
        .map(|(i, e)| RankedScore {
            rank: i + 1,
            name: e.name.clone(),
            moves: e.moves,
            time: e.time,
            time_label: format_duration(e.time),
        })
        .collect()
}

/// `MM:SS.ss`
pub fn format_duration(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let minutes = (secs / 60.0).floor();
    let seconds = secs - minutes * 60.0;
    format!("{:02}:{:05.2}", minutes as u64, seconds)
}

pub fn summarize_scores(entries: &[ScoreEntry], disks: Option<u32>) -> String {
    if entries.is_empty() {
        return "No scores recorded yet.".to_string();
    }

    let mut total = 0usize;
    let mut perfect = 0usize;
    for entry in entries {
        if let Some(disks) = disks {
            if entry.disks != disks {
                continue;
            }
        }
        total += 1;
        if u64::from(entry.moves) <= minimum_moves(entry.disks) {
            perfect += 1;
        }
    }

    if total == 0 {
        return "No scores for the selected disk count.".to_string();
    }

    format!(
        "Perfect games: {perfect}/{total} ({:.1}%)",
        (perfect as f64 / total as f64) * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(name: &str, disks: u32, moves: u32, time: f64) -> ScoreEntry {
        ScoreEntry {
            name: name.to_string(),
            disks,
            time,
            moves,
        }
    }

    #[test]
    fn sorts_by_moves_then_time() {
        let entries = vec![
            score("slow", 3, 7, 30.0),
            score("fast", 3, 7, 12.0),
            score("messy", 3, 11, 5.0),
            score("other", 4, 15, 1.0),
        ];
        let board = leaderboard(&entries, 3);
        let names = board.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["fast", "slow", "messy"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].time_label, "00:12.00");
    }

    #[test]
    fn keeps_top_ten() {
        let entries = (0..15)
            .map(|i| score(&format!("p{i}"), 5, 31 + i, 60.0))
            .collect::<Vec<_>>();
        let board = leaderboard(&entries, 5);
        assert_eq!(board.len(), 10);
        assert_eq!(board[9].moves, 40);
    }

    #[test]
    fn formats_minutes_and_fractional_seconds() {
        assert_eq!(format_duration(0.0), "00:00.00");
        assert_eq!(format_duration(75.5), "01:15.50");
        assert_eq!(format_duration(3599.25), "59:59.25");
    }

    #[test]
    fn summary_counts_perfect_games() {
        let entries = vec![score("a", 3, 7, 1.0), score("b", 3, 9, 1.0)];
        assert_eq!(
            summarize_scores(&entries, Some(3)),
            "Perfect games: 1/2 (50.0%)"
        );
        assert_eq!(
            summarize_scores(&entries, Some(6)),
            "No scores for the selected disk count."
        );
        assert_eq!(summarize_scores(&[], None), "No scores recorded yet.");
    }
}
