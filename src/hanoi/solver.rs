use serde::{Deserialize, Serialize};

/// A single transfer of the top disk between two towers (0-based indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

impl Move {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

/// Minimal solution moving `n` disks from `source` to `destination`.
pub fn generate_moves(n: u32, source: usize, destination: usize, auxiliary: usize) -> Vec<Move> {
    let mut out = Vec::with_capacity(usize::try_from(minimum_moves(n)).unwrap_or(0));
    solve(n, source, destination, auxiliary, &mut out);
    out
}

fn solve(n: u32, source: usize, destination: usize, auxiliary: usize, out: &mut Vec<Move>) {
    if n == 0 {
        return;
    }
    solve(n - 1, source, auxiliary, destination, out);
    out.push(Move::new(source, destination));
    solve(n - 1, auxiliary, destination, source, out);
}

/// `2^n - 1`, saturating for absurd disk counts.
pub fn minimum_moves(n: u32) -> u64 {
    1u64.checked_shl(n).map_or(u64::MAX, |p| p - 1)
}
