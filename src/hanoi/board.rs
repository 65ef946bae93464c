use std::fmt::{Display, Formatter};

use serde::Serialize;
use thiserror::Error;

use crate::hanoi::solver::Move;

pub const TOWER_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum IllegalMove {
    #[error("tower {0} does not exist")]
    NoSuchTower(usize),
    #[error("tower {0} is empty")]
    EmptySource(usize),
    #[error("disk {disk} cannot go on top of disk {top} (tower {tower})")]
    LargerOnSmaller { disk: u32, top: u32, tower: usize },
}

/// Three stacks of disks, bottom first. Disk `k` has size `k`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Towers {
    disks: u32,
    stacks: [Vec<u32>; TOWER_COUNT],
}

impl Towers {
    /// All `n` disks on tower 0, largest at the bottom.
    pub fn new(n: u32) -> Self {
        Self::with_disks_on(n, 0)
    }

    pub fn with_disks_on(n: u32, tower: usize) -> Self {
        let mut stacks: [Vec<u32>; TOWER_COUNT] = Default::default();
        stacks[tower.min(TOWER_COUNT - 1)] = (1..=n).rev().collect();
        Self { disks: n, stacks }
    }

    pub fn disk_count(&self) -> u32 {
        self.disks
    }

    pub fn stack(&self, tower: usize) -> &[u32] {
        self.stacks.get(tower).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn top(&self, tower: usize) -> Option<u32> {
        self.stacks.get(tower).and_then(|s| s.last().copied())
    }

    pub fn can_place(&self, disk: u32, tower: usize) -> bool {
        match self.stacks.get(tower) {
            Some(stack) => stack.last().map_or(true, |&top| top > disk),
            None => false,
        }
    }

    /// Lifts the top disk off `tower`.
    pub fn take(&mut self, tower: usize) -> Result<u32, IllegalMove> {
        let stack = self
            .stacks
            .get_mut(tower)
            .ok_or(IllegalMove::NoSuchTower(tower))?;
        stack.pop().ok_or(IllegalMove::EmptySource(tower))
    }

    /// Places a lifted disk; on error the board is untouched and the caller still holds it.
    pub fn place(&mut self, disk: u32, tower: usize) -> Result<(), IllegalMove> {
        if tower >= TOWER_COUNT {
            return Err(IllegalMove::NoSuchTower(tower));
        }
        if let Some(top) = self.top(tower) {
            if top <= disk {
                return Err(IllegalMove::LargerOnSmaller { disk, top, tower });
            }
        }
        self.stacks[tower].push(disk);
        Ok(())
    }

    pub fn apply(&mut self, mv: Move) -> Result<u32, IllegalMove> {
        if mv.to >= TOWER_COUNT {
            return Err(IllegalMove::NoSuchTower(mv.to));
        }
        let disk = self.take(mv.from)?;
        if let Err(err) = self.place(disk, mv.to) {
            self.stacks[mv.from].push(disk);
            return Err(err);
        }
        Ok(disk)
    }

    /// Applies moves in order, stopping at the first illegal one.
    /// Returns the number of moves applied.
    pub fn replay(&mut self, moves: &[Move]) -> Result<usize, (usize, IllegalMove)> {
        for (index, mv) in moves.iter().enumerate() {
            self.apply(*mv).map_err(|err| (index, err))?;
        }
        Ok(moves.len())
    }

    /// Tower 1 or 2 when it holds every disk.
    pub fn completed_tower(&self) -> Option<usize> {
        let n = self.disks as usize;
        [1, 2].into_iter().find(|&t| self.stacks[t].len() == n)
    }

    /// Every stack strictly decreasing bottom to top and each disk present once.
    pub fn is_consistent(&self) -> bool {
        let ordered = self
            .stacks
            .iter()
            .all(|s| s.windows(2).all(|w| w[0] > w[1]));
        let mut all = self.stacks.iter().flatten().copied().collect::<Vec<_>>();
        all.sort_unstable();
        ordered && all == (1..=self.disks).collect::<Vec<_>>()
    }
}

impl Display for Towers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, stack) in self.stacks.iter().enumerate() {
            let disks = stack
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{}: {}", i + 1, disks)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(stacks: [Vec<u32>; 3]) -> Towers {
        let disks = stacks.iter().map(Vec::len).sum::<usize>() as u32;
        Towers { disks, stacks }
    }

    #[test]
    fn new_board_has_everything_on_first_tower() {
        let towers = Towers::new(4);
        assert_eq!(towers.stack(0), &[4, 3, 2, 1]);
        assert!(towers.stack(1).is_empty());
        assert!(towers.is_consistent());
        assert_eq!(towers.completed_tower(), None);
    }

    #[test]
    fn size_three_disk_onto_empty_tower_is_accepted() {
        let mut towers = board([vec![3], vec![], vec![2, 1]]);
        assert!(towers.can_place(3, 1));
        towers.apply(Move::new(0, 1)).expect("legal");
        assert_eq!(towers.stack(1), &[3]);
        assert!(towers.is_consistent());
    }

    #[test]
    fn size_three_disk_onto_size_two_is_rejected_without_change() {
        let mut towers = board([vec![3], vec![2], vec![1]]);
        let before = towers.clone();
        let err = towers.apply(Move::new(0, 1)).expect_err("illegal");
        assert_eq!(
            err,
            IllegalMove::LargerOnSmaller {
                disk: 3,
                top: 2,
                tower: 1
            }
        );
        assert_eq!(towers, before);
    }

    #[test]
    fn empty_source_is_rejected() {
        let mut towers = Towers::new(3);
        assert_eq!(
            towers.apply(Move::new(1, 2)),
            Err(IllegalMove::EmptySource(1))
        );
        assert_eq!(
            towers.apply(Move::new(0, 5)),
            Err(IllegalMove::NoSuchTower(5))
        );
        assert_eq!(towers, Towers::new(3));
    }

    #[test]
    fn replay_stops_at_first_illegal_move() {
        let mut towers = Towers::new(3);
        let moves = [Move::new(0, 2), Move::new(0, 2), Move::new(0, 1)];
        assert_eq!(
            towers.replay(&moves),
            Err((
                1,
                IllegalMove::LargerOnSmaller {
                    disk: 2,
                    top: 1,
                    tower: 2
                }
            ))
        );
        assert_eq!(towers.stack(2), &[1]);
    }

    #[test]
    fn completed_tower_ignores_the_start_tower() {
        assert_eq!(board([vec![2, 1], vec![], vec![]]).completed_tower(), None);
        assert_eq!(board([vec![], vec![2, 1], vec![]]).completed_tower(), Some(1));
        assert_eq!(board([vec![], vec![], vec![2, 1]]).completed_tower(), Some(2));
    }
}
