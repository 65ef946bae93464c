use std::time::Instant;

use serde::Serialize;

use crate::hanoi::board::{IllegalMove, Towers};
use crate::hanoi::layout::{self, Point, FLIGHT_APEX_Y};
use crate::hanoi::solver::{generate_moves, minimum_moves, Move};

pub const DEFAULT_STEP_SECS: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeldDisk {
    pub disk: u32,
    pub source: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DropOutcome {
    /// Disk landed on `to`. `counted` is false when dropped back on its own tower.
    Placed { from: usize, to: usize, counted: bool },
    /// Released away from any tower; disk goes back to its source.
    Returned,
    /// Illegal placement; disk goes back to its source.
    Rejected(IllegalMove),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameResult {
    pub disks: u32,
    pub moves: u32,
    pub minimum_moves: u64,
    pub time: f64,
    pub tower: usize,
    pub moves_log: Vec<Move>,
}

impl GameResult {
    pub fn is_perfect(&self) -> bool {
        u64::from(self.moves) <= self.minimum_moves
    }
}

#[derive(Debug, Clone)]
struct SavedBoard {
    towers: Towers,
    moves: u32,
    log: Vec<Move>,
}

#[derive(Debug, Clone, Copy)]
struct Flight {
    mv: Move,
    disk: u32,
    start: Point,
    mid: Point,
    end: Point,
}

impl Flight {
    fn position(&self, progress: f64) -> Point {
        let t = layout::ease_out_quad(progress.clamp(0.0, 1.0));
        if t < 0.5 {
            self.start.lerp(self.mid, t * 2.0)
        } else {
            self.mid.lerp(self.end, (t - 0.5) * 2.0)
        }
    }
}

#[derive(Debug, Clone)]
struct Playback {
    solution: Vec<Move>,
    next: usize,
    progress: f64,
    step_secs: f64,
    flight: Option<Flight>,
    saved: SavedBoard,
}

/// One game of N disks, from first pick-up to win.
#[derive(Debug, Clone)]
pub struct GameSession {
    towers: Towers,
    moves: u32,
    log: Vec<Move>,
    held: Option<HeldDisk>,
    won: bool,
    started: Instant,
    playback: Option<Playback>,
}

impl GameSession {
    pub fn new(disks: u32) -> Self {
        Self {
            towers: Towers::new(disks),
            moves: 0,
            log: Vec::new(),
            held: None,
            won: false,
            started: Instant::now(),
            playback: None,
        }
    }

    pub fn towers(&self) -> &Towers {
        &self.towers
    }

    pub fn disks(&self) -> u32 {
        self.towers.disk_count()
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn minimum_moves(&self) -> u64 {
        minimum_moves(self.disks())
    }

    pub fn moves_log(&self) -> &[Move] {
        &self.log
    }

    pub fn held(&self) -> Option<HeldDisk> {
        self.held
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    pub fn is_playing_back(&self) -> bool {
        self.playback.is_some()
    }

    /// Lifts the top disk of `tower`. Returns false when nothing was picked up.
    pub fn pick_up(&mut self, tower: usize) -> bool {
        if self.held.is_some() || self.won || self.playback.is_some() {
            return false;
        }
        match self.towers.take(tower) {
            Ok(disk) => {
                self.held = Some(HeldDisk {
                    disk,
                    source: tower,
                });
                true
            }
            Err(_) => false,
        }
    }

    /// Releases the held disk over `target`, or over empty space when `None`.
    /// Returns `None` if no disk was held.
    pub fn drop_on(&mut self, target: Option<usize>) -> Option<DropOutcome> {
        let held = self.held.take()?;
        let outcome = match target {
            None => DropOutcome::Returned,
            Some(tower) => match self.towers.place(held.disk, tower) {
                Ok(()) => {
                    let counted = tower != held.source;
                    if counted {
                        self.moves += 1;
                        self.log.push(Move::new(held.source, tower));
                    }
                    return Some(DropOutcome::Placed {
                        from: held.source,
                        to: tower,
                        counted,
                    });
                }
                Err(err) => DropOutcome::Rejected(err),
            },
        };
        // Source tower's top was the held disk, so putting it back cannot fail.
        let restored = self.towers.place(held.disk, held.source);
        debug_assert!(restored.is_ok(), "held disk rejected by its source tower");
        Some(outcome)
    }

    /// Pick up from `mv.from` and drop on `mv.to` in one step.
    pub fn play(&mut self, mv: Move) -> Option<DropOutcome> {
        if !self.pick_up(mv.from) {
            return None;
        }
        self.drop_on(Some(mv.to))
    }

    /// Produces the result the first time a tower other than the start is full.
    pub fn check_win(&mut self) -> Option<GameResult> {
        if self.won || self.held.is_some() || self.playback.is_some() {
            return None;
        }
        let tower = self.towers.completed_tower()?;
        self.won = true;
        Some(GameResult {
            disks: self.disks(),
            moves: self.moves,
            minimum_moves: self.minimum_moves(),
            time: self.elapsed_secs(),
            tower,
            moves_log: self.log.clone(),
        })
    }

    /// Resets to a fresh board and starts animating the optimal solution.
    pub fn start_playback(&mut self, step_secs: f64) -> bool {
        if self.playback.is_some() || self.won {
            return false;
        }
        if let Some(held) = self.held.take() {
            let restored = self.towers.place(held.disk, held.source);
            debug_assert!(restored.is_ok(), "held disk rejected by its source tower");
        }
        let n = self.disks();
        let saved = SavedBoard {
            towers: std::mem::replace(&mut self.towers, Towers::new(n)),
            moves: std::mem::take(&mut self.moves),
            log: std::mem::take(&mut self.log),
        };
        let step_secs = if step_secs.is_finite() && step_secs > 0.0 {
            step_secs
        } else {
            DEFAULT_STEP_SECS
        };
        self.playback = Some(Playback {
            solution: generate_moves(n, 0, 2, 1),
            next: 0,
            progress: 0.0,
            step_secs,
            flight: None,
            saved,
        });
        self.launch_next();
        if self.playback_finished() {
            return self.finish_playback();
        }
        true
    }

    /// Abandons playback and restores the board as it was before.
    pub fn stop_playback(&mut self) -> bool {
        let Some(playback) = self.playback.take() else {
            return false;
        };
        self.towers = playback.saved.towers;
        self.moves = playback.saved.moves;
        self.log = playback.saved.log;
        true
    }

    /// Advances playback by `dt` seconds. Returns the win once the last step lands.
    pub fn tick(&mut self, dt: f64) -> Option<GameResult> {
        let step = self.playback.as_ref()?.step_secs;
        if let Some(playback) = self.playback.as_mut() {
            playback.progress += dt.max(0.0) / step;
        }
        while self
            .playback
            .as_ref()
            .is_some_and(|p| p.flight.is_some() && p.progress >= 1.0)
        {
            self.land_flight();
            if let Some(playback) = self.playback.as_mut() {
                playback.progress -= 1.0;
            }
            self.launch_next();
        }
        if self.playback_finished() {
            self.finish_playback();
            return self.check_win();
        }
        None
    }

    /// Disk currently in the air during playback and where it is drawn.
    pub fn flying_disk(&self) -> Option<(u32, Point)> {
        let playback = self.playback.as_ref()?;
        let flight = playback.flight?;
        Some((flight.disk, flight.position(playback.progress)))
    }

    fn launch_next(&mut self) {
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        let Some(&mv) = playback.solution.get(playback.next) else {
            playback.flight = None;
            return;
        };
        playback.next += 1;
        let Ok(disk) = self.towers.take(mv.from) else {
            playback.flight = None;
            return;
        };
        let start = layout::disk_slot(mv.from, self.towers.stack(mv.from).len());
        let end = layout::disk_slot(mv.to, self.towers.stack(mv.to).len());
        let mid = Point::new((start.x + end.x) / 2.0, FLIGHT_APEX_Y);
        playback.flight = Some(Flight {
            mv,
            disk,
            start,
            mid,
            end,
        });
    }

    fn land_flight(&mut self) {
        let Some(flight) = self.playback.as_mut().and_then(|p| p.flight.take()) else {
            return;
        };
        let landed = self.towers.place(flight.disk, flight.mv.to);
        debug_assert!(landed.is_ok(), "solution move {:?} rejected", flight.mv);
        if landed.is_ok() {
            self.moves += 1;
            self.log.push(flight.mv);
        }
    }

    fn playback_finished(&self) -> bool {
        self.playback.as_ref().is_some_and(|p| p.flight.is_none())
    }

    fn finish_playback(&mut self) -> bool {
        self.playback.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve_by_hand(session: &mut GameSession) {
        for mv in generate_moves(session.disks(), 0, 2, 1) {
            let outcome = session.play(mv).expect("disk held");
            assert!(matches!(outcome, DropOutcome::Placed { counted: true, .. }));
        }
    }

    #[test]
    fn legal_drop_counts_a_move() {
        let mut session = GameSession::new(3);
        assert!(session.pick_up(0));
        assert_eq!(
            session.drop_on(Some(2)),
            Some(DropOutcome::Placed {
                from: 0,
                to: 2,
                counted: true
            })
        );
        assert_eq!(session.moves(), 1);
        assert_eq!(session.moves_log(), &[Move::new(0, 2)]);
    }

    #[test]
    fn dropping_on_source_is_not_counted() {
        let mut session = GameSession::new(3);
        assert!(session.pick_up(0));
        assert!(matches!(
            session.drop_on(Some(0)),
            Some(DropOutcome::Placed { counted: false, .. })
        ));
        assert_eq!(session.moves(), 0);
        assert_eq!(session.towers(), &Towers::new(3));
    }

    #[test]
    fn illegal_and_offboard_drops_return_the_disk() {
        let mut session = GameSession::new(3);
        session.play(Move::new(0, 1)).expect("held");
        let before = session.towers().clone();

        assert!(session.pick_up(0));
        assert!(matches!(
            session.drop_on(Some(1)),
            Some(DropOutcome::Rejected(IllegalMove::LargerOnSmaller { .. }))
        ));
        assert_eq!(session.towers(), &before);

        assert!(session.pick_up(0));
        assert_eq!(session.drop_on(None), Some(DropOutcome::Returned));
        assert_eq!(session.towers(), &before);
        assert_eq!(session.moves(), 1);
    }

    #[test]
    fn pick_up_ignores_empty_towers_and_double_holds() {
        let mut session = GameSession::new(3);
        assert!(!session.pick_up(1));
        assert!(session.pick_up(0));
        assert!(!session.pick_up(0));
        assert_eq!(session.held(), Some(HeldDisk { disk: 1, source: 0 }));
        assert_eq!(session.drop_on(None), Some(DropOutcome::Returned));
        assert_eq!(session.drop_on(None), None);
    }

    #[test]
    fn win_fires_exactly_once() {
        let mut session = GameSession::new(3);
        assert!(session.check_win().is_none());
        solve_by_hand(&mut session);

        let result = session.check_win().expect("won");
        assert_eq!(result.tower, 2);
        assert_eq!(result.moves, 7);
        assert!(result.is_perfect());
        assert_eq!(result.moves_log.len(), 7);
        assert!(session.check_win().is_none());
        assert!(!session.pick_up(2));
    }

    #[test]
    fn playback_solves_from_a_fresh_board() {
        let mut session = GameSession::new(4);
        session.play(Move::new(0, 1)).expect("held");
        assert!(session.start_playback(0.4));
        assert_eq!(session.moves(), 0);
        assert!(session.flying_disk().is_some());
        assert!(!session.pick_up(0));

        let mut result = None;
        for _ in 0..100 {
            if let Some(r) = session.tick(0.4) {
                result = Some(r);
                break;
            }
        }
        let result = result.expect("playback wins");
        assert_eq!(result.moves, 15);
        assert_eq!(result.tower, 2);
        assert_eq!(session.towers().stack(2), &[4, 3, 2, 1]);
        assert!(!session.is_playing_back());
        assert!(session.check_win().is_none());
    }

    #[test]
    fn large_tick_runs_several_steps() {
        let mut session = GameSession::new(3);
        session.start_playback(0.4);
        assert!(session.tick(0.8).is_none());
        assert_eq!(session.moves(), 2);
        let result = session.tick(10.0).expect("finished");
        assert_eq!(result.moves, 7);
    }

    #[test]
    fn stop_restores_previous_board() {
        let mut session = GameSession::new(3);
        session.play(Move::new(0, 2)).expect("held");
        let before = session.towers().clone();

        session.start_playback(0.4);
        session.tick(1.0);
        assert!(session.stop_playback());
        assert_eq!(session.towers(), &before);
        assert_eq!(session.moves(), 1);
        assert!(session.check_win().is_none());
        assert!(!session.stop_playback());
    }

    #[test]
    fn playback_started_mid_drag_returns_the_held_disk() {
        let mut session = GameSession::new(3);
        session.play(Move::new(0, 2)).expect("held");
        let before = session.towers().clone();

        assert!(session.pick_up(2));
        assert!(session.start_playback(0.4));
        assert_eq!(session.held(), None);
        assert!(session.stop_playback());
        assert_eq!(session.towers(), &before);
        assert!(session.towers().is_consistent());
    }

    #[test]
    fn flying_disk_arcs_through_apex() {
        let mut session = GameSession::new(3);
        session.start_playback(1.0);
        let (disk, start) = session.flying_disk().expect("flying");
        assert_eq!(disk, 1);
        assert_eq!(start, layout::disk_slot(0, 2));

        // ease_out_quad(1 - sqrt(0.5)) == 0.5, the apex.
        session.tick(1.0 - 0.5f64.sqrt());
        let (_, apex) = session.flying_disk().expect("flying");
        assert!((apex.y - FLIGHT_APEX_Y).abs() < 1e-9);
    }
}
