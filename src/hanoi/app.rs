use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::hanoi::layout::tower_anchor;
use crate::hanoi::particles::{ConfettiField, CONFETTI_COUNT};
use crate::hanoi::session::{DropOutcome, GameResult, GameSession};
use crate::hanoi::solver::Move;
use crate::hanoi::state::{transition, EntryAction, Event, ExitAction, Screen};
use crate::storage::{new_game_id, HistoryStore, MoveHistoryEntry, RecordedMove, ScoreEntry, ScoreStore};

/// A line of terminal input during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCommand {
    /// Towers as typed, numbered from 1.
    Move(Move),
    Solve,
    Stop,
    Quit,
    Help,
}

/// Parses `"1 3"`, `"1-3"`, `solve`, `stop`, `quit` or `help`.
pub fn parse_play_command(line: &str) -> Option<PlayCommand> {
    let line = line.trim().to_ascii_lowercase();
    match line.as_str() {
        "s" | "solve" | "solution" => return Some(PlayCommand::Solve),
        "x" | "stop" => return Some(PlayCommand::Stop),
        "q" | "quit" | "menu" => return Some(PlayCommand::Quit),
        "h" | "help" | "?" => return Some(PlayCommand::Help),
        _ => {}
    }
    let mut towers = line
        .split(|c: char| c.is_whitespace() || c == '-' || c == ',' || c == '>')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<usize>().ok());
    let from = towers.next()??;
    let to = towers.next()??;
    if towers.next().is_some() || !(1..=3).contains(&from) || !(1..=3).contains(&to) {
        return None;
    }
    Some(PlayCommand::Move(Move::new(from - 1, to - 1)))
}

/// What a line of terminal input did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFeedback {
    Moved(DropOutcome),
    /// Zero-based tower that had nothing to pick up.
    EmptyTower(usize),
    SolutionStarted,
    SolutionStepped,
    SolutionStopped,
    NothingToStop,
    CannotSolve,
    Left,
    Help,
    Unrecognised,
}

/// Owns everything the game screens act on and runs transition actions.
pub struct HanoiApp {
    screen: Screen,
    player_name: String,
    last_disks: Option<u32>,
    session: Option<GameSession>,
    last_result: Option<GameResult>,
    confetti: ConfettiField,
    scores: ScoreStore,
    history: HistoryStore,
    rng: StdRng,
    step_secs: f64,
}

impl HanoiApp {
    pub fn new(scores: ScoreStore, history: HistoryStore, rng: StdRng, step_secs: f64) -> Self {
        Self {
            screen: Screen::Menu,
            player_name: String::new(),
            last_disks: None,
            session: None,
            last_result: None,
            confetti: ConfettiField::default(),
            scores,
            history,
            rng,
            step_secs,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let scores = ScoreStore::open(&config.storage.resolved_scoreboard_path());
        let history = HistoryStore::open(&config.storage.resolved_history_path());
        Self::new(
            scores,
            history,
            StdRng::seed_from_u64(rand::random()),
            config.hanoi.step_secs(),
        )
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Last submitted name, offered as the default on the next name entry.
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn last_result(&self) -> Option<&GameResult> {
        self.last_result.as_ref()
    }

    pub fn confetti(&self) -> &ConfettiField {
        &self.confetti
    }

    pub fn scores(&self) -> &[ScoreEntry] {
        self.scores.entries()
    }

    pub fn history(&self) -> &[MoveHistoryEntry] {
        self.history.entries()
    }

    /// Runs the transition for `event`. Returns false when the event does
    /// not apply to the current screen.
    pub fn dispatch(&mut self, event: Event) -> Result<bool> {
        let Some(t) = transition(self.screen, &event, self.last_disks) else {
            debug!(screen = ?self.screen, event = ?event, "event ignored");
            return Ok(false);
        };

        if let Some(ExitAction::AbandonGame) = t.on_exit {
            if self.session.take().is_some() {
                info!("game abandoned");
            }
        }
        self.screen = t.next;
        // Every entry action runs; the first failure is reported afterwards.
        let mut first_err = None;
        for action in t.on_enter {
            if let Err(err) = self.run_entry_action(action) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(true),
        }
    }

    fn run_entry_action(&mut self, action: EntryAction) -> Result<()> {
        match action {
            EntryAction::StartGame { disks, player } => {
                info!(disks, player = %player, "game started");
                self.player_name = player;
                self.last_disks = Some(disks);
                self.last_result = None;
                self.confetti.clear();
                self.session = Some(GameSession::new(disks));
            }
            EntryAction::RecordScore => self.record_score()?,
            EntryAction::SpawnConfetti => {
                if let Some(result) = &self.last_result {
                    self.confetti
                        .burst(tower_anchor(result.tower), CONFETTI_COUNT, &mut self.rng);
                }
            }
            EntryAction::HighlightDifficulty(disks) => {
                debug!(disks, "scoreboard difficulty selected");
            }
        }
        Ok(())
    }

    fn record_score(&mut self) -> Result<()> {
        let Some(result) = &self.last_result else {
            return Ok(());
        };
        let saved_score = self.scores.append(ScoreEntry {
            name: self.player_name.clone(),
            disks: result.disks,
            time: result.time,
            moves: result.moves,
        });
        let saved_history = self.history.append(MoveHistoryEntry {
            game_id: new_game_id(),
            player_name: self.player_name.clone(),
            disks: result.disks,
            moves: result.moves_log.iter().copied().map(RecordedMove::from).collect(),
            time: result.time,
        });
        if let Err(err) = &saved_score {
            warn!(error = %err, "score not saved");
        }
        if let Err(err) = &saved_history {
            warn!(error = %err, "move history not saved");
        }
        if saved_score.is_ok() && saved_history.is_ok() {
            info!(
                player = %self.player_name,
                disks = result.disks,
                moves = result.moves,
                time = result.time,
                "score recorded"
            );
        }
        saved_score.and(saved_history)
    }

    fn settle(&mut self, result: Option<GameResult>) -> Result<()> {
        if let Some(result) = result {
            self.last_result = Some(result);
            self.dispatch(Event::GameWon)?;
        }
        Ok(())
    }

    pub fn pick_up(&mut self, tower: usize) -> bool {
        self.session
            .as_mut()
            .is_some_and(|session| session.pick_up(tower))
    }

    pub fn drop_on(&mut self, tower: Option<usize>) -> Result<Option<DropOutcome>> {
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };
        let outcome = session.drop_on(tower);
        let result = session.check_win();
        self.settle(result)?;
        Ok(outcome)
    }

    pub fn play(&mut self, mv: Move) -> Result<Option<DropOutcome>> {
        if !self.pick_up(mv.from) {
            return Ok(None);
        }
        self.drop_on(Some(mv.to))
    }

    pub fn start_solution(&mut self) -> bool {
        let step = self.step_secs;
        self.session
            .as_mut()
            .is_some_and(|session| session.start_playback(step))
    }

    pub fn stop_solution(&mut self) -> bool {
        self.session
            .as_mut()
            .is_some_and(GameSession::stop_playback)
    }

    /// Applies one line of terminal input. While the solution plays, any line
    /// other than `stop` or `quit` advances it by one move.
    pub fn apply_command(&mut self, command: Option<PlayCommand>) -> Result<CommandFeedback> {
        let playing_back = self
            .session
            .as_ref()
            .is_some_and(GameSession::is_playing_back);
        if playing_back {
            return match command {
                Some(PlayCommand::Stop) => {
                    self.stop_solution();
                    Ok(CommandFeedback::SolutionStopped)
                }
                Some(PlayCommand::Quit) => {
                    self.dispatch(Event::BackToMenu)?;
                    Ok(CommandFeedback::Left)
                }
                _ => {
                    self.tick(self.step_secs)?;
                    Ok(CommandFeedback::SolutionStepped)
                }
            };
        }
        let feedback = match command {
            Some(PlayCommand::Move(mv)) => match self.play(mv)? {
                Some(outcome) => CommandFeedback::Moved(outcome),
                None => CommandFeedback::EmptyTower(mv.from),
            },
            Some(PlayCommand::Solve) if self.start_solution() => CommandFeedback::SolutionStarted,
            Some(PlayCommand::Solve) => CommandFeedback::CannotSolve,
            Some(PlayCommand::Stop) => CommandFeedback::NothingToStop,
            Some(PlayCommand::Quit) => {
                self.dispatch(Event::BackToMenu)?;
                CommandFeedback::Left
            }
            Some(PlayCommand::Help) => CommandFeedback::Help,
            None => CommandFeedback::Unrecognised,
        };
        Ok(feedback)
    }

    /// Advances playback and confetti by one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> Result<()> {
        self.confetti.update();
        let result = self.session.as_mut().and_then(|session| session.tick(dt));
        self.settle(result)
    }
}
