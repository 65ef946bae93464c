use serde::Serialize;

/// Disk counts offered on the menu and scoreboard tabs.
pub const DISK_CHOICES: std::ops::RangeInclusive<u32> = 3..=8;
pub const DEFAULT_SCOREBOARD_DISKS: u32 = 5;
pub const MAX_NAME_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Menu,
    NameEntry { disks: u32 },
    Playing { disks: u32 },
    Won { disks: u32 },
    Scoreboard { disks: u32 },
    HowToPlay,
    SolverExplanation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ChooseDisks(u32),
    SubmitName(String),
    OpenScoreboard,
    OpenHowToPlay,
    OpenSolverExplanation,
    BackToMenu,
    GameWon,
    Continue,
    SelectScoreboardDisks(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryAction {
    StartGame { disks: u32, player: String },
    RecordScore,
    SpawnConfetti,
    HighlightDifficulty(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAction {
    AbandonGame,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Screen,
    pub on_exit: Option<ExitAction>,
    pub on_enter: Vec<EntryAction>,
}

impl Transition {
    fn to(next: Screen) -> Self {
        Self {
            next,
            on_exit: None,
            on_enter: Vec::new(),
        }
    }

    fn exiting(mut self, action: ExitAction) -> Self {
        self.on_exit = Some(action);
        self
    }

    fn entering(mut self, action: EntryAction) -> Self {
        self.on_enter.push(action);
        self
    }
}

/// Trimmed and capped at 20 characters; `None` when nothing is left.
pub fn normalize_player_name(raw: &str) -> Option<String> {
    let name = raw.trim().chars().take(MAX_NAME_CHARS).collect::<String>();
    let name = name.trim_end().to_string();
    (!name.is_empty()).then_some(name)
}

/// Looks up `(screen, event)` in the transition table. Pairs not in the
/// table, invalid disk choices and blank names yield `None`.
///
/// `last_disks` is the difficulty of the most recent game, used as the
/// scoreboard's default tab.
pub fn transition(screen: Screen, event: &Event, last_disks: Option<u32>) -> Option<Transition> {
    use Event as E;
    use Screen as S;

    let t = match (screen, event) {
        (S::Menu, E::ChooseDisks(n)) if DISK_CHOICES.contains(n) => {
            Transition::to(S::NameEntry { disks: *n })
        }
        (S::Menu, E::OpenScoreboard) => {
            let disks = last_disks.unwrap_or(DEFAULT_SCOREBOARD_DISKS);
            Transition::to(S::Scoreboard { disks })
                .entering(EntryAction::HighlightDifficulty(disks))
        }
        (S::Menu, E::OpenHowToPlay) => Transition::to(S::HowToPlay),
        (S::Menu, E::OpenSolverExplanation) => Transition::to(S::SolverExplanation),

        (S::NameEntry { disks }, E::SubmitName(raw)) => {
            let player = normalize_player_name(raw)?;
            Transition::to(S::Playing { disks })
                .entering(EntryAction::StartGame { disks, player })
        }
        (S::NameEntry { .. }, E::BackToMenu) => Transition::to(S::Menu),

        (S::Playing { disks }, E::GameWon) => Transition::to(S::Won { disks })
            .entering(EntryAction::RecordScore)
            .entering(EntryAction::SpawnConfetti),
        (S::Playing { .. }, E::BackToMenu) => {
            Transition::to(S::Menu).exiting(ExitAction::AbandonGame)
        }
        (S::Playing { .. }, E::OpenSolverExplanation) => {
            Transition::to(S::SolverExplanation).exiting(ExitAction::AbandonGame)
        }

        (S::Won { disks }, E::Continue) => Transition::to(S::Scoreboard { disks })
            .entering(EntryAction::HighlightDifficulty(disks)),

        (S::Scoreboard { .. }, E::SelectScoreboardDisks(n)) if DISK_CHOICES.contains(n) => {
            Transition::to(S::Scoreboard { disks: *n })
                .entering(EntryAction::HighlightDifficulty(*n))
        }
        (S::Scoreboard { .. } | S::HowToPlay | S::SolverExplanation, E::BackToMenu) => {
            Transition::to(S::Menu)
        }

        _ => return None,
    };
    Some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_to_game_through_name_entry() {
        let t = transition(Screen::Menu, &Event::ChooseDisks(4), None).expect("valid");
        assert_eq!(t.next, Screen::NameEntry { disks: 4 });

        let t = transition(t.next, &Event::SubmitName("  Ada  ".to_string()), None)
            .expect("valid");
        assert_eq!(t.next, Screen::Playing { disks: 4 });
        assert_eq!(
            t.on_enter,
            vec![EntryAction::StartGame {
                disks: 4,
                player: "Ada".to_string()
            }]
        );
    }

    #[test]
    fn out_of_range_disks_and_blank_names_are_ignored() {
        assert!(transition(Screen::Menu, &Event::ChooseDisks(9), None).is_none());
        assert!(transition(Screen::Menu, &Event::ChooseDisks(2), None).is_none());
        let entry = Screen::NameEntry { disks: 3 };
        assert!(transition(entry, &Event::SubmitName("   ".to_string()), None).is_none());
    }

    #[test]
    fn unknown_pairs_are_ignored() {
        assert!(transition(Screen::Menu, &Event::GameWon, None).is_none());
        assert!(transition(Screen::HowToPlay, &Event::Continue, None).is_none());
        assert!(transition(Screen::Won { disks: 3 }, &Event::BackToMenu, None).is_none());
    }

    #[test]
    fn winning_records_and_celebrates() {
        let t = transition(Screen::Playing { disks: 5 }, &Event::GameWon, None).expect("valid");
        assert_eq!(t.next, Screen::Won { disks: 5 });
        assert_eq!(
            t.on_enter,
            vec![EntryAction::RecordScore, EntryAction::SpawnConfetti]
        );
        let t = transition(t.next, &Event::Continue, None).expect("valid");
        assert_eq!(t.next, Screen::Scoreboard { disks: 5 });
    }

    #[test]
    fn leaving_a_game_abandons_it() {
        let t = transition(Screen::Playing { disks: 3 }, &Event::BackToMenu, None)
            .expect("valid");
        assert_eq!(t.on_exit, Some(ExitAction::AbandonGame));
    }

    #[test]
    fn scoreboard_defaults_to_last_difficulty() {
        let t = transition(Screen::Menu, &Event::OpenScoreboard, None).expect("valid");
        assert_eq!(t.next, Screen::Scoreboard { disks: 5 });
        let t = transition(Screen::Menu, &Event::OpenScoreboard, Some(7)).expect("valid");
        assert_eq!(t.next, Screen::Scoreboard { disks: 7 });
    }

    #[test]
    fn names_are_capped_at_twenty_chars() {
        let long = "abcdefghijklmnopqrstuvwxyz";
        assert_eq!(
            normalize_player_name(long).as_deref(),
            Some("abcdefghijklmnopqrst")
        );
        assert_eq!(normalize_player_name("\t"), None);
    }
}
