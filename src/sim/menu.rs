/// Session setup screens, shown before a `Game` exists.
///
/// Flow:
///   Title       1 or 2 players
///   ModeSelect  one player only: Easy, Medium or Hard
///   Rules       what the chosen mode means; confirm starts the game
///
/// The mode from config.toml is the highlighted choice on entry. Typed
/// shortcuts (`1`, `2`, `e`, `m`, `h`) skip the cursor; anything else shows
/// a notice and keeps the current screen.

use log::debug;

use super::game::Mode;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuPhase {
    Title,
    ModeSelect,
    Rules,
}

/// Menu input, already decoded from the terminal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuKey {
    Up,
    Down,
    Confirm,
    Back,
    Quit,
    Char(char),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuOutcome {
    Stay,
    Start(Mode),
    Quit,
}

pub const PLAYER_CHOICES: [&str; 2] = ["1 Player", "2 Players"];
pub const DIFFICULTIES: [Mode; 3] = [Mode::Easy, Mode::Medium, Mode::Hard];

#[derive(Clone, Debug)]
pub struct Menu {
    phase: MenuPhase,
    cursor: usize,
    /// Difficulty highlighted when ModeSelect opens.
    preferred: Mode,
    chosen: Mode,
    notice: Option<&'static str>,
}

impl Menu {
    pub fn new(preferred: Mode) -> Self {
        Menu {
            phase: MenuPhase::Title,
            cursor: usize::from(preferred == Mode::Versus),
            preferred,
            chosen: preferred,
            notice: None,
        }
    }

    pub fn phase(&self) -> MenuPhase {
        self.phase
    }

    /// Highlighted row on Title or ModeSelect.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Mode the Rules screen describes.
    pub fn chosen(&self) -> Mode {
        self.chosen
    }

    /// Message left by the last rejected key.
    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    pub fn handle(&mut self, key: MenuKey) -> MenuOutcome {
        if key == MenuKey::Quit {
            return MenuOutcome::Quit;
        }
        self.notice = None;

        match self.phase {
            MenuPhase::Title => match key {
                MenuKey::Up | MenuKey::Down => self.cursor = 1 - self.cursor,
                MenuKey::Confirm => self.pick_players(self.cursor + 1),
                MenuKey::Char('1') => self.pick_players(1),
                MenuKey::Char('2') => self.pick_players(2),
                MenuKey::Back => return MenuOutcome::Quit,
                _ => self.notice = Some("Invalid choice: press 1 or 2"),
            },
            MenuPhase::ModeSelect => match key {
                MenuKey::Up => self.cursor = self.cursor.saturating_sub(1),
                MenuKey::Down => self.cursor = (self.cursor + 1).min(DIFFICULTIES.len() - 1),
                MenuKey::Confirm => self.show_rules(DIFFICULTIES[self.cursor]),
                MenuKey::Char(c) => match c.to_ascii_lowercase() {
                    'e' => self.show_rules(Mode::Easy),
                    'm' => self.show_rules(Mode::Medium),
                    'h' => self.show_rules(Mode::Hard),
                    _ => self.notice = Some("Invalid choice: press E, M or H"),
                },
                MenuKey::Back => self.open_title(),
                _ => {}
            },
            MenuPhase::Rules => match key {
                MenuKey::Confirm => {
                    debug!("menu starts a {} game", self.chosen.name());
                    return MenuOutcome::Start(self.chosen);
                }
                MenuKey::Back if self.chosen == Mode::Versus => self.open_title(),
                MenuKey::Back => self.pick_players(1),
                _ => {}
            },
        }
        MenuOutcome::Stay
    }

    /// Lines of the Rules screen for the chosen mode.
    pub fn rules(&self) -> Vec<String> {
        let mode = self.chosen;
        match mode {
            Mode::Versus => vec![
                "Pac-Man moves with the arrow keys.".to_string(),
                "The ghost moves with W A S D.".to_string(),
                format!(
                    "Pac-Man has {} lives to eat every pellet without being caught by the ghost.",
                    mode.lives()
                ),
            ],
            _ => vec![
                format!("{} mode: {} lives, {} ghosts.", mode.name(), mode.lives(), mode.ghosts()),
                "Eat every pellet without being caught by the ghosts.".to_string(),
            ],
        }
    }

    fn pick_players(&mut self, players: usize) {
        if players == 2 {
            self.show_rules(Mode::Versus);
        } else {
            self.phase = MenuPhase::ModeSelect;
            self.cursor = DIFFICULTIES
                .iter()
                .position(|&m| m == self.preferred)
                .unwrap_or(1);
        }
    }

    fn show_rules(&mut self, mode: Mode) {
        self.chosen = mode;
        self.phase = MenuPhase::Rules;
    }

    fn open_title(&mut self) {
        self.phase = MenuPhase::Title;
        self.cursor = usize::from(self.chosen == Mode::Versus);
    }
}
