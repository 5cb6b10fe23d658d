/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Projection: one maze tile is two terminal columns by one row. Actors are
/// drawn over every tile their pixel footprint touches, in registration
/// order, so later actors end up on top.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::actor::Actor;
use crate::domain::entity::{Critter, Grade};
use crate::domain::grid::{Direction, TILE};
use crate::sim::game::{Game, Mode, Phase};
use crate::sim::maze::Maze;
use crate::sim::menu::{Menu, MenuPhase, DIFFICULTIES, PLAYER_CHOICES};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// gaps between rows match the cells on VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg: Self::norm_bg(bg) }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }
}

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const WALL_FG: Color = Color::Rgb { r: 70, g: 90, b: 230 };
const WALL_BG: Color = Color::Rgb { r: 25, g: 30, b: 110 };
const PELLET_FG: Color = Color::Rgb { r: 255, g: 200, b: 170 };
const PACMAN_BG: Color = Color::Rgb { r: 255, g: 220, b: 0 };
const RIVAL_BG: Color = Color::Rgb { r: 150, g: 60, b: 220 };

/// Indexed by ghost colour.
const GHOST_BG: [Color; 4] = [
    Color::Rgb { r: 230, g: 30, b: 30 },
    Color::Rgb { r: 255, g: 150, b: 200 },
    Color::Rgb { r: 0, g: 220, b: 230 },
    Color::Rgb { r: 255, g: 160, b: 40 },
];

// ── Renderer ──

/// Each maze tile = 2 terminal columns.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MENU_ROW: usize = 4;

/// What was on screen last frame; a change forces a full repaint.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Shown {
    Menu(MenuPhase),
    Game(Phase),
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_shown: Option<Shown>,
    key_release: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_shown: None,
            key_release: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        // Two players hold keys at once: ask for Release events where supported
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.key_release = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    /// The terminal reports key Release events.
    pub fn reports_key_release(&self) -> bool {
        self.key_release
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.key_release {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, game: &Game) -> io::Result<()> {
        self.begin_frame(Shown::Game(game.phase()))?;
        self.compose(game);
        self.end_frame()
    }

    /// Setup menu over the board that will be played.
    pub fn render_menu(&mut self, menu: &Menu, maze: &Maze) -> io::Result<()> {
        self.begin_frame(Shown::Menu(menu.phase()))?;
        self.compose_menu(menu, maze);
        self.end_frame()
    }

    fn begin_frame(&mut self, shown: Shown) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect screen change → clear for clean transition
        if self.last_shown != Some(shown) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_shown = Some(shown);
        }

        self.front.clear();
        Ok(())
    }

    fn end_frame(&mut self) -> io::Result<()> {
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, game: &Game) {
        self.compose_hud(game);
        self.compose_board(game);
        self.compose_actors(game);

        let (_, rows) = game.maze().dims();
        let help_row = MAP_ROW + rows + 1;
        let help = match game.mode() {
            Mode::Versus => " Arrows: Pac-Man   WASD: Rival   Esc/Q: Quit",
            _ => " Arrows: Move   Esc/Q: Quit",
        };
        self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);

        match game.phase() {
            Phase::Playing => {}
            Phase::GameOver => self.compose_banner(game, "GAME  OVER", Color::Rgb { r: 255, g: 60, b: 60 }),
            Phase::Won => self.compose_banner(game, "BOARD CLEARED", Color::Rgb { r: 80, g: 255, b: 80 }),
        }
    }

    fn compose_hud(&mut self, game: &Game) {
        let hud = format!(
            " {}  {}  Score:{:<6}  Lives:{}  Pellets:{} ",
            game.maze().name,
            game.mode().name(),
            game.score(),
            game.lives(),
            game.pellets_left(),
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_board(&mut self, game: &Game) {
        let maze = game.maze();
        let (cols, rows) = maze.dims();
        for row in 0..rows {
            for col in 0..cols {
                if maze.tile(col as i32, row as i32).is_solid() {
                    self.paint(col as i32, row as i32, ('▓', '▓'), WALL_FG, WALL_BG);
                }
            }
        }
    }

    fn compose_actors(&mut self, game: &Game) {
        let arena = game.arena();
        for id in arena.actors() {
            let Some(critter) = arena.get(id) else { continue };
            let (x, y) = critter.position();

            match critter {
                Critter::Pellet(p) => {
                    let (col, row) = (x.div_euclid(TILE), y.div_euclid(TILE));
                    let glyph = match p.grade() {
                        Grade::Small => ('•', ' '),
                        Grade::Large => ('●', ' '),
                    };
                    self.paint(col, row, glyph, PELLET_FG, Color::Reset);
                }
                Critter::Pacman(p) => {
                    let ch = match p.facing() {
                        Direction::Right => '>',
                        Direction::Left => '<',
                        Direction::Up => '^',
                        Direction::Down => 'v',
                    };
                    self.paint_footprint(critter, (ch, ch), Color::Black, PACMAN_BG);
                }
                Critter::Ghost(g) => {
                    let bg = GHOST_BG[g.color() as usize % GHOST_BG.len()];
                    // No sprite while standing still: plain filled block
                    let glyph = if critter.symbol().is_some() { ('o', 'o') } else { (' ', ' ') };
                    self.paint_footprint(critter, glyph, Color::White, bg);
                }
                Critter::Rival(_) => {
                    self.paint_footprint(critter, ('o', 'o'), Color::White, RIVAL_BG);
                }
            }
        }
    }

    /// Centered box over the board with the final score.
    fn compose_banner(&mut self, game: &Game, title: &str, fg: Color) {
        let (cols, rows) = game.maze().dims();
        let width = 24;
        let x = (cols * CELL_W).saturating_sub(width) / 2;
        let y = MAP_ROW + rows.saturating_sub(5) / 2;
        let bg = Color::Rgb { r: 10, g: 10, b: 20 };

        let border = format!("+{}+", "-".repeat(width - 2));
        let score = format!("Score {}", game.score());
        let lines = [
            border.clone(),
            format!("|{:^w$}|", title, w = width - 2),
            format!("|{:^w$}|", score, w = width - 2),
            format!("|{:^w$}|", "Enter: menu  Q: quit", w = width - 2),
            border,
        ];
        for (i, line) in lines.iter().enumerate() {
            self.front.put_str(x, y + i, line, fg, bg);
        }
    }

    fn compose_menu(&mut self, menu: &Menu, maze: &Maze) {
        let title_fg = Color::Rgb { r: 255, g: 220, b: 0 };
        let select_bg = Color::Rgb { r: 60, g: 60, b: 140 };

        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, " MAZE CHASE ", title_fg, HUD_BG);
        self.front.put_str(2, MAP_ROW, &format!("Board: {}", maze.name), Color::Grey, Color::Reset);

        let mut y = MENU_ROW;
        let (heading, help) = match menu.phase() {
            MenuPhase::Title => ("How many players?", " 1/2 or Up/Down + Enter   Esc/Q: Quit"),
            MenuPhase::ModeSelect => ("Choose the difficulty", " E/M/H or Up/Down + Enter   Esc: Back"),
            MenuPhase::Rules => ("How to play", " Enter: Start   Esc: Back"),
        };
        self.front.put_str(2, y, heading, Color::White, Color::Reset);
        y += 2;

        let options: Vec<String> = match menu.phase() {
            MenuPhase::Title => PLAYER_CHOICES.iter().map(|s| s.to_string()).collect(),
            MenuPhase::ModeSelect => DIFFICULTIES
                .iter()
                .map(|m| format!("{:<7} {} lives, {} ghosts", m.name(), m.lives(), m.ghosts()))
                .collect(),
            MenuPhase::Rules => vec![],
        };
        for (i, option) in options.iter().enumerate() {
            let (marker, bg) = if i == menu.cursor() { ('>', select_bg) } else { (' ', Color::Reset) };
            self.front.put_str(2, y + i, &format!("{marker} {option} "), Color::White, bg);
        }
        if menu.phase() == MenuPhase::Rules {
            for (i, line) in menu.rules().iter().enumerate() {
                self.front.put_str(2, y + i, line, Color::White, Color::Reset);
            }
        }
        y += 5;

        if let Some(notice) = menu.notice() {
            self.front.put_str(2, y, notice, Color::Rgb { r: 255, g: 60, b: 60 }, Color::Reset);
        }
        self.front.put_str(0, y + 2, help, Color::DarkGrey, Color::Reset);
    }

    /// Paint every on-board tile the actor's footprint touches.
    fn paint_footprint(&mut self, actor: &Critter, glyph: (char, char), fg: Color, bg: Color) {
        let (x, y) = actor.position();
        let (w, h) = actor.size();
        for row in y.div_euclid(TILE)..=(y + h - 1).div_euclid(TILE) {
            for col in x.div_euclid(TILE)..=(x + w - 1).div_euclid(TILE) {
                self.paint(col, row, glyph, fg, bg);
            }
        }
    }

    /// Paint one maze tile. Tiles off the board (tunnel overhang) are skipped.
    fn paint(&mut self, col: i32, row: i32, (c0, c1): (char, char), fg: Color, bg: Color) {
        if col < 0 || row < 0 {
            return;
        }
        let (tx, ty) = (col as usize * CELL_W, MAP_ROW + row as usize);
        self.front.set(tx, ty, Cell::from_char(c0, fg, bg));
        self.front.set(tx + 1, ty, Cell::from_char(c1, fg, bg));
    }
}
