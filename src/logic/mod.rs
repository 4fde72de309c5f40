use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use dashmap::DashMap;
use rand::Rng;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    data::{Cell, CellState, Field, Outcome},
    error::GameError,
    model::{GameParams, Pos, TileView, server::StateResponse},
};

pub type Sessions = Arc<DashMap<String, Arc<Mutex<Game>>>>;

/// One in-progress or concluded game, owned by the session store and
/// mutated only behind its per-session mutex.
pub struct Game {
    field: Field,
    started_at: Instant,
    ended_at: Option<SystemTime>,
    last_activity: Instant,
}

/// Cells newly opened by a reveal, plus whether it tripped a mine.
#[derive(Debug, Default)]
pub struct RevealResult {
    pub opened: Vec<Pos>,
    pub hit_mine: bool,
}

fn validate_params(params: &GameParams) -> Result<(), GameError> {
    if params.width == 0 || params.height == 0 {
        return Err(GameError::InvalidDimensions);
    }
    let cells = params
        .width
        .checked_mul(params.height)
        .ok_or(GameError::InvalidDimensions)?;
    if params.mines >= cells {
        return Err(GameError::InvalidDimensions);
    }
    Ok(())
}

// Selection sampling over the cell sequence: each cell is a mine with
// probability mines_left / cells_left, which places exactly `mines` mines
// uniformly without replacement.
fn generate_mines(params: &GameParams) -> Vec<bool> {
    let length = params.width * params.height;
    let mut mines = Vec::with_capacity(length);
    let mut rng = rand::rng();

    let mut mines_left = params.mines;
    for cells_left in (1..=length).rev() {
        let mine = rng.random_ratio(mines_left as u32, cells_left as u32);
        mines.push(mine);
        if mine {
            mines_left -= 1;
        }
    }

    mines
}

fn count_adjacent_mines(mines: &[bool], index: usize, width: usize, height: usize) -> u8 {
    let x = index % width;
    let y = index / width;
    let mut count = 0;

    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }

            let new_x = x as i64 + dx;
            let new_y = y as i64 + dy;

            if new_x >= 0 && new_x < width as i64 && new_y >= 0 && new_y < height as i64 {
                let adj_index = (new_x as usize) + (new_y as usize) * width;
                if mines[adj_index] {
                    count += 1;
                }
            }
        }
    }

    count
}

fn cells_from_layout(mines: &[bool], width: usize, height: usize) -> Vec<Cell> {
    mines
        .iter()
        .enumerate()
        .map(|(i, mine)| Cell {
            mine: *mine,
            adjacent: count_adjacent_mines(mines, i, width, height),
            state: CellState::Hidden,
        })
        .collect()
}

impl Field {
    pub fn new(params: GameParams) -> Result<Self, GameError> {
        validate_params(&params)?;
        let mines = generate_mines(&params);
        Ok(Self {
            width: params.width,
            height: params.height,
            mines: params.mines,
            revealed: 0,
            flagged: 0,
            outcome: Outcome::Active,
            triggered: None,
            cells: cells_from_layout(&mines, params.width, params.height),
        })
    }

    /// Builds a field with mines at exactly the given coordinates, for
    /// deterministic scenarios.
    pub fn with_mines(width: usize, height: usize, positions: &[Pos]) -> Result<Self, GameError> {
        if width == 0 || height == 0 {
            return Err(GameError::InvalidDimensions);
        }
        let mut mines = vec![false; width * height];
        for pos in positions {
            if pos.x >= width || pos.y >= height {
                return Err(GameError::OutOfBounds);
            }
            mines[pos.x + pos.y * width] = true;
        }

        let mine_count = mines.iter().filter(|mine| **mine).count();
        if mine_count >= width * height {
            return Err(GameError::InvalidDimensions);
        }

        Ok(Self {
            width,
            height,
            mines: mine_count,
            revealed: 0,
            flagged: 0,
            outcome: Outcome::Active,
            triggered: None,
            cells: cells_from_layout(&mines, width, height),
        })
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Pos) -> usize {
        pos.x + pos.y * self.width
    }

    fn has_won(&self) -> bool {
        self.width * self.height == self.mines + self.revealed
    }

    /// Opens the cell at `pos`. A mine ends the game and exposes the whole
    /// layout; a zero-adjacency cell flood-fills its connected region
    /// breadth-first, never crossing mines or opening flagged cells.
    /// Opened and flagged targets are a no-op.
    pub fn reveal(&mut self, pos: Pos) -> RevealResult {
        let index = self.index(pos);
        if self.cells[index].state != CellState::Hidden {
            return RevealResult::default();
        }

        if self.cells[index].mine {
            self.triggered = Some(pos);
            let opened = self.reveal_mines();
            self.outcome = Outcome::Lost;
            return RevealResult {
                opened,
                hit_mine: true,
            };
        }

        let mut opened = Vec::new();
        let mut queue = VecDeque::new();

        self.cells[index].state = CellState::Revealed;
        self.revealed += 1;
        opened.push(pos);
        queue.push_back(pos);

        while let Some(pos) = queue.pop_front() {
            if self.cells[self.index(pos)].adjacent != 0 {
                continue;
            }

            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }

                    let x = pos.x as i64 + dx;
                    let y = pos.y as i64 + dy;
                    if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
                        continue;
                    }

                    let next = Pos {
                        x: x as usize,
                        y: y as usize,
                    };
                    let index = self.index(next);
                    if self.cells[index].state != CellState::Hidden {
                        continue;
                    }

                    self.cells[index].state = CellState::Revealed;
                    self.revealed += 1;
                    opened.push(next);
                    queue.push_back(next);
                }
            }
        }

        if self.has_won() {
            self.outcome = Outcome::Won;
        }

        RevealResult {
            opened,
            hit_mine: false,
        }
    }

    // Exposes the whole mine layout after a loss. Flags sitting on mines
    // are replaced by the opened mine, so the flag counter drops with them.
    fn reveal_mines(&mut self) -> Vec<Pos> {
        let mut opened = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos { x, y };
                let index = self.index(pos);
                let cell = &mut self.cells[index];
                if !cell.mine || cell.state == CellState::Revealed {
                    continue;
                }
                if cell.state == CellState::Flagged {
                    self.flagged -= 1;
                }
                cell.state = CellState::Revealed;
                opened.push(pos);
            }
        }
        opened
    }

    /// Toggles the flag on a hidden cell and returns the new flagged
    /// state. Opened cells cannot be flagged.
    pub fn toggle_flag(&mut self, pos: Pos) -> bool {
        let index = self.index(pos);
        match self.cells[index].state {
            CellState::Hidden => {
                self.cells[index].state = CellState::Flagged;
                self.flagged += 1;
                true
            }
            CellState::Flagged => {
                self.cells[index].state = CellState::Hidden;
                self.flagged -= 1;
                false
            }
            CellState::Revealed => false,
        }
    }

    fn tile_view(&self, index: usize) -> TileView {
        let cell = &self.cells[index];
        match cell.state {
            CellState::Hidden => TileView::Unopened,
            CellState::Flagged => TileView::Flagged,
            CellState::Revealed if cell.mine => {
                let pos = Pos {
                    x: index % self.width,
                    y: index / self.width,
                };
                if self.triggered == Some(pos) {
                    TileView::MineTriggered
                } else {
                    TileView::Mine
                }
            }
            CellState::Revealed => TileView::Opened(cell.adjacent),
        }
    }

    pub fn tiles(&self) -> Vec<TileView> {
        (0..self.cells.len()).map(|index| self.tile_view(index)).collect()
    }
}

impl Game {
    #[instrument(level = "trace")]
    pub fn new(params: GameParams) -> Result<Self, GameError> {
        let field = Field::new(params)?;
        info!(
            "Creating new game: {}x{} with {} mines",
            params.width, params.height, params.mines
        );
        Ok(Self::from_field(field))
    }

    fn from_field(field: Field) -> Self {
        Self {
            field,
            started_at: Instant::now(),
            ended_at: None,
            last_activity: Instant::now(),
        }
    }

    fn check_actionable(&self, pos: Pos) -> Result<(), GameError> {
        if !self.field.contains(pos) {
            warn!("Position outside the board: ({}, {})", pos.x, pos.y);
            return Err(GameError::OutOfBounds);
        }
        if self.field.outcome != Outcome::Active {
            debug!("Action on ended game at ({}, {})", pos.x, pos.y);
            return Err(GameError::SessionEnded);
        }
        Ok(())
    }

    #[instrument(level = "trace", skip(self), fields(x = pos.x, y = pos.y))]
    pub fn reveal(&mut self, pos: Pos) -> Result<RevealResult, GameError> {
        self.check_actionable(pos)?;
        self.last_activity = Instant::now();

        let result = self.field.reveal(pos);
        match self.field.outcome {
            Outcome::Lost => {
                info!("Player hit mine at ({}, {}) - game over", pos.x, pos.y);
                self.ended_at = Some(SystemTime::now());
            }
            Outcome::Won => {
                info!("Game won, all safe cells revealed");
                self.ended_at = Some(SystemTime::now());
            }
            Outcome::Active => {
                debug!("Revealed {} cells, game continues", result.opened.len());
            }
        }
        Ok(result)
    }

    #[instrument(level = "trace", skip(self), fields(x = pos.x, y = pos.y))]
    pub fn flag(&mut self, pos: Pos) -> Result<bool, GameError> {
        self.check_actionable(pos)?;
        self.last_activity = Instant::now();

        let flagged = self.field.toggle_flag(pos);
        debug!("Cell ({}, {}) flagged: {}", pos.x, pos.y, flagged);
        Ok(flagged)
    }

    pub fn outcome(&self) -> Outcome {
        self.field.outcome
    }

    /// Client-visible snapshot returned after every action.
    pub fn state_response(&self) -> StateResponse {
        let tiles = self.field.tiles();
        StateResponse {
            flags: self.field.flagged,
            grid: tiles.clone(),
            tiles,
            ended_at: self.ended_at.map(|at| {
                at.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
            }),
            won: match self.field.outcome {
                Outcome::Active => None,
                Outcome::Won => Some(true),
                Outcome::Lost => Some(false),
            },
        }
    }

    pub fn should_cleanup(&self, inactive_timeout_secs: u64, max_lifetime_secs: u64) -> bool {
        let now = Instant::now();
        now.duration_since(self.last_activity).as_secs() > inactive_timeout_secs
            || now.duration_since(self.started_at).as_secs() > max_lifetime_secs
    }
}
