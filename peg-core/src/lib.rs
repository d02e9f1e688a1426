//! Peg solitaire board geometry and jump moves.
//!
//! # Board Layout
//!
//! The board is a square grid of `side × side` cells with the four corner
//! blocks cut away, leaving a cross. Cells are indexed row-major. For the
//! classical English board (`side = 7`, `short_edge = 3`):
//!
//! ```text
//!           2  3  4
//!           9 10 11
//!    14 15 16 17 18 19 20
//!    21 22 23 24 25 26 27
//!    28 29 30 31 32 33 34
//!          37 38 39
//!          44 45 46
//! ```
//!
//! Every slot starts occupied except the center (`side² / 2`).
//!
//! # Moves
//!
//! A move is a line of three slots `[reference, middle, far]` running right
//! (horizontal) or down (vertical) from the reference slot. The same move
//! covers both jump directions: a pin on `reference` jumping to `far`, or a
//! pin on `far` jumping back to `reference`. Applying a move toggles all
//! three slots, so applying it twice is the identity.

mod error;

use serde::{Deserialize, Serialize};

pub use error::ConfigError;

/// Side length of the classical English board.
pub const DEFAULT_SIDE: usize = 7;

/// Arm width of the classical English board.
pub const DEFAULT_SHORT_EDGE: usize = 3;

/// Largest accepted board side.
pub const MAX_SIDE: usize = 255;

/// Index into the move catalog.
pub type MoveId = usize;

/// Sentinel for a stepped index that left the grid.
const NO_SLOT: usize = usize::MAX;

/// Line a move runs along.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Along a row (column changes).
    Horizontal,
    /// Along a column (row changes).
    Vertical,
}

impl Axis {
    /// Both axes, in catalog order.
    pub const ALL: [Axis; 2] = [Axis::Vertical, Axis::Horizontal];

    /// Row and column deltas for a single positive step.
    #[inline]
    fn unit(self) -> (isize, isize) {
        match self {
            Axis::Horizontal => (0, 1),
            Axis::Vertical => (1, 0),
        }
    }

    /// Single-byte code used by the trace format.
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
        }
    }

    /// Inverse of [`Axis::code`].
    #[inline]
    pub fn from_code(code: u8) -> Option<Axis> {
        match code {
            0 => Some(Axis::Horizontal),
            1 => Some(Axis::Vertical),
            _ => None,
        }
    }
}

/// Shape of a cross board: a `side × side` square with corners cut so that
/// each arm is `short_edge` slots wide.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub side: usize,
    pub short_edge: usize,
}

impl BoardConfig {
    /// Create a validated configuration.
    pub fn new(side: usize, short_edge: usize) -> Result<BoardConfig, ConfigError> {
        let config = BoardConfig { side, short_edge };
        config.validate()?;
        Ok(config)
    }

    /// The classical 33-hole English board.
    pub const fn english() -> BoardConfig {
        BoardConfig {
            side: DEFAULT_SIDE,
            short_edge: DEFAULT_SHORT_EDGE,
        }
    }

    /// Check the shape constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.short_edge == 0 {
            return Err(ConfigError::ZeroShortEdge);
        }
        if self.side % 2 == 0 {
            return Err(ConfigError::EvenSide(self.side));
        }
        if self.side < self.short_edge + 2 {
            return Err(ConfigError::SideTooSmall {
                side: self.side,
                short_edge: self.short_edge,
            });
        }
        if self.side > MAX_SIDE {
            return Err(ConfigError::SideTooLarge {
                side: self.side,
                max: MAX_SIDE,
            });
        }
        Ok(())
    }

    /// Number of grid cells, slots or not.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.side * self.side
    }

    /// Number of slots: the square minus the four corner blocks.
    #[inline]
    pub fn num_slots(&self) -> usize {
        let cut = self.side - self.short_edge;
        self.num_cells() - cut * cut
    }

    /// Grid index of the slot that starts empty.
    #[inline]
    pub fn center(&self) -> usize {
        self.num_cells() / 2
    }

    /// Widths of the leading (top/left) and trailing (bottom/right) corner
    /// blocks. The trailing side takes the extra cell when the cut is odd.
    #[inline]
    pub fn corner_cut(&self) -> (usize, usize) {
        let cut = self.side - self.short_edge;
        let leading = cut / 2;
        (leading, cut - leading)
    }

    /// Check whether a grid cell lies inside one of the four cut corners.
    pub fn in_corner(&self, row: usize, col: usize) -> bool {
        let (leading, trailing) = self.corner_cut();
        let last_kept = self.side - trailing - 1;
        let outer_row = row < leading || row > last_kept;
        let outer_col = col < leading || col > last_kept;
        outer_row && outer_col
    }

    /// Step `shift` cells along `axis` from `index`.
    ///
    /// Returns `None` if the row or column becomes negative. Columns past the
    /// right border are NOT rejected here; they wrap into the next row and
    /// must be caught by the caller (see [`Move::new`]).
    pub fn step(&self, index: usize, axis: Axis, shift: isize) -> Option<usize> {
        let row = (index / self.side) as isize;
        let col = (index % self.side) as isize;
        let (d_row, d_col) = axis.unit();
        let row = row + d_row * shift;
        let col = col + d_col * shift;
        if row < 0 || col < 0 {
            return None;
        }
        Some(row as usize * self.side + col as usize)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig::english()
    }
}

/// A board position able to hold a pin.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Slot {
    /// Grid index, stable for the life of the board.
    pub index: usize,
    pub occupied: bool,
}

impl Slot {
    /// Switch between occupied and empty.
    #[inline]
    pub fn change_state(&mut self) {
        self.occupied = !self.occupied;
    }
}

/// One of the four short arms of the cross.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Leg {
    Top,
    Bottom,
    Left,
    Right,
}

impl Leg {
    pub const ALL: [Leg; 4] = [Leg::Top, Leg::Bottom, Leg::Left, Leg::Right];
}

/// Cross-shaped board: fixed geometry plus per-slot occupancy.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    config: BoardConfig,
    /// One entry per grid cell; `None` inside the cut corners.
    cells: Vec<Option<Slot>>,
    num_slots: usize,
    num_pins: usize,
    /// Border runs of each arm, in [`Leg::ALL`] order.
    legs: [Vec<usize>; 4],
}

impl Board {
    /// Create the starting position: every slot filled except the center.
    pub fn new(config: BoardConfig) -> Result<Board, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// `config` must already be valid.
    fn build(config: BoardConfig) -> Board {
        let side = config.side;
        let center = config.center();

        let cells: Vec<Option<Slot>> = (0..config.num_cells())
            .map(|index| {
                if config.in_corner(index / side, index % side) {
                    None
                } else {
                    Some(Slot {
                        index,
                        occupied: index != center,
                    })
                }
            })
            .collect();

        let num_slots = cells.iter().flatten().count();
        let num_pins = cells.iter().flatten().filter(|s| s.occupied).count();

        let exists = |index: usize| cells[index].is_some();
        let last = side - 1;
        let top: Vec<usize> = (0..side).filter(|&j| exists(j)).collect();
        let bottom: Vec<usize> = (0..side)
            .map(|j| last * side + j)
            .filter(|&i| exists(i))
            .collect();
        let left: Vec<usize> = (0..side).map(|i| i * side).filter(|&i| exists(i)).collect();
        let right: Vec<usize> = (0..side)
            .map(|i| i * side + last)
            .filter(|&i| exists(i))
            .collect();

        Board {
            config,
            cells,
            num_slots,
            num_pins,
            legs: [top, bottom, left, right],
        }
    }

    #[inline]
    pub fn config(&self) -> BoardConfig {
        self.config
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.config.side
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of slots on the board (constant).
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    /// Number of currently occupied slots.
    #[inline]
    pub fn num_pins(&self) -> usize {
        self.num_pins
    }

    /// Check if a grid index names a slot. Out-of-range indices are not slots.
    #[inline]
    pub fn slot_exists(&self, index: usize) -> bool {
        matches!(self.cells.get(index), Some(Some(_)))
    }

    /// Get the slot at a grid index.
    #[inline]
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    /// Check if a slot holds a pin. Cells that are not slots are never occupied.
    #[inline]
    pub fn is_occupied(&self, index: usize) -> bool {
        self.slot(index).is_some_and(|s| s.occupied)
    }

    /// Toggle the occupancy of a slot, keeping the pin count in step.
    ///
    /// Returns false (and does nothing) if `index` is not a slot.
    pub fn change_state(&mut self, index: usize) -> bool {
        let Some(Some(slot)) = self.cells.get_mut(index) else {
            return false;
        };
        slot.change_state();
        if slot.occupied {
            self.num_pins += 1;
        } else {
            self.num_pins -= 1;
        }
        true
    }

    /// Iterate over all slots in grid order.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.cells.iter().flatten()
    }

    /// Occupancy of every grid cell (false for cells that are not slots).
    pub fn occupancy(&self) -> Vec<bool> {
        self.cells
            .iter()
            .map(|cell| cell.is_some_and(|s| s.occupied))
            .collect()
    }

    /// Border run of one arm, exactly `short_edge` slots.
    #[inline]
    pub fn leg(&self, leg: Leg) -> &[usize] {
        &self.legs[leg as usize]
    }

    /// All four border runs, in [`Leg::ALL`] order.
    #[inline]
    pub fn legs(&self) -> &[Vec<usize>; 4] {
        &self.legs
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::build(BoardConfig::english())
    }
}

/// A line of three slots a pin can jump along.
///
/// `exists` is fixed at construction; whether the move can be played right
/// now depends on the board and is checked with [`Move::is_possible`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Move {
    reference: usize,
    middle: usize,
    far: usize,
    axis: Axis,
    exists: bool,
}

impl Move {
    /// Build the move anchored at `reference` running along `axis`.
    pub fn new(board: &Board, reference: usize, axis: Axis) -> Move {
        let config = board.config();
        let middle = config.step(reference, axis, 1).unwrap_or(NO_SLOT);
        let far = config.step(reference, axis, 2).unwrap_or(NO_SLOT);

        let mut exists =
            board.slot_exists(reference) && board.slot_exists(middle) && board.slot_exists(far);
        if axis == Axis::Horizontal {
            // A horizontal jump must stay within one row.
            exists = exists && reference / config.side == far / config.side;
        }

        Move {
            reference,
            middle,
            far,
            axis,
            exists,
        }
    }

    #[inline]
    pub fn reference(&self) -> usize {
        self.reference
    }

    #[inline]
    pub fn middle(&self) -> usize {
        self.middle
    }

    #[inline]
    pub fn far(&self) -> usize {
        self.far
    }

    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// All three slots lie on the board.
    #[inline]
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// The three slots in line order.
    #[inline]
    pub fn slots(&self) -> [usize; 3] {
        [self.reference, self.middle, self.far]
    }

    /// Middle pin present and exactly one end occupied.
    #[inline]
    pub fn is_possible(&self, board: &Board) -> bool {
        self.exists
            && board.is_occupied(self.middle)
            && board.is_occupied(self.reference) != board.is_occupied(self.far)
    }

    /// Middle empty and exactly one end occupied: the pattern a played move
    /// leaves behind.
    #[inline]
    pub fn is_possible_undo(&self, board: &Board) -> bool {
        self.exists
            && !board.is_occupied(self.middle)
            && board.is_occupied(self.reference) != board.is_occupied(self.far)
    }

    /// Play the move. Returns false with no effect if it is not possible.
    pub fn do_move(&self, board: &mut Board) -> bool {
        if !self.is_possible(board) {
            return false;
        }
        self.toggle(board);
        true
    }

    /// Take the move back. Returns false with no effect if the board does not
    /// show the post-move pattern.
    pub fn undo_move(&self, board: &mut Board) -> bool {
        if !self.is_possible_undo(board) {
            return false;
        }
        self.toggle(board);
        true
    }

    /// Pin travel `(from, to)` if the move were played now.
    pub fn jump(&self, board: &Board) -> Option<(usize, usize)> {
        if !self.is_possible(board) {
            return None;
        }
        if board.is_occupied(self.reference) {
            Some((self.reference, self.far))
        } else {
            Some((self.far, self.reference))
        }
    }

    #[inline]
    fn toggle(&self, board: &mut Board) {
        for index in self.slots() {
            board.change_state(index);
        }
    }
}

/// Every move that exists on a board shape, in grid order.
#[derive(Clone, Debug)]
pub struct MoveCatalog {
    moves: Vec<Move>,
}

impl MoveCatalog {
    /// Enumerate all existing moves. Occupancy of `board` is irrelevant.
    pub fn new(board: &Board) -> MoveCatalog {
        let mut moves = Vec::with_capacity(board.num_slots() * 2);
        for slot in board.slots() {
            for axis in Axis::ALL {
                let mov = Move::new(board, slot.index, axis);
                if mov.exists() {
                    moves.push(mov);
                }
            }
        }
        log::debug!(
            "move catalog: {} moves over {} slots",
            moves.len(),
            board.num_slots()
        );
        MoveCatalog { moves }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    #[inline]
    pub fn get(&self, id: MoveId) -> Option<&Move> {
        self.moves.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> + '_ {
        self.moves.iter()
    }

    /// Find the catalog entry for a reference slot and axis.
    pub fn find(&self, reference: usize, axis: Axis) -> Option<MoveId> {
        self.moves
            .iter()
            .position(|m| m.reference() == reference && m.axis() == axis)
    }

    /// Ids of the moves currently possible on `board`, in catalog order.
    pub fn legal_moves(&self, board: &Board) -> Vec<MoveId> {
        self.moves
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_possible(board))
            .map(|(id, _)| id)
            .collect()
    }
}

impl std::ops::Index<MoveId> for MoveCatalog {
    type Output = Move;

    #[inline]
    fn index(&self, id: MoveId) -> &Move {
        &self.moves[id]
    }
}
