//! Iterative depth-first search with undo and leg-loss pruning.
//!
//! The engine keeps one frame per played move. A frame remembers the moves
//! that were legal when its depth was first reached and which of them is
//! currently on the board, so backtracking never replays the game from the
//! start.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use peg_core::{Board, BoardConfig, ConfigError, MoveCatalog, MoveId};
use serde::Serialize;

use crate::config::SearchConfig;
use crate::prune::LegLossDetector;
use crate::stats::SearchStats;
use crate::trace::{self, TraceStep};

/// Stack frame for iterative search.
struct Frame {
    /// Moves legal when this depth was reached, in catalog order
    legal: Vec<MoveId>,
    /// Index into legal of the move currently on the board
    cursor: usize,
}

impl Frame {
    #[inline]
    fn current(&self) -> MoveId {
        self.legal[self.cursor]
    }
}

/// The first frame ran out of alternatives.
struct Exhausted;

/// A line of play reaching the target.
#[derive(Clone, Debug, Serialize)]
pub struct Solution {
    pub board: BoardConfig,
    pub target_pins: usize,
    pub final_pins: usize,
    pub steps: Vec<TraceStep>,
    pub dead_ends: u64,
    pub elapsed: Duration,
}

/// Where a search stood when it stopped without reaching the target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub target_pins: usize,
    /// Fewest pins left at any dead end
    pub best_pins: usize,
    /// Pins on the board when the search stopped
    pub num_pins: usize,
    pub depth: usize,
    pub dead_ends: u64,
    pub elapsed: Duration,
}

#[derive(Clone, Debug)]
pub enum SearchOutcome {
    Solved(Solution),
    Exhausted(Report),
    Interrupted(Report),
}

/// Backtracking search over one board shape.
pub struct SearchEngine {
    board: Board,
    catalog: MoveCatalog,
    detector: Option<LegLossDetector>,
    frames: Vec<Frame>,
    progress_interval: u64,
    /// Search statistics
    pub stats: SearchStats,
}

impl SearchEngine {
    pub fn new(config: BoardConfig, search: &SearchConfig) -> Result<Self, ConfigError> {
        let board = Board::new(config)?;
        let catalog = MoveCatalog::new(&board);
        let frames = Vec::with_capacity(board.num_pins());
        let stats = SearchStats::new(board.num_pins());
        Ok(Self {
            board,
            catalog,
            detector: LegLossDetector::from_config(search),
            frames,
            progress_interval: search.progress_interval,
            stats,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Number of moves currently on the board.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Search until `target_pins` or fewer remain, or the tree is exhausted.
    #[cfg(test)]
    pub fn solve(&mut self, target_pins: usize) -> SearchOutcome {
        self.solve_until(target_pins, &AtomicBool::new(true))
    }

    /// Search until `target_pins` or fewer remain, the tree is exhausted, or
    /// `running` is cleared.
    pub fn solve_until(&mut self, target_pins: usize, running: &AtomicBool) -> SearchOutcome {
        log::info!(
            "Searching {}x{} board (short edge {}): {} slots, {} moves, target {} pins",
            self.board.side(),
            self.board.side(),
            self.board.config().short_edge,
            self.board.num_slots(),
            self.catalog.len(),
            target_pins,
        );

        loop {
            if self.board.num_pins() <= target_pins {
                log::info!(
                    "Reached {} pins after {} dead ends",
                    self.board.num_pins(),
                    self.stats.dead_ends
                );
                return SearchOutcome::Solved(self.solution(target_pins));
            }

            if !running.load(Ordering::Relaxed) {
                log::warn!("Search interrupted at depth {}", self.depth());
                return SearchOutcome::Interrupted(self.report(target_pins));
            }

            if self.step().is_err() {
                log::info!(
                    "Search exhausted, best {} pins after {} dead ends",
                    self.stats.best_pins,
                    self.stats.dead_ends
                );
                return SearchOutcome::Exhausted(self.report(target_pins));
            }
        }
    }

    /// Play the first legal move, or back out of a dead end.
    fn step(&mut self) -> Result<(), Exhausted> {
        let legal = self.catalog.legal_moves(&self.board);
        if legal.is_empty() {
            return self.resolve_dead_end();
        }

        let id = legal[0];
        self.frames.push(Frame { legal, cursor: 0 });
        self.play(id);
        self.stats.record_depth(self.frames.len());
        self.check_for_problem()
    }

    fn resolve_dead_end(&mut self) -> Result<(), Exhausted> {
        let num_pins = self.board.num_pins();
        if self.stats.record_dead_end(num_pins) {
            log::info!(
                "New best: {} pins after {} dead ends",
                num_pins,
                self.stats.dead_ends
            );
        }
        if self.stats.should_log(self.progress_interval) {
            self.stats.log_progress(num_pins, self.frames.len());
        }

        // Back off num_pins / 2 moves; the last of them is replaced by its
        // next alternative instead of being taken back.
        let jump = (num_pins / 2).clamp(1, self.frames.len().max(1));
        for _ in 1..jump {
            self.pop_frame();
        }
        self.advance()
    }

    /// Abandon the position if its legs cannot be cleared any more.
    fn check_for_problem(&mut self) -> Result<(), Exhausted> {
        let Some(detector) = self.detector else {
            return Ok(());
        };
        if !detector.applies(&self.board) || !detector.is_lost(&self.board) {
            return Ok(());
        }
        self.stats.problems_detected += 1;

        // Unwind while the position below the top move is lost as well.
        loop {
            let Some(frame) = self.frames.last() else {
                return Err(Exhausted);
            };
            let mov = self.catalog[frame.current()];
            mov.undo_move(&mut self.board);
            let lost = detector.is_lost(&self.board);
            mov.do_move(&mut self.board);
            if !lost {
                break;
            }
            self.pop_frame();
        }
        log::debug!(
            "Lost legs: unwound to depth {} ({} pins)",
            self.frames.len(),
            self.board.num_pins()
        );
        self.advance()
    }

    /// Replace the top move with its next alternative. Frames with no
    /// alternatives left are dropped.
    fn advance(&mut self) -> Result<(), Exhausted> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Err(Exhausted);
            };
            let current = frame.current();
            frame.cursor += 1;
            let next = frame.legal.get(frame.cursor).copied();

            self.take_back(current);
            match next {
                Some(id) => {
                    self.play(id);
                    return Ok(());
                }
                None => {
                    self.frames.pop();
                    self.stats.frames_exhausted += 1;
                }
            }
        }
    }

    fn pop_frame(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.take_back(frame.current());
        }
    }

    #[inline]
    fn play(&mut self, id: MoveId) {
        let played = self.catalog[id].do_move(&mut self.board);
        debug_assert!(played, "move {} not playable", id);
        self.stats.moves_applied += 1;
    }

    #[inline]
    fn take_back(&mut self, id: MoveId) {
        let undone = self.catalog[id].undo_move(&mut self.board);
        debug_assert!(undone, "move {} not undoable", id);
        self.stats.moves_undone += 1;
    }

    fn solution(&self, target_pins: usize) -> Solution {
        let moves = self.frames.iter().map(|frame| {
            let mov = &self.catalog[frame.current()];
            (mov.reference(), mov.axis())
        });
        // The frame stack is a line of play from the start position, so the
        // replay cannot fail.
        let steps = trace::replay(self.board.config(), moves)
            .expect("frame stack replays from the start position");
        Solution {
            board: self.board.config(),
            target_pins,
            final_pins: self.board.num_pins(),
            steps,
            dead_ends: self.stats.dead_ends,
            elapsed: self.stats.elapsed(),
        }
    }

    fn report(&self, target_pins: usize) -> Report {
        Report {
            target_pins,
            best_pins: self.stats.best_pins,
            num_pins: self.board.num_pins(),
            depth: self.frames.len(),
            dead_ends: self.stats.dead_ends,
            elapsed: self.stats.elapsed(),
        }
    }
}
