//! Text rendering of boards and solution replays.
//!
//! - `O` slot with a pin
//! - `-` empty slot
//! - `X` slot emptied by the move shown
//! - `x` slot the jumping pin landed in

use std::fmt::Write;
use std::time::Duration;

use peg_core::{Board, BoardConfig};

use crate::solver::Solution;
use crate::stats::format_clock;
use crate::trace::TraceStep;

const LINE_WIDTH: usize = 60;

fn cell_char(config: &BoardConfig, occupancy: &[bool], index: usize) -> char {
    let (row, col) = (index / config.side, index % config.side);
    if config.in_corner(row, col) {
        ' '
    } else if occupancy[index] {
        'O'
    } else {
        '-'
    }
}

/// One line per board row.
pub fn render_board(config: &BoardConfig, occupancy: &[bool]) -> String {
    let mut out = String::new();
    for row in 0..config.side {
        let line: String = (0..config.side)
            .flat_map(|col| [' ', cell_char(config, occupancy, row * config.side + col)])
            .collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Slot indices in board layout.
pub fn render_layout(board: &Board) -> String {
    let config = board.config();
    let width = (config.num_cells() - 1).to_string().len();
    let mut out = String::new();
    for row in 0..config.side {
        let mut line = String::new();
        for col in 0..config.side {
            let index = row * config.side + col;
            if board.slot_exists(index) {
                let _ = write!(line, " {:>width$}", index);
            } else {
                let _ = write!(line, " {:>width$}", "");
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// The move on the left, the board it leaves on the right.
pub fn render_step(config: &BoardConfig, step: &TraceStep) -> String {
    let side = config.side;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Move {} -> {} over {}:{}Resulting board:",
        step.from,
        step.to,
        step.over,
        " ".repeat((3 * side).saturating_sub(15))
    );

    let moved = [step.from, step.over, step.to];
    for row in 0..side {
        let mut line = String::new();
        for col in 0..side {
            let index = row * side + col;
            line.push(' ');
            let c = cell_char(config, &step.occupancy, index);
            if c != ' ' && moved.contains(&index) {
                line.push(if step.occupancy[index] { 'x' } else { 'X' });
            } else {
                line.push(c);
            }
        }
        line.push_str(&" ".repeat(side));
        for col in 0..side {
            line.push(' ');
            line.push(cell_char(config, &step.occupancy, row * side + col));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Full move-by-move replay of a solution.
pub fn render_replay(solution: &Solution) -> String {
    let mut out = boxed(&["Resulting moves"]);
    out.push_str("\n  O : slot with pin\n");
    out.push_str("  - : slot without pin\n");
    out.push_str("  X : slots emptied by the move\n");
    out.push_str("  x : slot the pin jumps into\n\n");

    for (i, step) in solution.steps.iter().enumerate() {
        let _ = writeln!(out, "[{}/{}]", i + 1, solution.steps.len());
        out.push_str(&render_step(&solution.board, step));
        out.push('\n');
    }

    let _ = writeln!(out, "Pins left: {}", solution.final_pins);
    let _ = writeln!(out, "Dead ends: {}", solution.dead_ends);
    let _ = writeln!(out, "Processing time: {}", format_duration(solution.elapsed));
    out
}

/// Startup banner.
pub fn banner() -> String {
    boxed(&[
        "pegsol",
        &format!("peg solitaire solver v{}", env!("CARGO_PKG_VERSION")),
    ])
}

fn format_duration(elapsed: Duration) -> String {
    format!("{} ({:.3}s)", format_clock(elapsed), elapsed.as_secs_f64())
}

/// Lines centered between double rules.
fn boxed(lines: &[&str]) -> String {
    let rule = "=".repeat(LINE_WIDTH);
    let inner = LINE_WIDTH - 4;
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "||{:^inner$}||", "");
    for line in lines {
        let _ = writeln!(out, "||{:^inner$}||", line);
    }
    let _ = writeln!(out, "||{:^inner$}||", "");
    let _ = writeln!(out, "{}", rule);
    out
}
