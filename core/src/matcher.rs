use alloc::vec::Vec;
use core::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use crate::*;

/// Shortest run that counts as a match.
pub const MIN_RUN: u8 = 3;

/// Maximal line of identical gems, at least [`MIN_RUN`] long.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub gem: GemType,
    pub axis: Axis,
    pub start: Coord2,
    pub length: u8,
}

impl Run {
    pub fn cells(&self) -> impl Iterator<Item = Coord2> + use<> {
        let Run {
            axis,
            start,
            length,
            ..
        } = *self;
        (0..length).map(move |offset| axis.step(start, offset))
    }
}

/// One matched cell. A run of length N produces N records, all carrying N.
///
/// A cell at the crossing of a horizontal and a vertical run appears twice.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub coords: Coord2,
    pub run_length: u8,
    pub axis: Axis,
}

/// Visits every run, rows first then columns, until `visit` breaks.
pub fn for_each_run<F>(board: &Board, mut visit: F) -> ControlFlow<()>
where
    F: FnMut(Run) -> ControlFlow<()>,
{
    let (rows, cols) = board.size();
    for row in 0..rows {
        scan_line(board, (row, 0), Axis::Horizontal, cols, &mut visit)?;
    }
    for col in 0..cols {
        scan_line(board, (0, col), Axis::Vertical, rows, &mut visit)?;
    }
    ControlFlow::Continue(())
}

fn scan_line<F>(
    board: &Board,
    origin: Coord2,
    axis: Axis,
    len: Coord,
    visit: &mut F,
) -> ControlFlow<()>
where
    F: FnMut(Run) -> ControlFlow<()>,
{
    let mut start: Coord = 0;
    let mut current: Option<GemType> = None;

    for i in 0..=len {
        let gem = if i < len {
            board.gem_at(axis.step(origin, i))
        } else {
            None
        };
        if gem.is_some() && gem == current {
            continue;
        }

        if let Some(run_gem) = current {
            let length = i - start;
            if length >= MIN_RUN {
                visit(Run {
                    gem: run_gem,
                    axis,
                    start: axis.step(origin, start),
                    length,
                })?;
            }
        }
        start = i;
        current = gem;
    }
    ControlFlow::Continue(())
}

pub fn find_runs(board: &Board) -> Vec<Run> {
    let mut runs = Vec::new();
    let _ = for_each_run(board, |run| {
        runs.push(run);
        ControlFlow::Continue(())
    });
    runs
}

/// Whether the board has at least one run, stopping at the first one found.
pub fn has_match(board: &Board) -> bool {
    for_each_run(board, |_| ControlFlow::Break(())).is_break()
}

/// Whether the gem at `coords` is part of a run along its row or column.
pub fn has_match_at(board: &Board, (row, col): Coord2) -> bool {
    let Some(gem) = board.gem_at((row, col)) else {
        return false;
    };
    let same = |coords: Coord2| board.gem_at(coords) == Some(gem);
    let horizontal = 1
        + (0..col).rev().take_while(|&c| same((row, c))).count()
        + (col + 1..board.cols()).take_while(|&c| same((row, c))).count();
    let vertical = 1
        + (0..row).rev().take_while(|&r| same((r, col))).count()
        + (row + 1..board.rows()).take_while(|&r| same((r, col))).count();
    horizontal.max(vertical) >= usize::from(MIN_RUN)
}

/// Dry run: every matched cell, without touching the board.
pub fn find_matches(board: &Board) -> Vec<Match> {
    expand_runs(&find_runs(board))
}

pub fn expand_runs(runs: &[Run]) -> Vec<Match> {
    runs.iter()
        .flat_map(|run| {
            run.cells().map(move |coords| Match {
                coords,
                run_length: run.length,
                axis: run.axis,
            })
        })
        .collect()
}

/// Scoring mode: reports each run to `sink` once and applies the recolor
/// rule of its gem kind, then returns the matched cells.
pub fn score_matches<S>(board: &mut Board, sink: &mut S, timings: &Timings) -> Vec<Match>
where
    S: ScoreSink + ?Sized,
{
    let runs = find_runs(board);
    for run in &runs {
        log::debug!(
            "Scored {} run of {} at {:?} ({:?})",
            run.gem,
            run.length,
            run.start,
            run.axis
        );
        sink.on_match(run.gem, run.length);
        if let Some((from, to)) = run.gem.recolor_rule() {
            let queued = apply_recolor_rule(board, from, to, timings.fade_out);
            log::debug!("Queued {} {} gems to become {}", queued, from, to);
        }
    }
    expand_runs(&runs)
}

/// Fades out every `from` gem on the board and turns it into `to` afterwards.
pub fn apply_recolor_rule(board: &mut Board, from: GemType, to: GemType, fade_secs: f32) -> usize {
    let mut queued = 0;
    for cell in board.cells_mut() {
        if cell.gem() == Some(from) && cell.pending_recolor().is_none() {
            cell.queue_recolor(to, fade_secs);
            queued += 1;
        }
    }
    queued
}
