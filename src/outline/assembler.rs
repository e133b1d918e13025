//! Outline assembly: deduplication and level repair.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{HeadingCandidate, HeadingLevel, OutlineEntry};

/// Open heading levels while walking the candidates in reading order.
///
/// Each entry pairs the raw (classifier) level with the level that was
/// emitted for it. Emitted levels on the stack never decrease from bottom to
/// top and grow by at most one per entry.
#[derive(Debug, Clone)]
pub struct LevelStack {
    open: Vec<(u8, u8)>,
    max_depth: u8,
}

impl LevelStack {
    pub fn new(max_depth: u8) -> Self {
        Self {
            open: Vec::with_capacity(max_depth as usize),
            max_depth: max_depth.max(1),
        }
    }

    /// Place a heading with the given raw level and return its emitted level.
    pub fn place(&mut self, raw: u8) -> u8 {
        while matches!(self.open.last(), Some(&(open_raw, _)) if open_raw > raw) {
            self.open.pop();
        }

        match self.open.last() {
            None => {
                self.open.push((raw, 1));
                1
            }
            Some(&(open_raw, emitted)) if open_raw == raw => emitted,
            Some(&(_, emitted)) => {
                let level = (emitted + 1).min(self.max_depth);
                self.open.push((raw, level));
                level
            }
        }
    }

    /// Depth of the innermost open level, 0 when nothing is open.
    pub fn depth(&self) -> u8 {
        self.open.last().map(|&(_, emitted)| emitted).unwrap_or(0)
    }
}

/// Turn classifier output into a well-nested heading sequence.
///
/// Candidates must arrive in strictly increasing `order_index`; anything else
/// is a [`Error::ClassificationAnomaly`]. Repeated headings (same case-folded
/// text on the same page) are reduced to the most confident occurrence.
/// Returned candidates carry their final levels and stay in reading order.
pub fn assemble(candidates: Vec<HeadingCandidate>, max_depth: u8) -> Result<Vec<HeadingCandidate>> {
    if let Some(pair) = candidates
        .windows(2)
        .find(|pair| pair[1].order_index <= pair[0].order_index)
    {
        return Err(Error::ClassificationAnomaly(format!(
            "heading candidates out of order: {} followed by {}",
            pair[0].order_index, pair[1].order_index
        )));
    }

    let mut stack = LevelStack::new(max_depth);
    let mut placed = dedupe(candidates);
    for candidate in &mut placed {
        let level = stack.place(candidate.level.depth());
        candidate.level = HeadingLevel::saturating(level);
    }

    Ok(placed)
}

/// Keep one candidate per (case-folded text, page): the highest confidence,
/// the earliest on ties.
fn dedupe(candidates: Vec<HeadingCandidate>) -> Vec<HeadingCandidate> {
    let mut best: HashMap<(String, u32), usize> = HashMap::new();
    for (i, candidate) in candidates.iter().enumerate() {
        let key = (candidate.text.to_lowercase(), candidate.page);
        match best.get(&key) {
            Some(&kept) if candidates[kept].confidence >= candidate.confidence => {}
            _ => {
                best.insert(key, i);
            }
        }
    }

    let dropped = candidates.len() - best.len();
    if dropped > 0 {
        log::debug!("Dropped {} duplicate heading(s)", dropped);
    }

    let mut keep = vec![false; candidates.len()];
    for &i in best.values() {
        keep[i] = true;
    }
    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(candidate, kept)| kept.then_some(candidate))
        .collect()
}

/// Verify that an emitted outline starts at level 1, never exceeds
/// `max_depth` and never deepens by more than one level at a time.
pub fn check_nesting(outline: &[OutlineEntry], max_depth: u8) -> Result<()> {
    let mut previous = 0u8;
    for (i, entry) in outline.iter().enumerate() {
        let depth = entry.level.depth();
        if depth > previous + 1 {
            return Err(Error::ClassificationAnomaly(format!(
                "outline entry {} ({:?}) jumps from level {} to {}",
                i, entry.text, previous, depth
            )));
        }
        if depth > max_depth {
            return Err(Error::ClassificationAnomaly(format!(
                "outline entry {} exceeds the maximum depth {}",
                i, max_depth
            )));
        }
        previous = depth;
    }
    Ok(())
}
