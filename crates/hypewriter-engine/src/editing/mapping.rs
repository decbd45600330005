//! Position maps produced by transaction steps.
//!
//! Every step replaces at most one contiguous range of the document. The
//! map records that range so positions taken before the step (selection
//! anchors, positions held by a command) can be carried across it.

use std::ops::Range;

/// Which side a position sticks to when content is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Replaced {
    start: usize,
    old_size: usize,
    new_size: usize,
}

/// The effect of one step: `old_size` positions at `start` became `new_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepMap {
    replaced: Option<Replaced>,
}

impl StepMap {
    pub fn new(start: usize, old_size: usize, new_size: usize) -> Self {
        if old_size == 0 && new_size == 0 {
            return Self::empty();
        }
        Self {
            replaced: Some(Replaced {
                start,
                old_size,
                new_size,
            }),
        }
    }

    /// A step that did not move any position.
    pub fn empty() -> Self {
        Self { replaced: None }
    }

    pub fn is_empty(&self) -> bool {
        self.replaced.is_none()
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        let Some(Replaced {
            start,
            old_size,
            new_size,
        }) = self.replaced
        else {
            return pos;
        };

        if pos < start {
            return pos;
        }
        let end = start + old_size;
        if pos > end {
            return pos - old_size + new_size;
        }

        let side = if old_size == 0 {
            assoc
        } else if pos == start {
            Assoc::Left
        } else if pos == end {
            Assoc::Right
        } else {
            assoc
        };
        match side {
            Assoc::Left => start,
            Assoc::Right => start + new_size,
        }
    }

    /// Range of the replacement in the post-step document.
    fn inserted(&self) -> Option<Range<usize>> {
        self.replaced
            .map(|r| r.start..r.start + r.new_size)
    }
}

/// Ordered list of step maps of one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.maps
            .iter()
            .fold(pos, |pos, step| step.map(pos, assoc))
    }

    /// Ranges of the final document touched by the steps, in step order.
    ///
    /// Pure deletions show up as empty ranges at the deletion point.
    pub fn changed_ranges(&self) -> Vec<Range<usize>> {
        self.maps
            .iter()
            .enumerate()
            .filter_map(|(i, step)| {
                let range = step.inserted()?;
                let later = &self.maps[i + 1..];
                let start = later
                    .iter()
                    .fold(range.start, |pos, m| m.map(pos, Assoc::Left));
                let end = later
                    .iter()
                    .fold(range.end, |pos, m| m.map(pos, Assoc::Right));
                Some(start..end.max(start))
            })
            .collect()
    }
}
