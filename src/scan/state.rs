// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! `ScanState` and `Anchor`, the run-length tally used by all three
//! sweep passes (horizontal/vertical/diagonal). Ported faithfully from
//! the reference `ScanState`/`Anchor` state machine: states 0,2,4 are
//! non-ink phases, 1,3,5 are ink phases, and state 6 is the ephemeral
//! "evaluate, then pop back to state 4" transition that lets adjacent
//! markers share a boundary run.

/// A candidate finder-marker detection: a rectangular extent over which
/// the 1:1:3:1:1 pattern was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub x: i64,
    pub y: i64,
    pub xmax: i64,
    pub ymax: i64,
}

impl Anchor {
    pub fn new(x: i64, y: i64, xmax: i64, ymax: i64) -> Self {
        Anchor { x, y, xmax, ymax }
    }

    pub fn point(x: i64, y: i64) -> Self {
        Anchor {
            x,
            y,
            xmax: x,
            ymax: y,
        }
    }

    pub fn merge(&mut self, rhs: &Anchor) {
        self.x = self.x.min(rhs.x);
        self.xmax = self.xmax.max(rhs.xmax);
        self.y = self.y.min(rhs.y);
        self.ymax = self.ymax.max(rhs.ymax);
    }

    pub fn xavg(&self) -> i64 {
        (self.x + self.xmax) / 2
    }

    pub fn yavg(&self) -> i64 {
        (self.y + self.ymax) / 2
    }

    pub fn xrange(&self) -> i64 {
        (self.x - self.xmax).abs() / 2
    }

    pub fn yrange(&self) -> i64 {
        (self.y - self.ymax).abs() / 2
    }
}

/// Run-length tally for the five-run 1:1:3:1:1 pattern.
#[derive(Debug, Clone)]
pub struct ScanState {
    state: u8,
    tally: Vec<u32>,
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanState {
    pub fn new() -> Self {
        ScanState {
            state: 0,
            tally: vec![0],
        }
    }

    /// Drop to state 4, discarding the first two runs so the next pixel
    /// can start building the overlap with an adjacent marker.
    fn pop_state(&mut self) {
        self.state -= 2;
        self.tally.drain(0..2);
    }

    fn evaluate_state(&self) -> Option<u32> {
        if self.state != 6 {
            return None;
        }
        let ones = &self.tally[1..6];
        if ones.iter().any(|&s| s == 0) {
            return None;
        }
        let center = ones[2] as f64;
        for (idx, &s) in ones.iter().enumerate() {
            if idx == 2 {
                continue;
            }
            let ratio = center / s as f64;
            if !(2.5..=3.5).contains(&ratio) {
                return None;
            }
        }
        let outer_sum: u32 = ones.iter().enumerate().filter(|(i, _)| *i != 2).map(|(_, v)| v).sum();
        Some(outer_sum + ones[2])
    }

    /// Feed one pixel's ink/non-ink classification (dark-mode polarity
    /// already applied by the caller). Returns the anchor's run-width when
    /// a complete, ratio-valid 1:1:3:1:1 pattern is confirmed.
    pub fn process(&mut self, is_ink: bool) -> Option<u32> {
        let is_transition = (matches!(self.state, 0 | 2 | 4) && is_ink)
            || (matches!(self.state, 1 | 3 | 5) && !is_ink);

        if is_transition {
            self.state += 1;
            self.tally.push(1);
            if self.state == 6 {
                let res = self.evaluate_state();
                self.pop_state();
                return res;
            }
            return None;
        }

        if matches!(self.state, 1 | 3 | 5) && is_ink {
            *self.tally.last_mut().unwrap() += 1;
        }
        if matches!(self.state, 2 | 4) && !is_ink {
            *self.tally.last_mut().unwrap() += 1;
        }
        None
    }
}
