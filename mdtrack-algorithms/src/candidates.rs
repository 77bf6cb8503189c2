//! Candidate enumeration: window indexing and the six-slot product.

use std::collections::HashMap;

use mdtrack_core::{HitStore, SignConvention};

/// Canonical tube order within a candidate. The slots are A-bottom,
/// A-middle, A-top, B-bottom, B-middle, B-top; sign patterns and
/// residuals use the same order.
pub const SLOT_A_TOP: usize = 2;

/// Iteration priority of the slots (outermost first): both top slots
/// advance slowest so ties on equal chi2/ndf resolve the same way as the
/// production chain's loop nesting.
const SLOT_NESTING: [usize; 6] = [2, 5, 0, 1, 3, 4];

/// Hits of one time window indexed by (module, channel).
///
/// Values are indices into the backing [`HitStore`], so the index stays
/// valid however the store is shared.
#[derive(Debug, Default)]
pub struct WindowIndex {
    slots: HashMap<(u16, u16), Vec<usize>>,
}

impl WindowIndex {
    /// Indexes every hit with trigger timestamp in `[t0, t1)`.
    #[must_use]
    pub fn build(store: &HitStore, t0: i64, t1: i64) -> Self {
        let mut slots: HashMap<(u16, u16), Vec<usize>> = HashMap::new();
        for (index, hit) in store.hits_in_window(t0, t1) {
            slots.entry((hit.module, hit.channel)).or_default().push(index);
        }
        Self { slots }
    }

    /// Returns the hit indices occupying an address, if any.
    #[must_use]
    pub fn slot(&self, module: u16, channel: u16) -> Option<&[usize]> {
        self.slots.get(&(module, channel)).map(Vec::as_slice)
    }

    /// Returns true if any channel of the module holds a hit.
    #[must_use]
    pub fn has_module(&self, module: u16) -> bool {
        self.slots.keys().any(|&(m, _)| m == module)
    }

    /// Returns true if the window holds no hits at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// The three slot channels implied by a convention and a base channel:
/// bottom, middle, top. Both modules of a pair use the same channels.
#[must_use]
pub fn slot_channels(convention: &SignConvention, base: u16) -> [u16; 3] {
    [
        base + convention.layer_offsets[0],
        base + convention.layer_offsets[1],
        base + convention.layer_offsets[2],
    ]
}

/// Lazy Cartesian product over the six occupied slots.
///
/// Yields hit-index six-tuples in canonical tube order. Advancement
/// follows [`SLOT_NESTING`], so the sequence order is deterministic and
/// matches the production enumeration.
pub struct CandidateIter<'a> {
    slots: [&'a [usize]; 6],
    cursor: [usize; 6],
    exhausted: bool,
}

impl<'a> CandidateIter<'a> {
    /// Creates the product iterator; an empty slot yields no candidates.
    #[must_use]
    pub fn new(slots: [&'a [usize]; 6]) -> Self {
        let exhausted = slots.iter().any(|s| s.is_empty());
        Self { slots, cursor: [0; 6], exhausted }
    }
}

impl Iterator for CandidateIter<'_> {
    type Item = [usize; 6];

    fn next(&mut self) -> Option<[usize; 6]> {
        if self.exhausted {
            return None;
        }
        let mut item = [0_usize; 6];
        for (slot, out) in item.iter_mut().enumerate() {
            *out = self.slots[slot][self.cursor[slot]];
        }
        // Odometer step, innermost slot first.
        self.exhausted = true;
        for &slot in SLOT_NESTING.iter().rev() {
            self.cursor[slot] += 1;
            if self.cursor[slot] < self.slots[slot].len() {
                self.exhausted = false;
                break;
            }
            self.cursor[slot] = 0;
        }
        Some(item)
    }
}
