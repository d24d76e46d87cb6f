//! Card navigation over the sections of one agent message.

use serde::Serialize;

/// Position within a deck of `total` cards. `index` is zero-based and always
/// in range; moving past either end is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeckCursor {
    pub index: usize,
    pub total: usize,
}

impl DeckCursor {
    pub fn new(total: usize) -> Self {
        Self { index: 0, total }
    }

    /// Advance one card. Returns false at the last card.
    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.total {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Go back one card. Returns false at the first card.
    pub fn previous(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.total
    }

    /// "2 of 5"
    pub fn position_label(&self) -> String {
        format!("{} of {}", self.index + 1, self.total)
    }

    /// Fraction of the deck seen so far, in `0.0..=1.0`
    pub fn progress(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.index + 1) as f32 / self.total as f32
    }
}
