//! Duration selector for the countdown picker.
//!
//! Holds the fixed list of preset durations and the index the picker has
//! settled on. Selection is clamped, never rejected.

use crate::engine::{TimerError, MAX_DURATION_SECONDS};

/// Default presets in seconds: 1 minute, then 5 to 60 minutes in steps of 5.
pub fn default_presets() -> Vec<u32> {
    (0..13u32)
        .map(|i| if i == 0 { 1 } else { i * 5 })
        .map(|minutes| minutes * 60)
        .collect()
}

// ============================================================================
// DurationSet
// ============================================================================

/// Immutable, non-empty ordered list of positive durations in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationSet {
    durations: Vec<u32>,
}

impl DurationSet {
    /// Builds a duration set.
    ///
    /// # Errors
    ///
    /// Returns an error if `durations` is empty, or contains a zero or an
    /// entry longer than [`MAX_DURATION_SECONDS`].
    pub fn new(durations: Vec<u32>) -> Result<Self, TimerError> {
        if durations.is_empty() {
            return Err(TimerError::EmptyDurationSet);
        }
        if let Some(index) = durations.iter().position(|&d| d == 0) {
            return Err(TimerError::ZeroDuration { index });
        }
        if let Some(index) = durations.iter().position(|&d| d > MAX_DURATION_SECONDS) {
            return Err(TimerError::PresetTooLong {
                index,
                seconds: durations[index],
                max: MAX_DURATION_SECONDS,
            });
        }
        Ok(Self { durations })
    }

    /// Number of presets. Always at least one.
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Duration at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<u32> {
        self.durations.get(index).copied()
    }

    /// Iterates over the presets in order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.durations.iter().copied()
    }

    /// Position of the first preset equal to `seconds`.
    pub fn position(&self, seconds: u32) -> Option<usize> {
        self.durations.iter().position(|&d| d == seconds)
    }

    fn last_index(&self) -> usize {
        self.durations.len() - 1
    }
}

impl Default for DurationSet {
    fn default() -> Self {
        Self {
            durations: default_presets(),
        }
    }
}

// ============================================================================
// DurationSelector
// ============================================================================

/// Tracks which preset the picker has settled on.
#[derive(Debug, Clone)]
pub struct DurationSelector {
    durations: DurationSet,
    index: usize,
}

impl DurationSelector {
    /// Creates a selector positioned at the first preset.
    pub fn new(durations: DurationSet) -> Self {
        Self {
            durations,
            index: 0,
        }
    }

    /// Creates a selector positioned at `index` (clamped).
    pub fn with_index(durations: DurationSet, index: usize) -> Self {
        let mut selector = Self::new(durations);
        let _ = selector.select(index);
        selector
    }

    /// Selects `index`, clamping it to the last preset.
    ///
    /// Returns true if the selection changed.
    pub fn select(&mut self, index: usize) -> bool {
        let clamped = index.min(self.durations.last_index());
        if clamped != index {
            tracing::debug!(index, clamped, "selection clamped");
        }
        let changed = clamped != self.index;
        self.index = clamped;
        changed
    }

    /// Moves the selection by `delta` positions, stopping at either end.
    ///
    /// Returns true if the selection changed.
    pub fn step(&mut self, delta: isize) -> bool {
        let target = self.index.saturating_add_signed(delta);
        self.select(target)
    }

    /// Selects the preset under a scroll `offset` that has come to rest.
    ///
    /// The index is `round(offset / item_size)`. Negative or non-finite
    /// offsets settle on the first preset; a non-positive or non-finite
    /// `item_size` leaves the selection unchanged.
    ///
    /// Returns true if the selection changed.
    pub fn settle(&mut self, offset: f64, item_size: f64) -> bool {
        if !item_size.is_finite() || item_size <= 0.0 {
            tracing::debug!(item_size, "settle ignored: invalid item size");
            return false;
        }
        let position = offset / item_size;
        let index = if position.is_finite() && position > 0.0 {
            // Saturating float-to-int cast; select clamps the rest.
            position.round() as usize
        } else {
            0
        };
        self.select(index)
    }

    /// Currently selected index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Duration of the selected preset in seconds.
    pub fn current_duration(&self) -> u32 {
        self.durations.durations[self.index]
    }

    /// The presets this selector picks from.
    pub fn durations(&self) -> &DurationSet {
        &self.durations
    }
}

impl Default for DurationSelector {
    fn default() -> Self {
        Self::new(DurationSet::default())
    }
}
