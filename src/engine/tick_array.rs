// Tick-array sequence: the swap walk's view over fetched tick pages.
// ------------------------------------------------------------------
// A sequence owns up to MAX_SWAP_TICK_ARRAYS page snapshots ordered in the
// travel direction of the swap (descending starts for a_to_b, ascending for
// b_to_a) and answers "where is the next initialized tick". Running off the
// end of the supplied pages is not an error; the simulator treats `None` as
// the signal to take one last bounded step and stop.

use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::models::{TickArrayData, TickData};

pub struct TickArraySequence {
    tick_arrays: Vec<TickArrayData>,
    tick_spacing: u16,
    a_to_b: bool,
    /// Ticks covered by one page, `tick_array_size * tick_spacing`.
    span: i32,
}

impl TickArraySequence {
    /// Build a sequence from fetched pages, sorting them into travel order
    /// and validating shape: 1..=max pages, every page full-size and
    /// page-aligned, starts strictly contiguous in the travel direction.
    pub fn new(
        config: &EngineConfig,
        mut tick_arrays: Vec<TickArrayData>,
        tick_spacing: u16,
        a_to_b: bool,
    ) -> Result<Self, CoreError> {
        if tick_arrays.is_empty() || tick_arrays.len() > config.max_swap_tick_arrays {
            return Err(CoreError::InvalidTickArraySequence);
        }
        if tick_spacing == 0 {
            return Err(CoreError::InvalidTickArraySequence);
        }
        let span = config.ticks_per_array(tick_spacing);
        for array in &tick_arrays {
            if array.ticks.len() != config.tick_array_size {
                return Err(CoreError::InvalidTickArraySequence);
            }
            if array.start_tick_index % span != 0 {
                return Err(CoreError::InvalidTickArraySequence);
            }
        }

        if a_to_b {
            tick_arrays.sort_by_key(|array| core::cmp::Reverse(array.start_tick_index));
        } else {
            tick_arrays.sort_by_key(|array| array.start_tick_index);
        }
        for pair in tick_arrays.windows(2) {
            let step = pair[1].start_tick_index - pair[0].start_tick_index;
            let expected = if a_to_b { -span } else { span };
            if step != expected {
                return Err(CoreError::InvalidTickArraySequence);
            }
        }

        Ok(Self {
            tick_arrays,
            tick_spacing,
            a_to_b,
            span,
        })
    }

    #[inline]
    fn covers(&self, array: &TickArrayData, tick_index: i32) -> bool {
        tick_index >= array.start_tick_index && tick_index < array.start_tick_index + self.span
    }

    /// Whether the first page in travel order contains the pool's current
    /// tick. A swap must start inside its first supplied page.
    pub fn is_valid_tick_array_0(&self, tick_current_index: i32) -> bool {
        self.covers(&self.tick_arrays[0], tick_current_index)
    }

    /// Find the next initialized tick from `tick_current_index` in the travel
    /// direction: the greatest initialized tick `<=` current when trading
    /// a-to-b, the smallest initialized tick `>` current otherwise.
    ///
    /// `Ok(None)` means the supplied pages hold no further initialized tick;
    /// the caller finishes with a bounded step to [`last_covered_tick_index`].
    /// `TickArrayIndexOutOfBounds` fires only when the search origin lies
    /// before the first page in travel order, which indicates the caller
    /// supplied pages that do not cover its own pool snapshot.
    pub fn next_initialized_tick_index(
        &self,
        tick_current_index: i32,
    ) -> Result<Option<(i32, TickData)>, CoreError> {
        let first = &self.tick_arrays[0];
        if self.a_to_b {
            if tick_current_index >= first.start_tick_index + self.span {
                return Err(CoreError::TickArrayIndexOutOfBounds);
            }
        } else if tick_current_index < first.start_tick_index - 1 {
            return Err(CoreError::TickArrayIndexOutOfBounds);
        }

        let spacing = self.tick_spacing as i32;
        for array in &self.tick_arrays {
            let last_slot = array.ticks.len() as i32 - 1;
            if self.a_to_b {
                // greatest initialized tick <= current within this page
                if tick_current_index < array.start_tick_index {
                    continue;
                }
                let from = ((tick_current_index - array.start_tick_index) / spacing).min(last_slot);
                for slot in (0..=from).rev() {
                    let tick = &array.ticks[slot as usize];
                    if tick.initialized {
                        return Ok(Some((array.start_tick_index + slot * spacing, *tick)));
                    }
                }
            } else {
                // smallest initialized tick > current within this page
                if tick_current_index >= array.start_tick_index + self.span - spacing {
                    continue;
                }
                let offset = tick_current_index - array.start_tick_index;
                let from = if offset < 0 { 0 } else { offset / spacing + 1 };
                for slot in from..=last_slot {
                    let tick = &array.ticks[slot as usize];
                    if tick.initialized {
                        return Ok(Some((array.start_tick_index + slot * spacing, *tick)));
                    }
                }
            }
        }
        Ok(None)
    }

    /// The furthest tick slot the supplied pages cover in the travel
    /// direction. The simulator's final bounded step moves the price here
    /// when no initialized tick remains.
    pub fn last_covered_tick_index(&self) -> i32 {
        let last = &self.tick_arrays[self.tick_arrays.len() - 1];
        if self.a_to_b {
            last.start_tick_index
        } else {
            last.start_tick_index + self.span - self.tick_spacing as i32
        }
    }

    /// Start indices of every page whose coverage intersects the inclusive
    /// tick interval actually traversed, in travel order. Errors when the
    /// walk needed more than `max` pages.
    pub fn touched_arrays(
        &self,
        tick_from: i32,
        tick_to: i32,
        max: usize,
    ) -> Result<Vec<i32>, CoreError> {
        let lo = tick_from.min(tick_to);
        let hi = tick_from.max(tick_to);
        let touched: Vec<i32> = self
            .tick_arrays
            .iter()
            .filter(|array| array.start_tick_index <= hi && array.start_tick_index + self.span > lo)
            .map(|array| array.start_tick_index)
            .collect();
        if touched.len() > max {
            return Err(CoreError::TickArraySequenceInvalidIndex);
        }
        Ok(touched)
    }
}
