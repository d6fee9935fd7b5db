//! One-tick delay register.
//!
//! Every value that crosses from one stage to another goes through a
//! [`Delay`], so no stage ever sees another stage's output from the tick
//! that is still being computed.

/// A depth-1 register: the value pushed on tick N is read on tick N+1.
#[derive(Debug, Clone, Default)]
pub struct Delay<T> {
    q: T,
}

impl<T: Copy + Default> Delay<T> {
    /// Create a register holding `T::default()`.
    pub fn new() -> Self {
        Self { q: T::default() }
    }

    /// The value pushed on the previous tick.
    #[inline]
    pub fn get(&self) -> T {
        self.q
    }

    /// Latch the value for the next tick, returning the one it replaces.
    #[inline]
    pub fn push(&mut self, d: T) -> T {
        std::mem::replace(&mut self.q, d)
    }

    /// Clear back to `T::default()`.
    #[inline]
    pub fn reset(&mut self) {
        self.q = T::default();
    }
}
