//! Consumable character resources (stamina and the like).

use std::cell::Cell;

/// A bounded pool with a current and maximum amount.
///
/// Shared via `Rc` so conditions can read it while gameplay code spends it.
#[derive(Debug)]
pub struct Resource {
    max: Cell<f32>,
    current: Cell<f32>,
}

impl Resource {
    /// Create a full resource.
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            max: Cell::new(max),
            current: Cell::new(max),
        }
    }

    pub fn max(&self) -> f32 {
        self.max.get()
    }

    pub fn current(&self) -> f32 {
        self.current.get()
    }

    /// Fill ratio in `0.0..=1.0` (zero when max is zero).
    pub fn normalized(&self) -> f32 {
        let max = self.max();
        if max > 0.0 {
            self.current() / max
        } else {
            0.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current() <= 0.0
    }

    pub fn is_full(&self) -> bool {
        self.current() >= self.max()
    }

    /// Change the maximum, clamping or refilling the current amount.
    pub fn set_max(&self, max: f32, fill_to_max: bool) {
        let max = max.max(0.0);
        self.max.set(max);
        if fill_to_max || self.current() > max {
            self.current.set(max);
        }
    }

    pub fn fill(&self) {
        self.current.set(self.max());
    }

    pub fn empty(&self) {
        self.current.set(0.0);
    }

    pub fn can_consume(&self, amount: f32) -> bool {
        self.current() >= amount
    }

    /// Spend `amount` only if it is fully available.
    pub fn try_consume(&self, amount: f32) -> bool {
        if !self.can_consume(amount) {
            return false;
        }
        self.current.set(self.current() - amount);
        true
    }

    /// Spend up to `amount`, stopping at zero.
    pub fn consume(&self, amount: f32) {
        self.current.set((self.current() - amount).max(0.0));
    }

    /// Restore up to `amount`, stopping at max.
    pub fn restore(&self, amount: f32) {
        self.current.set((self.current() + amount).min(self.max()));
    }

    pub fn set(&self, value: f32) {
        self.current.set(value.clamp(0.0, self.max()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_and_restore() {
        let stamina = Resource::new(100.0);
        assert!(stamina.is_full());

        assert!(stamina.try_consume(30.0));
        assert_eq!(stamina.current(), 70.0);

        assert!(!stamina.try_consume(80.0));
        assert_eq!(stamina.current(), 70.0);

        stamina.consume(200.0);
        assert!(stamina.is_empty());

        stamina.restore(500.0);
        assert!(stamina.is_full());
    }

    #[test]
    fn test_set_max_clamps_current() {
        let stamina = Resource::new(100.0);
        stamina.set_max(50.0, false);
        assert_eq!(stamina.current(), 50.0);
        assert!((stamina.normalized() - 1.0).abs() < 1e-6);

        stamina.set_max(80.0, false);
        assert_eq!(stamina.current(), 50.0);
        stamina.set_max(80.0, true);
        assert_eq!(stamina.current(), 80.0);
    }
}
