//! Priority-ordered ability execution.

use glam::{Quat, Vec3};
use serde::Serialize;

use super::MovementAbility;
use crate::motor::KinematicMotor;

/// Which abilities claimed the last step exclusively, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub velocity_claimed_by: Option<&'static str>,
    pub rotation_claimed_by: Option<&'static str>,
}

struct Entry {
    ability: Box<dyn MovementAbility>,
    priority: i32,
    order: usize,
    enabled: bool,
}

/// Abilities sorted by priority (descending), ties by registration order.
///
/// The order is recomputed only when membership changes.
#[derive(Default)]
pub struct AbilityStack {
    entries: Vec<Entry>,
    next_order: usize,
    report: StepReport,
}

impl AbilityStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an ability, enabled.
    pub fn add(&mut self, ability: Box<dyn MovementAbility>) {
        log::debug!(
            "ability '{}' added (priority {})",
            ability.name(),
            ability.priority()
        );
        self.entries.push(Entry {
            priority: ability.priority(),
            order: self.next_order,
            enabled: true,
            ability,
        });
        self.next_order += 1;
        self.sort();
    }

    /// Unregister the first ability with `name`. An enabled ability gets
    /// its `on_disabled` hook first.
    pub fn remove(
        &mut self,
        name: &str,
        motor: &mut dyn KinematicMotor,
    ) -> Option<Box<dyn MovementAbility>> {
        let index = self.entries.iter().position(|e| e.ability.name() == name)?;
        let mut entry = self.entries.remove(index);
        if entry.enabled {
            entry.ability.on_disabled(motor);
        }
        log::debug!("ability '{}' removed", name);
        Some(entry.ability)
    }

    /// Enable or disable by name. Returns false if no such ability.
    ///
    /// Disabling an enabled ability runs its `on_disabled` hook.
    pub fn set_enabled(
        &mut self,
        name: &str,
        enabled: bool,
        motor: &mut dyn KinematicMotor,
    ) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.ability.name() == name) else {
            return false;
        };
        if entry.enabled && !enabled {
            entry.ability.on_disabled(motor);
            log::debug!("ability '{}' disabled", name);
        }
        entry.enabled = enabled;
        true
    }

    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|e| e.ability.name() == name)
            .map(|e| e.enabled)
    }

    /// Find an ability by concrete type.
    pub fn find<T: MovementAbility>(&self) -> Option<&T> {
        self.entries
            .iter()
            .find_map(|e| e.ability.as_any().downcast_ref::<T>())
    }

    /// Names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.ability.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Claims recorded during the last step.
    pub fn report(&self) -> StepReport {
        self.report
    }

    fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| b.priority.cmp(&a.priority).then(a.order.cmp(&b.order)));
    }

    // ========================================================================
    // Motor passes
    // ========================================================================

    pub fn before_update(&mut self, motor: &mut dyn KinematicMotor, dt: f32) {
        self.report = StepReport::default();
        for entry in self.entries.iter_mut().filter(|e| e.enabled) {
            entry.ability.before_update(motor, dt);
        }
    }

    /// Run rotation updates until one claims. Returns the claiming ability.
    pub fn update_rotation(
        &mut self,
        motor: &mut dyn KinematicMotor,
        rotation: &mut Quat,
        dt: f32,
    ) -> Option<&'static str> {
        for entry in self.entries.iter_mut().filter(|e| e.enabled) {
            if entry.ability.update_rotation(motor, rotation, dt) {
                self.report.rotation_claimed_by = Some(entry.ability.name());
                return self.report.rotation_claimed_by;
            }
        }
        None
    }

    /// Run velocity updates until one claims. Returns the claiming ability.
    pub fn update_velocity(
        &mut self,
        motor: &mut dyn KinematicMotor,
        velocity: &mut Vec3,
        dt: f32,
    ) -> Option<&'static str> {
        for entry in self.entries.iter_mut().filter(|e| e.enabled) {
            if entry.ability.update_velocity(motor, velocity, dt) {
                self.report.velocity_claimed_by = Some(entry.ability.name());
                return self.report.velocity_claimed_by;
            }
        }
        None
    }

    /// Run every enabled ability's post-step hook, regardless of claims.
    pub fn after_update(&mut self, motor: &mut dyn KinematicMotor, dt: f32) {
        for entry in self.entries.iter_mut().filter(|e| e.enabled) {
            entry.ability.after_update(motor, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::mock::MockMotor;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        priority: i32,
        claims: bool,
        add: Vec3,
        log: Log,
    }

    impl Recorder {
        fn new(name: &'static str, priority: i32, claims: bool, log: &Log) -> Box<Self> {
            Box::new(Self {
                name,
                priority,
                claims,
                add: Vec3::ZERO,
                log: Rc::clone(log),
            })
        }
    }

    impl MovementAbility for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn update_velocity(
            &mut self,
            _motor: &mut dyn KinematicMotor,
            velocity: &mut Vec3,
            _dt: f32,
        ) -> bool {
            self.log.borrow_mut().push(format!("vel:{}", self.name));
            *velocity += self.add;
            self.claims
        }

        fn update_rotation(
            &mut self,
            _motor: &mut dyn KinematicMotor,
            _rotation: &mut Quat,
            _dt: f32,
        ) -> bool {
            self.log.borrow_mut().push(format!("rot:{}", self.name));
            self.claims
        }

        fn after_update(&mut self, _motor: &mut dyn KinematicMotor, _dt: f32) {
            self.log.borrow_mut().push(format!("after:{}", self.name));
        }

        fn on_disabled(&mut self, _motor: &mut dyn KinematicMotor) {
            self.log.borrow_mut().push(format!("off:{}", self.name));
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn entries(log: &Log, prefix: &str) -> Vec<String> {
        log.borrow()
            .iter()
            .filter(|l| l.starts_with(prefix))
            .cloned()
            .collect()
    }

    #[test]
    fn test_priority_order_with_stable_ties() {
        let log = Log::default();
        let mut stack = AbilityStack::new();
        stack.add(Recorder::new("low", 0, false, &log));
        stack.add(Recorder::new("tie_a", 10, false, &log));
        stack.add(Recorder::new("high", 50, false, &log));
        stack.add(Recorder::new("tie_b", 10, false, &log));

        assert_eq!(stack.names(), vec!["high", "tie_a", "tie_b", "low"]);
    }

    #[test]
    fn test_exclusive_claim_stops_lower_priorities() {
        let log = Log::default();
        let mut stack = AbilityStack::new();
        let mut high = Recorder::new("high", 50, true, &log);
        high.add = Vec3::Y;
        stack.add(high);
        stack.add(Recorder::new("low", 0, false, &log));

        let mut motor = MockMotor::default();
        let mut velocity = Vec3::ZERO;
        stack.before_update(&mut motor, 0.1);
        let claimed = stack.update_velocity(&mut motor, &mut velocity, 0.1);
        stack.after_update(&mut motor, 0.1);

        assert_eq!(claimed, Some("high"));
        assert_eq!(velocity, Vec3::Y);
        assert_eq!(entries(&log, "vel:"), vec!["vel:high"]);
        // after_update runs for everyone regardless of the claim
        assert_eq!(entries(&log, "after:"), vec!["after:high", "after:low"]);
        assert_eq!(stack.report().velocity_claimed_by, Some("high"));
    }

    #[test]
    fn test_non_claiming_edits_accumulate() {
        let log = Log::default();
        let mut stack = AbilityStack::new();
        let mut a = Recorder::new("a", 10, false, &log);
        a.add = Vec3::X;
        let mut b = Recorder::new("b", 5, false, &log);
        b.add = Vec3::Y;
        stack.add(a);
        stack.add(b);

        let mut motor = MockMotor::default();
        let mut velocity = Vec3::ZERO;
        assert_eq!(stack.update_velocity(&mut motor, &mut velocity, 0.1), None);
        assert_eq!(velocity, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_disabled_ability_skips_every_pass() {
        let log = Log::default();
        let mut stack = AbilityStack::new();
        stack.add(Recorder::new("a", 10, true, &log));
        stack.add(Recorder::new("b", 5, false, &log));
        let mut motor = MockMotor::default();
        assert!(stack.set_enabled("a", false, &mut motor));
        assert!(!stack.set_enabled("missing", false, &mut motor));
        log.borrow_mut().clear();

        let mut velocity = Vec3::ZERO;
        let mut rotation = Quat::IDENTITY;
        stack.before_update(&mut motor, 0.1);
        stack.update_rotation(&mut motor, &mut rotation, 0.1);
        stack.update_velocity(&mut motor, &mut velocity, 0.1);
        stack.after_update(&mut motor, 0.1);

        assert!(log.borrow().iter().all(|l| !l.ends_with(":a")));
        assert_eq!(stack.is_enabled("a"), Some(false));
    }

    #[test]
    fn test_remove_and_find() {
        let log = Log::default();
        let mut stack = AbilityStack::new();
        stack.add(Recorder::new("a", 10, false, &log));
        stack.add(Recorder::new("b", 20, false, &log));

        let mut motor = MockMotor::default();
        assert_eq!(stack.find::<Recorder>().map(|r| r.name), Some("b"));
        assert!(stack.remove("b", &mut motor).is_some());
        assert!(stack.remove("b", &mut motor).is_none());
        assert_eq!(stack.names(), vec!["a"]);
    }

    #[test]
    fn test_rotation_claim_stops_lower_priorities() {
        let log = Log::default();
        let mut stack = AbilityStack::new();
        stack.add(Recorder::new("low", 0, false, &log));
        stack.add(Recorder::new("high", 50, true, &log));

        let mut motor = MockMotor::default();
        let mut rotation = Quat::IDENTITY;
        stack.before_update(&mut motor, 0.1);
        let claimed = stack.update_rotation(&mut motor, &mut rotation, 0.1);

        assert_eq!(claimed, Some("high"));
        assert_eq!(entries(&log, "rot:"), vec!["rot:high"]);
        assert_eq!(stack.report().rotation_claimed_by, Some("high"));
        assert_eq!(stack.report().velocity_claimed_by, None);
    }

    #[test]
    fn test_disable_and_remove_notify_the_ability_once() {
        let log = Log::default();
        let mut stack = AbilityStack::new();
        stack.add(Recorder::new("a", 10, false, &log));
        stack.add(Recorder::new("b", 5, false, &log));
        let mut motor = MockMotor::default();

        assert!(stack.set_enabled("a", false, &mut motor));
        assert!(stack.set_enabled("a", false, &mut motor));
        assert_eq!(entries(&log, "off:"), vec!["off:a"]);

        // Removing an already disabled ability does not notify it again
        assert!(stack.remove("a", &mut motor).is_some());
        assert!(stack.remove("b", &mut motor).is_some());
        assert_eq!(entries(&log, "off:"), vec!["off:a", "off:b"]);

        // Re-enabling is silent
        stack.add(Recorder::new("c", 0, false, &log));
        assert!(stack.set_enabled("c", true, &mut motor));
        assert_eq!(entries(&log, "off:").len(), 2);
    }
}
