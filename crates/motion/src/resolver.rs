//! Intent to action resolution.
//!
//! Each tick the resolver clears the action buffer and runs its rules in
//! declared order. A rule fires when its intent kind is present and its
//! condition (if any) holds; it then maps the intent to exactly one action.
//! Rules never consume intents and never see the action buffer.

use serde::{Deserialize, Serialize};

use crate::action::{
    Action, ActionBuffer, AttackAction, CrouchAction, InteractAction, JumpAction, LookAction,
    MoveAction, SprintAction,
};
use crate::condition::{Condition, ConditionDef};
use crate::config::ConfigError;
use crate::context::CharacterContext;
use crate::intent::{Intent, IntentBuffer, IntentKind};

/// Which intent a rule listens for and which action it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Move,
    Look,
    Jump,
    Sprint,
    Crouch,
    Interact,
    Attack,
}

impl RuleKind {
    /// The intent kind this rule requires.
    pub fn intent(self) -> IntentKind {
        match self {
            RuleKind::Move => IntentKind::Move,
            RuleKind::Look => IntentKind::Look,
            RuleKind::Jump => IntentKind::Jump,
            RuleKind::Sprint => IntentKind::Sprint,
            RuleKind::Crouch => IntentKind::Crouch,
            RuleKind::Interact => IntentKind::Interact,
            RuleKind::Attack => IntentKind::Attack,
        }
    }

    /// Map an intent to this rule's action. `None` if the intent is of
    /// another kind.
    pub fn produce(self, intent: &Intent) -> Option<Action> {
        let action = match (self, intent) {
            (RuleKind::Move, Intent::Move(m)) => MoveAction {
                direction: m.direction,
            }
            .into(),
            (RuleKind::Look, Intent::Look(l)) => LookAction { delta: l.delta }.into(),
            (RuleKind::Jump, Intent::Jump(_)) => JumpAction {}.into(),
            (RuleKind::Sprint, Intent::Sprint(_)) => SprintAction {}.into(),
            (RuleKind::Crouch, Intent::Crouch(_)) => CrouchAction {}.into(),
            (RuleKind::Interact, Intent::Interact(_)) => InteractAction {}.into(),
            (RuleKind::Attack, Intent::Attack(_)) => AttackAction {}.into(),
            _ => return None,
        };
        Some(action)
    }
}

/// One gated intent-to-action mapping.
#[derive(Debug, Clone)]
pub struct ActionRule {
    pub kind: RuleKind,
    pub condition: Option<Condition>,
}

impl ActionRule {
    /// An ungated rule.
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn conditions_met(&self) -> bool {
        self.condition.as_ref().map_or(true, Condition::is_satisfied)
    }

    /// The action this rule produces for the current intents, if it fires.
    pub fn resolve(&self, intents: &IntentBuffer) -> Option<Action> {
        let intent = intents.value_at(self.kind.intent().slot())?;
        if !self.conditions_met() {
            return None;
        }
        self.kind.produce(intent)
    }
}

/// Serializable rule description.
///
/// `conditions` are combined with `All`; `null` entries are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDef {
    pub kind: RuleKind,
    #[serde(default)]
    pub conditions: Vec<Option<ConditionDef>>,
}

impl RuleDef {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            conditions: Vec::new(),
        }
    }

    pub fn when(mut self, condition: ConditionDef) -> Self {
        self.conditions.push(Some(condition));
        self
    }

    pub fn build(&self, ctx: &CharacterContext) -> ActionRule {
        let mut bound: Vec<Condition> = self
            .conditions
            .iter()
            .flatten()
            .map(|def| def.build(ctx))
            .collect();

        let condition = match bound.len() {
            0 => None,
            1 => bound.pop(),
            _ => Some(Condition::All(bound)),
        };
        ActionRule {
            kind: self.kind,
            condition,
        }
    }
}

/// Ordered set of action rules.
#[derive(Debug, Clone, Default)]
pub struct ActionResolver {
    rules: Vec<ActionRule>,
}

impl ActionResolver {
    pub fn new(rules: Vec<ActionRule>) -> Self {
        Self { rules }
    }

    /// Bind rule definitions against a character.
    pub fn from_defs(defs: &[RuleDef], ctx: &CharacterContext) -> Self {
        Self::new(defs.iter().map(|def| def.build(ctx)).collect())
    }

    /// Parse a JSON array of rule definitions and bind them.
    pub fn from_json(text: &str, ctx: &CharacterContext) -> Result<Self, ConfigError> {
        let defs: Vec<RuleDef> = serde_json::from_str(text)?;
        Ok(Self::from_defs(&defs, ctx))
    }

    /// Reference rule set: every intent maps to its action, and sprint
    /// additionally requires moving while not crouching.
    pub fn default_rule_defs() -> Vec<RuleDef> {
        vec![
            RuleDef::new(RuleKind::Move),
            RuleDef::new(RuleKind::Look),
            RuleDef::new(RuleKind::Jump),
            RuleDef::new(RuleKind::Sprint)
                .when(ConditionDef::Moving)
                .when(ConditionDef::not(ConditionDef::Crouching)),
            RuleDef::new(RuleKind::Crouch),
            RuleDef::new(RuleKind::Interact),
            RuleDef::new(RuleKind::Attack),
        ]
    }

    pub fn reference(ctx: &CharacterContext) -> Self {
        Self::from_defs(&Self::default_rule_defs(), ctx)
    }

    pub fn rules(&self) -> &[ActionRule] {
        &self.rules
    }

    pub fn push(&mut self, rule: ActionRule) {
        self.rules.push(rule);
    }

    /// Rebuild `actions` from `intents`.
    pub fn resolve(&self, intents: &IntentBuffer, actions: &mut ActionBuffer) {
        actions.clear();
        for rule in &self.rules {
            if let Some(action) = rule.resolve(intents) {
                actions.insert(action);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::intent::{CrouchIntent, JumpIntent, MoveIntent, SprintIntent};
    use glam::Vec2;
    use std::rc::Rc;

    fn ctx() -> CharacterContext {
        CharacterContext::new(Rc::new(ConfigStore::new()))
    }

    #[test]
    fn test_move_intent_resolves_then_clears() {
        let ctx = ctx();
        let resolver = ActionResolver::reference(&ctx);
        let mut intents = IntentBuffer::new();
        let mut actions = ActionBuffer::new();

        intents.set(MoveIntent {
            direction: Vec2::new(0.0, 1.0),
        });
        resolver.resolve(&intents, &mut actions);
        assert!(actions.has::<MoveAction>());
        assert_eq!(actions.get::<MoveAction>().direction, Vec2::new(0.0, 1.0));

        intents.remove::<MoveIntent>();
        resolver.resolve(&intents, &mut actions);
        assert!(!actions.has::<MoveAction>());
        assert!(actions.is_empty());
    }

    #[test]
    fn test_intents_are_not_consumed() {
        let resolver = ActionResolver::reference(&ctx());
        let mut intents = IntentBuffer::new();
        let mut actions = ActionBuffer::new();

        intents.set(JumpIntent {});
        resolver.resolve(&intents, &mut actions);
        resolver.resolve(&intents, &mut actions);
        assert!(intents.has::<JumpIntent>());
        assert!(actions.has::<JumpAction>());
    }

    #[test]
    fn test_gated_sprint() {
        let ctx = ctx();
        let resolver = ActionResolver::reference(&ctx);
        let mut intents = IntentBuffer::new();
        let mut actions = ActionBuffer::new();
        intents.set(SprintIntent {});

        resolver.resolve(&intents, &mut actions);
        assert!(!actions.has::<SprintAction>());

        ctx.state.set_moving(true);
        resolver.resolve(&intents, &mut actions);
        assert!(actions.has::<SprintAction>());

        ctx.state.set_crouching(true);
        intents.set(CrouchIntent {});
        resolver.resolve(&intents, &mut actions);
        assert!(!actions.has::<SprintAction>());
        assert!(actions.has::<CrouchAction>());
    }

    #[test]
    fn test_rule_defs_from_json_skip_null_conditions() {
        let ctx = ctx();
        let resolver = ActionResolver::from_json(
            r#"[
                { "kind": "jump", "conditions": [null, "grounded"] },
                { "kind": "attack" }
            ]"#,
            &ctx,
        )
        .unwrap();
        assert_eq!(resolver.rules().len(), 2);
        assert!(matches!(
            resolver.rules()[0].condition,
            Some(Condition::Grounded(_))
        ));
        assert!(resolver.rules()[1].condition.is_none());
    }

    #[test]
    fn test_produce_ignores_other_kinds() {
        let intent: Intent = JumpIntent {}.into();
        assert!(RuleKind::Move.produce(&intent).is_none());
        assert!(RuleKind::Jump.produce(&intent).is_some());
    }

    #[test]
    fn test_unmatched_intents_leave_actions_empty() {
        let resolver = ActionResolver::new(vec![ActionRule::new(RuleKind::Jump)]);
        let mut intents = IntentBuffer::new();
        let mut actions = ActionBuffer::new();
        actions.set(JumpAction {});
        actions.set(MoveAction {
            direction: Vec2::Y,
        });

        intents.set(MoveIntent {
            direction: Vec2::Y,
        });
        resolver.resolve(&intents, &mut actions);
        assert!(actions.is_empty(), "stale actions from the last frame are dropped");
    }

    #[test]
    fn test_empty_rule_set_resolves_to_nothing() {
        let resolver = ActionResolver::new(Vec::new());
        let mut intents = IntentBuffer::new();
        let mut actions = ActionBuffer::new();
        actions.set(JumpAction {});

        intents.set(JumpIntent {});
        resolver.resolve(&intents, &mut actions);
        assert!(actions.is_empty());
        assert!(resolver.rules().is_empty());
    }
}
