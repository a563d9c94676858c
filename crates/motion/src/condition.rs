//! Boolean condition trees gating action rules.
//!
//! Leaves are bound to live character state when the tree is built, so
//! evaluation is a pure read with no lookups. A leaf whose source cannot be
//! bound (a resource the character does not have) is built as
//! [`Condition::Unbound`] and always evaluates to unsatisfied.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::context::CharacterContext;
use crate::resource::Resource;
use crate::state::CharacterState;

/// A bound predicate node.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Every child is satisfied (empty: satisfied).
    All(Vec<Condition>),
    /// At least one child is satisfied (empty: unsatisfied).
    Any(Vec<Condition>),
    /// Negation. A missing or partially unbound child is unsatisfied.
    Not(Option<Box<Condition>>),
    Grounded(Rc<CharacterState>),
    Moving(Rc<CharacterState>),
    Crouching(Rc<CharacterState>),
    Sprinting(Rc<CharacterState>),
    HasResource {
        name: String,
        resource: Rc<Resource>,
        min_amount: f32,
    },
    /// A leaf that failed to bind; never satisfied.
    Unbound(String),
}

impl Condition {
    /// Negate `child`.
    pub fn not(child: Condition) -> Self {
        Condition::Not(Some(Box::new(child)))
    }

    /// Evaluate against current state.
    pub fn is_satisfied(&self) -> bool {
        match self {
            Condition::All(children) => children.iter().all(Condition::is_satisfied),
            Condition::Any(children) => children.iter().any(Condition::is_satisfied),
            Condition::Not(None) => false,
            Condition::Not(Some(child)) => child.is_bound() && !child.is_satisfied(),
            Condition::Grounded(state) => state.is_grounded(),
            Condition::Moving(state) => state.is_moving(),
            Condition::Crouching(state) => state.is_crouching(),
            Condition::Sprinting(state) => state.is_sprinting(),
            Condition::HasResource {
                resource,
                min_amount,
                ..
            } => resource.current() >= *min_amount,
            Condition::Unbound(_) => false,
        }
    }

    /// True when no node in the tree is unbound or missing.
    pub fn is_bound(&self) -> bool {
        match self {
            Condition::All(children) | Condition::Any(children) => {
                children.iter().all(Condition::is_bound)
            }
            Condition::Not(None) => false,
            Condition::Not(Some(child)) => child.is_bound(),
            Condition::Unbound(_) => false,
            _ => true,
        }
    }

    /// Short label for logs and debug overlays.
    pub fn display_name(&self) -> String {
        match self {
            Condition::All(_) => "All".to_string(),
            Condition::Any(_) => "Any".to_string(),
            Condition::Not(_) => "Not".to_string(),
            Condition::Grounded(_) => "Grounded".to_string(),
            Condition::Moving(_) => "Moving".to_string(),
            Condition::Crouching(_) => "Crouching".to_string(),
            Condition::Sprinting(_) => "Sprinting".to_string(),
            Condition::HasResource {
                name, min_amount, ..
            } => format!("Has {} >= {}", name, min_amount),
            Condition::Unbound(what) => format!("Unbound({})", what),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::All(children) | Condition::Any(children) => {
                write!(f, "{}(", self.display_name())?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            Condition::Not(Some(child)) => write!(f, "Not({})", child),
            Condition::Not(None) => write!(f, "Not(<missing>)"),
            _ => write!(f, "{}", self.display_name()),
        }
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// Serializable condition description, bound into a [`Condition`] with
/// [`ConditionDef::build`].
///
/// ```json
/// { "all": ["moving", { "not": "crouching" }] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionDef {
    All(Vec<ConditionDef>),
    Any(Vec<ConditionDef>),
    Not(Option<Box<ConditionDef>>),
    Grounded,
    Moving,
    Crouching,
    Sprinting,
    HasResource { resource: String, min_amount: f32 },
}

impl ConditionDef {
    pub fn not(child: ConditionDef) -> Self {
        ConditionDef::Not(Some(Box::new(child)))
    }

    /// Bind against a character.
    pub fn build(&self, ctx: &CharacterContext) -> Condition {
        match self {
            ConditionDef::All(children) => {
                Condition::All(children.iter().map(|c| c.build(ctx)).collect())
            }
            ConditionDef::Any(children) => {
                Condition::Any(children.iter().map(|c| c.build(ctx)).collect())
            }
            ConditionDef::Not(child) => {
                if child.is_none() {
                    log::warn!("'not' condition has no child; it will never pass");
                }
                Condition::Not(child.as_ref().map(|c| Box::new(c.build(ctx))))
            }
            ConditionDef::Grounded => Condition::Grounded(Rc::clone(&ctx.state)),
            ConditionDef::Moving => Condition::Moving(Rc::clone(&ctx.state)),
            ConditionDef::Crouching => Condition::Crouching(Rc::clone(&ctx.state)),
            ConditionDef::Sprinting => Condition::Sprinting(Rc::clone(&ctx.state)),
            ConditionDef::HasResource {
                resource,
                min_amount,
            } => match ctx.resource(resource) {
                Some(bound) => Condition::HasResource {
                    name: resource.clone(),
                    resource: bound,
                    min_amount: *min_amount,
                },
                None => {
                    log::warn!(
                        "character has no resource '{}'; condition will never pass",
                        resource
                    );
                    Condition::Unbound(format!("resource '{}'", resource))
                }
            },
        }
    }
}
