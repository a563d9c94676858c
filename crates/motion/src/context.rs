//! Per-character handles handed to conditions and abilities at construction.

use std::collections::HashMap;
use std::rc::Rc;

use crate::action::{shared_actions, SharedActions};
use crate::config::ConfigStore;
use crate::ladder::LadderSet;
use crate::resource::Resource;
use crate::state::CharacterState;

/// Everything a condition or ability may bind to.
///
/// Cloning is cheap; every field is a shared handle.
#[derive(Debug, Clone)]
pub struct CharacterContext {
    pub config: Rc<ConfigStore>,
    pub state: Rc<CharacterState>,
    pub actions: SharedActions,
    pub ladders: Rc<LadderSet>,
    resources: HashMap<String, Rc<Resource>>,
}

impl CharacterContext {
    /// Create a context with fresh state, an empty action buffer and no
    /// ladders.
    pub fn new(config: Rc<ConfigStore>) -> Self {
        Self {
            config,
            state: CharacterState::shared(),
            actions: shared_actions(),
            ladders: Rc::new(LadderSet::default()),
            resources: HashMap::new(),
        }
    }

    pub fn with_ladders(mut self, ladders: Rc<LadderSet>) -> Self {
        self.ladders = ladders;
        self
    }

    pub fn with_resource(mut self, name: &str, resource: Rc<Resource>) -> Self {
        self.resources.insert(name.to_string(), resource);
        self
    }

    /// Look up a named resource.
    pub fn resource(&self, name: &str) -> Option<Rc<Resource>> {
        self.resources.get(name).cloned()
    }
}
