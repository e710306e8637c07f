//! In-memory skill oracle.

use std::collections::HashMap;

use combat_core::{SkillId, SkillOracle, SkillSpec};

/// Skill table keyed by id.
#[derive(Clone, Debug, Default)]
pub struct StaticSkillBook {
    skills: HashMap<SkillId, SkillSpec>,
}

impl StaticSkillBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skill(mut self, spec: SkillSpec) -> Self {
        self.skills.insert(spec.id, spec);
        self
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl SkillOracle for StaticSkillBook {
    fn skill(&self, id: SkillId) -> Option<SkillSpec> {
        self.skills.get(&id).cloned()
    }
}
