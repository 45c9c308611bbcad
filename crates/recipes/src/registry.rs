//! Resource descriptors addressable from document placeholders.

use std::collections::HashMap;

use crate::operation::PlanStep;

/// Plan steps with this resource name collect user input and never render.
pub const INPUT_RESOURCE: &str = "Input";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub key: Option<String>,
    pub uuid: Option<String>,
    pub resource_name: String,
    pub describe: String,
    pub diff: Option<String>,
}

impl From<&PlanStep> for ResourceDescriptor {
    fn from(step: &PlanStep) -> Self {
        Self {
            key: step.key.clone(),
            uuid: step.uuid.clone(),
            resource_name: step.resource_name.clone(),
            describe: step.describe.clone(),
            diff: step.diff.clone().filter(|diff| !diff.is_empty()),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ResourceRegistry {
    descriptors: Vec<ResourceDescriptor>,
    by_key: HashMap<String, usize>,
    by_uuid: HashMap<String, usize>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from the current plan. The first step wins when two
    /// share a key or uuid.
    pub fn from_plan(plan: &[PlanStep]) -> Self {
        let mut registry = Self::new();
        for step in plan
            .iter()
            .filter(|step| step.resource_name != INPUT_RESOURCE)
        {
            let index = registry.descriptors.len();
            if let Some(key) = &step.key {
                registry.by_key.entry(key.clone()).or_insert(index);
            }
            if let Some(uuid) = &step.uuid {
                registry.by_uuid.entry(uuid.clone()).or_insert(index);
            }
            registry.descriptors.push(ResourceDescriptor::from(step));
        }
        registry
    }

    pub fn lookup_by_key(&self, key: &str) -> Option<&ResourceDescriptor> {
        self.by_key.get(key).map(|&index| &self.descriptors[index])
    }

    pub fn lookup_by_uuid(&self, uuid: &str) -> Option<&ResourceDescriptor> {
        self.by_uuid.get(uuid).map(|&index| &self.descriptors[index])
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.descriptors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(resource_name: &str, key: Option<&str>, uuid: Option<&str>) -> PlanStep {
        PlanStep {
            resource_name: resource_name.to_string(),
            describe: format!("describe {resource_name}"),
            key: key.map(str::to_string),
            uuid: uuid.map(str::to_string),
            ..PlanStep::default()
        }
    }

    #[test]
    fn lookups_by_key_and_uuid() {
        let registry = ResourceRegistry::from_plan(&[
            step("File", Some("src/a.js"), None),
            step("NPMPackage", None, Some("u-1")),
        ]);
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.lookup_by_key("src/a.js").map(|r| r.resource_name.as_str()),
            Some("File")
        );
        assert_eq!(
            registry.lookup_by_uuid("u-1").map(|r| r.resource_name.as_str()),
            Some("NPMPackage")
        );
        assert!(registry.lookup_by_key("missing").is_none());
        assert!(registry.lookup_by_uuid("src/a.js").is_none());
    }

    #[test]
    fn input_steps_are_never_registered() {
        let registry = ResourceRegistry::from_plan(&[
            step("Input", Some("name"), Some("u-input")),
            step("File", Some("other"), None),
        ]);
        assert!(registry.lookup_by_key("name").is_none());
        assert!(registry.lookup_by_uuid("u-input").is_none());
        assert!(registry.iter().all(|r| r.resource_name != INPUT_RESOURCE));
    }

    #[test]
    fn first_duplicate_key_wins() {
        let mut second = step("File", Some("dup"), None);
        second.describe = "second".to_string();
        let registry = ResourceRegistry::from_plan(&[step("File", Some("dup"), None), second]);
        assert_eq!(
            registry.lookup_by_key("dup").map(|r| r.describe.as_str()),
            Some("describe File")
        );
    }
}
