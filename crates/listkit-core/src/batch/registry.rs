//! Batch step registry.

use crate::batch::request::BatchRequest;
use crate::errors::{ListKitError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// One request inside a batch.
///
/// The id is caller- and protocol-visible and must stay stable across retry
/// attempts, so a step is immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStep {
    id: String,
    request: BatchRequest,
    depends_on: Vec<String>,
}

impl BatchStep {
    pub fn new<I, S>(id: impl Into<String>, request: BatchRequest, depends_on: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            request,
            depends_on: depends_on.into_iter().map(Into::into).collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn request(&self) -> &BatchRequest {
        &self.request
    }

    /// Target of the underlying request
    pub fn target(&self) -> &str {
        &self.request.target
    }

    /// Ids of the steps that must complete before this one
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

/// The steps still pending submission, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStepRegistry {
    steps: Vec<BatchStep>,
}

impl BatchStepRegistry {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step built from its parts.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateStepId` if a step with the same id is already registered.
    pub fn add_step<I, S>(
        &mut self,
        id: impl Into<String>,
        request: BatchRequest,
        depends_on: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(BatchStep::new(id, request, depends_on))
    }

    /// Add a prebuilt step.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateStepId` if a step with the same id is already registered.
    pub fn push(&mut self, step: BatchStep) -> Result<()> {
        if self.contains(step.id()) {
            return Err(ListKitError::DuplicateStepId {
                step_id: step.id,
            });
        }
        self.steps.push(step);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&BatchStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Step ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatchStep> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check that the registry is a submittable batch.
    ///
    /// # Errors
    ///
    /// - `EmptyBatch`: no steps
    /// - `SelfDependency`: a step lists its own id
    /// - `UnknownDependency`: a step depends on an id outside the registry
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(ListKitError::EmptyBatch);
        }
        let ids: HashSet<&str> = self.ids().collect();
        for step in &self.steps {
            for dep in &step.depends_on {
                if dep == &step.id {
                    return Err(ListKitError::SelfDependency {
                        step_id: step.id.clone(),
                    });
                }
                if !ids.contains(dep.as_str()) {
                    return Err(ListKitError::UnknownDependency {
                        step_id: step.id.clone(),
                        dependency_id: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Rebuild a registry holding only the steps whose id is in `keep`.
    ///
    /// Retained steps are cloned verbatim: same id, same request, same
    /// dependency list, same relative order. Dependency edges to dropped
    /// steps are kept as-is; see [`Self::dangling_dependencies`].
    pub fn retain_ids(&self, keep: &BTreeSet<String>) -> BatchStepRegistry {
        Self {
            steps: self
                .steps
                .iter()
                .filter(|s| keep.contains(&s.id))
                .cloned()
                .collect(),
        }
    }

    /// `(step_id, dependency_id)` pairs whose dependency is not in this registry
    pub fn dangling_dependencies(&self) -> Vec<(String, String)> {
        let ids: HashSet<&str> = self.ids().collect();
        self.steps
            .iter()
            .flat_map(|step| {
                step.depends_on
                    .iter()
                    .filter(|dep| !ids.contains(dep.as_str()))
                    .map(|dep| (step.id.clone(), dep.clone()))
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a BatchStepRegistry {
    type Item = &'a BatchStep;
    type IntoIter = std::slice::Iter<'a, BatchStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
