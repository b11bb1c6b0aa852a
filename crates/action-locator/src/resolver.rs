//! Immutable locator registry and variant resolution

use crate::{errors::LocatorError, types::*};
use checkout_core_types::{LocatorExpression, LogicalTarget, ResolvedTarget, VariantTag};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, error, info};

/// Resolves logical targets into concrete locator expressions
pub trait TargetResolver: Send + Sync {
    /// Resolve `target` for `variant`
    fn resolve_target(
        &self,
        target: &LogicalTarget,
        variant: VariantTag,
    ) -> Result<ResolvedTarget, LocatorError>;
}

#[derive(Debug, Clone, Default)]
struct TargetEntry {
    agnostic: Option<LocatorExpression>,
    by_variant: BTreeMap<VariantTag, LocatorExpression>,
}

impl TargetEntry {
    fn from_def(def: TargetDef) -> Result<Self, LocatorError> {
        if def.agnostic.is_empty() && def.tagged.is_empty() {
            return Err(LocatorError::EmptyTarget(def.target));
        }
        if def.agnostic.len() > 1 {
            return Err(LocatorError::DuplicateVariant {
                target: def.target,
                variant: None,
            });
        }

        let mut entry = TargetEntry {
            agnostic: def.agnostic.into_iter().next(),
            by_variant: BTreeMap::new(),
        };
        for (variant, expression) in def.tagged {
            if entry.by_variant.insert(variant, expression).is_some() {
                return Err(LocatorError::DuplicateVariant {
                    target: def.target,
                    variant: Some(variant),
                });
            }
        }
        Ok(entry)
    }
}

/// Builder collecting target definitions before the table is frozen
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    defs: Vec<TargetDef>,
    overrides: Vec<LocatorOverride>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target definition
    pub fn define(mut self, def: TargetDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Queue configuration overrides; applied after every definition is in place
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = LocatorOverride>,
    {
        self.overrides.extend(overrides);
        self
    }

    /// Validate all definitions and freeze the table
    pub fn build(self) -> Result<LocatorRegistry, LocatorError> {
        let mut entries: BTreeMap<LogicalTarget, TargetEntry> = BTreeMap::new();

        for def in self.defs {
            match entries.entry(def.target.clone()) {
                Entry::Occupied(_) => return Err(LocatorError::DuplicateTarget(def.target)),
                Entry::Vacant(slot) => {
                    slot.insert(TargetEntry::from_def(def)?);
                }
            }
        }

        for locator_override in self.overrides {
            let expression = locator_override.expression();
            let entry = entries
                .get_mut(&locator_override.target)
                .ok_or_else(|| LocatorError::UnknownTarget(locator_override.target.clone()))?;

            info!(
                target = %locator_override.target,
                variant = ?locator_override.variant,
                locator = %expression,
                "Applying locator override"
            );
            match locator_override.variant {
                Some(variant) => {
                    entry.by_variant.insert(variant, expression);
                }
                None => entry.agnostic = Some(expression),
            }
        }

        debug!("Locator registry built with {} targets", entries.len());
        Ok(LocatorRegistry { entries })
    }
}

/// Read-only `(target, variant) -> expression` table.
///
/// Built once and shared between sessions; there is no mutation API.
#[derive(Debug, Clone)]
pub struct LocatorRegistry {
    entries: BTreeMap<LogicalTarget, TargetEntry>,
}

impl LocatorRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Resolve the expression for `target` on `variant`.
    ///
    /// A variant-tagged expression wins; otherwise the variant-agnostic one
    /// applies; otherwise resolution fails. Expressions tagged for other
    /// variants are never used as a fallback.
    pub fn resolve(
        &self,
        target: &LogicalTarget,
        variant: VariantTag,
    ) -> Result<&LocatorExpression, LocatorError> {
        let found = self.entries.get(target).and_then(|entry| {
            entry
                .by_variant
                .get(&variant)
                .or(entry.agnostic.as_ref())
        });

        found.ok_or_else(|| {
            error!(
                target = %target,
                variant = %variant,
                "No locator registered for target"
            );
            LocatorError::Unresolved {
                target: target.clone(),
                variant,
            }
        })
    }

    pub fn contains(&self, target: &LogicalTarget) -> bool {
        self.entries.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared targets in identifier order
    pub fn targets(&self) -> impl Iterator<Item = &LogicalTarget> {
        self.entries.keys()
    }

    /// Variants with a dedicated expression for `target`
    pub fn tagged_variants(&self, target: &LogicalTarget) -> Vec<VariantTag> {
        self.entries
            .get(target)
            .map(|entry| entry.by_variant.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Targets from `required` that cannot be resolved for `variant`
    pub fn unresolved<'a, I>(&self, required: I, variant: VariantTag) -> Vec<LogicalTarget>
    where
        I: IntoIterator<Item = &'a LogicalTarget>,
    {
        required
            .into_iter()
            .filter(|target| {
                !self.entries.get(*target).is_some_and(|entry| {
                    entry.by_variant.contains_key(&variant) || entry.agnostic.is_some()
                })
            })
            .cloned()
            .collect()
    }
}

impl TargetResolver for LocatorRegistry {
    fn resolve_target(
        &self,
        target: &LogicalTarget,
        variant: VariantTag,
    ) -> Result<ResolvedTarget, LocatorError> {
        let locator = self.resolve(target, variant)?.clone();
        Ok(ResolvedTarget::new(target.clone(), variant, locator))
    }
}
