//! Handler registry — strategy-type identifier → leg handler.
//!
//! Built once through [`RegistryBuilder`] and read-only afterwards. Aliases
//! point at the same shape as their target, so two identifiers with
//! identical leg structure share one handler.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use thiserror::Error;

use crate::legs::StrategyShape;

/// Alias for the recursive variant of the perp-hedged borrow strategy.
pub const PERP_BORROWING_RECURSIVE: &str = "perp_borrowing_recursive";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown strategy type '{requested}'; known types: {}", known.join(", "))]
    UnknownStrategy {
        requested: String,
        known: Vec<String>,
    },

    #[error("strategy type '{0}' is already registered")]
    Duplicate(String),

    #[error("alias '{alias}' points at unregistered strategy type '{target}'")]
    DanglingAlias { alias: String, target: String },
}

/// Immutable strategy-type lookup table.
#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, StrategyShape>,
}

impl HandlerRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Every shape under its canonical name plus the standard aliases,
    /// registered through the builder's duplicate and alias checks.
    pub fn try_standard() -> Result<Self, RegistryError> {
        let mut builder = Self::builder();
        for shape in StrategyShape::ALL {
            builder = builder.register(shape)?;
        }
        let builder = builder.alias(
            PERP_BORROWING_RECURSIVE,
            StrategyShape::PerpHedgedBorrow.strategy_type(),
        )?;
        Ok(builder.build())
    }

    /// The built-in registry.
    ///
    /// The built-in keys are fixed and distinct, so `try_standard` cannot
    /// fail here; `standard_set_passes_builder_checks` pins that.
    pub fn standard() -> Self {
        Self::try_standard().expect("built-in strategy types are distinct")
    }

    /// Look up the handler for `strategy_type`.
    ///
    /// Unknown identifiers are an error naming every registered key; there
    /// is no fallback handler.
    pub fn get(&self, strategy_type: &str) -> Result<StrategyShape, RegistryError> {
        self.handlers
            .get(strategy_type)
            .copied()
            .ok_or_else(|| RegistryError::UnknownStrategy {
                requested: strategy_type.to_string(),
                known: self.handlers.keys().cloned().collect(),
            })
    }

    pub fn contains(&self, strategy_type: &str) -> bool {
        self.handlers.contains_key(strategy_type)
    }

    /// Registered identifiers, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, StrategyShape)> {
        self.handlers.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Process-wide standard registry, built on first use.
pub fn standard_registry() -> &'static HandlerRegistry {
    static REGISTRY: OnceLock<HandlerRegistry> = OnceLock::new();
    REGISTRY.get_or_init(HandlerRegistry::standard)
}

/// Collects registrations before freezing them into a [`HandlerRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    handlers: BTreeMap<String, StrategyShape>,
}

impl RegistryBuilder {
    /// Register `shape` under its canonical strategy type.
    pub fn register(self, shape: StrategyShape) -> Result<Self, RegistryError> {
        self.register_as(shape.strategy_type(), shape)
    }

    pub fn register_as(
        mut self,
        strategy_type: &str,
        shape: StrategyShape,
    ) -> Result<Self, RegistryError> {
        if self.handlers.contains_key(strategy_type) {
            return Err(RegistryError::Duplicate(strategy_type.to_string()));
        }
        self.handlers.insert(strategy_type.to_string(), shape);
        Ok(self)
    }

    /// Add `alias` resolving to whatever `target` is registered as.
    pub fn alias(self, alias: &str, target: &str) -> Result<Self, RegistryError> {
        let shape = self.handlers.get(target).copied().ok_or_else(|| {
            RegistryError::DanglingAlias {
                alias: alias.to_string(),
                target: target.to_string(),
            }
        })?;
        self.register_as(alias, shape)
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}
