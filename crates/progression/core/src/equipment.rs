//! Equipment as an effect source.
//!
//! Items carry stat requirements and a read-only set of status effects. An
//! equipped item whose requirements are no longer met (after an undo, say)
//! stays equipped but goes inactive and contributes nothing until the
//! requirements hold again.

use crate::aura::StatusEffect;
use crate::error::{ErrorSeverity, ProgressionError};
use crate::stats::{EffectSource, PrimaryStats, Stat};

/// Minimum base value of a primary stat needed to use an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatRequirement {
    pub stat: Stat,
    pub minimum: i32,
}

impl StatRequirement {
    pub const fn new(stat: Stat, minimum: i32) -> Self {
        Self { stat, minimum }
    }

    pub fn is_met(&self, stats: &PrimaryStats) -> bool {
        stats.value(self.stat) >= self.minimum
    }
}

/// An equippable item as supplied by the inventory collaborator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub requirements: Vec<StatRequirement>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<StatusEffect>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requirements: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn requires(mut self, stat: Stat, minimum: i32) -> Self {
        self.requirements.push(StatRequirement::new(stat, minimum));
        self
    }

    pub fn with_effect(mut self, effect: StatusEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn requirements_met(&self, stats: &PrimaryStats) -> bool {
        self.requirements.iter().all(|req| req.is_met(stats))
    }
}

/// Errors raised when equipping.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EquipmentError {
    #[error("{item} requires {stat} {minimum}")]
    RequirementUnmet {
        item: String,
        stat: Stat,
        minimum: i32,
    },

    #[error("{0} is already equipped")]
    AlreadyEquipped(String),
}

impl ProgressionError for EquipmentError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RequirementUnmet { .. } => ErrorSeverity::Recoverable,
            Self::AlreadyEquipped(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::RequirementUnmet { .. } => "EQUIP_REQUIREMENT_UNMET",
            Self::AlreadyEquipped(_) => "EQUIP_ALREADY_EQUIPPED",
        }
    }
}

#[derive(Clone, Debug)]
struct EquippedItem {
    item: Item,
    active: bool,
}

/// Items currently worn by a character.
#[derive(Clone, Debug, Default)]
pub struct Equipment {
    items: Vec<EquippedItem>,
    revision: u64,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equip an item whose requirements hold right now.
    pub fn equip(&mut self, item: Item, stats: &PrimaryStats) -> Result<(), EquipmentError> {
        if self.items.iter().any(|worn| worn.item.name == item.name) {
            return Err(EquipmentError::AlreadyEquipped(item.name));
        }
        if let Some(req) = item.requirements.iter().find(|req| !req.is_met(stats)) {
            return Err(EquipmentError::RequirementUnmet {
                item: item.name.clone(),
                stat: req.stat,
                minimum: req.minimum,
            });
        }

        tracing::debug!(item = %item.name, "equipped");
        self.items.push(EquippedItem { item, active: true });
        self.revision += 1;
        Ok(())
    }

    /// Take an item off by name.
    pub fn unequip(&mut self, name: &str) -> Option<Item> {
        let position = self.items.iter().position(|worn| worn.item.name == name)?;
        let worn = self.items.remove(position);
        tracing::debug!(item = %name, "unequipped");
        self.revision += 1;
        Some(worn.item)
    }

    /// Re-evaluate every item's requirements against current base stats.
    ///
    /// Returns the number of items whose active state flipped.
    pub fn recheck(&mut self, stats: &PrimaryStats) -> usize {
        let mut flipped = 0;
        for worn in &mut self.items {
            let met = worn.item.requirements_met(stats);
            if met != worn.active {
                worn.active = met;
                flipped += 1;
                tracing::debug!(
                    item = %worn.item.name,
                    active = met,
                    "equipment requirements changed"
                );
            }
        }
        if flipped > 0 {
            self.revision += 1;
        }
        flipped
    }

    pub fn is_active(&self, name: &str) -> Option<bool> {
        self.items
            .iter()
            .find(|worn| worn.item.name == name)
            .map(|worn| worn.active)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().map(|worn| &worn.item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl EffectSource for Equipment {
    fn revision(&self) -> u64 {
        self.revision
    }

    fn for_each_effect(&self, visit: &mut dyn FnMut(&StatusEffect)) {
        for worn in self.items.iter().filter(|worn| worn.active) {
            for effect in &worn.item.effects {
                visit(effect);
            }
        }
    }
}
