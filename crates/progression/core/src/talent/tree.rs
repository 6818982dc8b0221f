//! The talent graph and its point economy.
//!
//! # Relations
//!
//! Two relations are kept apart on purpose:
//!
//! - `requirements` / `required_by`: prerequisite edges. These alone decide
//!   whether an invest or undo is legal.
//! - `dependents`: layout successors from the definitions. Traversal only.
//!
//! # Points
//!
//! Every level costs one talent point, so `spent == Σ levels` and
//! `spent + available == granted` at all times.

use std::collections::HashMap;

use crate::aura::AuraId;
use crate::config::ProgressionConfig;
use crate::error::{ErrorSeverity, ProgressionError};
use crate::rng::{RngOracle, compute_seed};

use super::definition::TalentDefinition;
use super::node::{LevelChange, Talent, TalentContext, TalentRequirement};
use super::proc::CombatEvent;
use super::TalentId;

/// Errors raised while wiring the tree from definitions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("duplicate talent key: {0}")]
    DuplicateKey(String),

    #[error("talent {talent} requires unknown talent {requirement}")]
    UnknownRequirement { talent: String, requirement: String },

    #[error("talent {talent} lists unknown dependent {dependent}")]
    UnknownDependent { talent: String, dependent: String },

    #[error("talent {0} requires itself")]
    SelfRequirement(String),

    #[error("talent {talent} has invalid max level {max_level}")]
    InvalidMaxLevel { talent: String, max_level: u8 },

    #[error("talent {talent} requires {requirement} at level {min_level}, outside 1..={max}")]
    UnreachableRequirement {
        talent: String,
        requirement: String,
        min_level: u8,
        max: u8,
    },

    #[error("prerequisite cycle through talent {0}")]
    Cycle(String),

    #[error("too many talents: {0}")]
    TooManyTalents(usize),
}

impl ProgressionError for NetworkError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateKey(_) => "NETWORK_DUPLICATE_KEY",
            Self::UnknownRequirement { .. } => "NETWORK_UNKNOWN_REQUIREMENT",
            Self::UnknownDependent { .. } => "NETWORK_UNKNOWN_DEPENDENT",
            Self::SelfRequirement(_) => "NETWORK_SELF_REQUIREMENT",
            Self::InvalidMaxLevel { .. } => "NETWORK_INVALID_MAX_LEVEL",
            Self::UnreachableRequirement { .. } => "NETWORK_UNREACHABLE_REQUIREMENT",
            Self::Cycle(_) => "NETWORK_CYCLE",
            Self::TooManyTalents(_) => "NETWORK_TOO_MANY_TALENTS",
        }
    }
}

/// Errors raised by invest, undo and restore.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TalentError {
    #[error("unknown talent {0}")]
    UnknownTalent(TalentId),

    #[error("unknown talent key {0}")]
    UnknownKey(String),

    #[error("no talent points available")]
    NoPoints,

    #[error("{talent} is already at max level {max}")]
    AtMaxLevel { talent: String, max: u8 },

    #[error("{talent} is at level 0")]
    AtZero { talent: String },

    #[error("{talent} requires {requirement} at level {min_level}")]
    RequirementUnmet {
        talent: String,
        requirement: String,
        min_level: u8,
    },

    #[error("{dependent} needs {talent} at level {min_level}")]
    RequiredBy {
        talent: String,
        dependent: String,
        min_level: u8,
    },

    #[error("{talent} level {level} exceeds max {max}")]
    LevelAboveMax { talent: String, level: u8, max: u8 },

    #[error("talent points do not add up: spent {spent} + available {available} != granted {granted}")]
    PointsMismatch {
        spent: u32,
        available: u32,
        granted: u32,
    },
}

impl ProgressionError for TalentError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoPoints
            | Self::AtMaxLevel { .. }
            | Self::AtZero { .. }
            | Self::RequirementUnmet { .. }
            | Self::RequiredBy { .. } => ErrorSeverity::Recoverable,
            Self::UnknownTalent(_)
            | Self::UnknownKey(_)
            | Self::LevelAboveMax { .. }
            | Self::PointsMismatch { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownTalent(_) => "TALENT_UNKNOWN",
            Self::UnknownKey(_) => "TALENT_UNKNOWN_KEY",
            Self::NoPoints => "TALENT_NO_POINTS",
            Self::AtMaxLevel { .. } => "TALENT_AT_MAX_LEVEL",
            Self::AtZero { .. } => "TALENT_AT_ZERO",
            Self::RequirementUnmet { .. } => "TALENT_REQUIREMENT_UNMET",
            Self::RequiredBy { .. } => "TALENT_REQUIRED_BY",
            Self::LevelAboveMax { .. } => "TALENT_LEVEL_ABOVE_MAX",
            Self::PointsMismatch { .. } => "TALENT_POINTS_MISMATCH",
        }
    }
}

/// Directed prerequisite graph of talents plus the talent point economy.
#[derive(Clone, Debug)]
pub struct TalentTree {
    talents: Vec<Talent>,
    keys: HashMap<String, TalentId>,
    required_by: Vec<Vec<TalentId>>,
    /// Prerequisites always come before the talents that require them.
    order: Vec<TalentId>,
    available: u32,
    granted: u32,
}

impl TalentTree {
    /// Wire requirements and dependents from definitions and validate the
    /// resulting graph.
    pub fn setup_network(definitions: Vec<TalentDefinition>) -> Result<Self, NetworkError> {
        if definitions.len() > usize::from(u16::MAX) {
            return Err(NetworkError::TooManyTalents(definitions.len()));
        }

        let mut keys = HashMap::with_capacity(definitions.len());
        for (index, definition) in definitions.iter().enumerate() {
            if definition.max_level == 0
                || definition.max_level > ProgressionConfig::MAX_TALENT_LEVEL
            {
                return Err(NetworkError::InvalidMaxLevel {
                    talent: definition.key.clone(),
                    max_level: definition.max_level,
                });
            }
            if keys
                .insert(definition.key.clone(), TalentId(index as u16))
                .is_some()
            {
                return Err(NetworkError::DuplicateKey(definition.key.clone()));
            }
        }

        let mut resolved = Vec::with_capacity(definitions.len());
        let mut required_by = vec![Vec::new(); definitions.len()];
        for (index, definition) in definitions.iter().enumerate() {
            let id = TalentId(index as u16);
            let mut requirements = Vec::with_capacity(definition.requirements.len());
            for spec in &definition.requirements {
                let Some(&target) = keys.get(&spec.talent) else {
                    return Err(NetworkError::UnknownRequirement {
                        talent: definition.key.clone(),
                        requirement: spec.talent.clone(),
                    });
                };
                if target == id {
                    return Err(NetworkError::SelfRequirement(definition.key.clone()));
                }
                let max = definitions[target.index()].max_level;
                if spec.min_level == 0 || spec.min_level > max {
                    return Err(NetworkError::UnreachableRequirement {
                        talent: definition.key.clone(),
                        requirement: spec.talent.clone(),
                        min_level: spec.min_level,
                        max,
                    });
                }
                requirements.push(TalentRequirement {
                    talent: target,
                    min_level: spec.min_level,
                });
                required_by[target.index()].push(id);
            }

            let mut dependents = Vec::with_capacity(definition.dependents.len());
            for key in &definition.dependents {
                let Some(&target) = keys.get(key) else {
                    return Err(NetworkError::UnknownDependent {
                        talent: definition.key.clone(),
                        dependent: key.clone(),
                    });
                };
                dependents.push(target);
            }
            resolved.push((requirements, dependents));
        }

        let order = prerequisite_order(&resolved, &definitions)?;

        let talents = definitions
            .into_iter()
            .zip(resolved)
            .enumerate()
            .map(|(index, (definition, (requirements, dependents)))| {
                Talent::new(TalentId(index as u16), definition, requirements, dependents)
            })
            .collect::<Vec<_>>();

        tracing::debug!(talents = talents.len(), "talent network ready");
        Ok(Self {
            talents,
            keys,
            required_by,
            order,
            available: 0,
            granted: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.talents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.talents.is_empty()
    }

    pub fn id_of(&self, key: &str) -> Option<TalentId> {
        self.keys.get(key).copied()
    }

    pub fn get(&self, id: TalentId) -> Option<&Talent> {
        self.talents.get(id.index())
    }

    pub fn get_mut(&mut self, id: TalentId) -> Option<&mut Talent> {
        self.talents.get_mut(id.index())
    }

    pub fn by_key(&self, key: &str) -> Option<&Talent> {
        self.id_of(key).and_then(|id| self.get(id))
    }

    pub fn level(&self, id: TalentId) -> u8 {
        self.get(id).map_or(0, Talent::level)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Talent> {
        self.talents.iter()
    }

    /// Talents whose requirements name `id`.
    pub fn required_by(&self, id: TalentId) -> &[TalentId] {
        self.required_by
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The talent whose passive or proc aura carries `id`, if any.
    pub fn aura_owner(&self, id: AuraId) -> Option<&Talent> {
        self.talents
            .iter()
            .find(|talent| talent.passive_aura() == Some(id) || talent.proc_aura() == Some(id))
    }

    /// Topological order: every talent after all of its prerequisites.
    pub fn prerequisite_order(&self) -> &[TalentId] {
        &self.order
    }

    pub fn available_points(&self) -> u32 {
        self.available
    }

    pub fn granted_points(&self) -> u32 {
        self.granted
    }

    pub fn spent_points(&self) -> u32 {
        self.talents.iter().map(|t| u32::from(t.level())).sum()
    }

    pub fn grant_points(&mut self, points: u32) {
        self.available += points;
        self.granted += points;
        tracing::debug!(points, available = self.available, "talent points granted");
    }

    pub fn can_invest(&self, id: TalentId) -> bool {
        self.check_invest(id).is_ok()
    }

    /// Why an invest would fail, without mutating anything.
    pub fn check_invest(&self, id: TalentId) -> Result<(), TalentError> {
        let talent = self.talent(id)?;
        if self.available == 0 {
            return Err(TalentError::NoPoints);
        }
        if talent.level() >= talent.max_level() {
            return Err(TalentError::AtMaxLevel {
                talent: talent.key().to_owned(),
                max: talent.max_level(),
            });
        }
        if let Some(req) = talent
            .requirements()
            .iter()
            .find(|req| self.level(req.talent) < req.min_level)
        {
            return Err(TalentError::RequirementUnmet {
                talent: talent.key().to_owned(),
                requirement: self.key_of(req.talent),
                min_level: req.min_level,
            });
        }
        Ok(())
    }

    /// Spend one point to raise a talent by one level.
    pub fn invest(
        &mut self,
        id: TalentId,
        ctx: &mut TalentContext<'_>,
    ) -> Result<LevelChange, TalentError> {
        self.check_invest(id)?;

        self.available -= 1;
        let talent = &mut self.talents[id.index()];
        let to = talent.level() + 1;
        let change = talent.set_level(to, ctx);
        tracing::debug!(talent = talent.key(), level = to, "talent invested");

        self.debug_check_invariants();
        Ok(change)
    }

    pub fn can_undo(&self, id: TalentId) -> bool {
        self.check_undo(id).is_ok()
    }

    /// Why an undo would fail. Walks every talent that requires this one
    /// before anything is touched.
    pub fn check_undo(&self, id: TalentId) -> Result<(), TalentError> {
        let talent = self.talent(id)?;
        if talent.level() == 0 {
            return Err(TalentError::AtZero {
                talent: talent.key().to_owned(),
            });
        }

        let lowered = talent.level() - 1;
        for &dependent in self.required_by(id) {
            let other = &self.talents[dependent.index()];
            if other.level() == 0 {
                continue;
            }
            if let Some(req) = other
                .requirements()
                .iter()
                .find(|req| req.talent == id && req.min_level > lowered)
            {
                return Err(TalentError::RequiredBy {
                    talent: talent.key().to_owned(),
                    dependent: other.key().to_owned(),
                    min_level: req.min_level,
                });
            }
        }
        Ok(())
    }

    /// Lower a talent by one level and refund its point.
    pub fn undo(
        &mut self,
        id: TalentId,
        ctx: &mut TalentContext<'_>,
    ) -> Result<LevelChange, TalentError> {
        self.check_undo(id)?;

        self.available += 1;
        let talent = &mut self.talents[id.index()];
        let to = talent.level() - 1;
        let change = talent.set_level(to, ctx);
        tracing::debug!(talent = talent.key(), level = to, "talent undone");

        self.debug_check_invariants();
        Ok(change)
    }

    /// Respec: return every talent to level 0, dependents first, and refund
    /// all spent points. Returns the number of points refunded.
    pub fn reset(&mut self, ctx: &mut TalentContext<'_>) -> u32 {
        let refunded = self.spent_points();
        for index in (0..self.order.len()).rev() {
            let id = self.order[index];
            let talent = &mut self.talents[id.index()];
            if talent.level() > 0 {
                talent.set_level(0, ctx);
            }
        }
        self.available += refunded;
        tracing::debug!(refunded, "talents reset");
        self.debug_check_invariants();
        refunded
    }

    /// Rebuild levels from saved `(key, level)` pairs.
    ///
    /// Everything is validated before any talent changes. Talents come up in
    /// prerequisite order, each running Initialize then Refresh, so owned
    /// auras and proc hooks are reconstructed rather than just the integers.
    /// The tree must be freshly built (all talents at level 0).
    pub fn restore(
        &mut self,
        levels: &[(String, u8)],
        available: u32,
        granted: u32,
        ctx: &mut TalentContext<'_>,
    ) -> Result<(), TalentError> {
        debug_assert_eq!(self.spent_points(), 0, "restore into a used tree");

        let mut target = vec![0u8; self.talents.len()];
        for (key, level) in levels {
            let id = self
                .id_of(key)
                .ok_or_else(|| TalentError::UnknownKey(key.clone()))?;
            let talent = &self.talents[id.index()];
            if *level > talent.max_level() {
                return Err(TalentError::LevelAboveMax {
                    talent: key.clone(),
                    level: *level,
                    max: talent.max_level(),
                });
            }
            target[id.index()] = *level;
        }

        for talent in self.talents.iter().filter(|t| target[t.id().index()] > 0) {
            if let Some(req) = talent
                .requirements()
                .iter()
                .find(|req| target[req.talent.index()] < req.min_level)
            {
                return Err(TalentError::RequirementUnmet {
                    talent: talent.key().to_owned(),
                    requirement: self.key_of(req.talent),
                    min_level: req.min_level,
                });
            }
        }

        let spent: u32 = target.iter().map(|&level| u32::from(level)).sum();
        if spent.checked_add(available) != Some(granted) {
            return Err(TalentError::PointsMismatch {
                spent,
                available,
                granted,
            });
        }

        for &id in &self.order {
            let level = target[id.index()];
            if level > 0 {
                self.talents[id.index()].set_level(level, ctx);
            }
        }
        self.available = available;
        self.granted = granted;
        tracing::debug!(spent, available, "talent levels restored");

        self.debug_check_invariants();
        Ok(())
    }

    /// Refresh active talents whose effects read base stats. Returns how many
    /// were refreshed.
    pub fn refresh_stat_scaled(&mut self, ctx: &mut TalentContext<'_>) -> usize {
        let mut refreshed = 0;
        for talent in &mut self.talents {
            if talent.is_active() && talent.definition().reads_stats() {
                talent.refresh(ctx);
                refreshed += 1;
            }
        }
        refreshed
    }

    /// Roll every proc subscribed to `event`. Returns the auras that fired.
    ///
    /// Each talent rolls with its own seed derived from `seed`, `nonce` and
    /// its id, so talents reacting to the same event roll independently.
    pub fn dispatch(
        &self,
        event: CombatEvent,
        ctx: &mut TalentContext<'_>,
        rng: &dyn RngOracle,
        seed: u64,
        nonce: u64,
    ) -> Vec<AuraId> {
        let subscribers: Vec<TalentId> = ctx.procs.subscribers(event).collect();
        subscribers
            .into_iter()
            .filter_map(|id| self.get(id))
            .filter_map(|talent| {
                let roll_seed = compute_seed(seed, nonce, talent.id().0);
                talent.fire_proc(ctx.auras, ctx.stats, rng, roll_seed)
            })
            .inspect(|aura| tracing::trace!(%event, %aura, "proc aura installed"))
            .collect()
    }

    /// Advance skill cooldowns.
    pub fn tick_skills(&mut self, delta: f32) {
        for talent in &mut self.talents {
            if let Some(skill) = talent.skill_mut() {
                skill.tick(delta);
            }
        }
    }

    fn talent(&self, id: TalentId) -> Result<&Talent, TalentError> {
        self.get(id).ok_or(TalentError::UnknownTalent(id))
    }

    fn key_of(&self, id: TalentId) -> String {
        self.get(id).map(|t| t.key().to_owned()).unwrap_or_default()
    }

    fn debug_check_invariants(&self) {
        debug_assert_eq!(
            self.spent_points() + self.available,
            self.granted,
            "talent point conservation broken"
        );
        debug_assert!(
            self.talents.iter().filter(|t| t.level() > 0).all(|t| t
                .requirements()
                .iter()
                .all(|req| self.level(req.talent) >= req.min_level)),
            "active talent with an unmet prerequisite"
        );
    }
}

/// Kahn's algorithm over prerequisite edges, stable by definition order.
fn prerequisite_order(
    resolved: &[(Vec<TalentRequirement>, Vec<TalentId>)],
    definitions: &[TalentDefinition],
) -> Result<Vec<TalentId>, NetworkError> {
    let count = resolved.len();
    let mut pending: Vec<usize> = resolved.iter().map(|(reqs, _)| reqs.len()).collect();
    let mut unlocks = vec![Vec::new(); count];
    for (index, (requirements, _)) in resolved.iter().enumerate() {
        for req in requirements {
            unlocks[req.talent.index()].push(index);
        }
    }

    let mut order = Vec::with_capacity(count);
    let mut ready: Vec<usize> = (0..count).filter(|&i| pending[i] == 0).rev().collect();
    while let Some(index) = ready.pop() {
        order.push(TalentId(index as u16));
        for &next in unlocks[index].iter().rev() {
            pending[next] -= 1;
            if pending[next] == 0 {
                ready.push(next);
            }
        }
    }

    if order.len() != count {
        let stuck = pending
            .iter()
            .position(|&left| left > 0)
            .map(|index| definitions[index].key.clone())
            .unwrap_or_default();
        return Err(NetworkError::Cycle(stuck));
    }
    Ok(order)
}
