//! Versioned save records.
//!
//! Layout: a little-endian `u32` version header followed by the bincode body.
//! Only state that cannot be rebuilt is stored. Talent passives are
//! reconstructed by re-running talent lifecycles; equipment is owned by the
//! inventory collaborator and re-equipped by it after load.

use crate::aura::{Aura, AuraFlags, AuraLifecycle, AuraSource, StatusEffect};
use crate::character::Character;
use crate::config::ProgressionConfig;
use crate::error::{ErrorSeverity, ProgressionError};
use crate::stats::{PrimaryStats, STAT_COUNT, StatError};
use crate::talent::{TalentContext, TalentError, TalentTree};

/// Current record version.
pub const SAVE_VERSION: u32 = 1;

const HEADER_LEN: usize = 4;

/// Errors raised while encoding, decoding or applying a record.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    #[error("record is too short to hold a version header")]
    Truncated,

    #[error("unsupported record version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("record is corrupted: {0}")]
    Corrupted(String),

    #[error("character level {0} is out of range")]
    InvalidLevel(u32),

    #[error(transparent)]
    Stats(#[from] StatError),

    #[error(transparent)]
    Talents(#[from] TalentError),
}

impl ProgressionError for SaveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Serialization(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Truncated => "SAVE_TRUNCATED",
            Self::UnsupportedVersion { .. } => "SAVE_UNSUPPORTED_VERSION",
            Self::Serialization(_) => "SAVE_SERIALIZATION",
            Self::Corrupted(_) => "SAVE_CORRUPTED",
            Self::InvalidLevel(_) => "SAVE_INVALID_LEVEL",
            Self::Stats(e) => e.error_code(),
            Self::Talents(e) => e.error_code(),
        }
    }
}

/// A persisted aura that talents do not rebuild on their own.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AuraRecord {
    pub name: String,
    pub source: AuraSource,
    pub flags: u8,
    pub effects: Vec<StatusEffect>,
    pub lifecycle: AuraLifecycle,
    /// Seconds left; zero for permanent auras.
    pub remaining: f32,
    pub symbol: Option<String>,
    pub description: Option<String>,
}

impl AuraRecord {
    fn capture(aura: &Aura) -> Self {
        Self {
            name: aura.name().to_owned(),
            source: aura.source().clone(),
            flags: aura.flags().bits(),
            effects: aura.effects().to_vec(),
            lifecycle: aura.lifecycle(),
            remaining: aura.remaining().unwrap_or(0.0),
            symbol: aura.symbol().map(str::to_owned),
            description: aura.description().map(str::to_owned),
        }
    }
}

/// Everything needed to rebuild a character's progression state.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CharacterRecord {
    pub level: u32,
    pub stat_values: [i32; STAT_COUNT],
    pub stat_floors: [i32; STAT_COUNT],
    pub stat_points_granted: u32,
    pub stat_points_free: u32,
    pub talent_points_granted: u32,
    pub talent_points_available: u32,
    /// `(talent key, level)` for every talent above level 0.
    pub talents: Vec<(String, u8)>,
    pub auras: Vec<AuraRecord>,
}

impl CharacterRecord {
    /// Version header followed by the bincode body.
    pub fn encode(&self) -> Result<Vec<u8>, SaveError> {
        let body = bincode::serialize(self).map_err(|e| SaveError::Serialization(e.to_string()))?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
        bytes.extend_from_slice(&SAVE_VERSION.to_le_bytes());
        bytes.extend(body);
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SaveError> {
        let (header, body) = bytes.split_first_chunk::<HEADER_LEN>().ok_or(SaveError::Truncated)?;
        let version = u32::from_le_bytes(*header);
        if version != SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: version,
                supported: SAVE_VERSION,
            });
        }
        bincode::deserialize(body).map_err(|e| SaveError::Corrupted(e.to_string()))
    }
}

impl Character {
    /// Snapshot the persistent part of this character.
    pub fn record(&self) -> CharacterRecord {
        let talents = self
            .talents
            .iter()
            .filter(|talent| talent.level() > 0)
            .map(|talent| (talent.key().to_owned(), talent.level()))
            .collect();
        let auras = self
            .auras
            .iter()
            .filter(|aura| !matches!(aura.source(), AuraSource::Talent(_)))
            .map(AuraRecord::capture)
            .collect();

        CharacterRecord {
            level: self.level,
            stat_values: self.stats.values(),
            stat_floors: self.stats.floors(),
            stat_points_granted: self.stats.granted_points(),
            stat_points_free: self.stats.free_points(),
            talent_points_granted: self.talents.granted_points(),
            talent_points_available: self.talents.available_points(),
            talents,
            auras,
        }
    }

    /// Rebuild a character from a record and a freshly built talent tree.
    ///
    /// Talents come up in prerequisite order through their normal lifecycle
    /// hooks, then saved proc and external auras are re-inserted with their
    /// remaining time.
    pub fn restore(
        config: ProgressionConfig,
        talents: TalentTree,
        record: &CharacterRecord,
    ) -> Result<Self, SaveError> {
        if record.level == 0 || record.level > ProgressionConfig::MAX_CHARACTER_LEVEL {
            return Err(SaveError::InvalidLevel(record.level));
        }
        let stats = PrimaryStats::restore(
            &config,
            record.stat_values,
            record.stat_floors,
            record.stat_points_granted,
            record.stat_points_free,
        )?;

        let mut character = Character::new(config, talents);
        character.level = record.level;
        character.stats = stats;

        let mut ctx = TalentContext {
            auras: &mut character.auras,
            procs: &mut character.procs,
            stats: &character.stats,
        };
        character.talents.restore(
            &record.talents,
            record.talent_points_available,
            record.talent_points_granted,
            &mut ctx,
        )?;

        for saved in &record.auras {
            character.restore_aura(saved);
        }

        tracing::debug!(
            level = character.level,
            talents = record.talents.len(),
            auras = record.auras.len(),
            "character restored"
        );
        Ok(character)
    }

    /// Decode bytes and restore in one step.
    pub fn load(
        config: ProgressionConfig,
        talents: TalentTree,
        bytes: &[u8],
    ) -> Result<Self, SaveError> {
        let record = CharacterRecord::decode(bytes)?;
        Self::restore(config, talents, &record)
    }

    pub fn save(&self) -> Result<Vec<u8>, SaveError> {
        self.record().encode()
    }

    fn restore_aura(&mut self, saved: &AuraRecord) {
        let id = match &saved.source {
            AuraSource::Proc(key) => {
                match self.talents.by_key(key).and_then(|talent| talent.proc_aura()) {
                    Some(id) => id,
                    None => {
                        tracing::warn!(
                            aura = %saved.name,
                            talent = %key,
                            "dropping proc aura of inactive talent"
                        );
                        return;
                    }
                }
            }
            AuraSource::Talent(_) | AuraSource::External => self.auras.allocate_id(),
        };

        let mut aura = Aura::new(id, saved.name.clone(), saved.lifecycle)
            .with_effects(saved.effects.iter().copied())
            .with_flags(AuraFlags::from_bits_truncate(saved.flags))
            .with_source(saved.source.clone())
            .with_remaining(saved.remaining);
        if let Some(symbol) = &saved.symbol {
            aura = aura.with_symbol(symbol.clone());
        }
        if let Some(description) = &saved.description {
            aura = aura.with_description(description.clone());
        }
        self.auras.restore(aura);
    }
}
