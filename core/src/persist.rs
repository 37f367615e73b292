//! Integer layouts used by the save store.
//!
//! Gem counts for both players share one 16-bit column per gem kind:
//! `player1 | (player2 << 8)`. Health shares one 32-bit column:
//! `health1 | (max_health1 << 8) | (health2 << 16) | (max_health2 << 24)`.
//! Decoding only masks, stored values are never validated.

use serde::{Deserialize, Serialize};

use crate::*;

pub const fn encode_gem_counts(player1: u8, player2: u8) -> u16 {
    (player1 as u16) | ((player2 as u16) << 8)
}

pub const fn decode_gem_counts(packed: u16) -> (u8, u8) {
    ((packed & 0xff) as u8, ((packed >> 8) & 0xff) as u8)
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub health1: u8,
    pub max_health1: u8,
    pub health2: u8,
    pub max_health2: u8,
}

impl HealthRecord {
    pub const fn encode(self) -> u32 {
        (self.health1 as u32)
            | ((self.max_health1 as u32) << 8)
            | ((self.health2 as u32) << 16)
            | ((self.max_health2 as u32) << 24)
    }

    pub const fn decode(packed: u32) -> Self {
        Self {
            health1: (packed & 0xff) as u8,
            max_health1: ((packed >> 8) & 0xff) as u8,
            health2: ((packed >> 16) & 0xff) as u8,
            max_health2: ((packed >> 24) & 0xff) as u8,
        }
    }
}

pub const fn encode_health(health1: u8, max_health1: u8, health2: u8, max_health2: u8) -> u32 {
    HealthRecord {
        health1,
        max_health1,
        health2,
        max_health2,
    }
    .encode()
}

pub const fn decode_health(packed: u32) -> (u8, u8, u8, u8) {
    let record = HealthRecord::decode(packed);
    (
        record.health1,
        record.max_health1,
        record.health2,
        record.max_health2,
    )
}

/// One saved game row: a packed gem column per kind plus packed health.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub gems: [u16; GemType::COUNT],
    pub health: u32,
}

impl SaveData {
    /// Counts above 255 do not fit the layout and are saturated.
    pub fn from_scoreboard(scores: &Scoreboard) -> Self {
        let one = scores.player(PlayerId::One);
        let two = scores.player(PlayerId::Two);
        let saturate = |count: CellCount| u8::try_from(count).unwrap_or(u8::MAX);

        let mut gems = [0; GemType::COUNT];
        for gem in GemType::ALL {
            gems[gem.index()] =
                encode_gem_counts(saturate(one.gem_count(gem)), saturate(two.gem_count(gem)));
        }

        Self {
            gems,
            health: encode_health(one.health, one.max_health, two.health, two.max_health),
        }
    }

    pub fn gem_counts(&self, gem: GemType) -> (u8, u8) {
        decode_gem_counts(self.gems[gem.index()])
    }

    pub fn health_record(&self) -> HealthRecord {
        HealthRecord::decode(self.health)
    }

    /// Overwrites both players' counts and health. The turn is left alone.
    pub fn apply_to(&self, scores: &mut Scoreboard) {
        let health = self.health_record();
        for gem in GemType::ALL {
            let (one, two) = self.gem_counts(gem);
            scores
                .player_mut(PlayerId::One)
                .set_gem_count(gem, CellCount::from(one));
            scores
                .player_mut(PlayerId::Two)
                .set_gem_count(gem, CellCount::from(two));
        }

        let one = scores.player_mut(PlayerId::One);
        one.health = health.health1;
        one.max_health = health.max_health1;
        let two = scores.player_mut(PlayerId::Two);
        two.health = health.health2;
        two.max_health = health.max_health2;
    }
}
