use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use super::Vec2;

/// Named status bits an enemy record can carry.
///
/// Which bit means what is title-specific and lives in the schema's
/// [`crate::schema::EnemyFlagTable`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EnemyFlag {
    IsBoss,
    Invincible,
    NoHurtbox,
    NoHitbox,
    IsRectangle,
}

/// Booleans decoded from the enemy status bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EnemyStatus {
    pub is_boss: bool,
    pub invincible: bool,
    pub no_hurtbox: bool,
    pub no_hitbox: bool,
    pub is_rectangle: bool,
}

impl EnemyStatus {
    pub fn set(&mut self, flag: EnemyFlag) {
        match flag {
            EnemyFlag::IsBoss => self.is_boss = true,
            EnemyFlag::Invincible => self.invincible = true,
            EnemyFlag::NoHurtbox => self.no_hurtbox = true,
            EnemyFlag::NoHitbox => self.no_hitbox = true,
            EnemyFlag::IsRectangle => self.is_rectangle = true,
        }
    }

    pub fn get(&self, flag: EnemyFlag) -> bool {
        match flag {
            EnemyFlag::IsBoss => self.is_boss,
            EnemyFlag::Invincible => self.invincible,
            EnemyFlag::NoHurtbox => self.no_hurtbox,
            EnemyFlag::NoHitbox => self.no_hitbox,
            EnemyFlag::IsRectangle => self.is_rectangle,
        }
    }
}

/// Collision shape of an enemy's hurtbox/hitbox extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HitboxShape {
    Ellipse,
    Rectangle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enemy {
    pub id: u64,
    pub position: Vec2,
    pub hurtbox: Vec2,
    pub hitbox: Vec2,
    pub status: EnemyStatus,
    pub subboss_id: i32,
    pub rotation: f32,
    pub anm_page: Option<i32>,
    pub anm_id: Option<i32>,
    pub alive_timer: Option<i32>,
    pub score_reward: i32,
    pub hp: i32,
    pub hp_max: i32,
    pub iframes: i32,
}

impl Enemy {
    pub fn shape(&self) -> HitboxShape {
        if self.status.is_rectangle {
            HitboxShape::Rectangle
        } else {
            HitboxShape::Ellipse
        }
    }

    pub fn is_boss(&self) -> bool {
        self.status.is_boss
    }
}
