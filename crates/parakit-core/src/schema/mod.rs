//! Per-title memory schema.
//!
//! A [`GameSchema`] is the immutable context every decoder receives: where
//! the globals and manager pointers live (module-relative), and the field
//! offsets inside each record type. Built-in tables cover the supported
//! titles; a TOML file with the same shape can replace them when a game
//! build moves things around.
//!
//! `Option` offsets are fields not located for every title. A missing offset
//! decodes to `None` and can be filled in from an override file.

mod builtin;
mod title;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::game::{EnemyFlag, ItemType};
use crate::memory::layout;

pub use title::GameTitle;

/// Module-relative addresses of top-level values and manager pointers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalLayout {
    pub time_in_stage: u64,
    pub global_timer: u64,
    pub pause_state: u64,
    pub game_mode: u64,
    pub score: u64,
    pub lives: u64,
    pub life_pieces: u64,
    pub bombs: u64,
    pub bomb_pieces: u64,
    pub power: u64,
    pub piv: u64,
    pub graze: u64,
    pub rank: u64,
    pub input: u64,
    pub rng: u64,
    pub player_pointer: u64,
    pub bullet_manager_pointer: u64,
    pub enemy_manager_pointer: u64,
    pub item_manager_pointer: u64,
    pub laser_manager_pointer: u64,
    pub spellcard_pointer: u64,
    pub gui_pointer: u64,
    pub stage_chapter: Option<u64>,
}

/// Module-relative addresses of values read only on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UntrackedLayout {
    pub rng_seed: u64,
    pub game_speed: u64,
    pub visual_rng: u64,
    pub replay_filename: u64,
    pub character: u64,
    pub subshot: u64,
    pub difficulty: u64,
    pub stage: u64,
}

/// Field offsets of a linked-list node.
///
/// `entry == None` means the node is the record itself (intrusive list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLayout {
    pub entry: Option<u64>,
    pub next: u64,
}

impl NodeLayout {
    /// The generic manager list node: entry pointer then next pointer.
    pub const ZLIST: Self = Self {
        entry: Some(layout::list::ENTRY),
        next: layout::list::NEXT,
    };

    /// A record that links to the next record directly.
    pub const fn intrusive(next: u64) -> Self {
        Self { entry: None, next }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLayout {
    pub position: u64,
    pub iframes: u64,
    pub focused: u64,
    pub scale: Option<u64>,
    pub hitbox_radius: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiLayout {
    pub boss_timer_seconds: u64,
    pub boss_timer_millis: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellcardLayout {
    /// Nonzero while a spell card is declared
    pub active: Option<u64>,
    pub spell_id: Option<u64>,
    pub capture_bonus: u64,
}

/// Bomb object, reached through a module-relative pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BombLayout {
    pub pointer: u64,
    pub state: u64,
}

/// Where a title keeps its extra bullet field, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "offset", rename_all = "snake_case")]
pub enum BulletExtensionLayout {
    None,
    ShowDelay(u64),
    GrazeTimer(u64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletLayout {
    /// Offset of the embedded dummy head node inside the bullet manager
    pub list: u64,
    pub position: u64,
    pub velocity: u64,
    pub speed: u64,
    pub angle: u64,
    pub scale: Option<u64>,
    pub hitbox_radius: u64,
    pub iframes: u64,
    pub active: Option<u64>,
    pub alive_timer: Option<u64>,
    pub bullet_type: u64,
    pub color: u64,
    pub extension: BulletExtensionLayout,
}

/// One entry of the enemy flag table: the bit(s) that set a named boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagBit {
    pub flag: EnemyFlag,
    pub mask: u32,
}

/// Data-driven translation of the enemy status bitmask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyFlagTable {
    /// Records with any of these bits set are not real enemies
    pub not_real: u32,
    pub bits: Vec<FlagBit>,
}

impl EnemyFlagTable {
    pub fn is_not_real(&self, flags: u32) -> bool {
        flags & self.not_real != 0
    }

    /// Named flags whose bits are present in `flags`.
    pub fn matching(&self, flags: u32) -> impl Iterator<Item = EnemyFlag> + '_ {
        self.bits
            .iter()
            .filter(move |bit| flags & bit.mask != 0)
            .map(|bit| bit.flag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyLayout {
    /// Offset of the first-node pointer inside the enemy manager
    pub list: u64,
    pub flags: u64,
    pub position: u64,
    pub hurtbox: u64,
    pub hitbox: u64,
    pub subboss_id: u64,
    pub rotation: u64,
    pub anm_page: Option<u64>,
    pub anm_id: Option<u64>,
    pub alive_timer: Option<u64>,
    pub score_reward: u64,
    pub hp: u64,
    pub hp_max: u64,
    pub iframes: u64,
    pub flag_table: EnemyFlagTable,
}

/// Raw item code → item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCode {
    pub code: i32,
    pub item_type: ItemType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemLayout {
    /// Offset of the slot array inside the item manager
    pub array: u64,
    pub slot_count: u32,
    pub stride: u64,
    pub state: u64,
    pub item_type: u64,
    pub position: u64,
    pub velocity: u64,
    pub alive_timer: Option<u64>,
    pub types: Vec<ItemCode>,
}

impl ItemLayout {
    pub fn item_type(&self, code: i32) -> Option<ItemType> {
        self.types
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.item_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineLaserLayout {
    pub start_pos: u64,
    pub init_angle: u64,
    pub max_length: u64,
    pub init_speed: u64,
    pub distance: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfiniteLaserLayout {
    pub start_pos: u64,
    pub origin_velocity: u64,
    pub default_angle: u64,
    pub angular_velocity: u64,
    pub init_length: u64,
    pub max_length: u64,
    pub max_width: u64,
    pub default_speed: u64,
    pub start_time: u64,
    pub expand_time: u64,
    pub active_time: u64,
    pub shrink_time: u64,
    pub distance: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveLaserLayout {
    pub max_length: u64,
    pub distance: u64,
    /// Pointer to the node array
    pub node_array: u64,
    pub node_stride: u64,
    pub node_position: u64,
    pub node_velocity: u64,
    pub node_angle: u64,
    pub node_speed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserLayout {
    /// Offset of the head-laser pointer inside the laser manager
    pub list: u64,
    pub next: u64,
    pub state: u64,
    pub kind: u64,
    #[serde(alias = "timer")]
    pub alive_timer: u64,
    pub position: u64,
    pub angle: u64,
    pub length: u64,
    pub width: u64,
    pub speed: u64,
    pub iframes: u64,
    pub sprite: u64,
    pub color: u64,
    pub line: LineLaserLayout,
    pub infinite: InfiniteLaserLayout,
    pub curve: CurveLaserLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdLayout {
    pub life_piece_req: Option<u64>,
    pub trance_active: u64,
    pub trance_meter: u64,
    pub chain_timer: u64,
    pub chain_counter: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DdcLayout {
    pub bonus_count: u64,
    pub seija_anm_pointer: u64,
    /// Offset of the two flip factors inside the Seija ANM object
    pub seija_flip: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LolkLayout {
    pub item_graze_slowdown_factor: u64,
    pub reisen_bomb_shields: Option<u64>,
    pub time_in_chapter: u64,
    pub chapter_graze: u64,
    pub chapter_enemy_weight_spawned: Option<u64>,
    pub chapter_enemy_weight_destroyed: Option<u64>,
    pub pointdevice: u64,
    pub pointdevice_resets_total: u64,
    pub pointdevice_resets_chapter: u64,
}

/// Title-specific extension addresses (module-relative).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "title", rename_all = "lowercase")]
pub enum TitleLayout {
    Td(TdLayout),
    Ddc(DdcLayout),
    Lolk(LolkLayout),
}

impl TitleLayout {
    pub fn title(&self) -> GameTitle {
        match self {
            Self::Td(_) => GameTitle::Td,
            Self::Ddc(_) => GameTitle::Ddc,
            Self::Lolk(_) => GameTitle::Lolk,
        }
    }
}

/// Complete memory schema of one title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSchema {
    pub title: GameTitle,
    /// `game_mode` value while the game world is loaded
    pub game_world_mode: i32,
    pub globals: GlobalLayout,
    pub untracked: UntrackedLayout,
    pub list_node: NodeLayout,
    pub player: PlayerLayout,
    pub gui: GuiLayout,
    pub spellcard: SpellcardLayout,
    pub bomb: Option<BombLayout>,
    pub bullet: BulletLayout,
    pub enemy: EnemyLayout,
    pub item: ItemLayout,
    pub laser: LaserLayout,
    pub specific: TitleLayout,
}

impl GameSchema {
    /// Built-in schema for `title`.
    pub fn builtin(title: GameTitle) -> Self {
        match title {
            GameTitle::Td => builtin::td(),
            GameTitle::Ddc => builtin::ddc(),
            GameTitle::Lolk => builtin::lolk(),
        }
    }

    /// Load a schema from a TOML file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let schema = Self::from_toml_str(&content)?;
        info!(
            "Loaded {} schema from {}",
            schema.title,
            path.as_ref().display()
        );
        Ok(schema)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let schema: Self = toml::from_str(content)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject tables that would make the decoders misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.specific.title() != self.title {
            return Err(Error::InvalidSchema(format!(
                "title is {} but title-specific layout is for {}",
                self.title,
                self.specific.title()
            )));
        }
        if self.item.stride == 0 {
            return Err(Error::InvalidSchema("item stride is 0".to_string()));
        }
        if self.laser.curve.node_stride == 0 {
            return Err(Error::InvalidSchema(
                "curve laser node stride is 0".to_string(),
            ));
        }
        if self.item.types.is_empty() {
            return Err(Error::InvalidSchema("item type table is empty".to_string()));
        }
        Ok(())
    }
}
