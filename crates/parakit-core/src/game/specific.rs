use serde::Serialize;

use super::Vec2;

/// Ten Desires extras.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TdSpecific {
    /// Life pieces needed for the next extend
    pub life_piece_req: Option<i32>,
    pub trance_active: bool,
    /// 0..=600; doubles as the remaining trance frames while active
    pub trance_meter: i32,
    pub chain_timer: i32,
    pub chain_counter: i32,
}

/// Double Dealing Character extras.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DdcSpecific {
    /// Non-2.0 bonus count; a life piece drops on every multiple of 5
    pub bonus_count: i32,
    /// 1.0..=3.0
    pub player_scale: f32,
    /// -1.0..=1.0 on each axis
    pub seija_flip: Vec2,
}

/// Legacy of Lunatic Kingdom extras.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LolkSpecific {
    pub item_graze_slowdown_factor: f32,
    pub reisen_bomb_shields: Option<i32>,
    pub time_in_chapter: i32,
    pub chapter_graze: i32,
    pub chapter_enemy_weight_spawned: Option<i32>,
    pub chapter_enemy_weight_destroyed: Option<i32>,
    pub in_pointdevice: bool,
    pub pointdevice_resets_total: i32,
    pub pointdevice_resets_chapter: i32,
}

/// Per-title extension of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "title", rename_all = "lowercase")]
pub enum GameSpecific {
    Td(TdSpecific),
    Ddc(DdcSpecific),
    Lolk(LolkSpecific),
}
