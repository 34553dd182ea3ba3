use serde::Serialize;

use super::{Bullet, Enemy, GameSpecific, Item, Laser, Vec2};

/// RGB8 capture of the game window's client area.
#[derive(Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    /// Row-major, tightly packed RGB triples
    pub rgb: Vec<u8>,
}

impl Screenshot {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 3) as usize;
        Some([self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]])
    }
}

impl std::fmt::Debug for Screenshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screenshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// The spell card being declared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spellcard {
    /// `None` when the schema has no offset for it
    pub spell_id: Option<i32>,
    pub capture_bonus: i32,
}

/// One immutable snapshot of the target at a single instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameState {
    pub frame_stage: i32,
    pub frame_global: i32,
    pub stage_chapter: Option<i32>,
    /// Index within a sequence capture; `None` for single-shot
    pub seq_frame_id: Option<u32>,
    /// Seconds since the sequence started; `None` for single-shot
    pub seq_real_time: Option<f64>,
    pub pause_state: i32,
    pub game_mode: i32,
    pub score: i64,
    pub lives: i32,
    pub life_pieces: i32,
    pub bombs: i32,
    pub bomb_pieces: i32,
    pub power: i32,
    pub piv: i32,
    pub graze: i32,
    pub boss_timer: f64,
    /// `None` outside of spell cards, when the schema can tell
    pub spellcard: Option<Spellcard>,
    pub rank: i32,
    pub input: i32,
    pub rng: i32,
    pub player_position: Vec2,
    pub player_hitbox_rad: Option<f32>,
    pub player_iframes: i32,
    pub player_focused: bool,
    pub bomb_state: Option<i32>,
    pub bullets: Option<Vec<Bullet>>,
    pub enemies: Option<Vec<Enemy>>,
    pub items: Option<Vec<Item>>,
    pub lasers: Option<Vec<Laser>>,
    #[serde(skip)]
    pub screen: Option<Screenshot>,
    pub game_specific: Option<GameSpecific>,
}

impl GameState {
    pub fn boss_present(&self) -> bool {
        self.enemies
            .as_ref()
            .is_some_and(|enemies| enemies.iter().any(Enemy::is_boss))
    }
}

/// Join the boss timer's whole-seconds and milliseconds reads as text.
///
/// The game keeps the two parts in separate integers and the timer is
/// reported as `"{seconds}.{millis}"` parsed back as a float, so `(1, 5)`
/// gives `1.5` rather than `1.005`. Existing consumers depend on exactly this
/// value. Text that does not parse (a negative fractional part) falls back to
/// the whole seconds.
pub fn compose_boss_timer(seconds: i32, millis: i32) -> f64 {
    format!("{}.{}", seconds, millis)
        .parse()
        .unwrap_or(seconds as f64)
}

/// Per-run values that are not worth tracking per frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UntrackedValues {
    pub rng_seed: i32,
    pub game_speed: f32,
    pub visual_rng: i32,
    pub replay_filename: String,
    pub character: i32,
    pub subshot: i32,
    pub difficulty: i32,
    pub rank: i32,
    pub stage: i32,
}
