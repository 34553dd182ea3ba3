use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::extract::{
    decode_specific, extract_bullets, extract_enemies, extract_items, extract_lasers,
};
use crate::game::{GameState, Spellcard, compose_boss_timer};
use crate::memory::ReadMemory;
use crate::schema::GameSchema;
use crate::window::ScreenCapture;

/// Which optional parts of a snapshot to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFlags {
    pub bullets: bool,
    pub enemies: bool,
    pub items: bool,
    pub lasers: bool,
    pub screenshots: bool,
}

impl Default for ExtractionFlags {
    fn default() -> Self {
        Self {
            bullets: true,
            enemies: true,
            items: true,
            lasers: true,
            screenshots: false,
        }
    }
}

impl ExtractionFlags {
    /// Scalars only.
    pub const NONE: Self = Self {
        bullets: false,
        enemies: false,
        items: false,
        lasers: false,
        screenshots: false,
    };
}

/// Manager and singleton addresses resolved at the start of one snapshot.
#[derive(Debug, Clone, Copy)]
struct Managers {
    player: u64,
    bullets: u64,
    enemies: u64,
    items: u64,
    lasers: u64,
    spellcard: u64,
    gui: u64,
}

/// Assembles [`GameState`] snapshots from target memory.
pub struct SnapshotBuilder<'a, R: ReadMemory + ?Sized> {
    reader: &'a R,
    schema: &'a GameSchema,
    flags: ExtractionFlags,
    screen: Option<&'a dyn ScreenCapture>,
}

impl<'a, R: ReadMemory + ?Sized> SnapshotBuilder<'a, R> {
    pub fn new(reader: &'a R, schema: &'a GameSchema, flags: ExtractionFlags) -> Self {
        Self {
            reader,
            schema,
            flags,
            screen: None,
        }
    }

    /// Attach a screen capturer used when screenshots are enabled.
    pub fn with_screen_capture(mut self, screen: &'a dyn ScreenCapture) -> Self {
        self.screen = Some(screen);
        self
    }

    pub fn reader(&self) -> &'a R {
        self.reader
    }

    pub fn schema(&self) -> &'a GameSchema {
        self.schema
    }

    pub fn flags(&self) -> ExtractionFlags {
        self.flags
    }

    fn global(&self, address: u64) -> Result<i32> {
        self.reader.read_int(address, 4, true).map(|v| v as i32)
    }

    fn global_ptr(&self, address: u64) -> Result<u64> {
        self.reader.read_ptr(self.reader.resolve(address, true))
    }

    /// In-stage frame counter, the value frame synchronization polls.
    pub fn frame_counter(&self) -> Result<i32> {
        self.global(self.schema.globals.time_in_stage)
    }

    pub fn game_mode(&self) -> Result<i32> {
        self.global(self.schema.globals.game_mode)
    }

    /// Whether the game world (as opposed to a menu) is loaded.
    pub fn in_game_world(&self) -> Result<bool> {
        Ok(self.game_mode()? == self.schema.game_world_mode)
    }

    /// `None` when the schema locates the active flag and it is clear.
    fn spellcard(&self, record: u64) -> Result<Option<Spellcard>> {
        let layout = &self.schema.spellcard;
        if self.reader.read_i32_at(record, layout.active)? == Some(0) {
            return Ok(None);
        }
        Ok(Some(Spellcard {
            spell_id: self.reader.read_i32_at(record, layout.spell_id)?,
            capture_bonus: self.reader.read_i32(record + layout.capture_bonus)?,
        }))
    }

    /// State of the bomb object; `None` without a bomb layout or while the
    /// object is not allocated.
    fn bomb_state(&self) -> Result<Option<i32>> {
        let Some(bomb) = &self.schema.bomb else {
            return Ok(None);
        };
        match self.global_ptr(bomb.pointer)? {
            0 => Ok(None),
            object => self.reader.read_i32(object + bomb.state).map(Some),
        }
    }

    fn managers(&self) -> Result<Managers> {
        let globals = &self.schema.globals;
        Ok(Managers {
            player: self.global_ptr(globals.player_pointer)?,
            bullets: self.global_ptr(globals.bullet_manager_pointer)?,
            enemies: self.global_ptr(globals.enemy_manager_pointer)?,
            items: self.global_ptr(globals.item_manager_pointer)?,
            lasers: self.global_ptr(globals.laser_manager_pointer)?,
            spellcard: self.global_ptr(globals.spellcard_pointer)?,
            gui: self.global_ptr(globals.gui_pointer)?,
        })
    }

    /// Build one snapshot.
    ///
    /// `seq_frame_id` and `seq_real_time` are `None` outside of a sequence.
    pub fn build(&self, seq_frame_id: Option<u32>, seq_real_time: Option<f64>) -> Result<GameState> {
        let reader = self.reader;
        let schema = self.schema;
        let globals = &schema.globals;
        let managers = self.managers()?;

        let player = &schema.player;
        let gui = &schema.gui;
        let boss_timer = compose_boss_timer(
            reader.read_i32(managers.gui + gui.boss_timer_seconds)?,
            reader.read_i32(managers.gui + gui.boss_timer_millis)?,
        );

        let flags = self.flags;
        let bullets = flags
            .bullets
            .then(|| live_or_empty(managers.bullets, |m| extract_bullets(reader, schema, m)));
        let enemies = flags
            .enemies
            .then(|| live_or_empty(managers.enemies, |m| extract_enemies(reader, schema, m)));
        let items = flags
            .items
            .then(|| live_or_empty(managers.items, |m| extract_items(reader, schema, m)));
        let lasers = flags
            .lasers
            .then(|| live_or_empty(managers.lasers, |m| extract_lasers(reader, schema, m)));

        let screen = match (flags.screenshots, self.screen) {
            (true, Some(capture)) => match capture.capture() {
                Ok(shot) => Some(shot),
                Err(e) => {
                    warn!("Screenshot failed: {}", e);
                    None
                }
            },
            _ => None,
        };

        let game_specific = match decode_specific(reader, schema, managers.player) {
            Ok(specific) => Some(specific),
            Err(e) => {
                debug!("Title-specific values unavailable: {}", e);
                None
            }
        };

        Ok(GameState {
            frame_stage: self.global(globals.time_in_stage)?,
            frame_global: self.global(globals.global_timer)?,
            stage_chapter: globals
                .stage_chapter
                .map(|address| self.global(address))
                .transpose()?,
            seq_frame_id,
            seq_real_time,
            pause_state: self.global(globals.pause_state)?,
            game_mode: self.global(globals.game_mode)?,
            score: i64::from(self.global(globals.score)?) * 10,
            lives: self.global(globals.lives)?,
            life_pieces: self.global(globals.life_pieces)?,
            bombs: self.global(globals.bombs)?,
            bomb_pieces: self.global(globals.bomb_pieces)?,
            power: self.global(globals.power)?,
            piv: self.global(globals.piv)? / 100,
            graze: self.global(globals.graze)?,
            boss_timer,
            spellcard: self.spellcard(managers.spellcard)?,
            rank: self.global(globals.rank)?,
            input: self.global(globals.input)?,
            rng: self.global(globals.rng)?,
            player_position: reader.read_pair(managers.player + player.position)?,
            player_hitbox_rad: reader.read_f32_at(managers.player, player.hitbox_radius)?,
            player_iframes: reader.read_i32(managers.player + player.iframes)?,
            player_focused: reader.read_i32(managers.player + player.focused)? == 1,
            bomb_state: self.bomb_state()?,
            bullets,
            enemies,
            items,
            lasers,
            screen,
            game_specific,
        })
    }
}

/// A null manager (e.g. between stages) has no entities.
fn live_or_empty<T>(manager: u64, extract: impl FnOnce(u64) -> Vec<T>) -> Vec<T> {
    if manager == 0 {
        Vec::new()
    } else {
        extract(manager)
    }
}
