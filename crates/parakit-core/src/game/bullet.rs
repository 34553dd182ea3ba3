use serde::Serialize;

use super::Vec2;

/// Title-specific extra bullet field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BulletExtension {
    #[default]
    None,
    /// Frames before the bullet becomes visible (and harmful)
    ShowDelay(i32),
    /// Frames until the bullet can be grazed again
    GrazeTimer(i32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bullet {
    pub id: u64,
    pub position: Vec2,
    pub velocity: Vec2,
    pub speed: f32,
    pub angle: f32,
    /// 1.0 for titles without bullet scaling
    pub scale: f32,
    pub hitbox_radius: f32,
    pub iframes: i32,
    /// `None` when the schema has no offset for it
    pub is_active: Option<bool>,
    pub alive_timer: Option<i32>,
    pub extension: BulletExtension,
    pub bullet_type: u16,
    pub color: u16,
}

impl Bullet {
    pub fn show_delay(&self) -> Option<i32> {
        match self.extension {
            BulletExtension::ShowDelay(frames) => Some(frames),
            _ => None,
        }
    }

    pub fn graze_timer(&self) -> Option<i32> {
        match self.extension {
            BulletExtension::GrazeTimer(frames) => Some(frames),
            _ => None,
        }
    }
}
