use serde::Serialize;

use super::Vec2;

/// Segment laser travelling along a fixed angle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineLaser {
    pub start_pos: Vec2,
    pub init_angle: f32,
    pub max_length: f32,
    pub init_speed: f32,
    pub distance: f32,
}

/// Telegraphed laser that grows out of its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfiniteLaser {
    pub start_pos: Vec2,
    pub origin_vel: Vec2,
    pub default_angle: f32,
    pub angular_vel: f32,
    pub init_length: f32,
    pub max_length: f32,
    pub max_width: f32,
    pub default_speed: f32,
    pub start_time: i32,
    pub expand_time: i32,
    pub active_time: i32,
    pub shrink_time: i32,
    pub distance: f32,
}

/// One segment joint of a curvy laser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveNode {
    pub position: Vec2,
    /// Only the head node carries a velocity.
    pub velocity: Option<Vec2>,
    pub angle: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveLaser {
    pub max_length: i32,
    pub distance: f32,
    pub nodes: Vec<CurveNode>,
}

impl CurveLaser {
    pub fn head(&self) -> Option<&CurveNode> {
        self.nodes.first()
    }
}

/// Variant payload of a laser, selected by the record's type discriminant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaserKind {
    Line(LineLaser),
    Infinite(InfiniteLaser),
    Curve(CurveLaser),
    Beam,
}

impl LaserKind {
    pub const LINE: i32 = 0;
    pub const INFINITE: i32 = 1;
    pub const CURVE: i32 = 2;
    pub const BEAM: i32 = 3;

    /// Discriminant value as stored by the game.
    pub fn discriminant(&self) -> i32 {
        match self {
            Self::Line(_) => Self::LINE,
            Self::Infinite(_) => Self::INFINITE,
            Self::Curve(_) => Self::CURVE,
            Self::Beam => Self::BEAM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Laser {
    pub id: u64,
    pub state: i32,
    /// Frames since the laser spawned
    pub alive_timer: i32,
    pub position: Vec2,
    pub angle: f32,
    pub length: f32,
    pub width: f32,
    pub speed: f32,
    pub iframes: i32,
    pub sprite: u16,
    pub color: u16,
    pub kind: LaserKind,
}

impl Laser {
    pub fn laser_type(&self) -> i32 {
        self.kind.discriminant()
    }
}
