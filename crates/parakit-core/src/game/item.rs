use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use super::Vec2;

/// Item kinds shared by the supported titles.
///
/// The numeric code of each kind differs per title; see
/// [`crate::schema::ItemLayout::types`].
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
pub enum ItemType {
    Power,
    Point,
    BigPower,
    LifePiece,
    Life,
    BombPiece,
    Bomb,
    FullPower,
    Cancel,
    Piv,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: u64,
    pub item_type: ItemType,
    pub state: i32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub alive_timer: Option<i32>,
}
