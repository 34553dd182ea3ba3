use tracing::debug;

use crate::error::Result;
use crate::extract::list::ListWalker;
use crate::game::{Bullet, BulletExtension};
use crate::memory::ReadMemory;
use crate::schema::{BulletExtensionLayout, GameSchema};

/// Decode the bullet record at `address`.
pub fn decode_bullet<R: ReadMemory + ?Sized>(
    reader: &R,
    schema: &GameSchema,
    address: u64,
) -> Result<Bullet> {
    let layout = &schema.bullet;

    let scale = match layout.scale {
        Some(offset) => reader.read_f32(address + offset)?,
        None => 1.0,
    };
    let extension = match layout.extension {
        BulletExtensionLayout::None => BulletExtension::None,
        BulletExtensionLayout::ShowDelay(offset) => {
            BulletExtension::ShowDelay(reader.read_i32(address + offset)?)
        }
        BulletExtensionLayout::GrazeTimer(offset) => {
            BulletExtension::GrazeTimer(reader.read_i32(address + offset)?)
        }
    };

    Ok(Bullet {
        id: address,
        position: reader.read_pair(address + layout.position)?,
        velocity: reader.read_pair(address + layout.velocity)?,
        speed: reader.read_f32(address + layout.speed)?,
        angle: reader.read_f32(address + layout.angle)?,
        scale,
        hitbox_radius: reader.read_f32(address + layout.hitbox_radius)?,
        iframes: reader.read_i32(address + layout.iframes)?,
        is_active: reader.read_i32_at(address, layout.active)?.map(|v| v != 0),
        alive_timer: reader.read_i32_at(address, layout.alive_timer)?,
        extension,
        bullet_type: reader.read_u16(address + layout.bullet_type)?,
        color: reader.read_u16(address + layout.color)?,
    })
}

/// Decode every bullet linked from the manager at `manager`.
pub fn extract_bullets<R: ReadMemory + ?Sized>(
    reader: &R,
    schema: &GameSchema,
    manager: u64,
) -> Vec<Bullet> {
    ListWalker::after_head(reader, manager + schema.bullet.list, schema.list_node)
        .filter_map(|address| match decode_bullet(reader, schema, address) {
            Ok(bullet) => Some(bullet),
            Err(e) => {
                debug!("Skipping bullet at {:#x}: {}", address, e);
                None
            }
        })
        .collect()
}
