use tracing::debug;

use crate::error::Result;
use crate::extract::list::ListWalker;
use crate::game::{Enemy, EnemyStatus};
use crate::memory::ReadMemory;
use crate::schema::GameSchema;

/// Decode the enemy record at `address`.
///
/// Returns `Ok(None)` for records the flag table marks as not real; no other
/// field of such a record is read.
pub fn decode_enemy<R: ReadMemory + ?Sized>(
    reader: &R,
    schema: &GameSchema,
    address: u64,
) -> Result<Option<Enemy>> {
    let layout = &schema.enemy;

    let flags = reader.read_u32(address + layout.flags)?;
    if layout.flag_table.is_not_real(flags) {
        return Ok(None);
    }

    let mut status = EnemyStatus::default();
    for flag in layout.flag_table.matching(flags) {
        status.set(flag);
    }

    Ok(Some(Enemy {
        id: address,
        position: reader.read_pair(address + layout.position)?,
        hurtbox: reader.read_pair(address + layout.hurtbox)?,
        hitbox: reader.read_pair(address + layout.hitbox)?,
        status,
        subboss_id: reader.read_i32(address + layout.subboss_id)?,
        rotation: reader.read_f32(address + layout.rotation)?,
        anm_page: reader.read_i32_at(address, layout.anm_page)?,
        anm_id: reader.read_i32_at(address, layout.anm_id)?,
        alive_timer: reader.read_i32_at(address, layout.alive_timer)?,
        score_reward: reader.read_i32(address + layout.score_reward)?,
        hp: reader.read_i32(address + layout.hp)?,
        hp_max: reader.read_i32(address + layout.hp_max)?,
        iframes: reader.read_i32(address + layout.iframes)?,
    }))
}

/// Decode every real enemy linked from the manager at `manager`.
pub fn extract_enemies<R: ReadMemory + ?Sized>(
    reader: &R,
    schema: &GameSchema,
    manager: u64,
) -> Vec<Enemy> {
    ListWalker::from_pointer(reader, manager + schema.enemy.list, schema.list_node)
        .filter_map(|address| match decode_enemy(reader, schema, address) {
            Ok(enemy) => enemy,
            Err(e) => {
                debug!("Skipping enemy at {:#x}: {}", address, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::game::HitboxShape;
    use crate::memory::MockMemoryBuilder;
    use crate::schema::GameTitle;

    pub(crate) fn write_enemy(
        builder: MockMemoryBuilder,
        schema: &GameSchema,
        address: u64,
        flags: u32,
    ) -> MockMemoryBuilder {
        let layout = &schema.enemy;
        let mut builder = builder;
        for (offset, value) in [(layout.anm_page, 2), (layout.anm_id, 17), (layout.alive_timer, 240)] {
            if let Some(offset) = offset {
                builder = builder.write_i32(address + offset, value);
            }
        }
        builder
            .write_u32(address + layout.flags, flags)
            .write_pair(address + layout.position, (0.0, 100.0))
            .write_pair(address + layout.hurtbox, (32.0, 32.0))
            .write_pair(address + layout.hitbox, (24.0, 24.0))
            .write_i32(address + layout.subboss_id, -1)
            .write_f32(address + layout.rotation, 0.0)
            .write_i32(address + layout.score_reward, 10000)
            .write_i32(address + layout.hp, 800)
            .write_i32(address + layout.hp_max, 1000)
            .write_i32(address + layout.iframes, 0)
    }

    #[test]
    fn test_not_real_enemy_reads_only_flags() {
        let schema = GameSchema::builtin(GameTitle::Ddc);
        let reader = write_enemy(MockMemoryBuilder::new(), &schema, 0x20000, 0x1).build();

        assert_eq!(decode_enemy(&reader, &schema, 0x20000).unwrap(), None);
        assert_eq!(reader.reads(), vec![(0x20000 + schema.enemy.flags, 4)]);
    }

    #[test]
    fn test_boss_flag() {
        let schema = GameSchema::builtin(GameTitle::Ddc);
        let reader = write_enemy(MockMemoryBuilder::new(), &schema, 0x20000, 0x80_0000)
            .build();
        let boss = decode_enemy(&reader, &schema, 0x20000).unwrap().unwrap();
        assert!(boss.is_boss());
        assert_eq!(boss.hp, 800);
        assert_eq!(boss.hp_max, 1000);
        assert_eq!(boss.anm_id, None);

        let reader = write_enemy(MockMemoryBuilder::new(), &schema, 0x20000, 0x10).build();
        let fairy = decode_enemy(&reader, &schema, 0x20000).unwrap().unwrap();
        assert!(!fairy.is_boss());
        assert!(fairy.status.invincible);
    }

    #[test]
    fn test_located_animation_fields() {
        let mut schema = GameSchema::builtin(GameTitle::Ddc);
        schema.enemy.anm_page = Some(0x1270);
        schema.enemy.anm_id = Some(0x1274);
        schema.enemy.alive_timer = Some(0x1278);
        let reader = write_enemy(MockMemoryBuilder::new(), &schema, 0x20000, 0).build();

        let enemy = decode_enemy(&reader, &schema, 0x20000).unwrap().unwrap();
        assert_eq!(enemy.anm_page, Some(2));
        assert_eq!(enemy.anm_id, Some(17));
        assert_eq!(enemy.alive_timer, Some(240));
    }

    #[test]
    fn test_rectangle_shape() {
        let schema = GameSchema::builtin(GameTitle::Ddc);
        let reader = write_enemy(MockMemoryBuilder::new(), &schema, 0x20000, 0x1000).build();
        let enemy = decode_enemy(&reader, &schema, 0x20000).unwrap().unwrap();
        assert_eq!(enemy.shape(), HitboxShape::Rectangle);
    }

    #[test]
    fn test_extract_excludes_not_real() {
        let schema = GameSchema::builtin(GameTitle::Ddc);
        let manager = 0x1000;

        let builder = MockMemoryBuilder::new()
            .write_ptr(manager + schema.enemy.list, 0x3000)
            .write_ptr(0x3000, 0x20000)
            .write_ptr(0x3004, 0x3100)
            .write_ptr(0x3100, 0x30000)
            .write_ptr(0x3104, 0);
        let builder = write_enemy(builder, &schema, 0x20000, 0x1);
        let reader = write_enemy(builder, &schema, 0x30000, 0x0).build();

        let enemies = extract_enemies(&reader, &schema, manager);
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].id, 0x30000);
    }
}
