use crate::error::Result;
use crate::game::{DdcSpecific, GameSpecific, LolkSpecific, TdSpecific};
use crate::memory::ReadMemory;
use crate::schema::{GameSchema, TitleLayout};

/// Decode the title-specific block of a snapshot.
///
/// `player` is the already resolved player record; DDC reads its scale there.
pub fn decode_specific<R: ReadMemory + ?Sized>(
    reader: &R,
    schema: &GameSchema,
    player: u64,
) -> Result<GameSpecific> {
    let int = |address: u64| reader.read_int(address, 4, true).map(|v| v as i32);
    let located = |address: Option<u64>| address.map(|address| int(address)).transpose();

    let specific = match &schema.specific {
        TitleLayout::Td(td) => GameSpecific::Td(TdSpecific {
            life_piece_req: located(td.life_piece_req)?,
            trance_active: int(td.trance_active)? != 0,
            trance_meter: int(td.trance_meter)?,
            chain_timer: int(td.chain_timer)?,
            chain_counter: int(td.chain_counter)?,
        }),
        TitleLayout::Ddc(ddc) => {
            let player_scale = match schema.player.scale {
                Some(offset) => reader.read_f32(player + offset)?,
                None => 1.0,
            };
            // The Seija object only exists during her fight
            let anm = reader.read_ptr(reader.resolve(ddc.seija_anm_pointer, true))?;
            let seija_flip = if anm == 0 {
                (1.0, 1.0)
            } else {
                reader.read_pair(anm + ddc.seija_flip)?
            };
            GameSpecific::Ddc(DdcSpecific {
                bonus_count: int(ddc.bonus_count)?,
                player_scale,
                seija_flip,
            })
        }
        TitleLayout::Lolk(lolk) => GameSpecific::Lolk(LolkSpecific {
            item_graze_slowdown_factor: reader.read_float(lolk.item_graze_slowdown_factor, true)?,
            reisen_bomb_shields: located(lolk.reisen_bomb_shields)?,
            time_in_chapter: int(lolk.time_in_chapter)?,
            chapter_graze: int(lolk.chapter_graze)?,
            chapter_enemy_weight_spawned: located(lolk.chapter_enemy_weight_spawned)?,
            chapter_enemy_weight_destroyed: located(lolk.chapter_enemy_weight_destroyed)?,
            in_pointdevice: int(lolk.pointdevice)? != 0,
            pointdevice_resets_total: int(lolk.pointdevice_resets_total)?,
            pointdevice_resets_chapter: int(lolk.pointdevice_resets_chapter)?,
        }),
    };
    Ok(specific)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockMemoryBuilder;
    use crate::schema::GameTitle;

    const BASE: u64 = 0x40_0000;

    #[test]
    fn test_td_trance() {
        let schema = GameSchema::builtin(GameTitle::Td);
        let TitleLayout::Td(td) = &schema.specific else {
            unreachable!()
        };
        let reader = MockMemoryBuilder::new()
            .base_address(BASE)
            .write_i32(BASE + td.trance_active, 1)
            .write_i32(BASE + td.trance_meter, 450)
            .write_i32(BASE + td.chain_timer, 0)
            .write_i32(BASE + td.chain_counter, 3)
            .build();

        let GameSpecific::Td(specific) = decode_specific(&reader, &schema, 0).unwrap() else {
            panic!("expected td block");
        };
        assert!(specific.trance_active);
        assert_eq!(specific.trance_meter, 450);
        assert_eq!(specific.chain_counter, 3);
        assert_eq!(specific.life_piece_req, None);
    }

    #[test]
    fn test_td_life_piece_requirement_when_located() {
        let mut schema = GameSchema::builtin(GameTitle::Td);
        let TitleLayout::Td(td) = &mut schema.specific else {
            unreachable!()
        };
        td.life_piece_req = Some(0xBE7FC);
        let td = td.clone();
        let reader = MockMemoryBuilder::new()
            .base_address(BASE)
            .write_i32(BASE + 0xBE7FC, 5)
            .write_i32(BASE + td.trance_active, 0)
            .write_i32(BASE + td.trance_meter, 0)
            .write_i32(BASE + td.chain_timer, 0)
            .write_i32(BASE + td.chain_counter, 0)
            .build();

        let GameSpecific::Td(specific) = decode_specific(&reader, &schema, 0).unwrap() else {
            panic!("expected td block");
        };
        assert_eq!(specific.life_piece_req, Some(5));
    }

    #[test]
    fn test_ddc_without_seija() {
        let schema = GameSchema::builtin(GameTitle::Ddc);
        let TitleLayout::Ddc(ddc) = &schema.specific else {
            unreachable!()
        };
        let player = 0x9000;
        let reader = MockMemoryBuilder::new()
            .base_address(BASE)
            .write_i32(BASE + ddc.bonus_count, 4)
            .write_ptr(BASE + ddc.seija_anm_pointer, 0)
            .write_f32(player + schema.player.scale.unwrap(), 2.0)
            .build();

        let GameSpecific::Ddc(specific) = decode_specific(&reader, &schema, player).unwrap() else {
            panic!("expected ddc block");
        };
        assert_eq!(specific.bonus_count, 4);
        assert_eq!(specific.player_scale, 2.0);
        assert_eq!(specific.seija_flip, (1.0, 1.0));
    }

    #[test]
    fn test_ddc_seija_flip() {
        let schema = GameSchema::builtin(GameTitle::Ddc);
        let TitleLayout::Ddc(ddc) = &schema.specific else {
            unreachable!()
        };
        let player = 0x9000;
        let anm = 0x7000;
        let reader = MockMemoryBuilder::new()
            .base_address(BASE)
            .write_i32(BASE + ddc.bonus_count, 0)
            .write_ptr(BASE + ddc.seija_anm_pointer, anm)
            .write_pair(anm + ddc.seija_flip, (-1.0, 0.5))
            .write_f32(player + schema.player.scale.unwrap(), 1.0)
            .build();

        let GameSpecific::Ddc(specific) = decode_specific(&reader, &schema, player).unwrap() else {
            panic!("expected ddc block");
        };
        assert_eq!(specific.seija_flip, (-1.0, 0.5));
    }

    #[test]
    fn test_lolk_pointdevice() {
        let schema = GameSchema::builtin(GameTitle::Lolk);
        let TitleLayout::Lolk(lolk) = &schema.specific else {
            unreachable!()
        };
        let reader = MockMemoryBuilder::new()
            .base_address(BASE)
            .write_f32(BASE + lolk.item_graze_slowdown_factor, 0.5)
            .write_i32(BASE + lolk.time_in_chapter, 120)
            .write_i32(BASE + lolk.chapter_graze, 8)
            .write_i32(BASE + lolk.pointdevice, 1)
            .write_i32(BASE + lolk.pointdevice_resets_total, 2)
            .write_i32(BASE + lolk.pointdevice_resets_chapter, 1)
            .build();

        let GameSpecific::Lolk(specific) = decode_specific(&reader, &schema, 0).unwrap() else {
            panic!("expected lolk block");
        };
        assert!(specific.in_pointdevice);
        assert_eq!(specific.item_graze_slowdown_factor, 0.5);
        assert_eq!(specific.pointdevice_resets_total, 2);
        assert_eq!(specific.reisen_bomb_shields, None);
        assert_eq!(specific.chapter_enemy_weight_spawned, None);
    }

    #[test]
    fn test_lolk_chapter_weights_when_located() {
        let mut schema = GameSchema::builtin(GameTitle::Lolk);
        let TitleLayout::Lolk(lolk) = &mut schema.specific else {
            unreachable!()
        };
        lolk.reisen_bomb_shields = Some(0xE9000);
        lolk.chapter_enemy_weight_spawned = Some(0xE9004);
        lolk.chapter_enemy_weight_destroyed = Some(0xE9008);
        let lolk = lolk.clone();
        let reader = MockMemoryBuilder::new()
            .base_address(BASE)
            .write_i32(BASE + 0xE9000, 3)
            .write_i32(BASE + 0xE9004, 40)
            .write_i32(BASE + 0xE9008, 25)
            .write_f32(BASE + lolk.item_graze_slowdown_factor, 1.0)
            .write_i32(BASE + lolk.time_in_chapter, 0)
            .write_i32(BASE + lolk.chapter_graze, 0)
            .write_i32(BASE + lolk.pointdevice, 0)
            .write_i32(BASE + lolk.pointdevice_resets_total, 0)
            .write_i32(BASE + lolk.pointdevice_resets_chapter, 0)
            .build();

        let GameSpecific::Lolk(specific) = decode_specific(&reader, &schema, 0).unwrap() else {
            panic!("expected lolk block");
        };
        assert_eq!(specific.reisen_bomb_shields, Some(3));
        assert_eq!(specific.chapter_enemy_weight_spawned, Some(40));
        assert_eq!(specific.chapter_enemy_weight_destroyed, Some(25));
    }
}
