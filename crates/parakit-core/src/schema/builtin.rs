//! Built-in schemas for the supported titles
//!
//! Global addresses are written as absolute addresses of the default image
//! base and stored module-relative, so they keep working if the loader
//! relocates the executable. Record offsets are relative to the record.
//! DDC is the reference layout; TD and LoLK override what differs.

use super::*;

const IMAGE_BASE: u64 = 0x40_0000;

const fn rel(address: u64) -> u64 {
    address - IMAGE_BASE
}

fn item_codes(codes: &[(i32, ItemType)]) -> Vec<ItemCode> {
    codes
        .iter()
        .map(|&(code, item_type)| ItemCode { code, item_type })
        .collect()
}

fn enemy_flag_table(not_real: u32, bits: &[(EnemyFlag, u32)]) -> EnemyFlagTable {
    EnemyFlagTable {
        not_real,
        bits: bits
            .iter()
            .map(|&(flag, mask)| FlagBit { flag, mask })
            .collect(),
    }
}

fn base_laser_layout() -> LaserLayout {
    LaserLayout {
        list: 0x5D0,
        next: 0x4,
        state: 0x10,
        kind: 0x14,
        alive_timer: 0x18,
        position: 0x54,
        angle: 0x6C,
        length: 0x70,
        width: 0x74,
        speed: 0x78,
        iframes: 0x80,
        sprite: 0x5C4,
        color: 0x5C8,
        line: LineLaserLayout {
            start_pos: 0x5D0,
            init_angle: 0x5DC,
            max_length: 0x5E4,
            init_speed: 0x5EC,
            distance: 0x5F0,
        },
        infinite: InfiniteLaserLayout {
            start_pos: 0x5D0,
            origin_velocity: 0x5DC,
            default_angle: 0x5E8,
            angular_velocity: 0x5EC,
            init_length: 0x5F0,
            max_length: 0x5F4,
            max_width: 0x5F8,
            default_speed: 0x5FC,
            start_time: 0x600,
            expand_time: 0x604,
            active_time: 0x608,
            shrink_time: 0x60C,
            distance: 0x614,
        },
        curve: CurveLaserLayout {
            max_length: 0x5D8,
            distance: 0x5DC,
            node_array: 0x14B4,
            node_stride: 0x1C,
            node_position: 0x0,
            node_velocity: 0xC,
            node_angle: 0x14,
            node_speed: 0x18,
        },
    }
}

pub(super) fn ddc() -> GameSchema {
    GameSchema {
        title: GameTitle::Ddc,
        game_world_mode: 7,
        globals: GlobalLayout {
            time_in_stage: rel(0x4F58B0),
            global_timer: rel(0x4F5894),
            pause_state: rel(0x4F7A0C),
            game_mode: rel(0x4F7A10),
            score: rel(0x4F5830),
            lives: rel(0x4F5864),
            life_pieces: rel(0x4F5868),
            bombs: rel(0x4F5870),
            bomb_pieces: rel(0x4F5874),
            power: rel(0x4F5858),
            piv: rel(0x4F584C),
            graze: rel(0x4F5840),
            rank: rel(0x4F58A8),
            input: rel(0x4D6884),
            rng: rel(0x4DB510),
            player_pointer: rel(0x4DB67C),
            bullet_manager_pointer: rel(0x4DB530),
            enemy_manager_pointer: rel(0x4DB544),
            item_manager_pointer: rel(0x4DB660),
            laser_manager_pointer: rel(0x4DB664),
            spellcard_pointer: rel(0x4DB534),
            gui_pointer: rel(0x4DB68C),
            stage_chapter: None,
        },
        untracked: UntrackedLayout {
            rng_seed: rel(0x4DB514),
            game_speed: rel(0x4D5E28),
            visual_rng: rel(0x4DB508),
            replay_filename: rel(0x4F8A50),
            character: rel(0x4F5828),
            subshot: rel(0x4F582C),
            difficulty: rel(0x4F5834),
            stage: rel(0x4F58A4),
        },
        list_node: NodeLayout::ZLIST,
        player: PlayerLayout {
            position: 0x5E0,
            iframes: 0x182C4,
            focused: 0x184DC,
            scale: Some(0x184B8),
            hitbox_radius: None,
        },
        gui: GuiLayout {
            boss_timer_seconds: 0x1A4,
            boss_timer_millis: 0x1A8,
        },
        spellcard: SpellcardLayout {
            active: None,
            spell_id: None,
            capture_bonus: 0x80,
        },
        bomb: None,
        bullet: BulletLayout {
            list: 0x7C,
            position: 0xBC0,
            velocity: 0xBCC,
            speed: 0xBD8,
            angle: 0xBDC,
            scale: Some(0x13BC),
            hitbox_radius: 0xBE0,
            iframes: 0x24,
            active: None,
            alive_timer: None,
            bullet_type: 0xDF0,
            color: 0xDF2,
            extension: BulletExtensionLayout::ShowDelay(0xDE8),
        },
        enemy: EnemyLayout {
            list: 0x180,
            flags: 0x5244,
            position: 0x120C,
            hurtbox: 0x1250,
            hitbox: 0x1258,
            subboss_id: 0x527C,
            rotation: 0x1260,
            anm_page: None,
            anm_id: None,
            alive_timer: None,
            score_reward: 0x5208,
            hp: 0x5204,
            hp_max: 0x5200,
            iframes: 0x5270,
            flag_table: enemy_flag_table(
                0x1,
                &[
                    (EnemyFlag::NoHurtbox, 0x2),
                    (EnemyFlag::NoHitbox, 0x4),
                    (EnemyFlag::Invincible, 0x10),
                    (EnemyFlag::IsRectangle, 0x1000),
                    (EnemyFlag::IsBoss, 0x80_0000),
                ],
            ),
        },
        item: ItemLayout {
            array: 0x14,
            slot_count: 2130,
            stride: 0xC18,
            state: 0xC0C,
            item_type: 0xC10,
            position: 0xBB4,
            velocity: 0xBC0,
            alive_timer: None,
            types: item_codes(&[
                (1, ItemType::Power),
                (2, ItemType::Point),
                (3, ItemType::BigPower),
                (4, ItemType::LifePiece),
                (5, ItemType::Life),
                (6, ItemType::BombPiece),
                (7, ItemType::Bomb),
                (8, ItemType::FullPower),
                (9, ItemType::Cancel),
            ]),
        },
        laser: base_laser_layout(),
        specific: TitleLayout::Ddc(DdcLayout {
            bonus_count: rel(0x4F5898),
            seija_anm_pointer: rel(0x4DB540),
            seija_flip: 0x60,
        }),
    }
}

pub(super) fn td() -> GameSchema {
    let reference = ddc();
    GameSchema {
        title: GameTitle::Td,
        globals: GlobalLayout {
            time_in_stage: rel(0x4BE838),
            global_timer: rel(0x4BE81C),
            pause_state: rel(0x4C0D48),
            game_mode: rel(0x4C0D4C),
            score: rel(0x4BE7C0),
            lives: rel(0x4BE7F4),
            life_pieces: rel(0x4BE7F8),
            bombs: rel(0x4BE800),
            bomb_pieces: rel(0x4BE804),
            power: rel(0x4BE7E8),
            piv: rel(0x4BE7DC),
            graze: rel(0x4BE7D0),
            rank: rel(0x4BE830),
            input: rel(0x4B3450),
            rng: rel(0x4B5BD0),
            player_pointer: rel(0x4C22C4),
            bullet_manager_pointer: rel(0x4C2174),
            enemy_manager_pointer: rel(0x4C2188),
            item_manager_pointer: rel(0x4C22A4),
            laser_manager_pointer: rel(0x4C22A8),
            spellcard_pointer: rel(0x4C2178),
            gui_pointer: rel(0x4C22D4),
            stage_chapter: None,
        },
        untracked: UntrackedLayout {
            rng_seed: rel(0x4B5BD4),
            game_speed: rel(0x4B29E8),
            visual_rng: rel(0x4B5BC8),
            replay_filename: rel(0x4C1F90),
            character: rel(0x4BE7B8),
            subshot: rel(0x4BE7BC),
            difficulty: rel(0x4BE7C4),
            stage: rel(0x4BE82C),
        },
        player: PlayerLayout {
            position: 0x5B8,
            iframes: 0x181A4,
            focused: 0x18398,
            scale: None,
            hitbox_radius: None,
        },
        bullet: BulletLayout {
            scale: None,
            extension: BulletExtensionLayout::None,
            ..reference.bullet
        },
        item: ItemLayout {
            stride: 0xBF0,
            state: 0xBE4,
            item_type: 0xBE8,
            position: 0xB8C,
            velocity: 0xB98,
            types: item_codes(&[
                (1, ItemType::Power),
                (2, ItemType::Point),
                (3, ItemType::BigPower),
                (4, ItemType::LifePiece),
                (5, ItemType::BombPiece),
                (6, ItemType::Life),
                (7, ItemType::Bomb),
                (8, ItemType::FullPower),
                (9, ItemType::Cancel),
            ]),
            ..reference.item
        },
        specific: TitleLayout::Td(TdLayout {
            life_piece_req: None,
            trance_active: rel(0x4BE824),
            trance_meter: rel(0x4BE828),
            chain_timer: rel(0x4BE80C),
            chain_counter: rel(0x4BE810),
        }),
        ..reference
    }
}

pub(super) fn lolk() -> GameSchema {
    let reference = ddc();
    GameSchema {
        title: GameTitle::Lolk,
        globals: GlobalLayout {
            time_in_stage: rel(0x4E73F0),
            global_timer: rel(0x4E73D4),
            pause_state: rel(0x4E9BE0),
            game_mode: rel(0x4E9BE4),
            score: rel(0x4E740C),
            lives: rel(0x4E7450),
            life_pieces: rel(0x4E7454),
            bombs: rel(0x4E745C),
            bomb_pieces: rel(0x4E7460),
            power: rel(0x4E7440),
            piv: rel(0x4E7434),
            graze: rel(0x4E741C),
            rank: rel(0x4E73E8),
            input: rel(0x4E6D00),
            rng: rel(0x4E9BB8),
            player_pointer: rel(0x4E9BB0),
            bullet_manager_pointer: rel(0x4E9A6C),
            enemy_manager_pointer: rel(0x4E9A80),
            item_manager_pointer: rel(0x4E9AA4),
            laser_manager_pointer: rel(0x4E9BA8),
            spellcard_pointer: rel(0x4E9A70),
            gui_pointer: rel(0x4E9BC0),
            stage_chapter: None,
        },
        untracked: UntrackedLayout {
            rng_seed: rel(0x4E9BBC),
            game_speed: rel(0x4E7374),
            visual_rng: rel(0x4E9BB4),
            replay_filename: rel(0x4EA950),
            character: rel(0x4E7404),
            subshot: rel(0x4E7408),
            difficulty: rel(0x4E7410),
            stage: rel(0x4E73E4),
        },
        player: PlayerLayout {
            position: 0x618,
            iframes: 0x165A8,
            focused: 0x16800,
            scale: None,
            hitbox_radius: None,
        },
        bullet: BulletLayout {
            scale: Some(0x13D8),
            extension: BulletExtensionLayout::GrazeTimer(0x650),
            ..reference.bullet
        },
        specific: TitleLayout::Lolk(LolkLayout {
            item_graze_slowdown_factor: rel(0x4E9BCC),
            reisen_bomb_shields: None,
            time_in_chapter: rel(0x4E7418),
            chapter_graze: rel(0x4E7420),
            chapter_enemy_weight_spawned: None,
            chapter_enemy_weight_destroyed: None,
            pointdevice: rel(0x4E7480),
            pointdevice_resets_total: rel(0x4E7484),
            pointdevice_resets_chapter: rel(0x4E7488),
        }),
        ..reference
    }
}
