use crate::error::Result;
use crate::game::UntrackedValues;
use crate::memory::ReadMemory;
use crate::memory::layout::limits::REPLAY_NAME_LEN;
use crate::schema::GameSchema;

/// Read the per-run values that are not part of a snapshot.
pub fn read_untracked<R: ReadMemory + ?Sized>(
    reader: &R,
    schema: &GameSchema,
) -> Result<UntrackedValues> {
    let u = &schema.untracked;
    let int = |address: u64| reader.read_int(address, 4, true).map(|v| v as i32);

    Ok(UntrackedValues {
        rng_seed: int(u.rng_seed)?,
        game_speed: reader.read_float(u.game_speed, true)?,
        visual_rng: int(u.visual_rng)?,
        replay_filename: reader.read_string(u.replay_filename, REPLAY_NAME_LEN, true)?,
        character: int(u.character)?,
        subshot: int(u.subshot)?,
        difficulty: int(u.difficulty)?,
        rank: int(schema.globals.rank)?,
        stage: int(u.stage)?,
    })
}
