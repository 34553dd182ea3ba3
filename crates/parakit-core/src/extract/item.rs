use tracing::debug;

use crate::error::Result;
use crate::game::Item;
use crate::memory::ReadMemory;
use crate::schema::GameSchema;

/// Decode the item slot at `address`.
///
/// Returns `Ok(None)` for empty slots (state 0) and for item codes the
/// schema does not map.
pub fn decode_item<R: ReadMemory + ?Sized>(
    reader: &R,
    schema: &GameSchema,
    address: u64,
) -> Result<Option<Item>> {
    let layout = &schema.item;

    let state = reader.read_i32(address + layout.state)?;
    if state == 0 {
        return Ok(None);
    }

    let code = reader.read_i32(address + layout.item_type)?;
    let Some(item_type) = layout.item_type(code) else {
        return Ok(None);
    };

    Ok(Some(Item {
        id: address,
        item_type,
        state,
        position: reader.read_pair(address + layout.position)?,
        velocity: reader.read_pair(address + layout.velocity)?,
        alive_timer: reader.read_i32_at(address, layout.alive_timer)?,
    }))
}

/// Scan the fixed item slot array of the manager at `manager`.
pub fn extract_items<R: ReadMemory + ?Sized>(
    reader: &R,
    schema: &GameSchema,
    manager: u64,
) -> Vec<Item> {
    let layout = &schema.item;
    let array = manager + layout.array;

    (0..u64::from(layout.slot_count))
        .map(|index| array + index * layout.stride)
        .filter_map(|slot| match decode_item(reader, schema, slot) {
            Ok(item) => item,
            Err(e) => {
                debug!("Skipping item slot {:#x}: {}", slot, e);
                None
            }
        })
        .collect()
}
