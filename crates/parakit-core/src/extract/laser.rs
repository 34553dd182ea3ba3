use tracing::debug;

use crate::error::{Error, Result};
use crate::extract::list::ListWalker;
use crate::game::{CurveLaser, CurveNode, InfiniteLaser, Laser, LaserKind, LineLaser};
use crate::memory::ReadMemory;
use crate::memory::layout::limits::MAX_CURVE_NODES;
use crate::schema::{GameSchema, LaserLayout, NodeLayout};

/// Decode the laser record at `address`, base fields first and then the
/// payload selected by its type discriminant.
pub fn decode_laser<R: ReadMemory + ?Sized>(
    reader: &R,
    schema: &GameSchema,
    address: u64,
) -> Result<Laser> {
    let layout = &schema.laser;

    let discriminant = reader.read_i32(address + layout.kind)?;
    let kind = match discriminant {
        LaserKind::LINE => LaserKind::Line(decode_line(reader, layout, address)?),
        LaserKind::INFINITE => LaserKind::Infinite(decode_infinite(reader, layout, address)?),
        LaserKind::CURVE => LaserKind::Curve(decode_curve(reader, layout, address)?),
        LaserKind::BEAM => LaserKind::Beam,
        other => return Err(Error::UnknownLaserType(other)),
    };

    Ok(Laser {
        id: address,
        state: reader.read_i32(address + layout.state)?,
        alive_timer: reader.read_i32(address + layout.alive_timer)?,
        position: reader.read_pair(address + layout.position)?,
        angle: reader.read_f32(address + layout.angle)?,
        length: reader.read_f32(address + layout.length)?,
        width: reader.read_f32(address + layout.width)?,
        speed: reader.read_f32(address + layout.speed)?,
        iframes: reader.read_i32(address + layout.iframes)?,
        sprite: reader.read_u16(address + layout.sprite)?,
        color: reader.read_u16(address + layout.color)?,
        kind,
    })
}

fn decode_line<R: ReadMemory + ?Sized>(
    reader: &R,
    layout: &LaserLayout,
    address: u64,
) -> Result<LineLaser> {
    let line = &layout.line;
    Ok(LineLaser {
        start_pos: reader.read_pair(address + line.start_pos)?,
        init_angle: reader.read_f32(address + line.init_angle)?,
        max_length: reader.read_f32(address + line.max_length)?,
        init_speed: reader.read_f32(address + line.init_speed)?,
        distance: reader.read_f32(address + line.distance)?,
    })
}

fn decode_infinite<R: ReadMemory + ?Sized>(
    reader: &R,
    layout: &LaserLayout,
    address: u64,
) -> Result<InfiniteLaser> {
    let infinite = &layout.infinite;
    Ok(InfiniteLaser {
        start_pos: reader.read_pair(address + infinite.start_pos)?,
        origin_vel: reader.read_pair(address + infinite.origin_velocity)?,
        default_angle: reader.read_f32(address + infinite.default_angle)?,
        angular_vel: reader.read_f32(address + infinite.angular_velocity)?,
        init_length: reader.read_f32(address + infinite.init_length)?,
        max_length: reader.read_f32(address + infinite.max_length)?,
        max_width: reader.read_f32(address + infinite.max_width)?,
        default_speed: reader.read_f32(address + infinite.default_speed)?,
        start_time: reader.read_i32(address + infinite.start_time)?,
        expand_time: reader.read_i32(address + infinite.expand_time)?,
        active_time: reader.read_i32(address + infinite.active_time)?,
        shrink_time: reader.read_i32(address + infinite.shrink_time)?,
        distance: reader.read_f32(address + infinite.distance)?,
    })
}

fn decode_curve<R: ReadMemory + ?Sized>(
    reader: &R,
    layout: &LaserLayout,
    address: u64,
) -> Result<CurveLaser> {
    let curve = &layout.curve;

    let max_length = reader.read_i32(address + curve.max_length)?;
    if !(0..=MAX_CURVE_NODES).contains(&max_length) {
        return Err(Error::CurveNodeCount(max_length));
    }
    let distance = reader.read_f32(address + curve.distance)?;
    let array = reader.read_ptr(address + curve.node_array)?;

    let mut nodes = Vec::with_capacity(max_length as usize);
    for index in 0..max_length as u64 {
        let node = array + index * curve.node_stride;
        let velocity = if index == 0 {
            Some(reader.read_pair(node + curve.node_velocity)?)
        } else {
            None
        };
        nodes.push(CurveNode {
            position: reader.read_pair(node + curve.node_position)?,
            velocity,
            angle: reader.read_f32(node + curve.node_angle)?,
            speed: reader.read_f32(node + curve.node_speed)?,
        });
    }

    Ok(CurveLaser {
        max_length,
        distance,
        nodes,
    })
}

/// Decode every laser in the manager's chain.
///
/// Lasers link to each other directly; the last record of the chain is a
/// sentinel and is not decoded.
pub fn extract_lasers<R: ReadMemory + ?Sized>(
    reader: &R,
    schema: &GameSchema,
    manager: u64,
) -> Vec<Laser> {
    let layout = &schema.laser;
    let head = match reader.read_ptr(manager + layout.list) {
        Ok(head) => head,
        Err(e) => {
            debug!("Laser chain head unreadable: {}", e);
            return Vec::new();
        }
    };

    ListWalker::starting_at(reader, head, NodeLayout::intrusive(layout.next))
        .exclude_tail()
        .filter_map(|address| match decode_laser(reader, schema, address) {
            Ok(laser) => Some(laser),
            Err(e) => {
                debug!("Skipping laser at {:#x}: {}", address, e);
                None
            }
        })
        .collect()
}
