//! Frame tick - the single synchronous per-frame update
//!
//! Stage order is fixed: input, gizmo press routing, avatar, camera, gizmo
//! drag, selection, persistence, tiles. The camera therefore always follows
//! the pose the avatar published this frame, and the gizmo claims a press
//! before the camera can start rotating on it.
//!
//! Nothing here returns an error. Failed background work is logged by the
//! stage that polls it and the previous known-good state is kept.

use crate::avatar::update_avatar;
use crate::camera::{build_camera_uniform, update_camera_rig};
use crate::context::advance_context;
use crate::engine_buffers::{EngineBuffers, EngineServices, FrameOutput, FrameStats};
use crate::gizmo::{handle_click, route_press, update_gizmo};
use crate::input::{aggregate_frame, InputEvent};
use crate::persistence::{
    diff_transform, flush_all, flush_due, poll_write_results, queue_update, record_transform,
    WriteQueueEvent,
};
use crate::physics::GroundQuery;
use crate::registry::set_object_transform;
use crate::tiles::{poll_fetches, update_visible_tiles, visible_tiles_around};
use std::time::Instant;

/// Advance the engine by one frame
pub fn run_frame(
    buffers: &mut EngineBuffers,
    events: &[InputEvent],
    now: Instant,
    delta_time: f32,
    services: &EngineServices,
) -> FrameOutput {
    let frame_start = Instant::now();
    advance_context(&mut buffers.context, now, delta_time);
    let dt = buffers.context.delta_time;
    let mut stats = FrameStats {
        frame_number: buffers.context.frame_number,
        ..FrameStats::default()
    };

    // Input
    let stage = Instant::now();
    let intents = aggregate_frame(&mut buffers.input, events);
    stats.input_time = stage.elapsed();

    // Gizmo press routing
    let stage = Instant::now();
    route_press(
        &mut buffers.gizmo,
        &mut buffers.context,
        &intents,
        &buffers.camera,
        &buffers.registry,
    );
    let mut gizmo_time = stage.elapsed();

    // Avatar
    let stage = Instant::now();
    let avatar = {
        let mut ground = GroundQuery {
            probe: &mut buffers.ground,
            registry: &buffers.registry,
            config: &buffers.config.ground_probe,
            now,
        };
        update_avatar(&mut buffers.avatar, &intents, dt, &mut ground, &buffers.config.avatar)
    };
    stats.avatar_time = stage.elapsed();

    // Camera
    let stage = Instant::now();
    let camera = {
        let mut ground = GroundQuery {
            probe: &mut buffers.ground,
            registry: &buffers.registry,
            config: &buffers.config.ground_probe,
            now,
        };
        update_camera_rig(
            &mut buffers.camera,
            &mut buffers.context,
            &intents,
            &avatar,
            &mut ground,
            &buffers.config,
        )
    };
    stats.camera_time = stage.elapsed();

    // Gizmo drag and selection
    let stage = Instant::now();
    let drag = update_gizmo(
        &mut buffers.gizmo,
        &mut buffers.context,
        &intents,
        camera.position,
        &mut buffers.registry,
        &buffers.config.gizmo,
    );
    if let Some(output) = &drag {
        queue_update(
            &mut buffers.writes,
            output.target,
            diff_transform(&output.before, &output.after),
            now,
        );
    }
    let selection = handle_click(
        &mut buffers.gizmo,
        &buffers.context,
        &intents,
        &buffers.camera,
        &mut buffers.registry,
        &buffers.config.gizmo,
    );
    gizmo_time += stage.elapsed();
    stats.gizmo_time = gizmo_time;

    // Persistence
    let stage = Instant::now();
    stats.writes_started = flush_due(&mut buffers.writes, now, &services.store, services.spawner.as_ref());
    let write_events = poll_write_results(&mut buffers.writes);
    apply_write_events(buffers, &write_events);
    stats.persistence_time = stage.elapsed();

    // Tiles
    let stage = Instant::now();
    let mut tile_events = poll_fetches(&mut buffers.tiles, now, &buffers.config.tile_lod);
    let visible = visible_tiles_around(
        &buffers.tile_layout,
        camera.position,
        buffers.config.tile_lod.view_radius,
    );
    let (report, changed) = update_visible_tiles(
        &mut buffers.tiles,
        &visible,
        now,
        &services.fetcher,
        services.spawner.as_ref(),
        &buffers.config.tile_lod,
    );
    tile_events.extend(changed);
    stats.tiles = report;
    stats.tiles_time = stage.elapsed();

    stats.total_time = frame_start.elapsed();
    buffers.stats = stats;
    log::trace!(
        "[Frame] #{} {:?} tiles={} writes={}",
        stats.frame_number,
        stats.total_time,
        stats.tiles.visible,
        stats.writes_started
    );

    FrameOutput {
        avatar,
        camera,
        camera_uniform: build_camera_uniform(&buffers.camera),
        drag,
        selection,
        write_events,
        tile_events,
        stats,
    }
}

/// Reloaded records are authoritative; overwrite the scene copy
fn apply_write_events(buffers: &mut EngineBuffers, events: &[WriteQueueEvent]) {
    for event in events {
        if let WriteQueueEvent::Reloaded { prim_id, record } = event {
            if !set_object_transform(&mut buffers.registry, *prim_id, record_transform(record)) {
                log::debug!("[Frame] Reloaded prim {} is not in the scene", prim_id);
            }
        }
    }
}

/// Flush every pending write now, e.g. before shutdown
pub fn flush_pending_writes(buffers: &mut EngineBuffers, services: &EngineServices) -> usize {
    flush_all(&mut buffers.writes, &services.store, services.spawner.as_ref())
}
