//! Headless walkthrough: walk, fly, inspect in free-fly, nudge a prim with
//! the gizmo, and watch map tiles change tier as the camera moves.
//!
//! Run with `RUST_LOG=debug cargo run --example walkthrough [config.toml]`.

use anyhow::{Context, Result};
use cgmath::{Point3, Vector2, Vector3};
use futures::future::BoxFuture;
use futures::FutureExt;
use image::{Rgba, RgbaImage};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tileworld_engine::camera::world_to_screen;
use tileworld_engine::gizmo::select_object;
use tileworld_engine::input::{Modifiers, PointerButton};
use tileworld_engine::persistence::memory_store::{create_prim, create_region, get_prim};
use tileworld_engine::persistence::{PrimShape, PrimTransform};
use tileworld_engine::registry::{object_center, register_object, register_terrain};
use tileworld_engine::tiles::cache_stats;
use tileworld_engine::{
    create_engine_buffers, flush_pending_writes, load_config, run_frame, EngineConfig,
    EngineServices, FetchError, InputEvent, KeyCode, MemoryPrimStore, PrimStore, SurfaceGeometry,
    TileCoord, TileFetcher, TileLayout, TokioSpawner,
};

const FRAME: Duration = Duration::from_millis(16);

/// Checkerboard tiles tinted by coordinate
struct ProceduralFetcher {
    tile_pixels: u32,
}

impl TileFetcher for ProceduralFetcher {
    fn fetch_base_tile(&self, coord: TileCoord) -> BoxFuture<'static, Result<RgbaImage, FetchError>> {
        let size = self.tile_pixels;
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let tint = (coord.x.wrapping_mul(37) ^ coord.y.wrapping_mul(91)) as u8;
            Ok(RgbaImage::from_fn(size, size, |x, y| {
                let light = ((x / 8 + y / 8) % 2 == 0) as u8 * 60;
                Rgba([tint, 120 + light, coord.zoom.wrapping_mul(8), 255])
            }))
        }
        .boxed()
    }
}

fn hold(key: KeyCode) -> InputEvent {
    InputEvent::KeyDown(key)
}

fn release(key: KeyCode) -> InputEvent {
    InputEvent::KeyUp(key)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path).with_context(|| format!("loading {}", path))?,
        None => EngineConfig::default(),
    };

    let store = MemoryPrimStore::new();
    let region = create_region(&store, "harbor", 37.8044, -122.2712, 16);
    let crate_transform = PrimTransform {
        position: Point3::new(0.0, 0.5, -12.0),
        ..PrimTransform::default()
    };
    let prim = create_prim(&store, region.id, PrimShape::Box, &crate_transform, "#c08040")
        .context("creating demo prim")?;

    let layout = TileLayout {
        origin_x: 10_500,
        origin_y: 25_300,
        zoom: region.zoom,
        tile_world_size: config.tile_lod.tile_world_size,
    };
    let mut buffers =
        create_engine_buffers(config, layout, Instant::now()).context("creating engine buffers")?;
    register_terrain(
        &mut buffers.registry,
        SurfaceGeometry::HorizontalRect {
            height: 0.0,
            min_xz: [-2000.0, -2000.0],
            max_xz: [2000.0, 2000.0],
        },
    );
    register_object(&mut buffers.registry, prim.id, crate_transform, Vector3::new(0.5, 0.5, 0.5));

    let spawner = TokioSpawner::current().context("no tokio runtime")?;
    let store_handle: Arc<dyn PrimStore> = Arc::new(store.clone());
    let services = EngineServices {
        spawner: Arc::new(spawner),
        fetcher: Arc::new(ProceduralFetcher { tile_pixels: 64 }),
        store: store_handle,
    };

    let mut last = Instant::now();
    let mut handle_pixel = Vector2::new(0.0, 0.0);
    for frame in 0..600u32 {
        let mut events = Vec::new();
        match frame {
            0 => events.push(hold(KeyCode::KeyW)),
            120 => events.push(hold(KeyCode::KeyF)),
            121 => events.push(release(KeyCode::KeyF)),
            122 => events.push(hold(KeyCode::KeyE)),
            180 => {
                events.push(release(KeyCode::KeyE));
                events.push(release(KeyCode::KeyW));
            }
            200 => {
                events.push(InputEvent::ModifiersChanged(Modifiers {
                    alt: true,
                    ..Modifiers::default()
                }));
                events.push(InputEvent::PointerDown {
                    button: PointerButton::Primary,
                    position: Vector2::new(640.0, 360.0),
                });
            }
            201 => {
                events.push(InputEvent::PointerUp {
                    button: PointerButton::Primary,
                    position: Vector2::new(640.0, 360.0),
                });
                events.push(InputEvent::ModifiersChanged(Modifiers::default()));
            }
            260 => events.push(hold(KeyCode::Escape)),
            261 => events.push(release(KeyCode::Escape)),
            262 => events.push(hold(KeyCode::KeyF)),
            263 => events.push(release(KeyCode::KeyF)),
            360 => {
                select_object(&mut buffers.gizmo, &mut buffers.registry, prim.id);
            }
            362 => {
                let handle = buffers.registry.handles.values().next().copied();
                let center = object_center(&buffers.registry, prim.id);
                if let (Some(handle), Some(center)) = (handle, center) {
                    if let Some(pixel) = world_to_screen(
                        &buffers.camera.transform,
                        &buffers.camera.projection,
                        center + handle.offset,
                    ) {
                        handle_pixel = pixel;
                        events.push(InputEvent::PointerDown {
                            button: PointerButton::Primary,
                            position: pixel,
                        });
                    }
                }
            }
            363..=380 => events.push(InputEvent::PointerMove {
                position: handle_pixel + Vector2::new((frame - 362) as f32 * 5.0, 0.0),
            }),
            381 => events.push(InputEvent::PointerUp {
                button: PointerButton::Primary,
                position: handle_pixel + Vector2::new(90.0, 0.0),
            }),
            _ => {}
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;
        let output = run_frame(&mut buffers, &events, now, dt, &services);

        if let Some(change) = output.selection {
            log::info!("[Demo] Selection: {:?}", change);
        }
        for event in &output.write_events {
            log::info!("[Demo] Write: {:?}", event);
        }
        if frame % 60 == 0 {
            log::info!(
                "[Demo] frame {} avatar=({:.1}, {:.1}, {:.1}) flying={} camera={:?} tiles={} in {:?}",
                frame,
                output.avatar.position.x,
                output.avatar.position.y,
                output.avatar.position.z,
                output.avatar.is_flying,
                buffers.context.camera_mode,
                output.stats.tiles.visible,
                output.stats.total_time,
            );
        }

        tokio::time::sleep(FRAME).await;
    }

    flush_pending_writes(&mut buffers, &services);
    tokio::time::sleep(Duration::from_millis(50)).await;
    run_frame(&mut buffers, &[], Instant::now(), 0.0, &services);

    let stats = cache_stats(&buffers.tiles);
    log::info!(
        "[Demo] Cache: {} textures ({} high, {} medium, {} low), {} KiB",
        stats.entries,
        stats.high,
        stats.medium,
        stats.low,
        stats.bytes / 1024
    );
    if let Some(record) = get_prim(&store, prim.id) {
        log::info!("[Demo] Stored prim position: {:?}", record.position);
    }
    println!("{}", serde_json::to_string_pretty(&buffers.writes.stats)?);
    Ok(())
}
