//! photon-run — end-to-end run of the hit engine on synthetic detections.
//!
//! A Rayon pool plays the role of the simulation workers: each event emits a
//! burst of correlated photons (a "decay" seen by several sensors at once)
//! plus uncorrelated dark hits.  Every worker buffers hits on its own thread,
//! the pool merges at end of run, and the main thread prints per-sensor
//! counts and the coincidence multiplicity of every module.
//!
//! Set `RUST_LOG=debug` to watch the per-thread merges.

use std::time::Instant;

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{info, trace};
use tracing_subscriber::EnvFilter;

use om_analysis::HitAnalysis;
use om_core::{AnalysisConfig, HitRecord, HitResult, ModuleId, PulseResponse, SensorId, Vec3};
use om_store::{HitHandle, HitManager};

// ── Constants ─────────────────────────────────────────────────────────────────

/// (sensor count) per module: one 24-PMT module and one single-PMT module.
const MODULES:          [usize; 2] = [24, 1];
const EVENTS:           u64        = 20_000;
const WORKERS:          usize      = 4;
const SEED:             u64        = 42;
/// Events are spread uniformly over this many nanoseconds of detector time.
const RUN_DURATION_NS:  f64        = 1.0e9;
const DARK_HITS:        usize      = 2;
const TIME_WINDOW_NS:   f64        = 20.0;

/// 64-bit fractional golden-ratio constant for per-event seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── Synthetic producer ────────────────────────────────────────────────────────

fn photon(
    rng:          &mut SmallRng,
    event_id:     u64,
    hit_time:     f64,
    sensor_count: usize,
) -> HitRecord {
    let sensor = rng.gen_range(0..sensor_count) as u16;
    let flight_time = rng.gen_range(0.5..15.0);
    let direction = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), -1.0);
    let global_position = Vec3::new(rng.gen_range(-0.2..0.2), rng.gen_range(-0.2..0.2), 0.3);
    HitRecord {
        event_id,
        hit_time,
        flight_time,
        path_length:         flight_time * 0.2,
        energy:              rng.gen_range(2.0e-6..4.0e-6),
        sensor:              SensorId(sensor),
        direction,
        local_position:      Vec3::new(global_position.x, global_position.y, 0.0),
        global_position,
        generation_distance: global_position.length(),
        response:            PulseResponse {
            charge:                rng.gen_range(0.5..1.5),
            transit_time:          rng.gen_range(-2.0..2.0),
            detection_probability: rng.gen_range(0.0..1.0),
        },
    }
}

/// Emit every hit of one event on the calling worker thread.
fn simulate_event(handle: &HitHandle, event_id: u64) -> HitResult<()> {
    let mut rng = SmallRng::seed_from_u64(SEED ^ event_id.wrapping_mul(MIXING_CONSTANT));
    let event_time = rng.gen_range(0.0..RUN_DURATION_NS);

    for (index, &sensor_count) in MODULES.iter().enumerate() {
        let module = ModuleId(index as u32);

        let burst = rng.gen_range(0..=sensor_count.min(6));
        for _ in 0..burst {
            let t = event_time + rng.gen_range(0.0..TIME_WINDOW_NS / 2.0);
            handle.append_hit(module, photon(&mut rng, event_id, t, sensor_count))?;
        }
        for _ in 0..DARK_HITS {
            let t = rng.gen_range(0.0..RUN_DURATION_NS);
            handle.append_hit(module, photon(&mut rng, event_id, t, sensor_count))?;
        }
    }

    let counts = handle.thread_module_hit_counts()?;
    trace!(event_id, ?counts, "event simulated");
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== photon-run — optical-module hit engine ===");
    println!("Events: {EVENTS}  |  Workers: {WORKERS}  |  Seed: {SEED}");
    println!();

    // 1. Detector setup: modules placed one after another.
    let manager = HitManager::new();
    for &sensor_count in &MODULES {
        let module = manager.next_module_index();
        manager.register_sensor_count(module, sensor_count);
    }
    info!(modules = manager.number_of_modules(), "detector registered");

    // 2. Run the workers.  Each pool thread merges its buffer at the end.
    let pool = rayon::ThreadPoolBuilder::new().num_threads(WORKERS).build()?;
    let handle = manager.handle();
    let t0 = Instant::now();
    let merged = pool.install(|| handle.run_workers(0..EVENTS, simulate_event))?;
    println!("Merged {merged} hits in {:.3} s", t0.elapsed().as_secs_f64());
    println!();

    // 3. Analysis.
    let config = AnalysisConfig { time_window: TIME_WINDOW_NS, weighted_counts: false };
    for module in manager.modules() {
        let summary = manager.summarize(module, &config)?;
        let weighted = manager.count_hits(module, true)?;
        let sensors = summary.counts.len() - 1;

        println!("{module}: {} hits", summary.hits);
        println!("{:<8} {:>10} {:>12}", "Sensor", "Hits", "Expected");
        println!("{}", "-".repeat(32));
        for s in 0..sensors {
            println!("{:<8} {:>10} {:>12.1}", s, summary.counts[s], weighted[s]);
        }
        println!("{:<8} {:>10} {:>12.1}", "total", summary.counts[sensors], weighted[sensors]);

        let multiplicity: Vec<String> =
            summary.multiplicity.iter().map(u64::to_string).collect();
        println!("multiplicity ({TIME_WINDOW_NS} ns): {}", multiplicity.join(" "));
        println!();
    }

    manager.shutdown();
    Ok(())
}
