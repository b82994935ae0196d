use criterion::{criterion_group, criterion_main, Criterion};
use fleet_tracker::dashboard::{CameraMove, HeadlessSurface, MarkerReconciler};
use fleet_tracker::models::{Geofence, Location, MotionState, Vehicle};
use std::hint::black_box;
use std::time::Duration;

const FLEET_SIZE: usize = 1000;

fn fleet(tick: usize) -> Vec<Vehicle> {
    (0..FLEET_SIZE)
        .map(|i| Vehicle {
            id: format!("veh_{:04}", i),
            name: format!("Truck {}", i),
            plate: format!("FLT-{:04}", i),
            vehicle_type: "truck".to_string(),
            driver_id: None,
            // every tenth vehicle changes motion state each tick
            status: if i % 10 == 0 && tick % 2 == 1 {
                MotionState::Moving
            } else {
                MotionState::Stopped
            },
            is_locked: false,
            location: Location {
                lat: 37.0 + i as f64 * 0.001 + tick as f64 * 0.0001,
                lng: -122.0,
            },
            speed: 0,
            fuel_level: Some(50),
            tracker_id: Some(format!("imei-{}", i)),
            geofence: Geofence::default(),
            last_update: None,
        })
        .collect()
}

fn benchmark_reconcile(c: &mut Criterion) {
    let camera = CameraMove {
        zoom: 16.0,
        duration: Duration::from_millis(1500),
    };
    let even = fleet(0);
    let odd = fleet(1);

    let mut group = c.benchmark_group("reconcile_1000_vehicles");

    group.bench_function("initial_draw", |b| {
        b.iter(|| {
            let mut reconciler = MarkerReconciler::new(camera);
            let mut surface = HeadlessSurface::new();
            reconciler.reconcile(black_box(&even), None, &mut surface)
        })
    });

    // Steady state: positions move, a tenth of the fleet flips state.
    group.bench_function("steady_state_tick", |b| {
        let mut reconciler = MarkerReconciler::new(camera);
        let mut surface = HeadlessSurface::new();
        reconciler.reconcile(&even, None, &mut surface);
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let snapshot = if flip { &odd } else { &even };
            reconciler.reconcile(black_box(snapshot), Some("veh_0500"), &mut surface)
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_reconcile);
criterion_main!(benches);
