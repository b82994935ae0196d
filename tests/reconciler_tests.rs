// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marker reconciliation tests.
//!
//! These pin the rendering contract of the dashboard map: positions move
//! every tick, icons are rebuilt only on visual state changes, and the
//! camera flies exactly once per selection.

use fleet_tracker::dashboard::{
    CameraMove, Dashboard, DashboardCommand, HeadlessSurface, MarkerColor, MarkerReconciler,
};
use fleet_tracker::models::{Location, MotionState, Vehicle};
use std::time::Duration;

mod common;

fn camera() -> CameraMove {
    CameraMove {
        zoom: 16.0,
        duration: Duration::from_millis(1500),
    }
}

fn at(mut vehicle: Vehicle, lat: f64, lng: f64) -> Vehicle {
    vehicle.location = Location { lat, lng };
    vehicle
}

#[test]
fn test_first_tick_creates_markers() {
    let mut reconciler = MarkerReconciler::new(camera());
    let mut surface = HeadlessSurface::new();

    let stats = reconciler.reconcile(
        &[common::test_vehicle("a", None), common::test_vehicle("b", None)],
        None,
        &mut surface,
    );

    assert_eq!(stats.created, 2);
    assert_eq!(stats.moved, 0);
    assert_eq!(stats.restyled, 0);
    assert_eq!(surface.marker_count(), 2);
    assert!(reconciler.contains("a") && reconciler.contains("b"));
}

#[test]
fn test_location_only_ticks_never_restyle() {
    let mut reconciler = MarkerReconciler::new(camera());
    let mut surface = HeadlessSurface::new();
    let base = common::test_vehicle("a", None);

    reconciler.reconcile(&[base.clone()], None, &mut surface);

    for tick in 1..=50 {
        let stats = reconciler.reconcile(
            &[at(base.clone(), 40.0 + tick as f64 * 0.001, -74.0)],
            None,
            &mut surface,
        );
        assert_eq!(stats.moved, 1);
        assert_eq!(stats.restyled, 0);
    }

    let counters = surface.counters();
    assert_eq!(counters.created, 1);
    assert_eq!(counters.moved, 50);
    assert_eq!(counters.restyled, 0);

    let handle = reconciler.handle_of("a").unwrap();
    assert!((surface.position_of(handle).unwrap().lat - 40.05).abs() < 1e-9);
}

#[test]
fn test_lock_flip_restyles_exactly_once() {
    let mut reconciler = MarkerReconciler::new(camera());
    let mut surface = HeadlessSurface::new();
    let mut vehicle = common::test_vehicle("a", None);
    let other = common::test_vehicle("b", None);

    reconciler.reconcile(&[vehicle.clone(), other.clone()], None, &mut surface);
    reconciler.reconcile(&[vehicle.clone(), other.clone()], None, &mut surface);

    vehicle.is_locked = true;
    let stats = reconciler.reconcile(&[vehicle.clone(), other.clone()], None, &mut surface);
    assert_eq!(stats.restyled, 1);

    for _ in 0..5 {
        let stats = reconciler.reconcile(&[vehicle.clone(), other.clone()], None, &mut surface);
        assert_eq!(stats.restyled, 0);
    }

    let locked = reconciler.handle_of("a").unwrap();
    let untouched = reconciler.handle_of("b").unwrap();
    assert_eq!(surface.restyles_of(locked), Some(1));
    assert_eq!(surface.restyles_of(untouched), Some(0));
    assert_eq!(
        surface.appearance_of(locked).unwrap().color,
        MarkerColor::Locked
    );
}

#[test]
fn test_motion_change_restyles() {
    let mut reconciler = MarkerReconciler::new(camera());
    let mut surface = HeadlessSurface::new();
    let mut vehicle = common::test_vehicle("a", None);

    reconciler.reconcile(&[vehicle.clone()], None, &mut surface);
    vehicle.status = MotionState::Moving;
    let stats = reconciler.reconcile(&[vehicle.clone()], None, &mut surface);

    assert_eq!(stats.restyled, 1);
    let handle = reconciler.handle_of("a").unwrap();
    assert_eq!(
        surface.appearance_of(handle).unwrap().color,
        MarkerColor::Moving
    );
}

#[test]
fn test_selection_flies_once() {
    let mut reconciler = MarkerReconciler::new(camera());
    let mut surface = HeadlessSurface::new();
    let vehicles = [common::test_vehicle("a", None), common::test_vehicle("b", None)];

    reconciler.reconcile(&vehicles, None, &mut surface);
    assert_eq!(surface.counters().fly_tos, 0);

    let stats = reconciler.reconcile(&vehicles, Some("b"), &mut surface);
    assert_eq!(stats.flown_to.as_deref(), Some("b"));
    assert_eq!(stats.restyled, 1);

    for tick in 0..20 {
        let moved = [
            vehicles[0].clone(),
            at(vehicles[1].clone(), 41.0 + tick as f64, -73.0),
        ];
        let stats = reconciler.reconcile(&moved, Some("b"), &mut surface);
        assert_eq!(stats.flown_to, None);
        assert_eq!(stats.restyled, 0);
    }

    assert_eq!(surface.counters().fly_tos, 1);
    let (target, camera) = surface.last_fly_to().unwrap();
    assert_eq!(target.lat, 40.0);
    assert_eq!(camera.zoom, 16.0);
}

#[test]
fn test_deselect_does_not_fly() {
    let mut reconciler = MarkerReconciler::new(camera());
    let mut surface = HeadlessSurface::new();
    let vehicles = [common::test_vehicle("a", None)];

    reconciler.reconcile(&vehicles, Some("a"), &mut surface);
    let flies_after_select = surface.counters().fly_tos;

    let stats = reconciler.reconcile(&vehicles, None, &mut surface);
    assert_eq!(stats.flown_to, None);
    assert_eq!(stats.restyled, 1);
    assert_eq!(surface.counters().fly_tos, flies_after_select);

    // Reselecting is a new transition.
    let stats = reconciler.reconcile(&vehicles, Some("a"), &mut surface);
    assert_eq!(stats.flown_to.as_deref(), Some("a"));
}

#[test]
fn test_switching_selection_flies_to_new_vehicle() {
    let mut reconciler = MarkerReconciler::new(camera());
    let mut surface = HeadlessSurface::new();
    let vehicles = [
        common::test_vehicle("a", None),
        at(common::test_vehicle("b", None), 10.0, 10.0),
    ];

    reconciler.reconcile(&vehicles, Some("a"), &mut surface);
    let stats = reconciler.reconcile(&vehicles, Some("b"), &mut surface);

    assert_eq!(stats.flown_to.as_deref(), Some("b"));
    // old selection loses its glow, new one gains it
    assert_eq!(stats.restyled, 2);
    assert_eq!(surface.last_fly_to().unwrap().0.lat, 10.0);
}

#[test]
fn test_vanished_vehicle_is_removed_and_stays_removed() {
    let mut reconciler = MarkerReconciler::new(camera());
    let mut surface = HeadlessSurface::new();
    let a = common::test_vehicle("a", None);
    let b = common::test_vehicle("b", None);

    reconciler.reconcile(&[a.clone(), b.clone()], None, &mut surface);
    let b_handle = reconciler.handle_of("b").unwrap();

    let stats = reconciler.reconcile(&[a.clone()], None, &mut surface);
    assert_eq!(stats.removed, 1);
    assert!(!reconciler.contains("b"));
    assert!(reconciler.projection_of("b").is_none());
    assert!(surface.position_of(b_handle).is_none());

    let stats = reconciler.reconcile(&[a.clone()], None, &mut surface);
    assert_eq!(stats.removed, 0);
    assert_eq!(stats.created, 0);
    assert_eq!(surface.marker_count(), 1);
}

#[test]
fn test_reappearing_vehicle_gets_fresh_marker() {
    let mut reconciler = MarkerReconciler::new(camera());
    let mut surface = HeadlessSurface::new();
    let a = common::test_vehicle("a", None);

    reconciler.reconcile(&[a.clone()], None, &mut surface);
    let first = reconciler.handle_of("a").unwrap();
    reconciler.reconcile(&[], None, &mut surface);

    let stats = reconciler.reconcile(&[at(a, 1.0, 2.0)], None, &mut surface);
    assert_eq!(stats.created, 1);
    let second = reconciler.handle_of("a").unwrap();
    assert_ne!(first, second);
    assert_eq!(surface.position_of(second).unwrap().lat, 1.0);
}

#[test]
fn test_dashboard_select_redraws_and_locate_is_independent() {
    let mut dashboard = Dashboard::new(HeadlessSurface::new(), camera());
    dashboard.apply_snapshot(vec![
        common::test_vehicle("a", None),
        common::test_vehicle("b", None),
    ]);

    let stats = dashboard
        .handle(DashboardCommand::Select("a".to_string()))
        .unwrap();
    assert_eq!(stats.flown_to.as_deref(), Some("a"));

    // Selecting again changes nothing.
    assert!(dashboard
        .handle(DashboardCommand::Select("a".to_string()))
        .is_none());

    assert!(dashboard
        .handle(DashboardCommand::LocateMe(Location { lat: 1.0, lng: 1.0 }))
        .is_none());
    let me = dashboard.selection().my_location().unwrap();
    assert_eq!(dashboard.surface().marker_count(), 3);

    // Vehicles disappearing must not take the location marker with them.
    dashboard.apply_snapshot(vec![]);
    assert_eq!(dashboard.surface().marker_count(), 1);
    assert!(dashboard.surface().position_of(me).is_some());

    // Selection survives by ID across the gap.
    assert_eq!(dashboard.selected(), Some("a"));
    let stats = dashboard.apply_snapshot(vec![common::test_vehicle("a", None)]);
    assert_eq!(stats.created, 1);
    assert!(dashboard.reconciler().projection_of("a").unwrap().is_selected);

    let stats = dashboard.handle(DashboardCommand::Deselect).unwrap();
    assert_eq!(stats.flown_to, None);
    assert_eq!(dashboard.surface().counters().fly_tos, 2);

    dashboard.clear();
    assert_eq!(dashboard.surface().marker_count(), 0);
}
