use bevy::prelude::*;

use crate::engine::geometry::GraphGeometry;
use crate::engine::visibility::{ClusterSelection, EdgeClusterPolicy, PlaybackState, TimeTravel, VisibilityEngine};
use crate::rpc::web_rpc::WebRpcInterface;

/// Filter changes requested by the page, keyboard shortcuts or time travel.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum VisibilityFilterEvent {
    YearRange { from: i32, to: i32 },
    Clusters(ClusterSelection),
    EdgePolicy(EdgeClusterPolicy),
    Clear,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum TimeTravelEvent {
    Play,
    Pause,
    Reset,
    Configure { start_year: i32, end_year: i32 },
    SetSpeed(f32),
}

pub fn handle_visibility_events(
    mut events: EventReader<VisibilityFilterEvent>,
    mut geometry: ResMut<GraphGeometry>,
    mut visibility: ResMut<VisibilityEngine>,
    rpc_interface: Option<ResMut<WebRpcInterface>>,
) {
    let mut changed = false;
    for event in events.read() {
        match event {
            VisibilityFilterEvent::YearRange { from, to } => {
                visibility.update_year_visibility(&mut geometry, *from, *to);
            }
            VisibilityFilterEvent::Clusters(selection) => {
                visibility.update_cluster_visibility(&mut geometry, selection.clone());
            }
            VisibilityFilterEvent::EdgePolicy(policy) => {
                visibility.set_edge_cluster_policy(&mut geometry, *policy);
            }
            VisibilityFilterEvent::Clear => visibility.clear_filters(&mut geometry),
        }
        changed = true;
    }

    if !changed || !visibility.is_initialized() {
        return;
    }
    if let Some(mut rpc) = rpc_interface {
        let stats = visibility.latest_stats();
        rpc.send_notification(
            "visibility_changed",
            serde_json::json!({
                "stats": stats,
                "year_range": visibility.year_range(),
                "selected_clusters": visibility.selection().len(),
            }),
        );
    }
}

pub fn handle_time_travel_events(mut events: EventReader<TimeTravelEvent>, mut time_travel: ResMut<TimeTravel>) {
    for event in events.read() {
        match *event {
            TimeTravelEvent::Play => time_travel.play(),
            TimeTravelEvent::Pause => time_travel.pause(),
            TimeTravelEvent::Reset => time_travel.reset(),
            TimeTravelEvent::Configure { start_year, end_year } => time_travel.configure(start_year, end_year),
            TimeTravelEvent::SetSpeed(years_per_second) => time_travel.set_speed(years_per_second),
        }
    }
}

/// Turns playback progress into year filter events.
pub fn advance_time_travel(
    time: Res<Time>,
    mut time_travel: ResMut<TimeTravel>,
    mut filter_events: EventWriter<VisibilityFilterEvent>,
) {
    if let Some(range) = time_travel.tick(time.delta_secs()) {
        filter_events.write(VisibilityFilterEvent::YearRange {
            from: range.from,
            to: range.to,
        });
    }
}

/// Native shortcuts: space toggles playback, R rewinds, C clears filters.
pub fn visibility_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    time_travel: Res<TimeTravel>,
    mut time_travel_events: EventWriter<TimeTravelEvent>,
    mut filter_events: EventWriter<VisibilityFilterEvent>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        let event = if time_travel.state() == PlaybackState::Playing {
            TimeTravelEvent::Pause
        } else {
            TimeTravelEvent::Play
        };
        time_travel_events.write(event);
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        time_travel_events.write(TimeTravelEvent::Reset);
    }
    if keyboard.just_pressed(KeyCode::KeyC) {
        filter_events.write(VisibilityFilterEvent::Clear);
    }
}
