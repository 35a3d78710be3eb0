// Standard library and external crates
use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

// Crate engine modules
use crate::engine::camera::{ViewportCamera, camera_controller};
use crate::engine::core::app_state::{
    AppState, transition_to_geometry_ready, transition_to_running, update_loading_frontend,
};
use crate::engine::core::window_config::create_window_config;
use crate::engine::geometry::{GraphDataset, GraphGeometry};
use crate::engine::loading::dataset_loader::{DatasetLoader, poll_dataset, resolve_settings, start_loading};
use crate::engine::loading::graph_creator::{build_graph_when_ready, spawn_graph_meshes};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::lod::LodController;
use crate::engine::render::{EdgeMaterial, NodeMaterial};
use crate::engine::settings::EngineSettings;
use crate::engine::systems::fps_tracking::fps_notification_system;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::fps_tracking::overlay_text_update_system;
use crate::engine::systems::frame_tick::{FrameCallbackQueue, lod_frame_tick, run_queued_lod_pass};
use crate::engine::systems::mesh_sync::sync_graph_meshes;
use crate::engine::systems::visibility_sync::{
    TimeTravelEvent, VisibilityFilterEvent, advance_time_travel, handle_time_travel_events,
    handle_visibility_events, visibility_keyboard_shortcuts,
};
use crate::engine::visibility::{TimeTravel, VisibilityEngine, VisibilitySettings};
// Web RPC
use crate::rpc::web_rpc::WebRpcPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(WebRpcPlugin)
        .add_plugins(CitationGraphPlugin)
        .insert_resource(ClearColor(Color::srgb(0.04, 0.04, 0.06)))
        .add_systems(Startup, setup)
        .add_systems(Update, visibility_keyboard_shortcuts.run_if(in_state(AppState::Running)));

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Update, overlay_text_update_system.run_if(in_state(AppState::Running)));
    }

    app
}

/// Graph data, visibility and LOD: everything except windowing and the page
/// bridge.
pub struct CitationGraphPlugin;

impl Plugin for CitationGraphPlugin {
    fn build(&self, app: &mut App) {
        let visibility_defaults = VisibilitySettings::default();

        app.init_state::<AppState>()
            // Registers the dataset and settings as loadable JSON assets.
            .add_plugins(JsonAssetPlugin::<GraphDataset>::new(&["graph.json"]))
            .add_plugins(JsonAssetPlugin::<EngineSettings>::new(&["settings.json"]))
            .add_plugins(MaterialPlugin::<NodeMaterial>::default())
            .add_plugins(MaterialPlugin::<EdgeMaterial>::default());

        // Live resources exist from the first frame so early UI events find
        // them; loading replaces them once settings resolve.
        app.init_resource::<LoadingProgress>()
            .init_resource::<DatasetLoader>()
            .init_resource::<EngineSettings>()
            .init_resource::<GraphGeometry>()
            .init_resource::<VisibilityEngine>()
            .init_resource::<LodController>()
            .init_resource::<FrameCallbackQueue>()
            .init_resource::<ViewportCamera>()
            .insert_resource(TimeTravel::new(
                visibility_defaults.default_from_year,
                visibility_defaults.default_to_year,
                visibility_defaults.time_travel_years_per_second,
            ))
            .add_event::<VisibilityFilterEvent>()
            .add_event::<TimeTravelEvent>();

        app.add_systems(Startup, start_loading)
            .add_systems(
                Update,
                (
                    resolve_settings,
                    poll_dataset,
                    build_graph_when_ready,
                    transition_to_geometry_ready,
                )
                    .chain()
                    .run_if(in_state(AppState::Loading)),
            )
            .add_systems(
                Update,
                (spawn_graph_meshes, transition_to_running)
                    .chain()
                    .run_if(in_state(AppState::GeometryReady)),
            )
            .add_systems(Update, update_loading_frontend.run_if(not(in_state(AppState::Running))));

        // Filter events are accepted in every state; the engine ignores them
        // until it is initialised.
        app.add_systems(
            Update,
            (handle_time_travel_events, advance_time_travel, handle_visibility_events).chain(),
        );

        app.add_systems(PreUpdate, run_queued_lod_pass.run_if(in_state(AppState::Running)))
            .add_systems(
                Update,
                (camera_controller, lod_frame_tick, fps_notification_system).run_if(in_state(AppState::Running)),
            )
            .add_systems(PostUpdate, sync_graph_meshes.run_if(in_state(AppState::Running)));
    }
}

fn spawn_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 20.0, 120.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands) {
    spawn_camera(&mut commands);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn create_native_overlays(commands: &mut Commands) {
    use crate::engine::core::app_state::OverlayText;

    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                OverlayText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
