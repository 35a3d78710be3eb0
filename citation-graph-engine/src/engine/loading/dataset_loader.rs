use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::path::{DATASET_PATH, SETTINGS_PATH};

use crate::engine::geometry::GraphDataset;
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::lod::LodController;
use crate::engine::settings::EngineSettings;
use crate::engine::visibility::{TimeTravel, VisibilityEngine};

#[derive(Resource, Default)]
pub struct DatasetLoader {
    pub settings: Option<Handle<EngineSettings>>,
    pub dataset: Option<Handle<GraphDataset>>,
}

pub fn start_loading(mut loader: ResMut<DatasetLoader>, asset_server: Res<AssetServer>) {
    info!("Loading settings from {} and dataset from {}", SETTINGS_PATH, DATASET_PATH);
    loader.settings = Some(asset_server.load(SETTINGS_PATH));
    loader.dataset = Some(asset_server.load(DATASET_PATH));
}

/// Copy the loaded settings into the live resources. A missing or invalid
/// settings file is not fatal: the defaults stay in place.
pub fn resolve_settings(
    loader: Res<DatasetLoader>,
    asset_server: Res<AssetServer>,
    settings_assets: Res<Assets<EngineSettings>>,
    mut progress: ResMut<LoadingProgress>,
    mut lod: ResMut<LodController>,
    mut commands: Commands,
) {
    if progress.settings_resolved {
        return;
    }
    let Some(handle) = loader.settings.as_ref() else {
        return;
    };

    let settings = if let Some(settings) = settings_assets.get(handle) {
        info!("Engine settings loaded");
        settings.clone()
    } else if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
        warn!("Engine settings unavailable ({}), using defaults", err);
        EngineSettings::default()
    } else {
        return;
    };

    lod.set_settings(settings.lod.clone(), settings.pacing.clone());
    commands.insert_resource(VisibilityEngine::new(settings.visibility.edge_cluster_policy));
    commands.insert_resource(TimeTravel::new(
        settings.visibility.default_from_year,
        settings.visibility.default_to_year,
        settings.visibility.time_travel_years_per_second,
    ));
    commands.insert_resource(settings);
    progress.settings_resolved = true;
}

pub fn poll_dataset(
    loader: Res<DatasetLoader>,
    asset_server: Res<AssetServer>,
    datasets: Res<Assets<GraphDataset>>,
    mut progress: ResMut<LoadingProgress>,
) {
    if progress.dataset_loaded || progress.failed.is_some() {
        return;
    }
    let Some(handle) = loader.dataset.as_ref() else {
        return;
    };

    if let Some(dataset) = datasets.get(handle) {
        info!(
            "Dataset loaded: {} nodes, {} edges",
            dataset.nodes.len(),
            dataset.edges.len()
        );
        progress.dataset_loaded = true;
    } else if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
        error!("Failed to load dataset {}: {}", DATASET_PATH, err);
        progress.failed = Some(err.to_string());
    }
}
