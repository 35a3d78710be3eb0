pub mod camera;
pub mod core;
pub mod geometry;
pub mod loading;
pub mod lod;
pub mod render;
pub mod settings;
pub mod spatial;
pub mod systems;
pub mod visibility;
