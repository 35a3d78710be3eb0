/// Graph dataset produced by the layout pipeline, relative to the asset root.
pub const DATASET_PATH: &str = "data/citations.graph.json";

/// Optional engine settings; defaults apply when the file is missing.
pub const SETTINGS_PATH: &str = "config/engine.settings.json";

/// Billboard shader for nodes.
pub const NODE_SHADER_PATH: &str = "shaders/graph_nodes.wgsl";

/// Line shader for edges.
pub const EDGE_SHADER_PATH: &str = "shaders/graph_edges.wgsl";
