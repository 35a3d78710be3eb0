//! Bevy meshes and materials for the graph.
//!
//! Nodes are camera-facing billboards expanded from per-node buffers; edges
//! are a line list whose index buffer is the LOD controller's front buffer.
//! Both shaders discard fragments whose `visible` attribute is 0.

/// Mesh construction and attribute rewrites from the flat buffers.
pub mod graph_mesh;

/// Node and edge materials with the custom vertex attributes.
pub mod material;

pub use graph_mesh::{GraphEdges, GraphMeshes, GraphNodes, create_edge_mesh, create_node_mesh};
pub use material::{ATTRIBUTE_CORNER, ATTRIBUTE_NODE_SIZE, ATTRIBUTE_VISIBLE, EdgeMaterial, NodeMaterial};
