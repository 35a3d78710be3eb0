use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::prelude::*;
use bevy::render::mesh::{MeshVertexAttribute, MeshVertexBufferLayoutRef};
use bevy::render::render_resource::{
    AsBindGroup, RenderPipelineDescriptor, ShaderRef, SpecializedMeshPipelineError, VertexFormat,
};
use constants::path::{EDGE_SHADER_PATH, NODE_SHADER_PATH};

/// Combined visibility flag per vertex (0 or 1).
pub const ATTRIBUTE_VISIBLE: MeshVertexAttribute =
    MeshVertexAttribute::new("Visible", 988_540_917, VertexFormat::Float32);

/// Node diameter in world units after LOD scaling.
pub const ATTRIBUTE_NODE_SIZE: MeshVertexAttribute =
    MeshVertexAttribute::new("NodeSize", 988_540_918, VertexFormat::Float32);

/// Billboard corner in `[-1, 1]^2`.
pub const ATTRIBUTE_CORNER: MeshVertexAttribute =
    MeshVertexAttribute::new("Corner", 988_540_919, VertexFormat::Float32x2);

/// Node billboards: reads `visible` and `size` straight from the mesh.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct NodeMaterial {
    #[uniform(0)]
    pub tint: LinearRgba,
}

impl Default for NodeMaterial {
    fn default() -> Self {
        Self { tint: LinearRgba::WHITE }
    }
}

impl Material for NodeMaterial {
    fn vertex_shader() -> ShaderRef {
        NODE_SHADER_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        NODE_SHADER_PATH.into()
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(1),
            ATTRIBUTE_VISIBLE.at_shader_location(2),
            ATTRIBUTE_NODE_SIZE.at_shader_location(3),
            ATTRIBUTE_CORNER.at_shader_location(4),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        // Billboards face the camera; winding depends on the view.
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}

/// Edge line list: reads `visible` straight from the mesh.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct EdgeMaterial {
    #[uniform(0)]
    pub tint: LinearRgba,
}

impl Default for EdgeMaterial {
    fn default() -> Self {
        Self { tint: LinearRgba::WHITE }
    }
}

impl Material for EdgeMaterial {
    fn vertex_shader() -> ShaderRef {
        EDGE_SHADER_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        EDGE_SHADER_PATH.into()
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(1),
            ATTRIBUTE_VISIBLE.at_shader_location(2),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        Ok(())
    }
}
