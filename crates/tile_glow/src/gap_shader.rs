use bevy::asset::embedded_asset;
use bevy::color::ColorToComponents;
use bevy::pbr::{MaterialPipeline, MaterialPipelineKey, NotShadowCaster};
use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::render::mesh::MeshVertexBufferLayoutRef;
use bevy::render::render_resource::{
    AsBindGroup, RenderPipelineDescriptor, ShaderRef, SpecializedMeshPipelineError,
};

use crate::grid::GridLayout;
use crate::settings::{GapGlowSettings, GridSettings};

const SHADER_PATH: &str = "embedded://tile_glow/shaders/gap_glow.wgsl";

/// Pulsing line lattice drawn behind the tiles, so it shows through the gaps.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct GapGlowMaterial {
    #[uniform(0)]
    pub color: Vec4,
    /// x: time, y: intensity, z: line density
    #[uniform(1)]
    pub params: Vec4,
}

impl GapGlowMaterial {
    pub fn new(settings: &GapGlowSettings) -> Self {
        Self {
            color: settings.color.to_linear().to_vec4(),
            params: Vec4::new(0.0, settings.intensity, settings.line_density, 0.0),
        }
    }

    pub fn time(&self) -> f32 {
        self.params.x
    }

    pub fn set_time(&mut self, time: f32) {
        self.params.x = time;
    }
}

impl Material for GapGlowMaterial {
    fn fragment_shader() -> ShaderRef {
        SHADER_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Blend
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        _layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}

/// Marks the gap overlay plane.
#[derive(Component, Debug)]
pub struct GapOverlay;

pub struct GapOverlayPlugin;

impl Plugin for GapOverlayPlugin {
    fn build(&self, app: &mut App) {
        embedded_asset!(app, "shaders/gap_glow.wgsl");

        app.register_type::<GapGlowSettings>()
            .init_resource::<GapGlowSettings>()
            .add_plugins(MaterialPlugin::<GapGlowMaterial>::default())
            .add_systems(Startup, spawn_gap_overlay);
    }
}

/// World placement of the overlay: tilted like the grid, pushed back along world z.
pub fn overlay_transform(layout: &GridLayout, depth: f32) -> Transform {
    Transform::from_xyz(0.0, 0.0, depth).with_rotation(layout.rotation)
}

pub fn spawn_gap_overlay(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<GapGlowMaterial>>,
    grid_settings: Res<GridSettings>,
    settings: Res<GapGlowSettings>,
) {
    let layout = GridLayout::from(&*grid_settings);
    let half_extent = layout.extent() / 2.0;

    commands.spawn((
        Name::new("GapOverlay"),
        GapOverlay,
        Mesh3d(meshes.add(Plane3d::new(Vec3::Z, Vec2::splat(half_extent)).mesh())),
        MeshMaterial3d(materials.add(GapGlowMaterial::new(&settings))),
        overlay_transform(&layout, settings.depth),
        NotShadowCaster,
    ));
}
