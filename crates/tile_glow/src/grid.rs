use bevy::prelude::*;
use bevy::utils::HashMap;

use crate::settings::GridSettings;
use crate::tween::{TileProperty, TweenValue};

/// Position of a tile in the lattice, `x` and `y` both in `[0, size)`.
///
/// Also tags the render entity of each tile.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[reflect(Component)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    /// Orthogonal neighbors first, then the diagonals.
    pub const NEIGHBOR_OFFSETS: [IVec2; 8] = [
        IVec2::new(1, 0),
        IVec2::new(-1, 0),
        IVec2::new(0, 1),
        IVec2::new(0, -1),
        IVec2::new(1, 1),
        IVec2::new(-1, -1),
        IVec2::new(1, -1),
        IVec2::new(-1, 1),
    ];

    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Shifts the coordinate, `None` when it would leave the positive quadrant.
    pub fn offset(self, by: IVec2) -> Option<Self> {
        let x = self.x.checked_add_signed(by.x)?;
        let y = self.y.checked_add_signed(by.y)?;
        Some(Self::new(x, y))
    }
}

/// Geometry of the lattice, shared by the builder, the picker and the spotlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub size: u32,
    pub tile_size: f32,
    pub gap: f32,
    /// Orientation of the grid root, tiles are laid out in its local XY plane
    pub rotation: Quat,
}

impl From<&GridSettings> for GridLayout {
    fn from(settings: &GridSettings) -> Self {
        Self {
            size: settings.size,
            tile_size: settings.tile_size,
            gap: settings.gap,
            rotation: Quat::from_rotation_x(settings.tilt_x) * Quat::from_rotation_z(settings.tilt_z),
        }
    }
}

impl GridLayout {
    /// Distance between the centers of two adjacent tiles.
    pub fn pitch(&self) -> f32 {
        self.tile_size + self.gap
    }

    pub const fn tile_count(&self) -> usize {
        (self.size as usize) * (self.size as usize)
    }

    /// Side length covered by the lattice, gaps included.
    pub fn extent(&self) -> f32 {
        self.size as f32 * self.pitch()
    }

    pub const fn contains(&self, coord: TileCoord) -> bool {
        coord.x < self.size && coord.y < self.size
    }

    /// Center of a tile in grid local space.
    pub fn position(&self, coord: TileCoord) -> Vec3 {
        let half = self.size as f32 / 2.0;
        Vec3::new(
            (coord.x as f32 - half) * self.pitch(),
            (coord.y as f32 - half) * self.pitch(),
            0.0,
        )
    }

    /// Center of a tile once the grid root is tilted, the root sits at the world origin.
    pub fn world_position(&self, coord: TileCoord) -> Vec3 {
        self.rotation * self.position(coord)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_rotation(self.rotation)
    }

    /// Tile covering a point of the grid plane, in grid local space.
    ///
    /// Points falling in the gaps between tiles or outside the lattice hit nothing.
    pub fn tile_at(&self, local: Vec2) -> Option<TileCoord> {
        let half = self.size as f32 / 2.0;
        let x = (local.x / self.pitch() + half).round();
        let y = (local.y / self.pitch() + half).round();
        let size = self.size as f32;
        if !(0.0..size).contains(&x) || !(0.0..size).contains(&y) {
            return None;
        }

        let coord = TileCoord::new(x as u32, y as u32);
        let reach = self.tile_size / 2.0;
        let distance = (local - self.position(coord).truncate()).abs();
        (distance.x <= reach && distance.y <= reach).then_some(coord)
    }
}

/// The animatable look of a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileAppearance {
    pub color: LinearRgba,
    pub emissive: LinearRgba,
    pub emissive_intensity: f32,
}

impl TileAppearance {
    pub const fn resting(color: LinearRgba) -> Self {
        Self {
            color,
            emissive: LinearRgba::BLACK,
            emissive_intensity: 0.0,
        }
    }

    pub const fn glowing(color: LinearRgba, intensity: f32) -> Self {
        Self {
            color,
            emissive: color,
            emissive_intensity: intensity,
        }
    }

    pub const fn get(&self, property: TileProperty) -> TweenValue {
        match property {
            TileProperty::Color => TweenValue::Color(self.color),
            TileProperty::Emissive => TweenValue::Color(self.emissive),
            TileProperty::EmissiveIntensity => TweenValue::Scalar(self.emissive_intensity),
        }
    }

    /// Writes a tweened value, values of the wrong kind for the property are ignored.
    pub fn set(&mut self, property: TileProperty, value: TweenValue) {
        match (property, value) {
            (TileProperty::Color, TweenValue::Color(color)) => self.color = color,
            (TileProperty::Emissive, TweenValue::Color(color)) => self.emissive = color,
            (TileProperty::EmissiveIntensity, TweenValue::Scalar(intensity)) => {
                self.emissive_intensity = intensity;
            }
            (property, value) => {
                tracing::warn!("Ignoring {value:?} for tile property {property}");
            }
        }
    }

    /// Emissive color scaled by its intensity, as the renderer wants it.
    pub fn emissive_output(&self) -> LinearRgba {
        LinearRgba::rgb(
            self.emissive.red * self.emissive_intensity,
            self.emissive.green * self.emissive_intensity,
            self.emissive.blue * self.emissive_intensity,
        )
    }
}

/// Domain record of one tile. The render entity is looked up through [`TileGrid`].
#[derive(Debug, Clone)]
pub struct Tile {
    coord: TileCoord,
    position: Vec3,
    default_color: LinearRgba,
    appearance: TileAppearance,
}

impl Tile {
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    pub const fn position(&self) -> Vec3 {
        self.position
    }

    pub const fn default_color(&self) -> LinearRgba {
        self.default_color
    }

    pub const fn appearance(&self) -> &TileAppearance {
        &self.appearance
    }

    pub const fn appearance_mut(&mut self) -> &mut TileAppearance {
        &mut self.appearance
    }
}

/// Every tile of the lattice with its coordinate index.
///
/// The shape never changes after [`TileGrid::build`], only tile appearances do.
#[derive(Resource, Debug)]
pub struct TileGrid {
    layout: GridLayout,
    tiles: Vec<Tile>,
    entities: Vec<Option<Entity>>,
    index: HashMap<TileCoord, usize>,
}

impl TileGrid {
    pub fn build(layout: GridLayout, default_color: Color) -> Self {
        let default_color = default_color.to_linear();
        let mut tiles = Vec::with_capacity(layout.tile_count());
        let mut index = HashMap::default();
        index.reserve(layout.tile_count());

        for x in 0..layout.size {
            for y in 0..layout.size {
                let coord = TileCoord::new(x, y);
                index.insert(coord, tiles.len());
                tiles.push(Tile {
                    coord,
                    position: layout.position(coord),
                    default_color,
                    appearance: TileAppearance::resting(default_color),
                });
            }
        }

        Self {
            layout,
            entities: vec![None; tiles.len()],
            tiles,
            index,
        }
    }

    pub const fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        let slot = *self.index.get(&coord)?;
        self.tiles.get(slot)
    }

    pub fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        let slot = *self.index.get(&coord)?;
        self.tiles.get_mut(slot)
    }

    /// Render entity of a tile, once spawned.
    pub fn entity(&self, coord: TileCoord) -> Option<Entity> {
        let slot = *self.index.get(&coord)?;
        self.entities.get(slot).copied().flatten()
    }

    /// Links a tile to its render entity, `false` when the coordinate is not in the grid.
    pub fn attach_entity(&mut self, coord: TileCoord, entity: Entity) -> bool {
        let Some(&slot) = self.index.get(&coord) else {
            return false;
        };
        match self.entities.get_mut(slot) {
            Some(linked) => {
                *linked = Some(entity);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}

/// Root entity of the tilted lattice.
#[derive(Component, Debug)]
pub struct GridRoot;

pub struct GridPlugin;

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<TileCoord>()
            .register_type::<GridSettings>()
            .init_resource::<GridSettings>()
            .add_systems(Startup, spawn_grid);
    }
}

/// Spawns one mesh per tile under a tilted root, then publishes the [`TileGrid`].
///
/// Tiles share a mesh but each owns its material, so recoloring one leaves the others alone.
pub fn spawn_grid(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<GridSettings>,
) {
    let layout = GridLayout::from(&*settings);
    let mut grid = TileGrid::build(layout, settings.default_color);

    let mesh = meshes.add(Plane3d::new(Vec3::Z, Vec2::splat(layout.tile_size / 2.0)).mesh());

    let root = commands
        .spawn((
            Name::new("TileGrid"),
            GridRoot,
            layout.transform(),
            Visibility::default(),
        ))
        .id();

    let mut spawned = Vec::with_capacity(grid.len());
    for tile in grid.iter() {
        let coord = tile.coord();
        let material = materials.add(StandardMaterial {
            base_color: tile.default_color().into(),
            emissive: LinearRgba::BLACK,
            double_sided: true,
            cull_mode: None,
            ..default()
        });

        let entity = commands
            .spawn((
                Name::new(format!("Tile {};{}", coord.x, coord.y)),
                coord,
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material),
                Transform::from_translation(tile.position()),
            ))
            .id();
        spawned.push((coord, entity));
    }

    let children: Vec<Entity> = spawned.iter().map(|&(_, entity)| entity).collect();
    commands.entity(root).add_children(&children);
    for (coord, entity) in spawned {
        grid.attach_entity(coord, entity);
    }

    info!(
        "Spawned a {size}x{size} tile grid",
        size = grid.layout().size
    );
    commands.insert_resource(grid);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_layout(size: u32) -> GridLayout {
        GridLayout {
            size,
            tile_size: 2.0,
            gap: 0.07,
            rotation: Quat::IDENTITY,
        }
    }

    #[test]
    fn positions_follow_the_centered_lattice() {
        let layout = flat_layout(10);

        for (x, y) in [(0, 0), (5, 5), (9, 3), (2, 7)] {
            let position = layout.position(TileCoord::new(x, y));
            let expected = Vec3::new(
                (x as f32 - 5.0) * 2.07,
                (y as f32 - 5.0) * 2.07,
                0.0,
            );
            assert!(
                position.abs_diff_eq(expected, 1e-5),
                "({x}, {y}) was {position} instead of {expected}"
            );
        }
    }

    #[test]
    fn odd_grids_use_real_valued_halves() {
        let layout = flat_layout(3);
        let position = layout.position(TileCoord::new(0, 2));

        assert!(
            position.abs_diff_eq(Vec3::new(-1.5 * 2.07, 0.5 * 2.07, 0.0), 1e-5),
            "got {position}"
        );
    }

    #[test]
    fn build_indexes_every_tile_once() {
        let grid = TileGrid::build(flat_layout(10), Color::BLACK);
        assert_eq!(grid.len(), 100, "10x10 grid");

        for x in 0..10 {
            for y in 0..10 {
                let coord = TileCoord::new(x, y);
                let tile = grid.tile(coord).expect("in range tile exists");
                assert_eq!(tile.coord(), coord, "index resolves to its own tile");
                assert_eq!(
                    tile.position(),
                    grid.layout().position(coord),
                    "tile keeps the lattice position"
                );
            }
        }
        assert!(grid.tile(TileCoord::new(10, 0)).is_none(), "out of range");
    }

    #[test]
    fn repeated_lookups_return_the_same_tile() {
        let grid = TileGrid::build(flat_layout(4), Color::BLACK);
        let coord = TileCoord::new(2, 3);

        let first = grid.tile(coord).expect("tile exists");
        let second = grid.tile(coord).expect("tile exists");
        assert!(core::ptr::eq(first, second), "lookups must share identity");
    }

    #[test]
    fn tiles_start_at_rest_with_their_default_color() {
        let default_color = Color::srgb_u8(0x22, 0x22, 0x22);
        let grid = TileGrid::build(flat_layout(2), default_color);

        for tile in grid.iter() {
            assert_eq!(
                *tile.appearance(),
                TileAppearance::resting(default_color.to_linear()),
                "{:?} not at rest",
                tile.coord()
            );
        }
    }

    #[test]
    fn entities_are_attached_by_coordinate() {
        let mut grid = TileGrid::build(flat_layout(2), Color::BLACK);
        let entity = Entity::from_raw(42);

        assert!(grid.entity(TileCoord::new(1, 1)).is_none(), "nothing spawned yet");
        assert!(grid.attach_entity(TileCoord::new(1, 1), entity), "in range");
        assert_eq!(grid.entity(TileCoord::new(1, 1)), Some(entity), "linked");
        assert!(
            !grid.attach_entity(TileCoord::new(5, 5), entity),
            "out of range coordinates are refused"
        );
    }

    #[test]
    fn offsets_never_go_negative() {
        let corner = TileCoord::new(0, 0);
        let valid: Vec<_> = TileCoord::NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&offset| corner.offset(offset))
            .collect();

        assert_eq!(valid.len(), 3, "corner keeps right, up and the diagonal");
        assert!(valid.contains(&TileCoord::new(1, 1)), "diagonal kept");
    }

    #[test]
    fn tile_at_finds_tile_centers_and_edges() {
        let layout = flat_layout(10);

        for coord in [TileCoord::new(0, 0), TileCoord::new(4, 6), TileCoord::new(9, 9)] {
            let center = layout.position(coord).truncate();
            assert_eq!(layout.tile_at(center), Some(coord), "center of {coord:?}");
            assert_eq!(
                layout.tile_at(center + Vec2::splat(0.99)),
                Some(coord),
                "corner of {coord:?}"
            );
        }
    }

    #[test]
    fn tile_at_misses_gaps_and_outside() {
        let layout = flat_layout(10);
        let center = layout.position(TileCoord::new(3, 3)).truncate();

        assert_eq!(
            layout.tile_at(center + Vec2::new(1.035, 0.0)),
            None,
            "middle of the gap"
        );
        assert_eq!(layout.tile_at(Vec2::splat(1000.0)), None, "far outside");
        assert_eq!(
            layout.tile_at(layout.position(TileCoord::new(0, 0)).truncate() - Vec2::splat(2.07)),
            None,
            "one pitch before the first tile"
        );
    }

    #[test]
    fn world_position_applies_the_tilt() {
        let layout = GridLayout::from(&GridSettings::default());
        let coord = TileCoord::new(60, 40);

        let expected = layout.rotation * layout.position(coord);
        assert!(
            layout.world_position(coord).abs_diff_eq(expected, 1e-5),
            "world position is the rotated local position"
        );
        assert!(
            (layout.world_position(coord).length() - layout.position(coord).length()).abs() < 1e-3,
            "rotation keeps distances to the origin"
        );
    }

    #[test]
    fn emissive_output_scales_the_glow_color() {
        let glowing = TileAppearance::glowing(LinearRgba::rgb(0.5, 0.25, 1.0), 2.0);
        assert_eq!(
            glowing.emissive_output(),
            LinearRgba::rgb(1.0, 0.5, 2.0),
            "color times intensity"
        );

        let resting = TileAppearance::resting(LinearRgba::rgb(0.5, 0.25, 1.0));
        assert_eq!(
            resting.emissive_output(),
            LinearRgba::BLACK,
            "tiles at rest emit nothing"
        );
    }

    #[test]
    fn spawn_grid_links_every_tile_to_an_entity() {
        let mut app = App::new();
        app.insert_resource(GridSettings {
            size: 3,
            ..default()
        })
        .init_resource::<Assets<Mesh>>()
        .init_resource::<Assets<StandardMaterial>>()
        .add_systems(Startup, spawn_grid);

        app.update();

        let grid = app.world().resource::<TileGrid>();
        assert_eq!(grid.len(), 9, "3x3 grid");
        for tile in grid.iter() {
            let entity = grid.entity(tile.coord()).expect("tile has an entity");
            let coord = app.world().get::<TileCoord>(entity).expect("entity is tagged");
            assert_eq!(*coord, tile.coord(), "entity carries its coordinate");
        }
        assert_eq!(
            app.world().resource::<Assets<StandardMaterial>>().len(),
            9,
            "one material per tile"
        );
    }
}
