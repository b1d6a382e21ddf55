use glam::Vec2;
use tilenav_core::Point;

use crate::terrain::Terrain;

/// Where a node stands in the current search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Visit {
    #[default]
    Unseen,
    Open,
    Closed,
}

/// Per-node search bookkeeping, valid only during and right after a search.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scratch {
    pub(crate) g: f32,
    pub(crate) f: f32,
    pub(crate) parent: Option<usize>,
    /// Order of first insertion into the open set; breaks key ties.
    pub(crate) seq: u64,
    pub(crate) visit: Visit,
}

/// One grid cell: static terrain, dynamic occupancy, and search scratch.
///
/// Nodes are owned by [`GridGraph`](crate::GridGraph) and only mutated
/// through it; everything else addresses them by index.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) index: usize,
    pub(crate) grid: Point,
    pub(crate) position: Vec2,
    pub(crate) terrain: Terrain,
    pub(crate) occupants: u32,
    /// Number of occupied cells whose edge list contains this node.
    pub(crate) occupied_neighbors: u32,
    pub(crate) dirty: bool,
    pub(crate) scratch: Scratch,
}

impl Node {
    pub(crate) fn new(index: usize, grid: Point, position: Vec2, terrain: Terrain) -> Self {
        Self {
            index,
            grid,
            position,
            terrain,
            occupants: 0,
            occupied_neighbors: 0,
            dirty: false,
            scratch: Scratch::default(),
        }
    }

    /// Row-major index, `y * width + x`.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Tile coordinate.
    #[inline]
    pub fn grid(&self) -> Point {
        self.grid
    }

    /// World-space centre of the tile.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    #[inline]
    pub fn terrain_cost(&self) -> f32 {
        self.terrain.cost()
    }

    #[inline]
    pub fn is_traversable(&self) -> bool {
        self.terrain.is_traversable()
    }

    /// Number of agents currently registered on this tile.
    #[inline]
    pub fn occupants(&self) -> u32 {
        self.occupants
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.occupants > 0
    }

    /// Whether an occupied tile lists this one as a neighbour.
    #[inline]
    pub fn adjacent_to_occupant(&self) -> bool {
        self.occupied_neighbors > 0
    }

    /// Whether terrain or occupancy changed since a search last reused
    /// this node.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Accumulated cost from the start of the most recent search.
    #[inline]
    pub fn g_cost(&self) -> f32 {
        self.scratch.g
    }

    /// `g` plus the heuristic estimate, as computed by the most recent search.
    #[inline]
    pub fn f_cost(&self) -> f32 {
        self.scratch.f
    }

    /// Predecessor on the best known route of the most recent search.
    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.scratch.parent
    }

    pub(crate) fn set_terrain(&mut self, terrain: Terrain) {
        self.terrain = terrain;
        self.dirty = true;
    }

    /// Forget everything the previous search wrote here.
    pub(crate) fn reset_scratch(&mut self) {
        self.scratch = Scratch::default();
        self.dirty = false;
    }

    pub(crate) fn clear_occupancy(&mut self) {
        if self.occupants > 0 || self.occupied_neighbors > 0 {
            self.dirty = true;
        }
        self.occupants = 0;
        self.occupied_neighbors = 0;
    }
}
