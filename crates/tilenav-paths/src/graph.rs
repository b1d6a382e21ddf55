//! The navigation graph: a node arena plus one edge list per node.

use glam::Vec2;
use log::{trace, warn};
use tilenav_core::{Point, Range};

use crate::distance;
use crate::error::{MapError, NavError};
use crate::mapfile;
use crate::node::Node;
use crate::terrain::Terrain;

/// A rectangular tile map laid over a world-space rectangle.
///
/// Edge lists are derived data. Neighbour `n` is listed for cell `c` iff
/// `n` is within one ring of `c` (4- or 8-connectivity, per the diagonal
/// flag) and `n` is traversable. Every mutator below keeps that true.
#[derive(Debug, Clone)]
pub struct GridGraph {
    bounds: Range,
    world: Vec2,
    cell: Vec2,
    diagonals: bool,
    nodes: Vec<Node>,
    edges: Vec<Vec<usize>>,
    /// Nodes the last search wrote scratch data into.
    touched: Vec<usize>,
}

impl GridGraph {
    /// Build a graph from rows of terrain codes covering a
    /// `world_width × world_height` world.
    pub fn build<R: AsRef<[u8]>>(
        rows: &[R],
        world_width: f32,
        world_height: f32,
    ) -> Result<Self, MapError> {
        let mut terrain = Vec::with_capacity(rows.len());
        for (row, codes) in rows.iter().enumerate() {
            let mut cells = Vec::with_capacity(codes.as_ref().len());
            for (column, &code) in codes.as_ref().iter().enumerate() {
                let t = Terrain::from_code(code).ok_or(MapError::InvalidToken {
                    row,
                    column,
                    ch: char::from_digit(code as u32, 10).unwrap_or(char::REPLACEMENT_CHARACTER),
                })?;
                cells.push(t);
            }
            terrain.push(cells);
        }
        Self::from_terrain(terrain, world_width, world_height)
    }

    /// Parse map text (see [`mapfile`]) and build a graph from it.
    pub fn from_text(s: &str, world_width: f32, world_height: f32) -> Result<Self, MapError> {
        Self::from_terrain(mapfile::parse(s)?, world_width, world_height)
    }

    /// Build a graph from already decoded terrain rows.
    pub fn from_terrain(
        rows: Vec<Vec<Terrain>>,
        world_width: f32,
        world_height: f32,
    ) -> Result<Self, MapError> {
        let Some(first) = rows.first() else {
            return Err(MapError::Empty);
        };
        let width = first.len();
        for (row, cells) in rows.iter().enumerate() {
            if cells.is_empty() {
                return Err(MapError::EmptyRow { row });
            }
            if cells.len() != width {
                return Err(MapError::InconsistentRow {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
        }
        if !(world_width.is_finite() && world_height.is_finite())
            || world_width <= 0.0
            || world_height <= 0.0
        {
            return Err(MapError::InvalidWorldSize {
                width: world_width,
                height: world_height,
            });
        }

        let bounds = Range::with_size(width as i32, rows.len() as i32);
        let world = Vec2::new(world_width, world_height);
        let cell = world / Vec2::new(width as f32, rows.len() as f32);

        let mut nodes = Vec::with_capacity(bounds.len());
        for (y, cells) in rows.into_iter().enumerate() {
            for (x, terrain) in cells.into_iter().enumerate() {
                let grid = Point::new(x as i32, y as i32);
                let position = Vec2::new(
                    x as f32 * cell.x + cell.x * 0.5,
                    y as f32 * cell.y + cell.y * 0.5,
                );
                nodes.push(Node::new(nodes.len(), grid, position, terrain));
            }
        }

        let mut graph = Self {
            bounds,
            world,
            cell,
            diagonals: true,
            edges: vec![Vec::with_capacity(8); nodes.len()],
            nodes,
            touched: Vec::new(),
        };
        graph.update_all_edges();
        Ok(graph)
    }

    // -----------------------------------------------------------------------
    // Dimensions
    // -----------------------------------------------------------------------

    /// Number of tile columns.
    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    /// Number of tile rows.
    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// The tile rectangle `[0, width) × [0, height)`.
    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// World-space size covered by the map.
    #[inline]
    pub fn world_size(&self) -> Vec2 {
        self.world
    }

    /// World-space size of one tile.
    #[inline]
    pub fn cell_size(&self) -> Vec2 {
        self.cell
    }

    #[inline]
    pub fn diagonals_allowed(&self) -> bool {
        self.diagonals
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// The node with the given index.
    ///
    /// # Panics
    ///
    /// If `idx` is not below [`len`](Self::len).
    #[inline]
    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// The node at a tile coordinate, if inside the grid.
    #[inline]
    pub fn node_at_grid(&self, p: Point) -> Option<&Node> {
        self.bounds.index_of(p).map(|i| &self.nodes[i])
    }

    /// Index of the tile at `p`, if inside the grid.
    #[inline]
    pub fn index_of(&self, p: Point) -> Option<usize> {
        self.bounds.index_of(p)
    }

    /// All nodes in row-major order.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Traversable neighbours of `idx`.
    #[inline]
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        &self.edges[idx]
    }

    /// Index of the tile containing a world position.
    ///
    /// Positions outside `[0, world_w) × [0, world_h)` are rejected, never
    /// clamped.
    pub fn node_at(&self, pos: Vec2) -> Result<usize, NavError> {
        let out = NavError::OutOfBounds { x: pos.x, y: pos.y };
        if !pos.is_finite()
            || pos.x < 0.0
            || pos.y < 0.0
            || pos.x >= self.world.x
            || pos.y >= self.world.y
        {
            return Err(out);
        }
        // Float division may land exactly on the far edge for positions a
        // hair inside the world.
        let x = ((pos.x / self.cell.x) as i32).min(self.width() - 1);
        let y = ((pos.y / self.cell.y) as i32).min(self.height() - 1);
        self.bounds.index_of(Point::new(x, y)).ok_or(out)
    }

    /// Whether the tile containing `pos` can be walked on.
    pub fn is_traversable_at(&self, pos: Vec2) -> Result<bool, NavError> {
        Ok(self.nodes[self.node_at(pos)?].is_traversable())
    }

    /// Walking distance between two nodes, see [`distance::octile`].
    #[inline]
    pub fn dist_between(&self, a: usize, b: usize) -> f32 {
        distance::octile(self.nodes[a].grid, self.nodes[b].grid, self.cell)
    }

    /// Current terrain as rows, suitable for [`mapfile::render`].
    pub fn terrain_rows(&self) -> Vec<Vec<Terrain>> {
        self.nodes
            .chunks(self.width() as usize)
            .map(|row| row.iter().map(Node::terrain).collect())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Terrain and topology
    // -----------------------------------------------------------------------

    /// Change the terrain of tile (x, y) and repair the edge lists of the
    /// tile and its ring.
    pub fn set_terrain(&mut self, x: i32, y: i32, terrain: Terrain) -> Result<(), NavError> {
        let p = Point::new(x, y);
        let idx = self.bounds.index_of(p).ok_or(NavError::OutOfBounds {
            x: x as f32,
            y: y as f32,
        })?;
        self.nodes[idx].set_terrain(terrain);
        for q in self.bounds.ring(p) {
            self.update_edges(q);
        }
        // the ring's lists changed, so anything they may list needs a recount
        let reach = Range::new(p.x - 2, p.y - 2, p.x + 3, p.y + 3);
        self.recount_adjacency(self.bounds.intersect(reach));
        trace!("terrain at {p} set to {terrain:?}");
        Ok(())
    }

    /// Paint the tile containing a world position; returns its index.
    pub fn set_terrain_at(&mut self, pos: Vec2, terrain: Terrain) -> Result<usize, NavError> {
        let idx = self.node_at(pos)?;
        let p = self.nodes[idx].grid;
        self.set_terrain(p.x, p.y, terrain)?;
        Ok(idx)
    }

    /// Switch between 4- and 8-connectivity. Rebuilds every edge list.
    pub fn set_diagonals_allowed(&mut self, allowed: bool) {
        self.diagonals = allowed;
        self.update_all_edges();
    }

    /// Flip the diagonal flag; returns the new value.
    pub fn toggle_diagonals(&mut self) -> bool {
        self.set_diagonals_allowed(!self.diagonals);
        self.diagonals
    }

    fn update_all_edges(&mut self) {
        for p in self.bounds {
            self.update_edges(p);
        }
        self.recount_adjacency(self.bounds);
        trace!(
            "rebuilt {} edge lists (diagonals: {})",
            self.nodes.len(),
            self.diagonals
        );
    }

    fn update_edges(&mut self, p: Point) {
        let Some(idx) = self.bounds.index_of(p) else {
            return;
        };
        let mut list = std::mem::take(&mut self.edges[idx]);
        list.clear();
        let mut keep = |q: Point| {
            if let Some(qi) = self.bounds.index_of(q) {
                if self.nodes[qi].is_traversable() {
                    list.push(qi);
                }
            }
        };
        if self.diagonals {
            p.neighbors_8().into_iter().for_each(&mut keep);
        } else {
            p.neighbors_4().into_iter().for_each(&mut keep);
        }
        self.edges[idx] = list;
    }

    // -----------------------------------------------------------------------
    // Occupancy
    // -----------------------------------------------------------------------

    /// Register an agent entering (`true`) or leaving (`false`) the tile at
    /// `pos`.
    ///
    /// The first arrival and the last departure mark or unmark every node
    /// in the tile's edge list as adjacent to an occupant. Calls must come
    /// in matched pairs; a departure from an empty tile is logged and
    /// ignored.
    pub fn mark_occupant(&mut self, pos: Vec2, entering: bool) -> Result<(), NavError> {
        let idx = self.node_at(pos)?;
        let node = &mut self.nodes[idx];
        let transition = if entering {
            node.occupants += 1;
            node.occupants == 1
        } else {
            if node.occupants == 0 {
                warn!("occupant left empty tile {}", node.grid);
                return Ok(());
            }
            node.occupants -= 1;
            node.occupants == 0
        };
        node.dirty = true;

        if transition {
            for &n in &self.edges[idx] {
                let neighbor = &mut self.nodes[n];
                if entering {
                    neighbor.occupied_neighbors += 1;
                } else {
                    neighbor.occupied_neighbors = neighbor.occupied_neighbors.saturating_sub(1);
                }
                neighbor.dirty = true;
            }
        }
        Ok(())
    }

    /// Recompute adjacency counters over `area` from the occupants and the
    /// current edge lists.
    fn recount_adjacency(&mut self, area: Range) {
        for p in area {
            let Some(idx) = self.bounds.index_of(p) else {
                continue;
            };
            let count = self
                .bounds
                .ring(p)
                .into_iter()
                .filter_map(|q| self.bounds.index_of(q))
                .filter(|&c| c != idx && self.nodes[c].is_occupied() && self.edges[c].contains(&idx))
                .count() as u32;
            let node = &mut self.nodes[idx];
            if node.occupied_neighbors != count {
                node.occupied_neighbors = count;
                node.dirty = true;
            }
        }
    }

    /// Drop every occupant and adjacency mark.
    pub fn clear_occupancy(&mut self) {
        for node in &mut self.nodes {
            node.clear_occupancy();
        }
    }

    /// Mutable nodes alongside the edge lists, for the search loop.
    ///
    /// Wipes the scratch of every node the previous search touched, whichever
    /// engine ran it, and hands back the touched list for the new run to fill.
    pub(crate) fn search_view(&mut self) -> (&mut [Node], &[Vec<usize>], &mut Vec<usize>) {
        for i in self.touched.drain(..) {
            self.nodes[i].reset_scratch();
        }
        (&mut self.nodes, &self.edges, &mut self.touched)
    }
}
