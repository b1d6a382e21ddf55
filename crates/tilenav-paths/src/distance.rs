use glam::Vec2;
use tilenav_core::Point;

/// Walking distance between two tiles on a grid of `cell`-sized tiles.
///
/// Tiles sharing a row or column are measured in a straight line. Otherwise
/// the move is split into `min(dx, dy)` diagonal steps plus straight steps
/// along the longer axis, each weighted by the real cell dimensions. Cells
/// need not be square.
pub fn octile(a: Point, b: Point, cell: Vec2) -> f32 {
    let dx = (a.x - b.x).unsigned_abs() as f32;
    let dy = (a.y - b.y).unsigned_abs() as f32;
    if dx == 0.0 || dy == 0.0 {
        return (dx * cell.x).hypot(dy * cell.y);
    }
    let diagonal = cell.length();
    let (diag_steps, straight) = if dx > dy {
        (dy, (dx - dy) * cell.x)
    } else {
        (dx, (dy - dx) * cell.y)
    };
    diag_steps * diagonal + straight
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: Vec2 = Vec2::new(20.0, 10.0);

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn straight_lines() {
        assert_eq!(octile(Point::new(0, 0), Point::new(3, 0), CELL), 60.0);
        assert_eq!(octile(Point::new(2, 1), Point::new(2, 5), CELL), 40.0);
        assert_eq!(octile(Point::new(2, 1), Point::new(2, 1), CELL), 0.0);
    }

    #[test]
    fn diagonal_then_straight() {
        let diag = CELL.length();
        assert!(close(octile(Point::new(0, 0), Point::new(2, 2), CELL), 2.0 * diag));
        // wider than tall: leftover steps use the cell width
        assert!(close(
            octile(Point::new(0, 0), Point::new(5, 2), CELL),
            2.0 * diag + 3.0 * CELL.x
        ));
        // taller than wide: leftover steps use the cell height
        assert!(close(
            octile(Point::new(0, 0), Point::new(1, 4), CELL),
            diag + 3.0 * CELL.y
        ));
    }

    #[test]
    fn symmetric() {
        let a = Point::new(3, 7);
        let b = Point::new(9, 2);
        assert_eq!(octile(a, b, CELL), octile(b, a, CELL));
    }
}
