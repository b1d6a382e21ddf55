//! Terrain maps as text.
//!
//! One line per tile row, one digit per tile. Digits may be separated by
//! whitespace (`0 1 2 3`) or written back to back (`0123`). Blank lines
//! around the map are ignored. The first row fixes the column count and every
//! other row must match it.

use std::fmt::Write as _;

use crate::error::MapError;
use crate::terrain::Terrain;

/// Parse map text into rows of terrain.
pub fn parse(s: &str) -> Result<Vec<Vec<Terrain>>, MapError> {
    let s = s.trim_matches(|c: char| c == '\n' || c == '\r');
    if s.trim().is_empty() {
        return Err(MapError::Empty);
    }

    let mut rows: Vec<Vec<Terrain>> = Vec::new();
    for (row, line) in s.lines().enumerate() {
        let mut cells = Vec::new();
        for ch in line.chars().filter(|c| !c.is_whitespace()) {
            let terrain = ch
                .to_digit(10)
                .and_then(|d| Terrain::from_code(d as u8))
                .ok_or(MapError::InvalidToken {
                    row,
                    column: cells.len(),
                    ch,
                })?;
            cells.push(terrain);
        }
        if cells.is_empty() {
            return Err(MapError::EmptyRow { row });
        }
        if let Some(first) = rows.first() {
            if cells.len() != first.len() {
                return Err(MapError::InconsistentRow {
                    row,
                    expected: first.len(),
                    found: cells.len(),
                });
            }
        }
        rows.push(cells);
    }
    Ok(rows)
}

/// Parse map text into raw terrain codes.
pub fn parse_codes(s: &str) -> Result<Vec<Vec<u8>>, MapError> {
    Ok(parse(s)?
        .into_iter()
        .map(|row| row.into_iter().map(Terrain::code).collect())
        .collect())
}

/// Render rows back to the space-separated text form.
pub fn render(rows: &[Vec<Terrain>]) -> String {
    let mut out = String::new();
    for row in rows {
        for (i, t) in row.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{}", t.code());
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = "\
0 0 1 2
3 3 0 0
0 1 1 0
";

    #[test]
    fn parse_spaced() {
        let rows = parse(MAP).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].len(), 4);
        assert_eq!(rows[0][3], Terrain::Water);
        assert_eq!(rows[1][0], Terrain::Mountain);
    }

    #[test]
    fn parse_contiguous_matches_spaced() {
        let packed = "0012\n3300\n0110";
        assert_eq!(parse(packed).unwrap(), parse(MAP).unwrap());
        assert_eq!(parse_codes(packed).unwrap()[1], vec![3, 3, 0, 0]);
    }

    #[test]
    fn render_round_trips() {
        let rows = parse(MAP).unwrap();
        assert_eq!(render(&rows), MAP);
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse(""), Err(MapError::Empty));
        assert_eq!(parse("\n\n"), Err(MapError::Empty));
    }

    #[test]
    fn inconsistent_rows() {
        assert_eq!(
            parse("0 0 0\n0 0\n"),
            Err(MapError::InconsistentRow {
                row: 1,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn row_without_digits() {
        assert_eq!(parse("0 0\n   \n0 0"), Err(MapError::EmptyRow { row: 1 }));
    }

    #[test]
    fn invalid_tokens() {
        assert_eq!(
            parse("0 x 0"),
            Err(MapError::InvalidToken {
                row: 0,
                column: 1,
                ch: 'x'
            })
        );
        assert!(matches!(
            parse("0 0\n0 7"),
            Err(MapError::InvalidToken { ch: '7', .. })
        ));
        assert!(parse("0,0").is_err());
    }
}
