use crate::error::NavError;

/// Tile terrain kinds and their traversal multipliers.
///
/// | code | kind | cost | passable |
/// |---|---|---|---|
/// | 0 | `Grass` | 1.0 | yes |
/// | 1 | `Road` | 0.5 | yes |
/// | 2 | `Water` | 2.0 | yes |
/// | 3 | `Mountain` | 10.0 | no |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Terrain {
    #[default]
    Grass,
    Road,
    Water,
    Mountain,
}

impl Terrain {
    /// Every terrain kind, ordered by code.
    pub const ALL: [Terrain; 4] = [Self::Grass, Self::Road, Self::Water, Self::Mountain];

    /// Decode a map digit.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// The map digit for this kind.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Multiplier applied to the physical length of a step through the tile.
    pub fn cost(self) -> f32 {
        match self {
            Self::Grass => 1.0,
            Self::Road => 0.5,
            Self::Water => 2.0,
            Self::Mountain => 10.0,
        }
    }

    pub fn is_traversable(self) -> bool {
        self != Self::Mountain
    }
}

impl TryFrom<u8> for Terrain {
    type Error = NavError;

    fn try_from(code: u8) -> Result<Self, NavError> {
        Self::from_code(code).ok_or(NavError::InvalidTerrain(code))
    }
}

impl From<Terrain> for u8 {
    fn from(t: Terrain) -> Self {
        t.code()
    }
}
