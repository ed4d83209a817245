//! Hex coordinate system using axial coordinates (q, r).
//!
//! This module provides the coordinate and identifier types for the board:
//! - `HexCoord`: Identifies individual hex tiles
//! - `Corner`: One of the six corners of a pointy-top hex
//! - `TileId`, `VertexId`, `EdgeId`: Canonical ids used as arena keys
//!
//! Vertex ids are derived from the rounded pixel position of a corner, so two
//! hexes that share a corner always produce the same id. Edge ids are the
//! sorted pair of their endpoint ids, so they do not depend on which hex
//! described them.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hex radius used when deriving vertex ids from pixel positions.
pub const ID_HEX_SIZE: f64 = 1000.0;

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// The six neighboring hexes in clockwise order starting from East
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),     // East
            HexCoord::new(self.q + 1, self.r - 1), // NorthEast
            HexCoord::new(self.q, self.r - 1),     // NorthWest
            HexCoord::new(self.q - 1, self.r),     // West
            HexCoord::new(self.q - 1, self.r + 1), // SouthWest
            HexCoord::new(self.q, self.r + 1),     // SouthEast
        ]
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Convert to pixel coordinates (center of hex)
    /// Uses pointy-top orientation with the given hex size (radius)
    pub fn to_pixel(&self, hex_size: f64) -> (f64, f64) {
        let x = hex_size * (3.0_f64.sqrt() * self.q as f64 + 3.0_f64.sqrt() / 2.0 * self.r as f64);
        let y = hex_size * (3.0 / 2.0 * self.r as f64);
        (x, y)
    }

    /// Pixel position of one corner of this hex
    pub fn corner_pixel(&self, corner: Corner, hex_size: f64) -> (f64, f64) {
        let (cx, cy) = self.to_pixel(hex_size);
        let (dx, dy) = corner.offset(hex_size);
        (cx + dx, cy + dy)
    }

    /// Canonical vertex id of one corner of this hex
    pub fn vertex_id(&self, corner: Corner) -> VertexId {
        let (x, y) = self.corner_pixel(corner, ID_HEX_SIZE);
        VertexId::new(x.round() as i32, y.round() as i32)
    }

    /// All six vertex ids of this hex, in `Corner::ALL` order
    pub fn vertex_ids(&self) -> [VertexId; 6] {
        Corner::ALL.map(|corner| self.vertex_id(corner))
    }

    /// Canonical id of the side running clockwise from `corner` to the next corner
    pub fn edge_id(&self, corner: Corner) -> EdgeId {
        EdgeId::new(self.vertex_id(corner), self.vertex_id(corner.next()))
    }

    /// All six edge ids of this hex
    pub fn edge_ids(&self) -> [EdgeId; 6] {
        Corner::ALL.map(|corner| self.edge_id(corner))
    }
}

/// Corner of a pointy-top hex, clockwise from the top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl Corner {
    /// All corners in clockwise order starting from North
    pub const ALL: [Corner; 6] = [
        Corner::North,
        Corner::NorthEast,
        Corner::SouthEast,
        Corner::South,
        Corner::SouthWest,
        Corner::NorthWest,
    ];

    /// The next corner going clockwise
    pub fn next(self) -> Corner {
        match self {
            Corner::North => Corner::NorthEast,
            Corner::NorthEast => Corner::SouthEast,
            Corner::SouthEast => Corner::South,
            Corner::South => Corner::SouthWest,
            Corner::SouthWest => Corner::NorthWest,
            Corner::NorthWest => Corner::North,
        }
    }

    /// Offset from the hex center to this corner
    fn offset(self, hex_size: f64) -> (f64, f64) {
        let half_width = 3.0_f64.sqrt() / 2.0 * hex_size;
        let half_size = hex_size / 2.0;
        match self {
            Corner::North => (0.0, -hex_size),
            Corner::NorthEast => (half_width, -half_size),
            Corner::SouthEast => (half_width, half_size),
            Corner::South => (0.0, hex_size),
            Corner::SouthWest => (-half_width, half_size),
            Corner::NorthWest => (-half_width, -half_size),
        }
    }
}

/// Error returned when parsing an id from its text form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} id: {value:?}")]
pub struct ParseIdError {
    kind: &'static str,
    value: String,
}

impl ParseIdError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Id of a tile, text form `"q_r"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub HexCoord);

impl TileId {
    pub const fn new(q: i32, r: i32) -> Self {
        Self(HexCoord::new(q, r))
    }

    /// The axial coordinate of the tile
    pub fn coord(&self) -> HexCoord {
        self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.0.q, self.0.r)
    }
}

impl FromStr for TileId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r) = s.split_once('_').ok_or_else(|| ParseIdError::new("tile", s))?;
        let q = q.parse().map_err(|_| ParseIdError::new("tile", s))?;
        let r = r.parse().map_err(|_| ParseIdError::new("tile", s))?;
        Ok(TileId::new(q, r))
    }
}

/// Id of a vertex: the rounded pixel position of the corner, text form `"v_x_y"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId {
    pub x: i32,
    pub y: i32,
}

impl VertexId {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v_{}_{}", self.x, self.y)
    }
}

impl FromStr for VertexId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("v_").ok_or_else(|| ParseIdError::new("vertex", s))?;
        let (x, y) = rest.split_once('_').ok_or_else(|| ParseIdError::new("vertex", s))?;
        let x = x.parse().map_err(|_| ParseIdError::new("vertex", s))?;
        let y = y.parse().map_err(|_| ParseIdError::new("vertex", s))?;
        Ok(VertexId::new(x, y))
    }
}

/// Id of an edge: its two endpoints in sorted order, text form `"e_<v1>_<v2>"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId {
    a: VertexId,
    b: VertexId,
}

impl EdgeId {
    /// Create an edge id; argument order does not matter
    pub fn new(v1: VertexId, v2: VertexId) -> Self {
        if v1 <= v2 {
            Self { a: v1, b: v2 }
        } else {
            Self { a: v2, b: v1 }
        }
    }

    /// Both endpoints, smaller first
    pub fn endpoints(&self) -> [VertexId; 2] {
        [self.a, self.b]
    }

    /// The endpoint opposite `from`, if `from` is an endpoint at all
    pub fn other_end(&self, from: VertexId) -> Option<VertexId> {
        if from == self.a {
            Some(self.b)
        } else if from == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e_{}_{}", self.a, self.b)
    }
}

impl FromStr for EdgeId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("e_").ok_or_else(|| ParseIdError::new("edge", s))?;
        let split = rest.find("_v_").ok_or_else(|| ParseIdError::new("edge", s))?;
        let v1: VertexId = rest[..split].parse().map_err(|_| ParseIdError::new("edge", s))?;
        let v2: VertexId = rest[split + 1..].parse().map_err(|_| ParseIdError::new("edge", s))?;
        Ok(EdgeId::new(v1, v2))
    }
}

/// Ids serialize as their text form so they can key JSON objects.
macro_rules! string_serde {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let text = String::deserialize(deserializer)?;
                    text.parse().map_err(de::Error::custom)
                }
            }
        )*
    };
}

string_serde!(TileId, VertexId, EdgeId);
