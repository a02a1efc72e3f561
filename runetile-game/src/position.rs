//! Grid coordinates and their canonical `"x,y"` key encoding.
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A cell on the unbounded progression grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Raised when a position key is not two comma-separated integers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid position key `{0}`")]
pub struct PositionError(pub String);

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn is_origin(self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Canonical storage key.
    #[must_use]
    pub fn key(self) -> String {
        self.to_string()
    }

    /// Orthogonal neighbours in right, left, down, up order.
    #[must_use]
    pub const fn neighbors(self) -> [Self; 4] {
        [
            Self::new(self.x.saturating_add(1), self.y),
            Self::new(self.x.saturating_sub(1), self.y),
            Self::new(self.x, self.y.saturating_add(1)),
            Self::new(self.x, self.y.saturating_sub(1)),
        ]
    }

    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.saturating_add(dy) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PositionError(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(malformed)?;
        let x = x.trim().parse::<i32>().map_err(|_| malformed())?;
        let y = y.trim().parse::<i32>().map_err(|_| malformed())?;
        Ok(Self { x, y })
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Insertion-ordered set of positions, persisted as a list of keys.
#[derive(Debug, Clone, Default)]
pub struct TileSet {
    order: Vec<Position>,
    members: HashSet<Position>,
}

impl TileSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a position, returning `false` when it was already present.
    pub fn insert(&mut self, position: Position) -> bool {
        if self.members.insert(position) {
            self.order.push(position);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.members.contains(&position)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Most recently inserted position.
    #[must_use]
    pub fn last(&self) -> Option<Position> {
        self.order.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.order.iter().copied()
    }

    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.members.is_subset(&other.members)
    }
}

impl PartialEq for TileSet {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for TileSet {}

impl FromIterator<Position> for TileSet {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        let mut set = Self::new();
        for position in iter {
            set.insert(position);
        }
        set
    }
}

impl Extend<Position> for TileSet {
    fn extend<I: IntoIterator<Item = Position>>(&mut self, iter: I) {
        for position in iter {
            self.insert(position);
        }
    }
}

impl Serialize for TileSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.order.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TileSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let positions = Vec::<Position>::deserialize(deserializer)?;
        Ok(positions.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_and_padded_keys() {
        assert_eq!("3,-7".parse::<Position>().unwrap(), Position::new(3, -7));
        assert_eq!(" 0 , 1 ".parse::<Position>().unwrap(), Position::new(0, 1));
        assert_eq!(Position::new(-2, 5).key(), "-2,5");
    }

    #[test]
    fn rejects_malformed_keys() {
        for raw in ["", "1", "a,b", "1,2,3", "1;2", "1.5,2"] {
            assert!(raw.parse::<Position>().is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn neighbors_are_orthogonal_and_adjacent() {
        let origin = Position::ORIGIN;
        let neighbors = origin.neighbors();
        assert_eq!(
            neighbors,
            [
                Position::new(1, 0),
                Position::new(-1, 0),
                Position::new(0, 1),
                Position::new(0, -1)
            ]
        );
        assert!(neighbors.iter().all(|n| n.is_adjacent(origin)));
        assert!(!origin.is_adjacent(Position::new(1, 1)));
    }

    #[test]
    fn tile_set_keeps_insertion_order_and_dedupes() {
        let mut set = TileSet::new();
        assert!(set.insert(Position::new(1, 0)));
        assert!(set.insert(Position::ORIGIN));
        assert!(!set.insert(Position::new(1, 0)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.last(), Some(Position::ORIGIN));
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["1,0","0,0"]"#);
        let restored: TileSet = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, set);
    }

    #[test]
    fn tile_set_rejects_bad_keys_on_load() {
        let err = serde_json::from_str::<TileSet>(r#"["0,0","nope"]"#).unwrap_err();
        assert!(err.to_string().contains("invalid position key"));
    }
}
