//! Board tiles and the per-player placement queue.
//!
//! Board geometry is supplied from outside: a [`Board`] either carries an
//! explicit hex layout (with ocean spaces and printed bonuses) or is open, in
//! which case any unoccupied coordinate accepts a tile.

use std::collections::VecDeque;
use std::fmt;

use strum::{AsRefStr, Display, EnumString};

use crate::behavior::ResourceKind;
use crate::error::{ErrorSeverity, GameError};
use crate::ids::PlayerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TileKind {
    City,
    Greenery,
    Ocean,
}

/// Cube coordinate of a hex (`q + r + s == 0`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HexCoordinate {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

impl HexCoordinate {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }

    pub const fn is_valid(&self) -> bool {
        self.q + self.r + self.s == 0
    }

    pub const fn neighbors(&self) -> [Self; 6] {
        let (q, r) = (self.q, self.r);
        [
            Self::new(q + 1, r),
            Self::new(q + 1, r - 1),
            Self::new(q, r - 1),
            Self::new(q - 1, r),
            Self::new(q - 1, r + 1),
            Self::new(q, r + 1),
        ]
    }

    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.neighbors().contains(other)
    }
}

impl fmt::Display for HexCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.q, self.r, self.s)
    }
}

/// Resource printed on a board hex, granted to whoever places a tile there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileBonus {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub resource: ResourceKind,
    pub amount: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardHex {
    pub coordinate: HexCoordinate,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ocean_space: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonuses: Vec<TileBonus>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedTile {
    pub kind: TileKind,
    pub coordinate: HexCoordinate,
    /// Oceans are unowned.
    pub owner: Option<PlayerId>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TileError {
    #[error("coordinate {0} is not a valid hex")]
    InvalidCoordinate(HexCoordinate),

    #[error("coordinate {0} is not on the board")]
    OffBoard(HexCoordinate),

    #[error("hex {0} is already occupied")]
    Occupied(HexCoordinate),

    #[error("{kind} tile cannot be placed on hex {coordinate}")]
    WrongSpace {
        kind: TileKind,
        coordinate: HexCoordinate,
    },

    #[error("no tile placement is pending")]
    NothingPending,
}

impl GameError for TileError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NothingPending => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCoordinate(_) => "TILE_INVALID_COORDINATE",
            Self::OffBoard(_) => "TILE_OFF_BOARD",
            Self::Occupied(_) => "TILE_OCCUPIED",
            Self::WrongSpace { .. } => "TILE_WRONG_SPACE",
            Self::NothingPending => "TILE_NOTHING_PENDING",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Board {
    /// Optional layout; empty means an open board.
    pub hexes: Vec<BoardHex>,
    pub tiles: Vec<PlacedTile>,
}

impl Board {
    pub fn with_layout(hexes: Vec<BoardHex>) -> Self {
        Self {
            hexes,
            tiles: Vec::new(),
        }
    }

    pub fn hex(&self, coordinate: HexCoordinate) -> Option<&BoardHex> {
        self.hexes.iter().find(|hex| hex.coordinate == coordinate)
    }

    pub fn tile_at(&self, coordinate: HexCoordinate) -> Option<&PlacedTile> {
        self.tiles.iter().find(|tile| tile.coordinate == coordinate)
    }

    /// Checks whether `kind` may be placed at `coordinate`.
    pub fn can_place(&self, kind: TileKind, coordinate: HexCoordinate) -> Result<(), TileError> {
        if !coordinate.is_valid() {
            return Err(TileError::InvalidCoordinate(coordinate));
        }
        if self.tile_at(coordinate).is_some() {
            return Err(TileError::Occupied(coordinate));
        }
        if self.hexes.is_empty() {
            return Ok(());
        }

        let hex = self
            .hex(coordinate)
            .ok_or(TileError::OffBoard(coordinate))?;
        if hex.ocean_space != (kind == TileKind::Ocean) {
            return Err(TileError::WrongSpace { kind, coordinate });
        }
        Ok(())
    }

    /// Places a tile and returns the bonuses printed on its hex.
    pub fn place(&mut self, tile: PlacedTile) -> Result<Vec<TileBonus>, TileError> {
        self.can_place(tile.kind, tile.coordinate)?;
        let bonuses = self
            .hex(tile.coordinate)
            .map(|hex| hex.bonuses.clone())
            .unwrap_or_default();
        self.tiles.push(tile);
        Ok(bonuses)
    }

    /// Number of tiles of `kind`, optionally restricted to one owner.
    pub fn count(&self, kind: TileKind, owner: Option<&PlayerId>) -> i32 {
        self.tiles
            .iter()
            .filter(|tile| tile.kind == kind)
            .filter(|tile| owner.is_none_or(|owner| tile.owner.as_ref() == Some(owner)))
            .count() as i32
    }
}

/// A tile token waiting to be placed, with the source that queued it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueuedTile {
    pub kind: TileKind,
    pub source: String,
}

/// FIFO of tile placements owed by a player.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingTileSelectionQueue {
    items: VecDeque<QueuedTile>,
}

impl PendingTileSelectionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, kinds: impl IntoIterator<Item = TileKind>, source: &str) {
        self.items.extend(kinds.into_iter().map(|kind| QueuedTile {
            kind,
            source: source.to_owned(),
        }));
    }

    pub fn pop(&mut self) -> Option<QueuedTile> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&QueuedTile> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedTile> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_are_valid_and_adjacent() {
        let center = HexCoordinate::new(2, -1);
        let neighbors = center.neighbors();

        assert!(neighbors.iter().all(HexCoordinate::is_valid));
        assert!(neighbors.iter().all(|hex| hex.is_adjacent(&center)));
        assert!(!center.is_adjacent(&center));
        assert!(!center.is_adjacent(&HexCoordinate::new(4, -1)));
    }

    #[test]
    fn queue_is_first_in_first_out() {
        let mut queue = PendingTileSelectionQueue::new();
        queue.append([TileKind::City], "card-a");
        queue.append([TileKind::Greenery], "card-a");

        assert_eq!(queue.pop().map(|t| t.kind), Some(TileKind::City));
        assert_eq!(queue.pop().map(|t| t.kind), Some(TileKind::Greenery));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn open_board_rejects_only_occupied_hexes() {
        let mut board = Board::default();
        let at = HexCoordinate::new(1, -1);
        let owner = PlayerId::from("p1");

        board
            .place(PlacedTile {
                kind: TileKind::City,
                coordinate: at,
                owner: Some(owner.clone()),
            })
            .unwrap();

        assert_eq!(
            board.can_place(TileKind::Greenery, at),
            Err(TileError::Occupied(at))
        );
        assert_eq!(board.count(TileKind::City, Some(&owner)), 1);
        assert_eq!(board.count(TileKind::City, Some(&PlayerId::from("p2"))), 0);
    }

    #[test]
    fn layout_enforces_ocean_spaces_and_returns_bonuses() {
        let land = HexCoordinate::new(0, 0);
        let water = HexCoordinate::new(1, 0);
        let mut board = Board::with_layout(vec![
            BoardHex {
                coordinate: land,
                ocean_space: false,
                bonuses: vec![TileBonus {
                    resource: ResourceKind::Steel,
                    amount: 2,
                }],
            },
            BoardHex {
                coordinate: water,
                ocean_space: true,
                bonuses: vec![],
            },
        ]);

        assert!(matches!(
            board.can_place(TileKind::City, water),
            Err(TileError::WrongSpace { .. })
        ));
        assert!(matches!(
            board.can_place(TileKind::City, HexCoordinate::new(5, -5)),
            Err(TileError::OffBoard(_))
        ));

        let bonuses = board
            .place(PlacedTile {
                kind: TileKind::Greenery,
                coordinate: land,
                owner: None,
            })
            .unwrap();
        assert_eq!(bonuses.len(), 1);
        assert_eq!(bonuses[0].amount, 2);
    }
}
