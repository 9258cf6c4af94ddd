//! Wall segments and the obstacle test built on them.

use pathwright_core::{Segment, Vec2};

/// Whether a wall is a door, and of which kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DoorType {
    #[default]
    None,
    Door,
    Secret,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DoorState {
    #[default]
    Closed,
    Open,
    Locked,
}

/// How a wall restricts movement.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveRestriction {
    /// Tokens pass through.
    None,
    Limited,
    #[default]
    Normal,
}

/// Elevation range a wall occupies, both ends inclusive. A missing bound
/// is unbounded on that side.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallHeight {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub bottom: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub top: Option<f64>,
}

impl WallHeight {
    pub fn new(bottom: f64, top: f64) -> Self {
        Self {
            bottom: Some(bottom),
            top: Some(top),
        }
    }

    #[inline]
    pub fn contains(&self, elevation: f64) -> bool {
        self.bottom.is_none_or(|b| b <= elevation) && self.top.is_none_or(|t| elevation <= t)
    }
}

/// A wall segment in pixel space.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wall {
    pub segment: Segment,
    #[cfg_attr(feature = "serde", serde(default))]
    pub door: DoorType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub door_state: DoorState,
    #[cfg_attr(feature = "serde", serde(default))]
    pub movement: MoveRestriction,
    #[cfg_attr(feature = "serde", serde(default))]
    pub height: WallHeight,
}

impl Wall {
    /// A solid wall from `a` to `b`.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            segment: Segment::new(a, b),
            door: DoorType::None,
            door_state: DoorState::Closed,
            movement: MoveRestriction::Normal,
            height: WallHeight::default(),
        }
    }

    /// A door from `a` to `b` in the given state.
    pub fn door(a: Vec2, b: Vec2, state: DoorState) -> Self {
        Self {
            door: DoorType::Door,
            door_state: state,
            ..Self::new(a, b)
        }
    }

    pub fn with_height(self, height: WallHeight) -> Self {
        Self { height, ..self }
    }

    pub fn with_movement(self, movement: MoveRestriction) -> Self {
        Self { movement, ..self }
    }

    #[inline]
    pub fn is_door(&self) -> bool {
        self.door != DoorType::None
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.door_state == DoorState::Open
    }

    /// Whether the wall stops a token at `elevation`.
    pub fn blocks_movement(&self, elevation: f64) -> bool {
        if self.movement == MoveRestriction::None {
            return false;
        }
        if self.is_door() && self.is_open() {
            return false;
        }
        self.height.contains(elevation)
    }
}

/// The walls of a scene.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallSet {
    walls: Vec<Wall>,
}

impl WallSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, wall: Wall) {
        self.walls.push(wall);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.walls.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Wall> {
        self.walls.iter()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Wall> {
        self.walls.get_mut(index)
    }

    /// Walls that stop a token at `elevation`.
    pub fn blocking(&self, elevation: f64) -> impl Iterator<Item = &Wall> + '_ {
        self.walls
            .iter()
            .filter(move |w| w.blocks_movement(elevation))
    }

    /// Whether moving along `path` at `elevation` crosses or touches a
    /// blocking wall.
    pub fn collides(&self, path: &Segment, elevation: f64) -> bool {
        self.blocking(elevation)
            .any(|w| w.segment.intersects(path))
    }
}

impl FromIterator<Wall> for WallSet {
    fn from_iter<I: IntoIterator<Item = Wall>>(iter: I) -> Self {
        Self {
            walls: iter.into_iter().collect(),
        }
    }
}

impl Extend<Wall> for WallSet {
    fn extend<I: IntoIterator<Item = Wall>>(&mut self, iter: I) {
        self.walls.extend(iter);
    }
}

impl<'a> IntoIterator for &'a WallSet {
    type Item = &'a Wall;
    type IntoIter = std::slice::Iter<'a, Wall>;

    fn into_iter(self) -> Self::IntoIter {
        self.walls.iter()
    }
}
