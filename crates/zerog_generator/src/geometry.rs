//! Frame grid geometry.
//!
//! A `.frames` descriptor names the sub-frames of a sprite sheet as a row-major
//! matrix, `names[row][col]`. Rotating the sheet moves every frame, so the name
//! matrix has to rotate with the pixels or animation lookups would pick the wrong
//! region after the transform.
//!
//! | direction    | pixels        | size / dimensions | names                     |
//! |--------------|---------------|-------------------|---------------------------|
//! | `downwards`  | 180°          | unchanged         | reversed on both axes     |
//! | `leftwards`  | 90° counter-clockwise | swapped   | transposed, rows reversed |
//! | `rightwards` | 90° clockwise | swapped           | transposed, each row reversed |
//!
//! `rightwards` reverses each row after transposing, unlike the plain transpose of
//! legacy generators, so that `leftwards` undoes it. For the single-row grids plants
//! use, both give the same names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Side of one tile in pixels.
pub const TILE_SIZE: u32 = 8;

/// The three placements generated in addition to the original upright one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Hanging from a ceiling.
    Downwards,
    /// Growing out of a wall to the right of the plant.
    Leftwards,
    /// Growing out of a wall to the left of the plant.
    Rightwards,
}

impl Direction {
    pub const ALL: [Direction; 3] = [
        Direction::Downwards,
        Direction::Leftwards,
        Direction::Rightwards,
    ];

    /// Suffix appended to derived file names, e.g. `plant-downwards.png`.
    pub fn suffix(self) -> &'static str {
        match self {
            Direction::Downwards => "downwards",
            Direction::Leftwards => "leftwards",
            Direction::Rightwards => "rightwards",
        }
    }

    pub fn rotation(self) -> Rotation {
        match self {
            Direction::Downwards => Rotation::Half,
            Direction::Leftwards => Rotation::CounterClockwise,
            Direction::Rightwards => Rotation::Clockwise,
        }
    }
}

/// A rotation of a raster image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// +90°
    Clockwise,
    /// 180°
    Half,
    /// -90°
    CounterClockwise,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Clockwise => 90,
            Rotation::Half => 180,
            Rotation::CounterClockwise => -90,
        }
    }
}

/// One value per generated direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotated<T> {
    pub downwards: T,
    pub leftwards: T,
    pub rightwards: T,
}

impl<T> Rotated<T> {
    /// Build each direction's value in `downwards`, `leftwards`, `rightwards` order.
    pub fn try_from_fn<E>(mut f: impl FnMut(Direction) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            downwards: f(Direction::Downwards)?,
            leftwards: f(Direction::Leftwards)?,
            rightwards: f(Direction::Rightwards)?,
        })
    }

    pub fn get(&self, direction: Direction) -> &T {
        match direction {
            Direction::Downwards => &self.downwards,
            Direction::Leftwards => &self.leftwards,
            Direction::Rightwards => &self.rightwards,
        }
    }

    pub fn map_ref<U>(&self, mut f: impl FnMut(&T) -> U) -> Rotated<U> {
        Rotated {
            downwards: f(&self.downwards),
            leftwards: f(&self.leftwards),
            rightwards: f(&self.rightwards),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        [&self.downwards, &self.leftwards, &self.rightwards].into_iter()
    }
}

/// Size of a plant in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

/// The `frameGrid` block of a `.frames` descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameGrid {
    /// Size of one frame in pixels, `[width, height]`.
    pub size: [u32; 2],

    /// Number of frames, `[columns, rows]`.
    pub dimensions: [u32; 2],

    /// Frame names, `names[row][col]`. Unnamed frames are `null`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<Vec<Value>>,

    /// Grid keys this crate does not model, such as `begin`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FrameGrid {
    /// Tiles covered by one frame, rounding partial tiles up.
    pub fn footprint(&self) -> Footprint {
        Footprint {
            width: self.size[0].div_ceil(TILE_SIZE),
            height: self.size[1].div_ceil(TILE_SIZE),
        }
    }

    /// Whether the frame size is a whole number of tiles on both axes.
    pub fn is_tile_aligned(&self) -> bool {
        self.size.iter().all(|s| s % TILE_SIZE == 0)
    }

    /// The grid describing the sprite sheet after rotating it towards `direction`.
    pub fn rotated(&self, direction: Direction) -> FrameGrid {
        let swap = |[a, b]: [u32; 2]| [b, a];
        let (size, dimensions, names) = match direction {
            Direction::Downwards => (self.size, self.dimensions, rotate_half(&self.names)),
            Direction::Leftwards => (
                swap(self.size),
                swap(self.dimensions),
                rotate_counter_clockwise(&self.names),
            ),
            Direction::Rightwards => (
                swap(self.size),
                swap(self.dimensions),
                rotate_clockwise(&self.names),
            ),
        };

        FrameGrid {
            size,
            dimensions,
            names,
            extra: self.extra.clone(),
        }
    }
}

/// Rows become columns. Short rows are padded with `null`.
pub fn transpose(names: &[Vec<Value>]) -> Vec<Vec<Value>> {
    let columns = names.iter().map(Vec::len).max().unwrap_or(0);
    (0..columns)
        .map(|col| {
            names
                .iter()
                .map(|row| row.get(col).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect()
}

pub fn rotate_half(names: &[Vec<Value>]) -> Vec<Vec<Value>> {
    names
        .iter()
        .rev()
        .map(|row| row.iter().rev().cloned().collect())
        .collect()
}

pub fn rotate_counter_clockwise(names: &[Vec<Value>]) -> Vec<Vec<Value>> {
    let mut rotated = transpose(names);
    rotated.reverse();
    rotated
}

pub fn rotate_clockwise(names: &[Vec<Value>]) -> Vec<Vec<Value>> {
    let mut rotated = transpose(names);
    for row in &mut rotated {
        row.reverse();
    }
    rotated
}
