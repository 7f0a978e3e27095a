//! Arena geometry: axis-aligned rectangles and the four L-shaped corner walls.
//!
//! The same wall tests back two different decisions on the server: whether a
//! tank may move into a rectangle, and which velocity axis of a bullet is
//! reflected on contact. Both go through [`WallSet::hits_vertical_bar`] and
//! [`WallSet::hits_horizontal_bar`] so they can never disagree.

use crate::{ARENA_HEIGHT, ARENA_WIDTH, WALL_INSET, WALL_LENGTH, WALL_THICKNESS};

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Builds a rectangle from integer arena coordinates.
    pub fn from_ints(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x as f32, y as f32, w as f32, h as f32)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Overlap test with inclusive edges: rectangles that merely touch count as
/// intersecting.
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    !(a.right() < b.x || a.x > b.right() || a.bottom() < b.y || a.y > b.bottom())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// One L-shaped obstacle made of a vertical and a horizontal bar sharing a corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSegment {
    pub corner: Corner,
    pub vertical: Rect,
    pub horizontal: Rect,
}

impl WallSegment {
    /// Builds the L for `corner` inside the `length`×`length` square anchored at (x, y).
    pub fn new(x: i32, y: i32, thickness: i32, length: i32, corner: Corner) -> Self {
        let far = length - thickness;
        let (vertical, horizontal) = match corner {
            Corner::TopLeft => (
                Rect::from_ints(x, y, thickness, length),
                Rect::from_ints(x, y, length, thickness),
            ),
            Corner::TopRight => (
                Rect::from_ints(x + far, y, thickness, length),
                Rect::from_ints(x, y, length, thickness),
            ),
            Corner::BottomLeft => (
                Rect::from_ints(x, y, thickness, length),
                Rect::from_ints(x, y + far, length, thickness),
            ),
            Corner::BottomRight => (
                Rect::from_ints(x + far, y, thickness, length),
                Rect::from_ints(x, y + far, length, thickness),
            ),
        };

        Self {
            corner,
            vertical,
            horizontal,
        }
    }

    pub fn collides(&self, rect: &Rect) -> bool {
        intersects(&self.vertical, rect) || intersects(&self.horizontal, rect)
    }
}

/// The immutable set of corner walls for one arena.
#[derive(Debug, Clone, PartialEq)]
pub struct WallSet {
    segments: [WallSegment; 4],
}

impl WallSet {
    /// Walls for an arena of the given size, each inset from its corner.
    pub fn for_arena(width: i32, height: i32) -> Self {
        let segments = Corner::ALL.map(|corner| {
            let x = match corner {
                Corner::TopLeft | Corner::BottomLeft => WALL_INSET,
                Corner::TopRight | Corner::BottomRight => width - WALL_INSET - WALL_LENGTH,
            };
            let y = match corner {
                Corner::TopLeft | Corner::TopRight => WALL_INSET,
                Corner::BottomLeft | Corner::BottomRight => height - WALL_INSET - WALL_LENGTH,
            };
            WallSegment::new(x, y, WALL_THICKNESS, WALL_LENGTH, corner)
        });

        Self { segments }
    }

    pub fn segments(&self) -> &[WallSegment; 4] {
        &self.segments
    }

    pub fn hits_vertical_bar(&self, rect: &Rect) -> bool {
        self.segments.iter().any(|s| intersects(&s.vertical, rect))
    }

    pub fn hits_horizontal_bar(&self, rect: &Rect) -> bool {
        self.segments.iter().any(|s| intersects(&s.horizontal, rect))
    }

    /// True when `rect` touches any bar of any corner.
    pub fn blocks(&self, rect: &Rect) -> bool {
        self.hits_vertical_bar(rect) || self.hits_horizontal_bar(rect)
    }
}

impl Default for WallSet {
    fn default() -> Self {
        Self::for_arena(ARENA_WIDTH, ARENA_HEIGHT)
    }
}
