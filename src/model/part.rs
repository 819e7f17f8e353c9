use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

/// Axis-aligned rectangle; `min` is inclusive, `max` exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Builds a rectangle from two corners, swapping coordinates so that
    /// `min <= max` on both axes.
    pub fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self {
            min: Point { x: min_x, y: min_y },
            max: Point { x: max_x, y: max_y },
        }
    }

    pub fn from_origin_size(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    pub fn width(&self) -> i64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i64 {
        self.max.y - self.min.y
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Whether this rectangle is non-empty and lies inside `(0, 0, width, height)`.
    pub fn within(&self, width: u32, height: u32) -> bool {
        !self.is_empty()
            && self.min.x >= 0
            && self.min.y >= 0
            && self.max.x <= i64::from(width)
            && self.max.y <= i64::from(height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}

/// The four values a rule has to provide before it describes a rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    X,
    Y,
    W,
    H,
}

impl Key {
    pub const ALL: [Key; 4] = [Key::X, Key::Y, Key::W, Key::H];

    pub fn index(self) -> usize {
        match self {
            Key::X => 0,
            Key::Y => 1,
            Key::W => 2,
            Key::H => 3,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Key::X => "x",
            Key::Y => "y",
            Key::W => "w",
            Key::H => "h",
        };
        f.write_str(s)
    }
}

/// A named rectangle inside a sprite, guessed from one CSS rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub rect: Rect,
}

impl Part {
    pub fn new(name: impl Into<String>, rect: Rect) -> Self {
        Self {
            name: name.into(),
            rect,
        }
    }

    pub fn info(&self) -> String {
        format!(
            "{} {}x{} at ({}, {})",
            self.name,
            self.rect.width(),
            self.rect.height(),
            self.rect.min.x,
            self.rect.min.y
        )
    }
}
