use core::hash::{Hash, Hasher};
use serde::{Deserialize, Serialize};

pub type ColorId = u32;

pub type TileId = u32;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, u8::MAX)
    }

    /// `#rrggbbaa` form, also used as the name of generated colors
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// A color as seen by the matching rules.
///
/// Equality and hashing only look at the name, two independently created colors with the same name match even if
/// their id or value differ.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamedColor {
    id: ColorId,
    value: Rgba,
    name: String,
}

impl NamedColor {
    pub fn new(id: ColorId, value: Rgba, name: impl Into<String>) -> Self {
        Self {
            id,
            value,
            name: name.into(),
        }
    }

    pub fn id(&self) -> ColorId {
        self.id
    }

    pub fn value(&self) -> Rgba {
        self.value
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for NamedColor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for NamedColor {}

impl Hash for NamedColor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    color: NamedColor,
    is_matched: bool,
    is_selected: bool,
    /// Left-over tile of an odd-sized board, never part of a pair
    #[serde(default)]
    is_spare: bool,
}

impl Tile {
    pub fn new(id: TileId, color: NamedColor) -> Self {
        Self {
            id,
            color,
            is_matched: false,
            is_selected: false,
            is_spare: false,
        }
    }

    pub fn spare(id: TileId, color: NamedColor) -> Self {
        Self {
            is_spare: true,
            ..Self::new(id, color)
        }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn color(&self) -> &NamedColor {
        &self.color
    }

    pub fn is_matched(&self) -> bool {
        self.is_matched
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub fn is_spare(&self) -> bool {
        self.is_spare
    }

    /// Whether a tap on this tile can still take part in a pair
    pub fn is_playable(&self) -> bool {
        !self.is_matched && !self.is_spare
    }

    pub fn matches(&self, other: &Tile) -> bool {
        self.color == other.color
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.is_selected = selected;
    }

    pub(crate) fn set_matched(&mut self) {
        self.is_selected = false;
        self.is_matched = true;
    }
}
