use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Offset of a single cell relative to a shape's anchor.
///
/// `x` grows to the right and `y` grows upward in board coordinates, matching
/// [`Position`](super::Position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    dx: i8,
    dy: i8,
}

impl Offset {
    #[must_use]
    pub const fn new(dx: i8, dy: i8) -> Self {
        Self { dx, dy }
    }

    #[must_use]
    pub const fn dx(self) -> i8 {
        self.dx
    }

    #[must_use]
    pub const fn dy(self) -> i8 {
        self.dy
    }
}

/// Display color of a shape as 8-bit sRGB.
///
/// Serialized as a `"#rrggbb"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ShapeColor {
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn from_hex(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }
}

impl fmt::Display for ShapeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for ShapeColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShapeColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let hex = s.strip_prefix('#').ok_or_else(|| {
            serde::de::Error::custom(format!("expected color in '#rrggbb' format, got '{s}'"))
        })?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(serde::de::Error::custom(format!(
                "expected 6 hex digits after '#', got '{hex}'"
            )));
        }
        let rgb = u32::from_str_radix(hex, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid color: {s} ({e})")))?;
        Ok(Self::from_hex(rgb))
    }
}

/// Index into the static shape catalog.
///
/// A `ShapeId` always refers to an existing catalog entry, so lookups never fail.
/// Serialized as the plain catalog index.
///
/// # Example
///
/// ```
/// use gridfill_engine::ShapeId;
///
/// let line = ShapeId::LINE_H4;
/// assert_eq!(line.cell_count(), 4);
/// assert_eq!(line.color().to_string(), "#00ffff");
/// assert_eq!(ShapeId::new(1), Some(line));
/// assert_eq!(ShapeId::new(ShapeId::LEN), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u8);

impl ShapeId {
    /// Number of shapes in the catalog.
    pub const LEN: usize = CATALOG.len();

    pub const O: Self = Self(0);
    pub const LINE_H4: Self = Self(1);
    pub const T: Self = Self(2);
    pub const L: Self = Self(3);
    pub const J: Self = Self(4);
    pub const Z: Self = Self(5);
    pub const S: Self = Self(6);
    pub const SMALL_L: Self = Self(7);
    pub const SINGLE: Self = Self(8);
    pub const PLUS: Self = Self(9);
    pub const BLOCK_3X3: Self = Self(10);
    pub const LINE_V2: Self = Self(11);
    pub const LINE_V3: Self = Self(12);
    pub const LINE_V4: Self = Self(13);
    pub const Z_180: Self = Self(14);
    pub const S_180: Self = Self(15);
    pub const T_90: Self = Self(16);
    pub const T_180: Self = Self(17);
    pub const L_90: Self = Self(18);
    pub const L_180: Self = Self(19);
    pub const J_90: Self = Self(20);
    pub const J_180: Self = Self(21);
    pub const SMALL_L_90: Self = Self(22);
    pub const SMALL_L_180: Self = Self(23);
    pub const R: Self = Self(24);
    pub const R_MIRRORED: Self = Self(25);
    pub const SMALL_R: Self = Self(26);
    pub const WIDE_R: Self = Self(27);

    /// Returns the shape at `index`, or `None` if the index is outside the catalog.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn new(index: usize) -> Option<Self> {
        if index < Self::LEN {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Caller guarantees `index < LEN`.
    pub(crate) const fn from_raw(index: u8) -> Self {
        debug_assert!((index as usize) < Self::LEN);
        Self(index)
    }

    /// Iterates over every shape in catalog order.
    #[expect(clippy::cast_possible_truncation)]
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::LEN as u8).map(Self)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        CATALOG[self.index()].name
    }

    /// Cell offsets relative to the anchor, in catalog order.
    #[must_use]
    pub const fn offsets(self) -> &'static [Offset] {
        CATALOG[self.index()].offsets
    }

    #[must_use]
    pub const fn color(self) -> ShapeColor {
        CATALOG[self.index()].color
    }

    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.offsets().len()
    }

    /// Returns `(min_dx, min_dy, max_dx, max_dy)` over the shape's offsets.
    #[must_use]
    pub fn bounds(self) -> (i8, i8, i8, i8) {
        self.offsets().iter().fold(
            (i8::MAX, i8::MAX, i8::MIN, i8::MIN),
            |(min_x, min_y, max_x, max_y), o| {
                (
                    min_x.min(o.dx),
                    min_y.min(o.dy),
                    max_x.max(o.dx),
                    max_y.max(o.dy),
                )
            },
        )
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0, self.name())
    }
}

impl Serialize for ShapeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for ShapeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let index = u8::deserialize(deserializer)?;
        Self::new(usize::from(index)).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "shape index must be below {}, got {index}",
                Self::LEN
            ))
        })
    }
}

/// Number of shapes in the catalog.
#[must_use]
pub const fn shape_count() -> usize {
    ShapeId::LEN
}

#[derive(Debug)]
struct ShapeDef {
    name: &'static str,
    offsets: &'static [Offset],
    color: ShapeColor,
}

const fn o(dx: i8, dy: i8) -> Offset {
    Offset::new(dx, dy)
}

const fn def(name: &'static str, offsets: &'static [Offset], rgb: u32) -> ShapeDef {
    ShapeDef {
        name,
        offsets,
        color: ShapeColor::from_hex(rgb),
    }
}

const ORANGE: u32 = 0xff_80_00;
const MAGENTA: u32 = 0xff_00_ff;
const BLUE: u32 = 0x00_00_ff;
const BROWN: u32 = 0xcc_66_00;

const CATALOG: [ShapeDef; 28] = [
    def("O", &[o(0, 0), o(1, 0), o(0, 1), o(1, 1)], 0xff_ff_00),
    def("I4", &[o(-1, 0), o(0, 0), o(1, 0), o(2, 0)], 0x00_ff_ff),
    def("T", &[o(0, 0), o(-1, 0), o(1, 0), o(0, 1)], MAGENTA),
    def("L", &[o(-1, 0), o(0, 0), o(1, 0), o(1, 1)], ORANGE),
    def("J", &[o(-1, 0), o(0, 0), o(1, 0), o(-1, 1)], BLUE),
    def("Z", &[o(-1, 0), o(0, 0), o(0, 1), o(1, 1)], 0xff_00_00),
    def("S", &[o(0, 0), o(1, 0), o(-1, 1), o(0, 1)], 0x00_ff_00),
    def("small L", &[o(0, 0), o(1, 0), o(0, 1)], BROWN),
    def("single", &[o(0, 0)], 0xff_ff_ff),
    def(
        "plus",
        &[o(0, 0), o(-1, 0), o(1, 0), o(0, 1), o(0, -1)],
        0xff_b3_e6,
    ),
    def(
        "3x3",
        &[
            o(-1, -1),
            o(0, -1),
            o(1, -1),
            o(-1, 0),
            o(0, 0),
            o(1, 0),
            o(-1, 1),
            o(0, 1),
            o(1, 1),
        ],
        0x00_ff_b3,
    ),
    def("I2 vertical", &[o(0, 0), o(0, 1)], 0xff_80_ff),
    def("I3 vertical", &[o(0, -1), o(0, 0), o(0, 1)], 0xb3_00_ff),
    def("I4 vertical", &[o(0, -1), o(0, 0), o(0, 1), o(0, 2)], 0x00_ff_ff),
    def("Z 180", &[o(0, -1), o(0, 0), o(1, 0), o(1, 1)], ORANGE),
    def("S 180", &[o(1, -1), o(1, 0), o(0, 0), o(0, 1)], 0x80_ff_00),
    def("T 90", &[o(0, -1), o(0, 0), o(0, 1), o(1, 0)], MAGENTA),
    def("T 180", &[o(-1, 0), o(0, 0), o(1, 0), o(0, -1)], MAGENTA),
    def("L 90", &[o(0, -1), o(0, 0), o(0, 1), o(1, -1)], ORANGE),
    def("L 180", &[o(-1, -1), o(-1, 0), o(0, 0), o(1, 0)], ORANGE),
    def("J 90", &[o(0, -1), o(0, 0), o(0, 1), o(-1, -1)], BLUE),
    def("J 180", &[o(-1, 0), o(0, 0), o(1, 0), o(1, -1)], BLUE),
    def("small L 90", &[o(0, 0), o(0, 1), o(1, 1)], BROWN),
    def("small L 180", &[o(0, 0), o(-1, 0), o(0, -1)], BROWN),
    def(
        "R",
        &[o(0, 0), o(0, 1), o(0, -1), o(1, 1), o(1, 0)],
        0xe6_33_33,
    ),
    def(
        "R mirrored",
        &[o(0, 0), o(0, 1), o(0, -1), o(-1, 1), o(-1, 0)],
        0xff_4d_4d,
    ),
    def("small R", &[o(0, 0), o(0, 1), o(1, 1), o(0, -1)], 0xcc_33_66),
    def(
        "wide R",
        &[o(0, 0), o(0, 1), o(0, -1), o(1, 1), o(2, 0), o(1, 0)],
        0xff_26_26,
    ),
];
