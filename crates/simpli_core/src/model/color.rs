//! Project color model and its storage codec.
//!
//! # Responsibility
//! - Define the RGBA value attached to every project.
//! - Define the fixed palette offered by the edit form.
//! - Convert colors to and from the opaque blob stored in `projects.color`.
//!
//! # Invariants
//! - Every component of a constructed `Rgba` is finite and inside `[0, 1]`.
//! - `decode_color(&encode_color(c)) == c` for every valid color.
//! - The blob layout is versioned; unknown versions are rejected.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Version tag written as the first byte of every encoded color.
const COLOR_BLOB_VERSION: u8 = 1;
/// Version byte plus four little-endian `f32` components.
const COLOR_BLOB_LEN: usize = 1 + 4 * 4;

/// Errors raised while constructing or decoding a color.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorError {
    /// Component is NaN/infinite or outside `[0, 1]`.
    ComponentOutOfRange { component: &'static str, value: f32 },
    /// Blob does not have the expected byte length.
    InvalidBlobLength(usize),
    /// Blob was written by an unknown codec version.
    UnsupportedBlobVersion(u8),
}

impl Display for ColorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ComponentOutOfRange { component, value } => {
                write!(f, "color component `{component}` out of range: {value}")
            }
            Self::InvalidBlobLength(len) => write!(
                f,
                "color blob must be {COLOR_BLOB_LEN} bytes, got {len}"
            ),
            Self::UnsupportedBlobVersion(version) => {
                write!(f, "unsupported color blob version {version}")
            }
        }
    }
}

impl Error for ColorError {}

/// Straight (non-premultiplied) RGBA color with `f32` components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Rgba {
    /// Creates a color after range-checking every component.
    pub fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Result<Self, ColorError> {
        let color = Self {
            red,
            green,
            blue,
            alpha,
        };
        color.validate()?;
        Ok(color)
    }

    /// Creates an opaque color from 8-bit channels.
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: f32::from(red) / 255.0,
            green: f32::from(green) / 255.0,
            blue: f32::from(blue) / 255.0,
            alpha: 1.0,
        }
    }

    /// Checks component ranges.
    pub fn validate(&self) -> Result<(), ColorError> {
        for (component, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ColorError::ComponentOutOfRange { component, value });
            }
        }
        Ok(())
    }

    /// Component-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Rgba, tolerance: f32) -> bool {
        (self.red - other.red).abs() <= tolerance
            && (self.green - other.green).abs() <= tolerance
            && (self.blue - other.blue).abs() <= tolerance
            && (self.alpha - other.alpha).abs() <= tolerance
    }

    /// Packs the color as `0xAARRGGBB`, the layout Flutter's `Color` expects.
    pub fn to_argb32(&self) -> u32 {
        let channel = |value: f32| u32::from((value * 255.0).round().clamp(0.0, 255.0) as u8);
        (channel(self.alpha) << 24)
            | (channel(self.red) << 16)
            | (channel(self.green) << 8)
            | channel(self.blue)
    }
}

/// Fixed palette offered when editing a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectColor {
    Red,
    Green,
    Blue,
    Teal,
    Brown,
    Purple,
}

impl ProjectColor {
    /// Palette in display order.
    pub const ALL: [ProjectColor; 6] = [
        ProjectColor::Red,
        ProjectColor::Green,
        ProjectColor::Blue,
        ProjectColor::Teal,
        ProjectColor::Brown,
        ProjectColor::Purple,
    ];

    /// Color assigned to newly created projects.
    pub const DEFAULT: ProjectColor = ProjectColor::Purple;

    /// Concrete RGBA value for this palette entry.
    pub fn rgba(self) -> Rgba {
        match self {
            Self::Red => Rgba::from_rgb8(255, 59, 48),
            Self::Green => Rgba::from_rgb8(52, 199, 89),
            Self::Blue => Rgba::from_rgb8(0, 122, 255),
            Self::Teal => Rgba::from_rgb8(48, 176, 199),
            Self::Brown => Rgba::from_rgb8(162, 132, 94),
            Self::Purple => Rgba::from_rgb8(175, 82, 222),
        }
    }

    /// Stable lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Teal => "teal",
            Self::Brown => "brown",
            Self::Purple => "purple",
        }
    }

    /// Finds the palette entry matching `color`, if any.
    pub fn from_rgba(color: &Rgba) -> Option<ProjectColor> {
        Self::ALL
            .into_iter()
            .find(|entry| entry.rgba().approx_eq(color, 1.0 / 512.0))
    }

    /// Palette entry at display position `index`.
    pub fn from_index(index: usize) -> Option<ProjectColor> {
        Self::ALL.get(index).copied()
    }
}

impl From<ProjectColor> for Rgba {
    fn from(value: ProjectColor) -> Self {
        value.rgba()
    }
}

/// Encodes a color into the blob stored in `projects.color`.
pub fn encode_color(color: &Rgba) -> Vec<u8> {
    let mut blob = Vec::with_capacity(COLOR_BLOB_LEN);
    blob.push(COLOR_BLOB_VERSION);
    for value in [color.red, color.green, color.blue, color.alpha] {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

/// Decodes a blob produced by [`encode_color`].
pub fn decode_color(blob: &[u8]) -> Result<Rgba, ColorError> {
    if blob.len() != COLOR_BLOB_LEN {
        return Err(ColorError::InvalidBlobLength(blob.len()));
    }
    if blob[0] != COLOR_BLOB_VERSION {
        return Err(ColorError::UnsupportedBlobVersion(blob[0]));
    }

    let mut components = [0.0_f32; 4];
    for (slot, chunk) in components.iter_mut().zip(blob[1..].chunks_exact(4)) {
        *slot = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    let [red, green, blue, alpha] = components;
    Rgba::new(red, green, blue, alpha)
}
