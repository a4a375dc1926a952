//! A sprite's visual state and its collision data.
//!
//! All values are in user-interface units: position in stage pixels with the
//! origin at the stage centre, `direction` in degrees with 90 facing right,
//! `size` in percent, `transparency` in `[0, 100]` and `brightness` in
//! `[0, 200]` where 100 is unchanged.

use serde::{Deserialize, Serialize};

use crate::geometry::Polygon;

pub const DEFAULT_DIRECTION: f64 = 90.0;
pub const DEFAULT_SIZE: f64 = 100.0;
pub const DEFAULT_BRIGHTNESS: f64 = 100.0;
pub const MAX_TRANSPARENCY: f64 = 100.0;
pub const MAX_BRIGHTNESS: f64 = 200.0;

/// Image data of a look as delivered by the image importer.
///
/// Polygons are in image coordinates (origin at the lower-left corner); the
/// image centre `(width / 2, height / 2)` is the pivot for rotation and scale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LookData {
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub collision_polygons: Vec<Polygon>,
}

/// Mutable pose and graphic effects of one sprite.
///
/// Deserialization goes through the clamping setters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLook")]
pub struct Look {
    pub x: f64,
    pub y: f64,
    direction: f64,
    size: f64,
    transparency: f64,
    brightness: f64,
    pub visible: bool,
    pub data: Option<LookData>,
}

impl Default for Look {
    fn default() -> Self {
        Look {
            x: 0.0,
            y: 0.0,
            direction: DEFAULT_DIRECTION,
            size: DEFAULT_SIZE,
            transparency: 0.0,
            brightness: DEFAULT_BRIGHTNESS,
            visible: true,
            data: None,
        }
    }
}

/// Persisted look fields before range clamping.
#[derive(Deserialize)]
#[serde(default)]
struct RawLook {
    x: f64,
    y: f64,
    direction: f64,
    size: f64,
    transparency: f64,
    brightness: f64,
    visible: bool,
    data: Option<LookData>,
}

impl Default for RawLook {
    fn default() -> Self {
        RawLook {
            x: 0.0,
            y: 0.0,
            direction: DEFAULT_DIRECTION,
            size: DEFAULT_SIZE,
            transparency: 0.0,
            brightness: DEFAULT_BRIGHTNESS,
            visible: true,
            data: None,
        }
    }
}

impl From<RawLook> for Look {
    fn from(raw: RawLook) -> Self {
        let mut look = Look {
            visible: raw.visible,
            data: raw.data,
            ..Look::default()
        };
        look.set_position(raw.x, raw.y);
        look.set_direction(raw.direction);
        look.set_size(raw.size);
        look.set_transparency(raw.transparency);
        look.set_brightness(raw.brightness);
        look
    }
}

impl Look {
    pub fn with_data(data: LookData) -> Self {
        Look {
            data: Some(data),
            ..Look::default()
        }
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    #[inline]
    pub fn direction(&self) -> f64 {
        self.direction
    }

    /// Set the motion direction, normalised to `(-180, 180]`.
    pub fn set_direction(&mut self, degrees: f64) {
        self.direction = normalize_direction(degrees);
    }

    /// Counter-clockwise rotation of the image in degrees.
    #[inline]
    pub fn rotation(&self) -> f64 {
        DEFAULT_DIRECTION - self.direction
    }

    #[inline]
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Set the size in percent; negative sizes clamp to zero.
    pub fn set_size(&mut self, percent: f64) {
        self.size = percent.max(0.0);
    }

    /// Geometric scale factor (`size / 100`).
    #[inline]
    pub fn scale(&self) -> f64 {
        self.size / 100.0
    }

    #[inline]
    pub fn transparency(&self) -> f64 {
        self.transparency
    }

    pub fn set_transparency(&mut self, value: f64) {
        self.transparency = value.clamp(0.0, MAX_TRANSPARENCY);
    }

    #[inline]
    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    pub fn set_brightness(&mut self, value: f64) {
        self.brightness = value.clamp(0.0, MAX_BRIGHTNESS);
    }

    /// Reset both graphic effects to their neutral values.
    pub fn clear_graphic_effects(&mut self) {
        self.transparency = 0.0;
        self.brightness = DEFAULT_BRIGHTNESS;
    }

    pub fn collision_polygons(&self) -> &[Polygon] {
        self.data
            .as_ref()
            .map_or(&[], |data| data.collision_polygons.as_slice())
    }
}

/// Fold an angle in degrees into `(-180, 180]`.
pub fn normalize_direction(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return DEFAULT_DIRECTION;
    }
    let mut d = degrees % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
