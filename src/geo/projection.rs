//! Orthographic projection and sphere rotation.
//!
//! Geographic coordinates are first rotated into the view frame (a unit
//! vector whose `x` axis points at the viewer), then dropped onto the view
//! plane. Only the hemisphere cap within `clip_angle` of the view centre is
//! considered visible.

use geo_types::Coord;
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Spherical rotation applied before projecting, in degrees.
///
/// Roll is always zero. Rotating by `(lon, lat)` brings the geographic point
/// `(-lon, -lat)` to the centre of the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub longitude: f64,
    pub latitude: f64,
}

impl Rotation {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Orthographic projection with a fixed scale and clip angle.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthographicProjection {
    /// Current rotation of the sphere.
    pub rotation: Rotation,
    /// Radius of the full sphere in pixels.
    pub scale: f64,
    /// Clip angle in degrees.
    clip_angle: f64,
    /// Cached cosine of the clip angle.
    cos_clip: f64,
    /// Screen position of the view centre.
    pub translate: DVec2,
}

impl OrthographicProjection {
    /// Creates a projection centred at the origin.
    pub fn new(scale: f64, clip_angle: f64) -> Self {
        let clip_angle = clip_angle.clamp(f64::EPSILON, 90.0);
        Self {
            rotation: Rotation::default(),
            scale,
            clip_angle,
            cos_clip: clip_angle.to_radians().cos(),
            translate: DVec2::ZERO,
        }
    }

    /// Cosine of the clip angle; a view vector is visible when its `x`
    /// component exceeds this.
    pub fn cos_clip(&self) -> f64 {
        self.cos_clip
    }

    /// Radius of the clip circle on the unit view plane.
    pub fn sin_clip(&self) -> f64 {
        self.clip_angle.to_radians().sin()
    }

    /// Radius of the visible disc in pixels.
    pub fn rim_radius(&self) -> f64 {
        self.scale * self.sin_clip()
    }

    /// Centres the projection in a viewport of the given size.
    pub fn fit_viewport(&mut self, width: f64, height: f64) {
        self.translate = DVec2::new(width / 2.0, height / 2.0);
    }

    /// Rotates a geographic coordinate (lon, lat in degrees) into a unit
    /// vector in the view frame.
    pub fn rotate(&self, coord: Coord<f64>) -> DVec3 {
        let lambda = (coord.x + self.rotation.longitude).to_radians();
        let phi = coord.y.to_radians();
        let (sin_dphi, cos_dphi) = self.rotation.latitude.to_radians().sin_cos();

        let cos_phi = phi.cos();
        let x = lambda.cos() * cos_phi;
        let y = lambda.sin() * cos_phi;
        let z = phi.sin();

        DVec3::new(x * cos_dphi - z * sin_dphi, y, z * cos_dphi + x * sin_dphi)
    }

    /// Inverse of [`rotate`](Self::rotate): view-frame vector back to
    /// geographic (lon, lat) in degrees, longitude normalised to [-180, 180].
    pub fn unrotate(&self, v: DVec3) -> Coord<f64> {
        let (sin_dphi, cos_dphi) = self.rotation.latitude.to_radians().sin_cos();
        let x = v.x * cos_dphi + v.z * sin_dphi;
        let z = v.z * cos_dphi - v.x * sin_dphi;

        let lon = v.y.atan2(x).to_degrees() - self.rotation.longitude;
        let lat = z.clamp(-1.0, 1.0).asin().to_degrees();

        Coord {
            x: normalize_longitude(lon),
            y: lat,
        }
    }

    /// Whether a view-frame vector lies inside the clip circle.
    pub fn is_visible(&self, v: DVec3) -> bool {
        v.x > self.cos_clip
    }

    /// Maps a view-frame vector to screen coordinates, ignoring clipping.
    pub fn to_screen(&self, v: DVec3) -> DVec2 {
        DVec2::new(
            self.translate.x + self.scale * v.y,
            self.translate.y - self.scale * v.z,
        )
    }

    /// Projects a geographic coordinate, returning `None` if it is clipped.
    pub fn project(&self, coord: Coord<f64>) -> Option<DVec2> {
        let v = self.rotate(coord);
        self.is_visible(v).then(|| self.to_screen(v))
    }

    /// Converts a screen position back to geographic coordinates.
    ///
    /// Returns `None` outside the visible disc.
    pub fn invert(&self, point: DVec2) -> Option<Coord<f64>> {
        let y = (point.x - self.translate.x) / self.scale;
        let z = (self.translate.y - point.y) / self.scale;
        let rho2 = y * y + z * z;
        let sin_clip = self.sin_clip();
        if rho2 > sin_clip * sin_clip {
            return None;
        }
        let x = (1.0 - rho2).max(0.0).sqrt();
        Some(self.unrotate(DVec3::new(x, y, z)))
    }
}

/// Wraps a longitude into [-180, 180].
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}
