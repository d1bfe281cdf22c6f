//! Color space conversion
//!
//! sRGB -> linear RGB -> CIE XYZ (D65) -> CIE L*a*b*. Inputs are normalized
//! to `[0, 1]`. Region statistics feed non-color quantities (deviation,
//! skewness) through the same pipeline, so values outside `[0, 1]` are
//! accepted and simply follow the linear branch of the transfer curve.

use crate::color::Rgb;

/// D65 reference white in XYZ
pub const D65_WHITE: [f32; 3] = [0.950166, 1.0, 1.087654];

/// CIE epsilon (216/24389)
const CIE_E: f32 = 216.0 / 24389.0;
/// CIE kappa (24389/27)
const CIE_K: f32 = 24389.0 / 27.0;

/// CIE L*a*b* color representation
///
/// - `l`: Lightness in range [0.0, 100.0]
/// - `a`: Green-Red component
/// - `b`: Blue-Yellow component
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Lab {
    /// Create a new Lab color
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Components as an array
    pub fn to_array(self) -> [f32; 3] {
        [self.l, self.a, self.b]
    }

    /// Squared Euclidean distance in Lab
    pub fn distance_sq(self, other: Lab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dl * dl + da * da + db * db
    }
}

/// CIE XYZ color representation (D65 illuminant)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Xyz {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Undo the sRGB transfer curve on one normalized component
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

/// Linear RGB to XYZ
pub fn linear_rgb_to_xyz(rgb: [f32; 3]) -> Xyz {
    let [r, g, b] = rgb;
    Xyz {
        x: 0.412424 * r + 0.357579 * g + 0.180464 * b,
        y: 0.212656 * r + 0.715158 * g + 0.0721856 * b,
        z: 0.0193324 * r + 0.119193 * g + 0.950444 * b,
    }
}

/// XYZ to L*a*b* relative to [`D65_WHITE`]
pub fn xyz_to_lab(xyz: Xyz) -> Lab {
    let f = |v: f32| {
        if v > CIE_E {
            v.cbrt()
        } else {
            (CIE_K * v + 16.0) / 116.0
        }
    };
    let fx = f(xyz.x / D65_WHITE[0]);
    let fy = f(xyz.y / D65_WHITE[1]);
    let fz = f(xyz.z / D65_WHITE[2]);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Normalized sRGB components to L*a*b*
pub fn srgb_to_lab(srgb: [f32; 3]) -> Lab {
    let linear = [
        srgb_to_linear(srgb[0]),
        srgb_to_linear(srgb[1]),
        srgb_to_linear(srgb[2]),
    ];
    xyz_to_lab(linear_rgb_to_xyz(linear))
}

/// 8-bit RGB pixel to L*a*b*
pub fn rgb_to_lab(rgb: Rgb) -> Lab {
    srgb_to_lab([
        rgb.r as f32 / 255.0,
        rgb.g as f32 / 255.0,
        rgb.b as f32 / 255.0,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_white() {
        let black = rgb_to_lab(Rgb::BLACK);
        assert!(black.l.abs() < 1e-3);

        let white = rgb_to_lab(Rgb::WHITE);
        assert!((white.l - 100.0).abs() < 0.1);
        assert!(white.a.abs() < 1.0);
        assert!(white.b.abs() < 1.0);
    }

    #[test]
    fn test_red_is_positive_a() {
        let red = rgb_to_lab(Rgb::new(255, 0, 0));
        assert!(red.a > 50.0);
        assert!(red.l > 40.0 && red.l < 60.0);
    }

    #[test]
    fn test_gray_is_neutral() {
        let gray = rgb_to_lab(Rgb::gray(128));
        assert!(gray.a.abs() < 1.0);
        assert!(gray.b.abs() < 1.0);
    }

    #[test]
    fn test_distance_sq() {
        let a = Lab::new(0.0, 0.0, 0.0);
        let b = Lab::new(1.0, 2.0, 2.0);
        assert!((a.distance_sq(b) - 9.0).abs() < 1e-6);
    }
}
