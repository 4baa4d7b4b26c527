//! Color filter descriptors and their per-pixel evaluation.
//!
//! A [`FilterChain`] is an ordered list of [`FilterOp`]s applied left to right,
//! each on normalized sRGB channels and clamped to `[0, 1]` before the next op
//! runs. The coefficient matrices are the ones the CSS filter functions of the
//! same names are defined by.

use std::fmt;

/// A single color operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    /// Linear multiplier, 1.0 = identity
    Brightness(f32),
    /// Scale around mid-grey, 1.0 = identity
    Contrast(f32),
    /// Saturation, 0.0 = grey, 1.0 = identity
    Saturate(f32),
    /// Hue rotation in degrees
    HueRotate(f32),
    /// Amount in `[0, 1]`
    Grayscale(f32),
    /// Amount in `[0, 1]`
    Sepia(f32),
}

impl FilterOp {
    /// Apply this op to a normalized RGB triple
    pub fn apply(&self, [r, g, b]: [f32; 3]) -> [f32; 3] {
        let out = match *self {
            FilterOp::Brightness(k) => [r * k, g * k, b * k],
            FilterOp::Contrast(k) => {
                let offset = 0.5 - 0.5 * k;
                [r * k + offset, g * k + offset, b * k + offset]
            }
            FilterOp::Saturate(s) => mul(&saturate_matrix(s), [r, g, b]),
            FilterOp::HueRotate(deg) => mul(&hue_rotate_matrix(deg), [r, g, b]),
            FilterOp::Grayscale(a) => mul(&grayscale_matrix(a.clamp(0.0, 1.0)), [r, g, b]),
            FilterOp::Sepia(a) => mul(&sepia_matrix(a.clamp(0.0, 1.0)), [r, g, b]),
        };
        out.map(|c| c.clamp(0.0, 1.0))
    }

    /// True when the op leaves every pixel unchanged
    pub fn is_identity(&self) -> bool {
        match *self {
            FilterOp::Brightness(k) | FilterOp::Contrast(k) | FilterOp::Saturate(k) => k == 1.0,
            FilterOp::HueRotate(deg) => deg % 360.0 == 0.0,
            FilterOp::Grayscale(a) | FilterOp::Sepia(a) => a <= 0.0,
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Brightness(k) => write!(f, "brightness({})", k),
            FilterOp::Contrast(k) => write!(f, "contrast({})", k),
            FilterOp::Saturate(k) => write!(f, "saturate({})", k),
            FilterOp::HueRotate(deg) => write!(f, "hue-rotate({}deg)", deg),
            FilterOp::Grayscale(a) => write!(f, "grayscale({})", a),
            FilterOp::Sepia(a) => write!(f, "sepia({})", a),
        }
    }
}

type Matrix = [[f32; 3]; 3];

fn mul(m: &Matrix, [r, g, b]: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * r + m[0][1] * g + m[0][2] * b,
        m[1][0] * r + m[1][1] * g + m[1][2] * b,
        m[2][0] * r + m[2][1] * g + m[2][2] * b,
    ]
}

fn saturate_matrix(s: f32) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_rotate_matrix(deg: f32) -> Matrix {
    let (sin, cos) = deg.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

fn grayscale_matrix(a: f32) -> Matrix {
    let k = 1.0 - a;
    [
        [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
    ]
}

fn sepia_matrix(a: f32) -> Matrix {
    let k = 1.0 - a;
    [
        [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
        [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
        [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
    ]
}

/// Ordered composition of filter ops
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    ops: Vec<FilterOp>,
}

impl FilterChain {
    pub fn new(ops: impl Into<Vec<FilterOp>>) -> Self {
        Self { ops: ops.into() }
    }

    /// Append an op after the existing ones
    pub fn then(mut self, op: FilterOp) -> Self {
        self.ops.push(op);
        self
    }

    pub fn ops(&self) -> &[FilterOp] {
        &self.ops
    }

    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(FilterOp::is_identity)
    }

    /// Apply every op in order to a normalized RGB triple
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        self.ops.iter().fold(rgb, |acc, op| op.apply(acc))
    }

    /// Apply to an 8-bit RGB triple
    pub fn apply_u8(&self, [r, g, b]: [u8; 3]) -> [u8; 3] {
        let out = self.apply([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]);
        out.map(|c| (c * 255.0).round() as u8)
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-3)
    }

    #[test]
    fn test_identity_ops_preserve_color() {
        let color = [0.2, 0.5, 0.8];
        for op in [
            FilterOp::Brightness(1.0),
            FilterOp::Contrast(1.0),
            FilterOp::Saturate(1.0),
            FilterOp::HueRotate(0.0),
            FilterOp::Grayscale(0.0),
            FilterOp::Sepia(0.0),
        ] {
            assert!(op.is_identity());
            assert!(close(op.apply(color), color), "{} changed the color", op);
        }
    }

    #[test]
    fn test_full_grayscale_equalizes_channels() {
        let [r, g, b] = FilterOp::Grayscale(1.0).apply([0.9, 0.1, 0.3]);
        assert!((r - g).abs() < 1e-4 && (g - b).abs() < 1e-4);
    }

    #[test]
    fn test_contrast_pivots_on_mid_grey() {
        let op = FilterOp::Contrast(1.5);
        assert!(close(op.apply([0.5, 0.5, 0.5]), [0.5, 0.5, 0.5]));
        let [r, _, _] = op.apply([0.7, 0.7, 0.7]);
        assert!((r - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_results_are_clamped() {
        let out = FilterOp::Brightness(3.0).apply([0.9, 0.5, 0.1]);
        assert_eq!(out[0], 1.0);
        assert!(out.iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn test_sepia_warms_neutral_grey() {
        let [r, g, b] = FilterOp::Sepia(1.0).apply([0.5, 0.5, 0.5]);
        assert!(r > g && g > b);
    }

    #[test]
    fn test_full_hue_turn_is_identity() {
        let color = [0.3, 0.6, 0.1];
        assert!(close(FilterOp::HueRotate(360.0).apply(color), color));
    }

    #[test]
    fn test_chain_display() {
        let chain = FilterChain::new([FilterOp::Grayscale(1.0), FilterOp::Contrast(1.2)])
            .then(FilterOp::HueRotate(-10.0));
        assert_eq!(chain.to_string(), "grayscale(1) contrast(1.2) hue-rotate(-10deg)");
    }
}
