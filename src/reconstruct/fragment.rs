//! Positioned fragments and anchor geometry

use serde::{Deserialize, Serialize};

use crate::ocr::BoundingPoly;

/// Anchor given to fragments without any geometry; sorts after everything else.
pub const UNPOSITIONED: u32 = 99_999_999;

/// One reconstructed text unit with its top-left anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionedFragment {
    pub x: u32,
    pub y: u32,
    pub word: String,
}

impl PositionedFragment {
    pub fn new(x: u32, y: u32, word: impl Into<String>) -> Self {
        Self {
            x,
            y,
            word: word.into(),
        }
    }

    /// Fragment placed at the sentinel anchor
    pub fn unpositioned(word: impl Into<String>) -> Self {
        Self::new(UNPOSITIONED, UNPOSITIONED, word)
    }

    pub fn is_positioned(&self) -> bool {
        self.x != UNPOSITIONED || self.y != UNPOSITIONED
    }
}

/// Coordinate system of the bounding polygons returned by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorScale {
    /// Integer pixel `vertices` (image detection)
    #[default]
    Pixel,
    /// `normalizedVertices` in [0, 1], rescaled to thousandths (PDF detection)
    Normalized,
}

impl AnchorScale {
    /// Minimum (x, y) over the polygon's vertices in this scale.
    ///
    /// Returns `None` when the polygon carries no vertices of this kind.
    pub fn anchor(&self, poly: &BoundingPoly) -> Option<(u32, u32)> {
        match self {
            AnchorScale::Pixel => {
                let x = poly.vertices.iter().map(|v| v.x).min()?;
                let y = poly.vertices.iter().map(|v| v.y).min()?;
                Some((x.max(0) as u32, y.max(0) as u32))
            }
            AnchorScale::Normalized => {
                let x = poly.normalized_vertices.iter().map(|v| v.x).reduce(f64::min)?;
                let y = poly.normalized_vertices.iter().map(|v| v.y).reduce(f64::min)?;
                Some((thousandths(x), thousandths(y)))
            }
        }
    }
}

fn thousandths(value: f64) -> u32 {
    (value * 1000.0).floor().max(0.0) as u32
}

/// Closed interval with optional bounds on either side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl Span {
    /// Unbounded span
    pub const ANY: Span = Span {
        min: None,
        max: None,
    };

    pub const fn between(min: u32, max: u32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub const fn at_least(min: u32) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub const fn at_most(max: u32) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub const fn exactly(value: u32) -> Self {
        Self::between(value, value)
    }

    pub fn contains(&self, value: u32) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{NormalizedVertex, Vertex};

    #[test]
    fn test_pixel_anchor_takes_minimum_and_clamps() {
        let poly = BoundingPoly {
            vertices: vec![
                Vertex { x: 40, y: 12 },
                Vertex { x: 18, y: 30 },
                Vertex { x: -3, y: 31 },
            ],
            normalized_vertices: vec![],
        };
        assert_eq!(AnchorScale::Pixel.anchor(&poly), Some((0, 12)));
        assert_eq!(AnchorScale::Normalized.anchor(&poly), None);
    }

    #[test]
    fn test_normalized_anchor_rescales_and_floors() {
        let poly = BoundingPoly {
            vertices: vec![],
            normalized_vertices: vec![
                NormalizedVertex { x: 0.2519, y: 0.0659 },
                NormalizedVertex { x: 0.3, y: 0.0651 },
            ],
        };
        assert_eq!(AnchorScale::Normalized.anchor(&poly), Some((251, 65)));
    }

    #[test]
    fn test_span_bounds_are_inclusive() {
        let span = Span::between(606, 608);
        assert!(span.contains(606));
        assert!(span.contains(608));
        assert!(!span.contains(605));
        assert!(!span.contains(609));

        assert!(Span::ANY.contains(0));
        assert!(Span::at_least(800).contains(UNPOSITIONED));
        assert!(!Span::at_most(119).contains(120));
    }

    #[test]
    fn test_unpositioned_sentinel() {
        let fragment = PositionedFragment::unpositioned("x");
        assert!(!fragment.is_positioned());
        assert!(PositionedFragment::new(0, 0, "y").is_positioned());
    }
}
