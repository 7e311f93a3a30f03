//! Platform detection
//!
//! Finds the landing point on the next platform. A row scan finds the
//! platform's top vertex, then an ordered chain of rules moves the candidate
//! down to the centre of the top face:
//!
//! 1. bottom edge: mirror the top vertex onto the face's bottom vertex
//! 2. asymmetry: textured or off-centre faces fall back to the fixed span
//! 3. success marker: the white dot left by a perfect landing wins outright
//!
//! Each rule is a pure function of the frame and the current candidate.

use std::ops::Range;

use image::{Rgb, RgbImage};

use super::piece::PieceLocation;
use super::{color_distance, ScanWindow};
use crate::config::DetectionSettings;
use crate::game::Point;

/// Platform position being refined by the rule chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCandidate {
    /// Row of the platform's top vertex
    pub top: u32,
    /// Landing column
    pub x: u32,
    /// Landing row
    pub y: u32,
}

/// A correction pass: returns the new landing row when it fires
pub type PlatformRule = fn(&RgbImage, &PlatformLocator, &PlatformCandidate) -> Option<u32>;

/// Correction passes in application order; later rules override earlier ones
pub const PLATFORM_RULES: [(&str, PlatformRule); 3] = [
    ("bottom_edge", bottom_edge_rule),
    ("asymmetry", asymmetry_rule),
    ("success_marker", success_marker_rule),
];

/// Color-discontinuity scanner for the next platform
#[derive(Debug, Clone)]
pub struct PlatformLocator {
    edge_threshold: u32,
    span: u32,
    symmetry_probe: u32,
    marker: Rgb<u8>,
    marker_depth: u32,
    marker_offset: u32,
}

impl PlatformLocator {
    /// Create a locator from detection settings
    pub fn new(settings: &DetectionSettings) -> Self {
        Self {
            edge_threshold: settings.edge_threshold,
            span: settings.max_platform_span,
            symmetry_probe: settings.symmetry_probe,
            marker: Rgb(settings.marker_color),
            marker_depth: settings.marker_search_depth,
            marker_offset: settings.marker_offset,
        }
    }

    /// Locate the landing point, or `None` when the piece is unknown or no
    /// edge is found
    pub fn locate(&self, frame: &RgbImage, piece: &PieceLocation) -> Option<Point> {
        if piece.point.is_sentinel() {
            return None;
        }

        let mut candidate = self.find_top_vertex(frame, piece)?;
        for (name, rule) in PLATFORM_RULES {
            if let Some(y) = rule(frame, self, &candidate) {
                log::trace!("Platform rule {} moved y {} -> {}", name, candidate.y, y);
                candidate.y = y;
            }
        }

        log::debug!(
            "Platform at ({}, {}) with top vertex at row {}",
            candidate.x,
            candidate.y,
            candidate.top
        );
        Some(Point::new(candidate.x, candidate.y))
    }

    /// Scan the middle band for the first row that breaks from the background
    ///
    /// Columns within the piece's radius are skipped so its head is never taken
    /// for a platform edge. The initial landing row is the top vertex itself.
    pub fn find_top_vertex(
        &self,
        frame: &RgbImage,
        piece: &PieceLocation,
    ) -> Option<PlatformCandidate> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let mut band = ScanWindow::middle_band(width, height);
        band.columns = search_columns(width, piece.point.x);
        let band = band.clipped(width, height);

        for y in band.rows.clone() {
            let background = frame.get_pixel(0, y);
            let mut sum: u64 = 0;
            let mut count: u64 = 0;

            for x in band.columns.clone() {
                if x.abs_diff(piece.point.x) < piece.radius {
                    continue;
                }
                if color_distance(frame.get_pixel(x, y), background) > self.edge_threshold {
                    sum += x as u64;
                    count += 1;
                }
            }

            if count > 0 {
                let x = (sum / count) as u32;
                return Some(PlatformCandidate { top: y, x, y });
            }
        }

        None
    }
}

/// Columns on the side of the screen away from the piece
///
/// The next platform always appears on the far side, and searching only there
/// keeps decorations next to the piece out of the scan.
pub fn search_columns(width: u32, piece_x: u32) -> Range<u32> {
    if piece_x < width / 2 {
        piece_x..width
    } else {
        0..piece_x
    }
}

/// Mirror the top vertex onto the bottom vertex of the top face
///
/// Walks up from the largest possible span to the first pixel matching the
/// top vertex's color and lands halfway between the two.
pub fn bottom_edge_rule(
    frame: &RgbImage,
    locator: &PlatformLocator,
    candidate: &PlatformCandidate,
) -> Option<u32> {
    let (_, height) = frame.dimensions();
    let top = candidate.top;
    let top_color = frame.get_pixel(candidate.x, top);
    let lowest = top.saturating_add(locator.span).min(height.saturating_sub(1));

    let bottom = (top + 1..=lowest)
        .rev()
        .find(|&k| color_distance(frame.get_pixel(candidate.x, k), top_color) < locator.edge_threshold)
        .unwrap_or(top + 1);

    Some((top + bottom) / 2)
}

/// Fall back to half the fixed span when the face isn't symmetric
///
/// Different colors just above and below the landing row mean the bottom
/// vertex was misread (grass, wood grain, off-diamond shapes).
pub fn asymmetry_rule(
    frame: &RgbImage,
    locator: &PlatformLocator,
    candidate: &PlatformCandidate,
) -> Option<u32> {
    let (_, height) = frame.dimensions();
    let above = candidate.y.checked_sub(locator.symmetry_probe)?;
    let below = candidate.y.saturating_add(locator.symmetry_probe);
    if below >= height {
        return None;
    }

    if frame.get_pixel(candidate.x, above) != frame.get_pixel(candidate.x, below) {
        // (2 * top + span / 2) / 2
        Some(candidate.top.saturating_add(locator.span / 4))
    } else {
        None
    }
}

/// Land on the centre marker left by a perfect previous jump
pub fn success_marker_rule(
    frame: &RgbImage,
    locator: &PlatformLocator,
    candidate: &PlatformCandidate,
) -> Option<u32> {
    let (_, height) = frame.dimensions();
    let end = candidate.top.saturating_add(locator.marker_depth).min(height);

    (candidate.top..end)
        .find(|&y| color_distance(frame.get_pixel(candidate.x, y), &locator.marker) == 0)
        .map(|y| y.saturating_add(locator.marker_offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    const BACKGROUND: Rgb<u8> = Rgb([200, 200, 200]);
    const TOP_FACE: Rgb<u8> = Rgb([90, 90, 90]);
    const SIDE_FACE: Rgb<u8> = Rgb([150, 60, 60]);

    fn locator() -> PlatformLocator {
        PlatformLocator::new(&DetectionSettings::default())
    }

    fn piece_at(x: u32, y: u32, radius: u32) -> PieceLocation {
        PieceLocation {
            point: Point::new(x, y),
            radius,
        }
    }

    /// 200x10 top face centred on (800, 900)
    fn frame_with_band() -> RgbImage {
        ImageBuffer::from_fn(1080, 1920, |x, y| {
            if (700..900).contains(&x) && (895..905).contains(&y) {
                TOP_FACE
            } else {
                BACKGROUND
            }
        })
    }

    #[test]
    fn test_search_columns() {
        assert_eq!(search_columns(1080, 300), 300..1080);
        assert_eq!(search_columns(1080, 540), 0..540);
        assert_eq!(search_columns(1080, 900), 0..900);
    }

    #[test]
    fn test_top_vertex() {
        let frame = frame_with_band();
        let candidate = locator()
            .find_top_vertex(&frame, &piece_at(400, 1200, 40))
            .unwrap();

        assert_eq!(candidate.top, 895);
        assert_eq!(candidate.x, 799);
        assert_eq!(candidate.y, 895);
    }

    #[test]
    fn test_band_on_wrong_side_is_ignored() {
        let frame = frame_with_band();
        // Piece right of centre only searches left of itself
        assert_eq!(locator().find_top_vertex(&frame, &piece_at(650, 1200, 40)), None);
    }

    #[test]
    fn test_sentinel_piece_skips_search() {
        let frame = frame_with_band();
        assert_eq!(locator().locate(&frame, &piece_at(0, 0, 0)), None);
    }

    #[test]
    fn test_piece_radius_excluded() {
        // Only thing on screen is the piece's own head
        let frame: RgbImage = ImageBuffer::from_fn(1080, 1920, |x, y| {
            if (380..420).contains(&x) && (1000..1220).contains(&y) {
                Rgb([55, 55, 95])
            } else {
                BACKGROUND
            }
        });
        assert_eq!(locator().locate(&frame, &piece_at(400, 1200, 40)), None);
    }

    #[test]
    fn test_result_outside_piece_radius() {
        // Platform touching the piece's column range
        let frame: RgbImage = ImageBuffer::from_fn(1080, 1920, |x, y| {
            if (400..700).contains(&x) && (800..810).contains(&y) {
                TOP_FACE
            } else {
                BACKGROUND
            }
        });
        let piece = piece_at(400, 1200, 60);
        let platform = locator().locate(&frame, &piece).unwrap();
        assert!(platform.x.abs_diff(piece.point.x) >= piece.radius);
    }

    #[test]
    fn test_bottom_edge_rule() {
        let frame = frame_with_band();
        let candidate = PlatformCandidate {
            top: 895,
            x: 799,
            y: 895,
        };
        // Lowest matching row is 904
        assert_eq!(bottom_edge_rule(&frame, &locator(), &candidate), Some(899));
    }

    #[test]
    fn test_bottom_edge_rule_without_match() {
        let frame: RgbImage = ImageBuffer::from_fn(100, 300, |_, y| {
            if y == 120 {
                TOP_FACE
            } else {
                BACKGROUND
            }
        });
        let candidate = PlatformCandidate {
            top: 120,
            x: 50,
            y: 120,
        };
        assert_eq!(bottom_edge_rule(&frame, &locator(), &candidate), Some(120));
    }

    #[test]
    fn test_asymmetry_rule() {
        let locator = locator();

        // Symmetric face: no correction
        let frame = frame_with_band();
        let candidate = PlatformCandidate {
            top: 895,
            x: 799,
            y: 899,
        };
        assert_eq!(asymmetry_rule(&frame, &locator, &candidate), None);

        // Textured face: upper half one color, lower half another
        let frame: RgbImage = ImageBuffer::from_fn(1080, 1920, |x, y| {
            if !(700..900).contains(&x) {
                BACKGROUND
            } else if (895..900).contains(&y) {
                TOP_FACE
            } else if (900..960).contains(&y) {
                SIDE_FACE
            } else {
                BACKGROUND
            }
        });
        let candidate = PlatformCandidate {
            top: 895,
            x: 799,
            y: 897,
        };
        assert_eq!(asymmetry_rule(&frame, &locator, &candidate), Some(963));
    }

    #[test]
    fn test_asymmetry_rule_near_edges() {
        let frame: RgbImage = ImageBuffer::from_pixel(10, 10, BACKGROUND);
        let locator = locator();
        let top_row = PlatformCandidate { top: 0, x: 5, y: 1 };
        assert_eq!(asymmetry_rule(&frame, &locator, &top_row), None);
        let bottom_row = PlatformCandidate { top: 0, x: 5, y: 8 };
        assert_eq!(asymmetry_rule(&frame, &locator, &bottom_row), None);
    }

    #[test]
    fn test_success_marker_rule() {
        let mut frame = frame_with_band();
        let candidate = PlatformCandidate {
            top: 895,
            x: 799,
            y: 899,
        };
        assert_eq!(success_marker_rule(&frame, &locator(), &candidate), None);

        frame.put_pixel(799, 950, Rgb([245, 245, 245]));
        assert_eq!(success_marker_rule(&frame, &locator(), &candidate), Some(960));

        // Beyond the search depth
        let mut frame = frame_with_band();
        frame.put_pixel(799, 1100, Rgb([245, 245, 245]));
        assert_eq!(success_marker_rule(&frame, &locator(), &candidate), None);
    }

    #[test]
    fn test_near_marker_color_does_not_fire() {
        let mut frame = frame_with_band();
        frame.put_pixel(799, 950, Rgb([245, 245, 244]));
        let candidate = PlatformCandidate {
            top: 895,
            x: 799,
            y: 899,
        };
        assert_eq!(success_marker_rule(&frame, &locator(), &candidate), None);
    }

    #[test]
    fn test_full_chain() {
        let frame = frame_with_band();
        let platform = locator().locate(&frame, &piece_at(400, 1200, 40)).unwrap();
        assert_eq!(platform, Point::new(799, 899));
    }

    #[test]
    fn test_marker_overrides_chain() {
        let mut frame = frame_with_band();
        for y in 948..953 {
            for x in 797..803 {
                frame.put_pixel(x, y, Rgb([245, 245, 245]));
            }
        }
        let platform = locator().locate(&frame, &piece_at(400, 1200, 40)).unwrap();
        assert_eq!(platform, Point::new(799, 958));
    }

    #[test]
    fn test_extreme_settings_do_not_overflow() {
        let settings = DetectionSettings {
            max_platform_span: u32::MAX,
            symmetry_probe: u32::MAX,
            marker_search_depth: u32::MAX,
            marker_offset: u32::MAX,
            ..DetectionSettings::default()
        };
        let locator = PlatformLocator::new(&settings);

        let mut frame = frame_with_band();
        let platform = locator.locate(&frame, &piece_at(400, 1200, 40)).unwrap();
        assert_eq!(platform, Point::new(799, 899));

        frame.put_pixel(799, 950, Rgb([245, 245, 245]));
        let platform = locator.locate(&frame, &piece_at(400, 1200, 40)).unwrap();
        assert_eq!(platform, Point::new(799, u32::MAX));
    }

    #[test]
    fn test_asymmetry_with_huge_span() {
        let settings = DetectionSettings {
            max_platform_span: u32::MAX,
            ..DetectionSettings::default()
        };
        let locator = PlatformLocator::new(&settings);
        let candidate = PlatformCandidate {
            top: 895,
            x: 799,
            y: 903,
        };
        assert_eq!(
            asymmetry_rule(&frame_with_band(), &locator, &candidate),
            Some(1_073_742_718)
        );
    }
}
