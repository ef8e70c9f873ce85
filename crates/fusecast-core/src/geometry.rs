//! Overlap metrics between axis-aligned boxes.
//!
//! All metrics use the inclusive pixel-edge convention
//! (`width = max(0, x2 - x1 + 1)`) and guard every denominator: a
//! degenerate or disjoint configuration returns 0 rather than dividing
//! by zero.

use crate::types::BBox;

/// Inclusive pixel area. Zero for boxes with negative extent.
pub fn area(b: &BBox) -> f64 {
    let w = (b.x2 - b.x1 + 1.0).max(0.0);
    let h = (b.y2 - b.y1 + 1.0).max(0.0);
    w * h
}

/// Area of the intersection rectangle; zero when the boxes do not overlap.
pub fn intersection_area(a: &BBox, b: &BBox) -> f64 {
    let xa = a.x1.max(b.x1);
    let ya = a.y1.max(b.y1);
    let xb = a.x2.min(b.x2);
    let yb = a.y2.min(b.y2);

    let w = (xb - xa + 1.0).max(0.0);
    let h = (yb - ya + 1.0).max(0.0);
    w * h
}

/// Jaccard index on inclusive areas. Range [0, 1]; 0 when disjoint.
pub fn union_iou(a: &BBox, b: &BBox) -> f64 {
    let inter = intersection_area(a, b);
    let denom = area(a) + area(b) - inter;
    if denom > 0.0 {
        inter / denom
    } else {
        0.0
    }
}

/// The primary matching metric: containment of the smaller box.
///
/// A face box is expected to sit almost entirely inside the person box it
/// belongs to. Plain IoU penalizes that pairing heavily because the person
/// box is much larger, so the signal used here is how much of the smaller
/// box the intersection covers. Order-symmetric, range [0, 1], exactly 1.0
/// when the smaller box is fully inside the larger.
pub fn containment_score(a: &BBox, b: &BBox) -> f64 {
    let inter = intersection_area(a, b);
    let small = area(a).min(area(b));

    if inter >= small && inter > 0.0 {
        small / inter
    } else if small > inter && inter > 0.0 {
        inter / small
    } else {
        0.0
    }
}

/// Area of the smaller box — used as a matching-confidence proxy: a larger
/// overlapping face means a closer, more likely correct subject.
pub fn smallest_area(a: &BBox, b: &BBox) -> f64 {
    area(a).min(area(b))
}

/// Midpoint of the intersection rectangle's corner coordinates.
///
/// NOT the geometric center of either box. Not clamped to overlap: for a
/// box intersected with itself this is simply the box center.
pub fn intersection_center(a: &BBox, b: &BBox) -> (f64, f64) {
    let xa = a.x1.max(b.x1);
    let ya = a.y1.max(b.y1);
    let xb = a.x2.min(b.x2);
    let yb = a.y2.min(b.y2);

    ((xa + xb) / 2.0, (ya + yb) / 2.0)
}

/// Heuristic "where a face would be" point inside a person box: the
/// horizontal midpoint, a quarter of the height down from the top.
pub fn upper_anchor(b: &BBox) -> (f64, f64) {
    let cx = (b.x1 + b.x2) / 2.0;
    let cy = b.y1 + (b.y2 - b.y1) / 4.0;
    (cx, cy)
}

/// Euclidean distance between two points.
pub fn distance(p: (f64, f64), q: (f64, f64)) -> f64 {
    (p.0 - q.0).hypot(p.1 - q.1)
}
