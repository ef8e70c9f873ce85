//! Conflict resolution: reduce the candidate list to a one-to-one match
//! set between face boxes and person boxes.
//!
//! Two people standing close together produce overlapping person boxes,
//! so a single face can clear the containment threshold against both of
//! them, and one person box can contain two faces. Resolution runs two
//! reduction passes over the candidate list in generation order:
//!
//! 1. per-person dedup — when several faces claim the same person ROI,
//!    the face with the larger overlapping area wins (a bigger face is
//!    closer to the camera, hence the more likely subject);
//! 2. per-face dedup — when one face box claims several person boxes,
//!    the person box whose heuristic face region is nearest to the face
//!    wins.
//!
//! Each pass produces a new filtered list; nothing is deleted while
//! iterating. After both passes no `roi_id` and no `face_id` appears more
//! than once.

use std::collections::HashMap;

use crate::geometry;
use crate::types::{BBox, Candidate};

/// Resolve a frame's candidates into a conflict-free match set.
pub fn resolve_conflicts(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let input = candidates.len();
    let resolved = dedupe_by_face(dedupe_by_person(candidates));
    if resolved.len() < input {
        tracing::debug!(input, kept = resolved.len(), "resolver dropped conflicting candidates");
    }
    resolved
}

/// Keep at most one candidate per person ROI.
///
/// Candidates are processed in generation order. A repeat of an
/// already-seen ROI evicts the recorded candidate only when its
/// `smallest_area` is strictly greater; on an equal or smaller area the
/// newcomer is dropped, so first-seen wins ties.
fn dedupe_by_person(candidates: Vec<Candidate>) -> Vec<Candidate> {
    // roi_id -> (best smallest_area so far, slot in `kept`)
    let mut best: HashMap<String, (f64, usize)> = HashMap::new();
    let mut kept: Vec<Option<Candidate>> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match best.get(&candidate.roi_id) {
            Some(&(prev_area, prev_slot)) => {
                if candidate.smallest_area > prev_area {
                    kept[prev_slot] = None;
                    best.insert(candidate.roi_id.clone(), (candidate.smallest_area, kept.len()));
                    kept.push(Some(candidate));
                }
                // equal or smaller area: newcomer loses
            }
            None => {
                best.insert(candidate.roi_id.clone(), (candidate.smallest_area, kept.len()));
                kept.push(Some(candidate));
            }
        }
    }

    kept.into_iter().flatten().collect()
}

/// Keep at most one candidate per face box.
///
/// Face boxes are compared by coordinate value, not detection identity.
/// When a face box reappears associated with a different person box, the
/// anchor-distance heuristic decides: the person box whose expected face
/// region lies farther from this face loses. On a tie, or when the
/// newcomer is not strictly nearer, the recorded association prevails.
fn dedupe_by_face(candidates: Vec<Candidate>) -> Vec<Candidate> {
    // face bbox value -> (associated person bbox, slot in `kept`)
    let mut seen: HashMap<[u64; 4], (BBox, usize)> = HashMap::new();
    let mut kept: Vec<Option<Candidate>> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let key = candidate.face_bbox.bits();
        match seen.get(&key) {
            Some(&(prev_person, prev_slot)) => {
                // A box intersected with itself is the box, so this is the
                // face box center.
                let face_anchor =
                    geometry::intersection_center(&candidate.face_bbox, &candidate.face_bbox);
                let prev_dist =
                    geometry::distance(face_anchor, geometry::upper_anchor(&prev_person));
                let cur_dist =
                    geometry::distance(face_anchor, geometry::upper_anchor(&candidate.person_bbox));

                if prev_dist > cur_dist {
                    kept[prev_slot] = None;
                    seen.insert(key, (candidate.person_bbox, kept.len()));
                    kept.push(Some(candidate));
                }
                // tie or newcomer farther: recorded association prevails
            }
            None => {
                seen.insert(key, (candidate.person_bbox, kept.len()));
                kept.push(Some(candidate));
            }
        }
    }

    kept.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::{generate_candidates, OVERLAP_THRESHOLD};
    use crate::geometry;
    use crate::types::{BBox, FaceDetection, PersonRoi};
    use std::collections::HashSet;

    fn candidate(face_id: &str, roi_id: &str, face_bbox: BBox, person_bbox: BBox) -> Candidate {
        Candidate {
            face_id: face_id.into(),
            roi_id: roi_id.into(),
            face_bbox,
            person_bbox,
            score: 1.0,
            smallest_area: geometry::smallest_area(&face_bbox, &person_bbox),
            iou: geometry::union_iou(&face_bbox, &person_bbox),
        }
    }

    fn assert_one_to_one(resolved: &[Candidate]) {
        let mut rois = HashSet::new();
        let mut faces = HashSet::new();
        for c in resolved {
            assert!(rois.insert(c.roi_id.clone()), "roi {} repeated", c.roi_id);
            assert!(faces.insert(c.face_id.clone()), "face {} repeated", c.face_id);
        }
    }

    #[test]
    fn test_no_conflict_passes_through() {
        let person = BBox::new(0.0, 0.0, 100.0, 300.0);
        let face = BBox::new(30.0, 20.0, 70.0, 70.0);
        let resolved = resolve_conflicts(vec![candidate("0", "a", face, person)]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].face_id, "0");
        assert_eq!(resolved[0].roi_id, "a");
    }

    #[test]
    fn test_two_faces_one_person_larger_area_wins() {
        let person = BBox::new(0.0, 0.0, 200.0, 400.0);
        let small_face = BBox::new(20.0, 20.0, 40.0, 40.0); // area 441
        let big_face = BBox::new(100.0, 20.0, 150.0, 80.0); // area 3111

        let resolved = resolve_conflicts(vec![
            candidate("0", "a", small_face, person),
            candidate("1", "a", big_face, person),
        ]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].face_id, "1");
        assert_one_to_one(&resolved);
    }

    #[test]
    fn test_two_faces_one_person_first_seen_wins_equal_area() {
        let person = BBox::new(0.0, 0.0, 200.0, 400.0);
        let face_a = BBox::new(20.0, 20.0, 40.0, 40.0);
        let face_b = BBox::new(120.0, 20.0, 140.0, 40.0); // same area as face_a

        let resolved = resolve_conflicts(vec![
            candidate("0", "a", face_a, person),
            candidate("1", "a", face_b, person),
        ]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].face_id, "0");
    }

    #[test]
    fn test_one_face_two_persons_nearer_anchor_wins() {
        // Two overlapping person boxes; the face sits in the upper-central
        // region of person "a", far from person "b"'s anchor.
        let person_a = BBox::new(0.0, 0.0, 100.0, 400.0); // anchor (50, 100)
        let person_b = BBox::new(40.0, 0.0, 300.0, 400.0); // anchor (170, 100)
        let face = BBox::new(40.0, 80.0, 60.0, 120.0); // center (50, 100)

        let resolved = resolve_conflicts(vec![
            candidate("0", "a", face, person_a),
            candidate("0", "b", face, person_b),
        ]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].roi_id, "a");
    }

    #[test]
    fn test_one_face_two_persons_eviction_when_later_is_nearer() {
        // The farther person box is generated first; the nearer one must
        // evict it.
        let person_far = BBox::new(40.0, 0.0, 300.0, 400.0); // anchor (170, 100)
        let person_near = BBox::new(0.0, 0.0, 100.0, 400.0); // anchor (50, 100)
        let face = BBox::new(40.0, 80.0, 60.0, 120.0); // center (50, 100)

        let resolved = resolve_conflicts(vec![
            candidate("0", "far", face, person_far),
            candidate("0", "near", face, person_near),
        ]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].roi_id, "near");
    }

    #[test]
    fn test_one_face_two_persons_tie_keeps_first() {
        // Anchors equidistant from the face center: recorded association
        // prevails.
        let person_a = BBox::new(0.0, 0.0, 100.0, 400.0); // anchor (50, 100)
        let person_b = BBox::new(100.0, 0.0, 200.0, 400.0); // anchor (150, 100)
        let face = BBox::new(90.0, 80.0, 110.0, 120.0); // center (100, 100)

        let resolved = resolve_conflicts(vec![
            candidate("0", "a", face, person_a),
            candidate("0", "b", face, person_b),
        ]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].roi_id, "a");
    }

    #[test]
    fn test_two_faces_fully_inside_two_persons_stays_one_to_one() {
        // Both faces of equal area sit fully inside both person boxes.
        // The greedy heuristic keeps the first-seen claim per ROI and then
        // collapses the remaining face conflict; it does not attempt a
        // globally optimal pairing, so a single match survives.
        let person_a = BBox::new(0.0, 0.0, 150.0, 400.0); // anchor (75, 100)
        let person_b = BBox::new(50.0, 0.0, 200.0, 400.0); // anchor (125, 100)
        let face_left = BBox::new(60.0, 80.0, 90.0, 120.0); // center (75, 100)
        let face_right = BBox::new(110.0, 80.0, 140.0, 120.0); // center (125, 100)

        let input = vec![
            candidate("0", "a", face_left, person_a),
            candidate("0", "b", face_left, person_b),
            candidate("1", "a", face_right, person_a),
            candidate("1", "b", face_right, person_b),
        ];
        let resolved = resolve_conflicts(input);

        assert_one_to_one(&resolved);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].face_id, "0");
        assert_eq!(resolved[0].roi_id, "a");
    }

    #[test]
    fn test_two_faces_two_persons_mixed_containment() {
        // Face 0 sits inside both person boxes, the larger face 1 only
        // inside person "b": the area rule hands "b" to face 1 and the
        // leftover claim gives "a" to face 0.
        let person_a = BBox::new(0.0, 0.0, 150.0, 400.0); // anchor (75, 100)
        let person_b = BBox::new(50.0, 0.0, 260.0, 400.0); // anchor (155, 100)
        let face_small = BBox::new(60.0, 80.0, 90.0, 120.0); // area 31x41
        let face_big = BBox::new(160.0, 70.0, 210.0, 130.0); // area 51x61

        let input = vec![
            candidate("0", "a", face_small, person_a),
            candidate("0", "b", face_small, person_b),
            candidate("1", "b", face_big, person_b),
        ];
        let resolved = resolve_conflicts(input);

        assert_one_to_one(&resolved);
        assert_eq!(resolved.len(), 2);
        for c in &resolved {
            match c.face_id.as_str() {
                "0" => assert_eq!(c.roi_id, "a"),
                "1" => assert_eq!(c.roi_id, "b"),
                other => panic!("unexpected face {other}"),
            }
        }
    }

    #[test]
    fn test_third_candidate_compares_against_surviving_association() {
        // After "near" evicts "far", a third, even nearer person box must
        // be judged against "near" — not the stale first association.
        let face = BBox::new(40.0, 90.0, 60.0, 110.0); // center (50, 100)
        let person_far = BBox::new(0.0, 0.0, 400.0, 400.0); // anchor (200, 100)
        let person_near = BBox::new(0.0, 0.0, 160.0, 400.0); // anchor (80, 100)
        let person_nearest = BBox::new(0.0, 0.0, 100.0, 400.0); // anchor (50, 100)

        let resolved = resolve_conflicts(vec![
            candidate("0", "far", face, person_far),
            candidate("0", "near", face, person_near),
            candidate("0", "nearest", face, person_nearest),
        ]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].roi_id, "nearest");
    }

    #[test]
    fn test_resolver_invariant_on_dense_conflicts() {
        // A tangle of repeats across both axes must still come out
        // one-to-one.
        let p1 = BBox::new(0.0, 0.0, 100.0, 300.0);
        let p2 = BBox::new(60.0, 0.0, 180.0, 300.0);
        let p3 = BBox::new(140.0, 0.0, 260.0, 300.0);
        let f1 = BBox::new(70.0, 20.0, 95.0, 50.0);
        let f2 = BBox::new(75.0, 20.0, 120.0, 70.0);
        let f3 = BBox::new(150.0, 20.0, 175.0, 50.0);

        let input = vec![
            candidate("0", "p1", f1, p1),
            candidate("0", "p2", f1, p2),
            candidate("1", "p1", f2, p1),
            candidate("1", "p2", f2, p2),
            candidate("2", "p2", f3, p2),
            candidate("2", "p3", f3, p3),
        ];
        let resolved = resolve_conflicts(input);

        assert!(!resolved.is_empty());
        assert_one_to_one(&resolved);
    }

    #[test]
    fn test_resolution_from_generated_candidates() {
        // End to end through the generator: one frame, two people close
        // together, one shared face claim.
        let faces = vec![
            FaceDetection {
                id: "0".into(),
                bbox: BBox::new(30.0, 40.0, 70.0, 90.0),
                actor_name: None,
            },
            FaceDetection {
                id: "1".into(),
                bbox: BBox::new(150.0, 40.0, 200.0, 100.0),
                actor_name: None,
            },
        ];
        let rois = vec![
            PersonRoi {
                roi_id: "a".into(),
                bbox: BBox::new(0.0, 0.0, 110.0, 400.0),
                label: "person".into(),
            },
            PersonRoi {
                roi_id: "b".into(),
                bbox: BBox::new(20.0, 0.0, 230.0, 400.0),
                label: "person".into(),
            },
        ];

        let candidates = generate_candidates(&faces, &rois, OVERLAP_THRESHOLD).unwrap();
        // face 0 is inside both person boxes, face 1 only inside "b"
        assert_eq!(candidates.len(), 3);

        let resolved = resolve_conflicts(candidates);
        assert_one_to_one(&resolved);
        assert_eq!(resolved.len(), 2);
        for c in &resolved {
            match c.face_id.as_str() {
                "0" => assert_eq!(c.roi_id, "a"),
                "1" => assert_eq!(c.roi_id, "b"),
                other => panic!("unexpected face {other}"),
            }
        }
    }
}
