//! Debug rendering: draw resolved face/person box pairs onto a frame
//! image for visual inspection of the fusion output.

use image::{Rgb, RgbImage};

use fusecast_core::{BBox, Candidate};

const LINE_THICKNESS: u32 = 3;

/// One color per match; face and person box of a pair share a color.
const PALETTE: [Rgb<u8>; 6] = [
    Rgb([255, 64, 64]),
    Rgb([64, 255, 64]),
    Rgb([64, 128, 255]),
    Rgb([255, 200, 0]),
    Rgb([255, 64, 255]),
    Rgb([0, 220, 220]),
];

/// Draw each resolved match as two hollow rectangles in a shared color.
pub fn draw_matches(img: &mut RgbImage, matches: &[Candidate]) {
    for (i, m) in matches.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        draw_rect(img, &m.person_bbox, color);
        draw_rect(img, &m.face_bbox, color);
    }
}

/// Hollow rectangle, clamped to the image bounds.
fn draw_rect(img: &mut RgbImage, bbox: &BBox, color: Rgb<u8>) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let x1 = bbox.x1.max(0.0) as u32;
    let y1 = bbox.y1.max(0.0) as u32;
    let x2 = (bbox.x2 as u32).min(w.saturating_sub(1));
    let y2 = (bbox.y2 as u32).min(h.saturating_sub(1));
    if x2 <= x1 || y2 <= y1 {
        return;
    }

    for t in 0..LINE_THICKNESS {
        // horizontal edges
        for x in x1..=x2 {
            if y1 + t <= y2 {
                img.put_pixel(x, y1 + t, color);
            }
            if y2 >= y1 + t {
                img.put_pixel(x, y2 - t, color);
            }
        }
        // vertical edges
        for y in y1..=y2 {
            if x1 + t <= x2 {
                img.put_pixel(x1 + t, y, color);
            }
            if x2 >= x1 + t {
                img.put_pixel(x2 - t, y, color);
            }
        }
    }
}
