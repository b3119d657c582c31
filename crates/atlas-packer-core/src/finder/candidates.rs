use std::collections::BTreeSet;

use crate::model::Rect;

/// Trial box widths for a set of non-empty rectangles, ascending and unique.
///
/// Every candidate lies between the widest rectangle (narrowest possible box)
/// and the sum of all widths (a single row). Between those extremes come the
/// prefix sums of the widths in descending order (rows of the widest items)
/// and a few multiples of the square root of the total area.
pub fn candidate_widths(rects: &[Rect]) -> Vec<i32> {
    if rects.is_empty() {
        return Vec::new();
    }
    let mut widths: Vec<i64> = rects.iter().map(|r| r.width() as i64).collect();
    widths.sort_unstable_by(|a, b| b.cmp(a));
    let min_w = widths[0];
    let max_w = widths.iter().sum::<i64>().min(i32::MAX as i64);

    let mut out: BTreeSet<i64> = BTreeSet::new();
    out.insert(min_w);
    out.insert(max_w);

    let mut prefix = 0i64;
    for w in &widths {
        prefix += w;
        if prefix > max_w {
            break;
        }
        out.insert(prefix);
    }

    let area: i64 = rects.iter().map(|r| r.area()).sum();
    let side = (area as f64).sqrt().ceil() as i64;
    for quarter in [3, 4, 5, 6, 8] {
        out.insert((side * quarter / 4).clamp(min_w, max_w));
    }

    out.into_iter().map(|w| w as i32).collect()
}

/// Index of the candidate closest to the square-root-of-area width.
pub fn square_width_index(widths: &[i32], rects: &[Rect]) -> usize {
    let area: i64 = rects.iter().map(|r| r.area()).sum();
    let side = (area as f64).sqrt().ceil() as i64;
    widths
        .iter()
        .enumerate()
        .min_by_key(|(_, w)| (**w as i64 - side).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_span_widest_to_row() {
        let rects = vec![Rect::sized(10, 10), Rect::sized(30, 5), Rect::sized(20, 20)];
        let widths = candidate_widths(&rects);
        assert_eq!(widths.first(), Some(&30));
        assert_eq!(widths.last(), Some(&60));
        assert!(widths.contains(&50));
        assert!(widths.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn single_rect_has_one_candidate() {
        let widths = candidate_widths(&[Rect::sized(7, 3)]);
        assert_eq!(widths, vec![7]);
        assert_eq!(square_width_index(&widths, &[Rect::sized(7, 3)]), 0);
        assert!(candidate_widths(&[]).is_empty());
    }

    #[test]
    fn square_index_targets_sqrt_area() {
        let rects: Vec<Rect> = (0..16).map(|_| Rect::sized(10, 10)).collect();
        let widths = candidate_widths(&rects);
        assert_eq!(widths[square_width_index(&widths, &rects)], 40);
    }
}
