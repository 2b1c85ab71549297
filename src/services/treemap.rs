//! Squarified treemap layout and diverging color scale for the heatmap view.
//!
//! Items are weighted by market capitalization and trimmed to the dominant
//! prefix before layout so the long tail doesn't produce sliver rectangles.

use std::cmp::Ordering;

/// Layout input: one weighted item with an optional color metric.
#[derive(Debug, Clone, PartialEq)]
pub struct TreemapItem {
    pub id: String,
    /// Non-negative; a zero weight yields a zero-area rectangle.
    pub weight: f64,
    pub metric: Option<f64>,
}

/// Layout output: the item's rectangle within the bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub metric: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Fill for items with no metric value, distinct from the zero-value white.
pub const NEUTRAL: Rgb = Rgb {
    r: 229,
    g: 231,
    b: 235,
};

/// Sort descending by weight and keep the smallest prefix whose cumulative
/// weight reaches `cutoff` (a fraction of total weight). A non-positive
/// total keeps nothing.
pub fn dominant_prefix(mut items: Vec<TreemapItem>, cutoff: f64) -> Vec<TreemapItem> {
    items.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    let total: f64 = items.iter().map(|i| i.weight).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let threshold = total * cutoff;
    let mut cumulative = 0.0;
    let mut keep = 0;
    for item in &items {
        cumulative += item.weight;
        keep += 1;
        if cumulative >= threshold {
            break;
        }
    }
    items.truncate(keep);
    items
}

/// Squarified layout of `items` into a `width × height` box.
///
/// Items are placed in descending weight order. Rows are built greedily:
/// an item joins the current row while doing so does not worsen the row's
/// worst aspect ratio; otherwise the row is flushed along the shorter side
/// of the free rectangle and a new row starts. Rectangle areas are
/// proportional to weights and sum to the box area.
pub fn layout(items: &[TreemapItem], width: f64, height: f64) -> Vec<PlacedItem> {
    let mut ordered: Vec<&TreemapItem> = items.iter().collect();
    ordered.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    let total: f64 = ordered.iter().map(|i| i.weight).sum();
    if ordered.is_empty() || total <= 0.0 || width <= 0.0 || height <= 0.0 {
        // Weightless input still yields one zero rect per item.
        return ordered
            .into_iter()
            .map(|item| PlacedItem {
                id: item.id.clone(),
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
                metric: item.metric,
            })
            .collect();
    }

    let scale = width * height / total;
    let mut placed = Vec::with_capacity(ordered.len());

    let mut free_x = 0.0;
    let mut free_y = 0.0;
    let mut free_w = width;
    let mut free_h = height;

    let mut row: Vec<&TreemapItem> = Vec::new();
    let mut row_area = 0.0;

    let mut index = 0;
    while index < ordered.len() {
        let item = ordered[index];
        let item_area = item.weight * scale;
        let side = free_w.min(free_h);

        let current = worst_ratio(&row, row_area, side, scale);
        let candidate = worst_ratio_with(&row, row_area + item_area, item_area, side, scale);

        if row.is_empty() || candidate <= current {
            row.push(item);
            row_area += item_area;
            index += 1;
        } else {
            flush_row(
                &row, row_area, scale, &mut free_x, &mut free_y, &mut free_w, &mut free_h,
                &mut placed,
            );
            row.clear();
            row_area = 0.0;
        }
    }
    if !row.is_empty() {
        flush_row(
            &row, row_area, scale, &mut free_x, &mut free_y, &mut free_w, &mut free_h,
            &mut placed,
        );
    }

    placed
}

/// Worst aspect ratio of the current row laid along a side of length `side`.
fn worst_ratio(row: &[&TreemapItem], row_area: f64, side: f64, scale: f64) -> f64 {
    if row.is_empty() || row_area <= 0.0 {
        return f64::INFINITY;
    }
    let thickness = row_area / side;
    row.iter()
        .map(|item| ratio_for(item.weight * scale, thickness))
        .fold(0.0, f64::max)
}

/// Worst ratio if `extra_area` joined the row.
fn worst_ratio_with(
    row: &[&TreemapItem],
    row_area: f64,
    extra_area: f64,
    side: f64,
    scale: f64,
) -> f64 {
    if row_area <= 0.0 {
        return f64::INFINITY;
    }
    let thickness = row_area / side;
    row.iter()
        .map(|item| ratio_for(item.weight * scale, thickness))
        .fold(ratio_for(extra_area, thickness), f64::max)
}

fn ratio_for(area: f64, thickness: f64) -> f64 {
    if area <= 0.0 || thickness <= 0.0 {
        return f64::INFINITY;
    }
    let length = area / thickness;
    (length / thickness).max(thickness / length)
}

/// Emit the row's rectangles along the shorter side of the free rectangle
/// and shrink the free rectangle by the row's thickness.
#[allow(clippy::too_many_arguments)]
fn flush_row(
    row: &[&TreemapItem],
    row_area: f64,
    scale: f64,
    free_x: &mut f64,
    free_y: &mut f64,
    free_w: &mut f64,
    free_h: &mut f64,
    placed: &mut Vec<PlacedItem>,
) {
    if row.is_empty() {
        return;
    }
    if row_area <= 0.0 {
        for item in row {
            placed.push(PlacedItem {
                id: item.id.clone(),
                x: *free_x,
                y: *free_y,
                width: 0.0,
                height: 0.0,
                metric: item.metric,
            });
        }
        return;
    }

    if *free_w >= *free_h {
        // Vertical strip at the left edge.
        let thickness = row_area / *free_h;
        let mut y = *free_y;
        for item in row {
            let item_height = item.weight * scale / thickness;
            placed.push(PlacedItem {
                id: item.id.clone(),
                x: *free_x,
                y,
                width: thickness,
                height: item_height,
                metric: item.metric,
            });
            y += item_height;
        }
        *free_x += thickness;
        *free_w -= thickness;
    } else {
        // Horizontal strip at the top edge.
        let thickness = row_area / *free_w;
        let mut x = *free_x;
        for item in row {
            let item_width = item.weight * scale / thickness;
            placed.push(PlacedItem {
                id: item.id.clone(),
                x,
                y: *free_y,
                width: item_width,
                height: thickness,
                metric: item.metric,
            });
            x += item_width;
        }
        *free_y += thickness;
        *free_h -= thickness;
    }
}

/// Diverging color for `value` within `[min, max]`.
///
/// Normalization divides by `max(|min|, |max|)`, so zero is always the white
/// midpoint and the scale is symmetric around it regardless of skew.
/// Positive values shade toward green, negative toward red; `None` maps to
/// the fixed [`NEUTRAL`] gray.
pub fn color_scale(value: Option<f64>, min: f64, max: f64) -> Rgb {
    let Some(value) = value else {
        return NEUTRAL;
    };

    let denominator = min.abs().max(max.abs());
    if denominator == 0.0 || !denominator.is_finite() {
        return Rgb {
            r: 255,
            g: 255,
            b: 255,
        };
    }

    let normalized = (value / denominator).clamp(-1.0, 1.0);
    let intensity = (normalized.abs() * 255.0).floor() as u8;
    match normalized.partial_cmp(&0.0) {
        Some(Ordering::Greater) => Rgb {
            r: 255 - intensity,
            g: 255,
            b: 255 - intensity,
        },
        Some(Ordering::Less) => Rgb {
            r: 255,
            g: 255 - intensity,
            b: 255 - intensity,
        },
        _ => Rgb {
            r: 255,
            g: 255,
            b: 255,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, weight: f64) -> TreemapItem {
        TreemapItem {
            id: id.to_string(),
            weight,
            metric: None,
        }
    }

    #[test]
    fn areas_are_proportional_and_conserve_the_box() {
        let items = vec![item("a", 50.0), item("b", 30.0), item("c", 20.0)];
        let placed = layout(&items, 1000.0, 600.0);
        assert_eq!(placed.len(), 3);

        let total_area: f64 = placed.iter().map(|p| p.width * p.height).sum();
        assert!((total_area - 600_000.0).abs() < 1e-6);

        let area_of = |id: &str| -> f64 {
            let p = placed.iter().find(|p| p.id == id).unwrap();
            p.width * p.height
        };
        assert!((area_of("a") - 300_000.0).abs() < 1e-6);
        assert!((area_of("b") - 180_000.0).abs() < 1e-6);
        assert!((area_of("c") - 120_000.0).abs() < 1e-6);
    }

    #[test]
    fn rectangles_stay_inside_the_box() {
        let items: Vec<TreemapItem> = (0..12)
            .map(|i| item(&format!("t{i}"), (12 - i) as f64))
            .collect();
        let placed = layout(&items, 800.0, 500.0);
        assert_eq!(placed.len(), 12);
        for p in &placed {
            assert!(p.x >= -1e-9 && p.y >= -1e-9);
            assert!(p.x + p.width <= 800.0 + 1e-6);
            assert!(p.y + p.height <= 500.0 + 1e-6);
        }
    }

    #[test]
    fn empty_input_yields_empty_layout() {
        assert!(layout(&[], 100.0, 100.0).is_empty());
    }

    #[test]
    fn zero_weight_items_get_zero_area_without_panicking() {
        let items = vec![item("a", 0.0), item("b", 0.0)];
        let placed = layout(&items, 100.0, 100.0);
        assert_eq!(placed.len(), 2);
        for p in &placed {
            assert_eq!(p.width * p.height, 0.0);
        }
    }

    #[test]
    fn prefix_stops_once_cumulative_weight_crosses_cutoff() {
        let weights = [40.0, 10.0, 10.0, 10.0, 10.0, 5.0, 5.0, 5.0, 3.0, 2.0];
        let items: Vec<TreemapItem> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| item(&format!("t{i}"), *w))
            .collect();

        let kept = dominant_prefix(items, 0.8);
        // 40+10+10+10+10 = 80 crosses 80% of the 100 total at five items.
        assert_eq!(kept.len(), 5);
        let total: f64 = kept.iter().map(|i| i.weight).sum();
        assert!(total >= 80.0);
    }

    #[test]
    fn prefix_of_weightless_items_is_empty() {
        let items = vec![item("a", 0.0), item("b", 0.0)];
        assert!(dominant_prefix(items, 0.8).is_empty());
    }

    #[test]
    fn color_scale_is_symmetric_around_zero() {
        // Skewed range: |min| dominates, so +5 and -5 shade equally.
        let positive = color_scale(Some(5.0), -10.0, 5.0);
        let negative = color_scale(Some(-5.0), -10.0, 5.0);
        assert_eq!(positive.g, 255);
        assert_eq!(negative.r, 255);
        assert_eq!(positive.r, negative.g);
        assert_eq!(positive.b, negative.b);
    }

    #[test]
    fn color_scale_maps_zero_and_null_distinctly() {
        let zero = color_scale(Some(0.0), -10.0, 10.0);
        assert_eq!(zero, Rgb { r: 255, g: 255, b: 255 });
        assert_eq!(color_scale(None, -10.0, 10.0), NEUTRAL);
        assert_ne!(zero, NEUTRAL);
    }

    #[test]
    fn color_scale_clamps_out_of_range_values() {
        let saturated = color_scale(Some(50.0), -10.0, 10.0);
        assert_eq!(saturated, Rgb { r: 0, g: 255, b: 0 });
        let floored = color_scale(Some(-50.0), -10.0, 10.0);
        assert_eq!(floored, Rgb { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn color_scale_flat_range_is_white() {
        assert_eq!(
            color_scale(Some(1.0), 0.0, 0.0),
            Rgb { r: 255, g: 255, b: 255 }
        );
    }
}
