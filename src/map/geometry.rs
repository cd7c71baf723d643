use crate::braille::BrailleCanvas;

/// A ring or line in some 2D space, (x, y) / (lon, lat)
pub type LineString = Vec<(f64, f64)>;

/// Draw a dashed line, `dash` pixels on then `dash` pixels off.
/// `phase` carries the dash position across connected segments.
pub fn draw_dashed_line(
    canvas: &mut BrailleCanvas,
    (x0, y0): (i32, i32),
    (x1, y1): (i32, i32),
    dash: u32,
    phase: &mut u32,
) {
    let dash = dash.max(1);
    walk_line(x0, y0, x1, y1, |x, y| {
        if (*phase / dash) % 2 == 0 {
            canvas.set_pixel_signed(x, y);
        }
        *phase = phase.wrapping_add(1);
    });
}

/// Bresenham's algorithm, calling `plot` for every pixel from start to end
fn walk_line(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: impl FnMut(i32, i32)) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        plot(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a filled circle (for city markers)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

/// Scanline fill of projected rings with the even-odd rule.
/// Rings may be open or closed; holes are just more rings.
pub fn fill_polygon(canvas: &mut BrailleCanvas, rings: &[Vec<(f64, f64)>]) {
    let (min_y, max_y) = rings
        .iter()
        .flatten()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    if min_y > max_y {
        return;
    }

    let first_row = (min_y.floor() as i32).max(0);
    let last_row = (max_y.ceil() as i32).min(canvas.pixel_height() as i32 - 1);

    let mut crossings: Vec<f64> = Vec::new();
    for row in first_row..=last_row {
        // sample at pixel centers
        let sy = row as f64 + 0.5;
        crossings.clear();

        for ring in rings {
            if ring.len() < 2 {
                continue;
            }
            let closing = (ring[ring.len() - 1], ring[0]);
            for (&(ax, ay), &(bx, by)) in ring.iter().zip(ring.iter().skip(1)).chain(std::iter::once((&closing.0, &closing.1))) {
                if (ay <= sy) != (by <= sy) {
                    crossings.push(ax + (sy - ay) / (by - ay) * (bx - ax));
                }
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));
        for pair in crossings.chunks_exact(2) {
            let x0 = (pair[0] - 0.5).ceil() as i32;
            let x1 = (pair[1] - 0.5).floor() as i32;
            if x0 <= x1 {
                canvas.fill_span(row, x0, x1);
            }
        }
    }
}

/// Even-odd point-in-polygon over any number of rings
pub fn point_in_rings(rings: &[LineString], x: f64, y: f64) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = ring[i];
            let (xj, yj) = ring[j];
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<(f64, f64)> {
        vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]
    }

    fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
        walk_line(x0, y0, x1, y1, |x, y| canvas.set_pixel_signed(x, y));
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        // Should have pixels across the top
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_dashed_line() {
        let mut canvas = BrailleCanvas::new(6, 1);
        let mut phase = 0;
        draw_dashed_line(&mut canvas, (0, 0), (11, 0), 3, &mut phase);
        // on: 0-2, 6-8; off: 3-5, 9-11
        assert_eq!(canvas.to_string(), "⠉⠁⠀⠉⠁⠀");
        assert_eq!(phase, 12);
    }

    #[test]
    fn test_fill_square() {
        let mut canvas = BrailleCanvas::new(4, 2);
        fill_polygon(&mut canvas, &[square(0.0, 0.0, 4.0, 4.0)]);
        assert_eq!(canvas.to_string(), "⣿⣿⠀⠀\n⠀⠀⠀⠀");
    }

    #[test]
    fn test_fill_with_hole() {
        let mut canvas = BrailleCanvas::new(3, 3);
        fill_polygon(
            &mut canvas,
            &[square(0.0, 0.0, 6.0, 12.0), square(2.0, 4.0, 4.0, 8.0)],
        );
        let rows: Vec<String> = canvas.rows().collect();
        assert_eq!(rows[0], "⣿⣿⣿");
        assert_eq!(rows[1], "⣿⠀⣿");
        assert_eq!(rows[2], "⣿⣿⣿");
    }

    #[test]
    fn test_fill_offscreen_is_noop() {
        let mut canvas = BrailleCanvas::new(2, 1);
        fill_polygon(&mut canvas, &[square(-20.0, -20.0, -10.0, -10.0)]);
        fill_polygon(&mut canvas, &[]);
        assert_eq!(canvas.to_string(), "⠀⠀");
    }

    #[test]
    fn test_point_in_rings() {
        let rings = vec![square(0.0, 0.0, 10.0, 10.0), square(4.0, 4.0, 6.0, 6.0)];
        assert!(point_in_rings(&rings, 1.0, 1.0));
        assert!(!point_in_rings(&rings, 5.0, 5.0));
        assert!(!point_in_rings(&rings, 11.0, 5.0));
    }
}
