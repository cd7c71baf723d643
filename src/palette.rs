use ratatui::style::Color;

/// Lower bounds of the country color buckets, ascending
pub const COUNTRY_GRADES: [u64; 6] = [0, 10, 20, 50, 100, 200];

/// Lower bounds of the city color buckets, ascending
pub const CITY_GRADES: [u64; 4] = [10, 20, 50, 100];

/// Fill color for a country with `count` nodes (YlOrRd ramp)
pub fn country_color(count: u64) -> &'static str {
    if count > 200 {
        "#800026"
    } else if count > 100 {
        "#BD0026"
    } else if count > 50 {
        "#E31A1C"
    } else if count > 20 {
        "#FC4E2A"
    } else if count > 10 {
        "#FD8D3C"
    } else {
        "#FFEDA0"
    }
}

/// Marker color for a city with `count` nodes (Greens ramp)
pub fn city_color(count: u64) -> &'static str {
    if count > 100 {
        "#00441b"
    } else if count > 50 {
        "#238b45"
    } else if count > 20 {
        "#41ab5d"
    } else if count > 10 {
        "#74c476"
    } else {
        "#a1d99b"
    }
}

/// Parse `#rrggbb` into a terminal RGB color. Bad channels read as 0.
pub fn hex_to_color(hex: &str) -> Color {
    let (r, g, b) = hex_to_rgb(hex);
    Color::Rgb(r, g, b)
}

fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    (channel(0..2), channel(2..4), channel(4..6))
}

/// Blend `hex` over a black background at the given opacity.
/// Terminals have no alpha, so fill opacity is baked into the color.
pub fn with_opacity(hex: &str, opacity: f64) -> Color {
    let (r, g, b) = hex_to_rgb(hex);
    let a = opacity.clamp(0.0, 1.0);
    let scale = |c: u8| (c as f64 * a).round() as u8;
    Color::Rgb(scale(r), scale(g), scale(b))
}
