use crate::palette::{city_color, country_color, CITY_GRADES, COUNTRY_GRADES};

/// One swatch row of a legend panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub color: &'static str,
    pub label: String,
}

/// Where a legend panel sits on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    BottomLeft,
    BottomRight,
}

/// Swatch glyph style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    Square,
    Round,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Legend {
    pub title: &'static str,
    pub corner: Corner,
    pub swatch: Swatch,
    pub entries: Vec<LegendEntry>,
}

/// Build entries from ascending grades. Each swatch is colored by the value
/// one above its lower bound, so it lands inside the bucket.
pub fn entries(grades: &[u64], color: fn(u64) -> &'static str) -> Vec<LegendEntry> {
    grades
        .iter()
        .enumerate()
        .map(|(i, &g)| {
            let label = match grades.get(i + 1) {
                Some(next) => format!("{g}–{next}"),
                None => format!("{g}+"),
            };
            LegendEntry {
                color: color(g + 1),
                label,
            }
        })
        .collect()
}

pub fn country_legend() -> Legend {
    Legend {
        title: "Node Count",
        corner: Corner::BottomRight,
        swatch: Swatch::Square,
        entries: entries(&COUNTRY_GRADES, country_color),
    }
}

pub fn city_legend() -> Legend {
    Legend {
        title: "City Node Count",
        corner: Corner::BottomLeft,
        swatch: Swatch::Round,
        entries: entries(&CITY_GRADES, city_color),
    }
}
