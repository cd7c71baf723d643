use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_circle, draw_dashed_line, fill_polygon, LineString};
use crate::map::projection::Viewport;
use crate::map::spatial::{FeatureGrid, SpatialGrid};
use crate::palette::{hex_to_color, with_opacity};
use crate::scene::{CityMarker, CountryShape, Scene, FILL_OPACITY};
use ratatui::style::Color;

/// Grid cell size in degrees for country and city lookups
const GRID_CELL_DEG: f64 = 10.0;

/// Outline dash length in pixels
const OUTLINE_DASH: u32 = 3;

/// Web-map pixels per Braille pixel (a cell is roughly 8x16 screen pixels)
const SCREEN_PX_PER_DOT: u16 = 4;

/// Display settings for map layers
#[derive(Clone, Debug)]
pub struct DisplaySettings {
    pub show_outlines: bool,
    pub show_cities: bool,
    pub show_legends: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_outlines: true,
            show_cities: true,
            show_legends: true,
        }
    }
}

/// Rendered layers, back to front
pub struct MapLayers {
    pub fills: BrailleCanvas,
    pub outlines: BrailleCanvas,
    pub cities: BrailleCanvas,
}

/// Rasterizes a [`Scene`] for a viewport and answers hit tests against it
pub struct MapRenderer {
    pub scene: Scene,
    pub settings: DisplaySettings,
    fill_colors: Vec<Color>,
    country_grid: FeatureGrid,
    /// Indices into `scene.cities`
    city_grid: SpatialGrid<usize>,
}

impl MapRenderer {
    pub fn new(scene: Scene) -> Self {
        let fill_colors = scene
            .countries
            .iter()
            .map(|c| with_opacity(c.fill, FILL_OPACITY))
            .collect();
        let country_grid = FeatureGrid::build(scene.countries.iter().map(|c| c.bbox), GRID_CELL_DEG);

        let mut city_grid = SpatialGrid::new(GRID_CELL_DEG);
        for (idx, city) in scene.cities.iter().enumerate() {
            city_grid.insert(city.lon, city.lat, idx);
        }

        Self {
            scene,
            settings: DisplaySettings::default(),
            fill_colors,
            country_grid,
            city_grid,
        }
    }

    /// Marker radius in Braille pixels
    pub fn marker_radius(&self) -> i32 {
        (self.scene.options.city_radius / SCREEN_PX_PER_DOT).max(1) as i32
    }

    /// Indices of countries whose bbox cells overlap the viewport
    fn visible_countries(&self, viewport: &Viewport) -> Vec<usize> {
        let (west, south, east, north) = viewport.visible_bounds();
        self.country_grid.query(west, south, east, north)
    }

    /// Render all layers for a canvas of `width` x `height` characters
    pub fn render(&self, width: usize, height: usize, viewport: &Viewport) -> MapLayers {
        let mut fills = BrailleCanvas::new(width, height);
        let mut outlines = BrailleCanvas::new(width, height);
        let mut cities = BrailleCanvas::new(width, height);

        let visible = self.visible_countries(viewport);

        for &idx in &visible {
            let country = &self.scene.countries[idx];
            let projected: Vec<Vec<(f64, f64)>> = country
                .rings
                .iter()
                .map(|ring| ring.iter().map(|&(lon, lat)| viewport.project_f(lon, lat)).collect())
                .collect();

            fills.set_pen(Some(self.fill_colors[idx]));
            fill_polygon(&mut fills, &projected);
        }

        if self.settings.show_outlines {
            outlines.set_pen(Some(Color::White));
            for &idx in &visible {
                for ring in &self.scene.countries[idx].rings {
                    draw_ring_outline(&mut outlines, ring, viewport);
                }
            }
        }

        if self.settings.show_cities {
            let radius = self.marker_radius();
            for city in &self.scene.cities {
                let (px, py) = viewport.project(city.lon, city.lat);
                if viewport.is_visible(px, py) {
                    cities.set_pen(Some(hex_to_color(city.color)));
                    draw_circle(&mut cities, px, py, radius);
                }
            }
        }

        MapLayers {
            fills,
            outlines,
            cities,
        }
    }

    /// Topmost country containing a geographic point
    pub fn country_at(&self, lon: f64, lat: f64) -> Option<&CountryShape> {
        self.country_grid
            .query(lon, lat, lon, lat)
            .into_iter()
            .rev()
            .map(|idx| &self.scene.countries[idx])
            .find(|c| c.contains(lon, lat))
    }

    /// Topmost city marker under a Braille pixel
    pub fn city_at(&self, px: i32, py: i32, viewport: &Viewport) -> Option<&CityMarker> {
        if !self.settings.show_cities || self.city_grid.is_empty() {
            return None;
        }

        let reach = self.marker_radius() + 1;
        let (lon, lat) = viewport.unproject(px, py);
        let radius_deg = reach as f64 * 360.0 / (viewport.zoom * viewport.width.max(1) as f64);

        let mut hits = self.city_grid.query_radius(lon, lat, radius_deg * 2.0);
        // later markers are drawn on top
        hits.sort_unstable();
        hits.into_iter()
            .rev()
            .filter_map(|i| self.city_grid.get(i).map(|&idx| &self.scene.cities[idx]))
            .find(|city| {
                let (cx, cy) = viewport.project(city.lon, city.lat);
                let (dx, dy) = (cx - px, cy - py);
                dx * dx + dy * dy <= reach * reach
            })
    }

    /// Toggle country outlines
    pub fn toggle_outlines(&mut self) {
        self.settings.show_outlines = !self.settings.show_outlines;
    }

    /// Toggle city markers
    pub fn toggle_cities(&mut self) {
        self.settings.show_cities = !self.settings.show_cities;
    }

    /// Toggle legend panels
    pub fn toggle_legends(&mut self) {
        self.settings.show_legends = !self.settings.show_legends;
    }
}

/// Draw a dashed ring outline with viewport culling
fn draw_ring_outline(canvas: &mut BrailleCanvas, ring: &LineString, viewport: &Viewport) {
    if ring.len() < 2 {
        return;
    }

    let mut phase = 0;
    let mut prev: Option<(i32, i32)> = None;

    for &(lon, lat) in ring {
        let (px, py) = viewport.project(lon, lat);

        if let Some((prev_x, prev_y)) = prev {
            // skip segments that jump across the antimeridian
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_dashed_line(canvas, (prev_x, prev_y), (px, py), OUTLINE_DASH, &mut phase);
            }
        }

        prev = Some((px, py));
    }
}
