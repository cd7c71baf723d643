use crate::map::{MapRenderer, Viewport};
use crate::scene::{CityMarker, Label};

/// A country popup pinned at the terminal cell where it was opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPopup {
    pub label: Label,
    pub col: u16,
    pub row: u16,
}

/// Application state
pub struct App {
    pub viewport: Viewport,
    /// View restored by reset
    home: Viewport,
    pub map_renderer: MapRenderer,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker and hover labels
    pub mouse_pos: Option<(u16, u16)>,
    /// Set once a press turned into a drag, so release is not a click
    dragged: bool,
    pub popup: Option<OpenPopup>,
}

/// Terminal cell (inside the map border) to Braille pixel
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    let px = (col.saturating_sub(1) as i32) * 2;
    let py = (row.saturating_sub(1) as i32) * 4;
    (px, py)
}

impl App {
    /// `home` is the initial view; its pixel size is replaced by the terminal's
    pub fn new(width: usize, height: usize, home: Viewport, map_renderer: MapRenderer) -> Self {
        let mut app = Self {
            viewport: home.clone(),
            home,
            map_renderer,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            dragged: false,
            popup: None,
        };
        app.resize(width, height);
        app
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        // Braille gives 2x4 resolution per character.
        // Account for border (2 chars horizontal, 2 chars vertical plus status bar)
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);
        self.viewport.width = inner_width * 2;
        self.viewport.height = inner_height * 4;
        self.home.width = self.viewport.width;
        self.home.height = self.viewport.height;
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
        self.popup = None;
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.popup = None;
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.popup = None;
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
        self.popup = None;
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
        self.popup = None;
    }

    /// Back to the initial view
    pub fn reset_view(&mut self) {
        self.viewport = self.home.clone();
        self.popup = None;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Esc closes an open popup first, then quits
    pub fn escape(&mut self) {
        if self.popup.take().is_none() {
            self.quit();
        }
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Mouse button pressed
    pub fn press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Handle mouse drag
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            if dx != 0 || dy != 0 {
                self.dragged = true;
            }
            // Scale based on zoom: less sensitive when zoomed out
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            self.pan(dx * scale, dy * scale);
        }
        self.last_mouse = Some((x, y));
    }

    /// Mouse released: a press without drag is a click
    pub fn release(&mut self, col: u16, row: u16) {
        if self.last_mouse.is_some() && !self.dragged {
            self.click(col, row);
        }
        self.last_mouse = None;
        self.dragged = false;
    }

    /// Open the popup of the clicked country, or close the current one.
    /// Clicks on the border or status bar only close.
    pub fn click(&mut self, col: u16, row: u16) {
        self.popup = self
            .cell_center(col, row)
            .map(|(px, py)| self.viewport.unproject(px, py))
            .and_then(|(lon, lat)| self.map_renderer.country_at(lon, lat))
            .and_then(|country| country.popup.clone())
            .map(|label| OpenPopup { label, col, row });
    }

    /// Braille pixel at the middle of a map cell, `None` outside the map area
    fn cell_center(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let cols = self.viewport.width / 2;
        let rows = self.viewport.height / 4;
        if col == 0 || row == 0 || col as usize > cols || row as usize > rows {
            return None;
        }
        let (px, py) = cell_to_pixel(col, row);
        Some((px + 1, py + 2))
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Get mouse position in braille pixel coordinates (for rendering marker)
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| cell_to_pixel(col, row))
    }

    /// City marker currently under the mouse
    pub fn hovered_city(&self) -> Option<&CityMarker> {
        let (col, row) = self.mouse_pos?;
        let (px, py) = self.cell_center(col, row)?;
        self.map_renderer.city_at(px, py, &self.viewport)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::{CoordinatesData, CountsData, Datasets};
    use crate::scene::{Scene, SceneOptions};
    use geojson::FeatureCollection;
    use serde_json::json;

    pub(crate) fn sample_app(width: usize, height: usize) -> App {
        let data = Datasets {
            counts: CountsData {
                countries: [("fr".to_string(), 120), ("es".to_string(), 3)].into_iter().collect(),
                cities: [("Paris".to_string(), 15)].into_iter().collect(),
            },
            coordinates: CoordinatesData {
                cities: [("Paris".to_string(), Some((48.85, 2.35)))].into_iter().collect(),
            },
        };
        let fc: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"iso_a2": "FR", "name": "France"},
                    "geometry": {"type": "Polygon", "coordinates": [[[-5.0, 42.5], [8.0, 42.5], [8.0, 51.0], [-5.0, 51.0], [-5.0, 42.5]]]}
                },
                {
                    "type": "Feature",
                    "properties": {"iso_a2": "ES", "name": "Spain"},
                    "geometry": {"type": "Polygon", "coordinates": [[[-9.0, 36.0], [3.0, 36.0], [3.0, 42.5], [-9.0, 42.5], [-9.0, 36.0]]]}
                }
            ]
        }))
        .unwrap();

        let scene = Scene::build(&data, &fc, SceneOptions::default());
        let home = Viewport::new(2.0, 45.0, 8.0, 0, 0);
        App::new(width, height, home, MapRenderer::new(scene))
    }

    /// Terminal cell over a geographic point
    pub(crate) fn cell_at(app: &App, lon: f64, lat: f64) -> (u16, u16) {
        let (px, py) = app.viewport.project(lon, lat);
        ((px / 2 + 1) as u16, (py / 4 + 1) as u16)
    }

    #[test]
    fn test_resize_sets_pixel_size() {
        let app = sample_app(82, 43);
        assert_eq!(app.viewport.width, 160);
        assert_eq!(app.viewport.height, 160);
    }

    #[test]
    fn test_click_opens_and_closes_popup() {
        let mut app = sample_app(122, 63);

        let (col, row) = cell_at(&app, 0.0, 47.0);
        app.press(col, row);
        app.release(col, row);
        let popup = app.popup.clone().expect("France has a popup");
        assert_eq!(popup.label.title, "France");
        assert_eq!(popup.label.body, "Nodes: 120");

        // Spain is below the threshold, so clicking it closes the popup
        let (col, row) = cell_at(&app, -4.0, 39.0);
        app.click(col, row);
        assert!(app.popup.is_none());
    }

    #[test]
    fn test_click_on_border_ignored() {
        let mut app = sample_app(122, 63);
        // close enough that France covers the whole map area
        app.viewport = Viewport::new(1.5, 46.5, 60.0, app.viewport.width, app.viewport.height);

        app.click(5, 5);
        assert!(app.popup.is_some());

        app.click(0, 5);
        assert!(app.popup.is_none());
        app.click(5, 0);
        assert!(app.popup.is_none());
        app.click(5, 62);
        assert!(app.popup.is_none());
    }

    #[test]
    fn test_drag_is_not_click() {
        let mut app = sample_app(122, 63);
        let (col, row) = cell_at(&app, 0.0, 47.0);
        app.press(col, row);
        app.handle_drag(col + 3, row);
        app.release(col + 3, row);
        assert!(app.popup.is_none());
        assert!(app.viewport.center_lon < 2.0);
    }

    #[test]
    fn test_escape_closes_popup_then_quits() {
        let mut app = sample_app(122, 63);
        let (col, row) = cell_at(&app, 0.0, 47.0);
        app.click(col, row);
        assert!(app.popup.is_some());

        app.escape();
        assert!(app.popup.is_none());
        assert!(!app.should_quit);

        app.escape();
        assert!(app.should_quit);
    }

    #[test]
    fn test_hover_city() {
        let mut app = sample_app(122, 63);
        let (col, row) = cell_at(&app, 2.35, 48.85);
        app.set_mouse_pos(col, row);
        assert_eq!(app.hovered_city().map(|c| c.name.as_str()), Some("Paris"));

        app.set_mouse_pos(1, 1);
        assert!(app.hovered_city().is_none());
    }

    #[test]
    fn test_reset_view() {
        let mut app = sample_app(122, 63);
        app.pan(40, 10);
        app.zoom_in();
        app.reset_view();
        assert_eq!(app.viewport.center_lon, 2.0);
        assert_eq!(app.viewport.zoom, 8.0);
        assert_eq!(app.viewport.width, 240);
    }
}
