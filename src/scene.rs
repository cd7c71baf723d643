use crate::classify::{country_code, country_count, feature_name};
use crate::data::{CountsData, Datasets};
use crate::map::{point_in_rings, LineString};
use crate::palette::{city_color, country_color};
use geojson::{Feature, FeatureCollection, Value};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Counts at or below this never get a popup or a city marker
pub const MIN_COUNT: u64 = 10;

/// City marker radius in web map screen pixels
pub const CITY_RADIUS: u16 = 8;

/// Country fill opacity
pub const FILL_OPACITY: f64 = 0.7;

/// Knobs that shape the scene
#[derive(Debug, Clone, Copy)]
pub struct SceneOptions {
    pub min_count: u64,
    pub city_radius: u16,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            min_count: MIN_COUNT,
            city_radius: CITY_RADIUS,
        }
    }
}

/// Title + body text shown for a popup or hover label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub title: String,
    pub body: String,
}

impl Label {
    fn nodes(title: &str, count: u64) -> Self {
        Self {
            title: title.to_string(),
            body: format!("Nodes: {count}"),
        }
    }
}

/// A styled country polygon
#[derive(Debug, Clone)]
pub struct CountryShape {
    pub code: Option<String>,
    pub name: Option<String>,
    pub count: u64,
    /// Fill color as `#rrggbb`
    pub fill: &'static str,
    /// Outer rings and holes of every part, in (lon, lat)
    pub rings: Vec<LineString>,
    /// (min_lon, min_lat, max_lon, max_lat)
    pub bbox: (f64, f64, f64, f64),
    pub popup: Option<Label>,
}

impl CountryShape {
    /// Style one boundary feature. Returns `None` for non-polygon geometry.
    pub fn from_feature(feature: &Feature, counts: &CountsData, opts: &SceneOptions) -> Option<Self> {
        let rings = polygon_rings(&feature.geometry.as_ref()?.value);
        let bbox = bounding_box(&rings)?;

        let props = feature.properties.as_ref();
        let count = country_count(counts, props);
        let name = feature_name(props).map(str::to_string);
        let popup = match &name {
            Some(name) if count > opts.min_count => Some(Label::nodes(name, count)),
            _ => None,
        };

        Some(Self {
            code: country_code(props),
            name,
            count,
            fill: country_color(count),
            rings,
            bbox,
            popup,
        })
    }

    /// Even-odd containment test in geographic coordinates
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let (min_lon, min_lat, max_lon, max_lat) = self.bbox;
        if lon < min_lon || lon > max_lon || lat < min_lat || lat > max_lat {
            return false;
        }
        point_in_rings(&self.rings, lon, lat)
    }
}

/// A city circle marker
#[derive(Debug, Clone)]
pub struct CityMarker {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub count: u64,
    /// Fill color as `#rrggbb`
    pub color: &'static str,
    pub tooltip: Label,
}

/// Everything that gets drawn, built once after loading
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub countries: Vec<CountryShape>,
    pub cities: Vec<CityMarker>,
    pub options: SceneOptions,
}

impl Scene {
    pub fn build(data: &Datasets, boundaries: &FeatureCollection, options: SceneOptions) -> Self {
        let countries: Vec<CountryShape> = boundaries
            .features
            .par_iter()
            .filter_map(|f| CountryShape::from_feature(f, &data.counts, &options))
            .collect();

        let skipped = boundaries.features.len() - countries.len();
        if skipped > 0 {
            debug!(skipped, "features without polygon geometry");
        }

        let cities = city_markers(data, &options);
        debug!(countries = countries.len(), cities = cities.len(), "scene built");

        Self {
            countries,
            cities,
            options,
        }
    }
}

/// Markers for every city above the threshold that has a coordinate.
/// Sorted so that bigger counts are drawn last (on top).
pub fn city_markers(data: &Datasets, options: &SceneOptions) -> Vec<CityMarker> {
    let mut markers: Vec<CityMarker> = data
        .counts
        .cities
        .iter()
        .filter(|&(_, &count)| count > options.min_count)
        .filter_map(|(name, &count)| {
            let Some(&Some((lat, lon))) = data.coordinates.cities.get(name) else {
                trace!(city = %name, "no coordinate, skipping");
                return None;
            };
            Some(CityMarker {
                name: name.clone(),
                lat,
                lon,
                count,
                color: city_color(count),
                tooltip: Label::nodes(name, count),
            })
        })
        .collect();

    markers.sort_by(|a, b| a.count.cmp(&b.count).then_with(|| a.name.cmp(&b.name)));
    markers
}

/// Flatten polygon geometry into rings (exteriors and holes alike)
fn polygon_rings(value: &Value) -> Vec<LineString> {
    let to_line = |ring: &Vec<Vec<f64>>| -> LineString {
        ring.iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect()
    };

    match value {
        Value::Polygon(rings) => rings.iter().map(to_line).collect(),
        Value::MultiPolygon(polygons) => polygons.iter().flatten().map(to_line).collect(),
        Value::GeometryCollection(geometries) => geometries
            .iter()
            .flat_map(|g| polygon_rings(&g.value))
            .collect(),
        _ => Vec::new(),
    }
}

fn bounding_box(rings: &[LineString]) -> Option<(f64, f64, f64, f64)> {
    let mut points = rings.iter().flatten().peekable();
    points.peek()?;
    Some(points.fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CoordinatesData;
    use serde_json::json;

    fn datasets(cities: &[(&str, u64)], coords: &[(&str, (f64, f64))]) -> Datasets {
        Datasets {
            counts: CountsData {
                countries: [("fr".to_string(), 120), ("de".to_string(), 5)].into_iter().collect(),
                cities: cities.iter().map(|(n, c)| (n.to_string(), *c)).collect(),
            },
            coordinates: CoordinatesData {
                cities: coords.iter().map(|(n, c)| (n.to_string(), Some(*c))).collect(),
            },
        }
    }

    fn feature(props: serde_json::Value, geometry: serde_json::Value) -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "properties": props,
            "geometry": geometry
        }))
        .unwrap()
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> serde_json::Value {
        json!({"type": "Polygon", "coordinates": [[[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]]})
    }

    #[test]
    fn test_city_marker_created() {
        let data = datasets(&[("Paris", 15)], &[("Paris", (48.85, 2.35))]);
        let markers = city_markers(&data, &SceneOptions::default());

        assert_eq!(markers.len(), 1);
        let paris = &markers[0];
        assert_eq!((paris.lat, paris.lon), (48.85, 2.35));
        assert_eq!(paris.color, "#74c476");
        assert_eq!(paris.tooltip.title, "Paris");
        assert_eq!(paris.tooltip.body, "Nodes: 15");
    }

    #[test]
    fn test_city_without_coordinate_skipped() {
        let data = datasets(&[("Paris", 15)], &[]);
        assert!(city_markers(&data, &SceneOptions::default()).is_empty());
    }

    #[test]
    fn test_city_with_null_coordinate_skipped() {
        let mut data = datasets(&[("Paris", 15), ("Lyon", 30)], &[("Paris", (48.85, 2.35))]);
        data.coordinates.cities.insert("Lyon".to_string(), None);

        let markers = city_markers(&data, &SceneOptions::default());
        let names: Vec<_> = markers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Paris"]);
    }

    #[test]
    fn test_city_threshold_is_exclusive() {
        let data = datasets(
            &[("Ten", 10), ("Eleven", 11)],
            &[("Ten", (1.0, 1.0)), ("Eleven", (2.0, 2.0))],
        );
        let markers = city_markers(&data, &SceneOptions::default());
        let names: Vec<_> = markers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Eleven"]);
    }

    #[test]
    fn test_markers_sorted_by_count() {
        let data = datasets(
            &[("Big", 500), ("Small", 12), ("Mid", 60)],
            &[("Big", (0.0, 0.0)), ("Small", (0.0, 1.0)), ("Mid", (0.0, 2.0))],
        );
        let markers = city_markers(&data, &SceneOptions::default());
        let names: Vec<_> = markers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Small", "Mid", "Big"]);
    }

    #[test]
    fn test_country_popup_rules() {
        let data = datasets(&[], &[]);
        let opts = SceneOptions::default();

        let france = feature(json!({"iso_a2": "FR", "name": "France"}), square(-5.0, 42.0, 8.0, 51.0));
        let shape = CountryShape::from_feature(&france, &data.counts, &opts).unwrap();
        assert_eq!(shape.count, 120);
        assert_eq!(shape.fill, "#BD0026");
        assert_eq!(
            shape.popup,
            Some(Label {
                title: "France".into(),
                body: "Nodes: 120".into()
            })
        );

        // below threshold
        let germany = feature(json!({"iso_a2": "DE", "name": "Germany"}), square(6.0, 47.0, 15.0, 55.0));
        let shape = CountryShape::from_feature(&germany, &data.counts, &opts).unwrap();
        assert_eq!(shape.count, 5);
        assert!(shape.popup.is_none());

        // above threshold but nameless
        let nameless = feature(json!({"ISO3166-1-Alpha-2": "FR"}), square(0.0, 0.0, 1.0, 1.0));
        let shape = CountryShape::from_feature(&nameless, &data.counts, &opts).unwrap();
        assert_eq!(shape.count, 120);
        assert!(shape.popup.is_none());
    }

    #[test]
    fn test_unidentified_country_is_zero() {
        let data = datasets(&[], &[]);
        let f = feature(json!({}), square(0.0, 0.0, 1.0, 1.0));
        let shape = CountryShape::from_feature(&f, &data.counts, &SceneOptions::default()).unwrap();
        assert_eq!(shape.code, None);
        assert_eq!(shape.count, 0);
        assert_eq!(shape.fill, "#FFEDA0");
    }

    #[test]
    fn test_non_polygon_feature_skipped() {
        let data = datasets(&[], &[]);
        let f = feature(json!({"name": "Point"}), json!({"type": "Point", "coordinates": [0.0, 0.0]}));
        assert!(CountryShape::from_feature(&f, &data.counts, &SceneOptions::default()).is_none());
    }

    #[test]
    fn test_multipolygon_with_hole() {
        let data = datasets(&[], &[]);
        let geometry = json!({
            "type": "MultiPolygon",
            "coordinates": [
                [
                    [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                    [[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]
                ],
                [
                    [[20.0, 0.0], [22.0, 0.0], [22.0, 2.0], [20.0, 2.0], [20.0, 0.0]]
                ]
            ]
        });
        let shape =
            CountryShape::from_feature(&feature(json!({"name": "Ring"}), geometry), &data.counts, &SceneOptions::default())
                .unwrap();

        assert_eq!(shape.rings.len(), 3);
        assert_eq!(shape.bbox, (0.0, 0.0, 22.0, 10.0));
        assert!(shape.contains(1.0, 1.0));
        assert!(!shape.contains(5.0, 5.0));
        assert!(shape.contains(21.0, 1.0));
        assert!(!shape.contains(15.0, 1.0));
    }

    #[test]
    fn test_build_scene() {
        let data = datasets(&[("Paris", 15), ("Lyon", 10)], &[("Paris", (48.85, 2.35)), ("Lyon", (45.76, 4.84))]);
        let fc: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"iso_a2": "FR", "name": "France"}, "geometry": square(-5.0, 42.0, 8.0, 51.0)},
                {"type": "Feature", "properties": {"name": "Dot"}, "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}}
            ]
        }))
        .unwrap();

        let scene = Scene::build(&data, &fc, SceneOptions::default());
        assert_eq!(scene.countries.len(), 1);
        assert_eq!(scene.cities.len(), 1);
        assert!(scene.countries[0].contains(2.35, 48.85));
        assert!(!scene.countries[0].contains(-40.0, 0.0));
        assert_eq!(scene.cities[0].name, "Paris");
    }
}
