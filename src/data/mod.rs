mod source;

pub use source::{DataSource, Fetch};

use crate::error::LoadError;
use geojson::{FeatureCollection, GeoJson};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{error, info};

/// Aggregate node counts keyed by lower-case country code and by city name
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CountsData {
    #[serde(default)]
    pub countries: HashMap<String, u64>,
    #[serde(default)]
    pub cities: HashMap<String, u64>,
}

/// City name -> (lat, lon). A `null` entry is kept as `None` and the city
/// is skipped when markers are built.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CoordinatesData {
    #[serde(default)]
    pub cities: HashMap<String, Option<(f64, f64)>>,
}

/// Both datasets fetched by the initial concurrent load
#[derive(Debug, Default, Clone)]
pub struct Datasets {
    pub counts: CountsData,
    pub coordinates: CoordinatesData,
}

/// Resource names relative to the data source
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub counts: String,
    pub coordinates: String,
    pub countries: String,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            counts: "all_counts.json".to_string(),
            coordinates: "coordinates.json".to_string(),
            countries: "countries.geojson".to_string(),
        }
    }
}

/// Fetch and decode one JSON resource
fn fetch_json<T: DeserializeOwned>(src: &(impl Fetch + ?Sized), resource: &str) -> Result<T, LoadError> {
    let mut bytes = src.fetch(resource)?;
    simd_json::serde::from_slice(&mut bytes).map_err(|source| LoadError::Json {
        resource: resource.to_string(),
        source,
    })
}

/// Fetch counts and coordinates in parallel. Either failure fails the whole load.
pub fn load_datasets<F: Fetch + Sync + ?Sized>(src: &F, res: &Resources) -> Result<Datasets, LoadError> {
    let (counts, coordinates) = rayon::join(
        || fetch_json::<CountsData>(src, &res.counts),
        || fetch_json::<CoordinatesData>(src, &res.coordinates),
    );

    Ok(Datasets {
        counts: counts?,
        coordinates: coordinates?,
    })
}

/// Fetch the country boundaries; must be a non-empty FeatureCollection
pub fn load_countries<F: Fetch + ?Sized>(src: &F, resource: &str) -> Result<FeatureCollection, LoadError> {
    let bytes = src.fetch(resource)?;
    let geojson = GeoJson::from_reader(bytes.as_slice()).map_err(|source| LoadError::GeoJson {
        resource: resource.to_string(),
        source: Box::new(geojson::Error::MalformedJson(source)),
    })?;

    match geojson {
        GeoJson::FeatureCollection(fc) if !fc.features.is_empty() => Ok(fc),
        _ => Err(LoadError::EmptyGeoJson {
            resource: resource.to_string(),
        }),
    }
}

/// Full load: datasets first, boundaries only once both datasets are in.
/// Logs the failing stage exactly once.
pub fn load_all<F: Fetch + Sync + ?Sized>(
    src: &F,
    res: &Resources,
) -> Result<(Datasets, FeatureCollection), LoadError> {
    let datasets = load_datasets(src, res).inspect_err(|e| {
        error!(error = %e, cause = ?std::error::Error::source(e), "Error fetching data");
    })?;
    info!(
        countries = datasets.counts.countries.len(),
        cities = datasets.counts.cities.len(),
        coordinates = datasets.coordinates.cities.len(),
        "datasets loaded"
    );

    let countries = load_countries(src, &res.countries).inspect_err(|e| {
        error!(error = %e, cause = ?std::error::Error::source(e), "Error loading GeoJSON");
    })?;
    info!(features = countries.features.len(), "boundaries loaded");

    Ok((datasets, countries))
}
