mod geometry;
mod projection;
mod renderer;
mod spatial;

pub use geometry::{draw_circle, draw_dashed_line, fill_polygon, point_in_rings, LineString};
pub use projection::Viewport;
pub use renderer::{DisplaySettings, MapLayers, MapRenderer};
pub use spatial::{FeatureGrid, SpatialGrid};
