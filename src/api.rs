//! Concrete calls for the Apple Maps Server API and the WeatherKit REST API.

pub mod maps;
pub mod weather;

pub use maps::{DisplayMapRegion, GeocodeCall, MapRegion, Place, ReverseGeocodeCall, StructuredAddress};
pub use weather::{Attribution, AttributionCall, DataSet, WeatherCall, WeatherOptions};
