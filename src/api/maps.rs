//! Apple Maps Server API calls, authenticated with an [`ExchangedCredential`].

// self
use crate::{
	_prelude::*,
	call::{self, ApiCall, Coordinate, QueryParams, body},
	credential::ExchangedCredential,
	descriptor::ApiDescriptor,
	http::{WireRequest, WireResponse},
};

/// Bounding box passed as `searchRegion`, encoded `"north,east,south,west"`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapRegion {
	/// Northern latitude.
	pub north: f64,
	/// Eastern longitude.
	pub east: f64,
	/// Southern latitude.
	pub south: f64,
	/// Western longitude.
	pub west: f64,
}
impl Display for MapRegion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{},{},{},{}", self.north, self.east, self.south, self.west)
	}
}
impl Serialize for MapRegion {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.collect_str(self)
	}
}

/// Structured address components of a [`Place`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAddress {
	/// State or province.
	pub administrative_area: Option<String>,
	/// Short code of the administrative area.
	pub administrative_area_code: Option<String>,
	/// City.
	pub locality: Option<String>,
	/// Postal code.
	pub post_code: Option<String>,
	/// District within the locality.
	pub sub_locality: Option<String>,
	/// Street name.
	pub thoroughfare: Option<String>,
	/// House number.
	pub sub_thoroughfare: Option<String>,
	/// Street name with house number.
	pub full_thoroughfare: Option<String>,
	/// Notable areas the place lies in.
	#[serde(default)]
	pub areas_of_interest: Vec<String>,
	/// Neighborhoods the place lies in.
	#[serde(default)]
	pub dependent_localities: Vec<String>,
}

/// Map region suggested for displaying a [`Place`].
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMapRegion {
	/// Southern latitude.
	pub south_latitude: f64,
	/// Western longitude.
	pub west_longitude: f64,
	/// Northern latitude.
	pub north_latitude: f64,
	/// Eastern longitude.
	pub east_longitude: f64,
}

/// Geocoding result.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
	/// Display name.
	pub name: String,
	/// Location of the place.
	pub coordinate: Coordinate,
	/// Address lines formatted for the requested language.
	#[serde(default)]
	pub formatted_address_lines: Vec<String>,
	/// Country name.
	pub country: Option<String>,
	/// ISO 3166 country code.
	pub country_code: Option<String>,
	/// Suggested display region.
	pub display_map_region: Option<DisplayMapRegion>,
	/// Address components.
	pub structured_address: Option<StructuredAddress>,
}

#[derive(Deserialize)]
struct PlaceResults {
	#[serde(default)]
	results: Vec<Place>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeocodeParams {
	q: String,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	limit_to_countries: Vec<String>,
	lang: Option<String>,
	search_location: Option<Coordinate>,
	search_region: Option<MapRegion>,
	user_location: Option<Coordinate>,
}

/// `GET {base}/geocode`: forward geocoding of a free-form address.
#[derive(Clone, Debug, PartialEq)]
pub struct GeocodeCall {
	endpoint: Url,
	params: GeocodeParams,
}
impl GeocodeCall {
	/// Creates a call for `query` against `descriptor`'s base URL.
	pub fn new(descriptor: &ApiDescriptor, query: impl Into<String>) -> Result<Self> {
		Ok(Self {
			endpoint: descriptor.endpoint(["geocode"])?,
			params: GeocodeParams { q: query.into(), ..Default::default() },
		})
	}

	/// Restricts results to the given ISO country codes.
	pub fn limit_to_countries<I, S>(mut self, countries: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.params.limit_to_countries = countries.into_iter().map(Into::into).collect();

		self
	}

	/// Sets the response language (BCP 47 tag).
	pub fn language(mut self, lang: impl Into<String>) -> Self {
		self.params.lang = Some(lang.into());

		self
	}

	/// Biases results toward `location`.
	pub fn search_location(mut self, location: Coordinate) -> Self {
		self.params.search_location = Some(location);

		self
	}

	/// Biases results toward `region`.
	pub fn search_region(mut self, region: MapRegion) -> Self {
		self.params.search_region = Some(region);

		self
	}

	/// Location of the user, used for ranking.
	pub fn user_location(mut self, location: Coordinate) -> Self {
		self.params.user_location = Some(location);

		self
	}
}
impl ApiCall for GeocodeCall {
	type Credential = ExchangedCredential;
	type Output = Vec<Place>;

	const OPERATION: &'static str = "maps.geocode";

	fn prepare(&self, credential: &Self::Credential) -> Result<WireRequest> {
		let params = QueryParams::from_fields(&self.params)?;

		call::authorized_request(credential, self.endpoint.clone(), &params)
	}

	fn parse(&self, response: WireResponse) -> Result<Self::Output> {
		parse_places(&response)
	}
}

/// `GET {base}/reverseGeocode`: addresses near a coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct ReverseGeocodeCall {
	endpoint: Url,
	location: Coordinate,
	lang: Option<String>,
}
impl ReverseGeocodeCall {
	/// Creates a call for `location` against `descriptor`'s base URL.
	pub fn new(descriptor: &ApiDescriptor, location: Coordinate) -> Result<Self> {
		Ok(Self { endpoint: descriptor.endpoint(["reverseGeocode"])?, location, lang: None })
	}

	/// Sets the response language (BCP 47 tag).
	pub fn language(mut self, lang: impl Into<String>) -> Self {
		self.lang = Some(lang.into());

		self
	}
}
impl ApiCall for ReverseGeocodeCall {
	type Credential = ExchangedCredential;
	type Output = Vec<Place>;

	const OPERATION: &'static str = "maps.reverse_geocode";

	fn prepare(&self, credential: &Self::Credential) -> Result<WireRequest> {
		let mut params = QueryParams::new();

		params.push("loc", self.location)?.push_opt("lang", self.lang.clone())?;

		call::authorized_request(credential, self.endpoint.clone(), &params)
	}

	fn parse(&self, response: WireResponse) -> Result<Self::Output> {
		parse_places(&response)
	}
}

fn parse_places(response: &WireResponse) -> Result<Vec<Place>> {
	if !response.is_success() {
		return Err(body::structured_error(response).into());
	}

	Ok(body::decode_json::<PlaceResults>(response)?.results)
}
