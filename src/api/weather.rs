//! WeatherKit REST API calls, authenticated with a [`SignedCredential`].
//!
//! Weather documents are large and evolve often, so they are returned as a [`Revived`] tree
//! rather than a fixed schema. Failures carry the request URL instead of a structured body.

// self
use crate::{
	_prelude::*,
	call::{self, ApiCall, Coordinate, QueryParams, Revived, body},
	credential::SignedCredential,
	descriptor::ApiDescriptor,
	http::{WireRequest, WireResponse},
};

/// Weather data set selectable through `dataSets`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSet {
	/// Current conditions.
	CurrentWeather,
	/// Daily forecast.
	ForecastDaily,
	/// Hourly forecast.
	ForecastHourly,
	/// Minute-by-minute precipitation for the next hour.
	ForecastNextHour,
	/// Active severe weather alerts.
	WeatherAlerts,
}

/// Optional query parameters of a [`WeatherCall`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherOptions {
	/// Data sets to include; the service default applies when empty.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub data_sets: Vec<DataSet>,
	/// ISO country code, required for weather alerts.
	pub country_code: Option<String>,
	/// Instant the current conditions are requested for.
	#[serde(default, with = "call::query::utc_rfc3339_option")]
	pub current_as_of: Option<OffsetDateTime>,
	/// First day of the daily forecast.
	#[serde(default, with = "call::query::utc_rfc3339_option")]
	pub daily_start: Option<OffsetDateTime>,
	/// End of the daily forecast.
	#[serde(default, with = "call::query::utc_rfc3339_option")]
	pub daily_end: Option<OffsetDateTime>,
	/// First hour of the hourly forecast.
	#[serde(default, with = "call::query::utc_rfc3339_option")]
	pub hourly_start: Option<OffsetDateTime>,
	/// End of the hourly forecast.
	#[serde(default, with = "call::query::utc_rfc3339_option")]
	pub hourly_end: Option<OffsetDateTime>,
	/// IANA time zone used to bucket daily forecasts.
	pub timezone: Option<String>,
}

/// `GET {base}/weather/{language}/{latitude}/{longitude}`.
#[derive(Clone, Debug, PartialEq)]
pub struct WeatherCall {
	endpoint: Url,
	options: WeatherOptions,
}
impl WeatherCall {
	/// Creates a call for `location` with responses localized to `language`.
	pub fn new(
		descriptor: &ApiDescriptor,
		language: impl AsRef<str>,
		location: Coordinate,
	) -> Result<Self> {
		let endpoint = descriptor.endpoint([
			"weather".to_owned(),
			language.as_ref().to_owned(),
			location.latitude.to_string(),
			location.longitude.to_string(),
		])?;

		Ok(Self { endpoint, options: WeatherOptions::default() })
	}

	/// Replaces every option at once.
	pub fn with_options(mut self, options: WeatherOptions) -> Self {
		self.options = options;

		self
	}

	/// Selects the data sets to fetch.
	pub fn data_sets<I>(mut self, data_sets: I) -> Self
	where
		I: IntoIterator<Item = DataSet>,
	{
		self.options.data_sets = data_sets.into_iter().collect();

		self
	}

	/// Sets the country code used for alerts.
	pub fn country_code(mut self, code: impl Into<String>) -> Self {
		self.options.country_code = Some(code.into());

		self
	}

	/// Requests current conditions as of `instant`.
	pub fn current_as_of(mut self, instant: OffsetDateTime) -> Self {
		self.options.current_as_of = Some(instant);

		self
	}

	/// Limits the daily forecast to `start..end`.
	pub fn daily_range(mut self, start: OffsetDateTime, end: OffsetDateTime) -> Self {
		self.options.daily_start = Some(start);
		self.options.daily_end = Some(end);

		self
	}

	/// Limits the hourly forecast to `start..end`.
	pub fn hourly_range(mut self, start: OffsetDateTime, end: OffsetDateTime) -> Self {
		self.options.hourly_start = Some(start);
		self.options.hourly_end = Some(end);

		self
	}

	/// Sets the IANA time zone.
	pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
		self.options.timezone = Some(timezone.into());

		self
	}

	/// Options sent with the request.
	pub fn options(&self) -> &WeatherOptions {
		&self.options
	}
}
impl ApiCall for WeatherCall {
	type Credential = SignedCredential;
	type Output = Revived;

	const OPERATION: &'static str = "weather.weather";

	fn prepare(&self, credential: &Self::Credential) -> Result<WireRequest> {
		let params = QueryParams::from_fields(&self.options)?;

		call::authorized_request(credential, self.endpoint.clone(), &params)
	}

	fn parse(&self, response: WireResponse) -> Result<Self::Output> {
		if !response.is_success() {
			return Err(body::url_error(&response).into());
		}

		Ok(Revived::from_json(body::decode_json(&response)?))
	}
}

/// Data-provider attribution that must accompany displayed weather data.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Attribution {
	/// Provider name to display.
	#[serde(rename = "serviceName")]
	pub service_name: String,
	/// Page with the legal attribution.
	#[serde(rename = "legalPageURL")]
	pub legal_page_url: String,
	/// Plain-text legal attribution, when provided.
	#[serde(rename = "legalAttributionText")]
	pub legal_attribution_text: Option<String>,
	/// Logo for dark backgrounds, 1x.
	#[serde(rename = "logoDark@1x")]
	pub logo_dark_1x: Option<String>,
	/// Logo for dark backgrounds, 2x.
	#[serde(rename = "logoDark@2x")]
	pub logo_dark_2x: Option<String>,
	/// Logo for dark backgrounds, 3x.
	#[serde(rename = "logoDark@3x")]
	pub logo_dark_3x: Option<String>,
	/// Logo for light backgrounds, 1x.
	#[serde(rename = "logoLight@1x")]
	pub logo_light_1x: Option<String>,
	/// Logo for light backgrounds, 2x.
	#[serde(rename = "logoLight@2x")]
	pub logo_light_2x: Option<String>,
	/// Logo for light backgrounds, 3x.
	#[serde(rename = "logoLight@3x")]
	pub logo_light_3x: Option<String>,
	/// Square logo, 1x.
	#[serde(rename = "logoSquare@1x")]
	pub logo_square_1x: Option<String>,
	/// Square logo, 2x.
	#[serde(rename = "logoSquare@2x")]
	pub logo_square_2x: Option<String>,
	/// Square logo, 3x.
	#[serde(rename = "logoSquare@3x")]
	pub logo_square_3x: Option<String>,
}

/// `GET {base}/attribution/{language}`.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributionCall {
	endpoint: Url,
}
impl AttributionCall {
	/// Creates a call for attribution text localized to `language`.
	pub fn new(descriptor: &ApiDescriptor, language: impl AsRef<str>) -> Result<Self> {
		Ok(Self { endpoint: descriptor.endpoint(["attribution", language.as_ref()])? })
	}
}
impl ApiCall for AttributionCall {
	type Credential = SignedCredential;
	type Output = Attribution;

	const OPERATION: &'static str = "weather.attribution";

	fn prepare(&self, credential: &Self::Credential) -> Result<WireRequest> {
		call::authorized_request(credential, self.endpoint.clone(), &QueryParams::new())
	}

	fn parse(&self, response: WireResponse) -> Result<Self::Output> {
		if !response.is_success() {
			return Err(body::url_error(&response).into());
		}

		body::decode_json(&response)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{
		_preludet::{ScriptedTransport, json_response, test_signer},
		credential::Credential,
	};

	fn descriptor() -> ApiDescriptor {
		ApiDescriptor::apple_weatherkit().expect("WeatherKit descriptor should build.")
	}

	async fn signed_credential() -> SignedCredential {
		let credential = SignedCredential::new(test_signer());

		credential
			.refresh(&ScriptedTransport::default())
			.await
			.expect("Signing refresh should succeed.");

		credential
	}

	#[tokio::test]
	async fn weather_request_encodes_path_and_options() {
		let credential = signed_credential().await;
		let call = WeatherCall::new(&descriptor(), "en-US", Coordinate::new(52.52, 13.405))
			.expect("Call should build.")
			.data_sets([DataSet::CurrentWeather, DataSet::ForecastDaily])
			.country_code("DE")
			.daily_range(
				macros::datetime!(2025-03-01 00:00 UTC),
				macros::datetime!(2025-03-03 00:00 UTC),
			)
			.timezone("Europe/Berlin");
		let request = call.prepare(&credential).expect("Request should build.");

		assert_eq!(request, call.prepare(&credential).expect("Request should build."));
		assert_eq!(request.url.path(), "/api/v1/weather/en-US/52.52/13.405");
		assert_eq!(
			request.url.query(),
			Some(
				"dataSets=currentWeather%2CforecastDaily&countryCode=DE&dailyStart=2025-03-01T00%3A00%3A00Z&dailyEnd=2025-03-03T00%3A00%3A00Z&timezone=Europe%2FBerlin"
			),
		);
		assert!(
			request
				.header("authorization")
				.is_some_and(|value| value.starts_with("Bearer ey"))
		);
	}

	#[tokio::test]
	async fn offset_instants_are_sent_in_utc() {
		let credential = signed_credential().await;
		let call = WeatherCall::new(&descriptor(), "en-US", Coordinate::new(52.52, 13.405))
			.expect("Call should build.")
			.current_as_of(macros::datetime!(2025-03-01 12:30 +1))
			.hourly_range(
				macros::datetime!(2025-03-01 08:00 -5),
				macros::datetime!(2025-03-02 08:00 -5),
			);
		let request = call.prepare(&credential).expect("Request should build.");

		assert_eq!(
			request.url.query(),
			Some(
				"currentAsOf=2025-03-01T11%3A30%3A00Z&hourlyStart=2025-03-01T13%3A00%3A00Z&hourlyEnd=2025-03-02T13%3A00%3A00Z"
			),
		);
		assert_eq!(call.options().current_as_of, Some(macros::datetime!(2025-03-01 11:30 UTC)));
	}

	#[test]
	fn weather_body_is_revived() {
		let call = WeatherCall::new(&descriptor(), "en-US", Coordinate::new(52.52, 13.405))
			.expect("Call should build.");
		let request = WireRequest::new(call.endpoint.clone());
		let revived = call
			.parse(json_response(
				&request,
				200,
				r#"{"currentWeather":{"asOf":"2025-03-01T12:00:00Z","conditionCode":"Cloudy"}}"#,
			))
			.expect("Weather should decode.");
		let current = revived.get("currentWeather").expect("Current weather should exist.");

		assert_eq!(
			current.get("asOf").and_then(Revived::as_instant),
			Some(macros::datetime!(2025-03-01 12:00 UTC)),
		);
		assert_eq!(current.get("conditionCode").and_then(Revived::as_str), Some("Cloudy"));
	}

	#[test]
	fn failures_name_the_request_url() {
		let call = AttributionCall::new(&descriptor(), "en-US").expect("Call should build.");
		let request = WireRequest::new(call.endpoint.clone());
		let err = call
			.parse(json_response(&request, 503, ""))
			.expect_err("Non-success statuses must fail.");
		let api = err.as_api().expect("Failure should be an API error.");

		assert_eq!(api.status, 503);
		assert_eq!(api.status_text, "Service Unavailable");
		assert!(api.message.contains("https://weatherkit.apple.com/api/v1/attribution/en-US"));
	}

	#[test]
	fn attribution_decodes_logos() {
		let call = AttributionCall::new(&descriptor(), "en-US").expect("Call should build.");
		let request = WireRequest::new(call.endpoint.clone());
		let attribution = call
			.parse(json_response(
				&request,
				200,
				r#"{
					"serviceName": "Apple Weather",
					"legalPageURL": "https://developer.apple.com/weatherkit/data-source-attribution/",
					"logoDark@1x": "https://weatherkit.apple.com/assets/branding/en/Apple_Weather_wht_en_1X.png",
					"logoSquare@3x": "https://weatherkit.apple.com/assets/branding/square-mark.png"
				}"#,
			))
			.expect("Attribution should decode.");

		assert_eq!(attribution.service_name, "Apple Weather");
		assert!(attribution.logo_dark_1x.is_some_and(|logo| logo.ends_with("_1X.png")));
		assert!(attribution.logo_light_2x.is_none());
		assert!(attribution.logo_square_3x.is_some());
	}
}
