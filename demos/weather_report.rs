//! Fetches current conditions and the data-provider attribution from WeatherKit.
//!
//! Required environment:
//!
//! - `WEATHERKIT_TEAM_ID`, `WEATHERKIT_SERVICE_ID`, `WEATHERKIT_KEY_ID`
//! - `WEATHERKIT_KEY_PATH`: path to the `.p8` private key
//!
//! Optional positional arguments: `<latitude> <longitude> [language]` (defaults to Berlin in
//! `en-US`).

// std
use std::{env, fs, time::Duration};
// crates.io
use color_eyre::{Result, eyre::WrapErr};
// self
use bearer_broker::{
	api::{AttributionCall, DataSet, WeatherCall},
	auth::SignerConfig,
	call::{Coordinate, Revived},
	credential::SignedCredential,
	descriptor::ApiDescriptor,
	dispatch::Dispatcher,
	http::ReqwestTransport,
};

fn var(name: &str) -> Result<String> {
	env::var(name).wrap_err_with(|| format!("{name} must be set"))
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let key_path = var("WEATHERKIT_KEY_PATH")?;
	let config = SignerConfig {
		team_id: var("WEATHERKIT_TEAM_ID")?.parse()?,
		app_id: var("WEATHERKIT_SERVICE_ID")?.parse()?,
		key_id: var("WEATHERKIT_KEY_ID")?.parse()?,
		private_key_pem: fs::read_to_string(&key_path)
			.wrap_err_with(|| format!("failed to read {key_path}"))?,
	};
	let mut args = env::args().skip(1);
	let latitude = args.next().map(|value| value.parse::<f64>()).transpose()?.unwrap_or(52.52);
	let longitude = args.next().map(|value| value.parse::<f64>()).transpose()?.unwrap_or(13.405);
	let language = args.next().unwrap_or_else(|| "en-US".into());
	let descriptor = ApiDescriptor::apple_weatherkit()?;
	let credential = SignedCredential::new(config.into_signer()?);
	let dispatcher = Dispatcher::new(ReqwestTransport::with_timeout(Duration::from_secs(10))?);
	let weather = WeatherCall::new(&descriptor, &language, Coordinate::new(latitude, longitude))?
		.data_sets([DataSet::CurrentWeather]);
	let report = dispatcher.perform(&credential, &weather).await?;
	let attribution =
		dispatcher.perform(&credential, &AttributionCall::new(&descriptor, &language)?).await?;
	let current = report.get("currentWeather");
	let field = |name: &str| current.and_then(|current| current.get(name));

	println!("Weather at {latitude},{longitude}");

	if let Some(as_of) = field("asOf").and_then(Revived::as_instant) {
		println!("  as of:       {as_of}");
	}
	if let Some(condition) = field("conditionCode").and_then(Revived::as_str) {
		println!("  condition:   {condition}");
	}
	if let Some(temperature) = field("temperature").and_then(Revived::as_f64) {
		println!("  temperature: {temperature:.1} °C");
	}

	println!("Data: {} ({})", attribution.service_name, attribution.legal_page_url);
	println!(
		"Dispatches: {} attempts, {} refreshes",
		dispatcher.metrics().attempts(),
		dispatcher.metrics().refreshes()
	);

	Ok(())
}
