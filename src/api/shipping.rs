//! Courier shipping-rate quotes.

// self
use crate::{
	_prelude::*,
	api::{Envelope, Money},
	client::{ApiCall, ApiClient},
	http::ApiTransport,
};

/// Parameters of a shipping quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuery {
	/// Origin area code; the store's default origin applies when absent.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub origin: Option<String>,
	/// Destination area code.
	pub destination: String,
	/// Parcel weight in grams.
	pub weight: u32,
	/// Restrict quotes to one courier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub courier: Option<String>,
}
impl ShippingQuery {
	/// Creates a quote request for a parcel of `weight` grams.
	pub fn new(destination: impl Into<String>, weight: u32) -> Self {
		Self { origin: None, destination: destination.into(), weight, courier: None }
	}

	/// Overrides the origin area.
	pub fn from_origin(mut self, origin: impl Into<String>) -> Self {
		self.origin = Some(origin.into());

		self
	}

	/// Restricts quotes to a courier.
	pub fn courier(mut self, courier: impl Into<String>) -> Self {
		self.courier = Some(courier.into());

		self
	}
}

/// A courier service quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRate {
	/// Courier code (`jne`, `sicepat`, ...).
	pub courier: String,
	/// Service code (`REG`, `YES`, ...).
	pub service: String,
	/// Service description.
	#[serde(default)]
	pub description: Option<String>,
	/// Quoted cost.
	pub cost: Money,
	/// Estimated delivery time as reported by the courier (e.g. `2-3`).
	#[serde(default)]
	pub etd: Option<String>,
}

/// Returns the cheapest quote, preferring the first on ties.
pub fn cheapest(rates: &[ShippingRate]) -> Option<&ShippingRate> {
	rates.iter().reduce(|best, rate| if rate.cost < best.cost { rate } else { best })
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Quotes courier services for a parcel.
	pub async fn shipping_rates(&self, query: &ShippingQuery) -> Result<Vec<ShippingRate>> {
		let call = ApiCall::post("/shipping/rates").json(query)?.without_dedupe();

		self.send::<Envelope<Vec<ShippingRate>>>(call).await.map(Envelope::into_data)
	}
}
