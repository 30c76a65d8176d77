//! Typed storefront resources layered on top of [`ApiClient`](crate::client::ApiClient).
//!
//! Resource endpoints wrap their payload in an [`Envelope`]; wire fields are camelCase. Calls
//! that carry a request body opt out of in-flight de-duplication, since the key ignores the body.

pub mod money;
pub mod payments;
pub mod products;
pub mod shipping;
pub mod users;

pub use money::*;
pub use payments::*;
pub use products::*;
pub use shipping::*;
pub use users::*;

// self
use crate::_prelude::*;

/// Standard response wrapper used by resource endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
	/// Resource payload.
	pub data: T,
	/// Optional human-readable message from the API.
	#[serde(default)]
	pub message: Option<String>,
}
impl<T> Envelope<T> {
	/// Discards the message and returns the payload.
	pub fn into_data(self) -> T {
		self.data
	}
}

/// Paginated listing returned by collection endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
	/// Items on this page.
	pub items: Vec<T>,
	/// Total number of items across all pages.
	#[serde(default)]
	pub total: u64,
	/// One-based page number.
	#[serde(default = "first_page")]
	pub page: u32,
	/// Page size used by the server.
	#[serde(default)]
	pub limit: u32,
}
impl<T> Page<T> {
	/// Returns `true` when further pages exist after this one.
	pub fn has_next(&self) -> bool {
		self.limit > 0 && u64::from(self.page) * u64::from(self.limit) < self.total
	}
}

fn first_page() -> u32 {
	1
}

/// Appends `pairs` (skipping `None` values) to `path` as a query string.
pub(crate) fn with_query<'a, I>(path: &str, pairs: I) -> String
where
	I: IntoIterator<Item = (&'a str, Option<String>)>,
{
	let mut serializer = url::form_urlencoded::Serializer::new(String::new());
	let mut any = false;

	for (key, value) in pairs {
		if let Some(value) = value {
			serializer.append_pair(key, &value);

			any = true;
		}
	}

	if any { format!("{path}?{}", serializer.finish()) } else { path.to_owned() }
}
