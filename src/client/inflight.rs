//! In-flight request registry used to collapse identical concurrent calls.

// self
use crate::{_prelude::*, http::{ApiResponse, Method}};

/// Shared outcome slot for one in-flight request.
pub(crate) type SharedOutcome = Arc<OnceCell<Result<ApiResponse>>>;

/// De-duplication key made of the HTTP method and the endpoint as passed by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestKey(String);
impl RequestKey {
	/// Builds the `METHOD:endpoint` key.
	pub fn new(method: Method, endpoint: &str) -> Self {
		Self(format!("{method}:{endpoint}"))
	}
}
impl Display for RequestKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Registry of requests currently on the wire, owned by one client instance.
#[derive(Clone, Debug, Default)]
pub(crate) struct InFlight(Arc<Mutex<HashMap<RequestKey, SharedOutcome>>>);
impl InFlight {
	/// Joins the request registered under `key`, or registers a new one led by the caller.
	pub(crate) fn join(&self, key: &RequestKey) -> Joined {
		let mut entries = self.0.lock();

		if let Some(outcome) = entries.get(key) {
			return Joined::Follower(self.entry(key, outcome.clone()));
		}

		let outcome: SharedOutcome = Arc::new(OnceCell::new());

		entries.insert(key.clone(), outcome.clone());

		Joined::Leader(self.entry(key, outcome))
	}

	fn entry(&self, key: &RequestKey, outcome: SharedOutcome) -> InFlightEntry {
		InFlightEntry { registry: self.clone(), key: key.clone(), outcome }
	}

	pub(crate) fn len(&self) -> usize {
		self.0.lock().len()
	}
}

/// Role the caller plays for a de-duplicated request.
pub(crate) enum Joined {
	/// First caller; owns the registry entry until it is dropped.
	Leader(InFlightEntry),
	/// Later caller waiting on the leader's outcome; takes over the request if every caller ahead
	/// of it is cancelled.
	Follower(InFlightEntry),
}

/// Caller's hold on a registry entry.
///
/// The entry leaves the registry once the outcome is settled or its last holder is dropped, so a
/// follower that takes over from a cancelled leader stays visible to later identical calls.
pub(crate) struct InFlightEntry {
	registry: InFlight,
	key: RequestKey,
	outcome: SharedOutcome,
}
impl InFlightEntry {
	pub(crate) fn outcome(&self) -> &SharedOutcome {
		&self.outcome
	}
}
impl Drop for InFlightEntry {
	fn drop(&mut self) {
		let mut entries = self.registry.0.lock();
		let Some(current) = entries.get(&self.key) else { return };

		if !Arc::ptr_eq(current, &self.outcome) {
			return;
		}
		// One reference belongs to the registry, one to this holder.
		if !self.outcome.is_initialized() && Arc::strong_count(&self.outcome) > 2 {
			return;
		}

		entries.remove(&self.key);
	}
}
