//! Account roles carried by the session's role claim.

// self
use crate::_prelude::*;

/// Role claim attached to an authenticated session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// Store operator with access to the product-management console.
	Admin,
	/// Shopper account.
	Client,
}
impl Role {
	/// Returns the wire label of the role.
	pub const fn as_str(self) -> &'static str {
		match self {
			Role::Admin => "admin",
			Role::Client => "client",
		}
	}
}
impl Display for Role {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Role {
	type Err = UnknownRole;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("admin") {
			Ok(Role::Admin)
		} else if s.eq_ignore_ascii_case("client") {
			Ok(Role::Client)
		} else {
			Err(UnknownRole(s.to_owned()))
		}
	}
}

/// Error returned when a role claim is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown role `{0}`.")]
pub struct UnknownRole(pub String);
