//! Account profiles and QR profile sharing.

// self
use crate::{
	_prelude::*,
	api::Envelope,
	auth::{Role, UserId},
	client::ApiClient,
	http::ApiTransport,
};

/// Profile of the signed-in account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	/// Account identifier.
	pub id: UserId,
	/// Username.
	pub username: String,
	/// Role claim.
	pub role: Role,
	/// Contact e-mail.
	#[serde(default)]
	pub email: Option<String>,
	/// Full name.
	#[serde(default)]
	pub full_name: Option<String>,
	/// Phone number.
	#[serde(default)]
	pub phone: Option<String>,
	/// Avatar image URL.
	#[serde(default)]
	pub avatar_url: Option<String>,
}

/// Public profile shown on QR profile pages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
	/// Account identifier.
	pub id: UserId,
	/// Username.
	pub username: String,
	/// Full name.
	#[serde(default)]
	pub full_name: Option<String>,
	/// Avatar image URL.
	#[serde(default)]
	pub avatar_url: Option<String>,
	/// Short biography.
	#[serde(default)]
	pub bio: Option<String>,
}

/// Site path of the QR profile page for `id`.
pub fn profile_share_path(id: &UserId) -> String {
	format!("/qr/{id}")
}

/// Absolute URL of the QR profile page for `id` on `site`, the value encoded into the QR code.
pub fn profile_share_url(site: &Url, id: &UserId) -> Result<Url, url::ParseError> {
	site.join(&profile_share_path(id))
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Fetches the signed-in account's profile.
	pub async fn current_user(&self) -> Result<UserProfile> {
		self.get::<Envelope<UserProfile>>("/users/me").await.map(Envelope::into_data)
	}

	/// Fetches the public profile behind a QR code.
	pub async fn public_profile(&self, id: &UserId) -> Result<PublicProfile> {
		self.get::<Envelope<PublicProfile>>(&format!("/users/{id}/profile"))
			.await
			.map(Envelope::into_data)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn share_links_point_at_qr_pages() {
		let id = UserId::new("user-7").expect("User fixture should be valid.");
		let site = Url::parse("https://shop.example.com/any/page").expect("Site URL should parse.");

		assert_eq!(profile_share_path(&id), "/qr/user-7");
		assert_eq!(
			profile_share_url(&site, &id).expect("Share URL should join.").as_str(),
			"https://shop.example.com/qr/user-7"
		);
	}
}
