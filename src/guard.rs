//! Role-based route guard driven by a static path-prefix table.
//!
//! Paths are matched segment by segment, so `/admin` protects `/admin` and `/admin/orders` but
//! not `/administrator`. The longest matching prefix wins. Query strings and fragments never take
//! part in matching.

// self
use crate::{
	_prelude::*,
	auth::{Role, Session},
	obs::{self, Operation, OperationSpan, Outcome},
	store::SessionStore,
};

/// Role requirement attached to a protected prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequiredRole {
	/// Only administrators.
	Admin,
	/// Any signed-in account.
	Member,
}
impl RequiredRole {
	/// Returns `true` when `role` satisfies the requirement.
	pub fn admits(self, role: Role) -> bool {
		match self {
			Self::Admin => matches!(role, Role::Admin),
			Self::Member => true,
		}
	}
}

/// A protected path prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteRule {
	/// Normalized prefix, e.g. `/admin`.
	pub prefix: String,
	/// Role needed to enter.
	pub required: RequiredRole,
}
impl RouteRule {
	fn matches(&self, path: &str) -> bool {
		segment_match(path, &self.prefix)
	}
}

/// Why the guard redirected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectReason {
	/// No valid session for a protected path.
	Unauthenticated,
	/// The session's role may not enter the path.
	Forbidden,
	/// A signed-in user visited the login page.
	AlreadyAuthenticated,
}

/// Redirect issued by the guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
	/// Path to send the visitor to.
	pub location: String,
	/// Why the visitor was redirected.
	pub reason: RedirectReason,
	/// Originally requested path, set for unauthenticated visits.
	pub return_to: Option<String>,
}

/// Result of evaluating a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
	/// Let the request through.
	Allow,
	/// Send the visitor elsewhere.
	Redirect(Redirect),
}
impl GuardDecision {
	/// Returns `true` for [`GuardDecision::Allow`].
	pub fn is_allowed(&self) -> bool {
		matches!(self, Self::Allow)
	}

	/// Redirect target, if any.
	pub fn location(&self) -> Option<&str> {
		match self {
			Self::Allow => None,
			Self::Redirect(redirect) => Some(&redirect.location),
		}
	}
}

/// Maps request paths to role requirements and redirect targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteGuard {
	rules: Vec<RouteRule>,
	login_path: String,
	admin_home: String,
	client_home: String,
}
impl RouteGuard {
	/// Creates a guard with no protected prefixes.
	pub fn new(login_path: impl AsRef<str>) -> Self {
		Self {
			rules: Vec::new(),
			login_path: normalize(login_path.as_ref()),
			admin_home: "/admin".into(),
			client_home: "/dashboard".into(),
		}
	}

	/// Protects `prefix` with `required`, replacing any existing rule for the same prefix.
	pub fn with_rule(mut self, prefix: impl AsRef<str>, required: RequiredRole) -> Self {
		let prefix = normalize(prefix.as_ref());

		self.rules.retain(|rule| rule.prefix != prefix);
		self.rules.push(RouteRule { prefix, required });
		// Longest prefix first so nested rules shadow their parents.
		self.rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

		self
	}

	/// Sets the landing page of `role`.
	pub fn with_home(mut self, role: Role, path: impl AsRef<str>) -> Self {
		let path = normalize(path.as_ref());

		match role {
			Role::Admin => self.admin_home = path,
			Role::Client => self.client_home = path,
		}

		self
	}

	/// Login page path.
	pub fn login_path(&self) -> &str {
		&self.login_path
	}

	/// Landing page of `role`.
	pub fn home_for(&self, role: Role) -> &str {
		match role {
			Role::Admin => &self.admin_home,
			Role::Client => &self.client_home,
		}
	}

	/// Protected prefixes, longest first.
	pub fn rules(&self) -> &[RouteRule] {
		&self.rules
	}

	/// Role requirement of `path`; `None` for public paths.
	pub fn required_role(&self, path: &str) -> Option<RequiredRole> {
		let path = normalize(path);

		self.rules.iter().find(|rule| rule.matches(&path)).map(|rule| rule.required)
	}

	/// Evaluates `path` for `session` at `now`; expired sessions count as signed out.
	pub fn evaluate_at(
		&self,
		path: &str,
		session: Option<&Session>,
		now: OffsetDateTime,
	) -> GuardDecision {
		let _span = OperationSpan::new(Operation::RouteGuard, "evaluate").entered();
		let normalized = normalize(path);
		let session = session.filter(|session| !session.is_expired_at(now));

		if segment_match(&normalized, &self.login_path) {
			return match session {
				Some(session) => self.redirect(
					self.home_for(session.role),
					RedirectReason::AlreadyAuthenticated,
					None,
				),
				None => GuardDecision::Allow,
			};
		}

		let Some(required) = self.required_role(&normalized) else {
			return GuardDecision::Allow;
		};

		match session {
			None => self.redirect(
				&self.login_path,
				RedirectReason::Unauthenticated,
				Some(path.trim().to_owned()),
			),
			Some(session) if required.admits(session.role) => GuardDecision::Allow,
			Some(session) =>
				self.redirect(self.home_for(session.role), RedirectReason::Forbidden, None),
		}
	}

	/// Evaluates `path` for `session` against the current clock.
	pub fn evaluate(&self, path: &str, session: Option<&Session>) -> GuardDecision {
		self.evaluate_at(path, session, OffsetDateTime::now_utc())
	}

	/// Evaluates `path` against the session held by `store`.
	///
	/// Unauthenticated visits to protected paths remember the requested path in the store so
	/// [`RouteGuard::post_login_location`] can send the visitor back after signing in.
	pub async fn authorize(&self, path: &str, store: &dyn SessionStore) -> Result<GuardDecision> {
		const OP: Operation = Operation::RouteGuard;

		let span = OperationSpan::new(OP, "authorize");

		span.instrument(async {
			obs::record_outcome(OP, Outcome::Attempt);

			let session = store.active().await?;
			let decision = self.evaluate(path, session.as_ref());

			if let GuardDecision::Redirect(Redirect {
				reason: RedirectReason::Unauthenticated,
				return_to: Some(return_to),
				..
			}) = &decision
			{
				store.remember_redirect(return_to.clone()).await?;
			}

			match &decision {
				GuardDecision::Allow => obs::record_outcome(OP, Outcome::Success),
				GuardDecision::Redirect(redirect) => {
					obs::note(OP, &format!("redirecting to {}", redirect.location));
					obs::record_outcome(OP, Outcome::Failure);
				},
			}

			Ok(decision)
		})
		.await
	}

	/// Where to send `session` right after signing in.
	///
	/// Consumes the remembered path and honors it only when the session may enter it.
	pub async fn post_login_location(
		&self,
		store: &dyn SessionStore,
		session: &Session,
	) -> Result<String> {
		let remembered = store.take_redirect().await?;

		Ok(remembered
			.filter(|path| self.evaluate(path, Some(session)).is_allowed())
			.unwrap_or_else(|| self.home_for(session.role).to_owned()))
	}

	fn redirect(
		&self,
		location: &str,
		reason: RedirectReason,
		return_to: Option<String>,
	) -> GuardDecision {
		GuardDecision::Redirect(Redirect { location: location.to_owned(), reason, return_to })
	}
}
impl Default for RouteGuard {
	fn default() -> Self {
		Self::new("/login")
			.with_rule("/admin", RequiredRole::Admin)
			.with_rule("/dashboard", RequiredRole::Member)
			.with_rule("/qr", RequiredRole::Member)
	}
}

fn normalize(path: &str) -> String {
	let path = path.trim();
	let path = path.split(['?', '#']).next().unwrap_or_default();
	let path = path.trim_end_matches('/');

	if path.starts_with('/') { path.to_owned() } else { format!("/{path}") }
}

fn segment_match(path: &str, prefix: &str) -> bool {
	if prefix == "/" {
		return true;
	}

	path.strip_prefix(prefix).is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{auth::UserId, store::MemorySessionStore};

	fn session(role: Role) -> Session {
		Session::builder(UserId::new("user-1").expect("User fixture should be valid."), "ayu", role)
			.access_token("access")
			.expires_at(macros::datetime!(2099-01-01 00:00 UTC))
			.build()
			.expect("Session fixture should build.")
	}

	#[test]
	fn admin_paths_redirect_by_session() {
		let guard = RouteGuard::default();
		let anonymous = guard.evaluate("/admin/x", None);
		let GuardDecision::Redirect(redirect) = anonymous else {
			panic!("Anonymous admin visit should redirect.");
		};

		assert_eq!(redirect.location, "/login");
		assert_eq!(redirect.reason, RedirectReason::Unauthenticated);
		assert_eq!(redirect.return_to.as_deref(), Some("/admin/x"));

		let client = guard.evaluate("/admin/x", Some(&session(Role::Client)));

		assert_eq!(client.location(), Some("/dashboard"));
		assert!(guard.evaluate("/admin/x", Some(&session(Role::Admin))).is_allowed());
	}

	#[test]
	fn member_paths_admit_both_roles() {
		let guard = RouteGuard::default();

		for role in [Role::Admin, Role::Client] {
			assert!(guard.evaluate("/dashboard/orders", Some(&session(role))).is_allowed());
			assert!(guard.evaluate("/qr/user-9", Some(&session(role))).is_allowed());
		}

		assert_eq!(guard.evaluate("/qr/user-9", None).location(), Some("/login"));
	}

	#[test]
	fn matching_is_segment_aware_and_ignores_query() {
		let guard = RouteGuard::default();

		assert_eq!(guard.required_role("/administrator"), None);
		assert_eq!(guard.required_role("/admin?tab=orders"), Some(RequiredRole::Admin));
		assert_eq!(guard.required_role("/admin/"), Some(RequiredRole::Admin));
		assert_eq!(guard.required_role("dashboard#top"), Some(RequiredRole::Member));
		assert!(guard.evaluate("/", None).is_allowed());
		assert!(guard.evaluate("/prod-1", None).is_allowed());
	}

	#[test]
	fn nested_rules_shadow_parents() {
		let guard = RouteGuard::default().with_rule("/dashboard/reports", RequiredRole::Admin);

		assert_eq!(guard.required_role("/dashboard/reports/daily"), Some(RequiredRole::Admin));
		assert_eq!(guard.required_role("/dashboard/orders"), Some(RequiredRole::Member));
	}

	#[test]
	fn login_page_sends_signed_in_users_home() {
		let guard = RouteGuard::default();

		assert!(guard.evaluate("/login", None).is_allowed());
		assert_eq!(guard.evaluate("/login", Some(&session(Role::Admin))).location(), Some("/admin"));

		let GuardDecision::Redirect(redirect) =
			guard.evaluate("/login?next=1", Some(&session(Role::Client)))
		else {
			panic!("Signed-in login visit should redirect.");
		};

		assert_eq!(redirect.location, "/dashboard");
		assert_eq!(redirect.reason, RedirectReason::AlreadyAuthenticated);
	}

	#[test]
	fn custom_homes_drive_redirects() {
		let guard = RouteGuard::default()
			.with_home(Role::Client, "/account")
			.with_home(Role::Admin, "/admin/overview");

		assert_eq!(guard.home_for(Role::Client), "/account");
		assert_eq!(guard.home_for(Role::Admin), "/admin/overview");

		let GuardDecision::Redirect(forbidden) =
			guard.evaluate("/admin/x", Some(&session(Role::Client)))
		else {
			panic!("Client admin visit should redirect.");
		};

		assert_eq!(forbidden.location, "/account");
		assert_eq!(forbidden.reason, RedirectReason::Forbidden);

		let GuardDecision::Redirect(signed_in) =
			guard.evaluate("/login", Some(&session(Role::Admin)))
		else {
			panic!("Signed-in login visit should redirect.");
		};

		assert_eq!(signed_in.location, "/admin/overview");
		assert_eq!(signed_in.reason, RedirectReason::AlreadyAuthenticated);
	}

	#[test]
	fn expired_sessions_count_as_signed_out() {
		let guard = RouteGuard::default();
		let session = session(Role::Admin);
		let after_expiry = macros::datetime!(2100-01-01 00:00 UTC);

		assert_eq!(
			guard.evaluate_at("/admin", Some(&session), after_expiry).location(),
			Some("/login")
		);
		assert!(guard.evaluate_at("/login", Some(&session), after_expiry).is_allowed());
	}

	#[tokio::test]
	async fn authorize_remembers_return_path() {
		let guard = RouteGuard::default();
		let store = MemorySessionStore::default();
		let decision = guard
			.authorize("/admin/products?page=2", &store)
			.await
			.expect("Guard should read the store.");

		assert_eq!(decision.location(), Some("/login"));

		let admin = session(Role::Admin);

		assert_eq!(
			guard.post_login_location(&store, &admin).await.expect("Store should yield."),
			"/admin/products?page=2"
		);
		assert_eq!(
			guard.post_login_location(&store, &admin).await.expect("Store should yield."),
			"/admin"
		);
	}

	#[tokio::test]
	async fn post_login_ignores_forbidden_targets() {
		let guard = RouteGuard::default();
		let store = MemorySessionStore::default();

		guard.authorize("/admin/users", &store).await.expect("Guard should read the store.");

		let client = session(Role::Client);

		assert_eq!(
			guard.post_login_location(&store, &client).await.expect("Store should yield."),
			"/dashboard"
		);
	}
}
