#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use storefront_client::{
	_preludet::*,
	api::{CheckoutRequest, Money, PaymentStatus, ProductInput, ProductQuery, ShippingQuery, cheapest},
	auth::{OrderId, ProductId, Role, Session, UserId},
	guard::RouteGuard,
	poller::{PaymentPoller, PollOutcome, PollSchedule},
	store::SessionStore,
};

fn product_id(raw: &str) -> ProductId {
	ProductId::new(raw).expect("Product identifier should be valid for resource tests.")
}

async fn sign_in(sessions: &dyn SessionStore, role: Role) -> Session {
	let session = Session::builder(
		UserId::new("user-1").expect("User identifier should be valid for resource tests."),
		"ayu",
		role,
	)
	.access_token("access-resources")
	.expires_in(Duration::hours(1))
	.build()
	.expect("Session fixture should build successfully.");

	sessions.save(session.clone()).await.expect("Failed to seed the session store.");

	session
}

#[tokio::test]
async fn catalog_listing_sends_filters_and_decodes_pages() {
	let server = MockServer::start_async().await;
	let (client, _) = build_reqwest_test_client(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/products")
				.query_param("page", "2")
				.query_param("limit", "1")
				.query_param("search", "batik");
			then.status(200).header("content-type", "application/json").body(
				"{\"data\":{\"items\":[{\"id\":\"prod-1\",\"name\":\"Kemeja Batik\",\"price\":\"250000\",\"stock\":2}],\"total\":3,\"page\":2,\"limit\":1},\"message\":\"ok\"}",
			);
		})
		.await;
	let page = client
		.list_products(&ProductQuery::default().page(2).limit(1).search("batik"))
		.await
		.expect("Catalog listing should succeed.");

	assert_eq!(page.items.len(), 1);
	assert_eq!(page.items[0].price, Money(250_000));
	assert!(page.has_next());

	mock.assert_async().await;
}

#[tokio::test]
async fn admin_product_management_round_trips() {
	let server = MockServer::start_async().await;
	let (client, sessions) = build_reqwest_test_client(&server.base_url());

	sign_in(&*sessions, Role::Admin).await;

	let input = ProductInput {
		name: "Kemeja Batik".into(),
		description: None,
		price: Money(250_000),
		stock: 5,
		category: Some("fashion".into()),
		images: Vec::new(),
		variants: Vec::new(),
	};
	let create = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/products")
				.header("authorization", "Bearer access-resources")
				.json_body(serde_json::json!({
					"name": "Kemeja Batik",
					"price": 250000,
					"stock": 5,
					"category": "fashion",
					"images": [],
					"variants": []
				}));
			then.status(201).header("content-type", "application/json").body(
				"{\"data\":{\"id\":\"prod-9\",\"name\":\"Kemeja Batik\",\"price\":250000,\"stock\":5}}",
			);
		})
		.await;
	let update = server
		.mock_async(|when, then| {
			when.method(PUT).path("/products/prod-9");
			then.status(200).header("content-type", "application/json").body(
				"{\"data\":{\"id\":\"prod-9\",\"name\":\"Kemeja Batik\",\"price\":225000,\"stock\":5}}",
			);
		})
		.await;
	let delete = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/products/prod-9");
			then.status(204);
		})
		.await;
	let created = client.create_product(&input).await.expect("Product creation should succeed.");

	assert_eq!(created.id, product_id("prod-9"));

	let updated = client
		.update_product(&created.id, &ProductInput { price: Money(225_000), ..input })
		.await
		.expect("Product update should succeed.");

	assert_eq!(updated.price, Money(225_000));

	client.delete_product(&created.id).await.expect("Product deletion should succeed.");

	create.assert_async().await;
	update.assert_async().await;
	delete.assert_async().await;
}

#[tokio::test]
async fn checkout_flow_quotes_shipping_and_polls_the_payment() {
	let server = MockServer::start_async().await;
	let (client, sessions) = build_reqwest_test_client(&server.base_url());

	sign_in(&*sessions, Role::Client).await;

	let rates = server
		.mock_async(|when, then| {
			when.method(POST).path("/shipping/rates").json_body(serde_json::json!({
				"destination": "3171",
				"weight": 1000
			}));
			then.status(200).header("content-type", "application/json").body(
				"{\"data\":[{\"courier\":\"jne\",\"service\":\"REG\",\"cost\":18000},{\"courier\":\"sicepat\",\"service\":\"REG\",\"cost\":15000,\"etd\":\"2-3\"}]}",
			);
		})
		.await;
	let checkout = server
		.mock_async(|when, then| {
			when.method(POST).path("/checkout").json_body(serde_json::json!({
				"productId": "prod-1",
				"quantity": 1,
				"courier": "sicepat",
				"courierService": "REG",
				"shippingCost": 15000,
				"address": "Jl. Merdeka 1"
			}));
			then.status(201).header("content-type", "application/json").body(
				"{\"data\":{\"orderId\":\"ORD-77\",\"redirectUrl\":\"https://pay.example.com/ORD-77\"}}",
			);
		})
		.await;
	let payment = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/payments/ORD-77")
				.header("authorization", "Bearer access-resources");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"orderId\":\"ORD-77\",\"transactionStatus\":\"settlement\",\"grossAmount\":165000}}");
		})
		.await;
	let quotes = client
		.shipping_rates(&ShippingQuery::new("3171", 1_000))
		.await
		.expect("Shipping quote should succeed.");
	let rate = cheapest(&quotes).expect("Quotes should not be empty.");
	let session = client
		.create_checkout(
			&CheckoutRequest::new(product_id("prod-1"), 1)
				.with_shipping(rate)
				.with_address("Jl. Merdeka 1"),
		)
		.await
		.expect("Checkout should succeed.");

	assert_eq!(session.order_id, OrderId::new("ORD-77").expect("Order identifier should be valid."));
	assert_eq!(session.payment_url.as_deref(), Some("https://pay.example.com/ORD-77"));

	let poller = PaymentPoller::new(Arc::new(client.clone()), session.order_id.clone())
		.with_schedule(PollSchedule::new(3, [(3, StdDuration::from_millis(10))]));
	let outcome = poller.run().await;
	let PollOutcome::Settled(settled) = outcome else {
		panic!("Settled payment should end polling.");
	};

	assert_eq!(settled.status, PaymentStatus::Success);
	assert_eq!(settled.gross_amount, Some(Money(165_000)));

	rates.assert_async().await;
	checkout.assert_async().await;
	payment.assert_calls_async(1).await;
}

#[tokio::test]
async fn public_profiles_are_reachable_from_qr_paths() {
	let server = MockServer::start_async().await;
	let (client, sessions) = build_reqwest_test_client(&server.base_url());
	let guard = RouteGuard::default();
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/users/user-5/profile");
			then.status(200).header("content-type", "application/json").body(
				"{\"data\":{\"id\":\"user-5\",\"username\":\"sari\",\"bio\":\"Penjahit\"}}",
			);
		})
		.await;
	let target = storefront_client::api::profile_share_path(
		&UserId::new("user-5").expect("User identifier should be valid."),
	);
	let denied = guard
		.authorize(&target, &*sessions)
		.await
		.expect("Guard should read the session store.");

	assert_eq!(denied.location(), Some("/login"));

	let session = sign_in(&*sessions, Role::Client).await;

	assert_eq!(
		guard
			.post_login_location(&*sessions, &session)
			.await
			.expect("Guard should read the session store."),
		"/qr/user-5"
	);
	assert!(
		guard
			.authorize(&target, &*sessions)
			.await
			.expect("Guard should read the session store.")
			.is_allowed()
	);

	let profile = client
		.public_profile(&UserId::new("user-5").expect("User identifier should be valid."))
		.await
		.expect("Profile lookup should succeed.");

	assert_eq!(profile.username, "sari");
	assert_eq!(profile.bio.as_deref(), Some("Penjahit"));

	mock.assert_async().await;
}
