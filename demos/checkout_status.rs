//! Walks a signed-in buyer through checkout against a mock storefront API, then polls the
//! payment until it settles.
//!
//! 1. Seed a [`MemorySessionStore`] with the buyer's session so requests carry a bearer token.
//! 2. Let the [`RouteGuard`] confirm the buyer may open the payment page.
//! 3. Quote shipping, pick the cheapest courier, and create the checkout.
//! 4. Poll the payment with [`PaymentPoller`]; the observer prints one success notice.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::Duration;
// self
use storefront_client::{
	api::{CheckoutRequest, Payment, ShippingQuery, cheapest},
	auth::{ProductId, Role, Session, UserId},
	client::ApiClient,
	config::ClientConfig,
	guard::RouteGuard,
	poller::{PaymentObserver, PaymentPoller, PollSchedule},
	store::{MemorySessionStore, SessionStore},
};

struct PrintObserver;
impl PaymentObserver for PrintObserver {
	fn on_update(&self, payment: &Payment) {
		println!("Payment {} is {}.", payment.order_id, payment.status);
	}

	fn on_success(&self, payment: &Payment) {
		println!("Payment received for order {}, thank you!", payment.order_id);
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let rates_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/shipping/rates");
			then.status(200).header("content-type", "application/json").body(
				"{\"data\":[{\"courier\":\"jne\",\"service\":\"REG\",\"cost\":18000},{\"courier\":\"sicepat\",\"service\":\"BEST\",\"cost\":15000}]}",
			);
		})
		.await;
	let checkout_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/checkout").header("authorization", "Bearer demo-access");
			then.status(201).header("content-type", "application/json").body(
				"{\"data\":{\"orderId\":\"ORD-1001\",\"paymentUrl\":\"https://pay.example.com/ORD-1001\"}}",
			);
		})
		.await;
	let payment_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/payments/ORD-1001");
			then.status(200).header("content-type", "application/json").body(
				"{\"data\":{\"orderId\":\"ORD-1001\",\"status\":\"settlement\",\"grossAmount\":265000}}",
			);
		})
		.await;
	let session = Session::builder(UserId::new("user-42")?, "sari", Role::Client)
		.access_token("demo-access")
		.expires_in(Duration::hours(1))
		.build()?;
	let sessions = Arc::new(MemorySessionStore::with_session(session));
	let guard = RouteGuard::default();
	let decision = guard.authorize("/dashboard/orders", &*sessions).await?;

	println!("Guard decision for /dashboard/orders: {decision:?}.");

	let store: Arc<dyn SessionStore> = sessions;
	let client = ApiClient::new(ClientConfig::from_base_url(&server.base_url())?, store)?;
	let rates = client.shipping_rates(&ShippingQuery::new("3171", 1_200)).await?;
	let rate = cheapest(&rates).ok_or_else(|| color_eyre::eyre::eyre!("No courier quotes."))?;

	println!("Cheapest courier: {} {} at {}.", rate.courier, rate.service, rate.cost);

	let checkout = client
		.create_checkout(
			&CheckoutRequest::new(ProductId::new("prod-batik")?, 1)
				.with_shipping(rate)
				.with_address("Jl. Merdeka 1, Jakarta"),
		)
		.await?;
	let poller = PaymentPoller::new(Arc::new(client.clone()), checkout.order_id)
		.with_observer(Arc::new(PrintObserver))
		.with_schedule(PollSchedule::default());
	let outcome = poller.run().await;

	println!("Polling stopped after {} check(s): {outcome:?}.", poller.checks());

	rates_mock.assert_async().await;
	checkout_mock.assert_async().await;
	payment_mock.assert_async().await;

	Ok(())
}
