//! Checkout creation and payment status lookups.

// self
use crate::{
	_prelude::*,
	api::{Envelope, Money},
	auth::{OrderId, ProductId},
	client::{ApiCall, ApiClient},
	http::ApiTransport,
};

/// Payment lifecycle state reported by the payment gateway.
///
/// Gateway synonyms collapse onto one variant: `success`, `settlement`, and `capture` are
/// [`PaymentStatus::Success`]; `failed` and `deny` are [`PaymentStatus::Failed`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
	/// Awaiting payment.
	Pending,
	/// Paid.
	Success,
	/// Rejected by the gateway or the issuer.
	Failed,
	/// Cancelled by the buyer or merchant.
	Cancelled,
	/// Payment window elapsed.
	Expired,
	/// Any status this client does not recognize.
	Unknown(String),
}
impl PaymentStatus {
	/// Returns the canonical label.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Pending => "pending",
			Self::Success => "success",
			Self::Failed => "failed",
			Self::Cancelled => "cancel",
			Self::Expired => "expire",
			Self::Unknown(raw) => raw,
		}
	}

	/// Returns `true` while the payment may still change.
	pub fn is_pending(&self) -> bool {
		matches!(self, Self::Pending)
	}

	/// Returns `true` for a settled payment.
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success)
	}

	/// Returns `true` for states that never change again.
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Success | Self::Failed | Self::Cancelled | Self::Expired)
	}
}
impl From<&str> for PaymentStatus {
	fn from(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"pending" => Self::Pending,
			"success" | "settlement" | "capture" => Self::Success,
			"failed" | "failure" | "deny" => Self::Failed,
			"cancel" | "cancelled" | "canceled" => Self::Cancelled,
			"expire" | "expired" => Self::Expired,
			_ => Self::Unknown(raw.to_owned()),
		}
	}
}
impl From<String> for PaymentStatus {
	fn from(raw: String) -> Self {
		Self::from(raw.as_str())
	}
}
impl From<PaymentStatus> for String {
	fn from(status: PaymentStatus) -> Self {
		status.as_str().to_owned()
	}
}
impl Display for PaymentStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Payment attached to a checkout order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
	/// Order identifier.
	pub order_id: OrderId,
	/// Current status.
	#[serde(alias = "transactionStatus")]
	pub status: PaymentStatus,
	/// Amount charged.
	#[serde(default)]
	pub gross_amount: Option<Money>,
	/// Gateway payment method (bank transfer, e-wallet, ...).
	#[serde(default)]
	pub payment_type: Option<String>,
	/// Instant the order was created.
	#[serde(default, alias = "transactionTime", with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}
impl Payment {
	/// Age of the payment at `now`, when the creation instant is known.
	pub fn age_at(&self, now: OffsetDateTime) -> Option<Duration> {
		self.created_at.map(|created| now - created)
	}
}

/// Checkout request for a single product line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
	/// Product being bought.
	pub product_id: ProductId,
	/// Chosen variant SKU.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub variant_sku: Option<String>,
	/// Units bought.
	pub quantity: u32,
	/// Courier code chosen from the shipping rates.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub courier: Option<String>,
	/// Courier service chosen from the shipping rates.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub courier_service: Option<String>,
	/// Shipping cost quoted for the chosen service.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub shipping_cost: Option<Money>,
	/// Delivery address.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
	/// Note for the seller.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub note: Option<String>,
}
impl CheckoutRequest {
	/// Creates a request for `quantity` units of `product_id`.
	pub fn new(product_id: ProductId, quantity: u32) -> Self {
		Self {
			product_id,
			variant_sku: None,
			quantity,
			courier: None,
			courier_service: None,
			shipping_cost: None,
			address: None,
			note: None,
		}
	}

	/// Selects a variant.
	pub fn with_variant(mut self, sku: impl Into<String>) -> Self {
		self.variant_sku = Some(sku.into());

		self
	}

	/// Selects a quoted shipping service.
	pub fn with_shipping(mut self, rate: &crate::api::ShippingRate) -> Self {
		self.courier = Some(rate.courier.clone());
		self.courier_service = Some(rate.service.clone());
		self.shipping_cost = Some(rate.cost);

		self
	}

	/// Sets the delivery address.
	pub fn with_address(mut self, address: impl Into<String>) -> Self {
		self.address = Some(address.into());

		self
	}

	/// Adds a note for the seller.
	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.note = Some(note.into());

		self
	}
}

/// Gateway session created for a checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
	/// Order identifier to poll payment status with.
	pub order_id: OrderId,
	/// Hosted payment page.
	#[serde(default, alias = "redirectUrl")]
	pub payment_url: Option<String>,
	/// Gateway snap token.
	#[serde(default)]
	pub token: Option<String>,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates an order and its payment session.
	pub async fn create_checkout(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
		let call = ApiCall::post("/checkout").json(request)?.without_dedupe();

		self.send::<Envelope<CheckoutSession>>(call).await.map(Envelope::into_data)
	}

	/// Fetches the current payment state of an order.
	pub async fn payment(&self, order_id: &OrderId) -> Result<Payment> {
		self.get::<Envelope<Payment>>(&format!("/payments/{order_id}")).await.map(Envelope::into_data)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn gateway_synonyms_collapse() {
		for raw in ["success", "settlement", "CAPTURE"] {
			assert_eq!(PaymentStatus::from(raw), PaymentStatus::Success);
		}
		for raw in ["failed", "deny"] {
			assert_eq!(PaymentStatus::from(raw), PaymentStatus::Failed);
		}

		assert_eq!(PaymentStatus::from("cancel"), PaymentStatus::Cancelled);
		assert_eq!(PaymentStatus::from("expire"), PaymentStatus::Expired);
		assert_eq!(PaymentStatus::from("refund"), PaymentStatus::Unknown("refund".into()));
		assert!(!PaymentStatus::from("refund").is_terminal());
		assert!(PaymentStatus::Expired.is_terminal());
	}

	#[test]
	fn payments_deserialize_gateway_fields() {
		let payment: Payment = serde_json::from_str(
			r#"{
				"orderId": "ORD-1",
				"transactionStatus": "settlement",
				"grossAmount": "150000.00",
				"paymentType": "bank_transfer",
				"createdAt": "2025-01-01T10:00:00Z"
			}"#,
		)
		.expect("Payment payload should deserialize.");

		assert!(payment.status.is_success());
		assert_eq!(payment.gross_amount, Some(Money(150_000)));
		assert_eq!(
			payment.age_at(macros::datetime!(2025-01-01 10:12 UTC)),
			Some(Duration::minutes(12))
		);

		let bare: Payment = serde_json::from_str(r#"{"orderId":"ORD-2","status":"pending"}"#)
			.expect("Minimal payment payload should deserialize.");

		assert!(bare.status.is_pending());
		assert_eq!(bare.age_at(OffsetDateTime::now_utc()), None);
	}

	#[test]
	fn checkout_request_omits_unset_fields() {
		let request = CheckoutRequest::new(
			ProductId::new("prod-1").expect("Product fixture should be valid."),
			2,
		)
		.with_variant("BTK-XL");
		let payload = serde_json::to_value(&request).expect("Checkout request should serialize.");

		assert_eq!(
			payload,
			serde_json::json!({ "productId": "prod-1", "variantSku": "BTK-XL", "quantity": 2 })
		);
	}
}
