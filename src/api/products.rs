//! Catalog browsing and admin product management.

// self
use crate::{
	_prelude::*,
	api::{Envelope, Money, Page, with_query},
	auth::ProductId,
	client::{ApiCall, ApiClient},
	http::ApiTransport,
};

/// Catalog product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
	/// Product identifier.
	pub id: ProductId,
	/// Display name.
	pub name: String,
	/// Long description.
	#[serde(default)]
	pub description: Option<String>,
	/// Base price.
	pub price: Money,
	/// Units in stock across variants.
	#[serde(default)]
	pub stock: u32,
	/// Category label.
	#[serde(default)]
	pub category: Option<String>,
	/// Image URLs, cover first.
	#[serde(default)]
	pub images: Vec<String>,
	/// Purchasable SKU variants.
	#[serde(default)]
	pub variants: Vec<ProductVariant>,
}
impl Product {
	/// Returns the cover image, if any.
	pub fn cover_image(&self) -> Option<&str> {
		self.images.first().map(String::as_str)
	}

	/// Looks up a variant by SKU.
	pub fn variant(&self, sku: &str) -> Option<&ProductVariant> {
		self.variants.iter().find(|variant| variant.sku == sku)
	}

	/// Price of the given variant, falling back to the base price.
	pub fn price_for(&self, sku: Option<&str>) -> Money {
		sku.and_then(|sku| self.variant(sku)).and_then(|variant| variant.price).unwrap_or(self.price)
	}

	/// Returns `true` when at least one unit can be bought.
	pub fn in_stock(&self) -> bool {
		if self.variants.is_empty() {
			self.stock > 0
		} else {
			self.variants.iter().any(|variant| variant.stock > 0)
		}
	}
}

/// SKU-level variant of a [`Product`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
	/// Stock keeping unit.
	pub sku: String,
	/// Variant label (size, colour, ...).
	pub name: String,
	/// Variant price overriding the product's base price.
	#[serde(default)]
	pub price: Option<Money>,
	/// Units in stock.
	#[serde(default)]
	pub stock: u32,
}

/// Payload for creating or updating a product from the admin console.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
	/// Display name.
	pub name: String,
	/// Long description.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Base price.
	pub price: Money,
	/// Units in stock.
	pub stock: u32,
	/// Category label.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	/// Image URLs, cover first.
	pub images: Vec<String>,
	/// SKU variants.
	pub variants: Vec<ProductVariant>,
}

/// Filters for catalog listings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductQuery {
	/// One-based page number.
	pub page: Option<u32>,
	/// Page size.
	pub limit: Option<u32>,
	/// Free-text search.
	pub search: Option<String>,
	/// Category filter.
	pub category: Option<String>,
}
impl ProductQuery {
	/// Requests the given page.
	pub fn page(mut self, page: u32) -> Self {
		self.page = Some(page);

		self
	}

	/// Requests the given page size.
	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);

		self
	}

	/// Filters by free-text search; blank terms are ignored.
	pub fn search(mut self, term: impl Into<String>) -> Self {
		let term = term.into();

		self.search = (!term.trim().is_empty()).then(|| term.trim().to_owned());

		self
	}

	/// Filters by category.
	pub fn category(mut self, category: impl Into<String>) -> Self {
		self.category = Some(category.into());

		self
	}

	/// Renders the listing endpoint.
	pub fn endpoint(&self) -> String {
		with_query(
			"/products",
			[
				("page", self.page.map(|page| page.to_string())),
				("limit", self.limit.map(|limit| limit.to_string())),
				("search", self.search.clone()),
				("category", self.category.clone()),
			],
		)
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists catalog products.
	pub async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>> {
		self.get::<Envelope<Page<Product>>>(&query.endpoint()).await.map(Envelope::into_data)
	}

	/// Fetches a single product.
	pub async fn product(&self, id: &ProductId) -> Result<Product> {
		self.get::<Envelope<Product>>(&format!("/products/{id}")).await.map(Envelope::into_data)
	}

	/// Creates a product (admin only).
	pub async fn create_product(&self, input: &ProductInput) -> Result<Product> {
		let call = ApiCall::post("/products").json(input)?.without_dedupe();

		self.send::<Envelope<Product>>(call).await.map(Envelope::into_data)
	}

	/// Replaces a product's attributes (admin only).
	pub async fn update_product(&self, id: &ProductId, input: &ProductInput) -> Result<Product> {
		let call = ApiCall::put(format!("/products/{id}")).json(input)?.without_dedupe();

		self.send::<Envelope<Product>>(call).await.map(Envelope::into_data)
	}

	/// Deletes a product (admin only).
	pub async fn delete_product(&self, id: &ProductId) -> Result<()> {
		self.delete::<serde_json::Value>(&format!("/products/{id}")).await.map(|_| ())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn product() -> Product {
		serde_json::from_str(
			r#"{
				"id": "prod-1",
				"name": "Kemeja Batik",
				"price": 250000,
				"stock": 0,
				"images": ["https://cdn.example.com/batik.jpg"],
				"variants": [
					{ "sku": "BTK-M", "name": "M", "stock": 0 },
					{ "sku": "BTK-XL", "name": "XL", "price": "275000", "stock": 3 }
				]
			}"#,
		)
		.expect("Product payload should deserialize.")
	}

	#[test]
	fn variants_drive_price_and_stock() {
		let product = product();

		assert_eq!(product.price_for(Some("BTK-XL")), Money(275_000));
		assert_eq!(product.price_for(Some("BTK-M")), Money(250_000));
		assert_eq!(product.price_for(None), Money(250_000));
		assert!(product.in_stock());
		assert_eq!(product.cover_image(), Some("https://cdn.example.com/batik.jpg"));
	}

	#[test]
	fn query_renders_endpoint() {
		assert_eq!(ProductQuery::default().endpoint(), "/products");
		assert_eq!(
			ProductQuery::default().page(2).limit(12).search("  batik  ").category("fashion").endpoint(),
			"/products?page=2&limit=12&search=batik&category=fashion"
		);
		assert_eq!(ProductQuery::default().search("   ").endpoint(), "/products");
	}
}
