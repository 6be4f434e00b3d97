//! Typed access to visitor session state.
//!
//! Values are stored as JSON under fixed keys. A value that fails to
//! deserialize (for example after a model change) is treated as absent.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use nexus_core::{Cart, CustomerInfo, OrderDraft, OrderReceipt, QuoteRequest};
use serde::{Serialize, de::DeserializeOwned};
use tower_sessions::Session;

/// Session keys.
pub mod keys {
    /// The visitor's cart.
    pub const CART: &str = "cart";

    /// Order draft between checkout and payment.
    pub const ORDER_DATA: &str = "orderData";

    /// Quote form prefill carried from the shop.
    pub const QUOTE_PRODUCT: &str = "quoteProduct";

    /// Customer details kept between the two checkout steps.
    pub const CHECKOUT_CUSTOMER: &str = "checkoutCustomer";

    /// The last completed order, for the confirmation page.
    pub const ORDER_RECEIPT: &str = "orderReceipt";
}

type Result<T> = std::result::Result<T, tower_sessions::session::Error>;

/// Wrapper over a [`Session`] with one accessor pair per key.
#[derive(Clone, Debug)]
pub struct VisitorSession(pub Session);

impl<S> FromRequestParts<S> for VisitorSession
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> std::result::Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self)
    }
}

impl VisitorSession {
    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.0.get::<T>(key).await {
            Ok(value) => Ok(value),
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                tracing::warn!(key, error = %e, "Discarding unreadable session value");
                self.0.remove_value(key).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn write<T: Serialize + Send + Sync>(&self, key: &str, value: &T) -> Result<()> {
        self.0.insert(key, value).await
    }

    async fn take<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let value = self.read(key).await?;
        self.0.remove_value(key).await?;
        Ok(value)
    }

    /// The cart, empty when none is stored.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn cart(&self) -> Result<Cart> {
        Ok(self.read(keys::CART).await?.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn set_cart(&self, cart: &Cart) -> Result<()> {
        self.write(keys::CART, cart).await
    }

    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn order_draft(&self) -> Result<Option<OrderDraft>> {
        self.read(keys::ORDER_DATA).await
    }

    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn set_order_draft(&self, draft: &OrderDraft) -> Result<()> {
        self.write(keys::ORDER_DATA, draft).await
    }

    /// Remove and return the order draft.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn take_order_draft(&self) -> Result<Option<OrderDraft>> {
        self.take(keys::ORDER_DATA).await
    }

    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn checkout_customer(&self) -> Result<Option<CustomerInfo>> {
        self.read(keys::CHECKOUT_CUSTOMER).await
    }

    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn set_checkout_customer(&self, customer: &CustomerInfo) -> Result<()> {
        self.write(keys::CHECKOUT_CUSTOMER, customer).await
    }

    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn order_receipt(&self) -> Result<Option<OrderReceipt>> {
        self.read(keys::ORDER_RECEIPT).await
    }

    /// Store a completed order and clear everything that led to it.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn finish_order(&self, receipt: &OrderReceipt) -> Result<()> {
        self.write(keys::ORDER_RECEIPT, receipt).await?;
        self.0.remove_value(keys::ORDER_DATA).await?;
        self.0.remove_value(keys::CHECKOUT_CUSTOMER).await?;
        self.set_cart(&Cart::new()).await
    }

    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn quote_product(&self) -> Result<Option<QuoteRequest>> {
        self.read(keys::QUOTE_PRODUCT).await
    }

    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn set_quote_product(&self, request: &QuoteRequest) -> Result<()> {
        self.write(keys::QUOTE_PRODUCT, request).await
    }

    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn clear_quote_product(&self) -> Result<()> {
        self.0.remove_value(keys::QUOTE_PRODUCT).await?;
        Ok(())
    }
}
