//! PayPal Express Checkout over the NVP API.
//!
//! Covers the checkout flow (`SetExpressCheckout`, `GetExpressCheckoutDetails`,
//! `DoExpressCheckoutPayment`) and recurring profiles
//! (`CreateRecurringPaymentsProfile`, `GetRecurringPaymentsProfileDetails`,
//! `ManageRecurringPaymentsProfileStatus`).
//!
//! # Flow
//!
//! - **setup**: register the payment, receive a token, send the buyer to
//!   [`ExpressClient::redirect_uri`]
//! - **details**: read back payer information after approval
//! - **checkout** / **subscribe**: capture the payment or create a profile
//!
//! Remote failures come back as a [`Response`] with `is_failure() == true`;
//! only validation and transport problems are returned as [`PaypalError`].
//!
//! # Quick example
//!
//! ```no_run
//! use paypal_express::{Credentials, ExpressClient, OneTimePayment, SetupOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), paypal_express::PaypalError> {
//! let credentials = Credentials::builder()
//!     .username("api_user")
//!     .password("api_password")
//!     .signature("api_signature")
//!     .return_url("https://shop.example.com/paypal/return")
//!     .cancel_url("https://shop.example.com/paypal/cancel")
//!     .build()?;
//! let client = ExpressClient::new(credentials)?;
//!
//! let payment = OneTimePayment::builder()
//!     .amount(1000)
//!     .description("Instant Payment Request")
//!     .build()?;
//!
//! let response = client.setup(&payment.into(), SetupOptions::default()).await?;
//! if let Some(token) = response.token() {
//!     println!("approve at {}", client.redirect_uri(token, false));
//! }
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod error;
pub mod format;
pub mod params;
pub mod payment;
pub mod request;
pub mod response;
pub mod transport;

// Re-exports
pub use constants::ApiConfig;
pub use error::PaypalError;
pub use format::{format_amount, format_date};
pub use params::{Params, SetupOptions, ToParams};
pub use payment::{
    Billing, BillingPeriod, BillingType, OneTimePayment, PaymentRequest, ProfileAction,
    RecurringPayment, RecurringProfile, TrialBilling,
};
pub use request::{Credentials, ExpressClient, RemoteMethod, COMMON_FIELDS};
pub use response::{Ack, ApiError, Payer, Response};
pub use transport::{HttpTransport, Transport, TransportError};

pub use rust_decimal::Decimal;
