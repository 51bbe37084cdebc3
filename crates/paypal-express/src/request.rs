//! Express checkout and recurring profile operations.

use std::fmt;

use crate::constants::ApiConfig;
use crate::error::PaypalError;
use crate::params::{Params, SetupOptions, ToParams};
use crate::payment::{PaymentRequest, ProfileAction, RecurringProfile};
use crate::response::Response;
use crate::transport::{HttpTransport, Transport};

/// API credentials plus the merchant's return and cancel URLs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
    signature: String,
    return_url: String,
    cancel_url: String,
}

impl Credentials {
    pub fn builder() -> CredentialsBuilder {
        CredentialsBuilder::default()
    }

    /// Read `PAYPAL_USERNAME`, `PAYPAL_PASSWORD`, `PAYPAL_SIGNATURE`,
    /// `PAYPAL_RETURN_URL` and `PAYPAL_CANCEL_URL`.
    pub fn from_env() -> Result<Self, PaypalError> {
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, PaypalError> {
        let mut builder = Self::builder();
        builder.username = lookup("PAYPAL_USERNAME");
        builder.password = lookup("PAYPAL_PASSWORD");
        builder.signature = lookup("PAYPAL_SIGNATURE");
        builder.return_url = lookup("PAYPAL_RETURN_URL");
        builder.cancel_url = lookup("PAYPAL_CANCEL_URL");
        builder.build()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn return_url(&self) -> &str {
        &self.return_url
    }

    pub fn cancel_url(&self) -> &str {
        &self.cancel_url
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .field("return_url", &self.return_url)
            .field("cancel_url", &self.cancel_url)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CredentialsBuilder {
    username: Option<String>,
    password: Option<String>,
    signature: Option<String>,
    return_url: Option<String>,
    cancel_url: Option<String>,
}

impl CredentialsBuilder {
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }

    pub fn cancel_url(mut self, url: impl Into<String>) -> Self {
        self.cancel_url = Some(url.into());
        self
    }

    pub fn build(self) -> Result<Credentials, PaypalError> {
        const TYPE: &str = "Credentials";
        let required = |value: Option<String>, attribute: &'static str| {
            value.ok_or_else(|| PaypalError::missing(TYPE, attribute))
        };
        let absolute_url = |value: Option<String>, attribute: &'static str| {
            let value = required(value, attribute)?;
            url::Url::parse(&value).map_err(|e| {
                PaypalError::invalid(TYPE, attribute, format!("'{value}': {e}"))
            })?;
            Ok::<_, PaypalError>(value)
        };

        Ok(Credentials {
            username: required(self.username, "username")?,
            password: required(self.password, "password")?,
            signature: required(self.signature, "signature")?,
            return_url: absolute_url(self.return_url, "return_url")?,
            cancel_url: absolute_url(self.cancel_url, "cancel_url")?,
        })
    }
}

/// NVP method names for the supported operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteMethod {
    SetExpressCheckout,
    GetExpressCheckoutDetails,
    DoExpressCheckoutPayment,
    CreateRecurringPaymentsProfile,
    GetRecurringPaymentsProfileDetails,
    ManageRecurringPaymentsProfileStatus,
}

impl RemoteMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetExpressCheckout => "SetExpressCheckout",
            Self::GetExpressCheckoutDetails => "GetExpressCheckoutDetails",
            Self::DoExpressCheckoutPayment => "DoExpressCheckoutPayment",
            Self::CreateRecurringPaymentsProfile => "CreateRecurringPaymentsProfile",
            Self::GetRecurringPaymentsProfileDetails => "GetRecurringPaymentsProfileDetails",
            Self::ManageRecurringPaymentsProfileStatus => "ManageRecurringPaymentsProfileStatus",
        }
    }
}

impl fmt::Display for RemoteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields sent with every call on top of the operation's own fields.
pub const COMMON_FIELDS: &[&str] = &["METHOD", "USER", "PWD", "SIGNATURE", "VERSION"];

/// Express checkout client.
///
/// Holds credentials and API configuration only; each operation is a
/// single POST through the transport. Shareable across tasks when the
/// transport is.
pub struct ExpressClient<T: Transport = HttpTransport> {
    credentials: Credentials,
    config: ApiConfig,
    transport: T,
}

impl ExpressClient<HttpTransport> {
    /// Create a production client with the default HTTP transport.
    pub fn new(credentials: Credentials) -> Result<Self, PaypalError> {
        Ok(Self::with_transport(credentials, HttpTransport::new()?))
    }
}

impl<T: Transport> ExpressClient<T> {
    pub fn with_transport(credentials: Credentials, transport: T) -> Self {
        Self {
            credentials,
            config: ApiConfig::default(),
            transport,
        }
    }

    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `SetExpressCheckout`: start a checkout session and obtain a token.
    pub async fn setup(
        &self,
        payment: &PaymentRequest,
        options: SetupOptions,
    ) -> Result<Response, PaypalError> {
        let mut params = Params::new();
        params
            .insert("RETURNURL", &self.credentials.return_url)
            .insert("CANCELURL", &self.credentials.cancel_url)
            .extend(options.to_params(0))
            .extend(payment.to_params(0));
        self.post(RemoteMethod::SetExpressCheckout, params).await
    }

    /// `GetExpressCheckoutDetails`: read back what the buyer approved.
    pub async fn details(&self, token: &str) -> Result<Response, PaypalError> {
        let mut params = Params::new();
        params.insert("TOKEN", token);
        self.post(RemoteMethod::GetExpressCheckoutDetails, params).await
    }

    /// `DoExpressCheckoutPayment`: capture the approved payment.
    pub async fn checkout(
        &self,
        token: &str,
        payer_id: &str,
        payment: &PaymentRequest,
    ) -> Result<Response, PaypalError> {
        let mut params = Params::new();
        params
            .insert("TOKEN", token)
            .insert("PAYERID", payer_id)
            .extend(payment.to_params(0));
        self.post(RemoteMethod::DoExpressCheckoutPayment, params)
            .await
    }

    /// `CreateRecurringPaymentsProfile`: turn an approved billing agreement
    /// into a subscription.
    pub async fn subscribe(
        &self,
        token: &str,
        profile: &RecurringProfile,
    ) -> Result<Response, PaypalError> {
        let mut params = Params::new();
        params.insert("TOKEN", token).extend(profile.to_params(0));
        self.post(RemoteMethod::CreateRecurringPaymentsProfile, params)
            .await
    }

    /// `GetRecurringPaymentsProfileDetails`.
    pub async fn subscription(&self, profile_id: &str) -> Result<Response, PaypalError> {
        let mut params = Params::new();
        params.insert("PROFILEID", profile_id);
        self.post(RemoteMethod::GetRecurringPaymentsProfileDetails, params)
            .await
    }

    /// `ManageRecurringPaymentsProfileStatus`. `note` defaults to empty.
    pub async fn renew(
        &self,
        profile_id: &str,
        action: ProfileAction,
        note: Option<&str>,
    ) -> Result<Response, PaypalError> {
        let mut params = Params::new();
        params
            .insert("ACTION", action)
            .insert("PROFILEID", profile_id)
            .insert("NOTE", note.unwrap_or_default());
        self.post(RemoteMethod::ManageRecurringPaymentsProfileStatus, params)
            .await
    }

    pub async fn suspend(
        &self,
        profile_id: &str,
        note: Option<&str>,
    ) -> Result<Response, PaypalError> {
        self.renew(profile_id, ProfileAction::Suspend, note).await
    }

    pub async fn cancel(
        &self,
        profile_id: &str,
        note: Option<&str>,
    ) -> Result<Response, PaypalError> {
        self.renew(profile_id, ProfileAction::Cancel, note).await
    }

    pub async fn reactivate(
        &self,
        profile_id: &str,
        note: Option<&str>,
    ) -> Result<Response, PaypalError> {
        self.renew(profile_id, ProfileAction::Reactivate, note).await
    }

    /// Buyer approval URL for a token returned by [`setup`](Self::setup).
    ///
    /// With `pay_on_paypal`, the approval page shows "Pay Now" and the
    /// payment completes without a separate review step on the merchant site.
    pub fn redirect_uri(&self, token: &str, pay_on_paypal: bool) -> String {
        let mut uri = format!(
            "{}?cmd=_express-checkout&token={}",
            self.config.redirect_base,
            urlencoding::encode(token)
        );
        if pay_on_paypal {
            uri.push_str("&useraction=commit");
        }
        uri
    }

    /// Operation fields plus the common fields. The common fields go in
    /// last so an operation field can never replace them.
    fn form(&self, method: RemoteMethod, params: Params) -> Params {
        let mut form = params;
        form.insert("METHOD", method)
            .insert("USER", &self.credentials.username)
            .insert("PWD", &self.credentials.password)
            .insert("SIGNATURE", &self.credentials.signature)
            .insert("VERSION", &self.config.version);
        form
    }

    async fn post(&self, method: RemoteMethod, params: Params) -> Result<Response, PaypalError> {
        let form = self.form(method, params);

        tracing::debug!(method = %method, endpoint = %self.config.endpoint, "posting NVP request");
        let body = self.transport.post(&self.config.endpoint, &form).await?;

        let response = Response::parse(&body);
        if response.is_failure() {
            let first_error = response.errors().into_iter().next();
            tracing::warn!(
                method = %method,
                ack = %response.ack(),
                correlation_id = response.correlation_id().unwrap_or("-"),
                error_code = first_error.as_ref().map(|e| e.code.as_str()).unwrap_or("-"),
                "NVP call failed"
            );
        } else {
            tracing::debug!(method = %method, ack = %response.ack(), "NVP call succeeded");
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const FULL_ENV: &[(&str, &str)] = &[
        ("PAYPAL_USERNAME", "nov"),
        ("PAYPAL_PASSWORD", "password"),
        ("PAYPAL_SIGNATURE", "sig"),
        ("PAYPAL_RETURN_URL", "http://example.com/success"),
        ("PAYPAL_CANCEL_URL", "http://example.com/cancel"),
    ];

    #[test]
    fn test_credentials_from_env() {
        let credentials = Credentials::from_lookup(env(FULL_ENV)).unwrap();
        assert_eq!(credentials.username(), "nov");
        assert_eq!(credentials.return_url(), "http://example.com/success");
    }

    #[test]
    fn test_credentials_from_env_reports_missing_variable() {
        let partial: Vec<_> = FULL_ENV
            .iter()
            .copied()
            .filter(|(k, _)| *k != "PAYPAL_SIGNATURE")
            .collect();
        let err = Credentials::from_lookup(env(&partial)).unwrap_err();
        assert!(matches!(
            err,
            PaypalError::MissingAttribute {
                type_name: "Credentials",
                attribute: "signature"
            }
        ));
    }

    #[test]
    fn test_credentials_reject_relative_url() {
        let err = Credentials::builder()
            .username("nov")
            .password("password")
            .signature("sig")
            .return_url("/success")
            .cancel_url("http://example.com/cancel")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            PaypalError::InvalidAttribute {
                attribute: "return_url",
                ..
            }
        ));
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let credentials = Credentials::from_lookup(env(FULL_ENV)).unwrap();
        let debug = format!("{credentials:?}");
        assert!(debug.contains("nov"));
        assert!(!debug.contains("password\""));
        assert!(!debug.contains("\"sig\""));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_common_fields_override_operation_fields() {
        let credentials = Credentials::from_lookup(env(FULL_ENV)).unwrap();
        let client = ExpressClient::new(credentials).unwrap();
        let params: Params = [
            ("METHOD", "RefundTransaction"),
            ("USER", "mallory"),
            ("VERSION", "1.0"),
            ("TOKEN", "EC-TOKEN"),
        ]
        .into_iter()
        .collect();

        let form = client.form(RemoteMethod::GetExpressCheckoutDetails, params);
        assert_eq!(form.get("METHOD"), Some("GetExpressCheckoutDetails"));
        assert_eq!(form.get("USER"), Some("nov"));
        assert_eq!(form.get("PWD"), Some("password"));
        assert_eq!(form.get("SIGNATURE"), Some("sig"));
        assert_eq!(form.get("VERSION"), Some(crate::constants::API_VERSION));
        assert_eq!(form.get("TOKEN"), Some("EC-TOKEN"));
    }

    #[test]
    fn test_remote_method_names() {
        assert_eq!(
            RemoteMethod::ManageRecurringPaymentsProfileStatus.to_string(),
            "ManageRecurringPaymentsProfileStatus"
        );
    }
}
