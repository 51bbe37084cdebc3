use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Acknowledgement status from the `ACK` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Ack {
    Success,
    SuccessWithWarning,
    Failure,
    FailureWithWarning,
    Warning,
    PartialSuccess,
    /// Missing or unrecognized `ACK` value.
    Unknown(String),
}

impl Ack {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("Success") => Self::Success,
            Some("SuccessWithWarning") => Self::SuccessWithWarning,
            Some("Failure") => Self::Failure,
            Some("FailureWithWarning") => Self::FailureWithWarning,
            Some("Warning") => Self::Warning,
            Some("PartialSuccess") => Self::PartialSuccess,
            Some(other) => Self::Unknown(other.to_string()),
            None => Self::Unknown(String::new()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::SuccessWithWarning)
    }
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("Success"),
            Self::SuccessWithWarning => f.write_str("SuccessWithWarning"),
            Self::Failure => f.write_str("Failure"),
            Self::FailureWithWarning => f.write_str("FailureWithWarning"),
            Self::Warning => f.write_str("Warning"),
            Self::PartialSuccess => f.write_str("PartialSuccess"),
            Self::Unknown(raw) => write!(f, "Unknown({raw})"),
        }
    }
}

/// One entry of the `L_ERRORCODEn` family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

/// Buyer details returned by `GetExpressCheckoutDetails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payer {
    pub payer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Parsed NVP reply.
///
/// A failed remote call is still a `Response`; check [`is_failure`](Self::is_failure)
/// and [`errors`](Self::errors) for the details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    ack: Ack,
    fields: BTreeMap<String, String>,
}

impl Response {
    /// Decode a form-encoded reply body. Never fails: an unusable body
    /// yields a response with `Ack::Unknown`.
    pub fn parse(body: &str) -> Self {
        let fields: BTreeMap<String, String> = url::form_urlencoded::parse(body.trim().as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let ack = Ack::parse(fields.get("ACK").map(String::as_str));
        Self { ack, fields }
    }

    pub fn ack(&self) -> &Ack {
        &self.ack
    }

    pub fn is_success(&self) -> bool {
        self.ack.is_success()
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn token(&self) -> Option<&str> {
        self.get("TOKEN")
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.get("CORRELATIONID")
    }

    pub fn version(&self) -> Option<&str> {
        self.get("VERSION")
    }

    /// `BUILD`, the server build that handled the call.
    pub fn build_number(&self) -> Option<&str> {
        self.get("BUILD")
    }

    /// `TIMESTAMP`, e.g. `2011-02-08T09:00:01Z`.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.get("TIMESTAMP")
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }

    pub fn payer(&self) -> Option<Payer> {
        let owned = |key: &str| self.get(key).map(str::to_string);
        Some(Payer {
            payer_id: owned("PAYERID")?,
            email: owned("EMAIL"),
            first_name: owned("FIRSTNAME"),
            last_name: owned("LASTNAME"),
            country_code: owned("COUNTRYCODE"),
            status: owned("PAYERSTATUS"),
        })
    }

    pub fn profile_id(&self) -> Option<&str> {
        self.get("PROFILEID")
    }

    pub fn profile_status(&self) -> Option<&str> {
        self.get("PROFILESTATUS").or_else(|| self.get("STATUS"))
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.get("PAYMENTINFO_0_TRANSACTIONID")
    }

    pub fn payment_status(&self) -> Option<&str> {
        self.get("PAYMENTINFO_0_PAYMENTSTATUS")
    }

    pub fn billing_agreement_id(&self) -> Option<&str> {
        self.get("BILLINGAGREEMENTID")
    }

    /// Errors reported as `L_ERRORCODE0`, `L_ERRORCODE1`, ... in index order.
    pub fn errors(&self) -> Vec<ApiError> {
        let owned = |key: String| self.fields.get(&key).cloned();
        (0..)
            .map_while(|i| {
                let code = owned(format!("L_ERRORCODE{i}"))?;
                Some(ApiError {
                    code,
                    short_message: owned(format!("L_SHORTMESSAGE{i}")),
                    long_message: owned(format!("L_LONGMESSAGE{i}")),
                    severity: owned(format!("L_SEVERITYCODE{i}")),
                })
            })
            .collect()
    }
}
