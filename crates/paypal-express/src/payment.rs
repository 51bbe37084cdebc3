//! Payment requests and recurring profiles.
//!
//! Every type here is built through a builder that checks required fields
//! before anything touches the network. A missing field fails with
//! [`PaypalError::MissingAttribute`] naming the type and the field.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PaypalError;

fn non_negative(
    type_name: &'static str,
    attribute: &'static str,
    amount: Decimal,
) -> Result<Decimal, PaypalError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PaypalError::invalid(
            type_name,
            attribute,
            format!("amount must be non-negative, got {amount}"),
        ));
    }
    Ok(amount)
}

fn currency_code(type_name: &'static str, code: String) -> Result<String, PaypalError> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(PaypalError::invalid(
            type_name,
            "currency_code",
            format!("expected a 3-letter ISO 4217 code, got '{code}'"),
        ));
    }
    Ok(code)
}

/// Defines a closed enumeration of remote values. The wire name is the
/// variant name; parsing rejects anything else.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = PaypalError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| {
                        PaypalError::invalid(
                            stringify!($name),
                            "value",
                            format!("unknown {} '{s}'", stringify!($name)),
                        )
                    })
            }
        }
    };
}

wire_enum!(
    /// Billing agreement type requested at checkout setup.
    BillingType {
        RecurringPayments,
        MerchantInitiatedBilling,
        MerchantInitiatedBillingSingleAgreement,
    }
);

wire_enum!(
    /// Unit of a recurring billing cycle.
    BillingPeriod {
        Day,
        Week,
        SemiMonth,
        Month,
        Year,
    }
);

wire_enum!(
    /// Status change applied to an existing recurring profile.
    ProfileAction {
        Cancel,
        Suspend,
        Reactivate,
    }
);

// ── One-time payment ────────────────────────────────────────────────────

/// An immediate charge: amount plus description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OneTimePayment {
    amount: Decimal,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency_code: Option<String>,
}

impl OneTimePayment {
    pub fn builder() -> OneTimePaymentBuilder {
        OneTimePaymentBuilder::default()
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn currency_code(&self) -> Option<&str> {
        self.currency_code.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OneTimePaymentBuilder {
    amount: Option<Decimal>,
    description: Option<String>,
    currency_code: Option<String>,
}

impl OneTimePaymentBuilder {
    pub fn amount(mut self, amount: impl Into<Decimal>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn currency_code(mut self, code: impl Into<String>) -> Self {
        self.currency_code = Some(code.into());
        self
    }

    pub fn build(self) -> Result<OneTimePayment, PaypalError> {
        const TYPE: &str = "OneTimePayment";
        let amount = self
            .amount
            .ok_or_else(|| PaypalError::missing(TYPE, "amount"))?;
        let description = self
            .description
            .ok_or_else(|| PaypalError::missing(TYPE, "description"))?;
        let currency_code = self
            .currency_code
            .map(|c| currency_code(TYPE, c))
            .transpose()?;

        Ok(OneTimePayment {
            amount: non_negative(TYPE, "amount", amount)?,
            description,
            currency_code,
        })
    }
}

// ── Recurring payment (billing agreement setup) ─────────────────────────

/// A checkout that sets up a billing agreement instead of charging now.
///
/// Any requested amount is recorded but never sent: the payment amount
/// goes out as `0.00` at setup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurringPayment {
    billing_type: BillingType,
    billing_agreement_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    requested_amount: Option<Decimal>,
}

impl RecurringPayment {
    pub fn builder() -> RecurringPaymentBuilder {
        RecurringPaymentBuilder::default()
    }

    pub fn billing_type(&self) -> BillingType {
        self.billing_type
    }

    pub fn billing_agreement_description(&self) -> &str {
        &self.billing_agreement_description
    }

    pub fn requested_amount(&self) -> Option<Decimal> {
        self.requested_amount
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecurringPaymentBuilder {
    billing_type: Option<BillingType>,
    billing_agreement_description: Option<String>,
    requested_amount: Option<Decimal>,
}

impl RecurringPaymentBuilder {
    pub fn billing_type(mut self, billing_type: BillingType) -> Self {
        self.billing_type = Some(billing_type);
        self
    }

    pub fn billing_agreement_description(mut self, description: impl Into<String>) -> Self {
        self.billing_agreement_description = Some(description.into());
        self
    }

    pub fn amount(mut self, amount: impl Into<Decimal>) -> Self {
        self.requested_amount = Some(amount.into());
        self
    }

    pub fn build(self) -> Result<RecurringPayment, PaypalError> {
        const TYPE: &str = "RecurringPayment";
        let billing_type = self
            .billing_type
            .ok_or_else(|| PaypalError::missing(TYPE, "billing_type"))?;
        let billing_agreement_description = self
            .billing_agreement_description
            .ok_or_else(|| PaypalError::missing(TYPE, "billing_agreement_description"))?;
        let requested_amount = self
            .requested_amount
            .map(|a| non_negative(TYPE, "amount", a))
            .transpose()?;

        Ok(RecurringPayment {
            billing_type,
            billing_agreement_description,
            requested_amount,
        })
    }
}

/// Payment request accepted by `setup` and `checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentRequest {
    OneTime(OneTimePayment),
    Recurring(RecurringPayment),
}

impl From<OneTimePayment> for PaymentRequest {
    fn from(payment: OneTimePayment) -> Self {
        Self::OneTime(payment)
    }
}

impl From<RecurringPayment> for PaymentRequest {
    fn from(payment: RecurringPayment) -> Self {
        Self::Recurring(payment)
    }
}

// ── Recurring profile ───────────────────────────────────────────────────

/// Regular billing cycle of a recurring profile.
///
/// Only [`BillingBuilder`] can produce one:
///
/// ```compile_fail
/// use paypal_express::{Billing, BillingPeriod, Decimal};
///
/// let billing = Billing {
///     period: BillingPeriod::Month,
///     frequency: 0,
///     amount: Decimal::from(-5),
///     total_cycles: None,
///     tax_amount: None,
///     shipping_amount: None,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Billing {
    period: BillingPeriod,
    frequency: u32,
    amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_cycles: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tax_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping_amount: Option<Decimal>,
}

impl Billing {
    pub fn builder() -> BillingBuilder {
        BillingBuilder::default()
    }

    pub fn period(&self) -> BillingPeriod {
        self.period
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Zero when unset: bill until canceled.
    pub fn total_cycles(&self) -> u32 {
        self.total_cycles.unwrap_or(0)
    }

    pub fn tax_amount(&self) -> Decimal {
        self.tax_amount.unwrap_or_default()
    }

    pub fn shipping_amount(&self) -> Decimal {
        self.shipping_amount.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BillingBuilder {
    period: Option<BillingPeriod>,
    frequency: Option<u32>,
    amount: Option<Decimal>,
    total_cycles: Option<u32>,
    tax_amount: Option<Decimal>,
    shipping_amount: Option<Decimal>,
}

impl BillingBuilder {
    pub fn period(mut self, period: BillingPeriod) -> Self {
        self.period = Some(period);
        self
    }

    pub fn frequency(mut self, frequency: u32) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn amount(mut self, amount: impl Into<Decimal>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    /// Number of regular cycles; zero (the default) bills until canceled.
    pub fn total_cycles(mut self, cycles: u32) -> Self {
        self.total_cycles = Some(cycles);
        self
    }

    pub fn tax_amount(mut self, amount: impl Into<Decimal>) -> Self {
        self.tax_amount = Some(amount.into());
        self
    }

    pub fn shipping_amount(mut self, amount: impl Into<Decimal>) -> Self {
        self.shipping_amount = Some(amount.into());
        self
    }

    pub fn build(self) -> Result<Billing, PaypalError> {
        const TYPE: &str = "Billing";
        let period = self
            .period
            .ok_or_else(|| PaypalError::missing(TYPE, "period"))?;
        let frequency = self
            .frequency
            .ok_or_else(|| PaypalError::missing(TYPE, "frequency"))?;
        if frequency == 0 {
            return Err(PaypalError::invalid(
                TYPE,
                "frequency",
                "frequency must be positive",
            ));
        }
        let amount = self
            .amount
            .ok_or_else(|| PaypalError::missing(TYPE, "amount"))?;

        Ok(Billing {
            period,
            frequency,
            amount: non_negative(TYPE, "amount", amount)?,
            total_cycles: self.total_cycles,
            tax_amount: self
                .tax_amount
                .map(|a| non_negative(TYPE, "tax_amount", a))
                .transpose()?,
            shipping_amount: self
                .shipping_amount
                .map(|a| non_negative(TYPE, "shipping_amount", a))
                .transpose()?,
        })
    }
}

/// Introductory billing cycles that run before the regular ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBilling {
    period: BillingPeriod,
    frequency: u32,
    total_cycles: u32,
    amount: Decimal,
}

impl TrialBilling {
    pub fn new(
        period: BillingPeriod,
        frequency: u32,
        total_cycles: u32,
        amount: impl Into<Decimal>,
    ) -> Result<Self, PaypalError> {
        const TYPE: &str = "TrialBilling";
        if frequency == 0 {
            return Err(PaypalError::invalid(
                TYPE,
                "frequency",
                "frequency must be positive",
            ));
        }
        Ok(Self {
            period,
            frequency,
            total_cycles,
            amount: non_negative(TYPE, "amount", amount.into())?,
        })
    }

    pub fn period(&self) -> BillingPeriod {
        self.period
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn total_cycles(&self) -> u32 {
        self.total_cycles
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// A subscription to be created with `CreateRecurringPaymentsProfile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurringProfile {
    start_date: DateTime<Utc>,
    description: String,
    billing: Billing,
    #[serde(skip_serializing_if = "Option::is_none")]
    trial: Option<TrialBilling>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_failed_payments: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency_code: Option<String>,
}

impl RecurringProfile {
    pub fn builder() -> RecurringProfileBuilder {
        RecurringProfileBuilder::default()
    }

    pub fn start_date(&self) -> &DateTime<Utc> {
        &self.start_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn billing(&self) -> &Billing {
        &self.billing
    }

    pub fn trial(&self) -> Option<&TrialBilling> {
        self.trial.as_ref()
    }

    pub fn max_failed_payments(&self) -> Option<u32> {
        self.max_failed_payments
    }

    pub fn currency_code(&self) -> Option<&str> {
        self.currency_code.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecurringProfileBuilder {
    start_date: Option<DateTime<Utc>>,
    description: Option<String>,
    billing: Option<Billing>,
    trial: Option<TrialBilling>,
    max_failed_payments: Option<u32>,
    currency_code: Option<String>,
}

impl RecurringProfileBuilder {
    pub fn start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn billing(mut self, billing: Billing) -> Self {
        self.billing = Some(billing);
        self
    }

    pub fn trial(mut self, trial: TrialBilling) -> Self {
        self.trial = Some(trial);
        self
    }

    pub fn max_failed_payments(mut self, max: u32) -> Self {
        self.max_failed_payments = Some(max);
        self
    }

    pub fn currency_code(mut self, code: impl Into<String>) -> Self {
        self.currency_code = Some(code.into());
        self
    }

    pub fn build(self) -> Result<RecurringProfile, PaypalError> {
        const TYPE: &str = "RecurringProfile";
        let start_date = self
            .start_date
            .ok_or_else(|| PaypalError::missing(TYPE, "start_date"))?;
        let description = self
            .description
            .ok_or_else(|| PaypalError::missing(TYPE, "description"))?;
        let billing = self
            .billing
            .ok_or_else(|| PaypalError::missing(TYPE, "billing"))?;
        let currency_code = self
            .currency_code
            .map(|c| currency_code(TYPE, c))
            .transpose()?;

        Ok(RecurringProfile {
            start_date,
            description,
            billing,
            trial: self.trial,
            max_failed_payments: self.max_failed_payments,
            currency_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn assert_missing(err: PaypalError, expected_type: &str, expected_attr: &str) {
        match err {
            PaypalError::MissingAttribute {
                type_name,
                attribute,
            } => {
                assert_eq!(type_name, expected_type);
                assert_eq!(attribute, expected_attr);
            }
            other => panic!("expected MissingAttribute, got {other:?}"),
        }
    }

    fn assert_invalid(err: PaypalError, expected_attr: &str) {
        match err {
            PaypalError::InvalidAttribute { attribute, .. } => {
                assert_eq!(attribute, expected_attr)
            }
            other => panic!("expected InvalidAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_one_time_payment_requires_amount_and_description() {
        let err = OneTimePayment::builder()
            .description("Instant Payment Request")
            .build()
            .unwrap_err();
        assert_missing(err, "OneTimePayment", "amount");

        let err = OneTimePayment::builder().amount(1000).build().unwrap_err();
        assert_missing(err, "OneTimePayment", "description");
    }

    #[test]
    fn test_one_time_payment_rejects_negative_amount() {
        let err = OneTimePayment::builder()
            .amount(-5)
            .description("refund?")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            PaypalError::InvalidAttribute {
                attribute: "amount",
                ..
            }
        ));
    }

    #[test]
    fn test_one_time_payment_normalizes_currency_code() {
        let payment = OneTimePayment::builder()
            .amount(10)
            .description("x")
            .currency_code("usd")
            .build()
            .unwrap();
        assert_eq!(payment.currency_code(), Some("USD"));

        let err = OneTimePayment::builder()
            .amount(10)
            .description("x")
            .currency_code("dollars")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            PaypalError::InvalidAttribute {
                attribute: "currency_code",
                ..
            }
        ));
    }

    #[test]
    fn test_recurring_payment_requires_agreement_fields() {
        let err = RecurringPayment::builder()
            .billing_agreement_description("Recurring Payment Request")
            .build()
            .unwrap_err();
        assert_missing(err, "RecurringPayment", "billing_type");

        let err = RecurringPayment::builder()
            .billing_type(BillingType::RecurringPayments)
            .build()
            .unwrap_err();
        assert_missing(err, "RecurringPayment", "billing_agreement_description");
    }

    #[test]
    fn test_billing_rejects_zero_frequency() {
        let err = Billing::builder()
            .period(BillingPeriod::Month)
            .frequency(0)
            .amount(1000)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            PaypalError::InvalidAttribute {
                attribute: "frequency",
                ..
            }
        ));
    }

    #[test]
    fn test_billing_rejects_negative_tax_and_shipping() {
        let base = || {
            Billing::builder()
                .period(BillingPeriod::Month)
                .frequency(1)
                .amount(1000)
        };
        assert_invalid(base().tax_amount(-1).build().unwrap_err(), "tax_amount");
        assert_invalid(
            base().shipping_amount(Decimal::new(-1, 2)).build().unwrap_err(),
            "shipping_amount",
        );
        assert_invalid(base().amount(-5).build().unwrap_err(), "amount");
    }

    #[test]
    fn test_trial_billing_validates_frequency_and_amount() {
        assert_invalid(
            TrialBilling::new(BillingPeriod::Month, 0, 2, 0).unwrap_err(),
            "frequency",
        );
        assert_invalid(
            TrialBilling::new(BillingPeriod::Month, 1, 2, -3).unwrap_err(),
            "amount",
        );

        let trial = TrialBilling::new(BillingPeriod::Week, 2, 4, 0).unwrap();
        assert_eq!(trial.period(), BillingPeriod::Week);
        assert_eq!(trial.frequency(), 2);
        assert_eq!(trial.total_cycles(), 4);
        assert_eq!(trial.amount(), Decimal::ZERO);
    }

    #[test]
    fn test_recurring_payment_rejects_negative_requested_amount() {
        let err = RecurringPayment::builder()
            .billing_type(BillingType::RecurringPayments)
            .billing_agreement_description("Recurring Payment Request")
            .amount(-10)
            .build()
            .unwrap_err();
        assert_invalid(err, "amount");
    }

    #[test]
    fn test_billing_exposes_validated_values() {
        let billing = Billing::builder()
            .period(BillingPeriod::Year)
            .frequency(1)
            .amount(Decimal::new(1999, 2))
            .tax_amount(2)
            .build()
            .unwrap();
        assert_eq!(billing.period(), BillingPeriod::Year);
        assert_eq!(billing.frequency(), 1);
        assert_eq!(billing.amount(), Decimal::new(1999, 2));
        assert_eq!(billing.total_cycles(), 0);
        assert_eq!(billing.tax_amount(), Decimal::from(2));
        assert_eq!(billing.shipping_amount(), Decimal::ZERO);

        let json = serde_json::to_value(&billing).unwrap();
        assert_eq!(json["period"], "Year");
        assert_eq!(json["frequency"], 1);
        assert!(json.get("shipping_amount").is_none());
    }

    #[test]
    fn test_recurring_profile_requires_billing() {
        let err = RecurringProfile::builder()
            .start_date(Utc.with_ymd_and_hms(2011, 2, 8, 9, 0, 0).unwrap())
            .description("Recurring Profile")
            .build()
            .unwrap_err();
        assert_missing(err, "RecurringProfile", "billing");
    }

    #[test]
    fn test_enums_parse_wire_names() {
        assert_eq!("Month".parse::<BillingPeriod>().unwrap(), BillingPeriod::Month);
        assert_eq!("semimonth".parse::<BillingPeriod>().unwrap(), BillingPeriod::SemiMonth);
        assert_eq!("Cancel".parse::<ProfileAction>().unwrap(), ProfileAction::Cancel);
        assert_eq!(
            BillingType::RecurringPayments.to_string(),
            "RecurringPayments"
        );
        assert!("Fortnight".parse::<BillingPeriod>().is_err());
    }
}
