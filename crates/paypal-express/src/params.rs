//! Flattening of payment objects into NVP request fields.
//!
//! Express checkout fields carry a line index (`PAYMENTREQUEST_0_AMT`,
//! `L_BILLINGTYPE0`); recurring profile fields are bare (`AMT`, `DESC`).

use std::collections::btree_map::{self, BTreeMap};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::format::{format_amount, format_date};
use crate::payment::{
    OneTimePayment, PaymentRequest, RecurringPayment, RecurringProfile, TrialBilling,
};

/// Flat NVP field mapping. Keys are sorted, so ordering never matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.0.insert(key.into(), value.to_string());
        self
    }

    pub fn insert_amount(&mut self, key: impl Into<String>, amount: Decimal) -> &mut Self {
        self.0.insert(key.into(), format_amount(amount));
        self
    }

    pub fn extend(&mut self, other: Params) -> &mut Self {
        self.0.extend(other.0);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Anything that expands into NVP fields at a given line index.
///
/// The index only matters for express checkout line items; bare-keyed
/// objects ignore it.
pub trait ToParams {
    fn to_params(&self, index: usize) -> Params;
}

impl ToParams for OneTimePayment {
    fn to_params(&self, index: usize) -> Params {
        let mut params = Params::new();
        params
            .insert(format!("PAYMENTREQUEST_{index}_DESC"), self.description())
            .insert_amount(format!("PAYMENTREQUEST_{index}_AMT"), self.amount());
        if let Some(code) = self.currency_code() {
            params.insert(format!("PAYMENTREQUEST_{index}_CURRENCYCODE"), code);
        }
        params
    }
}

impl ToParams for RecurringPayment {
    fn to_params(&self, index: usize) -> Params {
        let mut params = Params::new();
        params
            .insert(format!("L_BILLINGTYPE{index}"), self.billing_type())
            .insert(
                format!("L_BILLINGAGREEMENTDESCRIPTION{index}"),
                self.billing_agreement_description(),
            )
            // no upfront charge when only the agreement is being set up
            .insert_amount(format!("PAYMENTREQUEST_{index}_AMT"), Decimal::ZERO);
        params
    }
}

impl ToParams for PaymentRequest {
    fn to_params(&self, index: usize) -> Params {
        match self {
            PaymentRequest::OneTime(payment) => payment.to_params(index),
            PaymentRequest::Recurring(payment) => payment.to_params(index),
        }
    }
}

impl ToParams for RecurringProfile {
    fn to_params(&self, _index: usize) -> Params {
        let billing = self.billing();
        let trial = self.trial();

        let mut params = Params::new();
        params
            .insert("PROFILESTARTDATE", format_date(self.start_date()))
            .insert("DESC", self.description())
            .insert("MAXFAILEDPAYMENTS", self.max_failed_payments().unwrap_or(0))
            .insert("BILLINGPERIOD", billing.period())
            .insert("BILLINGFREQUENCY", billing.frequency())
            .insert("TOTALBILLINGCYCLES", billing.total_cycles())
            .insert_amount("AMT", billing.amount())
            .insert_amount("TAXAMT", billing.tax_amount())
            .insert_amount("SHIPPINGAMT", billing.shipping_amount())
            .insert(
                "TRIALBILLINGFREQUENCY",
                trial.map(TrialBilling::frequency).unwrap_or(0),
            )
            .insert(
                "TRIALTOTALBILLINGCYCLES",
                trial.map(TrialBilling::total_cycles).unwrap_or(0),
            )
            .insert_amount(
                "TRIALAMT",
                trial.map(TrialBilling::amount).unwrap_or_default(),
            );

        if let Some(trial) = trial {
            params.insert("TRIALBILLINGPERIOD", trial.period());
        }
        if let Some(code) = self.currency_code() {
            params.insert("CURRENCYCODE", code);
        }
        params
    }
}

/// Options for `SetExpressCheckout`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupOptions {
    /// Hide shipping address fields on the approval page.
    pub no_shipping: bool,
}

impl SetupOptions {
    pub fn no_shipping() -> Self {
        Self { no_shipping: true }
    }
}

impl ToParams for SetupOptions {
    fn to_params(&self, _index: usize) -> Params {
        let mut params = Params::new();
        if self.no_shipping {
            params.insert("REQCONFIRMSHIPPING", 0).insert("NOSHIPPING", 1);
        }
        params
    }
}
