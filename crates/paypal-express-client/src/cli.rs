use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use paypal_express::{
    Billing, BillingPeriod, BillingType, Decimal, OneTimePayment, PaymentRequest, PaypalError,
    ProfileAction, RecurringPayment, RecurringProfile, SetupOptions,
};

/// PayPal Express Checkout from the command line.
///
/// Credentials come from PAYPAL_USERNAME, PAYPAL_PASSWORD, PAYPAL_SIGNATURE,
/// PAYPAL_RETURN_URL and PAYPAL_CANCEL_URL (a .env file is honored).
#[derive(Debug, Parser)]
#[command(name = "paypal-express", version)]
pub struct Cli {
    /// Use the sandbox environment (also enabled by PAYPAL_SANDBOX=1).
    #[arg(long, global = true)]
    pub sandbox: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// SetExpressCheckout: start a checkout and print the approval URL.
    Setup {
        #[command(flatten)]
        payment: PaymentArgs,
        /// Hide shipping address fields.
        #[arg(long)]
        no_shipping: bool,
        /// Complete the payment on PayPal ("Pay Now").
        #[arg(long)]
        pay_on_paypal: bool,
    },
    /// GetExpressCheckoutDetails.
    Details { token: String },
    /// DoExpressCheckoutPayment.
    Checkout {
        token: String,
        payer_id: String,
        #[command(flatten)]
        payment: PaymentArgs,
    },
    /// CreateRecurringPaymentsProfile.
    Subscribe {
        token: String,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// GetRecurringPaymentsProfileDetails.
    Subscription { profile_id: String },
    /// ManageRecurringPaymentsProfileStatus.
    Renew {
        profile_id: String,
        /// Cancel, Suspend or Reactivate.
        action: ProfileAction,
        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct PaymentArgs {
    #[arg(long)]
    pub amount: Option<Decimal>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub currency: Option<String>,
    /// Set up a billing agreement of this type instead of charging.
    #[arg(long)]
    pub billing_type: Option<BillingType>,
    #[arg(long)]
    pub billing_agreement_description: Option<String>,
}

impl PaymentArgs {
    pub fn to_request(&self) -> Result<PaymentRequest, PaypalError> {
        if self.billing_type.is_some() || self.billing_agreement_description.is_some() {
            let mut builder = RecurringPayment::builder();
            if let Some(billing_type) = self.billing_type {
                builder = builder.billing_type(billing_type);
            }
            if let Some(description) = &self.billing_agreement_description {
                builder = builder.billing_agreement_description(description);
            }
            if let Some(amount) = self.amount {
                builder = builder.amount(amount);
            }
            return Ok(builder.build()?.into());
        }

        let mut builder = OneTimePayment::builder();
        if let Some(amount) = self.amount {
            builder = builder.amount(amount);
        }
        if let Some(description) = &self.description {
            builder = builder.description(description);
        }
        if let Some(currency) = &self.currency {
            builder = builder.currency_code(currency);
        }
        Ok(builder.build()?.into())
    }
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// RFC 3339 start date, e.g. 2011-02-08T09:00:00Z.
    #[arg(long)]
    pub start_date: DateTime<Utc>,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub period: BillingPeriod,
    #[arg(long, default_value_t = 1)]
    pub frequency: u32,
    #[arg(long)]
    pub amount: Decimal,
    #[arg(long)]
    pub total_cycles: Option<u32>,
    #[arg(long)]
    pub max_failed_payments: Option<u32>,
}

impl ProfileArgs {
    pub fn to_profile(&self) -> Result<RecurringProfile, PaypalError> {
        let mut billing = Billing::builder()
            .period(self.period)
            .frequency(self.frequency)
            .amount(self.amount);
        if let Some(cycles) = self.total_cycles {
            billing = billing.total_cycles(cycles);
        }

        let mut profile = RecurringProfile::builder()
            .start_date(self.start_date)
            .description(&self.description)
            .billing(billing.build()?);
        if let Some(max) = self.max_failed_payments {
            profile = profile.max_failed_payments(max);
        }
        profile.build()
    }
}

impl Command {
    pub fn setup_options(&self) -> SetupOptions {
        match self {
            Command::Setup { no_shipping, .. } => SetupOptions {
                no_shipping: *no_shipping,
            },
            _ => SetupOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paypal_express::ToParams;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("paypal-express").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_setup_builds_one_time_payment() {
        let cli = parse(&[
            "setup",
            "--amount",
            "1000",
            "--description",
            "Instant Payment Request",
            "--no-shipping",
        ]);
        assert!(cli.command.setup_options().no_shipping);
        let Command::Setup { payment, .. } = cli.command else {
            panic!("expected setup");
        };
        let params = payment.to_request().unwrap().to_params(0);
        assert_eq!(params.get("PAYMENTREQUEST_0_AMT"), Some("1000.00"));
    }

    #[test]
    fn test_setup_with_billing_type_builds_recurring_payment() {
        let cli = parse(&[
            "setup",
            "--billing-type",
            "RecurringPayments",
            "--billing-agreement-description",
            "Monthly plan",
        ]);
        let Command::Setup { payment, .. } = cli.command else {
            panic!("expected setup");
        };
        assert!(matches!(
            payment.to_request().unwrap(),
            PaymentRequest::Recurring(_)
        ));
    }

    #[test]
    fn test_missing_description_is_reported() {
        let cli = parse(&["setup", "--amount", "5"]);
        let Command::Setup { payment, .. } = cli.command else {
            panic!("expected setup");
        };
        assert!(matches!(
            payment.to_request(),
            Err(PaypalError::MissingAttribute {
                attribute: "description",
                ..
            })
        ));
    }

    #[test]
    fn test_subscribe_builds_profile() {
        let cli = parse(&[
            "subscribe",
            "EC-TOKEN",
            "--start-date",
            "2011-02-08T09:00:00Z",
            "--description",
            "Recurring Profile",
            "--period",
            "Month",
            "--amount",
            "1000",
        ]);
        let Command::Subscribe { token, profile } = cli.command else {
            panic!("expected subscribe");
        };
        assert_eq!(token, "EC-TOKEN");
        let params = profile.to_profile().unwrap().to_params(0);
        assert_eq!(params.get("PROFILESTARTDATE"), Some("2011-02-08 09:00:00"));
        assert_eq!(params.get("BILLINGFREQUENCY"), Some("1"));
    }

    #[test]
    fn test_renew_rejects_unknown_action() {
        let result = Cli::try_parse_from(["paypal-express", "renew", "I-123", "Pause"]);
        assert!(result.is_err());

        let cli = parse(&["renew", "I-123", "Cancel"]);
        assert!(matches!(
            cli.command,
            Command::Renew {
                action: ProfileAction::Cancel,
                note: None,
                ..
            }
        ));
    }
}
