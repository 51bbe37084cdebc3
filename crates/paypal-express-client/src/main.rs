mod cli;

use clap::Parser;
use paypal_express::{ApiConfig, Credentials, ExpressClient, PaypalError, Response};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};

async fn run(cli: Cli) -> Result<Response, PaypalError> {
    let credentials = Credentials::from_env()?;
    let mut config = ApiConfig::from_env()?;
    if cli.sandbox {
        config = ApiConfig {
            version: config.version,
            ..ApiConfig::sandbox()
        };
    }
    tracing::info!(endpoint = %config.endpoint, user = credentials.username(), "using PayPal NVP API");

    let client = ExpressClient::new(credentials)?.with_config(config);
    let options = cli.command.setup_options();

    match cli.command {
        Command::Setup {
            payment,
            pay_on_paypal,
            ..
        } => {
            let response = client.setup(&payment.to_request()?, options).await?;
            if let Some(token) = response.token().filter(|_| response.is_success()) {
                println!("Approve at: {}\n", client.redirect_uri(token, pay_on_paypal));
            }
            Ok(response)
        }
        Command::Details { token } => client.details(&token).await,
        Command::Checkout {
            token,
            payer_id,
            payment,
        } => {
            client
                .checkout(&token, &payer_id, &payment.to_request()?)
                .await
        }
        Command::Subscribe { token, profile } => {
            client.subscribe(&token, &profile.to_profile()?).await
        }
        Command::Subscription { profile_id } => client.subscription(&profile_id).await,
        Command::Renew {
            profile_id,
            action,
            note,
        } => client.renew(&profile_id, action, note.as_deref()).await,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(response) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&response).unwrap_or_default()
            );
            if response.is_failure() {
                for error in response.errors() {
                    eprintln!(
                        "{}: {}",
                        error.code,
                        error
                            .long_message
                            .or(error.short_message)
                            .unwrap_or_default()
                    );
                }
                std::process::exit(2);
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
