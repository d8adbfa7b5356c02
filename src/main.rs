//! `relay` command-line client.
//!
//! ```text
//! relay [--config FILE] [--base-url URL] <command>
//!
//!   timestamp                      print the relay's clock
//!   address                        print the configured key's address
//!   balance [ADDRESS]              confirmed/unconfirmed balance
//!   pay --to ADDR --value-wei N    quote a payment; sign and send with --yes
//!   register [ADDRESS...]          subscribe addresses to notifications
//!   deregister [ADDRESS...]        unsubscribe addresses
//!   register-push --registration-id ID
//! ```
//!
//! The signing key is read from the environment variable named in
//! `wallet.private_key_env` and is optional for read-only commands.

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use relay_client::blockchain::{address_hex, parse_address, KeySigner, Wallet};
use relay_client::config::load_or_default;
use relay_client::numeric::{ether_string, Amount, ExchangeRate, FixedExchangeRate};
use relay_client::observability::init_logging;
use relay_client::payments::{PaymentOrchestrator, PaymentParameters};
use relay_client::RelayClient;

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Client for the transaction relay service", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `api.base_url`
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the relay's current timestamp
    Timestamp,
    /// Print the signing key's address
    Address,
    /// Show the balance of an address (defaults to the signing key's)
    Balance { address: Option<String> },
    /// Quote a payment, then sign and broadcast it when confirmed
    Pay {
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Amount in wei (decimal)
        #[arg(long)]
        value_wei: String,
        /// Hex call data for contract payments
        #[arg(long)]
        data: Option<String>,
        /// Sign and submit without further confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Subscribe addresses to transaction notifications
    Register { addresses: Vec<String> },
    /// Unsubscribe addresses from transaction notifications
    Deregister { addresses: Vec<String> },
    /// Register a push notification token
    RegisterPush {
        #[arg(long)]
        registration_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    init_logging(&config.observability);

    let key: Option<Arc<dyn KeySigner>> = match Wallet::from_env(&config.wallet.private_key_env) {
        Ok(wallet) => Some(Arc::new(wallet)),
        Err(e) => {
            tracing::debug!(error = %e, "No signing key loaded");
            None
        }
    };

    let client = RelayClient::new(&config, key)?;

    match cli.command {
        Commands::Timestamp => {
            println!("{}", client.current_server_timestamp().await?);
        }
        Commands::Address => {
            println!("{}", address_hex(&client.address()?));
        }
        Commands::Balance { address } => {
            let address = match address {
                Some(a) => parse_address(&a)?,
                None => client.address()?,
            };
            let balance = client.get_balance(&address).await?;
            println!("confirmed:   {} ({})", balance.confirmed, ether_string(balance.confirmed));
            if let Some(unconfirmed) = balance.unconfirmed {
                println!("unconfirmed: {} ({})", unconfirmed, ether_string(unconfirmed));
            }
        }
        Commands::Pay {
            to,
            value_wei,
            data,
            yes,
        } => {
            let value: Amount = value_wei.parse()?;
            let mut parameters = PaymentParameters::new(parse_address(&to)?, value);
            if let Some(data) = data {
                parameters = parameters.with_data(data);
            }

            let rate = ExchangeRate::parse(
                config.payments.currency.clone(),
                &config.payments.exchange_rate,
            )?;
            let mut payment =
                PaymentOrchestrator::new(client, Arc::new(FixedExchangeRate(rate)), parameters);

            payment.fetch_skeleton().await?;
            let quote = payment.compute_quote().await?;
            let fiat = |figure: &Option<String>| figure.clone().unwrap_or_else(|| "n/a".to_string());
            println!("value:   {}", fiat(&quote.fiat_value));
            println!("fee:     {} ({} wei)", fiat(&quote.fiat_fee), quote.fee);
            println!("total:   {} / {}", fiat(&quote.fiat_total), quote.ether_total);
            println!("balance: {} ({})", fiat(&quote.fiat_balance), ether_string(quote.balance.confirmed));

            if !quote.sufficient_balance {
                eprintln!("Insufficient balance for value plus fee");
                std::process::exit(1);
            }
            if !yes {
                println!("Re-run with --yes to sign and submit.");
                return Ok(());
            }

            payment.sign()?;
            match payment.submit().await {
                Ok(receipt) => match &receipt.tx_hash {
                    Some(hash) => println!("submitted: {}", hash),
                    None => println!("submitted: {}", receipt.raw),
                },
                Err(e) if e.is_ambiguous() => {
                    eprintln!("Broadcast outcome unknown: {}", e);
                    eprintln!("Check the transaction status before paying again.");
                    std::process::exit(2);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Register { addresses } => {
            let addresses = resolve_addresses(&client, &addresses)?;
            client.register_for_notifications(&addresses).await?;
            println!("registered {} address(es)", addresses.len());
        }
        Commands::Deregister { addresses } => {
            let addresses = resolve_addresses(&client, &addresses)?;
            client.deregister_for_notifications(&addresses).await?;
            println!("deregistered {} address(es)", addresses.len());
        }
        Commands::RegisterPush { registration_id } => {
            client.register_for_push_notifications(&registration_id).await?;
            println!("registered for push notifications");
        }
    }

    Ok(())
}

/// Parse the given addresses, or fall back to the signing key's address.
fn resolve_addresses(
    client: &RelayClient,
    addresses: &[String],
) -> Result<Vec<Address>, Box<dyn std::error::Error>> {
    if addresses.is_empty() {
        return Ok(vec![client.address()?]);
    }
    addresses
        .iter()
        .map(|a| parse_address(a).map_err(Into::into))
        .collect()
}
