//! Command Line Interface for the impermanent loss calculator.
use anyhow::{Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use il_calc_calculator::prelude::*;
use il_calc_data::prelude::*;
use il_calc_domain::entities::{Token, TokenId};
use il_calc_domain::enums::RateMode;
use prettytable::{Table, format, row};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "il-calc")]
#[command(about = "Impermanent loss calculator for two-token liquidity pools", long_about = None)]
struct Cli {
    /// Serve prices from `--price` flags instead of CoinGecko
    #[arg(long, global = true)]
    offline: bool,

    /// Offline price as ID=USD, valid on every date (repeatable)
    #[arg(long = "price", value_name = "ID=USD", value_parser = parse_price_override, global = true)]
    prices: Vec<(String, Decimal)>,

    /// CoinGecko API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the token catalog
    Tokens {
        /// Number of tokens to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Look up the USD price of a token on a date
    Price {
        /// Token id (e.g., bitcoin)
        #[arg(short, long)]
        token: String,

        /// Date as YYYY-MM-DD
        #[arg(short, long)]
        date: NaiveDate,
    },
    /// Value a pool position at entry and at hypothesized future prices
    Calculate {
        /// Entry date as YYYY-MM-DD (default: today)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Projection date as YYYY-MM-DD (default: start date)
        #[arg(long)]
        future_date: Option<NaiveDate>,

        /// Token A id (e.g., ethereum)
        #[arg(long)]
        token_a: String,

        /// Token B id (e.g., usd-coin)
        #[arg(long)]
        token_b: Option<String>,

        /// Quantity of token A deposited
        #[arg(long)]
        qty_a: Option<Decimal>,

        /// Future USD price of token A
        #[arg(long)]
        future_price_a: Option<Decimal>,

        /// Future USD price of token B
        #[arg(long)]
        future_price_b: Option<Decimal>,

        /// Yield rate in percent
        #[arg(long, default_value_t = Decimal::ZERO)]
        rate: Decimal,

        /// APR or APY
        #[arg(long, default_value_t = RateMode::Apr)]
        rate_mode: RateMode,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let resolver = build_resolver(&cli);

    match cli.command {
        Commands::Tokens { limit } => {
            let catalog = TokenCatalog::load_or_empty(resolver.as_ref()).await;
            if catalog.is_empty() {
                println!("No tokens available from {}.", resolver.id());
                return Ok(());
            }

            let mut table = new_table();
            table.set_titles(row!["Id", "Token"]);
            for (id, label) in catalog.options().take(limit) {
                table.add_row(row![id, label]);
            }
            table.printstd();
            println!("Showing {} of {} tokens", limit.min(catalog.len()), catalog.len());
        }
        Commands::Price { token, date } => {
            let token = TokenId::from(token);
            let price = resolver.historical_price(&token, date).await?;
            println!("{token} on {date}: {}", format_price(price));
        }
        Commands::Calculate {
            start_date,
            future_date,
            token_a,
            token_b,
            qty_a,
            future_price_a,
            future_price_b,
            rate,
            rate_mode,
        } => {
            let start_date = start_date.unwrap_or_else(|| Utc::now().date_naive());
            let future_date = future_date.unwrap_or(start_date);
            let mut session =
                CalculationSession::with_dates(Arc::clone(&resolver), start_date, future_date);

            let events = [
                InputEvent::TokenA(Some(TokenId::from(token_a))),
                InputEvent::TokenB(token_b.map(TokenId::from)),
                InputEvent::QuantityA(qty_a),
                InputEvent::FuturePriceA(future_price_a),
                InputEvent::FuturePriceB(future_price_b),
                InputEvent::Rate(rate),
                InputEvent::RateMode(rate_mode),
            ];
            let mut entry_changed = false;
            for event in events {
                entry_changed |= session.apply(event) == Recompute::Entry;
            }

            let completion = if entry_changed {
                session.refresh_entry().await
            } else {
                session.recompute_projection()
            };
            if let Completion::Failed(e) = completion {
                bail!("calculation failed: {e}");
            }

            let snapshot = session.snapshot();
            info!(session = %snapshot.session_id, "Calculation finished");
            print_entry(&snapshot);
            print_projection(&snapshot);
            if let Some(e) = &snapshot.projection_error {
                bail!("projection failed: {e}");
            }
        }
    }

    Ok(())
}

/// Picks the offline table or the CoinGecko provider.
fn build_resolver(cli: &Cli) -> Arc<dyn PriceResolver> {
    if cli.offline {
        let provider = cli
            .prices
            .iter()
            .fold(StaticPriceProvider::new(), |provider, (id, usd)| {
                provider
                    .with_token(Token::new(id.as_str(), id.as_str(), id.as_str()))
                    .with_constant_price(id.as_str(), *usd)
            });
        return Arc::new(provider);
    }

    let mut config = CoinGeckoConfig::from_env();
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.as_str());
    }
    let provider = CoinGeckoProvider::new(config);
    info!(base_url = %provider.config().base_url, "Using CoinGecko price index");
    Arc::new(provider)
}

/// Parses an `ID=USD` offline price.
fn parse_price_override(raw: &str) -> Result<(String, Decimal), String> {
    let (id, usd) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=USD, got `{raw}`"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing token id in `{raw}`"));
    }
    let usd: Decimal = usd
        .trim()
        .parse()
        .map_err(|e| format!("invalid price in `{raw}`: {e}"))?;
    if usd < Decimal::ZERO {
        return Err(format!("price cannot be negative in `{raw}`"));
    }
    Ok((id.to_string(), usd))
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table
}

fn print_entry(snapshot: &SessionSnapshot) {
    let view = EntryDisplay::from(&snapshot.entry);
    let token_a = token_name(snapshot.entry_state.token_a.as_ref());
    let token_b = token_name(snapshot.entry_state.token_b.as_ref());

    println!("\nEntry ({})", view.start_date);
    let mut table = new_table();
    table.set_titles(row!["", "Price", "Quantity"]);
    table.add_row(row![token_a, view.price_a, view.qty_a]);
    table.add_row(row![token_b, view.price_b, view.qty_b]);
    table.add_row(row!["Total value", view.total_value, ""]);
    table.printstd();
}

fn print_projection(snapshot: &SessionSnapshot) {
    let view = ProjectionDisplay::from(&snapshot.projection);
    let token_a = token_name(snapshot.entry_state.token_a.as_ref());
    let token_b = token_name(snapshot.entry_state.token_b.as_ref());
    let mode = snapshot.projection_state.rate_mode;

    println!(
        "\nProjection ({}, {} days)",
        snapshot.projection_state.future_date, view.days
    );
    let mut table = new_table();
    table.set_titles(row!["", "Pool", "Held"]);
    table.add_row(row![
        format!("{token_a} quantity"),
        view.qty_a_future,
        format_quantity(snapshot.entry.qty_a)
    ]);
    table.add_row(row![
        format!("{token_b} quantity"),
        view.qty_b_future,
        format_quantity(snapshot.entry.qty_b)
    ]);
    table.add_row(row!["Value A", "", view.value_a_held]);
    table.add_row(row!["Value B", "", view.value_b_held]);
    table.add_row(row!["Value", view.value_before_interest, view.value_if_held]);
    table.add_row(row![
        "Impermanent loss",
        format!("{} ({})", view.il_dollar, view.il_percent),
        ""
    ]);
    table.add_row(row![
        format!("Interest ({mode})"),
        format!("{} ({})", view.interest_dollar, view.interest_percent),
        ""
    ]);
    table.add_row(row!["Value with interest", view.value_with_interest, ""]);
    table.add_row(row!["Difference vs holding", view.diff_vs_holding, ""]);
    table.printstd();
}

fn token_name(token: Option<&TokenId>) -> String {
    token.map_or_else(|| "-".to_string(), ToString::to_string)
}
