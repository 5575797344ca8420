use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use otc_settle::config::RuntimeConfig;
use otc_settle::engine::entry::now_secs;
use otc_settle::format::{
    format_amount, format_currency, format_fee_rate, format_party_id, parse_decimal,
    DEFAULT_PARTY_DISPLAY_LEN,
};
use otc_settle::{
    checked_scale, metrics, round_to, CreateOfferArgs, Holding, InstrumentId, OtcOffer,
    TradeAmounts,
};
use rust_decimal::Decimal;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Runtime config file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Print Prometheus metrics after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open an offer and price a trade against it
    Quote(QuoteArgs),
    /// Round a value up at the given scale
    Round {
        /// Number of decimal places
        #[arg(short, long)]
        scale: i64,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Validate the runtime config
    Config,
}

#[derive(clap::Args, Debug)]
struct QuoteArgs {
    /// Quantity of the locked asset to trade
    #[arg(short, long)]
    amount: String,

    /// Unit price in the payment asset
    #[arg(short, long)]
    price: String,

    /// Fee rate per side, defaults to the configured rate
    #[arg(short, long)]
    fee_rate: Option<String>,

    /// Payment token scale, defaults to the configured scale
    #[arg(short, long, conflicts_with = "instrument")]
    scale: Option<i64>,

    /// Payment instrument symbol from the instrument registry
    #[arg(short, long)]
    instrument: Option<String>,

    /// Locked instrument symbol from the instrument registry
    #[arg(long)]
    asset: Option<String>,

    /// Amount locked by the maker, defaults to the traded amount
    #[arg(long)]
    locked: Option<String>,

    /// Maker party
    #[arg(long, default_value = "maker")]
    maker: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Amount the maker locks when `--locked` is omitted: the traded amount, or one unit for a zero quote
fn default_locked_amount(amount: Decimal, locked: Option<Decimal>) -> Decimal {
    match locked {
        Some(locked) => locked,
        None if amount > Decimal::ZERO => amount,
        None => Decimal::ONE,
    }
}

fn open_offer(config: &RuntimeConfig, args: &QuoteArgs) -> anyhow::Result<OtcOffer> {
    let operator = &config.parties.operator;

    let (requested_instrument, payment_token_scale) = match &args.instrument {
        Some(symbol) => {
            let instrument = config.instrument(symbol)?;
            (instrument.instrument_id(), instrument.scale)
        }
        None => {
            let scale = args
                .scale
                .unwrap_or(config.settings.default_payment_token_scale as i64);
            (
                InstrumentId::new(operator.clone(), "payment"),
                checked_scale(scale)?,
            )
        }
    };
    let locked_instrument = match &args.asset {
        Some(symbol) => config.instrument(symbol)?.instrument_id(),
        None => InstrumentId::new(operator.clone(), "asset"),
    };

    let mut service = config.market_service()?;
    if let Some(fee_rate) = &args.fee_rate {
        let fee_rate = parse_decimal(fee_rate).context("--fee-rate")?;
        service.update_settings(
            fee_rate,
            service.validator.clone(),
            service.cleaner.clone(),
            service.public_party.clone(),
        )?;
    }

    let locked = match &args.locked {
        Some(locked) => Some(parse_decimal(locked).context("--locked")?),
        None => None,
    };
    let amount = parse_decimal(&args.amount).context("--amount")?;
    let locked_amount = default_locked_amount(amount, locked);
    let now = now_secs();
    let offer = service.open_offer(
        CreateOfferArgs {
            user: args.maker.clone(),
            locked_asset: Holding::new(locked_instrument.clone(), args.maker.clone(), locked_amount),
            locked_instrument,
            requested_instrument,
            unit_price: parse_decimal(&args.price).context("--price")?,
            payment_token_scale,
            description: String::new(),
            valid_until: config.settings.valid_until(now),
        },
        now,
    )?;
    Ok(offer)
}

fn print_table(offer: &OtcOffer, amount: &str, amounts: &TradeAmounts) {
    let locked = offer.locked_instrument.symbol();
    let payment = offer.requested_instrument.symbol();
    let now = now_secs();

    println!(
        "Maker:        {}",
        format_party_id(&offer.creator, DEFAULT_PARTY_DISPLAY_LEN)
    );
    println!("Expires in:   {}", offer.time_remaining(now));
    println!("You receive:  {} {}", amount, locked);
    println!(
        "Base cost:    {}",
        format_currency(amounts.base_cost, payment, 4)
    );
    println!(
        "Fee ({}): {}",
        format_fee_rate(offer.fee_rate),
        format_currency(amounts.taker_fee(), payment, 4)
    );
    println!(
        "Maker gets:   {}",
        format_currency(amounts.maker_receive_amount, payment, 4)
    );
    println!(
        "Total fee:    {}",
        format_currency(amounts.total_fee_amount, payment, 4)
    );
    println!(
        "You pay:      {}",
        format_currency(amounts.taker_total_cost, payment, 4)
    );
}

fn quote(config: &RuntimeConfig, args: QuoteArgs) -> anyhow::Result<()> {
    let offer = open_offer(config, &args)?;
    let amount = parse_decimal(&args.amount).context("--amount")?;
    let amounts = offer.quote(amount)?;

    match args.format {
        OutputFormat::Json => {
            let out = serde_json::json!({ "offer": offer, "amounts": amounts });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Table => print_table(&offer, &format_amount(amount, 4), &amounts),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::try_init().unwrap_or_default();
    let cli = Cli::parse();
    metrics::init_registry();

    let config = RuntimeConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config))?;

    match cli.command {
        Command::Quote(args) => quote(&config, args)?,
        Command::Round { scale, value } => {
            let value = parse_decimal(&value)?;
            println!("{}", round_to(checked_scale(scale)?, value)?);
        }
        Command::Config => {
            let report = config.validate();
            println!("ledger url: {}", config.ledger_url());
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.valid {
                log::warn!("config has {} problem(s)", report.errors.len());
            }
        }
    }

    if cli.metrics {
        print!("{}", metrics::gather_text()?);
    }
    Ok(())
}
