//! Roastery CLI

use std::{io, process};

use clap::{Args, Parser, Subcommand};
use roastery::{
    cart::{AddOutcome, CartLineUuid, QuantityUpdate},
    fixtures::ProfilePresets,
    orders::{PaymentMethod, ShippingAddress},
    receipt::{write_cart, write_order},
};
use roastery_app::{
    config::AppConfig,
    context::AppContext,
    domain::checkout::CheckoutRequest,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "roastery", about = "Roastery cart and checkout", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the house taste profiles
    Presets,

    /// Inspect or change the cart
    Cart(CartCommand),

    /// Place an order for the cart
    Checkout(CheckoutArgs),
}

#[derive(Debug, Args)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Print the cart
    Show,

    /// Add a preset taste profile
    Add {
        /// Preset key, see `roastery presets`
        preset: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Remove a line
    Remove { line: CartLineUuid },

    /// Set a line's quantity; zero or less removes it
    Update {
        line: CartLineUuid,

        #[arg(allow_negative_numbers = true)]
        quantity: i32,
    },

    /// Empty the cart
    Clear,

    /// Accept the terms of sale
    AcceptTerms {
        /// Withdraw acceptance instead
        #[arg(long)]
        revoke: bool,
    },
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    /// Payment method (cod, razorpay, online)
    #[arg(long, default_value = "cod")]
    payment: PaymentMethod,

    /// Recipient; defaults to the signed-in user's name
    #[arg(long, default_value = "")]
    name: String,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    line1: String,

    #[arg(long)]
    line2: Option<String>,

    #[arg(long)]
    city: String,

    #[arg(long)]
    state: String,

    #[arg(long)]
    postal_code: String,

    #[arg(long, default_value = "IN")]
    country: String,
}

impl From<CheckoutArgs> for CheckoutRequest {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            payment_method: args.payment,
            shipping_address: ShippingAddress {
                name: args.name,
                phone: args.phone,
                line1: args.line1,
                line2: args.line2,
                city: args.city,
                state: args.state,
                postal_code: args.postal_code,
                country: args.country,
            },
        }
    }
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cli.config.log_level)),
        )
        .init();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Presets => list_presets(&cli.config),
        Commands::Cart(CartCommand { command }) => cart(&cli.config, command).await,
        Commands::Checkout(args) => checkout(&cli.config, args).await,
    }
}

fn load_presets(config: &AppConfig) -> Result<ProfilePresets, String> {
    ProfilePresets::from_path(&config.profiles_path).map_err(|error| {
        format!(
            "failed to load presets from {}: {error}",
            config.profiles_path.display()
        )
    })
}

fn list_presets(config: &AppConfig) -> Result<(), String> {
    let presets = load_presets(config)?;

    for key in presets.keys() {
        let profile = presets.get(key).map_err(|error| error.to_string())?;

        println!("{key:<16} {:<20} {}", profile.name(), profile.blend());
    }

    Ok(())
}

async fn context(config: &AppConfig) -> Result<AppContext, String> {
    AppContext::from_config(config)
        .await
        .map_err(|error| format!("failed to initialize app context: {error}"))
}

async fn cart(config: &AppConfig, command: CartSubcommand) -> Result<(), String> {
    let app = context(config).await?;
    let carts = &app.carts;

    match command {
        CartSubcommand::Show => {}
        CartSubcommand::Add { preset, quantity } => {
            let profile = load_presets(config)?
                .get(&preset)
                .map_err(|error| error.to_string())?;

            let outcome = carts
                .add_item(profile, quantity)
                .await
                .map_err(|error| format!("failed to add to cart: {error}"))?;

            match outcome {
                AddOutcome::Inserted(line) => println!("added line {line}"),
                AddOutcome::Merged(line) => println!("merged into line {line}"),
                AddOutcome::Ignored => println!("nothing to add"),
            }
        }
        CartSubcommand::Remove { line } => {
            carts
                .remove_item(line)
                .await
                .map_err(|error| format!("failed to remove line: {error}"))?;
        }
        CartSubcommand::Update { line, quantity } => {
            let update = carts
                .update_quantity(line, quantity)
                .await
                .map_err(|error| format!("failed to update line: {error}"))?;

            if update == QuantityUpdate::Missing {
                println!("no line {line} in the cart");
            }
        }
        CartSubcommand::Clear => {
            carts
                .clear_cart()
                .await
                .map_err(|error| format!("failed to clear cart: {error}"))?;
        }
        CartSubcommand::AcceptTerms { revoke } => {
            carts
                .set_terms_accepted(!revoke)
                .await
                .map_err(|error| format!("failed to record terms: {error}"))?;
        }
    }

    write_cart(io::stdout().lock(), &carts.get_cart().await).map_err(|error| error.to_string())
}

async fn checkout(config: &AppConfig, args: CheckoutArgs) -> Result<(), String> {
    let app = context(config).await?;

    if !app.carts.get_cart().await.terms_accepted() {
        return Err("accept the terms of sale first: roastery cart accept-terms".to_string());
    }

    let order = app
        .checkout
        .checkout(args.into())
        .await
        .map_err(|error| {
            let hint = if error.is_retryable() {
                " (try again)"
            } else {
                ""
            };

            format!("checkout failed: {error}{hint}")
        })?;

    write_order(io::stdout().lock(), &order).map_err(|error| error.to_string())
}
