//! Artisan storefront CLI

use std::{
    io::{self, Write},
    process::ExitCode,
    str::FromStr,
};

use clap::{Parser, Subcommand};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use artisan::{
    access::{self, AdminAccess, AuthState, RoleProvider, StaticRoleProvider, User},
    cart::{CartEvent, CartStore},
    catalog::{Catalog, ProductFilter},
    config::{self, ConfigError, StorefrontConfig},
    fixtures::load_catalog,
    products::{Product, ProductId},
    storefront::Storefront,
};

const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "artisan", about = "Artisan storefront", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: StorefrontConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List products, newest first
    Products {
        /// Only products in this category
        #[arg(long)]
        category: Option<String>,

        /// Only products that are in stock
        #[arg(long)]
        in_stock: bool,
    },

    /// List the home page's featured products
    Featured,

    /// Show a single product
    Product {
        /// Product id
        id: String,
    },

    /// List product categories
    Categories,

    /// Apply cart operations in order and print the order summary
    Cart {
        /// Operations: `add:ID`, `remove:ID` or `set:ID=QTY`
        #[arg(required = true)]
        ops: Vec<CartOp>,
    },

    /// Show the navigation for an auth state
    Nav {
        /// Pretend a user is signed in
        #[arg(long)]
        signed_in: bool,

        /// Give the signed-in user the admin role
        #[arg(long, requires = "signed_in")]
        admin: bool,
    },
}

/// One cart operation from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CartOp {
    Add(ProductId),
    Remove(ProductId),
    Set(ProductId, i64),
}

impl FromStr for CartOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (verb, arg) = s
            .split_once(':')
            .ok_or_else(|| format!("expected VERB:ARGS, got {s:?}"))?;

        match verb {
            "add" => Ok(Self::Add(ProductId::new(arg))),
            "remove" => Ok(Self::Remove(ProductId::new(arg))),
            "set" => {
                let (id, quantity) = arg
                    .split_once('=')
                    .ok_or_else(|| format!("expected set:ID=QTY, got {s:?}"))?;

                let quantity = quantity
                    .trim()
                    .parse::<i64>()
                    .map_err(|error| format!("invalid quantity in {s:?}: {error}"))?;

                Ok(Self::Set(ProductId::new(id), quantity))
            }
            other => Err(format!("unknown cart operation {other:?}")),
        }
    }
}

fn main() -> ExitCode {
    let cli: Cli = match config::load() {
        Ok(cli) => cli,
        Err(ConfigError::Args(error)) => error.exit(),
        Err(other) => {
            let _written = writeln!(io::stderr(), "Configuration error: {other}");

            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(env_filter(&cli.config.log_level))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");

            ExitCode::FAILURE
        }
    }
}

/// Filter from the configured level, which already includes `RUST_LOG`.
fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

fn run(cli: Cli) -> Result<(), String> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Commands::Nav { signed_in, admin } = cli.command {
        return write_nav(&mut out, &nav_provider(signed_in, admin))
            .map_err(|error| io_error(&error));
    }

    let storefront = open_storefront(&cli.config)?;

    match cli.command {
        Commands::Products { category, in_stock } => {
            let mut filter = ProductFilter::all();
            filter.category = category;
            filter.in_stock = in_stock.then_some(true);

            let products = storefront.products(&filter).map_err(|error| error.to_string())?;

            write_products(&mut out, &products).map_err(|error| io_error(&error))
        }
        Commands::Featured => {
            let products = storefront.featured().map_err(|error| error.to_string())?;

            write_products(&mut out, &products).map_err(|error| io_error(&error))
        }
        Commands::Product { id } => {
            let product = storefront
                .product(&ProductId::new(id))
                .map_err(|error| error.to_string())?;

            write_product(&mut out, &product, &storefront).map_err(|error| io_error(&error))
        }
        Commands::Categories => {
            let categories = storefront.categories().map_err(|error| error.to_string())?;

            write_categories(&mut out, &categories).map_err(|error| io_error(&error))
        }
        Commands::Cart { ops } => run_cart(&mut out, &storefront, ops),
        Commands::Nav { .. } => Ok(()),
    }
}

fn open_storefront(config: &StorefrontConfig) -> Result<Storefront<Catalog>, String> {
    let catalog = load_catalog(&config.catalog).map_err(|error| {
        format!(
            "failed to load catalog {}: {error}",
            config.catalog.display()
        )
    })?;

    let currency = catalog.currency();

    let shipping = config
        .shipping_policy(currency)
        .map_err(|error| error.to_string())?;

    Ok(Storefront::new(catalog, CartStore::new(currency), shipping))
}

fn run_cart(
    out: &mut impl Write,
    storefront: &Storefront<Catalog>,
    ops: Vec<CartOp>,
) -> Result<(), String> {
    let cart = storefront.cart();

    cart.subscribe(|event: &CartEvent| {
        info!(
            revision = event.revision,
            badge = ?access::cart_badge(event.item_count()),
            "cart badge updated"
        );
    });

    for op in ops {
        match op {
            CartOp::Add(id) => {
                storefront
                    .add_to_cart(&id)
                    .map_err(|error| error.to_string())?;
            }
            CartOp::Remove(id) => {
                cart.remove_item(&id);
            }
            CartOp::Set(id, quantity) => {
                cart.update_quantity(&id, quantity);
            }
        }
    }

    let summary = storefront.summary().map_err(|error| error.to_string())?;

    summary
        .write_to(out, &cart.items())
        .map_err(|error| error.to_string())
}

fn write_products(out: &mut impl Write, products: &[Product]) -> io::Result<()> {
    if products.is_empty() {
        writeln!(out, "No products found in this category")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["ID", "Name", "Category", "Price", "Stock"]);

    for product in products {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.clone(),
            product.price.to_string(),
            stock_label(product).to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..4), Alignment::right());

    writeln!(out, "{table}")
}

fn write_product(
    out: &mut impl Write,
    product: &Product,
    storefront: &Storefront<Catalog>,
) -> io::Result<()> {
    writeln!(out, "{}", product.category)?;
    writeln!(out, "{}  {}", product.name, product.price)?;
    writeln!(out, "\n{}\n", product.description)?;

    if product.in_stock {
        writeln!(out, "In stock and ready to ship")?;
    } else {
        writeln!(out, "Out of stock")?;
    }

    writeln!(
        out,
        "Free standard shipping on orders over {}",
        storefront.shipping().free_over()
    )
}

fn write_categories(out: &mut impl Write, categories: &[String]) -> io::Result<()> {
    writeln!(out, "All")?;

    for category in categories {
        writeln!(out, "{category}")?;
    }

    Ok(())
}

fn stock_label(product: &Product) -> &'static str {
    if product.in_stock {
        "In stock"
    } else {
        "Out of stock"
    }
}

fn nav_provider(signed_in: bool, admin: bool) -> StaticRoleProvider {
    let state = if signed_in {
        AuthState::SignedIn {
            user: User {
                id: "local".to_string(),
                email: "local@artisan.test".to_string(),
            },
            is_admin: admin,
        }
    } else {
        AuthState::Anonymous
    };

    StaticRoleProvider::new(state)
}

fn write_nav(out: &mut impl Write, provider: &impl RoleProvider) -> io::Result<()> {
    let state = provider.auth_state();

    for link in access::navigation(&state) {
        writeln!(out, "{:<6} {}", link.name, link.path)?;
    }

    let admin = match access::admin_access(&state) {
        AdminAccess::Pending => "loading".to_string(),
        AdminAccess::Granted => "granted".to_string(),
        AdminAccess::Redirect(path) => format!("redirect to {path}"),
    };

    writeln!(out, "\nadmin page: {admin}")
}

fn io_error(error: &io::Error) -> String {
    format!("failed to write output: {error}")
}
