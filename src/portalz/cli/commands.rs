use super::print::{
    print_cards, print_cart, print_config, print_detail, print_messages, print_summary,
};
use super::setup::{CartCommands, Cli, Commands, MiscCommands, ShopCommands};
use clap::Parser;
use portalz::api::{CardAdd, CmdResult, PortalApi};
use portalz::error::{PortalError, Result};
use portalz::init::initialize;
use portalz::source::http::HttpSource;
use portalz::store::fs::FileStorage;
use std::io::{self, IsTerminal, Write};
use tracing::debug;
use tracing_subscriber::EnvFilter;

struct AppContext {
    api: PortalApi<FileStorage, HttpSource>,
    runtime: tokio::runtime::Runtime,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut ctx = init_context()?;
    if let Some(notice) = ctx.api.take_load_notice() {
        print_messages(&[notice]);
    }

    match cli.command {
        Some(Commands::Shop(cmd)) => match cmd {
            ShopCommands::Browse { page, add, qty } => {
                let add = add.map(|id| CardAdd { id, quantity: qty });
                handle_browse(&mut ctx, page, add)
            }
            ShopCommands::Show { query, add } => handle_show(&mut ctx, &query, add),
        },
        Some(Commands::Cart(cmd)) => match cmd {
            CartCommands::Cart => handle_cart(&ctx),
            CartCommands::Set { id, quantity } => {
                let result = ctx.api.set_quantity(id, quantity)?;
                print_cart_result(&result)
            }
            CartCommands::Inc { id } => {
                let result = ctx.api.increment(id)?;
                print_cart_result(&result)
            }
            CartCommands::Dec { id } => {
                let result = ctx.api.decrement(id)?;
                print_cart_result(&result)
            }
            CartCommands::Remove { ids } => {
                let result = ctx.api.remove(&ids)?;
                print_cart_result(&result)
            }
            CartCommands::Clear { yes } => handle_clear(&mut ctx, yes),
            CartCommands::Checkout { yes } => handle_checkout(&mut ctx, yes),
            CartCommands::Summary => handle_summary(&ctx),
        },
        Some(Commands::Misc(MiscCommands::Config)) => handle_config(&ctx),
        None => handle_browse(&mut ctx, 1, None),
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "portalz=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn init_context() -> Result<AppContext> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let ctx = initialize()?;
    debug!(data_dir = %ctx.data_dir.display(), "context ready");
    Ok(AppContext {
        api: ctx.api,
        runtime,
    })
}

fn handle_browse(ctx: &mut AppContext, page: u32, add: Option<CardAdd>) -> Result<()> {
    let result = ctx.runtime.block_on(ctx.api.browse(page, add))?;
    print_cards(&result.cards, result.page);
    print_messages(&result.messages);
    print_badge(&result);
    exit_status(&result)
}

fn handle_show(ctx: &mut AppContext, query: &str, add: bool) -> Result<()> {
    let result = ctx.runtime.block_on(ctx.api.show(query, add))?;
    if let Some(view) = &result.detail {
        print_detail(view);
        println!();
    }
    print_messages(&result.messages);
    print_badge(&result);
    exit_status(&result)
}

fn handle_cart(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.cart()?;
    print_cart_result(&result)
}

fn handle_clear(ctx: &mut AppContext, yes: bool) -> Result<()> {
    let confirmed = yes || ctx.api.is_cart_empty() || confirm("Empty the cart?")?;
    let result = ctx.api.clear(confirmed)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_checkout(ctx: &mut AppContext, yes: bool) -> Result<()> {
    if !yes && !ctx.api.is_cart_empty() {
        let preview = ctx.api.cart()?;
        print_cart(&preview.cart_lines);
        print_badge(&preview);
    }
    let confirmed = yes || ctx.api.is_cart_empty() || confirm("Place this order?")?;
    let result = ctx.api.checkout(confirmed)?;
    if yes {
        print_cart(&result.cart_lines);
    }
    print_messages(&result.messages);
    exit_status(&result)
}

fn handle_summary(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.summary()?;
    print_badge(&result);
    Ok(())
}

fn handle_config(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.config()?;
    if let Some(config) = &result.config {
        print_config(config);
    }
    print_messages(&result.messages);
    Ok(())
}

fn print_cart_result(result: &CmdResult) -> Result<()> {
    print_cart(&result.cart_lines);
    print_messages(&result.messages);
    print_badge(result);
    Ok(())
}

fn print_badge(result: &CmdResult) {
    if let Some(summary) = &result.summary {
        print_summary(summary);
    }
}

/// Failed page loads were already printed; the exit code still reports them.
fn exit_status(result: &CmdResult) -> Result<()> {
    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

/// Ask on stdin. Anything but `y`/`yes` is a no, and so is a closed stdin.
fn confirm(question: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Err(PortalError::Api(
            "Refusing to continue without confirmation; pass --yes".to_string(),
        ));
    }
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
