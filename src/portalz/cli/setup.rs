use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "portalz", bin_name = "portalz", version)]
#[command(
    about = "A Rick and Morty character storefront for the terminal",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Shop(ShopCommands),

    #[command(flatten)]
    Cart(CartCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

#[derive(Subcommand, Debug)]
pub enum ShopCommands {
    /// Browse a page of the catalog
    #[command(alias = "b", display_order = 1)]
    Browse {
        /// Page number
        #[arg(default_value_t = 1)]
        page: u32,

        /// Add this character from the page to the cart
        #[arg(long, value_name = "ID")]
        add: Option<u32>,

        /// Quantity to add with --add
        #[arg(long, short = 'q', default_value_t = 1, requires = "add")]
        qty: u32,
    },

    /// Show one character (takes an id or a query such as "?id=5")
    #[command(alias = "s", display_order = 2)]
    Show {
        /// Character id or navigation query
        #[arg(default_value = "")]
        query: String,

        /// Add one to the cart after loading
        #[arg(long)]
        add: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum CartCommands {
    /// List the cart
    #[command(alias = "c", display_order = 10)]
    Cart,

    /// Set a line's quantity (0 removes it)
    #[command(display_order = 11)]
    Set { id: u32, quantity: u32 },

    /// Add one more of a line
    #[command(display_order = 12)]
    Inc { id: u32 },

    /// One fewer of a line
    #[command(display_order = 13)]
    Dec { id: u32 },

    /// Remove one or more lines
    #[command(alias = "rm", display_order = 14)]
    Remove {
        /// Character ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u32>,
    },

    /// Empty the cart
    #[command(display_order = 15)]
    Clear {
        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Place the order and empty the cart
    #[command(display_order = 16)]
    Checkout {
        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Item count and total
    #[command(display_order = 17)]
    Summary,
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// Print the effective configuration
    #[command(display_order = 30)]
    Config,
}
