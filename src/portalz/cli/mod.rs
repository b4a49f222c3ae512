//! # CLI Behavior
//!
//! **One possible UI client** for portalz. This is the only place that knows
//! about terminal I/O, prompts, and exit codes.
//!
//! ## Pages
//!
//! - `portalz` / `portalz browse [PAGE]`: the catalog. `--add ID [-q N]` adds a
//!   card from the page that was just loaded.
//! - `portalz show <ID or ?id=N>`: one character and its first episodes.
//!   `--add` puts one in the cart.
//! - `portalz cart`, `set`, `inc`, `dec`, `remove`: the cart page.
//! - `portalz clear` and `portalz checkout` ask before emptying the cart.
//!   `--yes` skips the question; without a terminal on stdin they refuse.
//!
//! Every command ends with the cart badge (item count and total).
//!
//! ## Exit Codes
//!
//! `0` on success. `1` when an error was printed, including a page that failed
//! to load.
//!
//! ## Module Structure
//!
//! - `commands`: per-command handlers, runtime and logging setup
//! - `print`: output formatting (colors, column widths)
//! - `setup`: argument parsing via clap

mod commands;
mod print;
pub mod setup;

pub use commands::run;
