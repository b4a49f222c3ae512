//! # Portalz Architecture
//!
//! Portalz is a terminal storefront over the public Rick and Morty character
//! API. It pages through characters, prices each one, and keeps a shopping
//! cart that survives between runs. Like a web page, every CLI invocation
//! "loads" the store: the cart is rehydrated from disk, one action runs, and
//! every mutation is written straight back.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prompts, prints, picks exit codes      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns cart, source and page controllers                   │
//! │  - Returns structured CmdResult values                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands + Controllers (commands/, catalog.rs, detail.rs)  │
//! │  - Page state machines, add-to-cart, cart edits             │
//! └─────────────────────────────────────────────────────────────┘
//!                │                                │
//!                ▼                                ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Cart Store (cart.rs)         │ │  Character Source         │
//! │  over KeyValueStore (store/)  │ │  (source/, reqwest)       │
//! └───────────────────────────────┘ └───────────────────────────┘
//! ```
//!
//! From `api.rs` inward nothing writes to stdout or stderr; diagnostics go
//! through `tracing`.
//!
//! ## Testing Strategy
//!
//! - **Cart, price, controllers**: unit tests against `MemStorage` and
//!   `FixtureSource`, no network and no disk.
//! - **Commands** (`commands/*.rs`): message and result shape.
//! - **Storage and CLI** (`tests/`): real files in a temp dir, and the binary
//!   driven through `assert_cmd` with `PORTALZ_HOME` pointed at it.
//!
//! ## Module Overview
//!
//! - [`api`]: facade
//! - [`commands`]: command implementations and `CmdResult`
//! - [`catalog`], [`detail`]: the two page controllers
//! - [`cart`]: the cart store and its invariants
//! - [`price`]: the price oracle and currency formatting
//! - [`model`]: wire types and cart entries
//! - [`source`]: the character API seam
//! - [`store`]: durable key-value storage
//! - [`config`], [`init`]: settings and start-up wiring
//! - [`error`]: error types

pub mod api;
pub mod cart;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod detail;
pub mod error;
pub mod init;
pub mod model;
pub mod price;
pub mod source;
pub mod store;
