use crate::cart::{Added, Persistence, Summary};
use crate::catalog::Card;
use crate::config::PortalConfig;
use crate::detail::DetailView;
use crate::model::CartEntry;
use crate::price::format_price;

pub mod browse;
pub mod checkout;
pub mod clear;
pub mod list;
pub mod remove;
pub mod update;
pub mod view;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// The catalog page a browse produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageView {
    pub page: u32,
    pub max_page: u32,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub cards: Vec<Card>,
    pub page: Option<PageView>,
    pub detail: Option<DetailView>,
    pub cart_lines: Vec<CartEntry>,
    pub summary: Option<Summary>,
    pub config: Option<PortalConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_summary(mut self, summary: Summary) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn with_config(mut self, config: PortalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Turn a failed write-through into a warning line.
    pub(crate) fn note_persistence(&mut self, persistence: &Persistence) {
        if let Some(warning) = persistence.warning() {
            self.add_message(CmdMessage::warning(warning));
        }
    }

    pub(crate) fn note_added(&mut self, added: &Added) {
        if matches!(added.persistence, Persistence::Rejected(_)) {
            self.note_persistence(&added.persistence);
            return;
        }
        self.add_message(CmdMessage::success(format!(
            "Added {} x {} to cart ({})",
            added.quantity,
            added.name,
            format_price(added.subtotal)
        )));
        self.note_persistence(&added.persistence);
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}

pub(crate) fn not_in_cart(id: u32) -> CmdMessage {
    CmdMessage::info(format!("Character {} is not in the cart.", id))
}
