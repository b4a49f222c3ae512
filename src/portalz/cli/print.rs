use chrono::{DateTime, Utc};
use colored::Colorize;
use portalz::api::{CmdMessage, MessageLevel, PageView};
use portalz::cart::Summary;
use portalz::catalog::Card;
use portalz::config::PortalConfig;
use portalz::detail::DetailView;
use portalz::model::{species_emoji, CartEntry};
use portalz::price::format_price;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const NAME_WIDTH: usize = 32;
const SPECIES_WIDTH: usize = 22;
const PRICE_WIDTH: usize = 12;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => eprintln!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_cards(cards: &[Card], page: Option<PageView>) {
    if let Some(page) = page {
        println!(
            "{}",
            format!("Page {} of {}", page.page, page.max_page).bold()
        );
        println!();
    }
    if cards.is_empty() {
        println!("No characters on this page.");
        return;
    }

    for card in cards {
        let c = &card.character;
        let name = pad_to_width(&truncate_to_width(c.display_name(), NAME_WIDTH), NAME_WIDTH);
        let species = format!("{} {}", species_emoji(&c.species), c.display_species());
        let species = pad_to_width(&truncate_to_width(&species, SPECIES_WIDTH), SPECIES_WIDTH);
        println!(
            "{:>5}  {} {}  {}  {:>width$}",
            c.id.to_string().yellow(),
            c.status.emoji(),
            name,
            species,
            format_price(card.price).green(),
            width = PRICE_WIDTH
        );
    }

    if let Some(page) = page {
        println!();
        let mut hints = Vec::new();
        if page.page > 1 {
            hints.push(format!("prev: portalz browse {}", page.page - 1));
        }
        if page.page < page.max_page {
            hints.push(format!("next: portalz browse {}", page.page + 1));
        }
        if !hints.is_empty() {
            println!("{}", hints.join("  |  ").dimmed());
        }
    }
}

pub(super) fn print_detail(view: &DetailView) {
    let c = &view.character;
    println!("{} {}", c.status.emoji(), c.display_name().bold());
    println!("--------------------------------");
    println!("{:<10}{}", "Status", c.status);
    println!(
        "{:<10}{} {}",
        "Species",
        species_emoji(&c.species),
        c.display_species()
    );
    if let Some(kind) = c.display_kind() {
        println!("{:<10}{}", "Type", kind);
    }
    println!("{:<10}{}", "Gender", c.display_gender());
    println!("{:<10}{}", "Origin", c.display_origin());
    println!("{:<10}{}", "Location", c.display_location());
    if let Some(created) = c.created {
        println!("{:<10}{}", "Created", format_time_ago(created));
    }
    println!("{:<10}{}", "Price", format_price(view.unit_price).green());

    println!();
    println!(
        "{}",
        format!("Episodes ({})", c.episode_count()).bold()
    );
    if view.episodes.is_empty() {
        println!("  {}", "No episodes.".dimmed());
    }
    for episode in &view.episodes {
        println!(
            "  {}  {}",
            episode.display_code().yellow(),
            episode.display_name()
        );
    }
    if view.more_episodes > 0 {
        println!(
            "  {}",
            format!("...and {} more", view.more_episodes).dimmed()
        );
    }
}

pub(super) fn print_cart(lines: &[CartEntry]) {
    for entry in lines {
        let name = pad_to_width(
            &truncate_to_width(&entry.snapshot.name, NAME_WIDTH),
            NAME_WIDTH,
        );
        println!(
            "{:>5}  {}  {:>4} x {:>width$}  {:>width$}",
            entry.snapshot.id.to_string().yellow(),
            name,
            entry.quantity,
            format_price(entry.unit_price()),
            format_price(entry.line_total).green(),
            width = PRICE_WIDTH
        );
    }
}

pub(super) fn print_summary(summary: &Summary) {
    println!(
        "{} item{}, total {}",
        summary.total_items,
        if summary.total_items == 1 { "" } else { "s" },
        format_price(summary.total_price).green().bold()
    );
}

pub(super) fn print_config(config: &PortalConfig) {
    for (key, value) in config.entries() {
        println!("{} = {}", key, value);
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    Formatter::new().convert(duration.to_std().unwrap_or_default())
}
