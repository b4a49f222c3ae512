//! # Price Oracle
//!
//! Every character gets a synthetic unit price derived from its attributes:
//!
//! ```text
//! price = 100 × status × species × (1 + 0.1 × episodes)
//!
//!   status:  Alive 1.5   Dead 0.8   unknown 1.0
//!   species: Human 1.2   anything else 1.0
//! ```
//!
//! The product is computed in tenths with integer arithmetic, so the result is
//! exact and the final rounding (half away from zero) never depends on float
//! representation. The same character always gets the same price.

use crate::model::{Character, Status};

const BASE_PRICE: u64 = 100;

/// Factors are kept in tenths: 15 means 1.5.
const TENTHS: u64 = 10;

fn status_factor(status: Status) -> u64 {
    match status {
        Status::Alive => 15,
        Status::Dead => 8,
        Status::Unknown => 10,
    }
}

fn species_factor(species: &str) -> u64 {
    if species.trim() == "Human" {
        12
    } else {
        10
    }
}

/// Unit price for a character, in whole currency units. Never zero.
pub fn unit_price(character: &Character) -> u64 {
    let episodes = character.episode_count() as u64;
    let numerator = BASE_PRICE
        * status_factor(character.status)
        * species_factor(&character.species)
        * (TENTHS + episodes);
    let denominator = TENTHS * TENTHS * TENTHS;
    // All terms are positive, so adding half the divisor rounds half away from zero.
    let rounded = (numerator + denominator / 2) / denominator;
    rounded.max(1)
}

/// en-US currency formatting, e.g. `$1,234.00`.
pub fn format_price(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${}.00", grouped)
}
