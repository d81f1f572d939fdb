//! # Referral Codes
//!
//! - Name stripped down to lowercase letters and digits
//! - First 5 characters, padded with random letters when the name is shorter
//! - Followed by 4 random digits in `1000..=9999`
//! - Up to 100 attempts to dodge an existing code, then fall back to a timestamp suffix
//!
//! Codes are assigned once at signup and never change.
use std::sync::LazyLock;

use chrono::Utc;
use rand_core::{OsRng, RngCore};
use regex::Regex;

const NAME_PART_LEN: usize = 5;
const MAX_ATTEMPTS: usize = 100;

static NOT_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("static regex"));

pub fn generate_referral_code(name: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let name_part = name_part(name);

    for _ in 0..MAX_ATTEMPTS {
        let code = format!("{name_part}{}", random_digits());

        if !is_taken(&code) {
            return code;
        }
    }

    // last 4 digits of the millisecond clock
    let millis = Utc::now().timestamp_millis().unsigned_abs() % 10_000;
    format!("{name_part}{millis:04}")
}

fn name_part(name: &str) -> String {
    let mut part: String = NOT_ALPHANUMERIC
        .replace_all(name, "")
        .to_lowercase()
        .chars()
        .take(NAME_PART_LEN)
        .collect();

    while part.chars().count() < NAME_PART_LEN {
        part.push(random_letter());
    }

    part
}

fn random_below(bound: u32) -> u32 {
    OsRng.next_u32() % bound
}

fn random_digits() -> u32 {
    1_000 + random_below(9_000)
}

fn random_letter() -> char {
    (b'a' + random_below(26) as u8) as char
}
