//! Amount formatting for bills: Indian digit grouping and English words.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Returned by [`amount_to_words`] at and above one crore.
pub const AMOUNT_TOO_LARGE: &str = "Amount too large";

/// Smallest amount [`amount_to_words`] refuses to spell out.
pub const WORDS_CEILING: u64 = 10_000_000;

const ONES: [&str; 10] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];

const TEENS: [&str; 10] = [
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Groups `amount` the Indian way (`1234567` -> `12,34,567`). No symbol is
/// added and no decimals are padded; a non-zero fraction is kept, rounded to
/// paise.
pub fn format_currency_text(amount: Decimal) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    with_sign(amount, &group_decimal_text(&rounded.to_string()))
}

/// Like [`format_currency_text`] but always shows two fraction digits
/// (`1000` -> `1,000.00`).
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    with_sign(amount, &group_decimal_text(&format!("{:.2}", rounded)))
}

/// The rounding rule applied before spelling an amount: half away from zero
/// to whole units. Negative amounts clamp to zero.
pub fn whole_rupees(amount: Decimal) -> u64 {
    if amount <= Decimal::ZERO {
        return 0;
    }
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(u64::MAX)
}

/// Spells `amount` in English using Hundred, Thousand and Lakh.
///
/// Values of one crore and above yield [`AMOUNT_TOO_LARGE`].
pub fn amount_to_words(amount: u64) -> String {
    if amount >= WORDS_CEILING {
        return AMOUNT_TOO_LARGE.to_string();
    }
    if amount == 0 {
        return "Zero".to_string();
    }
    spell(amount)
}

fn spell(num: u64) -> String {
    match num {
        0..=9 => ONES[num as usize].to_string(),
        10..=19 => TEENS[(num - 10) as usize].to_string(),
        20..=99 => {
            let unit = num % 10;
            if unit == 0 {
                TENS[(num / 10) as usize].to_string()
            } else {
                format!("{} {}", TENS[(num / 10) as usize], ONES[unit as usize])
            }
        }
        100..=999 => scaled(ONES[(num / 100) as usize].to_string(), "Hundred", num % 100),
        1_000..=99_999 => scaled(spell(num / 1_000), "Thousand", num % 1_000),
        _ => scaled(spell(num / 100_000), "Lakh", num % 100_000),
    }
}

fn scaled(head: String, scale: &str, remainder: u64) -> String {
    if remainder == 0 {
        format!("{} {}", head, scale)
    } else {
        format!("{} {} {}", head, scale, spell(remainder))
    }
}

fn with_sign(amount: Decimal, text: &str) -> String {
    let shows_value = text.chars().any(|c| c.is_ascii_digit() && c != '0');
    if amount.is_sign_negative() && shows_value {
        format!("-{}", text)
    } else {
        text.to_string()
    }
}

/// `"1234567.5"` -> `"12,34,567.5"`.
fn group_decimal_text(text: &str) -> String {
    match text.split_once('.') {
        Some((int_part, frac)) => format!("{}.{}", group_indian(int_part), frac),
        None => group_indian(text),
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, last_three) = digits.split_at(digits.len() - 3);

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), last_three)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    #[test]
    fn groups_small_numbers_untouched() {
        assert_eq!(group_indian("7"), "7");
        assert_eq!(group_indian("999"), "999");
    }

    #[test]
    fn groups_in_twos_after_the_first_three() {
        assert_eq!(group_indian("1000"), "1,000");
        assert_eq!(group_indian("100000"), "1,00,000");
        assert_eq!(group_indian("1234567"), "12,34,567");
        assert_eq!(group_indian("123456789"), "12,34,56,789");
    }

    #[test]
    fn currency_text_keeps_a_real_fraction_only() {
        assert_eq!(format_currency_text(dec("1000.00")), "1,000");
        assert_eq!(format_currency_text(dec("1000.50")), "1,000.5");
        assert_eq!(format_currency_text(dec("0")), "0");
    }

    #[test]
    fn negative_amounts_keep_their_sign() {
        assert_eq!(format_money(dec("-1500")), "-1,500.00");
        assert_eq!(format_currency_text(dec("-0.001")), "0");
    }

    #[test]
    fn tens_without_units() {
        assert_eq!(amount_to_words(40), "Forty");
        assert_eq!(amount_to_words(99), "Ninety Nine");
    }

    #[test]
    fn mixed_scales() {
        assert_eq!(
            amount_to_words(1_234_567),
            "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven"
        );
        assert_eq!(
            amount_to_words(9_999_999),
            "Ninety Nine Lakh Ninety Nine Thousand Nine Hundred Ninety Nine"
        );
    }
}
