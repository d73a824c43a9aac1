//! The ordered list of billable rows behind one bill.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::money::WORDS_CEILING;

/// One billable row. `amount` is derived from quantity and rate and cannot be
/// set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    /// `None` until the user types something into the rate field.
    pub rate: Option<Decimal>,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: String::new(),
            quantity: 1,
            rate: None,
        }
    }
}

impl LineItem {
    /// Saturates at `Decimal::MAX` instead of overflowing.
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.quantity)
            .checked_mul(self.rate.unwrap_or(Decimal::ZERO))
            .unwrap_or(Decimal::MAX)
    }

    /// Both category and rate are filled in.
    pub fn is_complete(&self) -> bool {
        !self.category.trim().is_empty() && self.rate.is_some()
    }

    /// Fields still missing before this row may be submitted.
    pub fn missing_fields(&self) -> Vec<ItemField> {
        let mut missing = Vec::new();
        if self.category.trim().is_empty() {
            missing.push(ItemField::Category);
        }
        if self.rate.is_none() {
            missing.push(ItemField::Rate);
        }
        missing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemField {
    Name,
    Category,
    #[serde(alias = "qty")]
    Quantity,
    Rate,
}

impl ItemField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemField::Name => "name",
            ItemField::Category => "category",
            ItemField::Quantity => "quantity",
            ItemField::Rate => "rate",
        }
    }
}

impl FromStr for ItemField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(ItemField::Name),
            "category" => Ok(ItemField::Category),
            "qty" | "quantity" => Ok(ItemField::Quantity),
            "rate" => Ok(ItemField::Rate),
            other => Err(format!("Unknown item field: {}", other)),
        }
    }
}

/// Missing fields on one row, numbered from 1 as shown in the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFieldError {
    pub row: usize,
    pub missing: Vec<ItemField>,
}

/// Category names an organization allows on its bills, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySet {
    names: Vec<String>,
}

impl CategorySet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for name in names {
            let name = name.into();
            if !set.contains(&name) {
                set.names.push(name);
            }
        }
        set
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Rows of a bill. Always holds at least one row, complete or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Ledger {
    items: Vec<LineItem>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<LineItem>> for Ledger {
    fn from(mut items: Vec<LineItem>) -> Self {
        if items.is_empty() {
            items.push(LineItem::default());
        }
        Self { items }
    }
}

impl From<Ledger> for Vec<LineItem> {
    fn from(ledger: Ledger) -> Self {
        ledger.items
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            items: vec![LineItem::default()],
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add_item(&mut self) {
        self.items.push(LineItem::default());
    }

    /// Removes the row at `index`. Returns false, leaving the ledger as it
    /// was, when that would drop the last row or `index` is out of range.
    pub fn remove_item(&mut self, index: usize) -> bool {
        if self.items.len() <= 1 || index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        true
    }

    /// Applies raw form input to one field. Unparseable numbers count as zero.
    /// Returns false when `index` is out of range.
    pub fn update_item(&mut self, index: usize, field: ItemField, value: &str) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        match field {
            ItemField::Name => item.name = value.to_string(),
            ItemField::Category => item.category = value.trim().to_string(),
            ItemField::Quantity => item.quantity = parse_quantity(value),
            ItemField::Rate => item.rate = parse_rate(value),
        }
        true
    }

    /// Sum of amounts over rows that have a category.
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .filter(|item| !item.category.trim().is_empty())
            .map(LineItem::amount)
            .fold(Decimal::ZERO, saturating_add)
    }

    pub fn is_submit_eligible(&self) -> bool {
        self.items.iter().all(LineItem::is_complete)
    }

    pub fn complete_items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|item| item.is_complete())
    }

    pub fn field_errors(&self) -> Vec<ItemFieldError> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let missing = item.missing_fields();
                (!missing.is_empty()).then_some(ItemFieldError { row: i + 1, missing })
            })
            .collect()
    }

    /// Rows (1-based) whose category is set but not offered by the organization.
    pub fn unknown_categories(&self, allowed: &CategorySet) -> Vec<(usize, String)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                !item.category.trim().is_empty() && !allowed.contains(&item.category)
            })
            .map(|(i, item)| (i + 1, item.category.clone()))
            .collect()
    }
}

pub(crate) fn saturating_add(total: Decimal, amount: Decimal) -> Decimal {
    total.checked_add(amount).unwrap_or(Decimal::MAX)
}

fn parse_quantity(value: &str) -> u32 {
    let value = value.trim();
    if let Ok(qty) = value.parse::<u32>() {
        return qty;
    }
    Decimal::from_str(value)
        .ok()
        .filter(|d| !d.is_sign_negative())
        .and_then(|d| d.trunc().to_u32())
        .unwrap_or(0)
}

fn parse_rate(value: &str) -> Option<Decimal> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    // No single rate of a crore or more can appear on a valid bill.
    let rate = Decimal::from_str(value)
        .ok()
        .filter(|d| !d.is_sign_negative() && *d < Decimal::from(WORDS_CEILING))
        .unwrap_or(Decimal::ZERO);
    Some(rate)
}
