use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const ORDER_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub title: String,
    pub placed_on: NaiveDate,
    pub message: String,
}

impl OrderConfirmation {
    pub fn new(title: impl Into<String>, placed_on: NaiveDate) -> Self {
        let title = title.into();
        let message = format!(
            "Your order for '{title}' has been placed on {}.",
            placed_on.format(ORDER_DATE_FORMAT)
        );
        Self { title, placed_on, message }
    }
}
