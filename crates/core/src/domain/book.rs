use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self { title: title.into(), author: author.into() }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.title, self.author)
    }
}

/// Shelf availability of a single title as reported to customers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum StockStatus {
    InStock,
    Limited { copies: u32 },
    OutOfStock,
    NotFound,
}

impl StockStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::InStock | Self::Limited { .. })
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InStock => f.write_str("In stock"),
            Self::Limited { copies } => write!(f, "Only {copies} copies left"),
            Self::OutOfStock => f.write_str("Out of stock"),
            Self::NotFound => f.write_str("Not found"),
        }
    }
}

/// Parses the customer-facing wording produced by `Display`.
impl FromStr for StockStatus {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        match text.to_ascii_lowercase().as_str() {
            "in stock" => return Ok(Self::InStock),
            "out of stock" => return Ok(Self::OutOfStock),
            "not found" => return Ok(Self::NotFound),
            _ => {}
        }
        text.strip_prefix("Only ")
            .and_then(|rest| rest.strip_suffix(" copies left"))
            .and_then(|copies| copies.parse::<u32>().ok())
            .map(|copies| Self::Limited { copies })
            .ok_or_else(|| format!("unrecognised stock status `{text}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::{Book, StockStatus};

    #[test]
    fn book_renders_title_and_author() {
        let book = Book::new("Dune", "Frank Herbert");
        assert_eq!(book.to_string(), "Dune by Frank Herbert");
    }

    #[test]
    fn stock_status_uses_customer_facing_wording() {
        assert_eq!(StockStatus::InStock.to_string(), "In stock");
        assert_eq!(StockStatus::Limited { copies: 2 }.to_string(), "Only 2 copies left");
        assert_eq!(StockStatus::OutOfStock.to_string(), "Out of stock");
        assert_eq!(StockStatus::NotFound.to_string(), "Not found");
    }

    #[test]
    fn limited_stock_counts_as_available() {
        assert!(StockStatus::Limited { copies: 1 }.is_available());
        assert!(!StockStatus::OutOfStock.is_available());
        assert!(!StockStatus::NotFound.is_available());
    }

    #[test]
    fn stock_wording_parses_back() {
        assert_eq!("Only 2 copies left".parse::<StockStatus>(), Ok(StockStatus::Limited { copies: 2 }));
        assert_eq!("out of stock".parse::<StockStatus>(), Ok(StockStatus::OutOfStock));
        assert!("Plenty".parse::<StockStatus>().is_err());
    }
}
