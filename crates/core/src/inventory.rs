use chrono::NaiveDate;

use crate::domain::book::{Book, StockStatus};
use crate::domain::order::OrderConfirmation;
use crate::errors::DomainError;
use crate::text::contains_words;

pub trait Inventory: Send + Sync {
    fn available_books(&self) -> Vec<Book>;
    fn check_stock(&self, title: &str) -> StockStatus;
    fn recommendations(&self) -> Vec<Book>;
    fn place_order(&self, title: &str, date: NaiveDate)
        -> Result<OrderConfirmation, DomainError>;

    /// Finds the catalog book whose title appears in free text as whole
    /// words. The longest matching title wins so "The Complete Chess Course"
    /// beats a shorter overlapping title.
    fn resolve_title(&self, text: &str) -> Option<Book> {
        let normalized = normalize_title(text);
        self.available_books()
            .into_iter()
            .filter(|book| contains_words(&normalized, &normalize_title(&book.title)))
            .max_by_key(|book| book.title.len())
    }
}

#[derive(Clone, Debug)]
pub struct StaticInventory {
    books: Vec<Book>,
    stock: Vec<(String, StockStatus)>,
    recommendations: Vec<Book>,
}

impl Default for StaticInventory {
    fn default() -> Self {
        Self {
            books: vec![
                Book::new("1984", "George Orwell"),
                Book::new("Atomic Habits", "James Clear"),
                Book::new("Dune", "Frank Herbert"),
                Book::new("The Complete Chess Course", "Fred Reinfeld"),
                Book::new("Americanah", "Chimamanda Ngozi Adichie"),
            ],
            stock: vec![
                ("1984".to_string(), StockStatus::InStock),
                ("Atomic Habits".to_string(), StockStatus::Limited { copies: 2 }),
                ("Dune".to_string(), StockStatus::OutOfStock),
                ("The Complete Chess Course".to_string(), StockStatus::InStock),
                ("Americanah".to_string(), StockStatus::InStock),
            ],
            recommendations: vec![
                Book::new("The Alchemist", "Paulo Coelho"),
                Book::new("Sapiens", "Yuval Noah Harari"),
                Book::new("Bobby Fischer Teaches Chess", "Bobby Fischer"),
                Book::new("Half of a Yellow Sun", "Chimamanda Ngozi Adichie"),
            ],
        }
    }
}

impl StaticInventory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inventory for StaticInventory {
    fn available_books(&self) -> Vec<Book> {
        self.books.clone()
    }

    fn check_stock(&self, title: &str) -> StockStatus {
        let wanted = normalize_title(title);
        self.stock
            .iter()
            .find(|(stocked, _)| normalize_title(stocked) == wanted)
            .map(|(_, status)| *status)
            .unwrap_or(StockStatus::NotFound)
    }

    fn recommendations(&self) -> Vec<Book> {
        self.recommendations.clone()
    }

    fn place_order(
        &self,
        title: &str,
        date: NaiveDate,
    ) -> Result<OrderConfirmation, DomainError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::InvariantViolation(
                "an order requires a book title".to_string(),
            ));
        }
        Ok(OrderConfirmation::new(title, date))
    }
}

fn normalize_title(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Inventory, StaticInventory};
    use crate::domain::book::StockStatus;
    use crate::errors::DomainError;

    #[test]
    fn lists_the_same_five_books_every_time() {
        let inventory = StaticInventory::new();
        let first = inventory.available_books();
        let second = inventory.available_books();

        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
        assert_eq!(first[0].to_string(), "1984 by George Orwell");
        assert_eq!(first[4].to_string(), "Americanah by Chimamanda Ngozi Adichie");
    }

    #[test]
    fn dune_is_out_of_stock() {
        let inventory = StaticInventory::new();
        assert_eq!(inventory.check_stock("Dune"), StockStatus::OutOfStock);
        assert_eq!(inventory.check_stock("Dune").to_string(), "Out of stock");
    }

    #[test]
    fn unknown_title_is_not_found() {
        let inventory = StaticInventory::new();
        assert_eq!(inventory.check_stock("Unknown Title").to_string(), "Not found");
    }

    #[test]
    fn stock_lookup_ignores_case_and_padding() {
        let inventory = StaticInventory::new();
        assert_eq!(
            inventory.check_stock("  atomic habits "),
            StockStatus::Limited { copies: 2 }
        );
    }

    #[test]
    fn order_message_contains_requested_date() {
        let inventory = StaticInventory::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let confirmation = inventory.place_order("Dune", date).expect("order accepted");

        assert!(confirmation.message.contains("2024-01-01"));
        assert!(confirmation.message.contains("'Dune'"));
    }

    #[test]
    fn blank_order_title_is_rejected() {
        let inventory = StaticInventory::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let error = inventory.place_order("   ", date).expect_err("blank title must fail");
        assert!(matches!(error, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn resolves_longest_title_mentioned_in_text() {
        let inventory = StaticInventory::new();
        let book = inventory
            .resolve_title("I'd like the complete chess course please")
            .expect("title should resolve");
        assert_eq!(book.title, "The Complete Chess Course");
        assert!(inventory.resolve_title("something about gardening").is_none());
    }

    #[test]
    fn titles_only_match_as_whole_words() {
        let inventory = StaticInventory::new();
        assert!(inventory.resolve_title("i'm looking for a book about sand dunes").is_none());
        assert!(inventory.resolve_title("born in 19845").is_none());
        assert_eq!(
            inventory.resolve_title("is dune, the novel, in stock?").map(|book| book.title),
            Some("Dune".to_string())
        );
        assert_eq!(
            inventory.resolve_title("1984?").map(|book| book.title),
            Some("1984".to_string())
        );
    }

    #[test]
    fn recommendations_are_fixed() {
        let inventory = StaticInventory::new();
        let titles = inventory
            .recommendations()
            .into_iter()
            .map(|book| book.title)
            .collect::<Vec<_>>();
        assert_eq!(
            titles,
            vec!["The Alchemist", "Sapiens", "Bobby Fischer Teaches Chess", "Half of a Yellow Sun"]
        );
    }
}
