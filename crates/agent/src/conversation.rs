use std::collections::BTreeSet;
use std::sync::Arc;

use bookstore_core::glossary::{Glossary, STORE_HOURS, STORE_LOCATION, STORE_PHONE_NUMBER};
use bookstore_core::inventory::Inventory;
use bookstore_core::Book;
use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CustomerIntent {
    pub wants_to_buy: bool,
    pub wants_order: bool,
    pub wants_alternatives: bool,
    pub declines: bool,
    pub cancel: bool,
    pub asks_hours: bool,
    pub asks_location: bool,
    pub asks_staff: bool,
    pub greeting: bool,
    pub closing: bool,
    pub about_books: bool,
    pub selected_book: Option<Book>,
}

impl CustomerIntent {
    pub fn asks_store_question(&self) -> bool {
        self.asks_hours || self.asks_location || self.asks_staff
    }

    /// Books come up, but it is unclear whether the customer wants to buy or
    /// to hear recommendations.
    pub fn is_ambiguous(&self) -> bool {
        self.about_books
            && !self.wants_to_buy
            && !self.wants_alternatives
            && !self.wants_order
            && !self.asks_store_question()
    }

    pub fn is_off_topic(&self) -> bool {
        !self.about_books
            && !self.asks_store_question()
            && !self.greeting
            && !self.closing
            && !self.wants_order
            && !self.declines
            && !self.cancel
    }
}

#[derive(Clone)]
pub struct IntentExtractor {
    inventory: Arc<dyn Inventory>,
    glossary: Glossary,
}

const BUY_PHRASES: &[&str] =
    &["buy", "purchase", "shop", "order a book", "get a book", "want a book", "looking for a book"];
const ORDER_PHRASES: &[&str] = &[
    "order",
    "place",
    "yes",
    "yeah",
    "yep",
    "sure",
    "ok",
    "okay",
    "go ahead",
    "i'll take",
    "take it",
    "buy it",
    "please do",
];
const DECLINE_PHRASES: &[&str] = &["no", "nope", "not now", "no thanks", "don't"];
const ALTERNATIVE_PHRASES: &[&str] = &[
    "alternative",
    "alternatives",
    "recommend",
    "recommendation",
    "recommendations",
    "suggest",
    "suggestion",
    "something else",
    "other books",
    "similar",
];
const CANCEL_PHRASES: &[&str] = &["cancel", "never mind", "nevermind", "forget it", "stop"];
const GREETING_PHRASES: &[&str] = &["hi", "hello", "hey", "good morning", "good evening"];
const CLOSING_PHRASES: &[&str] =
    &["thanks", "thank you", "thx", "cheers", "bye", "goodbye", "that's all", "that is all"];
const BOOK_PHRASES: &[&str] =
    &["book", "books", "novel", "novels", "author", "read", "reading", "title", "stock", "copy"];

impl IntentExtractor {
    /// Store questions are recognized through the glossary's term names and
    /// synonyms, so the facts and their triggers live in one place.
    pub fn new(inventory: Arc<dyn Inventory>, glossary: Glossary) -> Self {
        Self { inventory, glossary }
    }

    pub fn extract(&self, text: &str) -> CustomerIntent {
        let normalized_text = normalize_text(text);
        let tokens = tokenize(&normalized_text);

        let selected_book = self.inventory.resolve_title(&normalized_text);
        let wants_to_buy = mentions_any(&normalized_text, &tokens, BUY_PHRASES);
        let wants_alternatives = mentions_any(&normalized_text, &tokens, ALTERNATIVE_PHRASES);
        let terms = self
            .glossary
            .matching(&normalized_text)
            .into_iter()
            .map(|term| term.name.as_str())
            .collect::<BTreeSet<_>>();
        let about_books = selected_book.is_some()
            || wants_to_buy
            || wants_alternatives
            || mentions_any(&normalized_text, &tokens, BOOK_PHRASES);

        CustomerIntent {
            wants_to_buy,
            wants_order: mentions_any(&normalized_text, &tokens, ORDER_PHRASES),
            wants_alternatives,
            declines: mentions_any(&normalized_text, &tokens, DECLINE_PHRASES),
            cancel: mentions_any(&normalized_text, &tokens, CANCEL_PHRASES),
            asks_hours: terms.contains(STORE_HOURS),
            asks_location: terms.contains(STORE_LOCATION),
            asks_staff: terms.contains(STORE_PHONE_NUMBER),
            greeting: mentions_any(&normalized_text, &tokens, GREETING_PHRASES),
            closing: mentions_any(&normalized_text, &tokens, CLOSING_PHRASES),
            about_books,
            selected_book,
        }
    }
}

fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

fn tokenize(text: &str) -> BTreeSet<String> {
    let mut sanitized = String::with_capacity(text.len());
    for character in text.chars() {
        if character.is_alphanumeric() || character == '\'' {
            sanitized.push(character);
        } else {
            sanitized.push(' ');
        }
    }
    sanitized.split_whitespace().map(|token| token.to_string()).collect()
}

/// Single words must match a whole token; phrases match as substrings.
fn mentions_any(normalized_text: &str, tokens: &BTreeSet<String>, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| {
        if phrase.contains(' ') {
            normalized_text.contains(phrase)
        } else {
            tokens.contains(*phrase)
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bookstore_core::{Glossary, GlossaryTerm, StaticInventory};

    use super::IntentExtractor;

    fn extractor() -> IntentExtractor {
        IntentExtractor::new(Arc::new(StaticInventory::new()), Glossary::bookstore())
    }

    #[test]
    fn detects_purchase_intent() {
        let intent = extractor().extract("Hi, I want to buy a book");
        assert!(intent.wants_to_buy);
        assert!(intent.about_books);
        assert!(intent.greeting);
        assert!(!intent.is_ambiguous());
    }

    #[test]
    fn resolves_selected_title() {
        let intent = extractor().extract("I'll go with Atomic Habits");
        assert_eq!(intent.selected_book.map(|book| book.title), Some("Atomic Habits".to_string()));
    }

    #[test]
    fn store_questions_are_classified() {
        let extractor = extractor();
        assert!(extractor.extract("What are your opening hours?").asks_hours);
        assert!(extractor.extract("Where is the shop located?").asks_location);
        assert!(extractor.extract("Can I speak to a staff member?").asks_staff);
    }

    #[test]
    fn store_questions_follow_glossary_synonyms() {
        let mut glossary = Glossary::bookstore();
        glossary.create_term(
            GlossaryTerm::new("Store Hours", "Open late on Fridays").with_synonyms(["late"]),
        );
        let extractor = IntentExtractor::new(Arc::new(StaticInventory::new()), glossary);

        assert!(extractor.extract("Are you open late?").asks_hours);
        assert!(!extractor.extract("When do you close?").asks_hours);
        assert!(extractor.extract("What's the phone number?").asks_staff);
        assert!(!extractor.extract("Where can I recall my order?").asks_staff);
    }

    #[test]
    fn thanks_and_goodbyes_are_not_off_topic() {
        let extractor = extractor();
        for text in ["Thanks!", "Thank you so much", "Ok bye", "That's all, cheers"] {
            let intent = extractor.extract(text);
            assert!(intent.closing, "{text} should read as a closing");
            assert!(!intent.is_off_topic(), "{text} should not be off-topic");
        }
    }

    #[test]
    fn single_words_do_not_match_inside_other_words() {
        let intent = extractor().extract("I know nothing about shopping");
        assert!(!intent.declines, "`no` must not match inside `know` or `nothing`");
        assert!(!intent.wants_to_buy, "`shop` must not match inside `shopping`");
    }

    #[test]
    fn unrelated_request_is_off_topic() {
        let intent = extractor().extract("Can you fix my car engine?");
        assert!(intent.is_off_topic());
        assert!(!extractor().extract("Dune please").is_off_topic());
    }

    #[test]
    fn mentioning_a_book_without_goal_is_ambiguous() {
        let intent = extractor().extract("I've been thinking about Dune");
        assert!(intent.is_ambiguous());
        assert!(!extractor().extract("Can you recommend something like Dune?").is_ambiguous());
    }

    #[test]
    fn affirmations_and_cancellations() {
        let extractor = extractor();
        assert!(extractor.extract("Yes, please place the order").wants_order);
        assert!(extractor.extract("No thanks").declines);
        assert!(extractor.extract("Never mind, cancel that").cancel);
        assert!(extractor.extract("Any alternatives?").wants_alternatives);
    }
}
