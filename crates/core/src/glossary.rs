use serde::{Deserialize, Serialize};

use crate::text::contains_words;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
}

impl GlossaryTerm {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: description.into(), synonyms: Vec::new() }
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms.extend(synonyms.into_iter().map(Into::into));
        self
    }

    fn mentioned_in(&self, normalized_text: &str) -> bool {
        std::iter::once(&self.name)
            .chain(&self.synonyms)
            .any(|phrase| contains_words(normalized_text, &phrase.to_lowercase()))
    }
}

/// Static facts the agent may quote back to customers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glossary {
    terms: Vec<GlossaryTerm>,
}

pub const STORE_PHONE_NUMBER: &str = "Store Phone Number";
pub const STORE_HOURS: &str = "Store Hours";
pub const STORE_LOCATION: &str = "Store Location";

impl Glossary {
    pub fn bookstore() -> Self {
        let mut glossary = Self::default();
        glossary.create_term(
            GlossaryTerm::new(
                STORE_PHONE_NUMBER,
                "The phone number of our bookstore is +1-222-333-4444",
            )
            .with_synonyms([
                "phone",
                "call",
                "telephone",
                "staff",
                "human",
                "person",
                "employee",
                "manager",
                "speak to",
                "talk to",
                "representative",
            ]),
        );
        glossary.create_term(
            GlossaryTerm::new(STORE_HOURS, "Store hours are Monday to Saturday, 9 AM to 8 PM")
                .with_synonyms(["hours", "open", "opening", "close", "closing", "closed"]),
        );
        glossary.create_term(
            GlossaryTerm::new(STORE_LOCATION, "We are located at 123 Main Street, Springfield.")
                .with_synonyms([
                    "address",
                    "located",
                    "location",
                    "directions",
                    "where are you",
                    "where is the store",
                    "where is the shop",
                    "find you",
                ]),
        );
        glossary
    }

    /// Adds a term, replacing an existing one with the same name.
    pub fn create_term(&mut self, term: GlossaryTerm) {
        match self.terms.iter_mut().find(|existing| existing.name.eq_ignore_ascii_case(&term.name))
        {
            Some(existing) => *existing = term,
            None => self.terms.push(term),
        }
    }

    pub fn terms(&self) -> &[GlossaryTerm] {
        &self.terms
    }

    pub fn get(&self, name: &str) -> Option<&GlossaryTerm> {
        self.terms.iter().find(|term| term.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Terms whose name or a synonym appears in `text` as whole words.
    pub fn matching(&self, text: &str) -> Vec<&GlossaryTerm> {
        let normalized = text.to_lowercase();
        self.terms.iter().filter(|term| term.mentioned_in(&normalized)).collect()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Glossary, GlossaryTerm, STORE_HOURS, STORE_LOCATION, STORE_PHONE_NUMBER};

    #[test]
    fn bookstore_glossary_carries_store_facts() {
        let glossary = Glossary::bookstore();
        assert_eq!(glossary.len(), 3);

        let phone = glossary.get(STORE_PHONE_NUMBER).expect("phone term");
        assert!(phone.description.contains("+1-222-333-4444"));
        let hours = glossary.get("store hours").expect("hours term is case-insensitive");
        assert_eq!(hours.description, "Store hours are Monday to Saturday, 9 AM to 8 PM");
        let location = glossary.get(STORE_LOCATION).expect("location term");
        assert!(location.description.contains("123 Main Street, Springfield."));
    }

    #[test]
    fn matching_uses_names_and_synonyms() {
        let glossary = Glossary::bookstore();
        let names = glossary
            .matching("When are you open and what's your address?")
            .into_iter()
            .map(|term| term.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![STORE_HOURS, STORE_LOCATION]);
        assert!(glossary.matching("Do you sell Dune?").is_empty());
        assert!(glossary.matching("I can't recall the opener").is_empty());
    }

    #[test]
    fn staff_requests_match_the_phone_number() {
        let glossary = Glossary::bookstore();
        let names = glossary
            .matching("Can I talk to a manager?")
            .into_iter()
            .map(|term| term.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![STORE_PHONE_NUMBER]);
    }

    #[test]
    fn create_term_replaces_same_name() {
        let mut glossary = Glossary::bookstore();
        glossary.create_term(GlossaryTerm::new("store hours", "Closed for renovation"));
        assert_eq!(glossary.len(), 3);
        assert_eq!(
            glossary.get(STORE_HOURS).map(|term| term.description.as_str()),
            Some("Closed for renovation")
        );
    }
}
