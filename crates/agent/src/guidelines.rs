use bookstore_core::glossary::{STORE_HOURS, STORE_LOCATION, STORE_PHONE_NUMBER};
use serde::{Deserialize, Serialize};

use crate::conversation::CustomerIntent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidelineTrigger {
    StoreHours,
    StoreLocation,
    StaffRequest,
    OffTopic,
    AmbiguousBookInterest,
}

impl GuidelineTrigger {
    pub fn fires_for(&self, intent: &CustomerIntent) -> bool {
        match self {
            Self::StoreHours => intent.asks_hours,
            Self::StoreLocation => intent.asks_location,
            Self::StaffRequest => intent.asks_staff,
            Self::OffTopic => intent.is_off_topic(),
            Self::AmbiguousBookInterest => intent.is_ambiguous(),
        }
    }

    /// Glossary term whose description answers the guideline.
    pub fn glossary_term(&self) -> Option<&'static str> {
        match self {
            Self::StoreHours => Some(STORE_HOURS),
            Self::StoreLocation => Some(STORE_LOCATION),
            Self::StaffRequest => Some(STORE_PHONE_NUMBER),
            Self::OffTopic | Self::AmbiguousBookInterest => None,
        }
    }
}

/// A condition/action rule. Without an action the rule is an observation:
/// the agent notices the condition and asks instead of acting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guideline {
    pub id: String,
    pub condition: String,
    pub action: Option<String>,
    pub trigger: GuidelineTrigger,
}

impl Guideline {
    pub fn new(
        id: impl Into<String>,
        condition: impl Into<String>,
        action: impl Into<String>,
        trigger: GuidelineTrigger,
    ) -> Self {
        Self {
            id: id.into(),
            condition: condition.into(),
            action: Some(action.into()),
            trigger,
        }
    }

    pub fn observation(
        id: impl Into<String>,
        condition: impl Into<String>,
        trigger: GuidelineTrigger,
    ) -> Self {
        Self { id: id.into(), condition: condition.into(), action: None, trigger }
    }

    pub fn is_observation(&self) -> bool {
        self.action.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidelineSet {
    guidelines: Vec<Guideline>,
}

impl GuidelineSet {
    pub fn bookstore() -> Self {
        let mut set = Self::default();
        set.add(Guideline::observation(
            "observation.unclear_book_interest",
            "The customer is asking about a book but it's not clear whether they want to buy or get recommendations",
            GuidelineTrigger::AmbiguousBookInterest,
        ));
        set.add(Guideline::new(
            "guideline.store_hours",
            "The customer asks about store hours",
            "Tell them our store hours",
            GuidelineTrigger::StoreHours,
        ));
        set.add(Guideline::new(
            "guideline.store_location",
            "The customer asks about location",
            "Tell them our store address",
            GuidelineTrigger::StoreLocation,
        ));
        set.add(Guideline::new(
            "guideline.staff_request",
            "The customer asks to speak to a staff member",
            "Ask them to call the store phone number",
            GuidelineTrigger::StaffRequest,
        ));
        set.add(Guideline::new(
            "guideline.off_topic",
            "The request has nothing to do with books",
            "Politely explain that you can only help with bookstore-related questions.",
            GuidelineTrigger::OffTopic,
        ));
        set
    }

    pub fn add(&mut self, guideline: Guideline) {
        self.guidelines.retain(|existing| existing.id != guideline.id);
        self.guidelines.push(guideline);
    }

    pub fn guidelines(&self) -> &[Guideline] {
        &self.guidelines
    }

    pub fn observations(&self) -> impl Iterator<Item = &Guideline> {
        self.guidelines.iter().filter(|guideline| guideline.is_observation())
    }

    /// Matching rules in declaration order.
    pub fn evaluate(&self, intent: &CustomerIntent) -> Vec<&Guideline> {
        self.guidelines.iter().filter(|guideline| guideline.trigger.fires_for(intent)).collect()
    }

    pub fn len(&self) -> usize {
        self.guidelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guidelines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Guideline, GuidelineSet, GuidelineTrigger};
    use crate::conversation::CustomerIntent;

    #[test]
    fn bookstore_set_has_four_guidelines_and_one_observation() {
        let set = GuidelineSet::bookstore();
        assert_eq!(set.len(), 5);
        assert_eq!(set.observations().count(), 1);
    }

    #[test]
    fn hours_question_matches_hours_guideline_only() {
        let set = GuidelineSet::bookstore();
        let intent = CustomerIntent { asks_hours: true, ..CustomerIntent::default() };
        let matched = set.evaluate(&intent);

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "guideline.store_hours");
        assert_eq!(matched[0].trigger.glossary_term(), Some("Store Hours"));
    }

    #[test]
    fn staff_request_points_to_phone_number() {
        let set = GuidelineSet::bookstore();
        let intent = CustomerIntent { asks_staff: true, ..CustomerIntent::default() };
        let matched = set.evaluate(&intent);
        assert_eq!(matched[0].action.as_deref(), Some("Ask them to call the store phone number"));
        assert_eq!(matched[0].trigger.glossary_term(), Some("Store Phone Number"));
    }

    #[test]
    fn empty_intent_is_off_topic() {
        let set = GuidelineSet::bookstore();
        let matched = set.evaluate(&CustomerIntent::default());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].trigger, GuidelineTrigger::OffTopic);
    }

    #[test]
    fn ambiguous_interest_matches_observation() {
        let set = GuidelineSet::bookstore();
        let intent = CustomerIntent { about_books: true, ..CustomerIntent::default() };
        let matched = set.evaluate(&intent);
        assert_eq!(matched.len(), 1);
        assert!(matched[0].is_observation());
    }

    #[test]
    fn adding_with_same_id_replaces() {
        let mut set = GuidelineSet::bookstore();
        set.add(Guideline::new(
            "guideline.store_hours",
            "The customer asks when we open",
            "Tell them our store hours",
            GuidelineTrigger::StoreHours,
        ));
        assert_eq!(set.len(), 5);
        assert!(set.guidelines().iter().any(|rule| rule.condition == "The customer asks when we open"));
    }
}
