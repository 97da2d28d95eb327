use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::journey::graph::JourneyGraph;
use crate::journey::states::{
    ChatDirective, JourneyAction, JourneyContext, JourneyEvent, JourneyState, JourneyType,
    ToolName, TransitionOutcome,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyMetadata {
    pub title: String,
    pub description: String,
    pub conditions: Vec<String>,
}

pub trait JourneyDefinition {
    fn journey_type(&self) -> JourneyType;
    fn metadata(&self) -> JourneyMetadata;
    fn initial_state(&self) -> JourneyState;
    fn graph(&self) -> JourneyGraph;
    fn transition(
        &self,
        current: &JourneyState,
        event: &JourneyEvent,
        context: &JourneyContext,
    ) -> Result<TransitionOutcome, JourneyTransitionError>;
}

/// Browse, select, check stock, then either order or get recommendations.
#[derive(Clone, Debug, Default)]
pub struct PurchaseJourney;

pub const ORDER_CONDITION: &str = "The book is in stock and the customer wants to place an order";
pub const ALTERNATIVES_CONDITION: &str =
    "The book is out of stock and the customer wants alternatives";
pub const SELECTION_CONDITION: &str = "The customer selects a book";

impl JourneyDefinition for PurchaseJourney {
    fn journey_type(&self) -> JourneyType {
        JourneyType::BookPurchase
    }

    fn metadata(&self) -> JourneyMetadata {
        JourneyMetadata {
            title: "Book Purchase".to_string(),
            description: "Helps a customer find and buy a book.".to_string(),
            conditions: vec!["The customer wants to buy a book".to_string()],
        }
    }

    fn initial_state(&self) -> JourneyState {
        JourneyState::Initial
    }

    fn graph(&self) -> JourneyGraph {
        JourneyGraph::purchase()
    }

    fn transition(
        &self,
        current: &JourneyState,
        event: &JourneyEvent,
        context: &JourneyContext,
    ) -> Result<TransitionOutcome, JourneyTransitionError> {
        transition_purchase(current, event, context)
    }
}

pub struct JourneyEngine<J> {
    journey: J,
}

impl<J> JourneyEngine<J>
where
    J: JourneyDefinition,
{
    pub fn new(journey: J) -> Self {
        Self { journey }
    }

    pub fn journey_type(&self) -> JourneyType {
        self.journey.journey_type()
    }

    pub fn metadata(&self) -> JourneyMetadata {
        self.journey.metadata()
    }

    pub fn graph(&self) -> JourneyGraph {
        self.journey.graph()
    }

    pub fn initial_state(&self) -> JourneyState {
        self.journey.initial_state()
    }

    pub fn apply(
        &self,
        current: &JourneyState,
        event: &JourneyEvent,
        context: &JourneyContext,
    ) -> Result<TransitionOutcome, JourneyTransitionError> {
        self.journey.transition(current, event, context)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: &JourneyState,
        event: &JourneyEvent,
        context: &JourneyContext,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, JourneyTransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.apply(current, event, context);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "journey.transition_applied",
                        AuditCategory::Journey,
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", format!("{:?}", outcome.from))
                    .with_metadata("to", format!("{:?}", outcome.to))
                    .with_metadata("event", format!("{:?}", outcome.event)),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "journey.transition_rejected",
                        AuditCategory::Journey,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}

impl Default for JourneyEngine<PurchaseJourney> {
    fn default() -> Self {
        Self::new(PurchaseJourney)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum JourneyTransitionError {
    #[error("no book has been selected before leaving {state:?}")]
    MissingSelection { state: JourneyState },
    #[error("stock status is unknown before leaving {state:?}")]
    MissingStock { state: JourneyState },
    #[error("condition not met in {state:?}: {condition}")]
    ConditionNotMet { state: JourneyState, condition: &'static str },
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: JourneyState, event: JourneyEvent },
}

fn transition_purchase(
    current: &JourneyState,
    event: &JourneyEvent,
    context: &JourneyContext,
) -> Result<TransitionOutcome, JourneyTransitionError> {
    use ChatDirective::{ConfirmOrder, ListBooksAndAskChoice, TellStockStatus};
    use JourneyAction::{CallTool, Respond};
    use JourneyEvent::{
        Activated, AlternativesRequested, BookSelected, BooksListed, CancelRequested,
        OrderPlaced, OrderRequested, StockReported,
    };
    use JourneyState::{
        Abandoned, AwaitingSelection, CheckingStock, Initial, ListingBooks, OrderConfirmed,
        PlacingOrder, RecommendingAlternatives, ReportingStock,
    };

    let (to, actions) = match (current, event) {
        (Initial, Activated) => (ListingBooks, vec![CallTool(ToolName::ListAvailableBooks)]),
        (ListingBooks, BooksListed) => (AwaitingSelection, vec![Respond(ListBooksAndAskChoice)]),
        (AwaitingSelection, BookSelected) => {
            if context.selected_title.as_deref().map_or(true, |title| title.trim().is_empty()) {
                return Err(JourneyTransitionError::MissingSelection { state: *current });
            }
            (CheckingStock, vec![CallTool(ToolName::CheckStock)])
        }
        (CheckingStock, StockReported) => {
            if context.stock.is_none() {
                return Err(JourneyTransitionError::MissingStock { state: *current });
            }
            (ReportingStock, vec![Respond(TellStockStatus)])
        }
        (ReportingStock, OrderRequested) => {
            if !context.stock.is_some_and(|stock| stock.is_available()) {
                return Err(JourneyTransitionError::ConditionNotMet {
                    state: *current,
                    condition: ORDER_CONDITION,
                });
            }
            (PlacingOrder, vec![CallTool(ToolName::PlaceOrder)])
        }
        (ReportingStock, AlternativesRequested) => {
            if context.stock.map_or(true, |stock| stock.is_available()) {
                return Err(JourneyTransitionError::ConditionNotMet {
                    state: *current,
                    condition: ALTERNATIVES_CONDITION,
                });
            }
            (RecommendingAlternatives, vec![CallTool(ToolName::RecommendBooks)])
        }
        (PlacingOrder, OrderPlaced) => (OrderConfirmed, vec![Respond(ConfirmOrder)]),
        (state, CancelRequested) if !state.is_terminal() => (Abandoned, Vec::new()),
        _ => {
            return Err(JourneyTransitionError::InvalidTransition {
                state: *current,
                event: event.clone(),
            });
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: event.clone(), actions })
}
