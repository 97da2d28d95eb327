use serde::{Deserialize, Serialize};

use crate::domain::book::StockStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyType {
    BookPurchase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyState {
    Initial,
    ListingBooks,
    AwaitingSelection,
    CheckingStock,
    ReportingStock,
    PlacingOrder,
    OrderConfirmed,
    RecommendingAlternatives,
    Abandoned,
}

impl JourneyState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::OrderConfirmed | Self::RecommendingAlternatives | Self::Abandoned)
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Initial) && !self.is_terminal()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyEvent {
    Activated,
    BooksListed,
    BookSelected,
    StockReported,
    OrderRequested,
    AlternativesRequested,
    OrderPlaced,
    CancelRequested,
}

/// Facts collected while the customer moves through the journey.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct JourneyContext {
    pub selected_title: Option<String>,
    pub stock: Option<StockStatus>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    ListAvailableBooks,
    CheckStock,
    RecommendBooks,
    PlaceOrder,
}

impl ToolName {
    pub const ALL: [ToolName; 4] =
        [Self::ListAvailableBooks, Self::CheckStock, Self::RecommendBooks, Self::PlaceOrder];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListAvailableBooks => "list_available_books",
            Self::CheckStock => "check_stock",
            Self::RecommendBooks => "recommend_books",
            Self::PlaceOrder => "place_order",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatDirective {
    ListBooksAndAskChoice,
    TellStockStatus,
    ConfirmOrder,
}

impl ChatDirective {
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::ListBooksAndAskChoice => "List available books and ask which one they want",
            Self::TellStockStatus => "Tell the customer the stock status",
            Self::ConfirmOrder => "Confirm the order has been placed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyAction {
    CallTool(ToolName),
    Respond(ChatDirective),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: JourneyState,
    pub to: JourneyState,
    pub event: JourneyEvent,
    pub actions: Vec<JourneyAction>,
}
