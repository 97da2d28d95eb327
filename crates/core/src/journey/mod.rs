pub mod engine;
pub mod graph;
pub mod states;

pub use engine::{
    JourneyDefinition, JourneyEngine, JourneyMetadata, JourneyTransitionError, PurchaseJourney,
};
pub use graph::{GraphError, JourneyEdge, JourneyGraph, JourneyNode, NodeKind};
pub use states::{
    ChatDirective, JourneyAction, JourneyContext, JourneyEvent, JourneyState, JourneyType,
    ToolName, TransitionOutcome,
};
