use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::journey::engine::{ALTERNATIVES_CONDITION, ORDER_CONDITION, SELECTION_CONDITION};
use crate::journey::states::{ChatDirective, JourneyState, ToolName};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum NodeKind {
    Start,
    Tool(ToolName),
    Chat(ChatDirective),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyNode {
    pub state: JourneyState,
    pub kind: NodeKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyEdge {
    pub from: JourneyState,
    pub to: JourneyState,
    pub condition: Option<String>,
}

/// Author-facing view of a journey: which steps exist and how they connect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyGraph {
    pub initial: JourneyState,
    pub nodes: Vec<JourneyNode>,
    pub edges: Vec<JourneyEdge>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("edge references unknown state {0:?}")]
    UnknownState(JourneyState),
    #[error("journey graph contains a cycle through {0:?}")]
    Cycle(JourneyState),
    #[error("state {0:?} is unreachable from the initial state")]
    Unreachable(JourneyState),
}

impl JourneyGraph {
    pub fn purchase() -> Self {
        use JourneyState::*;

        let nodes = vec![
            node(Initial, NodeKind::Start),
            node(ListingBooks, NodeKind::Tool(ToolName::ListAvailableBooks)),
            node(AwaitingSelection, NodeKind::Chat(ChatDirective::ListBooksAndAskChoice)),
            node(CheckingStock, NodeKind::Tool(ToolName::CheckStock)),
            node(ReportingStock, NodeKind::Chat(ChatDirective::TellStockStatus)),
            node(PlacingOrder, NodeKind::Tool(ToolName::PlaceOrder)),
            node(OrderConfirmed, NodeKind::Chat(ChatDirective::ConfirmOrder)),
            node(RecommendingAlternatives, NodeKind::Tool(ToolName::RecommendBooks)),
        ];
        let edges = vec![
            edge(Initial, ListingBooks, None),
            edge(ListingBooks, AwaitingSelection, None),
            edge(AwaitingSelection, CheckingStock, Some(SELECTION_CONDITION)),
            edge(CheckingStock, ReportingStock, None),
            edge(ReportingStock, PlacingOrder, Some(ORDER_CONDITION)),
            edge(PlacingOrder, OrderConfirmed, None),
            edge(ReportingStock, RecommendingAlternatives, Some(ALTERNATIVES_CONDITION)),
        ];

        Self { initial: Initial, nodes, edges }
    }

    pub fn node(&self, state: JourneyState) -> Option<&JourneyNode> {
        self.nodes.iter().find(|node| node.state == state)
    }

    pub fn outgoing(&self, state: JourneyState) -> Vec<&JourneyEdge> {
        self.edges.iter().filter(|edge| edge.from == state).collect()
    }

    pub fn branch_conditions(&self, state: JourneyState) -> Vec<&str> {
        self.outgoing(state).into_iter().filter_map(|edge| edge.condition.as_deref()).collect()
    }

    /// Checks that every edge is anchored, the graph is acyclic and every
    /// node can be reached from the initial state.
    pub fn validate(&self) -> Result<(), GraphError> {
        let known = self.nodes.iter().map(|node| node.state).collect::<BTreeSet<_>>();
        for edge in &self.edges {
            for state in [edge.from, edge.to] {
                if !known.contains(&state) {
                    return Err(GraphError::UnknownState(state));
                }
            }
        }

        let mut in_degree = known.iter().map(|state| (*state, 0usize)).collect::<BTreeMap<_, _>>();
        for edge in &self.edges {
            *in_degree.entry(edge.to).or_default() += 1;
        }
        let mut ready = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(state, _)| *state)
            .collect::<VecDeque<_>>();
        let mut visited = 0usize;
        while let Some(state) = ready.pop_front() {
            visited += 1;
            for edge in self.outgoing(state) {
                if let Some(degree) = in_degree.get_mut(&edge.to) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(edge.to);
                    }
                }
            }
        }
        if visited != known.len() {
            let stuck = in_degree
                .into_iter()
                .find(|(_, degree)| *degree > 0)
                .map(|(state, _)| state)
                .unwrap_or(self.initial);
            return Err(GraphError::Cycle(stuck));
        }

        let mut reachable = BTreeSet::from([self.initial]);
        let mut queue = VecDeque::from([self.initial]);
        while let Some(state) = queue.pop_front() {
            for edge in self.outgoing(state) {
                if reachable.insert(edge.to) {
                    queue.push_back(edge.to);
                }
            }
        }
        match known.difference(&reachable).next() {
            Some(state) => Err(GraphError::Unreachable(*state)),
            None => Ok(()),
        }
    }
}

fn node(state: JourneyState, kind: NodeKind) -> JourneyNode {
    JourneyNode { state, kind }
}

fn edge(from: JourneyState, to: JourneyState, condition: Option<&str>) -> JourneyEdge {
    JourneyEdge { from, to, condition: condition.map(str::to_string) }
}

#[cfg(test)]
mod tests {
    use super::{GraphError, JourneyGraph, NodeKind};
    use crate::journey::states::{JourneyState, ToolName};

    #[test]
    fn purchase_graph_is_valid() {
        let graph = JourneyGraph::purchase();
        assert_eq!(graph.validate(), Ok(()));
        assert_eq!(graph.nodes.len(), 8);
    }

    #[test]
    fn reporting_stock_has_exactly_two_branches() {
        let graph = JourneyGraph::purchase();
        let conditions = graph.branch_conditions(JourneyState::ReportingStock);
        assert_eq!(conditions.len(), 2);
        assert!(conditions[0].contains("in stock"));
        assert!(conditions[1].contains("out of stock"));
    }

    #[test]
    fn tool_nodes_reference_registered_tools() {
        let graph = JourneyGraph::purchase();
        let tools = graph
            .nodes
            .iter()
            .filter_map(|node| match node.kind {
                NodeKind::Tool(tool) => Some(tool),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(tools.len(), ToolName::ALL.len());
    }

    #[test]
    fn cycle_is_detected() {
        let mut graph = JourneyGraph::purchase();
        graph.edges.push(super::edge(JourneyState::OrderConfirmed, JourneyState::ListingBooks, None));
        assert!(matches!(graph.validate(), Err(GraphError::Cycle(_))));
    }

    #[test]
    fn unreachable_node_is_detected() {
        let mut graph = JourneyGraph::purchase();
        graph.edges.retain(|edge| edge.to != JourneyState::RecommendingAlternatives);
        assert_eq!(
            graph.validate(),
            Err(GraphError::Unreachable(JourneyState::RecommendingAlternatives))
        );
    }
}
