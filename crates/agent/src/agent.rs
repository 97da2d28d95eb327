use bookstore_core::config::AgentConfig;
use bookstore_core::glossary::{Glossary, GlossaryTerm};
use bookstore_core::journey::{JourneyDefinition, JourneyGraph, JourneyMetadata, PurchaseJourney};
use serde::Serialize;
use tracing::info;

use crate::guidelines::{Guideline, GuidelineSet, GuidelineTrigger};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentDescription {
    pub name: String,
    pub description: String,
    pub terms: Vec<GlossaryTerm>,
    pub journeys: Vec<JourneyOverview>,
    pub guidelines: Vec<Guideline>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JourneyOverview {
    #[serde(flatten)]
    pub metadata: JourneyMetadata,
    pub states: usize,
    pub transitions: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JourneySummary {
    pub metadata: JourneyMetadata,
    pub graph: JourneyGraph,
}

/// Static configuration of one conversational agent: who it is, what it
/// knows, which scripted journeys it runs and which rules it reacts to.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentBlueprint {
    pub name: String,
    pub description: String,
    pub glossary: Glossary,
    pub journeys: Vec<JourneySummary>,
    pub guidelines: GuidelineSet,
}

impl AgentBlueprint {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            glossary: Glossary::default(),
            journeys: Vec::new(),
            guidelines: GuidelineSet::default(),
        }
    }

    pub fn bookstore(config: &AgentConfig) -> Self {
        let mut agent = Self::new(config.name.clone(), config.description.clone());
        for term in Glossary::bookstore().terms() {
            agent.create_term(term.clone());
        }
        agent.create_journey(&PurchaseJourney);
        for guideline in GuidelineSet::bookstore().guidelines() {
            agent.guidelines.add(guideline.clone());
        }

        info!(
            event_name = "agent.blueprint.ready",
            agent = %agent.name,
            terms = agent.glossary.len(),
            journeys = agent.journeys.len(),
            guidelines = agent.guidelines.len(),
            "agent blueprint assembled"
        );
        agent
    }

    pub fn create_term(&mut self, term: GlossaryTerm) {
        self.glossary.create_term(term);
    }

    pub fn create_journey<J>(&mut self, journey: &J) -> &JourneySummary
    where
        J: JourneyDefinition,
    {
        let summary = JourneySummary { metadata: journey.metadata(), graph: journey.graph() };
        self.journeys.retain(|existing| existing.metadata.title != summary.metadata.title);
        self.journeys.push(summary);
        let index = self.journeys.len() - 1;
        &self.journeys[index]
    }

    pub fn create_guideline(
        &mut self,
        id: impl Into<String>,
        condition: impl Into<String>,
        action: impl Into<String>,
        trigger: GuidelineTrigger,
    ) {
        self.guidelines.add(Guideline::new(id, condition, action, trigger));
    }

    pub fn create_observation(
        &mut self,
        id: impl Into<String>,
        condition: impl Into<String>,
        trigger: GuidelineTrigger,
    ) {
        self.guidelines.add(Guideline::observation(id, condition, trigger));
    }

    pub fn journey(&self, title: &str) -> Option<&JourneySummary> {
        self.journeys.iter().find(|journey| journey.metadata.title == title)
    }

    pub fn fact(&self, term: &str) -> Option<&str> {
        self.glossary.get(term).map(|term| term.description.as_str())
    }

    pub fn describe(&self) -> AgentDescription {
        AgentDescription {
            name: self.name.clone(),
            description: self.description.clone(),
            terms: self.glossary.terms().to_vec(),
            journeys: self
                .journeys
                .iter()
                .map(|journey| JourneyOverview {
                    metadata: journey.metadata.clone(),
                    states: journey.graph.nodes.len(),
                    transitions: journey.graph.edges.len(),
                })
                .collect(),
            guidelines: self.guidelines.guidelines().to_vec(),
        }
    }
}
