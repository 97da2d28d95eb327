use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bookstore_core::audit::{
    AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, TracingAuditSink,
};
use bookstore_core::config::AppConfig;
use bookstore_core::domain::order::ORDER_DATE_FORMAT;
use bookstore_core::inventory::Inventory;
use bookstore_core::journey::{
    ChatDirective, JourneyAction, JourneyContext, JourneyEngine, JourneyEvent, JourneyState,
    PurchaseJourney, ToolName,
};
use bookstore_core::{Book, DomainError, StaticInventory, StockStatus};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::agent::AgentBlueprint;
use crate::conversation::{CustomerIntent, IntentExtractor};
use crate::guidelines::GuidelineTrigger;
use crate::llm::{LlmClient, OpenAiCompatibleClient};
use crate::prompt::{render_reply, render_system};
use crate::session::{Session, Speaker};
use crate::tools::{ToolOutput, ToolRegistry};

/// Source of the date stamped on orders.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolCall {
    pub tool: String,
    pub input: Value,
    pub output: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentReply {
    pub text: String,
    pub journey_state: JourneyState,
    pub tool_calls: Vec<ToolCall>,
    pub matched_guidelines: Vec<String>,
}

const GREETING_REPLY: &str = "Hello! I can help you find and buy a book, check whether a title is in stock, or answer questions about the store. What can I do for you?";
const OFF_TOPIC_REPLY: &str = "I'm sorry, I can only help with bookstore-related questions.";
const CLARIFY_REPLY: &str =
    "Are you looking to buy a book, or would you like some recommendations?";
const CANCELLED_REPLY: &str = "No problem, I've stopped there. Is there anything else I can help you with?";
const CLOSING_REPLY: &str =
    "You're welcome! Let me know if there's anything else I can help you with.";
const PICK_A_BOOK_REPLY: &str = "Which book from the list would you like?";

pub struct AgentRuntime {
    blueprint: AgentBlueprint,
    tools: ToolRegistry,
    extractor: IntentExtractor,
    engine: JourneyEngine<PurchaseJourney>,
    llm: Option<Arc<dyn LlmClient>>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl AgentRuntime {
    pub fn new(blueprint: AgentBlueprint, inventory: Arc<dyn Inventory>) -> Self {
        let extractor = IntentExtractor::new(inventory.clone(), blueprint.glossary.clone());
        Self {
            blueprint,
            tools: ToolRegistry::bookstore(inventory),
            extractor,
            engine: JourneyEngine::default(),
            llm: None,
            audit: Arc::new(TracingAuditSink),
            clock: Arc::new(SystemClock),
        }
    }

    /// Bookstore agent over the built-in catalog, with an LLM client when the
    /// configured provider is not offline.
    pub fn bookstore(config: &AppConfig) -> Result<Self> {
        let runtime = Self::new(
            AgentBlueprint::bookstore(&config.agent),
            Arc::new(StaticInventory::new()),
        );
        match OpenAiCompatibleClient::from_config(&config.llm)? {
            Some(client) => Ok(runtime.with_llm(Arc::new(client))),
            None => Ok(runtime),
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn blueprint(&self) -> &AgentBlueprint {
        &self.blueprint
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn uses_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Invokes a tool outside of any conversation.
    pub async fn invoke_tool(&self, name: &str, input: Value) -> Result<ToolOutput> {
        let audit = AuditContext::new(None, Uuid::new_v4().to_string(), "direct");
        self.call_tool(&audit, name, input).await
    }

    pub async fn handle_message(&self, session: &mut Session, text: &str) -> Result<AgentReply> {
        let correlation_id = Uuid::new_v4().to_string();
        let audit = AuditContext::new(Some(session.id.clone()), correlation_id.clone(), "runtime");
        info!(
            event_name = "agent.message.received",
            session_id = %session.id,
            correlation_id = %correlation_id,
            journey_state = ?session.journey_state,
            "customer message received"
        );
        self.audit.emit(AuditEvent::new(
            &audit,
            "agent.message_received",
            AuditCategory::Ingress,
            AuditOutcome::Success,
        ));

        let intent = self.extractor.extract(text);
        let mut draft =
            TurnDraft::new(audit, session.journey_state, session.journey_context.clone());

        if intent.cancel && draft.state.is_active() {
            self.advance(&mut draft, JourneyEvent::CancelRequested).await?;
            draft.say(CANCELLED_REPLY);
        } else if draft.state.is_active() {
            self.continue_journey(&mut draft, &intent).await?;
        } else if starts_journey(&intent) {
            self.start_journey(&mut draft, &intent).await?;
        } else if intent.wants_alternatives && !intent.declines {
            self.recommend(&mut draft).await?;
        }

        self.apply_guidelines(&mut draft, &intent);
        if draft.lines.is_empty() {
            draft.say(if intent.closing { CLOSING_REPLY } else { GREETING_REPLY });
        }

        let composed = draft.lines.join("\n");
        let reply_text = self.polish(text, draft.instruction, composed).await;

        session.record(Speaker::Customer, text);
        session.journey_state = draft.state;
        session.journey_context = draft.context;
        session.record(Speaker::Agent, reply_text.clone());

        info!(
            event_name = "agent.message.answered",
            session_id = %session.id,
            correlation_id = %correlation_id,
            journey_state = ?session.journey_state,
            tool_calls = draft.tool_calls.len(),
            "agent reply ready"
        );

        Ok(AgentReply {
            text: reply_text,
            journey_state: session.journey_state,
            tool_calls: draft.tool_calls,
            matched_guidelines: draft.matched,
        })
    }

    async fn start_journey(&self, draft: &mut TurnDraft, intent: &CustomerIntent) -> Result<()> {
        draft.state = self.engine.initial_state();
        draft.context = JourneyContext::default();
        self.advance(draft, JourneyEvent::Activated).await?;
        if let Some(book) = &intent.selected_book {
            self.select(draft, book).await?;
        }
        Ok(())
    }

    async fn continue_journey(&self, draft: &mut TurnDraft, intent: &CustomerIntent) -> Result<()> {
        match draft.state {
            JourneyState::AwaitingSelection => match &intent.selected_book {
                Some(book) => self.select(draft, book).await,
                None => {
                    draft.say(PICK_A_BOOK_REPLY);
                    Ok(())
                }
            },
            JourneyState::ReportingStock => {
                if switches_book(&draft.context, intent) {
                    return self.reselect(draft, intent).await;
                }
                let title = draft.context.selected_title.clone().unwrap_or_default();
                let available = draft.context.stock.is_some_and(|stock| stock.is_available());
                if intent.declines {
                    self.advance(draft, JourneyEvent::CancelRequested).await?;
                    draft.say(CANCELLED_REPLY);
                } else if available && intent.wants_order {
                    self.advance(draft, JourneyEvent::OrderRequested).await?;
                } else if !available && (intent.wants_alternatives || intent.wants_order) {
                    self.advance(draft, JourneyEvent::AlternativesRequested).await?;
                } else if available {
                    draft.say(format!("Would you like me to place an order for '{title}'?"));
                } else {
                    draft.say(format!("Would you like some alternatives to '{title}'?"));
                }
                Ok(())
            }
            // Transient states only linger after a failed turn; start over.
            _ => self.start_journey(draft, intent).await,
        }
    }

    /// The purchase graph has no edge back to stock checking, so a new choice
    /// abandons the current journey and starts another for the named book.
    async fn reselect(&self, draft: &mut TurnDraft, intent: &CustomerIntent) -> Result<()> {
        self.advance(draft, JourneyEvent::CancelRequested).await?;
        self.start_journey(draft, intent).await?;

        let available = draft.context.stock.is_some_and(|stock| stock.is_available());
        if draft.state == JourneyState::ReportingStock
            && available
            && intent.wants_order
            && !intent.declines
        {
            self.advance(draft, JourneyEvent::OrderRequested).await?;
        }
        Ok(())
    }

    async fn select(&self, draft: &mut TurnDraft, book: &Book) -> Result<()> {
        draft.context.selected_title = Some(book.title.clone());
        draft.context.stock = None;
        self.advance(draft, JourneyEvent::BookSelected).await
    }

    /// Applies `event` and keeps running tool actions until the journey
    /// waits on the customer again.
    async fn advance(&self, draft: &mut TurnDraft, event: JourneyEvent) -> Result<()> {
        let mut pending = Some(event);
        while let Some(event) = pending.take() {
            let outcome = self
                .engine
                .apply_with_audit(
                    &draft.state,
                    &event,
                    &draft.context,
                    self.audit.as_ref(),
                    &draft.audit,
                )
                .map_err(DomainError::from)?;
            draft.state = outcome.to;
            for action in outcome.actions {
                match action {
                    JourneyAction::CallTool(tool) => {
                        pending = self.run_journey_tool(draft, tool).await?;
                    }
                    JourneyAction::Respond(directive) => respond(draft, directive),
                }
            }
        }
        Ok(())
    }

    async fn run_journey_tool(
        &self,
        draft: &mut TurnDraft,
        tool: ToolName,
    ) -> Result<Option<JourneyEvent>> {
        match tool {
            ToolName::ListAvailableBooks => {
                let output = self.record_tool(draft, tool, json!({})).await?;
                draft.listing = output.as_lines();
                Ok(Some(JourneyEvent::BooksListed))
            }
            ToolName::CheckStock => {
                let title = selected_title(&draft.context)?;
                let output = self.record_tool(draft, tool, json!({ "title": title })).await?;
                let text = output.as_text().ok_or_else(|| anyhow!("check_stock returned no text"))?;
                let stock = text.parse::<StockStatus>().map_err(|message| anyhow!(message))?;
                draft.context.stock = Some(stock);
                Ok(Some(JourneyEvent::StockReported))
            }
            ToolName::PlaceOrder => {
                let title = selected_title(&draft.context)?;
                let date = self.clock.today().format(ORDER_DATE_FORMAT).to_string();
                let output =
                    self.record_tool(draft, tool, json!({ "title": title, "date": date })).await?;
                draft.confirmation = output.as_text().map(str::to_string);
                Ok(Some(JourneyEvent::OrderPlaced))
            }
            ToolName::RecommendBooks => {
                let output = self.record_tool(draft, tool, json!({})).await?;
                say_recommendations(draft, &output);
                Ok(None)
            }
        }
    }

    async fn recommend(&self, draft: &mut TurnDraft) -> Result<()> {
        let output = self.record_tool(draft, ToolName::RecommendBooks, json!({})).await?;
        say_recommendations(draft, &output);
        Ok(())
    }

    async fn record_tool(
        &self,
        draft: &mut TurnDraft,
        tool: ToolName,
        input: Value,
    ) -> Result<ToolOutput> {
        let output = self.call_tool(&draft.audit, tool.as_str(), input.clone()).await?;
        draft.tool_calls.push(ToolCall {
            tool: tool.as_str().to_string(),
            input,
            output: output.data.clone(),
        });
        Ok(output)
    }

    async fn call_tool(
        &self,
        audit: &AuditContext,
        name: &str,
        input: Value,
    ) -> Result<ToolOutput> {
        let result = self.tools.invoke(name, input).await;
        let outcome = if result.is_ok() { AuditOutcome::Success } else { AuditOutcome::Failed };
        let mut event = AuditEvent::new(audit, "tool.invoked", AuditCategory::Tool, outcome)
            .with_metadata("tool", name);
        if let Err(error) = &result {
            event = event.with_metadata("error", error.to_string());
        }
        self.audit.emit(event);
        result
    }

    fn apply_guidelines(&self, draft: &mut TurnDraft, intent: &CustomerIntent) {
        let journey_spoke = !draft.lines.is_empty();
        for guideline in self.blueprint.guidelines.evaluate(intent) {
            let reply = match guideline.trigger.glossary_term() {
                Some(term) => {
                    self.blueprint.fact(term).map(|fact| fact_reply(guideline.trigger, fact))
                }
                None if journey_spoke => None,
                None => match guideline.trigger {
                    GuidelineTrigger::AmbiguousBookInterest => Some(CLARIFY_REPLY.to_string()),
                    _ => Some(OFF_TOPIC_REPLY.to_string()),
                },
            };
            let Some(reply) = reply else {
                continue;
            };

            self.audit.emit(
                AuditEvent::new(
                    &draft.audit,
                    "guideline.matched",
                    AuditCategory::Guideline,
                    AuditOutcome::Success,
                )
                .with_metadata("guideline_id", guideline.id.clone()),
            );
            if draft.instruction.is_none() {
                draft.instruction = guideline.action.clone();
            }
            draft.matched.push(guideline.id.clone());
            draft.say(reply);
        }
    }

    async fn polish(&self, message: &str, instruction: Option<String>, draft: String) -> String {
        let Some(llm) = &self.llm else {
            return draft;
        };
        match self.rephrase(llm.as_ref(), message, instruction.as_deref(), &draft).await {
            Ok(text) => text,
            Err(error) => {
                warn!(
                    event_name = "agent.llm.fallback",
                    error = %error,
                    "LLM rephrasing failed, replying with the scripted text"
                );
                draft
            }
        }
    }

    async fn rephrase(
        &self,
        llm: &dyn LlmClient,
        message: &str,
        instruction: Option<&str>,
        draft: &str,
    ) -> Result<String> {
        let system = render_system(&self.blueprint)?;
        let prompt = render_reply(message, instruction, draft)?;
        llm.complete(&system, &prompt).await.context("LLM rephrasing failed")
    }
}

struct TurnDraft {
    audit: AuditContext,
    state: JourneyState,
    context: JourneyContext,
    listing: Vec<String>,
    confirmation: Option<String>,
    lines: Vec<String>,
    instruction: Option<String>,
    tool_calls: Vec<ToolCall>,
    matched: Vec<String>,
}

impl TurnDraft {
    fn new(audit: AuditContext, state: JourneyState, context: JourneyContext) -> Self {
        Self {
            audit,
            state,
            context,
            listing: Vec::new(),
            confirmation: None,
            lines: Vec::new(),
            instruction: None,
            tool_calls: Vec::new(),
            matched: Vec::new(),
        }
    }

    fn say(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

fn starts_journey(intent: &CustomerIntent) -> bool {
    intent.wants_to_buy || (intent.selected_book.is_some() && intent.wants_order)
}

fn switches_book(context: &JourneyContext, intent: &CustomerIntent) -> bool {
    match (&intent.selected_book, context.selected_title.as_deref()) {
        (Some(book), Some(current)) => !book.title.eq_ignore_ascii_case(current.trim()),
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn selected_title(context: &JourneyContext) -> Result<String> {
    context.selected_title.clone().ok_or_else(|| anyhow!("no book selected"))
}

fn respond(draft: &mut TurnDraft, directive: ChatDirective) {
    draft.instruction = Some(directive.instruction().to_string());
    match directive {
        ChatDirective::ListBooksAndAskChoice => {
            let mut text = String::from("Here are the books we have available:");
            for line in &draft.listing {
                text.push_str("\n- ");
                text.push_str(line);
            }
            text.push_str("\nWhich one would you like?");
            draft.say(text);
        }
        ChatDirective::TellStockStatus => {
            let title = draft.context.selected_title.clone().unwrap_or_default();
            let line = match draft.context.stock {
                Some(stock) if stock.is_available() => {
                    format!("{title}: {stock}. Would you like me to place an order?")
                }
                Some(StockStatus::NotFound) | None => {
                    format!("I couldn't find '{title}' in our stock list. Would you like some alternatives?")
                }
                Some(stock) => format!("{title}: {stock}. Would you like some alternatives?"),
            };
            draft.say(line);
        }
        ChatDirective::ConfirmOrder => {
            let line = draft
                .confirmation
                .clone()
                .unwrap_or_else(|| "Your order has been placed.".to_string());
            draft.say(line);
        }
    }
}

fn say_recommendations(draft: &mut TurnDraft, output: &ToolOutput) {
    let mut text = String::from("Here are some books you might enjoy:");
    for line in output.as_lines() {
        text.push_str("\n- ");
        text.push_str(&line);
    }
    draft.say(text);
}

fn fact_reply(trigger: GuidelineTrigger, fact: &str) -> String {
    let fact = fact.trim_end_matches('.');
    match trigger {
        GuidelineTrigger::StaffRequest => {
            format!("To speak with a staff member, please call the store. {fact}.")
        }
        _ => format!("{fact}."),
    }
}
