use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bookstore_core::domain::order::ORDER_DATE_FORMAT;
use bookstore_core::inventory::Inventory;
use bookstore_core::journey::ToolName;
use bookstore_core::DomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Structured data a tool hands back to the conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub data: Value,
}

impl ToolOutput {
    pub fn new(data: impl Into<Value>) -> Self {
        Self { data: data.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        self.data.as_str()
    }

    pub fn as_lines(&self) -> Vec<String> {
        match &self.data {
            Value::Array(items) => {
                items.iter().filter_map(|item| item.as_str().map(str::to_string)).collect()
            }
            Value::String(text) => vec![text.clone()],
            _ => Vec::new(),
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {}, "required": [] })
    }
    async fn execute(&self, input: Value) -> Result<ToolOutput>;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry holding the four bookstore tools backed by one inventory.
    pub fn bookstore(inventory: Arc<dyn Inventory>) -> Self {
        let mut registry = Self::default();
        registry.register(ListAvailableBooks::new(inventory.clone()));
        registry.register(CheckStock::new(inventory.clone()));
        registry.register(RecommendBooks::new(inventory.clone()));
        registry.register(PlaceOrder::new(inventory));
        registry
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names = self.tools.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.names()
            .into_iter()
            .filter_map(|name| self.get(name))
            .map(|tool| ToolDescriptor {
                name: tool.name(),
                description: tool.description(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    pub async fn invoke(&self, name: &str, input: Value) -> Result<ToolOutput> {
        let tool = self.get(name).ok_or_else(|| DomainError::UnknownTool(name.to_string()))?;
        debug!(event_name = "agent.tool.invoke", tool = name, "invoking tool");
        tool.execute(input).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

pub struct ListAvailableBooks {
    inventory: Arc<dyn Inventory>,
}

impl ListAvailableBooks {
    pub fn new(inventory: Arc<dyn Inventory>) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl Tool for ListAvailableBooks {
    fn name(&self) -> &'static str {
        ToolName::ListAvailableBooks.as_str()
    }

    fn description(&self) -> &'static str {
        "List the books currently carried by the store"
    }

    async fn execute(&self, _input: Value) -> Result<ToolOutput> {
        let books =
            self.inventory.available_books().iter().map(ToString::to_string).collect::<Vec<_>>();
        Ok(ToolOutput::new(books))
    }
}

pub struct CheckStock {
    inventory: Arc<dyn Inventory>,
}

impl CheckStock {
    pub fn new(inventory: Arc<dyn Inventory>) -> Self {
        Self { inventory }
    }
}

#[derive(Debug, Deserialize)]
struct TitleInput {
    title: String,
}

#[async_trait]
impl Tool for CheckStock {
    fn name(&self) -> &'static str {
        ToolName::CheckStock.as_str()
    }

    fn description(&self) -> &'static str {
        "Report the stock status of a book title"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "title": { "type": "string" } },
            "required": ["title"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput> {
        let TitleInput { title } = parse_input(self.name(), input)?;
        Ok(ToolOutput::new(self.inventory.check_stock(&title).to_string()))
    }
}

pub struct RecommendBooks {
    inventory: Arc<dyn Inventory>,
}

impl RecommendBooks {
    pub fn new(inventory: Arc<dyn Inventory>) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl Tool for RecommendBooks {
    fn name(&self) -> &'static str {
        ToolName::RecommendBooks.as_str()
    }

    fn description(&self) -> &'static str {
        "Suggest alternative books"
    }

    async fn execute(&self, _input: Value) -> Result<ToolOutput> {
        let books =
            self.inventory.recommendations().iter().map(ToString::to_string).collect::<Vec<_>>();
        Ok(ToolOutput::new(books))
    }
}

pub struct PlaceOrder {
    inventory: Arc<dyn Inventory>,
}

impl PlaceOrder {
    pub fn new(inventory: Arc<dyn Inventory>) -> Self {
        Self { inventory }
    }
}

#[derive(Debug, Deserialize)]
struct OrderInput {
    title: String,
    date: String,
}

#[async_trait]
impl Tool for PlaceOrder {
    fn name(&self) -> &'static str {
        ToolName::PlaceOrder.as_str()
    }

    fn description(&self) -> &'static str {
        "Place an order for a book on the given date"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "date": { "type": "string", "format": "date" }
            },
            "required": ["title", "date"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput> {
        let OrderInput { title, date } = parse_input(self.name(), input)?;
        let date = parse_order_date(self.name(), &date)?;
        let confirmation = self.inventory.place_order(&title, date)?;
        Ok(ToolOutput::new(confirmation.message))
    }
}

fn parse_input<T>(tool: &str, input: Value) -> Result<T, DomainError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(input).map_err(|error| DomainError::InvalidToolInput {
        tool: tool.to_string(),
        message: error.to_string(),
    })
}

/// Accepts a bare `YYYY-MM-DD` date or an RFC 3339 timestamp.
fn parse_order_date(tool: &str, raw: &str) -> Result<NaiveDate, DomainError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, ORDER_DATE_FORMAT)
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(raw).map(|moment| moment.date_naive()))
        .map_err(|_| DomainError::InvalidToolInput {
            tool: tool.to_string(),
            message: format!("`{raw}` is not a YYYY-MM-DD date"),
        })
}
