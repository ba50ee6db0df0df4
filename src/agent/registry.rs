//! Tool registry: the set of tools offered to the model plus the sources
//! collected while executing them.

use super::provider::{ToolDefinition, ToolInvocation};
use super::tools::{Source, Tool, ToolCall};
use crate::error::{Result, SyllabusError};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Registered tools keyed by name, with a per-turn source accumulator.
///
/// Tools are shared between forks; sources are not. Fork the registry for
/// every query so concurrent turns never see each other's sources.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<(String, Arc<dyn Tool>)>,
    sources: Vec<Source>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under the name from its definition, replacing any
    /// tool already registered under that name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        match self.tools.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = tool,
            None => self.tools.push((name, tool)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Definitions of every registered tool, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|(_, tool)| tool.definition()).collect()
    }

    /// Execute one invocation and record its sources.
    #[instrument(skip(self, invocation), fields(tool = %invocation.name))]
    pub async fn dispatch(&mut self, invocation: &ToolInvocation) -> Result<String> {
        let tool = self
            .tools
            .iter()
            .find(|(name, _)| *name == invocation.name)
            .map(|(_, tool)| tool.clone())
            .ok_or_else(|| SyllabusError::UnknownTool(invocation.name.clone()))?;

        let call = ToolCall::parse(&invocation.name, &invocation.arguments)?;
        let output = tool.execute(&call).await?;

        debug!("Tool returned {} sources", output.sources.len());
        self.sources.extend(output.sources);
        Ok(output.text)
    }

    /// Sources recorded since the last reset.
    pub fn collected_sources(&self) -> &[Source] {
        &self.sources
    }

    /// Drain the recorded sources.
    pub fn take_sources(&mut self) -> Vec<Source> {
        std::mem::take(&mut self.sources)
    }

    pub fn reset_sources(&mut self) {
        self.sources.clear();
    }

    /// A registry sharing these tools with an empty source accumulator.
    pub fn fork(&self) -> Self {
        Self {
            tools: self.tools.clone(),
            sources: Vec::new(),
        }
    }
}
