use crate::config::ContextConfig;
use crate::context::{VariableContext, seed_entry};
use molder_types::{VarType, VarValue};
use serde_json::Value;

/// A builder for creating a `VariableContext`.
#[derive(Debug, Default)]
pub struct ContextBuilder {
    config: ContextConfig,
    variables: Vec<(String, VarType, Option<VarValue>)>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_json_marker_len(mut self, len: usize) -> Self {
        self.config.json_marker_len = len;
        self
    }

    /// Queues configuration pairs; see [`VariableContext::seed`].
    pub fn with_seed<I, K>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (name, value) in pairs {
            let (var_type, value) = seed_entry(value);
            self.variables.push((name.into(), var_type, value));
        }
        self
    }

    pub fn with_variable(
        mut self,
        name: impl Into<String>,
        var_type: VarType,
        value: impl Into<Option<VarValue>>,
    ) -> Self {
        self.variables.push((name.into(), var_type, value.into()));
        self
    }

    /// Registers queued variables in order, so later entries win.
    pub fn build(self) -> VariableContext {
        let mut context = VariableContext::with_config(self.config);
        for (name, var_type, value) in self.variables {
            context.set_variable(&name, var_type, value);
        }
        context
    }
}
