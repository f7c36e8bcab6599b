use crate::config::ContextConfig;
use crate::error::ResolveError;
use crate::registry::{Variable, VariableRegistry};
use crate::resolver::Resolver;
use crate::template::{Grammar, Substitutor, scan_references};
use itertools::Itertools;
use molder_types::{JsonNode, Scalar, VarType, VarValue};
use serde_json::Value;

/// The variables of one test-execution context.
///
/// Each execution context owns its own instance. Nothing here is global, and
/// stored JSON and XML trees are never modified by lookups.
#[derive(Debug, Default, Clone)]
pub struct VariableContext {
    registry: VariableRegistry,
    config: ContextConfig,
}

impl VariableContext {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(config: ContextConfig) -> Self {
        Self {
            registry: VariableRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.registry, &self.config)
    }

    /// Declares `name` (addressing suffixes stripped) with `var_type`, replacing
    /// any previous declaration. Pass `None` to declare without a value.
    pub fn set_variable(
        &mut self,
        name: &str,
        var_type: VarType,
        value: impl Into<Option<VarValue>>,
    ) {
        self.registry.set(name, var_type, value.into());
    }

    pub fn get_variable(&self, name: &str) -> Option<&Variable> {
        self.registry.get(name)
    }

    pub fn get_variable_value(&self, reference: &str) -> Result<Option<VarValue>, ResolveError> {
        self.resolver().resolve(reference)
    }

    pub fn get_variable_value_text(&self, reference: &str) -> Result<Option<String>, ResolveError> {
        self.resolver().resolve_text(reference)
    }

    /// A substitutor for `grammar`, to be configured with callbacks.
    pub fn substitutor(&self, grammar: Grammar) -> Substitutor<'_> {
        Substitutor::new(self.resolver(), grammar)
    }

    /// Replaces `{reference}` tokens.
    pub fn substitute_xml(&self, text: &str) -> Result<String, ResolveError> {
        self.substitutor(Grammar::Xml).render(text)
    }

    /// Replaces `@identifier` tokens.
    pub fn substitute_json(&self, text: &str) -> Result<String, ResolveError> {
        self.substitutor(Grammar::Json).render(text)
    }

    /// Declares each pair with a type inferred from its JSON value.
    pub fn seed<I, K>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        for (name, value) in pairs {
            let (var_type, value) = seed_entry(value);
            self.registry.set(name.as_ref(), var_type, value);
        }
    }

    /// References in `text` whose variable is not declared, first occurrence
    /// order, without duplicates. Escapes are not reported.
    pub fn unresolved(&self, text: &str, grammar: Grammar) -> Vec<String> {
        scan_references(text, grammar)
            .into_iter()
            .filter(|token| !token.is_escape() && !self.registry.contains(token.reference))
            .map(|token| token.reference.to_string())
            .unique()
            .collect()
    }
}

pub(crate) fn seed_entry(value: Value) -> (VarType, Option<VarValue>) {
    let var_type = VarType::infer(&value);
    let value = match value {
        Value::Null => None,
        Value::Object(_) | Value::Array(_) => Some(VarValue::Json(JsonNode::new(value))),
        scalar => Scalar::from_json(&scalar).map(VarValue::Scalar),
    };
    (var_type, value)
}
