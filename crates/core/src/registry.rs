use molder_types::{VarType, VarValue};
use std::collections::HashMap;

/// A declared variable. `value` is `None` until something is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub var_type: VarType,
    pub value: Option<VarValue>,
}

impl Variable {
    pub fn new(var_type: VarType, value: Option<VarValue>) -> Self {
        Self { var_type, value }
    }
}

/// Strips an addressing suffix from `name`: everything from the first `.`,
/// then everything from the first `[`. A metacharacter in the first position
/// is kept as part of the name.
pub fn normalize_name(name: &str) -> &str {
    let name = match name.find('.') {
        Some(i) if i > 0 => &name[..i],
        _ => name,
    };
    match name.find('[') {
        Some(i) if i > 0 => &name[..i],
        _ => name,
    }
}

#[derive(Debug, Default, Clone)]
pub struct VariableRegistry {
    variables: HashMap<String, Variable>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Declares or replaces the variable `name` normalizes to.
    pub fn set(&mut self, name: &str, var_type: VarType, value: Option<VarValue>) {
        let key = normalize_name(name);
        match &value {
            Some(v) => log::debug!("Variable '{}' ({}) set to \"{}\"", key, var_type, v),
            None => log::debug!("Variable '{}' ({}) declared without a value", key, var_type),
        }
        self.variables
            .insert(key.to_string(), Variable::new(var_type, value));
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(normalize_name(name))
    }

    /// Looks up an already-parsed key without normalizing it again.
    pub(crate) fn get_key(&self, key: &str) -> Option<&Variable> {
        self.variables.get(key)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }
}
