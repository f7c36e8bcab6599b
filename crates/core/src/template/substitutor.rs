use super::scanner::{Grammar, TemplateToken, scan_references};
use crate::error::ResolveError;
use crate::resolver::Resolver;
use molder_types::VarValue;

type FoundFn<'a> = Box<dyn Fn(Option<&VarValue>) -> String + 'a>;
type NotFoundFn<'a> = Box<dyn Fn(&str) -> String + 'a>;

/// Rewrites template text by replacing tokens with resolved values.
///
/// Replacement is a single left-to-right pass over the original text, so
/// substituted values are never scanned again.
pub struct Substitutor<'a> {
    resolver: Resolver<'a>,
    grammar: Grammar,
    on_found: Option<FoundFn<'a>>,
    on_not_found: Option<NotFoundFn<'a>>,
}

impl<'a> Substitutor<'a> {
    pub fn new(resolver: Resolver<'a>, grammar: Grammar) -> Self {
        Self {
            resolver,
            grammar,
            on_found: None,
            on_not_found: None,
        }
    }

    /// Formats references to declared variables. The value is `None` when the
    /// variable exists but the full reference selects nothing. Without it,
    /// values use their `Display` form and `None` renders as empty text.
    pub fn on_found(mut self, f: impl Fn(Option<&VarValue>) -> String + 'a) -> Self {
        self.on_found = Some(Box::new(f));
        self
    }

    /// Formats references whose variable is not declared. Without it, the raw
    /// reference text is emitted.
    pub fn on_not_found(mut self, f: impl Fn(&str) -> String + 'a) -> Self {
        self.on_not_found = Some(Box::new(f));
        self
    }

    pub fn render(&self, text: &str) -> Result<String, ResolveError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for token in scan_references(text, self.grammar) {
            out.push_str(&text[last..token.span.start]);
            out.push_str(&self.replacement(&token)?);
            last = token.span.end;
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    fn replacement(&self, token: &TemplateToken<'_>) -> Result<String, ResolveError> {
        let reference = token.reference;
        if token.is_escape() {
            return Ok(reference.to_string());
        }
        if !self.resolver.registry().contains(reference) {
            log::trace!("Token '{}' has no declared variable", reference);
            return Ok(match &self.on_not_found {
                Some(f) => f(reference),
                None => reference.to_string(),
            });
        }
        let resolved = self.resolver.resolve(reference)?;
        log::trace!("Token '{}' resolved: {}", reference, resolved.is_some());
        Ok(match &self.on_found {
            Some(f) => f(resolved.as_ref()),
            None => resolved.map(|value| value.to_string()).unwrap_or_default(),
        })
    }
}
