use std::ops::Range;

/// Token grammar of a template body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grammar {
    /// `{` + any characters except `}` + `}`.
    #[default]
    Xml,
    /// `@` + one character other than `.` or a newline + one or more word characters.
    Json,
}

/// A reference found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateToken<'t> {
    /// The text between the delimiters.
    pub reference: &'t str,
    /// Byte range of the whole token, delimiters included.
    pub span: Range<usize>,
}

impl TemplateToken<'_> {
    /// Escapes are passed through instead of being resolved.
    pub fn is_escape(&self) -> bool {
        self.reference.is_empty() || self.reference.starts_with('(')
    }
}

/// Lists tokens left to right. Tokens never overlap.
pub fn scan_references(text: &str, grammar: Grammar) -> Vec<TemplateToken<'_>> {
    match grammar {
        Grammar::Xml => scan_braces(text),
        Grammar::Json => scan_at_signs(text),
    }
}

fn scan_braces(text: &str) -> Vec<TemplateToken<'_>> {
    let mut tokens = Vec::new();
    let mut from = 0;
    while let Some(open) = text[from..].find('{').map(|i| from + i) {
        // Without a closing brace nothing further can match.
        let Some(close) = text[open + 1..].find('}').map(|i| open + 1 + i) else {
            break;
        };
        tokens.push(TemplateToken {
            reference: &text[open + 1..close],
            span: open..close + 1,
        });
        from = close + 1;
    }
    tokens
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn scan_at_signs(text: &str) -> Vec<TemplateToken<'_>> {
    let mut tokens = Vec::new();
    let mut from = 0;
    while let Some(at) = text[from..].find('@').map(|i| from + i) {
        let start = at + 1;
        let mut chars = text[start..].char_indices();
        let lead = chars.next().filter(|(_, c)| *c != '.' && *c != '\n');
        let end = lead.map(|_| {
            chars
                .take_while(|(_, c)| is_word_char(*c))
                .last()
                .map(|(i, c)| start + i + c.len_utf8())
        });
        match end {
            Some(Some(end)) => {
                tokens.push(TemplateToken {
                    reference: &text[start..end],
                    span: at..end,
                });
                from = end;
            }
            _ => from = start,
        }
    }
    tokens
}
