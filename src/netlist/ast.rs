use super::{ComponentKind, ParseError, Symbol};

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Statement {
    pub kind: ComponentKind,
    pub name: Symbol,
    pub inputs: Vec<Symbol>,
    pub line: usize,
}

/// Split the input into statements, one per non-blank, non-comment line.
pub fn scan(input: &str) -> Result<Vec<Statement>, ParseError> {
    let mut statements = Vec::new();

    for (n, raw) in input.lines().enumerate() {
        let line = n + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let mut tokens = text.split_whitespace();
        let (kind, name) = match (tokens.next(), tokens.next()) {
            (Some(kind), Some(name)) => (ComponentKind::from_token(kind), Symbol::from(name)),
            _ => {
                return Err(ParseError::MalformedLine {
                    line,
                    text: text.to_string(),
                });
            }
        };

        statements.push(Statement {
            kind,
            name,
            inputs: tokens.map(Symbol::from).collect(),
            line,
        });
    }

    Ok(statements)
}
