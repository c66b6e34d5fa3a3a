use crate::Grammar;

use super::{grammar::GrammarBuilder, GrammarError};

impl Grammar {
    /// Reads rules written as `A=alt/alt/...`, one left side per line.
    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut builder = GrammarBuilder::default();

        for (i, line) in grammar.lines().enumerate() {
            let number = i + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split('=').collect();
            if parts.len() > 2 {
                return Err(GrammarError::TooManySeparators { line: number });
            } else if parts.len() < 2 {
                return Err(GrammarError::MissingSeparator { line: number });
            }

            let left: Vec<char> = parts[0].chars().filter(|c| !c.is_whitespace()).collect();
            let left = match left.as_slice() {
                [c] => *c,
                _ => {
                    return Err(GrammarError::InvalidLeftSide {
                        line: number,
                        left: parts[0].trim().to_string(),
                    })
                }
            };

            builder.add_rule(number, left, parts[1].split('/'))?;
        }

        builder.build()
    }
}
