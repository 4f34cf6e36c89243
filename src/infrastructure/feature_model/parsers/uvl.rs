//! UVL (Universal Variability Language) feature model parser
//!
//! Supports the boolean core of UVL: the `namespace`, `include`, `features`
//! and `constraints` sections, feature attributes (only `abstract` is
//! interpreted), the `mandatory`/`optional`/`or`/`alternative` group keywords,
//! group cardinalities and propositional constraints. Imports, typed
//! attributes in constraints and arithmetic expressions are rejected.

use crate::domain::feature_model::{
    Constraint, Feature, FeatureModel, FeatureModelParser, Formula, ModelFormat, ModelInput,
    Relation, RelationKind, MAX_NESTING_DEPTH,
};
use crate::domain::DomainError;

const TAB_WIDTH: usize = 4;
const FEATURE_TYPES: [&str; 4] = ["Boolean", "Integer", "Real", "String"];

/// A significant (non-blank) line of the source
#[derive(Debug, Clone)]
struct Line<'a> {
    number: usize,
    indent: usize,
    content: &'a str,
}

/// Parser for `.uvl` models
#[derive(Debug, Clone, Default)]
pub struct UvlParser;

impl UvlParser {
    pub fn new() -> Self {
        Self
    }
}

impl FeatureModelParser for UvlParser {
    fn format(&self) -> ModelFormat {
        ModelFormat::Uvl
    }

    fn parse(&self, input: &ModelInput) -> Result<FeatureModel, DomainError> {
        Document::new(&input.source).parse(&input.content)
    }
}

struct Document<'s> {
    source: &'s str,
}

impl<'s> Document<'s> {
    fn new(source: &'s str) -> Self {
        Self { source }
    }

    fn error(&self, line: usize, message: impl std::fmt::Display) -> DomainError {
        DomainError::format(self.source, format!("line {}: {}", line, message))
    }

    fn parse(&self, content: &str) -> Result<FeatureModel, DomainError> {
        let lines = significant_lines(content);
        let mut root = None;
        let mut constraints = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = &lines[i];

            if line.indent != 0 {
                return Err(self.error(line.number, "unexpected indentation"));
            }

            let keyword = line.content.split_whitespace().next().unwrap_or_default();
            let section_end = lines[i + 1..]
                .iter()
                .position(|l| l.indent == 0)
                .map_or(lines.len(), |p| i + 1 + p);
            let body = &lines[i + 1..section_end];

            match keyword {
                "namespace" | "include" => {}
                "imports" => {
                    if !body.is_empty() {
                        return Err(self.error(line.number, "imports are not supported"));
                    }
                }
                "features" => {
                    if root.is_some() {
                        return Err(self.error(line.number, "duplicate features section"));
                    }
                    root = Some(self.parse_features(line, body)?);
                }
                "constraints" => {
                    for constraint in body {
                        let formula = self.parse_constraint(constraint)?;
                        constraints.push(Constraint::new(formula));
                    }
                }
                other => {
                    return Err(self.error(line.number, format!("unknown section '{}'", other)));
                }
            }

            i = section_end;
        }

        let root = root.ok_or_else(|| DomainError::format(self.source, "missing features section"))?;

        Ok(FeatureModel::new(root).with_constraints(constraints))
    }

    fn parse_features(&self, header: &Line<'_>, body: &[Line<'_>]) -> Result<Feature, DomainError> {
        let first = body
            .first()
            .ok_or_else(|| self.error(header.number, "features section has no root feature"))?;

        let mut i = 0;
        let root = self.parse_feature(body, &mut i, first.indent, 1)?;

        if let Some(extra) = body.get(i) {
            return Err(self.error(extra.number, "only one root feature is allowed"));
        }

        Ok(root)
    }

    /// Parse the feature at `lines[*i]` together with its subtree
    fn parse_feature(
        &self,
        lines: &[Line<'_>],
        i: &mut usize,
        indent: usize,
        depth: usize,
    ) -> Result<Feature, DomainError> {
        let line = &lines[*i];
        if depth > MAX_NESTING_DEPTH {
            return Err(self.error(line.number, too_deep()));
        }

        let mut feature = self.parse_feature_line(line)?;
        *i += 1;

        let mut group_indent = None;

        while let Some(group_line) = lines.get(*i).filter(|l| l.indent > indent) {
            match group_indent {
                None => group_indent = Some(group_line.indent),
                Some(expected) if expected != group_line.indent => {
                    return Err(self.error(group_line.number, "inconsistent indentation"));
                }
                Some(_) => {}
            }

            let kind = self.parse_group_keyword(group_line)?;
            *i += 1;

            let mut children = Vec::new();
            let mut child_indent = None;

            while let Some(child_line) = lines.get(*i).filter(|l| l.indent > group_line.indent) {
                match child_indent {
                    None => child_indent = Some(child_line.indent),
                    Some(expected) if expected != child_line.indent => {
                        return Err(self.error(child_line.number, "inconsistent indentation"));
                    }
                    Some(_) => {}
                }

                children.push(self.parse_feature(lines, i, child_line.indent, depth + 1)?);
            }

            if children.is_empty() {
                return Err(self.error(group_line.number, "group without features"));
            }

            match kind {
                RelationKind::Mandatory => {
                    for child in children {
                        feature = feature.with_relation(Relation::mandatory(child));
                    }
                }
                RelationKind::Optional => {
                    for child in children {
                        feature = feature.with_relation(Relation::optional(child));
                    }
                }
                group => feature = feature.with_relation(Relation::group(group, children)),
            }
        }

        Ok(feature)
    }

    fn parse_group_keyword(&self, line: &Line<'_>) -> Result<RelationKind, DomainError> {
        match line.content {
            "mandatory" => Ok(RelationKind::Mandatory),
            "optional" => Ok(RelationKind::Optional),
            "or" => Ok(RelationKind::Or),
            "alternative" => Ok(RelationKind::Alternative),
            text if text.starts_with('[') && text.ends_with(']') => {
                let (min, max) = self.parse_cardinality(line.number, &text[1..text.len() - 1])?;
                Ok(RelationKind::Cardinality { min, max })
            }
            other => Err(self.error(
                line.number,
                format!("expected a group keyword, found '{}'", other),
            )),
        }
    }

    fn parse_cardinality(&self, line: usize, text: &str) -> Result<(usize, usize), DomainError> {
        let bound = |value: &str| -> Result<usize, DomainError> {
            match value.trim() {
                "*" => Ok(usize::MAX),
                value => value
                    .parse()
                    .map_err(|_| self.error(line, format!("invalid cardinality '[{}]'", text))),
            }
        };

        match text.split_once("..") {
            Some((min, max)) => {
                let min = bound(min)?;
                if min == usize::MAX {
                    return Err(self.error(line, format!("invalid cardinality '[{}]'", text)));
                }
                Ok((min, bound(max)?))
            }
            None => {
                let exact = bound(text)?;
                if exact == usize::MAX {
                    Ok((0, usize::MAX))
                } else {
                    Ok((exact, exact))
                }
            }
        }
    }

    fn parse_feature_line(&self, line: &Line<'_>) -> Result<Feature, DomainError> {
        let mut rest = line.content;

        if let Some((first, tail)) = rest.split_once(char::is_whitespace) {
            if FEATURE_TYPES.contains(&first) {
                rest = tail.trim_start();
            }
        }

        let (name, tail, quoted) = if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted
                .find('"')
                .ok_or_else(|| self.error(line.number, "unterminated feature name"))?;
            (&quoted[..end], &quoted[end + 1..], true)
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '{')
                .unwrap_or(rest.len());
            (&rest[..end], &rest[end..], false)
        };

        if name.is_empty() {
            return Err(self.error(line.number, "feature without a name"));
        }

        if !quoted && is_keyword(name) {
            return Err(self.error(line.number, format!("expected a feature, found '{}'", name)));
        }

        let tail = tail.trim();
        let mut feature = Feature::new(name);

        if tail.starts_with("cardinality") {
            return Err(self.error(line.number, "feature cardinalities are not supported"));
        }

        if !tail.is_empty() {
            let attributes = tail
                .strip_prefix('{')
                .and_then(|t| t.strip_suffix('}'))
                .ok_or_else(|| {
                    self.error(line.number, format!("unexpected '{}' after feature name", tail))
                })?;

            feature = feature.with_abstract(is_abstract(attributes));
        }

        Ok(feature)
    }

    fn parse_constraint(&self, line: &Line<'_>) -> Result<Formula, DomainError> {
        let tokens = tokenize(line.content).map_err(|e| self.error(line.number, e))?;
        let mut parser = FormulaParser {
            tokens,
            pos: 0,
            depth: 0,
        };

        let formula = parser.iff().map_err(|e| self.error(line.number, e))?;

        if parser.pos != parser.tokens.len() {
            return Err(self.error(line.number, "unexpected trailing tokens in constraint"));
        }

        Ok(formula)
    }
}

fn significant_lines(content: &str) -> Vec<Line<'_>> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let content = strip_comment(raw).trim_end();
            let trimmed = content.trim_start();

            if trimmed.is_empty() {
                return None;
            }

            let indent = content[..content.len() - trimmed.len()]
                .chars()
                .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
                .sum();

            Some(Line {
                number: index + 1,
                indent,
                content: trimmed,
            })
        })
        .collect()
}

/// Drop a trailing `//` comment that is not inside a quoted name
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let bytes = line.as_bytes();

    for (index, byte) in bytes.iter().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b'/' if !in_quotes && bytes.get(index + 1) == Some(&b'/') => return &line[..index],
            _ => {}
        }
    }

    line
}

fn too_deep() -> String {
    format!("model nesting exceeds {} levels", MAX_NESTING_DEPTH)
}

fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "mandatory" | "optional" | "or" | "alternative" | "features" | "constraints"
    )
}

/// Whether an attribute list (`abstract, key 'v'`) marks the feature abstract
fn is_abstract(attributes: &str) -> bool {
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0;
    let mut entries = Vec::new();

    for (index, c) in attributes.char_indices() {
        match c {
            '\'' | '"' => in_quotes = !in_quotes,
            '{' | '[' if !in_quotes => depth += 1,
            '}' | ']' if !in_quotes => depth = depth.saturating_sub(1),
            ',' if !in_quotes && depth == 0 => {
                entries.push(&attributes[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    entries.push(&attributes[start..]);

    entries.iter().any(|entry| {
        let mut words = entry.split_whitespace();
        words.next() == Some("abstract") && matches!(words.next(), None | Some("true"))
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Name(String),
    Not,
    And,
    Or,
    Implies,
    Iff,
    Open,
    Close,
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '!' => tokens.push(Token::Not),
            '&' => tokens.push(Token::And),
            '|' => tokens.push(Token::Or),
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            '=' if text[index..].starts_with("=>") => {
                chars.next();
                tokens.push(Token::Implies);
            }
            '<' if text[index..].starts_with("<=>") => {
                chars.next();
                chars.next();
                tokens.push(Token::Iff);
            }
            '"' => {
                let rest = &text[index + 1..];
                let end = rest
                    .find('"')
                    .ok_or_else(|| "unterminated quoted name".to_string())?;
                tokens.push(Token::Name(rest[..end].to_string()));
                for _ in 0..=rest[..end].chars().count() {
                    chars.next();
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = index + c.len_utf8();
                while let Some(&(next_index, next)) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' || next == '.' {
                        end = next_index + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Name(text[index..end].to_string()));
            }
            '+' | '-' | '*' | '/' | '<' | '>' | '=' => {
                return Err("arithmetic constraints are not supported".to_string());
            }
            c if c.is_ascii_digit() => {
                return Err("arithmetic constraints are not supported".to_string());
            }
            other => return Err(format!("unexpected character '{}' in constraint", other)),
        }
    }

    if tokens.is_empty() {
        return Err("empty constraint".to_string());
    }

    Ok(tokens)
}

/// Precedence climbing: `<=>` < `=>` < `|` < `&` < `!`
///
/// `depth` bounds both the recursion and the height of the built formula;
/// every chained binary operator nests its left operand one level deeper.
struct FormulaParser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl FormulaParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn descend(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(too_deep());
        }
        Ok(())
    }

    fn iff(&mut self) -> Result<Formula, String> {
        let depth = self.depth;
        let mut left = self.implies()?;
        while self.eat(&Token::Iff) {
            self.descend()?;
            left = Formula::iff(left, self.implies()?);
        }
        self.depth = depth;
        Ok(left)
    }

    fn implies(&mut self) -> Result<Formula, String> {
        let left = self.or()?;
        if self.eat(&Token::Implies) {
            self.descend()?;
            let right = self.implies()?;
            self.depth -= 1;
            return Ok(Formula::implies(left, right));
        }
        Ok(left)
    }

    fn or(&mut self) -> Result<Formula, String> {
        let depth = self.depth;
        let mut left = self.and()?;
        while self.eat(&Token::Or) {
            self.descend()?;
            left = Formula::or(left, self.and()?);
        }
        self.depth = depth;
        Ok(left)
    }

    fn and(&mut self) -> Result<Formula, String> {
        let depth = self.depth;
        let mut left = self.unary()?;
        while self.eat(&Token::And) {
            self.descend()?;
            left = Formula::and(left, self.unary()?);
        }
        self.depth = depth;
        Ok(left)
    }

    fn unary(&mut self) -> Result<Formula, String> {
        if self.eat(&Token::Not) {
            self.descend()?;
            let inner = self.unary()?;
            self.depth -= 1;
            return Ok(Formula::not(inner));
        }

        if self.eat(&Token::Open) {
            self.descend()?;
            let inner = self.iff()?;
            if !self.eat(&Token::Close) {
                return Err("missing ')' in constraint".to_string());
            }
            self.depth -= 1;
            return Ok(inner);
        }

        match self.tokens.get(self.pos).cloned() {
            Some(Token::Name(name)) => {
                self.pos += 1;
                Ok(Formula::var(name))
            }
            Some(other) => Err(format!("unexpected {:?} in constraint", other)),
            None => Err("incomplete constraint".to_string()),
        }
    }
}
