//! Stylesheet model on top of `cssparser`.
//!
//! Only the shape needed to find sprite rectangles is kept: the rule kind,
//! the selector list split on top-level commas, and the raw text of every
//! declaration in source order.

use cssparser::{
    AtRuleParser, BasicParseErrorKind, CowRcStr, DeclarationParser, ParseError, Parser,
    ParserInput, ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
    StyleSheetParser,
};

use crate::error::CssParseError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleKind {
    Qualified,
    At,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub property: String,
    /// Raw value text, without a trailing `!important`.
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub kind: RuleKind,
    /// Name of an at-rule, without the `@`.
    pub at_name: Option<String>,
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

impl Rule {
    /// A qualified rule with a single selector.
    pub fn qualified(selector: &str, declarations: Vec<Declaration>) -> Self {
        Self {
            kind: RuleKind::Qualified,
            at_name: None,
            selectors: vec![Selector {
                value: selector.to_string(),
            }],
            declarations,
        }
    }

    /// First selector text, or the at-rule name for at-rules.
    pub fn label(&self) -> String {
        match (self.selectors.first(), &self.at_name) {
            (Some(selector), _) => selector.value.clone(),
            (None, Some(name)) => format!("@{}", name),
            (None, None) => String::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

fn split_important_tail(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    if let Some(pos) = trimmed.rfind("!important")
        && trimmed[pos + "!important".len()..].trim().is_empty()
    {
        return (trimmed[..pos].trim_end().to_string(), true);
    }
    (trimmed.to_string(), false)
}

/// Collects the declarations of a block, skipping anything else.
struct BlockParser;

impl<'i> DeclarationParser<'i> for BlockParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _declaration_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let (value, important) = split_important_tail(input.slice_from(start));
        Ok(Declaration {
            property: name.to_ascii_lowercase(),
            value,
            important,
        })
    }
}

impl<'i> AtRuleParser<'i> for BlockParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for BlockParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for BlockParser {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

fn parse_block_declarations(block: &mut Parser) -> Vec<Declaration> {
    let mut body = BlockParser;
    RuleBodyParser::new(block, &mut body)
        .filter_map(Result::ok)
        .collect()
}

struct TopLevelParser;

impl<'i> AtRuleParser<'i> for TopLevelParser {
    type Prelude = String;
    type AtRule = Rule;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        while input.next_including_whitespace_and_comments().is_ok() {}
        Ok(name.to_ascii_lowercase())
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        Ok(Rule {
            kind: RuleKind::At,
            at_name: Some(prelude),
            selectors: Vec::new(),
            declarations: Vec::new(),
        })
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        Ok(Rule {
            kind: RuleKind::At,
            at_name: Some(prelude),
            selectors: Vec::new(),
            declarations: parse_block_declarations(input),
        })
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelParser {
    type Prelude = Vec<Selector>;
    type QualifiedRule = Rule;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        input.parse_comma_separated(|selector| {
            let start = selector.position();
            while selector.next_including_whitespace_and_comments().is_ok() {}
            Ok(Selector {
                value: selector.slice_from(start).trim().to_string(),
            })
        })
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        if prelude.iter().all(|s| s.value.is_empty()) {
            return Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid));
        }
        Ok(Rule {
            kind: RuleKind::Qualified,
            at_name: None,
            selectors: prelude,
            declarations: parse_block_declarations(input),
        })
    }
}

/// Parses a stylesheet into rules in source order.
///
/// Errors inside a rule block are recovered from by dropping the offending
/// declaration; a top-level item that is not a rule fails the whole sheet.
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet, CssParseError> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut top = TopLevelParser;
    let mut sheet = Stylesheet::default();

    for item in StyleSheetParser::new(&mut parser, &mut top) {
        match item {
            Ok(rule) => sheet.rules.push(rule),
            Err((err, snippet)) => {
                return Err(CssParseError {
                    line: err.location.line + 1,
                    column: err.location.column,
                    snippet: snippet.trim().to_string(),
                });
            }
        }
    }
    Ok(sheet)
}
