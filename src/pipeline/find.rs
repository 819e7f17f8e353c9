// Rectangle inference from CSS rules

use crate::css::{Declaration, Rule, RuleKind, Stylesheet};
use crate::error::{DeclarationError, FindError, Scheme};
use crate::model::part::{Key, Part, Rect};

/// Properties that contribute to a part's rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    Width,
    Height,
    Background,
    BackgroundPosition,
}

/// What a single declaration contributes to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Update {
    Size(Key, i32),
    Offset(i32, i32),
}

impl Handler {
    fn for_property(property: &str) -> Option<Self> {
        match property {
            "width" => Some(Handler::Width),
            "height" => Some(Handler::Height),
            "background" => Some(Handler::Background),
            "background-position" => Some(Handler::BackgroundPosition),
            _ => None,
        }
    }

    fn apply(self, value: &str) -> Result<Update, DeclarationError> {
        match self {
            Handler::Width => parse_px(value).map(|w| Update::Size(Key::W, w)),
            Handler::Height => parse_px(value).map(|h| Update::Size(Key::H, h)),
            Handler::Background => parse_bg_shorthand(value).map(|(x, y)| Update::Offset(x, y)),
            Handler::BackgroundPosition => {
                parse_bg_position(value).map(|(x, y)| Update::Offset(x, y))
            }
        }
    }
}

/// Per-rule collection of the four rectangle values.
#[derive(Debug, Default)]
struct Extents {
    values: [Option<i32>; 4],
    errors: Vec<DeclarationError>,
}

impl Extents {
    fn collect(declarations: &[Declaration]) -> Self {
        let mut extents = Self::default();
        for decl in declarations {
            let Some(handler) = Handler::for_property(&decl.property) else {
                continue;
            };
            match handler.apply(&decl.value) {
                Ok(Update::Size(key, v)) => extents.put(key, v),
                Ok(Update::Offset(x, y)) => {
                    extents.put(Key::X, x);
                    extents.put(Key::Y, y);
                }
                Err(e) => extents.errors.push(e),
            }
        }
        extents
    }

    fn put(&mut self, key: Key, value: i32) {
        self.values[key.index()] = Some(value);
    }

    fn into_rect(self) -> Result<Rect, FindError> {
        let missing: Vec<Key> = Key::ALL
            .into_iter()
            .filter(|k| self.values[k.index()].is_none())
            .collect();

        match self.values {
            [Some(x), Some(y), Some(w), Some(h)] => Ok(Rect::from_origin_size(
                i64::from(x),
                i64::from(y),
                i64::from(w),
                i64::from(h),
            )),
            _ => Err(FindError::Incomplete {
                missing,
                errors: self.errors,
            }),
        }
    }
}

/// Inspects a rule for the properties that usually describe a sprite slice
/// (width, height and a background offset).
pub fn find(rule: &Rule) -> Result<Part, FindError> {
    if rule.kind != RuleKind::Qualified {
        return Err(FindError::NotQualified);
    }

    if rule.declarations.is_empty() {
        return Err(FindError::Incomplete {
            missing: Key::ALL.to_vec(),
            errors: Vec::new(),
        });
    }

    let rect = Extents::collect(&rule.declarations).into_rect()?;
    let name = rule
        .selectors
        .first()
        .map(|s| s.value.clone())
        .unwrap_or_default();

    Ok(Part { name, rect })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRule {
    /// Position of the rule in its stylesheet.
    pub index: usize,
    pub name: String,
    pub error: FindError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindReport {
    pub parts: Vec<Part>,
    pub skipped: Vec<SkippedRule>,
}

/// Runs [`find`] over every rule of a stylesheet, keeping rule order.
pub fn find_all(sheet: &Stylesheet) -> FindReport {
    let mut report = FindReport::default();
    for (index, rule) in sheet.rules.iter().enumerate() {
        match find(rule) {
            Ok(part) => report.parts.push(part),
            Err(error) => report.skipped.push(SkippedRule {
                index,
                name: rule.label(),
                error,
            }),
        }
    }
    report
}

/// Parses `100` or `100px`. A bare number is treated as pixels, like browsers do.
fn parse_px(value: &str) -> Result<i32, DeclarationError> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    number
        .parse::<i32>()
        .map_err(|_| DeclarationError::InvalidNumber {
            value: value.to_string(),
        })
}

// CSS offsets move the sprite, so `-80px` means the slice starts at pixel 80.
fn parse_offset(token: &str) -> Result<i32, DeclarationError> {
    parse_px(token)?
        .checked_neg()
        .ok_or_else(|| DeclarationError::InvalidNumber {
            value: token.to_string(),
        })
}

fn parse_bg_shorthand(value: &str) -> Result<(i32, i32), DeclarationError> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    tokens
        .windows(2)
        .find_map(|pair| match (parse_offset(pair[0]), parse_offset(pair[1])) {
            (Ok(x), Ok(y)) => Some((x, y)),
            _ => None,
        })
        .ok_or_else(|| DeclarationError::UnknownFormat {
            scheme: Scheme::BackgroundShorthand,
            value: value.to_string(),
        })
}

fn parse_bg_position(value: &str) -> Result<(i32, i32), DeclarationError> {
    let mut tokens = value.split_whitespace();
    let (Some(x), Some(y)) = (tokens.next(), tokens.next()) else {
        return Err(DeclarationError::UnknownFormat {
            scheme: Scheme::BackgroundPosition,
            value: value.to_string(),
        });
    };
    Ok((parse_offset(x)?, parse_offset(y)?))
}
