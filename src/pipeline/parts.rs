// Deduplication and scaling of found parts

use std::collections::HashMap;

use log::debug;

use crate::error::ScaleError;
use crate::model::part::{Part, Rect};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PartKey {
    name: Option<String>,
    rect: Rect,
}

impl PartKey {
    fn of(part: &Part, consider_name: bool) -> Self {
        Self {
            name: consider_name.then(|| part.name.clone()),
            rect: part.rect,
        }
    }
}

/// Drops parts with duplicate rectangles; the last one encountered wins.
///
/// With `consider_name`, parts sharing a rectangle but not a name are all kept.
/// Survivors stay at the position where their key first appeared.
pub fn distinct(parts: Vec<Part>, consider_name: bool) -> Vec<Part> {
    let mut seen: HashMap<PartKey, usize> = HashMap::with_capacity(parts.len());
    let mut unique: Vec<Part> = Vec::with_capacity(parts.len());

    for part in parts {
        let key = PartKey::of(&part, consider_name);
        match seen.get(&key) {
            Some(&slot) => {
                debug!(
                    "rule {} replaces duplicate rule {}",
                    part.name, unique[slot].name
                );
                unique[slot] = part;
            }
            None => {
                seen.insert(key, unique.len());
                unique.push(part);
            }
        }
    }
    unique
}

/// Scales every rectangle's extent by `ratio`, keeping its origin:
/// `(x, y, x+w, y+h)` becomes `(x, y, x+r*w, y+r*h)`.
pub fn scale(parts: &[Part], ratio: i32) -> Result<Vec<Part>, ScaleError> {
    if ratio <= 0 {
        return Err(ScaleError::InvalidRatio(ratio));
    }

    let ratio = i64::from(ratio);
    Ok(parts
        .iter()
        .map(|p| {
            let Rect { min, .. } = p.rect;
            let w = p.rect.width().saturating_mul(ratio);
            let h = p.rect.height().saturating_mul(ratio);
            Part::new(p.name.clone(), Rect::from_origin_size(min.x, min.y, w, h))
        })
        .collect())
}
