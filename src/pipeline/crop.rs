use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::error::SplitError;
use crate::model::part::Part;

/// Copies a part's rectangle out of the sprite into a new image with a zero origin.
pub fn crop(part: &Part, sprite: &DynamicImage) -> Result<RgbaImage, SplitError> {
    let (width, height) = sprite.dimensions();
    let rect = part.rect;
    let out_of_bounds = || SplitError::OutOfBounds {
        rect,
        width,
        height,
    };

    if !rect.within(width, height) {
        return Err(out_of_bounds());
    }

    let x = u32::try_from(rect.min.x).map_err(|_| out_of_bounds())?;
    let y = u32::try_from(rect.min.y).map_err(|_| out_of_bounds())?;
    let w = u32::try_from(rect.width()).map_err(|_| out_of_bounds())?;
    let h = u32::try_from(rect.height()).map_err(|_| out_of_bounds())?;

    Ok(sprite.view(x, y, w, h).to_image())
}
