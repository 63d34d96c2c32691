// Spirit Level — Frame Rendering
//
// Draws one LevelFrame into any monochrome draw target: bubble, centring
// guide, tilt readout, level banner. Pure pixels; the display driver
// decides when the frame reaches the panel.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::config::{
    BANNER_INSET_PX, BUBBLE_RADIUS, GUIDE_RECT_SIZE, GUIDE_RECT_X, GUIDE_RECT_Y, SCREEN_WIDTH,
    TILT_TEXT_ROW,
};
use crate::level::LevelFrame;

const TEXT_STYLE: MonoTextStyle<'static, BinaryColor> =
    MonoTextStyle::new(&FONT_6X10, BinaryColor::On);

/// Redraw the whole fixed layout for one loop iteration.
pub fn draw_frame<D>(target: &mut D, frame: &LevelFrame) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.clear(BinaryColor::Off)?;
    if frame.is_level {
        draw_level_banner(target)?;
    }
    draw_bubble(target, frame.x, frame.y)?;
    draw_guide(target)?;
    draw_tilt_text(target, frame.angles.pitch, frame.angles.roll)
}

/// Filled bubble centred at (x, y).
pub fn draw_bubble<D>(target: &mut D, x: i32, y: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let r = BUBBLE_RADIUS as i32;
    Circle::new(Point::new(x - r, y - r), 2 * BUBBLE_RADIUS + 1)
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(target)
}

/// Outline square at the screen centre marking the level target.
pub fn draw_guide<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Rectangle::new(
        Point::new(GUIDE_RECT_X, GUIDE_RECT_Y),
        Size::new(GUIDE_RECT_SIZE, GUIDE_RECT_SIZE),
    )
    .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
    .draw(target)
}

/// Numeric pitch/roll readout along the bottom text row.
pub fn draw_tilt_text<D>(target: &mut D, pitch: f32, roll: f32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let line = format!("P: {:<4.1} R: {:<4.1}", pitch, roll);
    Text::with_baseline(
        &line,
        Point::new(0, TILT_TEXT_ROW),
        TEXT_STYLE,
        Baseline::Top,
    )
    .draw(target)?;
    Ok(())
}

/// "Level!" across the top, shown only while the bubble sits in the window.
pub fn draw_level_banner<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let x = (SCREEN_WIDTH / 2) as i32 - BANNER_INSET_PX;
    Text::with_baseline("Level!", Point::new(x, 0), TEXT_STYLE, Baseline::Top).draw(target)?;
    Ok(())
}
