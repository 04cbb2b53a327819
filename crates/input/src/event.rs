use lumen_common::Viewport;

/// A window input the viewer reacts to.
///
/// Platform layers translate their native events into these; the viewer never
/// sees raw window-system types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer position in the viewport's pixel space.
    PointerMoved { x: f64, y: f64 },
    /// The drawable area changed size or scale.
    Resized(Viewport),
}
