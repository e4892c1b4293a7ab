/// Transient render attributes of a block.
///
/// Only animation code writes these; game logic never reads them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderAttrs {
    /// Uniform scale around the cell center (`1.0` = full cell).
    pub scale: f32,
    /// Opacity in `[0.0, 1.0]`.
    pub opacity: f32,
    /// Vertical offset in rows, applied on top of the logical row.
    pub offset_y: f32,
}

impl RenderAttrs {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        opacity: 1.0,
        offset_y: 0.0,
    };
}

impl Default for RenderAttrs {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A single occupied cell.
///
/// The color index is fixed at creation. The position mirrors the cell the
/// block currently lives in (a grid cell or a cell of a piece's shape, offset
/// by the piece position).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    color: u8,
    x: i32,
    y: i32,
    render: RenderAttrs,
}

impl Block {
    #[must_use]
    pub const fn new(color: u8) -> Self {
        Self {
            color,
            x: 0,
            y: 0,
            render: RenderAttrs::IDENTITY,
        }
    }

    #[must_use]
    pub const fn color(&self) -> u8 {
        self.color
    }

    #[must_use]
    pub const fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    #[must_use]
    pub const fn render(&self) -> RenderAttrs {
        self.render
    }

    pub(crate) fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub(crate) fn render_mut(&mut self) -> &mut RenderAttrs {
        &mut self.render
    }
}
