use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block as BlockWidget, BlockExt, Paragraph, Widget},
};
use stackfall_engine::{Geometry, RenderAttrs, Scene, SceneBlock, TrailSprite};

use crate::ui::widgets::{color, style};

/// Draws a board [`Scene`] centered in its area.
///
/// An unmeasured scene draws nothing but the surrounding block.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    scene: &'a Scene,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self { scene, block: None }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    /// Area left for the grid once the surrounding block is drawn.
    pub fn inner(&self, area: Rect) -> Rect {
        self.block.inner_if_some(area)
    }

    /// Host area covered by the grid itself.
    pub fn grid_area(&self, area: Rect) -> Option<Rect> {
        let geometry = self.scene.geometry?;
        let (width, height) = geometry.size();
        let width = u16::try_from(width).unwrap_or(u16::MAX);
        let height = u16::try_from(height).unwrap_or(u16::MAX);
        Some(
            self.inner(area)
                .centered(Constraint::Length(width), Constraint::Length(height)),
        )
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let (Some(geometry), Some(grid_area)) = (self.scene.geometry, self.grid_area(area)) else {
            return;
        };
        let mut painter = Painter {
            buf,
            area: grid_area,
            geometry,
        };

        for y in 0..geometry.rows {
            for x in 0..geometry.columns {
                #[expect(clippy::cast_precision_loss)]
                let (x, y) = (x as f32, y as f32);
                painter.cell(x, y, style::EMPTY_DOT, " .");
            }
        }
        for trail in &self.scene.trails {
            painter.trail(trail);
        }
        for block in self.scene.blocks.iter().chain(&self.scene.fading) {
            painter.block(block);
        }
        for &(x, y) in &self.scene.ghost {
            #[expect(clippy::cast_precision_loss)]
            let (x, y) = (x as f32, y as f32);
            painter.cell(x, y, style::GHOST, "[]");
        }
        for block in &self.scene.piece {
            painter.block(block);
        }
    }
}

struct Painter<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    geometry: Geometry,
}

impl Painter<'_> {
    fn cell(&mut self, x: f32, y: f32, style: Style, symbol: &str) {
        let Geometry {
            cell_width,
            cell_height,
            ..
        } = self.geometry;
        self.fill(x, y, cell_width, cell_height, style, symbol);
    }

    /// Fills a `width × height` host rectangle at cell coordinates `(x, y)`,
    /// clipped to the grid.
    fn fill(&mut self, x: f32, y: f32, width: u16, height: u16, style: Style, symbol: &str) {
        let (hx, hy) = self.geometry.cell_origin(x, y);
        let (hx, hy) = (hx.round(), hy.round());
        if hx < 0.0 || hy < 0.0 {
            return;
        }
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (hx, hy) = (hx as u16, hy as u16);
        let rect = Rect::new(
            self.area.x.saturating_add(hx),
            self.area.y.saturating_add(hy),
            width,
            height,
        )
        .intersection(self.area);
        if rect.is_empty() {
            return;
        }
        Paragraph::new(symbol)
            .style(style)
            .centered()
            .render(rect, self.buf);
    }

    fn block(&mut self, block: &SceneBlock) {
        if let Some((style, symbol)) = block_look(block.color, block.render) {
            self.cell(block.x, block.y, style, symbol);
        }
    }

    fn trail(&mut self, trail: &TrailSprite) {
        for line in &trail.lines {
            let fg = color::of_index(line.color);
            for row in line.from_row.max(0)..line.to_row {
                let alpha = line.alpha_at(row, trail.opacity);
                let symbol = match alpha {
                    a if a > 0.5 => "░░",
                    a if a > 0.1 => "··",
                    _ => continue,
                };
                #[expect(clippy::cast_precision_loss)]
                let (x, y) = (line.column as f32, row as f32);
                self.cell(x, y, Style::new().fg(fg).bg(color::BLACK), symbol);
            }
        }
        for particle in &trail.particles {
            let alpha = particle.opacity * trail.opacity;
            if alpha < 0.2 {
                continue;
            }
            let symbol = if particle.size > 0.5 { "•" } else { "·" };
            self.fill(particle.x, particle.y, 1, 1, style::DEFAULT, symbol);
        }
    }
}

/// Style and glyphs for a block with the given render attributes, or `None`
/// when it is fully transparent.
fn block_look(color_index: u8, render: RenderAttrs) -> Option<(Style, &'static str)> {
    let color = color::of_index(color_index);
    let look = match render.opacity {
        o if o <= 0.05 => return None,
        o if o < 0.35 => (Style::new().fg(color).bg(color::BLACK), "░░"),
        o if o < 0.7 => (Style::new().fg(color).bg(color::BLACK), "▓▓"),
        _ if render.scale > 1.02 => (Style::new().fg(color::WHITE).bg(color), "▪▪"),
        _ => (style::bg_only(color), "  "),
    };
    Some(look)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_look_fades_out() {
        let opaque = RenderAttrs::IDENTITY;
        assert_eq!(block_look(0, opaque).map(|(_, s)| s), Some("  "));
        let faint = RenderAttrs {
            opacity: 0.2,
            ..opaque
        };
        assert_eq!(block_look(0, faint).map(|(_, s)| s), Some("░░"));
        let gone = RenderAttrs {
            opacity: 0.0,
            ..opaque
        };
        assert_eq!(block_look(0, gone), None);
    }

    #[test]
    fn test_pulsing_block_is_highlighted() {
        let pulse = RenderAttrs {
            scale: 1.2,
            ..RenderAttrs::IDENTITY
        };
        assert_eq!(block_look(1, pulse).map(|(_, s)| s), Some("▪▪"));
    }
}
