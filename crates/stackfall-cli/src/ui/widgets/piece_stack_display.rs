use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Paragraph, Widget},
};
use stackfall_engine::{PieceKind, Shape};

use crate::ui::widgets::{color, style};

const CELL_WIDTH: u16 = 2;
/// Rows reserved per piece; every piece is at most two rows tall at spawn.
const PIECE_ROWS: u16 = 2;

/// Upcoming pieces, nearest on top.
#[derive(Debug)]
pub struct PieceStackDisplay<'a> {
    pieces: &'a [PieceKind],
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceStackDisplay<'a> {
    pub fn new(pieces: &'a [PieceKind]) -> Self {
        Self {
            pieces,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn height(&self) -> u16 {
        let count = u16::try_from(self.pieces.len()).unwrap_or(u16::MAX);
        let spacing = count.saturating_sub(1);
        PIECE_ROWS * count + spacing + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for PieceStackDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);
        let layout = Layout::vertical(self.pieces.iter().map(|_| Constraint::Length(PIECE_ROWS)))
            .flex(Flex::Start)
            .spacing(1);
        for (cell, kind) in iter::zip(area.layout_vec(&layout), self.pieces) {
            render_piece(*kind, cell, buf);
        }
    }
}

fn render_piece(kind: PieceKind, area: Rect, buf: &mut Buffer) {
    let outline = Shape::of(kind).outline();
    let height = u16::try_from(outline.len()).unwrap_or(0);
    let width = outline
        .first()
        .map_or(0, |row| u16::try_from(row.len()).unwrap_or(0));
    let area = area.centered(
        Constraint::Length(width * CELL_WIDTH),
        Constraint::Length(height),
    );
    let filled = style::bg_only(color::of_index(kind.color()));
    for (y, row) in (0..).zip(&outline) {
        for (x, occupied) in (0..).zip(row) {
            if !occupied {
                continue;
            }
            let cell = Rect::new(area.x + x * CELL_WIDTH, area.y + y, CELL_WIDTH, 1)
                .intersection(area);
            Paragraph::new("").style(filled).render(cell, buf);
        }
    }
}
