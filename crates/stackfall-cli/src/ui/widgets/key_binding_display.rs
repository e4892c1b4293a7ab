use ratatui::{
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};

/// Keys and what they do, e.g. `(&["←", "→"], "Move")`.
pub type KeyBinding<'a> = (&'a [&'a str], &'a str);

/// Key bindings laid out on one line, or one binding per line when stacked.
#[derive(Debug)]
pub struct KeyBindingDisplay<'a> {
    bindings: &'a [KeyBinding<'a>],
    stacked: bool,
    block: Option<BlockWidget<'a>>,
}

impl<'a> KeyBindingDisplay<'a> {
    pub fn new(bindings: &'a [KeyBinding<'a>]) -> Self {
        Self {
            bindings,
            stacked: false,
            block: None,
        }
    }

    pub fn stacked(self, stacked: bool) -> Self {
        Self { stacked, ..self }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn height(&self) -> u16 {
        let lines = if self.stacked { self.bindings.len() } else { 1 };
        u16::try_from(lines).unwrap_or(u16::MAX) + super::block_vertical_margin(self.block.as_ref())
    }
}

const KEY_STYLE: Style = Style::new().fg(Color::Cyan);
const KEY_SEPARATOR_STYLE: Style = Style::new().fg(Color::DarkGray);
const DESCRIPTION_STYLE: Style = Style::new().fg(Color::White);
const ITEM_SEPARATOR_STYLE: Style = Style::new().fg(Color::DarkGray);

fn binding_spans<'a>((keys, desc): KeyBinding<'a>) -> Vec<Span<'a>> {
    let mut spans = vec![];
    for (i, key) in keys.iter().copied().enumerate() {
        if i > 0 {
            spans.push(Span::styled("/", KEY_SEPARATOR_STYLE));
        }
        spans.push(Span::styled(key, KEY_STYLE));
    }
    spans.push(Span::from(" "));
    spans.push(Span::styled(desc, DESCRIPTION_STYLE));
    spans
}

impl Widget for KeyBindingDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        if self.stacked {
            for (row, binding) in (area.y..area.bottom()).zip(self.bindings.iter().copied()) {
                let line_area = Rect::new(area.x, row, area.width, 1);
                Line::from(binding_spans(binding))
                    .left_aligned()
                    .render(line_area, buf);
            }
            return;
        }

        let mut spans = vec![];
        for (i, binding) in self.bindings.iter().copied().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", ITEM_SEPARATOR_STYLE));
            }
            spans.extend(binding_spans(binding));
        }
        Line::from(spans).centered().render(area, buf);
    }
}
