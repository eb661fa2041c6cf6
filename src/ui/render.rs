//! # Pane Rendering
//!
//! [`ShellView`] draws one [`PaneFrame`]: scrollback lines styled by
//! [`LineKind`], the live prompt and input line, and the selection
//! highlight. The prompt segment of echo and input lines uses the prompt
//! style; everything else uses the style of its line kind.
//!
//! Selection offsets are character offsets into the newline-joined content,
//! so each line's character range is intersected with the selection before
//! it is split into spans.

use crate::shell::{LineKind, PaneFrame, ShellPane, INITIALIZING_TEXT};
use crate::ui::theme::PaneStyles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Paragraph, Widget},
    Frame,
};

/// Draw `pane` over the whole frame and place the terminal cursor at the
/// input position when it is visible.
pub fn render(frame: &mut Frame, pane: &mut ShellPane, styles: &PaneStyles) {
    let area = frame.area();
    pane.set_origin(area.x, area.y);

    if pane.size().0 == 0 {
        frame.render_widget(Paragraph::new(INITIALIZING_TEXT).style(styles.background), area);
        return;
    }

    let pane_frame = pane.frame();
    let input_row = pane_frame.lines.len().saturating_sub(1);
    let cursor_col = pane_frame.cursor_col;
    let y_offset = pane_frame.y_offset;

    frame.render_widget(ShellView::new(&pane_frame, styles), area);

    if input_row >= y_offset && input_row - y_offset < area.height as usize {
        let x = area.x.saturating_add(cursor_col.min(u16::MAX as usize) as u16);
        let y = area.y + (input_row - y_offset) as u16;
        if x < area.x + area.width {
            frame.set_cursor_position((x, y));
        }
    }
}

/// A widget that renders a composed pane frame.
pub struct ShellView<'a> {
    frame: &'a PaneFrame,
    styles: &'a PaneStyles,
}

impl<'a> ShellView<'a> {
    pub fn new(frame: &'a PaneFrame, styles: &'a PaneStyles) -> Self {
        Self { frame, styles }
    }

    /// All content lines as styled text, before scrolling.
    pub fn text(&self) -> Text<'static> {
        let mut offset = 0;
        let mut lines = Vec::with_capacity(self.frame.lines.len());
        for line in &self.frame.lines {
            let len = line.text.chars().count();
            lines.push(self.styled_line(&line.text, line.kind, offset));
            offset += len + 1;
        }
        Text::from(lines)
    }

    /// Split one line at the prompt boundary and the selection bounds.
    fn styled_line(&self, text: &str, kind: LineKind, line_start: usize) -> Line<'static> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();

        let prompt_chars = match kind {
            LineKind::Echo { prompt_chars } | LineKind::Input { prompt_chars } => {
                prompt_chars.min(len)
            }
            _ => 0,
        };

        let (sel_start, sel_end) = match self.frame.selection {
            Some((start, end)) if end > line_start && start < line_start + len => (
                start.saturating_sub(line_start),
                (end - line_start).min(len),
            ),
            _ => (len, len),
        };

        let mut cuts = vec![0, prompt_chars, sel_start, sel_end, len];
        cuts.sort_unstable();
        cuts.dedup();

        let body = self.styles.for_kind(kind);
        let spans: Vec<Span<'static>> = cuts
            .windows(2)
            .filter(|w| w[0] < w[1])
            .map(|w| {
                let segment: String = chars[w[0]..w[1]].iter().collect();
                let mut style = if w[0] < prompt_chars {
                    self.styles.prompt
                } else {
                    body
                };
                if w[0] >= sel_start && w[1] <= sel_end {
                    style = style.patch(self.styles.selection);
                }
                Span::styled(segment, style)
            })
            .collect();

        Line::from(spans)
    }
}

impl Widget for ShellView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let y = self.frame.y_offset.min(u16::MAX as usize) as u16;
        Paragraph::new(self.text())
            .style(self.styles.background)
            .scroll((y, 0))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::DisplayLine;

    fn frame(selection: Option<(usize, usize)>) -> PaneFrame {
        PaneFrame {
            lines: vec![
                DisplayLine::output("hello"),
                DisplayLine::echo("$ ", "ls"),
                DisplayLine {
                    text: "$ ".to_string(),
                    kind: LineKind::Input { prompt_chars: 2 },
                },
            ],
            selection,
            y_offset: 0,
            cursor_col: 2,
        }
    }

    fn span_texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_prompt_segment_is_separate_span() {
        let styles = PaneStyles::default();
        let f = frame(None);
        let text = ShellView::new(&f, &styles).text();
        assert_eq!(span_texts(&text.lines[1]), vec!["$ ", "ls"]);
        assert_eq!(text.lines[1].spans[0].style, styles.prompt);
        assert_eq!(text.lines[1].spans[1].style, styles.output);
    }

    #[test]
    fn test_selection_spans_lines() {
        let styles = PaneStyles::default();
        // "hel[lo\n$ l]s"
        let f = frame(Some((3, 9)));
        let text = ShellView::new(&f, &styles).text();

        assert_eq!(span_texts(&text.lines[0]), vec!["hel", "lo"]);
        assert_eq!(text.lines[0].spans[1].style.bg, styles.selection.bg);
        assert_eq!(span_texts(&text.lines[1]), vec!["$ ", "l", "s"]);
        assert_eq!(text.lines[1].spans[1].style.bg, styles.selection.bg);
        assert_eq!(text.lines[1].spans[2].style.bg, styles.output.bg);
    }

    #[test]
    fn test_error_line_style() {
        let styles = PaneStyles::default();
        let f = PaneFrame {
            lines: vec![DisplayLine::error("ERROR: boom")],
            selection: None,
            y_offset: 0,
            cursor_col: 0,
        };
        let text = ShellView::new(&f, &styles).text();
        assert_eq!(text.lines[0].spans[0].style, styles.error);
    }
}
