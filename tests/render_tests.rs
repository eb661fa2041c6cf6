//! Rendering tests
//!
//! Draws the pane into ratatui's `TestBackend` and checks the buffer.

use crossterm::event::{Event, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use shellpane::shell::{PaneConfig, ShellMsg, ShellPane};
use shellpane::ui::{render, PaneStyles, Theme};

fn row_text(buffer: &Buffer, y: u16) -> String {
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol().to_string())
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn draw(terminal: &mut Terminal<TestBackend>, pane: &mut ShellPane, styles: &PaneStyles) {
    terminal
        .draw(|f| render(f, pane, styles))
        .expect("draw");
}

#[test]
fn test_placeholder_until_resized() {
    let mut terminal = Terminal::new(TestBackend::new(30, 4)).expect("terminal");
    let mut pane = ShellPane::new("t", &PaneConfig::default()).expect("pane");
    let styles = PaneStyles::default();

    draw(&mut terminal, &mut pane, &styles);
    assert_eq!(row_text(terminal.backend().buffer(), 0), "Initializing shell...");
}

#[test]
fn test_output_and_prompt_rows() {
    let mut terminal = Terminal::new(TestBackend::new(30, 4)).expect("terminal");
    let mut pane = ShellPane::new("t", &PaneConfig::default()).expect("pane");
    let styles = Theme::default_theme().styles();

    pane.handle(Event::Resize(30, 4).into());
    pane.handle(ShellMsg::Output("one\ntwo\nuser@host:~$ ".to_string()).into());
    pane.set_input_value("ls");
    draw(&mut terminal, &mut pane, &styles);

    let buffer = terminal.backend().buffer();
    assert_eq!(row_text(buffer, 0), "one");
    assert_eq!(row_text(buffer, 1), "two");
    assert_eq!(row_text(buffer, 2), "user@host:~$ ls");
    assert_eq!(buffer[(0, 2)].fg, styles.prompt.fg.expect("prompt colour"));
    assert_eq!(buffer[(13, 2)].fg, styles.output.fg.expect("output colour"));

    // Unused rows and cells still carry the theme background.
    let background = Theme::default_theme().bg;
    assert_eq!(buffer[(29, 3)].bg, background);
    assert_eq!(buffer[(0, 0)].bg, background);
}

#[test]
fn test_scrolled_view_shows_anchor_region() {
    let mut terminal = Terminal::new(TestBackend::new(20, 3)).expect("terminal");
    let mut pane = ShellPane::new("t", &PaneConfig::default()).expect("pane");
    let styles = PaneStyles::default();

    pane.handle(Event::Resize(20, 3).into());
    pane.handle(ShellMsg::Output("a\nb\nc\nd\n".to_string()).into());
    draw(&mut terminal, &mut pane, &styles);
    assert_eq!(row_text(terminal.backend().buffer(), 0), "a");

    pane.handle(ShellMsg::Output("e\n".to_string()).into());
    draw(&mut terminal, &mut pane, &styles);
    let buffer = terminal.backend().buffer();
    // Six content lines in three rows: the anchor at "e" clamps to the
    // last page.
    assert_eq!(row_text(buffer, 0), "d");
    assert_eq!(row_text(buffer, 1), "e");
    assert_eq!(row_text(buffer, 2), "$");
}

#[test]
fn test_selection_is_highlighted() {
    let mut terminal = Terminal::new(TestBackend::new(20, 3)).expect("terminal");
    let mut pane = ShellPane::new("t", &PaneConfig::default()).expect("pane");
    let styles = PaneStyles::default();

    pane.handle(Event::Resize(20, 3).into());
    pane.handle(ShellMsg::Output("hello\n".to_string()).into());
    draw(&mut terminal, &mut pane, &styles);

    for (kind, column) in [
        (MouseEventKind::Down(MouseButton::Left), 1),
        (MouseEventKind::Drag(MouseButton::Left), 4),
    ] {
        pane.handle(
            Event::Mouse(MouseEvent {
                kind,
                column,
                row: 0,
                modifiers: KeyModifiers::empty(),
            })
            .into(),
        );
    }
    draw(&mut terminal, &mut pane, &styles);

    let buffer = terminal.backend().buffer();
    let selection_bg = styles.selection.bg.expect("selection colour");
    assert_eq!(buffer[(0, 0)].bg, styles.background.bg.expect("background colour"));
    assert_eq!(buffer[(1, 0)].bg, selection_bg);
    assert_eq!(buffer[(3, 0)].bg, selection_bg);
    assert_ne!(buffer[(4, 0)].bg, selection_bg);
}
