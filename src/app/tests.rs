use super::*;

#[test]
fn screens_cycle_both_ways() {
    let mut app = App::new();
    assert_eq!(app.screen, Screen::Library);
    app.next_screen();
    assert_eq!(app.screen, Screen::Playlist);
    app.next_screen();
    app.next_screen();
    assert_eq!(app.screen, Screen::Library);
    app.prev_screen();
    assert_eq!(app.screen, Screen::Playlists);
}

#[test]
fn cursors_are_per_screen_and_wrap() {
    let mut app = App::new();
    app.next(3);
    app.next(3);
    assert_eq!(app.cursor(), 2);
    app.next(3);
    assert_eq!(app.cursor(), 0);
    app.prev(3);
    assert_eq!(app.cursor(), 2);

    app.next_screen();
    assert_eq!(app.cursor(), 0);
    app.bottom(5);
    assert_eq!(app.cursor(), 4);
    app.top();
    assert_eq!(app.cursor(), 0);

    app.prev_screen();
    assert_eq!(app.cursor(), 2);
}

#[test]
fn cursor_moves_are_noops_on_empty_lists() {
    let mut app = App::new();
    app.next(0);
    app.prev(0);
    app.bottom(0);
    assert_eq!(app.cursor(), 0);
}

#[test]
fn clamp_pulls_cursors_into_shrunken_lists() {
    let mut app = App::new();
    app.set_cursor(9, 10);
    app.next_screen();
    app.set_cursor(4, 5);
    app.clamp_cursors(3, 0, 2);
    assert_eq!(app.cursor(), 0);
    app.prev_screen();
    assert_eq!(app.cursor(), 2);
}

#[test]
fn input_round_trip() {
    let mut app = App::new();
    app.begin_input(InputMode::RenamePlaylist { id: "p1".into() }, "Old");
    assert!(app.is_typing());
    app.pop_char();
    app.push_char('x');
    app.push_char('\n');
    let (mode, text) = app.finish_input();
    assert_eq!(mode, InputMode::RenamePlaylist { id: "p1".into() });
    assert_eq!(text, "Olx");
    assert_eq!(app.input, InputMode::Normal);
    assert!(app.buffer.is_empty());
}

#[test]
fn confirm_prompts_name_the_target() {
    let mode = InputMode::Confirm(Confirm::DeletePlaylist {
        id: "p1".into(),
        name: "Road Trip".into(),
    });
    assert!(mode.prompt().unwrap().contains("Road Trip"));
    assert_eq!(InputMode::Normal.prompt(), None);

    let mut app = App::new();
    app.begin_input(mode, "");
    assert!(!app.is_typing());
    app.cancel_input();
    assert_eq!(app.input, InputMode::Normal);
}
