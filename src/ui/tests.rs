use super::*;

#[test]
fn format_mmss_pads_minutes_and_seconds() {
    assert_eq!(format_mmss(Duration::from_secs(0)), "00:00");
    assert_eq!(format_mmss(Duration::from_secs(65)), "01:05");
    assert_eq!(format_mmss(Duration::from_millis(3_599_900)), "59:59");
}

#[test]
fn window_shows_everything_when_it_fits() {
    assert_eq!(visible_window(5, 10, 3), (0, 5, 3));
    assert_eq!(visible_window(0, 10, 0), (0, 0, 0));
}

#[test]
fn window_centers_the_selection() {
    assert_eq!(visible_window(100, 10, 50), (45, 55, 5));
    assert_eq!(visible_window(100, 10, 2), (0, 10, 2));
    assert_eq!(visible_window(100, 10, 99), (90, 100, 9));
}

#[test]
fn controls_help_follows_the_screen() {
    let library = controls_text(Screen::Library, 5);
    assert!(library.contains("[H/L] seek -/+5s"));
    assert!(library.contains("[+] add/remove"));
    assert!(!library.contains("[c] new"));

    let playlists = controls_text(Screen::Playlists, 5);
    assert!(playlists.contains("[c] new"));
    assert!(playlists.ends_with("[q] quit"));
}
