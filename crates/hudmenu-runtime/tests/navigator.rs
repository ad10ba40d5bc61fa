//! End-to-end navigator behaviour against a recording host.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use common::harness;
use hudmenu_core::{InputMode, KeyBind, KeyEvent, MenuManagerConfiguration, PlayerId};
use hudmenu_text::{HorizontalStyle, OverflowStyle, ScrollDirection};
use hudmenu_widgets::{MenuBuilder, MenuOption};
use parking_lot::Mutex;

const P: PlayerId = PlayerId(1);

fn press(key: KeyBind) -> KeyEvent {
    KeyEvent::press(P, key)
}

fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let c = Arc::new(AtomicUsize::new(0));
    (Arc::clone(&c), c)
}

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Tick until `done` holds or five seconds pass.
fn tick_until(nav: &hudmenu_runtime::MenuNavigator, done: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        nav.tick();
        if done() {
            return true;
        }
        std::thread::sleep(millis(5));
    }
    false
}

#[test]
fn reshow_replaces_auto_close_timer() {
    let h = harness(MenuManagerConfiguration::default());
    let (closes, seen) = counter();
    h.nav.on_menu_closed(move |_, _| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    let menu = h
        .nav
        .build_menu(MenuBuilder::new("Timed").auto_close_after(5.0).option(MenuOption::text("hi")))
        .unwrap();

    assert!(h.nav.open_menu_for_player(P, &menu));
    h.scheduler.advance(millis(2_000));
    assert!(h.nav.open_menu_for_player(P, &menu));
    assert_eq!(closes.load(Ordering::SeqCst), 0);

    h.scheduler.advance(millis(4_900));
    assert_eq!(closes.load(Ordering::SeqCst), 0);
    assert!(menu.is_open_for(P));

    h.scheduler.advance(millis(100));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert!(h.nav.current_menu(P).is_none());

    h.scheduler.advance(millis(10_000));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn button_mode_moves_and_plays_sounds() {
    let h = harness(MenuManagerConfiguration::default());
    let menu = h
        .nav
        .build_menu(
            MenuBuilder::new("Shop")
                .option(MenuOption::button("Alpha", |_| {}))
                .option(MenuOption::button("Beta", |_| {})),
        )
        .unwrap();
    h.nav.open_menu_for_player(P, &menu);
    let text = h.host.text(P).unwrap();
    assert!(text.contains("➤ </font><font class='fontSize-m'>Alpha"));
    assert!(text.contains("Move:</font> SHIFT/CTRL"));

    assert!(!h.nav.handle_key(KeyEvent::release(P, KeyBind::SHIFT)));
    assert!(h.nav.handle_key(press(KeyBind::SHIFT)));
    assert!(h.host.text(P).unwrap().contains("➤ </font><font class='fontSize-m'>Beta"));
    assert!(h.nav.handle_key(press(KeyBind::CTRL)));
    assert_eq!(menu.desired_index(P), Some(0));
    assert!(!h.nav.handle_key(press(KeyBind::R)));
    assert_eq!(h.host.sounds(P), vec!["Menu.Scroll", "Menu.Scroll"]);

    assert!(h.nav.handle_key(press(KeyBind::TAB)));
    assert!(h.nav.current_menu(P).is_none());
    assert!(h.host.text(P).is_none());
    assert_eq!(h.host.sounds(P).last().map(String::as_str), Some("Menu.Exit"));
}

#[test]
fn wasd_mode_uses_fixed_keys() {
    let h = harness(MenuManagerConfiguration {
        input_mode: InputMode::Wasd,
        ..MenuManagerConfiguration::default()
    });
    let menu = h
        .nav
        .build_menu(
            MenuBuilder::new("Wasd")
                .option(MenuOption::toggle("One", true))
                .option(MenuOption::toggle("Two", true)),
        )
        .unwrap();
    h.nav.open_menu_for_player(P, &menu);
    assert!(h.host.text(P).unwrap().contains("Move:</font> W/S"));
    assert!(!h.nav.handle_key(press(KeyBind::SHIFT)));
    h.nav.handle_key(press(KeyBind::S));
    assert_eq!(menu.desired_index(P), Some(1));
    h.nav.handle_key(press(KeyBind::D));
    let two = menu.options().get(1).unwrap();
    assert!(!two.as_toggle().unwrap().value(P));
    h.nav.handle_key(press(KeyBind::W));
    assert_eq!(menu.desired_index(P), Some(0));
    h.nav.handle_key(press(KeyBind::A));
    assert!(h.nav.current_menu(P).is_none());
}

#[test]
fn toggle_select_rerenders_immediately() {
    let h = harness(MenuManagerConfiguration::default());
    let menu = h
        .nav
        .build_menu(MenuBuilder::new("Opts").option(MenuOption::toggle("Music", true)))
        .unwrap();
    h.nav.open_menu_for_player(P, &menu);
    assert!(h.host.text(P).unwrap().contains("✔"));
    h.nav.handle_key(press(KeyBind::E));
    assert!(h.host.text(P).unwrap().contains("✘"));
    assert_eq!(h.host.sounds(P), vec!["Menu.Select"]);
    assert!(menu.is_open_for(P));
}

#[test]
fn close_after_select_closes_menu() {
    let h = harness(MenuManagerConfiguration::default());
    let (clicks, seen) = counter();
    let menu = h
        .nav
        .build_menu(MenuBuilder::new("Once").option(
            MenuOption::button("Go", move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .close_after_select(true),
        ))
        .unwrap();
    h.nav.open_menu_for_player(P, &menu);
    h.nav.handle_key(press(KeyBind::E));
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
    assert!(h.nav.current_menu(P).is_none());
    assert_eq!(h.host.clears(P), 1);
}

#[test]
fn validation_failure_keeps_menu_open() {
    let h = harness(MenuManagerConfiguration::default());
    let (failures, seen) = counter();
    let menu = h
        .nav
        .build_menu(MenuBuilder::new("Guarded").close_on_select(true).option(
            MenuOption::button("Buy", |_| {}).validate(
                |_| false,
                move |_| {
                    seen.fetch_add(1, Ordering::SeqCst);
                },
            ),
        ))
        .unwrap();
    h.nav.open_menu_for_player(P, &menu);
    h.nav.handle_key(press(KeyBind::E));
    assert_eq!(failures.load(Ordering::SeqCst), 1);
    assert!(menu.is_open_for(P));
    assert!(h.host.sounds(P).is_empty());
}

#[test]
fn submenu_round_trip_keeps_hooks_quiet() {
    let h = harness(MenuManagerConfiguration::default());
    let (child_closed, child_closed_hook) = counter();
    let (parent_opened, parent_opened_hook) = counter();
    let (parent_closed, parent_closed_hook) = counter();

    let child = h
        .nav
        .build_menu(
            MenuBuilder::new("Child")
                .option(MenuOption::button("Inner", |_| {}))
                .on_close(move |_, _| {
                    child_closed_hook.fetch_add(1, Ordering::SeqCst);
                }),
        )
        .unwrap();
    let parent = h
        .nav
        .build_menu(
            MenuBuilder::new("Parent")
                .option(MenuOption::button("Stay", |_| {}))
                .option(MenuOption::submenu("Go", Arc::clone(&child)))
                .on_open(move |_, _| {
                    parent_opened_hook.fetch_add(1, Ordering::SeqCst);
                })
                .on_close(move |_, _| {
                    parent_closed_hook.fetch_add(1, Ordering::SeqCst);
                }),
        )
        .unwrap();

    h.nav.open_menu_for_player(P, &parent);
    h.nav.handle_key(press(KeyBind::SHIFT));
    h.nav.handle_key(press(KeyBind::E));

    let current = h.nav.current_menu(P).unwrap();
    assert!(Arc::ptr_eq(&current, &child));
    assert!(!parent.is_open_for(P));
    assert_eq!(parent_closed.load(Ordering::SeqCst), 0);
    assert!(Arc::ptr_eq(&child.parent().unwrap().0, &parent));
    assert!(h.host.text(P).unwrap().contains("Child"));

    h.nav.handle_key(press(KeyBind::TAB));
    let current = h.nav.current_menu(P).unwrap();
    assert!(Arc::ptr_eq(&current, &parent));
    assert_eq!(child_closed.load(Ordering::SeqCst), 1);
    assert_eq!(parent_opened.load(Ordering::SeqCst), 1);
    assert_eq!(parent_closed.load(Ordering::SeqCst), 0);
    assert_eq!(parent.current_option(P).unwrap().label_for(P), "Go");

    h.nav.handle_key(press(KeyBind::TAB));
    assert!(h.nav.current_menu(P).is_none());
    assert_eq!(parent_closed.load(Ordering::SeqCst), 1);
}

#[test]
fn opening_unrelated_menu_closes_whole_chain() {
    let h = harness(MenuManagerConfiguration::default());
    let (closed, seen) = counter();
    h.nav.on_menu_closed(move |_, _| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    let child = h.nav.build_menu(MenuBuilder::new("Child")).unwrap();
    let parent = h
        .nav
        .build_menu(MenuBuilder::new("Parent").option(MenuOption::submenu("Go", Arc::clone(&child))))
        .unwrap();
    let other = h.nav.build_menu(MenuBuilder::new("Other")).unwrap();

    h.nav.open_menu_for_player(P, &parent);
    h.nav.handle_key(press(KeyBind::E));
    assert!(Arc::ptr_eq(&h.nav.current_menu(P).unwrap(), &child));

    h.nav.open_menu_for_player(P, &other);
    assert_eq!(closed.load(Ordering::SeqCst), 2);
    assert!(Arc::ptr_eq(&h.nav.current_menu(P).unwrap(), &other));
    assert!(!parent.is_open_for(P));
    assert!(!child.is_open_for(P));
}

#[test]
fn async_button_shows_loading_until_completion() {
    let h = harness(MenuManagerConfiguration::default());
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);
    let (runs, seen) = counter();
    let menu = h
        .nav
        .build_menu(MenuBuilder::new("Save").option(MenuOption::async_button("Save now", move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            let _ = release_rx.lock().recv_timeout(Duration::from_secs(5));
        })))
        .unwrap();
    h.nav.open_menu_for_player(P, &menu);
    h.nav.handle_key(press(KeyBind::E));
    assert!(h.host.text(P).unwrap().contains("Processing..."));

    // second press while loading is ignored
    h.nav.handle_key(press(KeyBind::E));
    release_tx.send(()).unwrap();

    let option = menu.options().get(0).unwrap();
    assert!(tick_until(&h.nav, || !option.as_async_button().unwrap().is_loading(P)));
    h.nav.tick();
    assert!(!h.host.text(P).unwrap().contains("Processing..."));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(menu.is_open_for(P));
}

#[test]
fn async_close_after_select_waits_for_handler() {
    let h = harness(MenuManagerConfiguration::default());
    let menu = h
        .nav
        .build_menu(
            MenuBuilder::new("Async")
                .option(MenuOption::async_button("Go", |_| {}).close_after_select(true)),
        )
        .unwrap();
    h.nav.open_menu_for_player(P, &menu);
    h.nav.handle_key(press(KeyBind::E));
    assert!(tick_until(&h.nav, || h.nav.current_menu(P).is_none()));
}

#[test]
fn async_panic_clears_loading() {
    let h = harness(MenuManagerConfiguration::default());
    let menu = h
        .nav
        .build_menu(MenuBuilder::new("Boom").option(MenuOption::async_button("Explode", |_| {
            panic!("handler exploded");
        })))
        .unwrap();
    h.nav.open_menu_for_player(P, &menu);
    h.nav.handle_key(press(KeyBind::E));
    let option = menu.options().get(0).unwrap();
    assert!(tick_until(&h.nav, || !option.as_async_button().unwrap().is_loading(P)));
    assert!(menu.is_open_for(P));
    assert!(!h.host.text(P).unwrap().contains("Processing..."));
}

#[test]
fn dispose_closes_for_every_holder() {
    let h = harness(MenuManagerConfiguration::default());
    let (closed, seen) = counter();
    h.nav.on_menu_closed(move |_, _| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    let menu = h
        .nav
        .build_menu(MenuBuilder::new("Gone").freeze_player(true).option(MenuOption::text("x")))
        .unwrap();
    let q = PlayerId(2);
    h.nav.open_menu_for_player(P, &menu);
    h.nav.open_menu_for_player(q, &menu);
    assert!(h.host.is_frozen(P));

    h.nav.dispose_menu(&menu);
    assert_eq!(closed.load(Ordering::SeqCst), 2);
    assert!(h.host.text(P).is_none() && h.host.text(q).is_none());
    assert!(!h.host.is_frozen(P));
    assert!(h.nav.current_menu(P).is_none());
    assert!(!h.nav.open_menu_for_player(P, &menu));
    assert!(h.nav.current_menu(P).is_none());
}

#[test]
fn disconnect_forgets_player_values() {
    let h = harness(MenuManagerConfiguration::default());
    let menu = h
        .nav
        .build_menu(MenuBuilder::new("Prefs").option(MenuOption::toggle("Music", true)))
        .unwrap();
    h.nav.open_menu_for_player(P, &menu);
    h.nav.handle_key(press(KeyBind::E));
    let toggle = menu.options().get(0).unwrap();
    assert!(!toggle.as_toggle().unwrap().value(P));

    h.host.invalidate(P);
    h.nav.on_player_disconnected(P);
    assert!(h.nav.current_menu(P).is_none());
    assert!(!menu.is_open_for(P));
    assert!(toggle.as_toggle().unwrap().value(P));
}

#[test]
fn invalid_player_cannot_open() {
    let h = harness(MenuManagerConfiguration::default());
    let menu = h.nav.build_menu(MenuBuilder::new("Nope")).unwrap();
    h.host.invalidate(P);
    assert!(!h.nav.open_menu_for_player(P, &menu));
    assert_eq!(h.nav.open_count(), 0);
}

#[test]
fn close_all_menus_walks_chains() {
    let h = harness(MenuManagerConfiguration::default());
    let (closed, seen) = counter();
    h.nav.on_menu_closed(move |_, _| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    let child = h.nav.build_menu(MenuBuilder::new("Child")).unwrap();
    let root = h
        .nav
        .build_menu(MenuBuilder::new("Root").option(MenuOption::submenu("Go", Arc::clone(&child))))
        .unwrap();
    h.nav.open_menu_for_player(P, &root);
    h.nav.handle_key(press(KeyBind::E));
    h.nav.open_menu_for_player(PlayerId(2), &root);

    h.nav.close_all_menus();
    assert_eq!(closed.load(Ordering::SeqCst), 3);
    assert_eq!(h.nav.open_count(), 0);
}

#[test]
fn render_loop_advances_scrolling_and_tick_flushes() {
    let h = harness(MenuManagerConfiguration::default());
    let style = HorizontalStyle::new(OverflowStyle::ScrollLoop(ScrollDirection::Left), 5.0).ticks_per_scroll(1);
    let menu = h
        .nav
        .build_menu(
            MenuBuilder::new("Marquee")
                .default_style(style)
                .option(MenuOption::text("a rather long scrolling label")),
        )
        .unwrap();
    h.nav.open_menu_for_player(P, &menu);
    let first = h.host.text(P).unwrap();

    h.nav.start_render_loop();
    assert!(h.nav.is_render_loop_running());
    h.scheduler.advance(millis(100));
    // the render pass only fills the cache
    assert_eq!(h.host.text(P).unwrap(), first);
    h.nav.tick();
    assert_ne!(h.host.text(P).unwrap(), first);

    h.nav.stop_render_loop();
    assert!(!h.nav.is_render_loop_running());
    assert_eq!(h.scheduler.pending(), 0);
}

#[test]
fn tick_rerenders_after_option_added() {
    let h = harness(MenuManagerConfiguration::default());
    let menu = h.nav.build_menu(MenuBuilder::new("Grow")).unwrap();
    h.nav.open_menu_for_player(P, &menu);
    menu.add_option(MenuOption::text("fresh")).unwrap();
    assert!(!h.host.text(P).unwrap().contains("fresh"));
    h.nav.tick();
    assert!(h.host.text(P).unwrap().contains("fresh"));
}

#[test]
fn providers_may_read_navigator_and_menu_state() {
    let h = harness(MenuManagerConfiguration::default());
    let nav = Arc::downgrade(&h.nav);
    let menu = h
        .nav
        .build_menu(
            MenuBuilder::new("Lobby")
                .option(MenuOption::button("Ready", |_| {}))
                .option(MenuOption::dynamic_text(move |player| {
                    let open = nav
                        .upgrade()
                        .and_then(|nav| nav.current_menu(player))
                        .map_or(0, |menu| menu.options().len());
                    format!("{open} rows here")
                })),
        )
        .unwrap();

    let (tx, rx) = mpsc::channel();
    let (nav, host) = (Arc::clone(&h.nav), Arc::clone(&h.host));
    std::thread::spawn(move || {
        nav.open_menu_for_player(P, &menu);
        nav.handle_key(press(KeyBind::SHIFT));
        nav.render_frame();
        nav.tick();
        let _ = tx.send(host.text(P));
    });
    let text = rx.recv_timeout(Duration::from_secs(3)).expect("navigator finished").unwrap();
    assert!(text.contains("2 rows here"));
}
