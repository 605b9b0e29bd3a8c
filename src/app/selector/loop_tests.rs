use super::*;
use crate::app::log::testing::recording;
use crate::app::log::FaultLog;
use crate::domain::console::MockKeySource;
use crate::domain::models::PagerSignal;
use crate::infrastructure::keys::ScriptedKeys;
use crate::infrastructure::scrollback_console::ScrollbackConsole;
use crossterm::event::{KeyCode, KeyModifiers};
use rand::{Rng, SeedableRng};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::sync::atomic::AtomicUsize;

fn test_config() -> LauncherConfig {
    LauncherConfig {
        poll_interval_ms: 1,
        idle_poll_ms: 0,
        max_idle_polls: 1,
        ..LauncherConfig::default()
    }
}

fn screen_with(keys: Box<dyn KeySource>, log: FaultLog) -> Screen {
    let terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
    let console = ScrollbackConsole::new(terminal).unwrap();
    Screen::new(
        Box::new(console),
        keys,
        Arc::new(test_config()),
        Arc::new(Theme::default()),
        log,
    )
}

fn screen_text(screen: &Screen) -> Vec<String> {
    let surface = screen.surface();
    (0..surface.buffer_height())
        .map(|row| surface.console().row_text(row))
        .filter(|line| !line.is_empty())
        .collect()
}

fn run(screen: &Screen, registry: &Registry) -> Result<(), LauncherError> {
    let running = Arc::new(AtomicBool::new(false));
    let current = Mutex::new(None);
    let result = run_loop(screen, registry, &running, &current);
    assert!(!running.load(Ordering::SeqCst));
    assert!(current.lock().is_none());
    result
}

#[test]
fn test_typed_command_runs_then_exit() {
    let registry = Registry::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    registry.add("say hello", move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    registry.add("count lines", || {});

    let screen = screen_with(
        Box::new(ScriptedKeys::from_text("hel\nexit\n")),
        FaultLog::noop(),
    );
    run(&screen, &registry).unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    let text = screen_text(&screen);
    assert!(text.contains(&"\u{bb}say hello".to_string()), "{text:?}");
    assert!(text.contains(&"\u{bb}Exit application".to_string()), "{text:?}");

    // Executed commands move to the top
    let names: Vec<String> = registry.snapshot().into_iter().map(|c| c.name).collect();
    assert_eq!(names[0], "Exit application");
    assert_eq!(names[1], "say hello");
}

#[test]
fn test_navigation_picks_second_candidate() {
    let registry = Registry::new();
    let picked = Arc::new(parking_lot::Mutex::new(Vec::new()));
    for name in ["red", "green", "blue"] {
        let picked = Arc::clone(&picked);
        registry.add(name, move || picked.lock().push(name));
    }

    // "e" matches blue, green, red, Exit application in that order
    let mut keys = ScriptedKeys::from_text("e");
    keys.press(KeyCode::Down)
        .press(KeyCode::Down)
        .press(KeyCode::Up)
        .press(KeyCode::Enter)
        .type_text("exit\n");
    let screen = screen_with(Box::new(keys), FaultLog::noop());
    run(&screen, &registry).unwrap();

    assert_eq!(picked.lock().as_slice(), ["green"]);
}

#[test]
fn test_escape_and_blank_queries_run_nothing() {
    let registry = Registry::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    registry.add("always", move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let screen = screen_with(
        Box::new(ScriptedKeys::from_text("alw\x1b\n \nzz\x1bexit\n")),
        FaultLog::noop(),
    );
    run(&screen, &registry).unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_no_match_is_shown_then_next_key_filters_everything() {
    let registry = Registry::new();
    registry.add("alpha", || {});

    // The script runs out while the query is still open
    let screen = screen_with(Box::new(ScriptedKeys::from_text("alq")), FaultLog::noop());
    let result = run(&screen, &registry);
    assert!(matches!(result, Err(LauncherError::Io(_))), "{result:?}");
    assert_eq!(screen_text(&screen), vec!["no match for alq"]);

    let screen = screen_with(Box::new(ScriptedKeys::from_text("alqp")), FaultLog::noop());
    assert!(run(&screen, &registry).is_err());
    let text = screen_text(&screen);
    assert!(!text.iter().any(|line| line.starts_with("no match")), "{text:?}");
    assert!(text.iter().any(|line| line.ends_with("alpha")), "{text:?}");
    assert!(
        text.iter().any(|line| line.ends_with("Exit application")),
        "{text:?}"
    );
}

#[test]
fn test_action_faults_are_reported_and_survived() {
    let registry = Registry::new();
    registry.add_action("broken", || Err(anyhow::anyhow!("boom")));
    registry.add("explode", || panic!("kaboom"));

    let (log, lines) = recording();
    let screen = screen_with(
        Box::new(ScriptedKeys::from_text("broken\nexplode\nexit\n")),
        log,
    );
    run(&screen, &registry).unwrap();

    let lines = lines.lock();
    assert_eq!(lines.len(), 2, "{lines:?}");
    assert_eq!(
        lines[0],
        "action failed: command `broken` failed: boom"
    );
    assert_eq!(
        lines[1],
        "action failed: command `explode` failed: panicked: kaboom"
    );
    let text = screen_text(&screen);
    assert!(text.iter().any(|line| line == "command `broken` failed: boom"));
}

#[test]
fn test_escaped_pager_signal_is_not_a_fault() {
    let registry = Registry::new();
    registry.add_action("pages", || {
        Ok(Flow::Break(PagerSignal {
            words: vec!["stop".to_string()],
            numbers: vec![],
        }))
    });

    let (log, lines) = recording();
    let screen = screen_with(Box::new(ScriptedKeys::from_text("pages\nexit\n")), log);
    run(&screen, &registry).unwrap();

    assert!(lines.lock().is_empty());
}

#[test]
fn test_action_can_page_through_the_screen() {
    let registry = Arc::new(Registry::new());
    let screen = screen_with(
        Box::new(ScriptedKeys::from_text("print\n2\nexit\n")),
        FaultLog::noop(),
    );
    let seen = Arc::new(parking_lot::Mutex::new(None));
    {
        let screen = screen.clone();
        let seen = Arc::clone(&seen);
        registry.add_action("print many", move || {
            let mut pager = screen.pager();
            let result = pager.choose(&["one", "two", "three"]);
            *seen.lock() = result;
            Ok(Flow::Continue(()))
        });
    }

    run(&screen, &registry).unwrap();

    assert_eq!(*seen.lock(), Some(1));
}

#[test]
fn test_vanished_command_is_reported() {
    let registry = Registry::new();
    let screen = screen_with(Box::new(ScriptedKeys::new()), FaultLog::noop());
    let ghost = Command {
        name: "ghost".to_string(),
        action: Arc::new(|| panic!("must not run")),
        rank: 0,
    };

    execute(&screen, &registry, &ghost, &Mutex::new(None)).unwrap();

    assert_eq!(screen_text(&screen), vec!["\u{bb}ghost is no longer available"]);
}

#[test]
fn test_idle_scroll_key_hands_over_next_key() {
    let registry = Registry::new();
    let mut keys = ScriptedKeys::new();
    keys.press(KeyCode::PageUp)
        .press(KeyCode::Down)
        .type_text("exit\n");
    let screen = screen_with(Box::new(keys), FaultLog::noop());

    run(&screen, &registry).unwrap();

    assert!(screen_text(&screen).contains(&"\u{bb}Exit application".to_string()));
}

#[tokio::test]
async fn test_stop_from_another_thread() {
    let mut keys = MockKeySource::new();
    keys.expect_poll().returning(|timeout| {
        std::thread::sleep(timeout);
        Ok(false)
    });
    keys.expect_read_key().never();

    let screen = screen_with(Box::new(keys), FaultLog::noop());
    let registry = Arc::new(Registry::new());
    let running = Arc::new(AtomicBool::new(false));

    let handle = {
        let running = Arc::clone(&running);
        let registry = Arc::clone(&registry);
        tokio::task::spawn_blocking(move || {
            run_loop(&screen, &registry, &running, &Mutex::new(None))
        })
    };

    while !running.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    // Commands can be added while the loop waits for keys
    registry.add("late", || {});
    running.store(false, Ordering::SeqCst);

    let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
    match result {
        Ok(res) => res.unwrap().unwrap(),
        Err(_) => panic!("Loop did not stop - possible deadlock"),
    }
    assert!(registry.contains("late"));
    assert!(registry.contains("Exit application"));
}

#[tokio::test]
async fn test_keystroke_fuzzing() {
    let registry = Arc::new(Registry::new());
    let runs = Arc::new(AtomicUsize::new(0));
    for name in ["alpha one", "beta two", "gamma three", "delta four"] {
        let runs = Arc::clone(&runs);
        registry.add(name, move || {
            runs.fetch_add(1, Ordering::SeqCst);
        });
    }
    registry.add_action("fail sometimes", || Err(anyhow::anyhow!("nope")));

    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let mut keys = ScriptedKeys::new();
    for _ in 0..5000 {
        keys.push(generate_random_key(&mut rng));
    }
    keys.press(KeyCode::Esc).type_text("exit\n");

    let screen = screen_with(Box::new(keys), FaultLog::noop());
    let result = tokio::time::timeout(
        Duration::from_secs(30),
        tokio::task::spawn_blocking(move || run(&screen, &registry)),
    )
    .await;

    match result {
        Ok(res) => res.unwrap().unwrap(),
        Err(_) => panic!("Fuzzer timed out - possible deadlock or too slow"),
    }
}

fn generate_random_key<R: Rng>(rng: &mut R) -> KeyEvent {
    let code = match rng.gen_range(0..20) {
        0 => KeyCode::Esc,
        1 => KeyCode::Enter,
        2 => KeyCode::Left,
        3 => KeyCode::Right,
        4 => KeyCode::Up,
        5 => KeyCode::Down,
        6 => KeyCode::Home,
        7 => KeyCode::End,
        8 => KeyCode::PageUp,
        9 => KeyCode::PageDown,
        10 => KeyCode::Tab,
        11 => KeyCode::Delete,
        12 => KeyCode::Backspace,
        _ => {
            let c = rng.gen_range(b' '..=b'~') as char;
            KeyCode::Char(c)
        }
    };

    let mut modifiers = KeyModifiers::empty();
    if rng.gen_bool(0.1) {
        modifiers.insert(KeyModifiers::CONTROL);
    }
    if rng.gen_bool(0.1) {
        modifiers.insert(KeyModifiers::ALT);
    }

    KeyEvent::new(code, modifiers)
}
