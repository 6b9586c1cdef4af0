//! Menu navigation through the controller with mock hardware

use rs_braille::{
    encode,
    hal::{MockMatrix, MockPanel, MockTone},
    BrailleController, Cell, Config, Effect, InputEvents, NavState, NavigationConfig, RawInputs,
    Rotation, Screen,
};

type Controller = BrailleController<MockMatrix, MockPanel, MockTone>;

const FEED: &str = "kitchen-light1;light2,bath,garage-door";

fn controller() -> Controller {
    let config = Config::default().with_navigation(
        NavigationConfig::default()
            .with_active_window_ms(10_000)
            .with_welcome_ms(2_000),
    );
    let mut c =
        BrailleController::new(MockMatrix::new(), MockPanel::new(), MockTone::new(), &config);
    c.init(0).unwrap();
    c
}

/// Menu loaded and woken by proximity at t = 10 (no welcome screen).
fn awake() -> Controller {
    let mut c = controller();
    c.load_feed(FEED).unwrap();
    c.apply_events(InputEvents::proximity(), 10).unwrap();
    c
}

/// Cells currently raised on the whole panel.
fn braille(c: &Controller) -> Vec<Cell> {
    c.matrix().cells(c.layout(), c.layout().len())
}

/// `text` as the panel should show it, blank-padded.
fn padded(text: &str) -> Vec<Cell> {
    let mut cells = encode(text, 13).to_vec();
    cells.resize(13, Cell::BLANK);
    cells
}

fn idle() -> RawInputs {
    RawInputs {
        clk: true,
        dt: true,
        ..RawInputs::default()
    }
}

// ============================================================================
// Startup and Wake
// ============================================================================

#[test]
fn boots_asleep_and_blank() {
    let c = controller();
    assert_eq!(c.navigator().state(), NavState::Sleeping);
    assert_eq!(c.shown(), Some(&Screen::Blank));
    assert_eq!(c.panel().lines(), ("", ""));
    assert!(c.panel().initialized);
    assert!(c.matrix().visible.is_empty());
}

#[test]
fn feed_while_asleep_does_not_draw() {
    let mut c = controller();
    let shows = c.panel().show_count;
    c.load_feed(FEED).unwrap();
    assert_eq!(c.panel().show_count, shows);
    assert_eq!(c.shown(), Some(&Screen::Blank));
}

#[test]
fn button_wake_shows_welcome_then_menu() {
    let mut c = controller();
    c.load_feed(FEED).unwrap();

    let effects = c.apply_events(InputEvents::select(), 100).unwrap();
    assert!(effects.is_empty());
    assert_eq!(c.panel().lines(), ("Welcome", "User"));
    assert_eq!(braille(&c), padded("welcomeUser"));
    // The waking press is consumed
    assert_eq!(c.navigator().state(), NavState::RoomsMenu);
    assert!(c.buzzer().history.is_empty());

    c.apply_events(InputEvents::default(), 1_000).unwrap();
    assert_eq!(c.panel().lines(), ("Welcome", "User"));

    c.apply_events(InputEvents::default(), 2_100).unwrap();
    assert_eq!(c.panel().lines(), ("Selected:", "kitchen"));
    assert_eq!(braille(&c), padded("kitchen"));
}

#[test]
fn proximity_wake_skips_welcome() {
    let c = awake();
    assert_eq!(c.navigator().state(), NavState::RoomsMenu);
    assert_eq!(c.panel().lines(), ("Selected:", "kitchen"));
}

#[test]
fn input_during_welcome_dismisses_it_and_acts() {
    let mut c = controller();
    c.load_feed(FEED).unwrap();
    c.apply_events(InputEvents::select(), 100).unwrap();

    c.apply_events(InputEvents::rotate(Rotation::Next), 500).unwrap();
    assert_eq!(c.panel().lines(), ("Selected:", "bath"));
    assert_eq!(c.buzzer().history, [831]);
}

#[test]
fn waiting_screen_until_menu_arrives() {
    let mut c = controller();
    c.apply_events(InputEvents::proximity(), 10).unwrap();
    assert_eq!(c.panel().lines(), ("Waiting for", "menu..."));
    assert_eq!(braille(&c), padded("wait"));

    // Navigation is ignored without a menu
    c.apply_events(InputEvents::select(), 20).unwrap();
    assert_eq!(c.panel().lines(), ("Waiting for", "menu..."));
    assert!(c.buzzer().history.is_empty());

    c.load_feed(FEED).unwrap();
    assert_eq!(c.panel().lines(), ("Selected:", "kitchen"));
}

// ============================================================================
// Raw Pin Decoding
// ============================================================================

#[test]
fn encoder_and_buttons_from_raw_levels() {
    let mut c = awake();

    // CLK falls while DT stays high: next
    let step = RawInputs {
        clk: false,
        dt: true,
        ..RawInputs::default()
    };
    c.tick(step, 200).unwrap();
    assert_eq!(c.panel().lines(), ("Selected:", "bath"));
    c.tick(idle(), 220).unwrap();

    // Next button press
    c.tick(
        RawInputs {
            next: true,
            ..idle()
        },
        240,
    )
    .unwrap();
    assert_eq!(c.panel().lines(), ("Selected:", "garage"));
    c.tick(idle(), 260).unwrap();

    // CLK falls with DT low: previous
    c.tick(
        RawInputs {
            clk: false,
            dt: false,
            ..RawInputs::default()
        },
        400,
    )
    .unwrap();
    assert_eq!(c.panel().lines(), ("Selected:", "bath"));
    assert_eq!(c.buzzer().history, [831, 831, 659]);
}

#[test]
fn encoder_steps_inside_debounce_are_dropped() {
    let mut c = awake();
    let low = RawInputs {
        clk: false,
        dt: true,
        ..RawInputs::default()
    };
    c.tick(low, 200).unwrap();
    c.tick(idle(), 220).unwrap();
    c.tick(low, 240).unwrap();
    assert_eq!(c.panel().lines(), ("Selected:", "bath"));
}

#[test]
fn held_button_fires_once() {
    let mut c = awake();
    let held = RawInputs {
        enter: true,
        ..idle()
    };
    c.tick(held, 100).unwrap();
    c.tick(held, 120).unwrap();
    c.tick(held, 140).unwrap();
    assert_eq!(c.navigator().state(), NavState::DeviceMenu);
    assert_eq!(c.buzzer().history, [523]);
}

// ============================================================================
// Menu Walk
// ============================================================================

#[test]
fn rooms_wrap_both_ways() {
    let mut c = awake();
    c.apply_events(InputEvents::rotate(Rotation::Prev), 20).unwrap();
    assert_eq!(c.panel().lines(), ("Selected:", "garage"));
    c.apply_events(InputEvents::rotate(Rotation::Next), 40).unwrap();
    assert_eq!(c.panel().lines(), ("Selected:", "kitchen"));
}

#[test]
fn device_status_and_toggle_flow() {
    let mut c = awake();

    c.apply_events(InputEvents::select(), 20).unwrap();
    assert_eq!(c.navigator().state(), NavState::DeviceMenu);
    assert_eq!(c.panel().lines(), ("Device:", "light1"));
    assert_eq!(braille(&c), padded("light1"));

    let effects = c.apply_events(InputEvents::select(), 40).unwrap();
    assert_eq!(
        effects,
        vec![Effect::RequestStatus {
            room: "kitchen".into(),
            device: "light1".into()
        }]
    );
    assert_eq!(c.navigator().state(), NavState::ViewingStatus);
    assert_eq!(c.panel().lines(), ("Status:", "OFF"));
    assert_eq!(braille(&c), padded("off"));

    c.apply_status("kitchen", "light1", true).unwrap();
    assert_eq!(c.panel().lines(), ("Status:", "ON"));
    assert_eq!(braille(&c), padded("on"));

    let effects = c.apply_events(InputEvents::select(), 60).unwrap();
    assert_eq!(
        effects,
        vec![Effect::Toggle {
            room: "kitchen".into(),
            device: "light1".into()
        }]
    );
    assert_eq!(c.navigator().state(), NavState::DeviceMenu);
    // Optimistic flip until the device reports back
    assert!(!c.navigator().states().get("kitchen/light1"));

    c.apply_events(InputEvents::back(), 80).unwrap();
    assert_eq!(c.navigator().state(), NavState::RoomsMenu);
    assert_eq!(c.panel().lines(), ("Selected:", "kitchen"));

    assert_eq!(c.buzzer().history, [523, 523, 1047, 392]);
}

#[test]
fn rotating_out_of_status_moves_the_device_cursor() {
    let mut c = awake();
    c.apply_events(InputEvents::select(), 20).unwrap();
    c.apply_events(InputEvents::select(), 40).unwrap();
    assert_eq!(c.navigator().state(), NavState::ViewingStatus);

    c.apply_events(InputEvents::rotate(Rotation::Next), 60).unwrap();
    assert_eq!(c.navigator().state(), NavState::DeviceMenu);
    assert_eq!(c.panel().lines(), ("Device:", "light2"));
}

#[test]
fn select_on_room_without_devices_is_rejected() {
    let mut c = awake();
    c.apply_events(InputEvents::rotate(Rotation::Next), 20).unwrap();
    c.apply_events(InputEvents::select(), 40).unwrap();
    assert_eq!(c.navigator().state(), NavState::RoomsMenu);
    assert_eq!(c.panel().lines(), ("Selected:", "bath"));
    assert_eq!(c.buzzer().history.last(), Some(&220));
}

#[test]
fn back_in_rooms_menu_does_nothing() {
    let mut c = awake();
    let shows = c.panel().show_count;
    c.apply_events(InputEvents::back(), 20).unwrap();
    assert_eq!(c.navigator().state(), NavState::RoomsMenu);
    assert_eq!(c.panel().show_count, shows);
    assert!(c.buzzer().history.is_empty());
}

#[test]
fn tones_stop_after_their_duration() {
    let mut c = awake();
    c.apply_events(InputEvents::rotate(Rotation::Next), 20).unwrap();
    assert_eq!(c.buzzer().frequency_hz, Some(831));

    c.apply_events(InputEvents::default(), 119).unwrap();
    assert_eq!(c.buzzer().frequency_hz, Some(831));

    c.apply_events(InputEvents::default(), 120).unwrap();
    assert_eq!(c.buzzer().frequency_hz, None);
}

// ============================================================================
// Sleep
// ============================================================================

#[test]
fn idle_window_shows_goodbye_and_clears_braille() {
    let mut c = awake();
    c.apply_events(InputEvents::default(), 10_009).unwrap();
    assert_eq!(c.navigator().state(), NavState::RoomsMenu);

    c.apply_events(InputEvents::default(), 10_010).unwrap();
    assert_eq!(c.navigator().state(), NavState::Sleeping);
    assert_eq!(c.panel().lines(), ("Goodbye", "User"));
    assert!(c.matrix().visible.is_empty());
}

#[test]
fn presence_in_front_of_the_sensor_keeps_it_awake() {
    let mut c = controller();
    c.load_feed(FEED).unwrap();
    let near = RawInputs {
        proximity: true,
        ..idle()
    };

    for now in (0..=15_000).step_by(20) {
        c.tick(near, now).unwrap();
    }
    assert_eq!(c.navigator().state(), NavState::RoomsMenu);
    assert_eq!(c.panel().lines(), ("Selected:", "kitchen"));

    // Walks away
    c.tick(idle(), 15_020).unwrap();
    c.tick(idle(), 25_000).unwrap();
    assert_eq!(c.navigator().state(), NavState::Sleeping);
}

#[test]
fn wake_resumes_where_it_slept() {
    let mut c = awake();
    c.apply_events(InputEvents::select(), 20).unwrap();
    c.apply_events(InputEvents::rotate(Rotation::Next), 40).unwrap();
    c.apply_events(InputEvents::default(), 10_040).unwrap();
    assert_eq!(c.navigator().state(), NavState::Sleeping);

    // Waking press shows the welcome and is not acted on
    let effects = c.apply_events(InputEvents::select(), 12_000).unwrap();
    assert!(effects.is_empty());
    assert_eq!(c.panel().lines(), ("Welcome", "User"));
    assert_eq!(c.navigator().state(), NavState::DeviceMenu);

    c.apply_events(InputEvents::default(), 14_000).unwrap();
    assert_eq!(c.panel().lines(), ("Device:", "light2"));
}
