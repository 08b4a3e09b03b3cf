//! Integration tests for the host hooks: settings load/save ordering,
//! M150 gating and shutdown.

use ledstrip::app::channel::Channel;
use ledstrip::app::commands::HostCommand;
use ledstrip::app::service::LedStripService;
use ledstrip::config::{BackendKind, LedSettings};
use serde_json::json;

use super::mock_hw::{MemSettings, MockBackend, PinCall, pins};

fn make_service(settings: LedSettings) -> LedStripService<MockBackend, MemSettings> {
    let mut svc = LedStripService::new(MockBackend::new(), MemSettings::with(settings));
    svc.on_after_startup();
    svc.on_settings_initialized();
    svc
}

#[test]
fn settings_initialized_binds_stored_pins() {
    let svc = make_service(pins(11, 13, 0, 0));
    assert_eq!(svc.registry().bound().as_slice(), &[Channel::R, Channel::G]);
}

#[test]
fn first_run_uses_defaults_and_binds_nothing() {
    let mut svc = LedStripService::new(MockBackend::new(), MemSettings::new());
    let bound = svc.on_settings_initialized();
    assert!(bound.is_empty());
    assert_eq!(svc.settings(), &LedSettings::default());
}

#[test]
fn m150_is_dispatched() {
    let mut svc = make_service(pins(11, 13, 15, 0));
    svc.backend().clear();

    svc.handle_gcode("M150 R255 U128", true);

    let hw = svc.backend();
    assert_eq!(hw.last_duty(11), Some(100.0));
    assert!((hw.last_duty(13).unwrap() - 50.196).abs() < 0.01);
    assert_eq!(hw.last_duty(15), Some(0.0), "unmentioned channel turned off");
}

#[test]
fn other_commands_are_ignored() {
    let mut svc = make_service(pins(11, 13, 15, 0));
    svc.backend().clear();

    svc.handle_gcode("G28", true);
    svc.handle_gcode("m150 R255", true);
    svc.handle_gcode("M150 R255", false);

    assert!(svc.backend().calls().is_empty());
}

#[test]
fn settings_save_tears_down_persists_and_rebinds() {
    let mut svc = make_service(pins(11, 0, 0, 0));
    svc.backend().clear();

    let bound = svc.on_settings_save(&json!({ "r": 0, "g": "13", "w": -4 }));

    assert_eq!(bound.as_slice(), &[Channel::G]);
    assert_eq!(
        svc.backend().calls(),
        vec![
            PinCall::Start { pin: 11, duty: 0.0 },
            PinCall::Stop { pin: 11 },
            PinCall::Release(BackendKind::SoftPwm),
            PinCall::Open { kind: BackendKind::SoftPwm, pin: 13 },
            PinCall::Start { pin: 13, duty: 100.0 },
        ]
    );
    let stored = svc.store().stored.clone().unwrap();
    assert_eq!((stored.r, stored.g, stored.w), (0, 13, 0));
    assert_eq!(svc.store().saves, 1);
}

#[test]
fn backend_switch_releases_the_old_backend() {
    let mut svc = make_service(pins(11, 0, 0, 0));
    svc.backend().clear();

    svc.on_settings_save(&json!({ "pigpiod": true }));

    let calls = svc.backend().calls();
    assert!(calls.contains(&PinCall::Release(BackendKind::SoftPwm)));
    assert!(calls.contains(&PinCall::Open { kind: BackendKind::Pigpiod, pin: 11 }));
    assert_eq!(svc.registry().active_backend(), Some(BackendKind::Pigpiod));
}

#[test]
fn failed_persist_still_applies_settings() {
    let mut store = MemSettings::with(pins(11, 0, 0, 0));
    store.fail_save = true;
    let mut svc = LedStripService::new(MockBackend::new(), store);
    svc.on_settings_initialized();

    let bound = svc.on_settings_save(&json!({ "b": 15 }));
    assert_eq!(bound.as_slice(), &[Channel::R, Channel::B]);
    assert_eq!(svc.store().saves, 0);
}

#[test]
fn on_startup_false_starts_dark() {
    let svc = make_service(LedSettings { on_startup: false, ..pins(11, 0, 0, 0) });
    assert_eq!(svc.backend().last_duty(11), Some(0.0));
}

#[test]
fn shutdown_unbinds_and_disconnects() {
    let mut svc = make_service(LedSettings { pigpiod: true, ..pins(11, 13, 0, 0) });
    svc.backend().clear();

    svc.handle_command(HostCommand::Shutdown);

    assert!(svc.registry().bound().is_empty());
    let calls = svc.backend().calls();
    assert_eq!(calls.last(), Some(&PinCall::Disconnect));
    assert_eq!(calls.iter().filter(|c| matches!(c, PinCall::Stop { .. })).count(), 2);

    // Commands after shutdown are harmless no-ops.
    svc.backend().clear();
    svc.handle_gcode("M150 R255", true);
    assert!(svc.backend().calls().is_empty());
}

#[test]
fn host_command_lines_drive_the_service() {
    let mut svc = make_service(pins(11, 0, 0, 0));
    for line in ["M150 R0", r#"@settings {"b": 15}"#, "M150 B255"] {
        if let Some(cmd) = HostCommand::from_line(line).unwrap() {
            svc.handle_command(cmd);
        }
    }
    assert_eq!(svc.backend().last_duty(15), Some(100.0));
    assert_eq!(svc.settings().b, 15);
}

#[test]
fn garbled_line_does_not_stop_the_stream() {
    let mut svc = make_service(pins(11, 0, 0, 0));
    svc.backend().clear();

    let input = std::io::Cursor::new(b"M150 R255\n\xff\nM150 R0\n".to_vec());
    svc.serve(input).unwrap();

    assert_eq!(
        svc.backend().calls(),
        vec![
            PinCall::Start { pin: 11, duty: 100.0 },
            PinCall::Start { pin: 11, duty: 0.0 },
            // teardown on EOF
            PinCall::Start { pin: 11, duty: 0.0 },
            PinCall::Stop { pin: 11 },
            PinCall::Release(BackendKind::SoftPwm),
            PinCall::Disconnect,
        ]
    );
}

#[test]
fn shutdown_line_ends_the_stream() {
    let mut svc = make_service(pins(11, 0, 0, 0));
    svc.backend().clear();

    let input = std::io::Cursor::new(b"@shutdown\nM150 R255\n".to_vec());
    svc.serve(input).unwrap();

    assert_eq!(svc.backend().last_duty(11), Some(0.0));
    assert_eq!(svc.backend().calls().last(), Some(&PinCall::Disconnect));
}

/// Yields one line, then fails every read.
struct BrokenPipe {
    first: Option<&'static [u8]>,
}

impl std::io::Read for BrokenPipe {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.first.take() {
            Some(line) => {
                buf[..line.len()].copy_from_slice(line);
                Ok(line.len())
            }
            None => Err(std::io::Error::other("stdin went away")),
        }
    }
}

#[test]
fn read_error_still_tears_down() {
    let mut svc = make_service(LedSettings { piblaster: true, ..pins(11, 13, 0, 0) });
    svc.backend().clear();

    let input = std::io::BufReader::new(BrokenPipe { first: Some(b"M150 R255 U255\n") });
    assert!(svc.serve(input).is_err());

    assert!(svc.registry().bound().is_empty());
    let calls = svc.backend().calls();
    assert!(calls.contains(&PinCall::Stop { pin: 11 }));
    assert!(calls.contains(&PinCall::Stop { pin: 13 }));
    assert_eq!(calls.last(), Some(&PinCall::Disconnect));
}
