//! Tests for gate construction and per-request decisions.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use http::header::{CONTENT_TYPE, RETRY_AFTER};
use http::{Request, StatusCode};
use tempfile::TempDir;

use super::{Decision, MaintenanceGate, PassReason, StartupError};
use crate::bypass::Identity;
use crate::control::{MaintenanceControl, MaintenanceSwitch};
use crate::options::{BaseDir, OptionCollection, OptionError, OptionsBuilder};
use crate::response::{DEFAULT_DOCUMENT, HostingEnvironment, ResponseError};

/// Control service exposing both optional capabilities.
#[derive(Debug, Default)]
struct MockControl {
    on: AtomicBool,
    overrides: Mutex<Option<Arc<OptionCollection>>>,
    override_calls: AtomicUsize,
    restore_calls: AtomicUsize,
}

impl MockControl {
    fn on() -> Self {
        Self {
            on: AtomicBool::new(true),
            ..Self::default()
        }
    }

    fn with_override(self, options: Option<OptionCollection>) -> Self {
        *self.overrides.lock().unwrap() = options.map(Arc::new);
        self
    }

    fn restores(&self) -> usize {
        self.restore_calls.load(Ordering::SeqCst)
    }

    fn override_calls(&self) -> usize {
        self.override_calls.load(Ordering::SeqCst)
    }
}

impl MaintenanceControl for MockControl {
    fn is_maintenance_mode_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }

    fn can_override_options(&self) -> bool {
        true
    }

    fn options_to_override(&self) -> Option<Arc<OptionCollection>> {
        self.override_calls.fetch_add(1, Ordering::SeqCst);
        self.overrides.lock().unwrap().clone()
    }

    fn can_restore_state(&self) -> bool {
        true
    }

    fn restore_state(&self) {
        self.restore_calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn env() -> HostingEnvironment {
    HostingEnvironment::new("wwwroot", ".")
}

fn defaults(retry: u32) -> OptionsBuilder {
    OptionsBuilder::new().use_default_response().retry_interval(retry)
}

fn request(path: &str) -> Request<()> {
    Request::get(path).body(()).unwrap()
}

fn request_as(path: &str, identity: Identity) -> Request<()> {
    let mut req = request(path);
    req.extensions_mut().insert(identity);
    req
}

mod startup {
    use super::*;

    #[test]
    fn zero_response_sources_fails() {
        let switch = MaintenanceSwitch::new(true);
        let options = OptionsBuilder::new().use_no_defaults().retry_interval(60);

        let result = MaintenanceGate::new(switch, &env(), &options);

        assert!(matches!(
            result,
            Err(StartupError::Options(OptionError::NoResponseSource))
        ));
    }

    #[test]
    fn missing_retry_interval_fails() {
        let switch = MaintenanceSwitch::new(true);
        let options = OptionsBuilder::new().use_no_defaults().use_default_response();

        let result = MaintenanceGate::new(switch, &env(), &options);

        assert!(matches!(
            result,
            Err(StartupError::Options(OptionError::MissingOption { .. }))
        ));
    }

    #[test]
    fn missing_response_file_fails_with_both_paths() {
        let dir = TempDir::new().unwrap();
        let env = HostingEnvironment::new(dir.path(), dir.path());
        let options = OptionsBuilder::new().use_response_file("offline.html", BaseDir::WebRoot);

        let err = MaintenanceGate::new(MaintenanceSwitch::new(false), &env, &options).unwrap_err();

        assert!(matches!(
            err,
            StartupError::Response(ResponseError::FileNotFound { .. })
        ));
        let message = err.to_string();
        assert!(message.contains("'offline.html'"));
        assert!(message.contains(&dir.path().join("offline.html").display().to_string()));
    }

    #[test]
    fn restore_state_runs_once_after_resolution() {
        let control = Arc::new(MockControl::default());

        let _gate = MaintenanceGate::new(Arc::clone(&control), &env(), &defaults(60)).unwrap();

        assert_eq!(control.restores(), 1);
    }

    #[test]
    fn restore_state_skipped_when_startup_fails() {
        let control = Arc::new(MockControl::default());
        let options = OptionsBuilder::new().use_no_defaults();

        let result = MaintenanceGate::new(Arc::clone(&control), &env(), &options);

        assert!(result.is_err());
        assert_eq!(control.restores(), 0);
    }

    #[test]
    fn response_file_is_cached_at_startup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("down.txt");
        std::fs::write(&path, "be right back").unwrap();
        let env = HostingEnvironment::new(dir.path(), dir.path());
        let options = OptionsBuilder::new().use_response_file("down.txt", BaseDir::ContentRoot);

        let gate = MaintenanceGate::new(MaintenanceSwitch::new(true), &env, &options).unwrap();
        std::fs::remove_file(&path).unwrap();

        let response = gate.maintenance_response(30);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(gate.response().bytes, b"be right back");
    }
}

mod decisions {
    use super::*;

    #[test]
    fn maintenance_off_passes_through() {
        let gate = MaintenanceGate::new(MaintenanceSwitch::new(false), &env(), &defaults(60)).unwrap();

        assert_eq!(
            gate.decide(&request("/anything")),
            Decision::PassThrough(PassReason::MaintenanceOff)
        );
    }

    #[test]
    fn maintenance_on_without_bypass() {
        let gate = MaintenanceGate::new(MaintenanceSwitch::new(true), &env(), &defaults(120)).unwrap();

        assert_eq!(
            gate.decide(&request("/anything")),
            Decision::Maintenance { retry_after: 120 }
        );
    }

    #[test]
    fn switch_is_read_on_every_request() {
        let switch = Arc::new(MaintenanceSwitch::new(false));
        let gate = MaintenanceGate::new(Arc::clone(&switch), &env(), &defaults(60)).unwrap();

        assert!(!gate.decide(&request("/")).is_maintenance());
        switch.enter();
        assert!(gate.decide(&request("/")).is_maintenance());
        switch.leave();
        assert!(!gate.decide(&request("/")).is_maintenance());
    }

    #[test]
    fn username_bypass() {
        let options = defaults(60).bypass_username("admin");
        let gate = MaintenanceGate::new(MaintenanceSwitch::new(true), &env(), &options).unwrap();

        let admin = gate.decide(&request_as("/", Identity::authenticated("admin")));
        let bob = gate.decide(&request_as("/", Identity::authenticated("bob")));

        assert_eq!(
            admin,
            Decision::PassThrough(PassReason::Bypass("username 'admin'".to_string()))
        );
        assert!(bob.is_maintenance());
    }

    #[test]
    fn override_replaces_startup_options() {
        let override_options = defaults(999)
            .bypass_path_prefix("/status", crate::options::PathMatchMode::IgnoreCase)
            .build()
            .unwrap();
        let control = Arc::new(MockControl::on().with_override(Some(override_options)));
        let gate = MaintenanceGate::new(Arc::clone(&control), &env(), &defaults(60)).unwrap();

        assert!(!gate.decide(&request("/status")).is_maintenance());
        assert_eq!(
            gate.decide(&request("/home")),
            Decision::Maintenance { retry_after: 999 }
        );
        assert_eq!(control.override_calls(), 2);
    }

    #[test]
    fn null_override_suppresses_maintenance() {
        let control = Arc::new(MockControl::on().with_override(None));
        let gate = MaintenanceGate::new(Arc::clone(&control), &env(), &defaults(60)).unwrap();

        assert_eq!(
            gate.decide(&request("/")),
            Decision::PassThrough(PassReason::Suppressed)
        );
    }

    #[test]
    fn override_not_consulted_when_off() {
        let control = Arc::new(MockControl::default());
        let gate = MaintenanceGate::new(Arc::clone(&control), &env(), &defaults(60)).unwrap();

        gate.decide(&request("/"));

        assert_eq!(control.override_calls(), 0);
    }
}

mod response {
    use super::*;

    #[test]
    fn default_document_scenario() {
        let gate = MaintenanceGate::new(MaintenanceSwitch::new(true), &env(), &defaults(120)).unwrap();

        let response = gate.maintenance_response(120);

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[RETRY_AFTER], "120");
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
        assert_eq!(gate.response().bytes, DEFAULT_DOCUMENT.as_bytes());
    }

    #[test]
    fn json_response_content_type() {
        let options = OptionsBuilder::new()
            .use_response(crate::response::MaintenanceResponse::json("{}"))
            .retry_interval(5);
        let gate = MaintenanceGate::new(MaintenanceSwitch::new(true), &env(), &options).unwrap();

        let response = gate.maintenance_response(5);

        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[RETRY_AFTER], "5");
    }

    #[test]
    fn debug_output_omits_body() {
        let gate = MaintenanceGate::new(MaintenanceSwitch::new(true), &env(), &defaults(60)).unwrap();

        let debug = format!("{gate:?}");

        assert!(debug.contains("MaintenanceGate"));
        assert!(!debug.contains("<html"));
    }
}
