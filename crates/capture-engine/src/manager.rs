//! Monitor collection lifecycle and capture-loss recovery.

use std::time::Duration;

use tracing::{debug, info, warn};

use deskcast_common::{CaptureDefaults, DeskcastResult, RetryDebounce};

use crate::backend::{BackendMessage, CaptureBackend};
use crate::monitor::{Monitor, MonitorId};

/// Tuning knobs for the capture manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Upper bound for a single per-monitor capture call, in milliseconds.
    /// 0 uses the backend's own default.
    pub capture_timeout_ms: u32,

    /// Stability window before retrying backend reinitialization after a
    /// monitor loses access.
    pub retry_reinit_duration: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            capture_timeout_ms: 0,
            retry_reinit_duration: Duration::from_millis(500),
        }
    }
}

impl From<&CaptureDefaults> for ManagerConfig {
    fn from(defaults: &CaptureDefaults) -> Self {
        Self {
            capture_timeout_ms: defaults.capture_timeout_ms,
            retry_reinit_duration: Duration::from_millis(defaults.retry_reinit_duration_ms),
        }
    }
}

/// Handle for a subscribed reconciled-notification observer.
pub type SubscriptionId = usize;

/// Callback fired once per successful reconciliation, with the reconciled
/// monitor count.
pub type ReconciledObserver = Box<dyn FnMut(usize)>;

/// Owns the ordered monitor collection and drives the per-frame capture
/// cycle against a host-supplied backend.
///
/// The host's composition root constructs exactly one manager per process
/// and keeps it alive for the application's lifetime; the backend is
/// initialized here and finalized on [`shutdown`](Self::shutdown) (or
/// drop). Monitor ids are indices into the collection and never move.
///
/// Two calls per frame, strictly ordered:
/// [`update`](Self::update) during the frame's logic phase, then
/// [`render_due`](Self::render_due) at the end-of-frame boundary once all
/// consumers have flagged the monitors they need.
pub struct CaptureManager {
    backend: Box<dyn CaptureBackend>,
    monitors: Vec<Monitor>,
    reinit: RetryDebounce,
    observers: Vec<(SubscriptionId, ReconciledObserver)>,
    next_subscription: SubscriptionId,
    shut_down: bool,
}

impl CaptureManager {
    /// Initialize the backend and create one monitor per enumerated
    /// display.
    ///
    /// A monitor that fails to bind its backend resources here starts in a
    /// lost-access state and is healed by the normal recovery path rather
    /// than failing construction.
    pub fn new(mut backend: Box<dyn CaptureBackend>, config: ManagerConfig) -> DeskcastResult<Self> {
        backend.initialize()?;
        backend.set_timeout(config.capture_timeout_ms);

        let mut monitors = Vec::new();
        for id in 0..backend.monitor_count() {
            let mut monitor = Monitor::new(id);
            monitor.reinitialize(backend.as_mut());
            monitors.push(monitor);
        }

        info!(monitors = monitors.len(), "capture manager initialized");

        Ok(Self {
            backend,
            monitors,
            reinit: RetryDebounce::new(config.retry_reinit_duration),
            observers: Vec::new(),
            next_subscription: 0,
            shut_down: false,
        })
    }

    /// Per-frame update phase: pump the backend, scan for lost monitors,
    /// run the reinitialization debounce, and drain backend messages.
    pub fn update(&mut self, dt: Duration) {
        if self.shut_down {
            return;
        }

        self.backend.tick();
        self.scan_for_lost_access();

        if self.reinit.tick(dt) {
            info!("reinitializing capture backend");
            self.backend.reinitialize_all();
        }

        self.drain_messages();
    }

    /// End-of-frame render phase: capture every monitor flagged this
    /// frame, then clear every flag. No-op after shutdown.
    pub fn render_due(&mut self) {
        if self.shut_down {
            return;
        }

        for monitor in &mut self.monitors {
            if monitor.should_be_updated() {
                monitor.render(self.backend.as_mut());
            }
            monitor.clear_update_request();
        }
    }

    /// Stop the capture loop and finalize the backend. Further `update` /
    /// `render_due` calls are no-ops. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        // Stop issuing captures before any backend teardown.
        self.shut_down = true;
        self.backend.finalize();
        info!("capture manager shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// The ordered monitor collection (index == monitor id).
    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn monitor(&self, id: MonitorId) -> Option<&Monitor> {
        self.monitors.get(id)
    }

    pub fn monitor_mut(&mut self, id: MonitorId) -> Option<&mut Monitor> {
        self.monitors.get_mut(id)
    }

    /// Number of monitor slots, including any stale trailing slots kept
    /// after the backend's count shrank.
    pub fn monitor_count(&self) -> usize {
        self.monitors.len()
    }

    /// The primary monitor, if one has been identified.
    pub fn primary(&self) -> Option<&Monitor> {
        self.monitors.iter().find(|monitor| monitor.is_primary())
    }

    /// Resolve a normalized OS monitor name to a monitor id. With
    /// duplicate names the highest id wins.
    pub fn find_monitor_by_normalized_name(&self, normalized: &str) -> Option<MonitorId> {
        self.monitors
            .iter()
            .filter(|monitor| monitor.normalized_name() == normalized)
            .map(Monitor::id)
            .last()
    }

    /// Flag a monitor for capture during the next render phase. Returns
    /// false when no such monitor exists.
    pub fn request_update(&mut self, id: MonitorId) -> bool {
        match self.monitors.get_mut(id) {
            Some(monitor) => {
                monitor.request_update();
                true
            }
            None => false,
        }
    }

    /// Subscribe to the reconciled notification, fired once per successful
    /// backend reconciliation with the reconciled monitor count. Observers
    /// fire in subscription order.
    pub fn subscribe_reconciled(&mut self, observer: ReconciledObserver) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    /// Remove a reconciled-notification observer. Returns false when the
    /// subscription is unknown.
    pub fn unsubscribe_reconciled(&mut self, subscription: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(id, _)| *id != subscription);
        self.observers.len() != before
    }

    /// Arm the reinitialization debounce if any monitor lost access. The
    /// first offender arms it and ends the scan; later offenders in the
    /// same tick coalesce into the same debounce window.
    fn scan_for_lost_access(&mut self) {
        for monitor in &self.monitors {
            if monitor.state().has_lost_access() && !self.reinit.is_pending() {
                warn!(
                    id = monitor.id(),
                    state = ?monitor.state(),
                    "monitor lost capture access, scheduling backend reinitialization"
                );
                self.reinit.arm();
                break;
            }
        }
    }

    fn drain_messages(&mut self) {
        while let Some(message) = self.backend.pop_message() {
            match message {
                BackendMessage::Reinitialized => {
                    info!("capture backend reinitialized, reconciling monitors");
                    self.reconcile();
                }
                BackendMessage::TextureSizeChanged => {
                    debug!("monitor texture size changed");
                }
            }
        }
    }

    /// Re-sync the monitor collection with the backend's current
    /// enumeration: existing slots are reinitialized in place, new slots
    /// appended. The collection never shrinks; when the backend reports
    /// fewer monitors than before, trailing slots stay as stale entries
    /// that stop receiving fresh frames.
    fn reconcile(&mut self) {
        let count = self.backend.monitor_count();
        for id in 0..count {
            if id == self.monitors.len() {
                self.monitors.push(Monitor::new(id));
            }
            self.monitors[id].reinitialize(self.backend.as_mut());
        }

        for (_, observer) in &mut self.observers {
            observer(count);
        }
    }
}

impl Drop for CaptureManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FrameError, ScriptedBackend};
    use crate::monitor::MonitorState;
    use deskcast_platform_core::{MonitorDescriptor, ScreenRect};
    use std::cell::RefCell;
    use std::rc::Rc;

    const FRAME: Duration = Duration::from_millis(100);

    fn display(name: &str, primary: bool) -> MonitorDescriptor {
        MonitorDescriptor {
            name: name.to_string(),
            rect: ScreenRect::new(0, 0, 1920, 1080),
            primary,
        }
    }

    /// Build a manager over a scripted backend, returning a probe handle
    /// that shares the backend's state.
    fn manager_with_monitors(
        monitors: Vec<MonitorDescriptor>,
    ) -> (CaptureManager, ScriptedBackend) {
        let backend = ScriptedBackend::new().with_monitors(monitors);
        let probe = backend.clone();
        let manager = CaptureManager::new(Box::new(backend), ManagerConfig::default()).unwrap();
        (manager, probe)
    }

    fn dual_manager() -> (CaptureManager, ScriptedBackend) {
        manager_with_monitors(vec![
            display(r"\\.\DISPLAY1", true),
            display(r"\\.\DISPLAY2", false),
        ])
    }

    /// Run enough update ticks for an armed debounce to fire.
    fn run_debounce_window(manager: &mut CaptureManager) {
        for _ in 0..8 {
            manager.update(FRAME);
        }
    }

    #[test]
    fn creates_one_monitor_per_enumerated_display() {
        let (manager, _probe) = manager_with_monitors(vec![display(r"\\.\DISPLAY1", true)]);

        assert_eq!(manager.monitor_count(), 1);
        let monitor = manager.monitor(0).unwrap();
        assert_eq!(monitor.id(), 0);
        assert_eq!(monitor.state(), MonitorState::Active);
    }

    #[test]
    fn applies_configured_capture_timeout() {
        let backend = ScriptedBackend::new().with_monitors(vec![display(r"\\.\DISPLAY1", true)]);
        let probe = backend.clone();
        let _manager = CaptureManager::new(
            Box::new(backend),
            ManagerConfig {
                capture_timeout_ms: 16,
                ..ManagerConfig::default()
            },
        )
        .unwrap();

        assert_eq!(probe.timeout_ms(), 16);
    }

    #[test]
    fn primary_lookup_finds_flagged_monitor() {
        let (manager, _probe) = manager_with_monitors(vec![
            display(r"\\.\DISPLAY1", false),
            display(r"\\.\DISPLAY2", true),
        ]);
        assert_eq!(manager.primary().unwrap().id(), 1);
    }

    #[test]
    fn render_due_captures_only_flagged_monitors_and_clears_all_flags() {
        let (mut manager, probe) = dual_manager();

        assert!(manager.request_update(0));
        manager.render_due();

        assert_eq!(probe.captures_for(0), 1);
        assert_eq!(probe.captures_for(1), 0);
        for monitor in manager.monitors() {
            assert!(!monitor.should_be_updated());
        }
    }

    #[test]
    fn request_update_for_unknown_monitor_is_rejected() {
        let (mut manager, _probe) = dual_manager();
        assert!(!manager.request_update(5));
    }

    #[test]
    fn lost_access_triggers_exactly_one_debounced_reinitialize() {
        let (mut manager, probe) = dual_manager();

        // Both monitors fail in the same render phase.
        probe.push_failure(0, FrameError::AccessLost);
        probe.push_failure(1, FrameError::AccessDenied);
        manager.request_update(0);
        manager.request_update(1);
        manager.render_due();
        assert!(manager.monitor(0).unwrap().state().has_lost_access());
        assert!(manager.monitor(1).unwrap().state().has_lost_access());

        // Within the retry window nothing fires.
        manager.update(FRAME);
        manager.update(FRAME);
        assert_eq!(probe.reinitialize_calls(), 0);

        run_debounce_window(&mut manager);
        assert_eq!(probe.reinitialize_calls(), 1);
    }

    #[test]
    fn recovery_resumes_after_reconciliation() {
        let (mut manager, probe) = dual_manager();

        probe.push_failure(0, FrameError::AccessLost);
        manager.request_update(0);
        manager.render_due();
        assert_eq!(manager.monitor(0).unwrap().state(), MonitorState::AccessLost);

        // Debounce fires, the backend signals Reinitialized, and the
        // manager reconciles within the same update tick.
        run_debounce_window(&mut manager);
        assert_eq!(manager.monitor(0).unwrap().state(), MonitorState::Active);
        assert_eq!(manager.monitor(1).unwrap().state(), MonitorState::Active);
    }

    #[test]
    fn reconciliation_grows_collection_in_place() {
        let (mut manager, probe) = manager_with_monitors(vec![display(r"\\.\DISPLAY1", true)]);
        assert_eq!(manager.monitor_count(), 1);

        probe.set_monitors(vec![
            display(r"\\.\DISPLAY1", true),
            display(r"\\.\DISPLAY2", false),
        ]);
        probe.push_message(BackendMessage::Reinitialized);
        manager.update(FRAME);

        assert_eq!(manager.monitor_count(), 2);
        assert_eq!(manager.monitor(0).unwrap().id(), 0);
        assert_eq!(manager.monitor(0).unwrap().state(), MonitorState::Active);
        assert_eq!(manager.monitor(1).unwrap().id(), 1);
        assert_eq!(manager.monitor(1).unwrap().normalized_name(), "display2");
    }

    #[test]
    fn reconciliation_never_shrinks_collection() {
        let (mut manager, probe) = manager_with_monitors(vec![
            display(r"\\.\DISPLAY1", true),
            display(r"\\.\DISPLAY2", false),
            display(r"\\.\DISPLAY3", false),
        ]);
        assert_eq!(manager.monitor_count(), 3);

        probe.set_monitors(vec![
            display(r"\\.\DISPLAY1", true),
            display(r"\\.\DISPLAY2", false),
        ]);
        probe.push_message(BackendMessage::Reinitialized);
        manager.update(FRAME);

        // Stale trailing slot survives with its id intact.
        assert_eq!(manager.monitor_count(), 3);
        assert_eq!(manager.monitor(2).unwrap().id(), 2);
    }

    #[test]
    fn reconciled_observers_fire_in_subscription_order() {
        let (mut manager, probe) = dual_manager();

        let order = Rc::new(RefCell::new(Vec::new()));
        let first = order.clone();
        let second = order.clone();
        manager.subscribe_reconciled(Box::new(move |count| first.borrow_mut().push(("a", count))));
        let subscription = manager
            .subscribe_reconciled(Box::new(move |count| second.borrow_mut().push(("b", count))));

        probe.push_message(BackendMessage::Reinitialized);
        manager.update(FRAME);
        assert_eq!(*order.borrow(), vec![("a", 2), ("b", 2)]);

        assert!(manager.unsubscribe_reconciled(subscription));
        assert!(!manager.unsubscribe_reconciled(subscription));

        probe.push_message(BackendMessage::Reinitialized);
        manager.update(FRAME);
        assert_eq!(order.borrow().len(), 3);
    }

    #[test]
    fn texture_size_change_message_is_drained_without_reconcile() {
        let (mut manager, probe) = dual_manager();

        let reconciles = Rc::new(RefCell::new(0));
        let counter = reconciles.clone();
        manager.subscribe_reconciled(Box::new(move |_| *counter.borrow_mut() += 1));

        probe.push_message(BackendMessage::TextureSizeChanged);
        manager.update(FRAME);
        assert_eq!(*reconciles.borrow(), 0);
    }

    #[test]
    fn shutdown_stops_render_phase_before_backend_teardown() {
        let (mut manager, probe) = dual_manager();

        manager.request_update(0);
        manager.shutdown();
        manager.render_due();
        manager.update(FRAME);

        assert_eq!(probe.captures_for(0), 0);
        assert!(probe.is_finalized());
        // Idempotent.
        manager.shutdown();
    }

    #[test]
    fn name_lookup_uses_normalized_comparison() {
        let (manager, _probe) = dual_manager();

        assert_eq!(manager.find_monitor_by_normalized_name("display2"), Some(1));
        assert_eq!(manager.find_monitor_by_normalized_name("display9"), None);
    }
}
