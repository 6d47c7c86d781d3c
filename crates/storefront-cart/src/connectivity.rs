//! Connectivity-loss detection with debounce and route recovery.
//!
//! Offline signals are often transient, so the watcher only asks the UI to
//! show its offline screen once a signal has persisted for the debounce
//! window. On reconnect it hands back the route that was active when the
//! first offline signal arrived. The cart is not involved: the store lives
//! for the whole process and survives the detour.

use std::time::{Duration, Instant};

/// Recommended debounce window.
pub const DEFAULT_OFFLINE_DEBOUNCE: Duration = Duration::from_millis(2500);

/// What the UI should do after a signal or poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityAction<R> {
    /// The connection has been down for the whole debounce window.
    ShowOffline,
    /// Connectivity is back; navigate to the saved route.
    Restore(R),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State<R> {
    Online,
    /// Offline signal seen, debounce still running.
    Suspect { since: Instant, route: R },
    /// Offline screen shown.
    Offline { route: R },
}

/// Debounced connectivity state machine, generic over the route type.
#[derive(Debug, Clone)]
pub struct ConnectivityWatcher<R> {
    debounce: Duration,
    state: State<R>,
}

impl<R: Clone> Default for ConnectivityWatcher<R> {
    fn default() -> Self {
        Self::new(DEFAULT_OFFLINE_DEBOUNCE)
    }
}

impl<R: Clone> ConnectivityWatcher<R> {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            state: State::Online,
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self.state, State::Offline { .. })
    }

    /// Route saved for recovery, if a drop is in progress.
    pub fn saved_route(&self) -> Option<&R> {
        match &self.state {
            State::Online => None,
            State::Suspect { route, .. } | State::Offline { route } => Some(route),
        }
    }

    /// Feed a connectivity signal.
    ///
    /// `current_route` is only recorded on the first offline signal of a
    /// drop; later signals do not overwrite it.
    pub fn report(&mut self, online: bool, current_route: &R, now: Instant) -> Option<ConnectivityAction<R>> {
        match (&self.state, online) {
            (State::Online, true) => None,
            (State::Online, false) => {
                tracing::debug!("offline signal, starting debounce");
                self.state = State::Suspect {
                    since: now,
                    route: current_route.clone(),
                };
                self.poll(now)
            }
            (State::Suspect { .. }, true) => {
                tracing::debug!("connectivity recovered within debounce window");
                self.state = State::Online;
                None
            }
            (State::Suspect { .. }, false) => self.poll(now),
            (State::Offline { route }, true) => {
                let route = route.clone();
                tracing::info!("connectivity restored");
                self.state = State::Online;
                Some(ConnectivityAction::Restore(route))
            }
            (State::Offline { .. }, false) => None,
        }
    }

    /// Advance the debounce timer.
    pub fn poll(&mut self, now: Instant) -> Option<ConnectivityAction<R>> {
        if let State::Suspect { since, route } = &self.state {
            if now.saturating_duration_since(*since) >= self.debounce {
                let route = route.clone();
                tracing::info!("connectivity lost");
                self.state = State::Offline { route };
                return Some(ConnectivityAction::ShowOffline);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_transient_drop_is_ignored() {
        let mut watcher = ConnectivityWatcher::default();
        let t0 = Instant::now();

        assert_eq!(watcher.report(false, &"/cart", t0), None);
        assert_eq!(watcher.poll(t0 + ms(1000)), None);
        assert_eq!(watcher.report(true, &"/cart", t0 + ms(2000)), None);
        assert_eq!(watcher.poll(t0 + ms(5000)), None);
        assert!(!watcher.is_offline());
    }

    #[test]
    fn test_sustained_drop_then_restore() {
        let mut watcher = ConnectivityWatcher::default();
        let t0 = Instant::now();

        watcher.report(false, &"/product/42", t0);
        assert_eq!(watcher.poll(t0 + ms(2500)), Some(ConnectivityAction::ShowOffline));
        assert!(watcher.is_offline());

        // The UI is now on the offline screen; that route must not be saved.
        assert_eq!(watcher.report(false, &"/offline", t0 + ms(3000)), None);
        assert_eq!(
            watcher.report(true, &"/offline", t0 + ms(4000)),
            Some(ConnectivityAction::Restore("/product/42"))
        );
        assert!(watcher.saved_route().is_none());
    }

    #[test]
    fn test_repeated_offline_signal_trips_debounce() {
        let mut watcher = ConnectivityWatcher::new(ms(100));
        let t0 = Instant::now();

        watcher.report(false, &1u32, t0);
        assert_eq!(
            watcher.report(false, &2u32, t0 + ms(150)),
            Some(ConnectivityAction::ShowOffline)
        );
        assert_eq!(watcher.saved_route(), Some(&1));
    }
}
