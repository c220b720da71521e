use std::sync::Arc;

use tokio::sync::watch;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AnimationState {
    run: u64,
    finished: bool,
}

/// One-shot completion signal for a unit's terminating animation.
///
/// Each `restart` begins a fresh run: signals issued for earlier runs resolve
/// as superseded and must not be treated as a finished animation. Exactly one
/// completer exists per run; playback code takes it and finishes the run when
/// the visuals are done. The simulation itself never completes a run.
#[derive(Debug)]
pub struct AnimationHandle {
    state_tx: Arc<watch::Sender<AnimationState>>,
    state_rx: watch::Receiver<AnimationState>,
    run: u64,
    completer: Option<AnimationCompleter>,
}

/// The completing end of one animation run. Finishing a superseded run is a
/// no-op.
#[derive(Debug)]
pub struct AnimationCompleter {
    state_tx: Arc<watch::Sender<AnimationState>>,
    run: u64,
}

/// Awaitable view of one animation run.
#[derive(Clone, Debug)]
pub struct AnimationSignal {
    state_rx: watch::Receiver<AnimationState>,
    run: u64,
}

impl AnimationHandle {
    /// A fresh handle is idle: nothing is playing and nothing is pending.
    pub fn new() -> Self {
        let (state_tx, state_rx) = watch::channel(AnimationState {
            run: 0,
            finished: true,
        });
        Self {
            state_tx: Arc::new(state_tx),
            state_rx,
            run: 0,
            completer: None,
        }
    }

    /// Begins a fresh, not-yet-complete run, invalidating any signal or
    /// completer issued for a previous one.
    pub fn restart(&mut self) {
        self.run += 1;
        self.state_tx.send_replace(AnimationState {
            run: self.run,
            finished: false,
        });
        self.completer = Some(AnimationCompleter {
            state_tx: Arc::clone(&self.state_tx),
            run: self.run,
        });
    }

    pub fn is_finished(&self) -> bool {
        self.state_rx.borrow().finished
    }

    pub fn signal(&self) -> AnimationSignal {
        AnimationSignal {
            state_rx: self.state_rx.clone(),
            run: self.run,
        }
    }

    /// Hands out the sole completer for the current run, once.
    pub fn take_completer(&mut self) -> Option<AnimationCompleter> {
        self.completer.take()
    }
}

impl Default for AnimationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationCompleter {
    pub fn finish(self) {
        self.state_tx.send_if_modified(|state| {
            if state.run == self.run && !state.finished {
                state.finished = true;
                true
            } else {
                false
            }
        });
    }
}

impl AnimationSignal {
    /// Resolves `true` when the run this signal was issued for finishes, and
    /// `false` when that run is superseded by a restart or dropped outright.
    pub async fn wait(mut self) -> bool {
        let run = self.run;
        match self
            .state_rx
            .wait_for(|state| state.run != run || state.finished)
            .await
        {
            Ok(state) => state.run == run && state.finished,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AnimationHandle;

    #[test]
    fn fresh_handle_is_idle() {
        let mut handle = AnimationHandle::new();
        assert!(handle.is_finished());
        assert!(handle.take_completer().is_none());
    }

    #[test]
    fn restart_produces_pending_run() {
        let mut handle = AnimationHandle::new();
        handle.restart();
        assert!(!handle.is_finished());
    }

    #[tokio::test]
    async fn completer_finishes_current_run() {
        let mut handle = AnimationHandle::new();
        handle.restart();
        let completer = handle.take_completer().expect("fresh completer");
        let signal = handle.signal();
        let waiter = tokio::spawn(signal.wait());
        completer.finish();
        assert!(waiter.await.expect("waiter task"));
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn restart_invalidates_previous_signal() {
        let mut handle = AnimationHandle::new();
        handle.restart();
        let stale = handle.signal();
        handle.restart();
        assert!(!stale.wait().await);
        assert!(!handle.is_finished());
    }

    #[tokio::test]
    async fn stale_completer_is_inert() {
        let mut handle = AnimationHandle::new();
        handle.restart();
        let stale = handle.take_completer().expect("first run completer");
        handle.restart();
        stale.finish();
        assert!(!handle.is_finished());
    }

    #[test]
    fn completer_is_single_use_per_run() {
        let mut handle = AnimationHandle::new();
        handle.restart();
        assert!(handle.take_completer().is_some());
        assert!(handle.take_completer().is_none());
    }

    #[tokio::test]
    async fn dropping_the_handle_cancels_waiters() {
        let mut handle = AnimationHandle::new();
        handle.restart();
        let signal = handle.signal();
        drop(handle);
        assert!(!signal.wait().await);
    }
}
