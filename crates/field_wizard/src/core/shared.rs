//! Multi-caller handle around a [`FormSession`].
//!
//! Every top-level operation holds the session lock for its whole duration,
//! hooks included, so two operations never interleave. What happens to an
//! operation that arrives while another one is running depends on
//! [`ConcurrencyPolicy`]: `Queue` waits its turn (tokio's mutex is FIFO
//! fair), `Reject` fails with [`WizardError::Busy`] without touching state.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::debug;

use super::events::SessionEvent;
use super::navigation::{FormOutput, SummaryEntry};
use super::session::FormSession;
use crate::config::ConcurrencyPolicy;
use crate::errors::{Result, WizardError};
use crate::form::{FieldDefinition, FieldId, FieldState, FormOption, FormValue, NavButton};

#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<FormSession>>,
    policy: ConcurrencyPolicy,
    events: broadcast::Sender<SessionEvent>,
}

impl SharedSession {
    /// Wrap `session`; the policy comes from its engine config.
    pub fn new(session: FormSession) -> Self {
        let policy = session.config().concurrency;
        let events = session.store().sender();
        Self {
            inner: Arc::new(Mutex::new(session)),
            policy,
            events,
        }
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Subscribe without waiting for the lock.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Exclusive access for callers that need several steps in one go.
    pub async fn lock(&self) -> Result<MutexGuard<'_, FormSession>> {
        match self.policy {
            ConcurrencyPolicy::Queue => Ok(self.inner.lock().await),
            ConcurrencyPolicy::Reject => self.inner.try_lock().map_err(|_| {
                debug!("session busy, operation rejected");
                WizardError::Busy
            }),
        }
    }

    pub async fn rebuild<D, B>(&self, definitions: D, default_buttons: B) -> Result<()>
    where
        D: IntoIterator<Item = FieldDefinition>,
        B: IntoIterator<Item = NavButton>,
    {
        self.lock().await?.rebuild(definitions, default_buttons);
        Ok(())
    }

    pub async fn activate(&self, id: impl Into<FieldId>) -> Result<()> {
        self.lock().await?.activate(id).await
    }

    pub async fn set_value(&self, value: Option<FormValue>) -> Result<bool> {
        self.lock().await?.set_value(value).await
    }

    pub async fn compute_field_data(&self) -> Result<bool> {
        self.lock().await?.compute_field_data().await
    }

    pub async fn clear_field_data(&self, id: impl Into<FieldId>) -> Result<bool> {
        Ok(self.lock().await?.clear_field_data(id))
    }

    pub async fn evaluate_condition(&self, id: impl Into<FieldId>) -> Result<bool> {
        Ok(self.lock().await?.evaluate_condition(id).await)
    }

    pub async fn update_active_field_list_options(&self, options: Vec<FormOption>) -> Result<bool> {
        Ok(self.lock().await?.update_active_field_list_options(options))
    }

    pub async fn before_next(&self) -> Result<bool> {
        self.lock().await?.before_next().await
    }

    pub async fn exits_form(&self) -> Result<bool> {
        self.lock().await?.exits_form().await
    }

    pub async fn summary(&self) -> Result<Vec<SummaryEntry>> {
        self.lock().await?.summary().await
    }

    pub async fn click(&self, name: &str) -> Result<bool> {
        self.lock().await?.click(name).await
    }

    pub async fn output(&self) -> Result<FormOutput> {
        Ok(self.lock().await?.output())
    }

    pub async fn active_field_state(&self) -> Result<Option<FieldState>> {
        Ok(self.lock().await?.active_field_state())
    }

    /// Run a read-only closure against the session.
    pub async fn read<R>(&self, f: impl FnOnce(&FormSession) -> R) -> Result<R> {
        Ok(f(&*self.lock().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::form::{FieldHooks, Hook};
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::sync::{mpsc, Notify};

    /// A session whose `slow` field blocks in `onload` until released.
    fn gated(policy: ConcurrencyPolicy) -> (SharedSession, Arc<Notify>, mpsc::UnboundedReceiver<()>) {
        let release = Arc::new(Notify::new());
        let (entered_tx, entered_rx) = mpsc::unbounded_channel();
        let gate = Arc::clone(&release);
        let onload = Hook::new(move |_, _| {
            let gate = Arc::clone(&gate);
            let entered = entered_tx.clone();
            async move {
                let _ = entered.send(());
                gate.notified().await;
                Ok(())
            }
        });
        let mut session = FormSession::with_config(EngineConfig {
            concurrency: policy,
            ..EngineConfig::default()
        });
        session.rebuild(
            [
                FieldDefinition::new("slow").with_hooks(FieldHooks {
                    onload: Some(onload),
                    ..Default::default()
                }),
                FieldDefinition::new("fast"),
            ],
            Vec::<NavButton>::new(),
        );
        (SharedSession::new(session), release, entered_rx)
    }

    #[tokio::test]
    async fn queued_operations_run_one_after_another() {
        let (shared, release, mut entered) = gated(ConcurrencyPolicy::Queue);
        let first = tokio::spawn({
            let shared = shared.clone();
            async move { shared.activate("slow").await }
        });
        entered.recv().await.unwrap();

        let second = tokio::spawn({
            let shared = shared.clone();
            async move { shared.activate("fast").await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!second.is_finished());

        release.notify_one();
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let active = shared.read(|s| s.active_field().cloned()).await.unwrap();
        assert_eq!(active, Some(FieldId::from("fast")));
        let slow = shared.read(|s| s.field_state("slow")).await.unwrap().unwrap();
        assert!(slow.int_last_time_loaded.is_some());
    }

    #[tokio::test]
    async fn reject_policy_fails_fast_while_busy() {
        let (shared, release, mut entered) = gated(ConcurrencyPolicy::Reject);
        let first = tokio::spawn({
            let shared = shared.clone();
            async move { shared.activate("slow").await }
        });
        entered.recv().await.unwrap();

        let err = shared.activate("fast").await.unwrap_err();
        assert!(matches!(err, WizardError::Busy));
        assert!(matches!(shared.set_value(None).await, Err(WizardError::Busy)));

        release.notify_one();
        first.await.unwrap().unwrap();
        let active = shared.read(|s| s.active_field().cloned()).await.unwrap();
        assert_eq!(active, Some(FieldId::from("slow")));
    }

    #[tokio::test]
    async fn subscribers_do_not_need_the_lock() {
        let (shared, release, mut entered) = gated(ConcurrencyPolicy::Reject);
        let mut rx = shared.subscribe();
        let first = tokio::spawn({
            let shared = shared.clone();
            async move { shared.activate("slow").await }
        });
        entered.recv().await.unwrap();
        assert!(matches!(rx.recv().await.unwrap(), SessionEvent::Activated { .. }));
        release.notify_one();
        first.await.unwrap().unwrap();
    }
}
