//! Authentication facade.
//!
//! The only component other subsystems call directly. Orchestrates the
//! login/logout/2FA/recovery protocols over the injected collaborators,
//! and owns the per-execution-context flow state:
//!
//! ```text
//! Anonymous → (Authenticating) → Authenticated → Expired | LoggedOut
//!                    ↘ PendingTwoFactor ↗
//! ```
//!
//! Login steps run strictly in order — lockout check, credential verify,
//! optional 2FA, session issue — and no step is skipped or reordered.
//! Each execution context independently manages its own local session
//! state, with the backing store as the durability layer.

use crate::config::AuthConfig;
use crate::credentials::CredentialValidator;
use crate::environment::AuthEnvironment;
use crate::error::{AuthError, Result};
use crate::events::AuthEvent;
use crate::lockout::LockoutGuard;
use crate::providers::{
    AuditSink, CredentialStore, DeliveryChannel, FailedAttemptStore, PasswordHasher,
    RecoveryTokenStore, SessionStore, TwoFactorStore,
};
use crate::recovery::RecoveryService;
use crate::session::{IntegrityKey, SessionManager, TimerHandle};
use crate::state::{AuthFlow, Identity, PendingTwoFactor, Session, SessionId};
use crate::two_factor::TwoFactorService;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Receipt for a 2FA-gated login whose primary step succeeded.
///
/// The caller must complete the flow with
/// [`AuthFacade::complete_two_factor_login`] before `expires_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoFactorPending {
    /// Deadline for completing the second factor.
    pub expires_at: DateTime<Utc>,
}

/// Normalize a username into the identity key used across all stores.
fn normalize_key(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Reject malformed input before any store access.
fn validate_input(username: &str, password: &str, max_length: usize) -> Result<()> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AuthError::InvalidInput);
    }
    if username.len() > max_length || password.len() > max_length {
        return Err(AuthError::InvalidInput);
    }
    Ok(())
}

/// Per-context flow state plus the idle-expiry timer guarding it.
#[derive(Default)]
struct FlowSlot {
    flow: AuthFlow,
    idle_timer: Option<TimerHandle>,
}

fn clear_slot(slot: &mut FlowSlot) {
    slot.flow = AuthFlow::Anonymous;
    if let Some(timer) = slot.idle_timer.take() {
        timer.cancel();
    }
}

/// Authentication facade.
///
/// See the [module docs](self) for the flow model. All methods take
/// `&self`; the flow slot is internally synchronized, and activity events
/// racing the idle timer resolve to either a clean reset or a no-op on an
/// already-expired session, never a corrupted intermediate state.
pub struct AuthFacade<C, H, S, F, T, R, D, A>
where
    C: CredentialStore + Clone,
    H: PasswordHasher + Clone,
    S: SessionStore + Clone,
    F: FailedAttemptStore + Clone,
    T: TwoFactorStore + Clone,
    R: RecoveryTokenStore + Clone,
    D: DeliveryChannel + Clone,
    A: AuditSink + Clone,
{
    validator: CredentialValidator<C, H>,
    lockout: LockoutGuard<F, A>,
    sessions: SessionManager<S, A>,
    two_factor: TwoFactorService<T, D, A>,
    recovery: RecoveryService<C, H, R, D, A>,
    audit: A,
    config: AuthConfig,
    slot: Arc<Mutex<FlowSlot>>,
}

impl<C, H, S, F, T, R, D, A> AuthFacade<C, H, S, F, T, R, D, A>
where
    C: CredentialStore + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
    S: SessionStore + Clone + 'static,
    F: FailedAttemptStore + Clone + 'static,
    T: TwoFactorStore + Clone + 'static,
    R: RecoveryTokenStore + Clone + 'static,
    D: DeliveryChannel + Clone + 'static,
    A: AuditSink + Clone + 'static,
{
    /// Create a facade with a fresh random integrity key.
    ///
    /// Sessions tagged under this key will not survive a process restart;
    /// use [`Self::with_integrity_key`] to pin one.
    #[must_use]
    pub fn new(env: AuthEnvironment<C, H, S, F, T, R, D, A>, config: AuthConfig) -> Self {
        Self::with_integrity_key(env, config, IntegrityKey::generate())
    }

    /// Create a facade with an explicit integrity key.
    #[must_use]
    pub fn with_integrity_key(
        env: AuthEnvironment<C, H, S, F, T, R, D, A>,
        config: AuthConfig,
        key: IntegrityKey,
    ) -> Self {
        let validator = CredentialValidator::new(
            env.credentials.clone(),
            env.hasher.clone(),
            config.credential.clone(),
        );
        let lockout = LockoutGuard::new(
            env.attempts.clone(),
            env.audit.clone(),
            config.lockout.clone(),
        );
        let sessions = SessionManager::new(
            env.sessions.clone(),
            env.audit.clone(),
            key,
            config.session.clone(),
        );
        let two_factor = TwoFactorService::new(
            env.challenges.clone(),
            env.delivery.clone(),
            env.audit.clone(),
            config.two_factor.clone(),
        );
        let recovery = RecoveryService::new(
            env.credentials,
            env.hasher,
            env.recovery_tokens,
            env.delivery,
            env.audit.clone(),
            config.recovery.clone(),
        );

        Self {
            validator,
            lockout,
            sessions,
            two_factor,
            recovery,
            audit: env.audit,
            config,
            slot: Arc::new(Mutex::new(FlowSlot::default())),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Login
    // ═══════════════════════════════════════════════════════════════════

    /// Log in with username and password.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidInput`] for malformed input
    /// - [`AuthError::Locked`] when the key is locked out (checked before
    ///   the expensive verify step)
    /// - [`AuthError::InvalidCredentials`] for unknown user or wrong
    ///   password, indistinguishably
    /// - [`AuthError::Store`] if a collaborator fails
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<Session> {
        let (key, identity) = self.verify_primary(username, password).await?;
        let session = self.sessions.issue(identity, remember_me).await?;

        let mut slot = self.slot.lock().await;
        self.abandon_current(&mut slot, Some("superseded by new login")).await;
        self.install_session(&mut slot, &session);
        drop(slot);

        self.audit
            .record(AuthEvent::LoginSucceeded {
                identity_id: session.identity.id,
                identity_key: key,
                timestamp: Utc::now(),
            })
            .await;

        Ok(session)
    }

    /// Start a 2FA-gated login.
    ///
    /// On primary success a challenge code is issued and handed to the
    /// delivery channel; the flow parks in `PendingTwoFactor` until
    /// [`Self::complete_two_factor_login`] or the pending deadline.
    ///
    /// # Errors
    ///
    /// Same as [`Self::login`], plus [`AuthError::DeliveryFailed`] when
    /// the channel rejects the code.
    pub async fn login_with_two_factor(
        &self,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<TwoFactorPending> {
        let (key, identity) = self.verify_primary(username, password).await?;

        let challenge = self.two_factor.issue(&key).await?;
        self.two_factor.deliver(&challenge).await?;

        let now = Utc::now();
        let pending = PendingTwoFactor {
            identity,
            remember_me,
            started_at: now,
            expires_at: now + self.config.two_factor.pending_ttl,
        };

        let mut slot = self.slot.lock().await;
        self.abandon_current(&mut slot, Some("superseded by new login")).await;
        slot.flow = AuthFlow::PendingTwoFactor(pending.clone());

        Ok(TwoFactorPending {
            expires_at: pending.expires_at,
        })
    }

    /// Complete a pending 2FA login with a submitted code.
    ///
    /// # Errors
    ///
    /// - [`AuthError::ChallengeExpired`] when no pending flow exists, the
    ///   pending deadline passed, or the code's own TTL elapsed — restart
    ///   from credential verification
    /// - [`AuthError::ChallengeMismatch`] on a wrong code with attempts
    ///   left (the pending flow survives)
    /// - [`AuthError::ChallengeExhausted`] on the last wrong code —
    ///   restart from credential verification
    /// - [`AuthError::Store`] if a collaborator fails
    pub async fn complete_two_factor_login(&self, code: &str) -> Result<Session> {
        let mut slot = self.slot.lock().await;

        let AuthFlow::PendingTwoFactor(pending) = slot.flow.clone() else {
            return Err(AuthError::ChallengeExpired);
        };
        let key = normalize_key(&pending.identity.username);

        if Utc::now() > pending.expires_at {
            clear_slot(&mut slot);
            if let Err(e) = self.two_factor.cancel(&key).await {
                warn!(identity_key = %key, error = %e, "stale challenge cleanup failed");
            }
            return Err(AuthError::ChallengeExpired);
        }

        match self.two_factor.validate(&key, code).await {
            Ok(()) => {
                let session = match self
                    .sessions
                    .issue(pending.identity, pending.remember_me)
                    .await
                {
                    Ok(session) => session,
                    Err(e) => {
                        // The challenge is spent; the flow cannot resume
                        clear_slot(&mut slot);
                        return Err(e);
                    }
                };
                self.install_session(&mut slot, &session);
                drop(slot);

                self.audit
                    .record(AuthEvent::LoginSucceeded {
                        identity_id: session.identity.id,
                        identity_key: key,
                        timestamp: Utc::now(),
                    })
                    .await;

                Ok(session)
            }
            Err(e @ (AuthError::ChallengeExhausted | AuthError::ChallengeExpired)) => {
                clear_slot(&mut slot);
                Err(e)
            }
            // Mismatch with attempts left: the pending flow survives
            Err(e) => Err(e),
        }
    }

    /// Log out the current flow. Idempotent: logging out twice (or with
    /// nothing in progress) is not an error.
    pub async fn logout(&self, reason: Option<&str>) {
        let mut slot = self.slot.lock().await;
        self.abandon_current(&mut slot, reason).await;
    }

    // ═══════════════════════════════════════════════════════════════════
    // Introspection & Activity
    // ═══════════════════════════════════════════════════════════════════

    /// Whether this context holds a live, untampered session.
    ///
    /// Re-reads the persisted record and validates integrity and expiry;
    /// a tampered record forces a logout before this returns `false`.
    pub async fn is_authenticated(&self) -> bool {
        self.validated_session().await.is_some()
    }

    /// Whether the current session's role snapshot grants `permission`.
    ///
    /// Reads the snapshot carried in the session, not a live lookup.
    pub async fn has_permission(&self, permission: &str) -> bool {
        self.validated_session()
            .await
            .is_some_and(|session| session.identity.role.grants(permission))
    }

    /// The current session, if any, without validating it.
    pub async fn current_session(&self) -> Option<Session> {
        self.slot.lock().await.flow.session().cloned()
    }

    /// Record user activity: resets the idle timeout when the session is
    /// close enough to expiry to need it.
    ///
    /// Returns `Ok(true)` when the expiry was extended. An activity event
    /// racing an elapsed deadline is a no-op on the already-expired
    /// session (`Ok(false)`), never a resurrection.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn record_activity(&self) -> Result<bool> {
        let mut slot = self.slot.lock().await;

        let AuthFlow::Authenticated(session) = &mut slot.flow else {
            return Ok(false);
        };

        if session.is_expired(Utc::now()) {
            let expired = session.clone();
            clear_slot(&mut slot);
            self.sessions.expire(&expired).await?;
            return Ok(false);
        }

        self.sessions.renew_if_needed(session).await
    }

    // ═══════════════════════════════════════════════════════════════════
    // Recovery
    // ═══════════════════════════════════════════════════════════════════

    /// Request password recovery for an email address.
    ///
    /// The response is identical whether or not the email is registered.
    ///
    /// # Errors
    ///
    /// Returns error only if a backing store fails.
    pub async fn request_recovery(&self, email: &str) -> Result<()> {
        self.recovery.request(email).await
    }

    /// Validate a recovery token without consuming it.
    ///
    /// # Errors
    ///
    /// See [`RecoveryService::validate_token`].
    pub async fn validate_recovery_token(&self, token: &str) -> Result<String> {
        self.recovery.validate_token(token).await
    }

    /// Redeem a recovery token and reset the password.
    ///
    /// # Errors
    ///
    /// See [`RecoveryService::reset_password`].
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        self.recovery.reset_password(token, new_password).await
    }

    // ═══════════════════════════════════════════════════════════════════
    // Background Tasks
    // ═══════════════════════════════════════════════════════════════════

    /// Spawn the process-level sweep that renews a session nearing expiry.
    ///
    /// The returned handle stops the sweep when cancelled or dropped.
    #[must_use]
    pub fn spawn_renewal_sweep(&self) -> TimerHandle {
        let slot = Arc::clone(&self.slot);
        let sessions = self.sessions.clone();
        let interval = self
            .config
            .session
            .sweep_interval
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(60));

        TimerHandle::new(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut slot = slot.lock().await;
                if let AuthFlow::Authenticated(session) = &mut slot.flow {
                    if session.is_expired(Utc::now()) {
                        continue;
                    }
                    if let Err(e) = sessions.renew_if_needed(session).await {
                        warn!(
                            session_id = %session.session_id,
                            error = %e,
                            "renewal sweep failed"
                        );
                    }
                }
            }
        }))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Internals
    // ═══════════════════════════════════════════════════════════════════

    /// Input check → lockout gate → timing-equalized verify, in that
    /// order. Returns the normalized key and identity on success.
    async fn verify_primary(&self, username: &str, password: &str) -> Result<(String, Identity)> {
        validate_input(username, password, self.config.credential.max_input_length)?;
        let key = normalize_key(username);

        // Fail fast while locked; no hash work is spent
        self.lockout.check(&key).await?;

        match self.validator.verify(&key, password).await? {
            Some(identity) => {
                self.lockout.record_success(&key).await?;
                Ok((key, identity))
            }
            None => {
                let record = self.lockout.record_failure(&key).await?;
                self.audit
                    .record(AuthEvent::LoginFailed {
                        identity_key: key,
                        failure_count: record.count,
                        timestamp: Utc::now(),
                    })
                    .await;
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Tear down whatever flow occupies the slot: ends an active session,
    /// cancels a pending challenge, always disposes the timer handle.
    async fn abandon_current(&self, slot: &mut FlowSlot, reason: Option<&str>) {
        if let Some(timer) = slot.idle_timer.take() {
            timer.cancel();
        }

        match std::mem::take(&mut slot.flow) {
            AuthFlow::Authenticated(session) => {
                if let Err(e) = self.sessions.logout(&session, reason).await {
                    warn!(session_id = %session.session_id, error = %e, "logout cleanup failed");
                    self.audit
                        .record(AuthEvent::StoreFailure {
                            context: "session delete on logout".to_string(),
                            timestamp: Utc::now(),
                        })
                        .await;
                }
            }
            AuthFlow::PendingTwoFactor(pending) => {
                let key = normalize_key(&pending.identity.username);
                if let Err(e) = self.two_factor.cancel(&key).await {
                    warn!(identity_key = %key, error = %e, "challenge cleanup failed");
                }
            }
            AuthFlow::Anonymous => {}
        }
    }

    /// Install a freshly issued session and arm its idle-expiry watch.
    fn install_session(&self, slot: &mut FlowSlot, session: &Session) {
        if let Some(timer) = slot.idle_timer.take() {
            timer.cancel();
        }
        slot.flow = AuthFlow::Authenticated(session.clone());
        slot.idle_timer = Some(self.spawn_expiry_watch(session.session_id));
    }

    /// Per-session scheduled task that fires logout at expiry.
    ///
    /// Re-reads the deadline from the slot after every sleep, so renewals
    /// simply push the wakeup forward. The elapsed-deadline check and the
    /// state teardown happen under the slot lock: an activity event racing
    /// this task either renews first (the task re-sleeps) or finds the
    /// session already gone.
    fn spawn_expiry_watch(&self, session_id: SessionId) -> TimerHandle {
        let slot = Arc::clone(&self.slot);
        let sessions = self.sessions.clone();

        TimerHandle::new(tokio::spawn(async move {
            loop {
                let deadline = {
                    let slot = slot.lock().await;
                    match &slot.flow {
                        AuthFlow::Authenticated(s) if s.session_id == session_id => s.expires_at,
                        _ => return,
                    }
                };

                let now = Utc::now();
                if deadline > now {
                    let wait = (deadline - now)
                        .to_std()
                        .unwrap_or(std::time::Duration::ZERO);
                    tokio::time::sleep(wait).await;
                    continue;
                }

                let mut slot = slot.lock().await;
                let AuthFlow::Authenticated(session) = &slot.flow else {
                    return;
                };
                if session.session_id != session_id {
                    return;
                }
                if !session.is_expired(Utc::now()) {
                    // Renewed while we waited for the lock
                    continue;
                }

                let expired = session.clone();
                slot.flow = AuthFlow::Anonymous;
                if let Err(e) = sessions.expire(&expired).await {
                    warn!(session_id = %expired.session_id, error = %e, "expiry cleanup failed");
                }
                // Dropping our own handle last; nothing awaits after this
                slot.idle_timer = None;
                return;
            }
        }))
    }

    /// Fetch the persisted record for the current session and validate it.
    ///
    /// Expired records are destroyed; tampered records force a logout (the
    /// manager has already audited and deleted them).
    async fn validated_session(&self) -> Option<Session> {
        let mut slot = self.slot.lock().await;

        let AuthFlow::Authenticated(current) = &slot.flow else {
            return None;
        };
        let session_id = current.session_id;

        let stored = match self.sessions.load(session_id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                clear_slot(&mut slot);
                return None;
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "session load failed");
                self.audit
                    .record(AuthEvent::StoreFailure {
                        context: "session load".to_string(),
                        timestamp: Utc::now(),
                    })
                    .await;
                clear_slot(&mut slot);
                return None;
            }
        };

        match self.sessions.validate(&stored).await {
            Ok(()) => {
                // Adopt the stored copy; another context may have renewed it
                slot.flow = AuthFlow::Authenticated(stored.clone());
                Some(stored)
            }
            Err(AuthError::SessionExpired) => {
                if let Err(e) = self.sessions.expire(&stored).await {
                    warn!(session_id = %session_id, error = %e, "expiry cleanup failed");
                }
                clear_slot(&mut slot);
                None
            }
            Err(_) => {
                // Tamper (audited and deleted by the manager) or store
                // failure: forced logout either way
                clear_slot(&mut slot);
                None
            }
        }
    }
}
