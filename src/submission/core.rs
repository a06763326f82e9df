//! TOTP submission with a single retry on submit timeout.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::identifiers::SessionId;
use crate::page::keyboard::input_events;
use crate::page::{Page, PageElement};

use super::timings::SubmissionTimings;

// ============================================================================
// TokenSource
// ============================================================================

/// Produces a fresh one-time token on every call.
pub trait TokenSource: Send + Sync {
    /// Returns the current token.
    ///
    /// # Errors
    ///
    /// Any error aborts the submission unmodified and is never retried.
    fn token(&self) -> Result<String>;
}

impl<F> TokenSource for F
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn token(&self) -> Result<String> {
        self()
    }
}

// ============================================================================
// SubmissionContext
// ============================================================================

/// Elements and token source borrowed for one submission call.
pub struct SubmissionContext<'a, I, B, T: ?Sized> {
    /// Text field receiving the token.
    pub input: &'a I,
    /// Control submitting the form.
    pub action_trigger: &'a B,
    /// Token generator, invoked once per attempt.
    pub token_source: &'a T,
}

impl<'a, I, B, T: ?Sized> SubmissionContext<'a, I, B, T> {
    /// Creates a submission context.
    #[inline]
    #[must_use]
    pub fn new(input: &'a I, action_trigger: &'a B, token_source: &'a T) -> Self {
        Self {
            input,
            action_trigger,
            token_source,
        }
    }
}

// ============================================================================
// TotpSubmitter
// ============================================================================

/// Submits a one-time token into a form, retrying once on submit timeout.
///
/// Per call:
///
/// 1. the input must be empty, otherwise [`Error::PrefilledInput`]
/// 2. fill a fresh token with the full key event sequence, click the trigger,
///    wait the settle delay
/// 3. unchanged location means [`Error::SubmitTimeout`]
/// 4. only that exact timeout is retried, once, after the retry delay and
///    with a newly generated token; every other error propagates unmodified
///
/// `Ok(())` means navigation was observed, not that the remote side accepted
/// the token.
///
/// # Example
///
/// ```ignore
/// use form_pilot::{SubmissionContext, TotpSubmitter};
///
/// let token = || totp.generate_current().map_err(|e| Error::config(e.to_string()));
/// TotpSubmitter::new(&page)
///     .submit(SubmissionContext::new(&input, &button, &token))
///     .await?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TotpSubmitter<'p, P> {
    page: &'p P,
    timings: SubmissionTimings,
}

impl<'p, P: Page> TotpSubmitter<'p, P> {
    /// Creates a submitter with the default timings.
    #[inline]
    #[must_use]
    pub fn new(page: &'p P) -> Self {
        Self {
            page,
            timings: SubmissionTimings::new(),
        }
    }

    /// Replaces the timings.
    #[inline]
    #[must_use]
    pub fn with_timings(mut self, timings: SubmissionTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Returns the timings.
    #[inline]
    #[must_use]
    pub fn timings(&self) -> &SubmissionTimings {
        &self.timings
    }

    /// Submits the token.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the timings are invalid
    /// - [`Error::PrefilledInput`] if the input already holds a value
    /// - [`Error::SubmitTimeout`] if both attempts saw no navigation
    /// - any page error raised while filling or clicking, unmodified
    pub async fn submit<I, B, T>(&self, ctx: SubmissionContext<'_, I, B, T>) -> Result<()>
    where
        I: PageElement,
        B: PageElement,
        T: TokenSource + ?Sized,
    {
        self.run(&ctx, None).await
    }

    /// Like [`submit`](Self::submit), but aborts with [`Error::Cancelled`]
    /// when `cancel` fires during one of the delays.
    pub async fn submit_with_cancel<I, B, T>(
        &self,
        ctx: SubmissionContext<'_, I, B, T>,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        I: PageElement,
        B: PageElement,
        T: TokenSource + ?Sized,
    {
        self.run(&ctx, Some(cancel)).await
    }

    async fn run<I, B, T>(
        &self,
        ctx: &SubmissionContext<'_, I, B, T>,
        cancel: Option<&CancellationToken>,
    ) -> Result<()>
    where
        I: PageElement,
        B: PageElement,
        T: TokenSource + ?Sized,
    {
        let session_id = SessionId::generate();
        info!(%session_id, "submit_totp_token");

        self.timings.validate()?;

        if !ctx.input.value().await?.is_empty() {
            return Err(Error::PrefilledInput);
        }

        let result = match self.attempt(ctx, session_id, 1, cancel).await {
            Err(Error::SubmitTimeout { delay_ms }) if delay_ms == self.timings.settle_delay_ms => {
                warn!(%session_id, delay_ms, "submit 1 - fail, retrying with a fresh token");
                // The token may have expired between generation and click.
                pause(self.timings.retry_delay(), cancel, "submit retry delay").await?;
                self.attempt(ctx, session_id, 2, cancel).await
            }
            other => other,
        };

        if let Err(e) = &result {
            warn!(%session_id, error = %e, "submit_totp_token failed");
        }
        result
    }

    async fn attempt<I, B, T>(
        &self,
        ctx: &SubmissionContext<'_, I, B, T>,
        session_id: SessionId,
        attempt: u8,
        cancel: Option<&CancellationToken>,
    ) -> Result<()>
    where
        I: PageElement,
        B: PageElement,
        T: TokenSource + ?Sized,
    {
        debug!(%session_id, attempt, "submit - start");
        let location_before = self.page.current_location().await?;

        let token = ctx.token_source.token()?;
        fill_input_value(ctx.input, &token).await?;
        debug!(%session_id, attempt, "input filled");

        ctx.action_trigger.click().await?;
        debug!(%session_id, attempt, "clicked");

        pause(self.timings.settle_delay(), cancel, "submit settle delay").await?;

        if self.page.current_location().await? == location_before {
            return Err(Error::submit_timeout(self.timings.settle_delay_ms));
        }

        debug!(%session_id, attempt, "submit - success");
        Ok(())
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Submits `token_source`'s token with the default timings.
///
/// # Errors
///
/// See [`TotpSubmitter::submit`].
pub async fn submit_totp_token<P, I, B, T>(
    page: &P,
    input: &I,
    action_trigger: &B,
    token_source: &T,
) -> Result<()>
where
    P: Page,
    I: PageElement,
    B: PageElement,
    T: TokenSource + ?Sized,
{
    TotpSubmitter::new(page)
        .submit(SubmissionContext::new(input, action_trigger, token_source))
        .await
}

/// Assigns `value` to `input`, then dispatches the key events a user typing
/// it would produce.
///
/// # Errors
///
/// Returns the first error raised by the element.
pub async fn fill_input_value<E: PageElement + ?Sized>(input: &E, value: &str) -> Result<()> {
    input.set_value(value).await?;
    for event in input_events(value) {
        input.dispatch_key_event(&event).await?;
    }
    Ok(())
}

async fn pause(
    delay: Duration,
    cancel: Option<&CancellationToken>,
    operation: &str,
) -> Result<()> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            () = token.cancelled() => Err(Error::cancelled(operation)),
            () = sleep(delay) => Ok(()),
        },
        None => {
            sleep(delay).await;
            Ok(())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tokio::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    use crate::page::{By, KeyEvent, KeyEventKind, MemoryElement, MemoryPage};

    const LOGIN_URL: &str = "https://mail.test/login";
    const INBOX_URL: &str = "https://mail.test/inbox";

    struct Form {
        page: MemoryPage,
        input: MemoryElement,
        button: MemoryElement,
    }

    /// Login form whose button navigates on the `navigate_on`-th click.
    fn form(navigate_on: Option<u32>) -> Form {
        let page = MemoryPage::new(LOGIN_URL);
        let input = page.insert(By::name("totp"));
        let button = page.insert(By::css("button[type='submit']"));
        button.on_click(Arc::new(move |page: &MemoryPage, clicks: u32| {
            if Some(clicks) == navigate_on {
                page.set_location(INBOX_URL);
            }
        }))
        .unwrap();
        Form {
            page,
            input,
            button,
        }
    }

    /// Token source yielding "000001", "000002", ... and counting calls.
    fn counting_tokens() -> (Arc<AtomicU32>, impl Fn() -> Result<String> + Send + Sync) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let source = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("{n:06}"))
        };
        (calls, source)
    }

    fn assert_elapsed(started: Instant, expected_ms: u64) {
        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_millis(expected_ms)
                && elapsed < Duration::from_millis(expected_ms + 100),
            "elapsed {elapsed:?}, expected ~{expected_ms}ms"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefilled_input_fails_fast() {
        let form = form(Some(1));
        form.input.prefill("123456").unwrap();
        let (calls, tokens) = counting_tokens();

        let started = Instant::now();
        let err = submit_totp_token(&form.page, &form.input, &form.button, &tokens)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::PrefilledInput));
        assert_eq!(form.button.clicks(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_elapsed(started, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success() {
        let form = form(Some(1));
        let (calls, tokens) = counting_tokens();

        let started = Instant::now();
        assert_ok!(submit_totp_token(&form.page, &form.input, &form.button, &tokens).await);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(form.button.clicks(), 1);
        assert_eq!(form.input.value().await.unwrap(), "000001");
        assert_eq!(form.input.typed_text(), "000001");
        assert_eq!(form.page.location(), INBOX_URL);
        assert_elapsed(started, 4_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_submit_timeout_uses_fresh_token() {
        let form = form(Some(2));
        let (calls, tokens) = counting_tokens();

        let started = Instant::now();
        assert_ok!(submit_totp_token(&form.page, &form.input, &form.button, &tokens).await);

        // settle 4s, retry delay 2s, settle 4s
        assert_elapsed(started, 10_000);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(form.button.clicks(), 2);
        assert_eq!(form.input.value().await.unwrap(), "000002");
        assert_eq!(form.input.typed_text(), "000001000002");
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_timeout_is_final() {
        let form = form(None);
        let (calls, tokens) = counting_tokens();

        let err = submit_totp_token(&form.page, &form.input, &form.button, &tokens)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::SubmitTimeout { delay_ms: 4_000 }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(form.button.clicks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fill_error_propagates_without_click() {
        let form = form(Some(1));
        form.input
            .fail_input("InvalidStateError: input is read-only")
            .unwrap();
        let (calls, tokens) = counting_tokens();

        let err = submit_totp_token(&form.page, &form.input, &form.button, &tokens)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Page error: InvalidStateError: input is read-only");
        assert_eq!(form.button.clicks(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_trigger_is_not_retried() {
        let form = form(Some(1));
        form.page.remove(By::css("button[type='submit']"));
        let (calls, tokens) = counting_tokens();

        let started = Instant::now();
        let err = submit_totp_token(&form.page, &form.input, &form.button, &tokens)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::StaleElement { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_elapsed(started, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_source_error_is_fatal() {
        let form = form(Some(1));
        let failing = || -> Result<String> { Err(Error::config("TOTP secret is not set")) };

        let started = Instant::now();
        let err = submit_totp_token(&form.page, &form.input, &form.button, &failing)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Configuration error: TOTP secret is not set");
        assert_eq!(form.button.clicks(), 0);
        assert!(form.input.events().is_empty());
        assert_elapsed(started, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_source_error_on_retry_is_final() {
        let form = form(Some(2));
        let calls = AtomicU32::new(0);
        let expiring = || -> Result<String> {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 => Ok("000001".to_string()),
                _ => Err(Error::page("authenticator locked")),
            }
        };

        let err = submit_totp_token(&form.page, &form.input, &form.button, &expiring)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Page { .. }));
        assert_eq!(form.button.clicks(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// Trigger whose click itself reports a timeout with a foreign delay.
    struct ForeignTimeoutTrigger {
        clicks: AtomicU32,
    }

    #[async_trait]
    impl PageElement for ForeignTimeoutTrigger {
        async fn value(&self) -> Result<String> {
            Ok(String::new())
        }

        async fn set_value(&self, _value: &str) -> Result<()> {
            Ok(())
        }

        async fn dispatch_key_event(&self, _event: &KeyEvent) -> Result<()> {
            Ok(())
        }

        async fn click(&self) -> Result<()> {
            self.clicks.fetch_add(1, Ordering::SeqCst);
            Err(Error::submit_timeout(30_000))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_with_other_delay_is_not_retried() {
        let form = form(None);
        let trigger = ForeignTimeoutTrigger {
            clicks: AtomicU32::new(0),
        };
        let (calls, tokens) = counting_tokens();

        let err = submit_totp_token(&form.page, &form.input, &trigger, &tokens)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::SubmitTimeout { delay_ms: 30_000 }));
        assert_eq!(trigger.clicks.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_timings() {
        let form = form(None);
        let (_, tokens) = counting_tokens();
        let timings = SubmissionTimings::new()
            .with_settle_delay_ms(100)
            .with_retry_delay_ms(50);

        let started = Instant::now();
        let err = TotpSubmitter::new(&form.page)
            .with_timings(timings)
            .submit(SubmissionContext::new(&form.input, &form.button, &tokens))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::SubmitTimeout { delay_ms: 100 }));
        assert_elapsed(started, 250);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_settle_delay() {
        let form = form(None);
        let (_, tokens) = counting_tokens();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let submitter = TotpSubmitter::new(&form.page);
        let result = submitter
            .submit_with_cancel(
                SubmissionContext::new(&form.input, &form.button, &tokens),
                &cancel,
            )
            .await;

        let err = assert_err!(result);
        assert!(matches!(err, Error::Cancelled { .. }));
        assert_eq!(form.button.clicks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_timings_rejected() {
        let form = form(Some(1));
        let (calls, tokens) = counting_tokens();

        let err = TotpSubmitter::new(&form.page)
            .with_timings(SubmissionTimings::new().with_settle_delay_ms(0))
            .submit(SubmissionContext::new(&form.input, &form.button, &tokens))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fill_input_value_dispatches_events() {
        let page = MemoryPage::new(LOGIN_URL);
        let input = page.insert(By::name("totp"));

        fill_input_value(&input, "42").await.unwrap();

        assert_eq!(input.value().await.unwrap(), "42");
        let kinds: Vec<KeyEventKind> = input.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                KeyEventKind::KeyDown,
                KeyEventKind::KeyPress,
                KeyEventKind::Input,
                KeyEventKind::KeyUp,
                KeyEventKind::KeyDown,
                KeyEventKind::KeyPress,
                KeyEventKind::Input,
                KeyEventKind::KeyUp,
            ]
        );
    }
}
