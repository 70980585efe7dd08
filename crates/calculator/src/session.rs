//! Calculation session.
//!
//! A session owns the inputs of one user and the last good valuation of each
//! stage. Input events mutate one field at a time; the affected stage is then
//! re-evaluated and its result either replaces the displayed valuation or is
//! recorded as the stage's error, leaving the previous valuation in place.
//!
//! Entry refreshes are split in three phases so price lookups can overlap
//! without the session being shared across tasks:
//!
//! 1. [`CalculationSession::begin_entry_refresh`] snapshots the entry inputs
//!    and tags them with a new request number.
//! 2. [`EntryRequest::resolve`] performs the lookups. It does not borrow the
//!    session and can run on another task.
//! 3. [`CalculationSession::complete_entry`] applies the outcome only if it
//!    belongs to the newest request; older outcomes are discarded.

use chrono::{NaiveDate, Utc};
use il_calc_data::PriceResolver;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entry::{EntryValuation, compute_entry_valuation};
use crate::error::{CalcError, ErrorKind};
use crate::event::{InputEvent, Recompute};
use crate::projection::{ProjectionValuation, compute_projection};
use crate::state::{EntryState, ProjectionState};

/// Result of re-evaluating a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The input did not change; nothing was evaluated.
    Unchanged,
    /// The new valuation is displayed.
    Applied,
    /// The evaluation failed; the previous valuation is still displayed.
    Failed(CalcError),
    /// A newer entry request was issued after this one; the outcome was dropped.
    Superseded {
        /// Request the outcome belonged to.
        request: u64,
        /// Newest request of the session.
        latest: u64,
    },
}

/// Snapshot of the entry inputs awaiting price resolution.
#[derive(Debug, Clone)]
pub struct EntryRequest {
    session: Uuid,
    request: u64,
    state: EntryState,
}

impl EntryRequest {
    /// Request number within the session.
    #[must_use]
    pub fn request(&self) -> u64 {
        self.request
    }

    /// Inputs captured when the request was issued.
    #[must_use]
    pub fn state(&self) -> &EntryState {
        &self.state
    }

    /// Evaluates the entry stage for the captured inputs.
    pub async fn resolve(self, resolver: Arc<dyn PriceResolver>) -> EntryOutcome {
        let result = compute_entry_valuation(&self.state, resolver.as_ref()).await;
        EntryOutcome {
            session: self.session,
            request: self.request,
            result,
        }
    }
}

/// Result of an [`EntryRequest`], waiting to be applied.
#[derive(Debug, Clone)]
pub struct EntryOutcome {
    session: Uuid,
    request: u64,
    result: Result<EntryValuation, CalcError>,
}

impl EntryOutcome {
    /// Request number the outcome belongs to.
    #[must_use]
    pub fn request(&self) -> u64 {
        self.request
    }

    /// The stage result.
    #[must_use]
    pub fn result(&self) -> &Result<EntryValuation, CalcError> {
        &self.result
    }
}

/// Everything the presentation layer binds to.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub entry_state: EntryState,
    pub projection_state: ProjectionState,
    pub entry: EntryValuation,
    pub projection: ProjectionValuation,
    pub entry_error: Option<CalcError>,
    pub projection_error: Option<CalcError>,
    pub refreshing: bool,
}

impl SessionSnapshot {
    /// Kind of the first outstanding error, entry stage first.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.entry_error
            .as_ref()
            .or(self.projection_error.as_ref())
            .map(CalcError::kind)
    }
}

/// Calculation context of a single user.
pub struct CalculationSession {
    id: Uuid,
    resolver: Arc<dyn PriceResolver>,
    entry_state: EntryState,
    projection_state: ProjectionState,
    entry: EntryValuation,
    projection: ProjectionValuation,
    entry_error: Option<CalcError>,
    projection_error: Option<CalcError>,
    /// Newest entry request issued.
    latest_request: u64,
    /// Newest entry request whose outcome was applied or failed.
    settled_request: u64,
}

impl CalculationSession {
    /// Creates a session whose start and future dates are today (UTC).
    #[must_use]
    pub fn new(resolver: Arc<dyn PriceResolver>) -> Self {
        let today = Utc::now().date_naive();
        Self::with_dates(resolver, today, today)
    }

    /// Creates a session with explicit start and future dates.
    #[must_use]
    pub fn with_dates(
        resolver: Arc<dyn PriceResolver>,
        start_date: NaiveDate,
        future_date: NaiveDate,
    ) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, provider = resolver.id(), "Calculation session created");
        Self {
            id,
            resolver,
            entry_state: EntryState::new(start_date),
            projection_state: ProjectionState::new(future_date),
            entry: EntryValuation::zero(start_date),
            projection: ProjectionValuation::zero(),
            entry_error: None,
            projection_error: None,
            latest_request: 0,
            settled_request: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Resolver used by [`Self::refresh_entry`].
    #[must_use]
    pub fn resolver(&self) -> Arc<dyn PriceResolver> {
        Arc::clone(&self.resolver)
    }

    #[must_use]
    pub fn entry_state(&self) -> &EntryState {
        &self.entry_state
    }

    #[must_use]
    pub fn projection_state(&self) -> &ProjectionState {
        &self.projection_state
    }

    /// Last applied entry valuation.
    #[must_use]
    pub fn entry(&self) -> &EntryValuation {
        &self.entry
    }

    /// Last applied projection.
    #[must_use]
    pub fn projection(&self) -> &ProjectionValuation {
        &self.projection
    }

    #[must_use]
    pub fn entry_error(&self) -> Option<&CalcError> {
        self.entry_error.as_ref()
    }

    #[must_use]
    pub fn projection_error(&self) -> Option<&CalcError> {
        self.projection_error.as_ref()
    }

    /// Whether the newest entry request is still outstanding.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.latest_request > self.settled_request
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            entry_state: self.entry_state.clone(),
            projection_state: self.projection_state.clone(),
            entry: self.entry.clone(),
            projection: self.projection.clone(),
            entry_error: self.entry_error.clone(),
            projection_error: self.projection_error.clone(),
            refreshing: self.is_refreshing(),
        }
    }

    /// Applies one input change and reports which stage it invalidates.
    pub fn apply(&mut self, event: InputEvent) -> Recompute {
        let stage = event.stage();
        debug!(session = %self.id, ?event, "Input changed");

        let changed = match event {
            InputEvent::StartDate(date) => set(&mut self.entry_state.start_date, date),
            InputEvent::TokenA(token) => set(&mut self.entry_state.token_a, token),
            InputEvent::TokenB(token) => set(&mut self.entry_state.token_b, token),
            InputEvent::QuantityA(qty) => set(&mut self.entry_state.qty_a, qty),
            InputEvent::FutureDate(date) => set(&mut self.projection_state.future_date, date),
            InputEvent::FuturePriceA(price) => {
                set(&mut self.projection_state.price_a_future, price)
            }
            InputEvent::FuturePriceB(price) => {
                set(&mut self.projection_state.price_b_future, price)
            }
            InputEvent::Rate(rate) => set(&mut self.projection_state.rate.0, rate),
            InputEvent::RateMode(mode) => set(&mut self.projection_state.rate_mode, mode),
        };

        if changed { stage } else { Recompute::Nothing }
    }

    /// Re-evaluates the projection against the current entry valuation.
    pub fn recompute_projection(&mut self) -> Completion {
        match compute_projection(&self.entry, &self.projection_state) {
            Ok(projection) => {
                debug!(
                    session = %self.id,
                    il_pct = %projection.il_percent.0,
                    value = %projection.value_with_interest,
                    "Projection applied"
                );
                self.projection = projection;
                self.projection_error = None;
                Completion::Applied
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "Projection failed, keeping previous values");
                self.projection_error = Some(e.clone());
                Completion::Failed(e)
            }
        }
    }

    /// Issues a new entry request, superseding any outstanding one.
    pub fn begin_entry_refresh(&mut self) -> EntryRequest {
        self.latest_request += 1;
        debug!(session = %self.id, request = self.latest_request, "Entry refresh started");
        EntryRequest {
            session: self.id,
            request: self.latest_request,
            state: self.entry_state.clone(),
        }
    }

    /// Applies the outcome of an entry request if it is the newest one.
    ///
    /// An applied valuation also re-evaluates the projection.
    pub fn complete_entry(&mut self, outcome: EntryOutcome) -> Completion {
        if outcome.session != self.id || outcome.request != self.latest_request {
            warn!(
                session = %self.id,
                request = outcome.request,
                latest = self.latest_request,
                "Discarding superseded entry outcome"
            );
            return Completion::Superseded {
                request: outcome.request,
                latest: self.latest_request,
            };
        }

        self.settled_request = outcome.request;
        match outcome.result {
            Ok(valuation) => {
                info!(
                    session = %self.id,
                    request = outcome.request,
                    qty_b = %valuation.qty_b,
                    total_usd = %valuation.total_value_usd,
                    "Entry valuation applied"
                );
                self.entry = valuation;
                self.entry_error = None;
                self.recompute_projection();
                Completion::Applied
            }
            Err(e) => {
                warn!(
                    session = %self.id,
                    request = outcome.request,
                    error = %e,
                    "Entry valuation failed, keeping previous values"
                );
                self.entry_error = Some(e.clone());
                Completion::Failed(e)
            }
        }
    }

    /// Runs all three entry refresh phases in sequence.
    pub async fn refresh_entry(&mut self) -> Completion {
        let request = self.begin_entry_refresh();
        let outcome = request.resolve(self.resolver()).await;
        self.complete_entry(outcome)
    }

    /// Applies an input change and re-evaluates whatever it invalidates.
    pub async fn handle(&mut self, event: InputEvent) -> Completion {
        match self.apply(event) {
            Recompute::Nothing => Completion::Unchanged,
            Recompute::Entry => self.refresh_entry().await,
            Recompute::Projection => self.recompute_projection(),
        }
    }
}

/// Stores `value` in `slot`, reporting whether it differed.
fn set<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use il_calc_data::ResolverError;
    use il_calc_data::providers::{StaticFailure, StaticPriceProvider};
    use il_calc_domain::entities::{Token, TokenId};
    use il_calc_domain::enums::RateMode;
    use il_calc_domain::value_objects::Price;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tokio::sync::Notify;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
    }

    fn future() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, 31).unwrap()
    }

    fn listing_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 2, 1).unwrap()
    }

    fn provider() -> StaticPriceProvider {
        StaticPriceProvider::new()
            .with_price("token-a", start(), dec!(100))
            .with_price("token-a", listing_day(), dec!(80))
            .with_price("token-b", start(), dec!(1))
            .with_price("token-c", start(), dec!(50))
            .with_failure("throttled", StaticFailure::RateLimited)
    }

    fn session() -> CalculationSession {
        CalculationSession::with_dates(Arc::new(provider()), start(), future())
    }

    async fn fill_scenario(session: &mut CalculationSession) {
        session.handle(InputEvent::TokenA(Some("token-a".into()))).await;
        session.handle(InputEvent::TokenB(Some("token-b".into()))).await;
        session.handle(InputEvent::QuantityA(Some(dec!(10)))).await;
        session.handle(InputEvent::FuturePriceA(Some(dec!(150)))).await;
        session.handle(InputEvent::FuturePriceB(Some(dec!(1)))).await;
    }

    #[tokio::test]
    async fn test_full_scenario() {
        let mut session = session();
        fill_scenario(&mut session).await;

        let entry = session.entry();
        assert_eq!(entry.qty_b, dec!(1000));
        assert_eq!(entry.total_value_usd, dec!(2000));

        let projection = session.projection();
        assert_eq!(projection.days, 30);
        assert_eq!(projection.value_before_interest.round_dp(2), dec!(2449.49));
        assert_eq!(projection.value_if_held, dec!(2500));
        assert_eq!(projection.il_dollar.round_dp(2), dec!(50.51));
        assert_eq!(projection.il_percent.0.round_dp(2), dec!(2.02));
        assert!(session.entry_error().is_none());
        assert!(session.projection_error().is_none());
        assert!(!session.is_refreshing());
    }

    #[tokio::test]
    async fn test_projection_events_recompute_synchronously() {
        let mut session = session();
        fill_scenario(&mut session).await;

        assert_eq!(
            session.handle(InputEvent::Rate(dec!(36.5))).await,
            Completion::Applied
        );
        // 30 days at 36.5% APR = 3% of the pool value
        let projection = session.projection();
        assert_eq!(projection.interest_percent.0.round_dp(6), dec!(3));

        session.handle(InputEvent::RateMode(RateMode::Apy)).await;
        assert!(session.projection().interest_percent.0 > dec!(3));
    }

    #[tokio::test]
    async fn test_unchanged_input_does_nothing() {
        let mut session = session();
        fill_scenario(&mut session).await;

        assert_eq!(
            session.apply(InputEvent::QuantityA(Some(dec!(10)))),
            Recompute::Nothing
        );
        assert_eq!(
            session.handle(InputEvent::FuturePriceB(Some(dec!(1)))).await,
            Completion::Unchanged
        );
        assert_eq!(
            session.apply(InputEvent::QuantityA(Some(dec!(11)))),
            Recompute::Entry
        );
    }

    #[tokio::test]
    async fn test_price_unavailable_keeps_previous_valuation() {
        let mut session = session();
        fill_scenario(&mut session).await;
        let before = session.snapshot();

        // token B has no price before its listing
        let completion = session.handle(InputEvent::StartDate(listing_day())).await;
        assert!(matches!(
            completion,
            Completion::Failed(CalcError::PriceUnavailable { ref token, .. }) if token == "token-b"
        ));

        assert_eq!(session.entry(), &before.entry);
        assert_eq!(session.projection(), &before.projection);
        assert_eq!(session.snapshot().error_kind(), Some(ErrorKind::PriceUnavailable));
        assert_eq!(session.entry_state().start_date, listing_day());

        // recovers on the next change
        assert_eq!(
            session.handle(InputEvent::StartDate(start())).await,
            Completion::Applied
        );
        assert!(session.entry_error().is_none());
        assert_eq!(session.snapshot().error_kind(), None);
    }

    #[tokio::test]
    async fn test_rate_limited_lookup_is_transient_and_keeps_values() {
        let mut session = session();
        fill_scenario(&mut session).await;
        let before = session.snapshot();

        let completion = session
            .handle(InputEvent::TokenB(Some("throttled".into())))
            .await;
        let Completion::Failed(err) = completion else {
            panic!("expected a failed refresh, got {completion:?}");
        };
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert!(err.is_transient());

        assert_eq!(session.entry(), &before.entry);
        assert_eq!(session.projection(), &before.projection);
        assert_eq!(
            session.snapshot().error_kind(),
            Some(ErrorKind::ServiceUnavailable)
        );
    }

    #[tokio::test]
    async fn test_unknown_token_is_reported() {
        let mut session = session();
        let completion = session
            .handle(InputEvent::TokenA(Some("no-such-coin".into())))
            .await;
        assert!(matches!(
            completion,
            Completion::Failed(CalcError::UnknownToken(ref id)) if id == "no-such-coin"
        ));
        assert_eq!(session.entry(), &EntryValuation::zero(start()));
    }

    #[tokio::test]
    async fn test_overflowing_projection_keeps_previous_projection() {
        let ten_years = NaiveDate::from_ymd_opt(2031, 3, 1).unwrap();
        let mut session = CalculationSession::with_dates(Arc::new(provider()), start(), ten_years);
        session.handle(InputEvent::TokenA(Some("token-a".into()))).await;
        session.handle(InputEvent::TokenB(Some("token-b".into()))).await;
        session.handle(InputEvent::QuantityA(Some(dec!(0.0001)))).await;
        session.handle(InputEvent::FuturePriceA(Some(dec!(100)))).await;
        session.handle(InputEvent::FuturePriceB(Some(dec!(1)))).await;
        let before = session.projection().clone();
        assert_eq!(before.days, 3652);
        assert_eq!(before.value_if_held, dec!(0.02));

        let huge_rate = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let completion = session.handle(InputEvent::Rate(huge_rate)).await;
        assert!(matches!(
            completion,
            Completion::Failed(ref e) if e.kind() == ErrorKind::ArithmeticDomain
        ));
        assert_eq!(session.projection(), &before);

        assert_eq!(
            session.handle(InputEvent::Rate(dec!(5))).await,
            Completion::Applied
        );
        assert!(session.projection_error().is_none());
    }

    #[tokio::test]
    async fn test_failed_projection_keeps_previous_projection() {
        let mut session = session();
        fill_scenario(&mut session).await;
        let before = session.projection().clone();

        let completion = session.handle(InputEvent::FutureDate(listing_day())).await;
        assert!(matches!(completion, Completion::Failed(CalcError::InvalidInput(_))));
        assert_eq!(session.projection(), &before);
        assert_eq!(
            session.projection_error().map(CalcError::kind),
            Some(ErrorKind::InvalidInput)
        );

        session.handle(InputEvent::FutureDate(future())).await;
        assert!(session.projection_error().is_none());
    }

    #[tokio::test]
    async fn test_clearing_a_price_zeroes_the_projection() {
        let mut session = session();
        fill_scenario(&mut session).await;

        session.handle(InputEvent::FuturePriceB(None)).await;
        assert_eq!(session.projection(), &ProjectionValuation::zero());
    }

    #[tokio::test]
    async fn test_older_outcome_is_discarded() {
        let mut session = session();
        session.apply(InputEvent::TokenA(Some("token-a".into())));
        session.apply(InputEvent::TokenB(Some("token-b".into())));
        let first = session.begin_entry_refresh();

        session.apply(InputEvent::TokenB(Some("token-c".into())));
        let second = session.begin_entry_refresh();
        assert!(session.is_refreshing());
        assert_eq!(first.state().token_b, Some(TokenId::from("token-b")));
        assert_eq!(second.state().token_b, Some(TokenId::from("token-c")));
        assert_eq!((first.request(), second.request()), (1, 2));

        let resolver = session.resolver();
        let first = first.resolve(Arc::clone(&resolver)).await;
        let second = second.resolve(resolver).await;

        assert_eq!(session.complete_entry(second), Completion::Applied);
        assert_eq!(
            session.complete_entry(first),
            Completion::Superseded {
                request: 1,
                latest: 2
            }
        );
        assert_eq!(session.entry().price_b, Price::new(dec!(50)));
        assert!(!session.is_refreshing());
    }

    #[tokio::test]
    async fn test_stale_outcome_arriving_first_is_discarded() {
        let mut session = session();
        session.apply(InputEvent::TokenA(Some("token-a".into())));
        let first = session.begin_entry_refresh();
        session.apply(InputEvent::TokenB(Some("token-b".into())));
        let second = session.begin_entry_refresh();

        let first = first.resolve(session.resolver()).await;
        assert!(matches!(
            session.complete_entry(first),
            Completion::Superseded { .. }
        ));
        assert_eq!(session.entry(), &EntryValuation::zero(start()));
        assert!(session.is_refreshing());

        let second = second.resolve(session.resolver()).await;
        assert_eq!(session.complete_entry(second), Completion::Applied);
        assert_eq!(session.entry().price_b, Price::new(dec!(1)));
    }

    /// Resolver whose lookups of one token wait for a signal.
    struct GatedResolver {
        inner: StaticPriceProvider,
        gated: TokenId,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl PriceResolver for GatedResolver {
        fn id(&self) -> &'static str {
            "GATED"
        }

        async fn list_tokens(&self) -> Result<Vec<Token>, ResolverError> {
            self.inner.list_tokens().await
        }

        async fn historical_price(
            &self,
            token: &TokenId,
            date: NaiveDate,
        ) -> Result<Price, ResolverError> {
            if token == &self.gated {
                self.gate.notified().await;
            }
            self.inner.historical_price(token, date).await
        }
    }

    #[tokio::test]
    async fn test_lagging_lookup_cannot_overwrite_newer_state() {
        let gate = Arc::new(Notify::new());
        let resolver = Arc::new(GatedResolver {
            inner: provider(),
            gated: TokenId::from("token-c"),
            gate: Arc::clone(&gate),
        });
        let mut session = CalculationSession::with_dates(resolver, start(), future());

        session.apply(InputEvent::TokenA(Some("token-a".into())));
        session.apply(InputEvent::TokenB(Some("token-c".into())));
        let slow = tokio::spawn(session.begin_entry_refresh().resolve(session.resolver()));

        session.apply(InputEvent::TokenB(Some("token-b".into())));
        assert_eq!(session.refresh_entry().await, Completion::Applied);
        assert_eq!(session.entry().price_b, Price::new(dec!(1)));

        gate.notify_one();
        let late = slow.await.unwrap();
        assert!(late.result().is_ok());
        assert!(matches!(
            session.complete_entry(late),
            Completion::Superseded { .. }
        ));
        assert_eq!(session.entry().price_b, Price::new(dec!(1)));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let resolver: Arc<dyn PriceResolver> = Arc::new(provider());
        let mut first = CalculationSession::with_dates(Arc::clone(&resolver), start(), future());
        let mut second = CalculationSession::with_dates(resolver, start(), future());
        assert_ne!(first.id(), second.id());

        fill_scenario(&mut first).await;
        assert_eq!(second.entry(), &EntryValuation::zero(start()));

        // an outcome from another session is never applied
        second.apply(InputEvent::TokenA(Some("token-a".into())));
        let foreign = first.begin_entry_refresh().resolve(first.resolver()).await;
        assert!(matches!(
            second.complete_entry(foreign),
            Completion::Superseded { .. }
        ));
        assert_eq!(second.entry().total_value_usd, Decimal::ZERO);
    }
}
