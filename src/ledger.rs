//! Balance state machine for user accounts.
//!
//! This module is pure: it operates on an in-memory [`AccountState`]
//! snapshot and reports the resulting [`LedgerEvent`]s. The database layer
//! loads a user row into a snapshot, applies exactly one transition inside a
//! single database transaction, then persists the snapshot and appends the
//! produced events to the audit trail.
//!
//! The transitions encode the platform's earning mechanics:
//!
//! - ordinary ad clicks credit the withdrawable balance;
//! - an admin-imposed *restriction* redirects click earnings into an escrow
//!   balance at a fixed per-ad commission until a quota is met, after which
//!   a qualifying deposit releases the escrow;
//! - an admin-configured *milestone* either pays a prize instantly (bonus)
//!   or locks the account until a deposit is recorded (voucher).

use thiserror::Error;

use crate::money::Money;

/// How a completed milestone pays out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MilestoneKind {
    /// Prize is held and the account locks until a deposit is recorded.
    Voucher,
    /// Prize is credited instantly with no lock.
    Bonus,
}

impl MilestoneKind {
    /// Stable textual form stored in the database and used in the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Voucher => "voucher",
            Self::Bonus => "bonus",
        }
    }

    /// Parse the stored textual form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "voucher" => Some(Self::Voucher),
            "bonus" => Some(Self::Bonus),
            _ => None,
        }
    }
}

/// An admin-configured ad-click target with its payout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Milestone {
    /// Total completed-ad count that triggers the milestone.
    pub target: i32,
    /// Payout behaviour on completion.
    pub kind: MilestoneKind,
    /// Amount credited when the milestone resolves.
    pub prize: Money,
}

/// An admin-imposed restricted-earning mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Restriction {
    /// Number of ads that must be completed under the restriction.
    pub ads_limit: i32,
    /// Deposit required to release the escrowed earnings.
    pub deposit: Money,
    /// Fixed commission credited to escrow per completed ad.
    pub commission: Money,
    /// Ads completed so far under the restriction.
    pub completed: i32,
}

impl Restriction {
    /// Whether clicks are still being counted against the quota.
    #[must_use]
    pub const fn is_active(&self) -> bool { self.completed < self.ads_limit }

    /// Whether the quota is met and the escrow awaits a deposit.
    #[must_use]
    pub const fn awaiting_deposit(&self) -> bool { self.completed >= self.ads_limit }
}

/// Kind of audit-trail entry produced by a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Ordinary ad click credited to the withdrawable balance.
    AdClick,
    /// Restricted-mode click credited to escrow.
    RestrictionCommission,
    /// Instant milestone prize.
    MilestoneBonus,
    /// Voucher prize released by a deposit.
    VoucherRelease,
    /// Restriction escrow released by a qualifying deposit.
    RestrictionRelease,
    /// Deposit recorded (gate-opener; not an earning).
    Deposit,
    /// Approved withdrawal debit.
    Withdrawal,
    /// Direct admin balance mutation.
    AdminAdjust,
}

impl EventKind {
    /// Whether entries of this kind move the primary withdrawable balance.
    ///
    /// Used to maintain the running `balance_after` column of the audit
    /// trail: escrow commissions and bare deposits do not move it.
    #[must_use]
    pub const fn affects_primary_balance(self) -> bool {
        match self {
            Self::AdClick
            | Self::MilestoneBonus
            | Self::VoucherRelease
            | Self::RestrictionRelease
            | Self::Withdrawal
            | Self::AdminAdjust => true,
            Self::RestrictionCommission | Self::Deposit => false,
        }
    }

    /// Stable textual form stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AdClick => "ad_click",
            Self::RestrictionCommission => "restriction_commission",
            Self::MilestoneBonus => "milestone_bonus",
            Self::VoucherRelease => "voucher_release",
            Self::RestrictionRelease => "restriction_release",
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::AdminAdjust => "admin_adjust",
        }
    }
}

/// A single audit-trail entry produced by a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerEvent {
    /// What happened.
    pub kind: EventKind,
    /// Signed amount moved; negative for debits.
    pub amount: Money,
}

/// Money field an admin may mutate directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoneyField {
    /// Primary withdrawable balance.
    MilestoneAmount,
    /// Daily reward counter.
    MilestoneReward,
    /// Restriction escrow balance.
    DestinationAmount,
}

impl MoneyField {
    /// Parse the API field name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "milestone_amount" => Some(Self::MilestoneAmount),
            "milestone_reward" => Some(Self::MilestoneReward),
            "destination_amount" => Some(Self::DestinationAmount),
            _ => None,
        }
    }
}

/// Direct mutation applied by an admin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdjustOp {
    /// Replace the field with the supplied amount.
    Set,
    /// Add the (possibly negative) amount to the field.
    Add,
    /// Zero the field.
    Reset,
}

impl AdjustOp {
    /// Parse the API operation name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "set" => Some(Self::Set),
            "add" => Some(Self::Add),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

/// Errors raised by account transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The account holds an unredeemed voucher and cannot earn.
    #[error("account is locked pending a deposit")]
    AccountLocked,
    /// The restriction quota is met; a qualifying deposit is required first.
    #[error("restriction quota met; deposit required before further ads")]
    AwaitingDeposit,
    /// A debit exceeds the withdrawable balance.
    #[error("insufficient balance")]
    InsufficientBalance,
    /// The supplied amount must be strictly positive.
    #[error("amount must be positive")]
    AmountNotPositive,
    /// The operation would drive a balance or counter negative.
    #[error("operation would drive a balance negative")]
    NegativeBalance,
    /// Balance arithmetic overflowed the representable range.
    #[error("balance arithmetic overflow")]
    Overflow,
}

/// Mutable balance snapshot of one user account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountState {
    /// Primary withdrawable balance.
    pub milestone_amount: Money,
    /// Today's earnings counter; reset nightly.
    pub milestone_reward: Money,
    /// Escrow balance accrued under a restriction.
    pub destination_amount: Money,
    /// Loyalty points; one per completed ad.
    pub points: i32,
    /// Lifetime count of completed ads.
    pub total_ads_completed: i32,
    /// Currently configured milestone, if any.
    pub milestone: Option<Milestone>,
    /// Currently imposed restriction, if any.
    pub restriction: Option<Restriction>,
    /// Voucher lock; blocks clicks until a deposit is recorded.
    pub locked: bool,
}

impl AccountState {
    /// Record one completed ad view worth `price`.
    ///
    /// Under an active restriction the fixed commission is escrowed instead
    /// of the ad price, and milestone progress is paused. Completing the
    /// configured milestone appends its payout transition.
    ///
    /// # Errors
    /// Returns [`LedgerError::AccountLocked`] while a voucher lock is held,
    /// [`LedgerError::AwaitingDeposit`] once a restriction quota is met, and
    /// arithmetic failures for non-positive prices or overflow.
    pub fn apply_click(&mut self, price: Money) -> Result<Vec<LedgerEvent>, LedgerError> {
        if self.locked {
            return Err(LedgerError::AccountLocked);
        }
        if !price.is_positive() {
            return Err(LedgerError::AmountNotPositive);
        }
        if let Some(r) = self.restriction {
            if r.awaiting_deposit() {
                return Err(LedgerError::AwaitingDeposit);
            }
            return self.apply_restricted_click(r);
        }

        self.milestone_amount = add(self.milestone_amount, price)?;
        self.milestone_reward = add(self.milestone_reward, price)?;
        self.bump_counters()?;

        let mut events = vec![LedgerEvent {
            kind: EventKind::AdClick,
            amount: price,
        }];
        if let Some(event) = self.resolve_milestone()? {
            events.push(event);
        }
        Ok(events)
    }

    /// Record a deposit of `amount`.
    ///
    /// Deposits are gate-openers, not earnings: the amount itself is never
    /// credited to a balance. A deposit releases a pending voucher prize
    /// and, when large enough, a completed restriction's escrow.
    ///
    /// # Errors
    /// Returns [`LedgerError::AmountNotPositive`] for non-positive amounts
    /// and [`LedgerError::Overflow`] on arithmetic failure.
    pub fn apply_deposit(&mut self, amount: Money) -> Result<Vec<LedgerEvent>, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::AmountNotPositive);
        }
        let mut events = vec![LedgerEvent {
            kind: EventKind::Deposit,
            amount,
        }];
        if self.locked {
            self.locked = false;
            if let Some(m) = self.milestone.take() {
                self.milestone_amount = add(self.milestone_amount, m.prize)?;
                events.push(LedgerEvent {
                    kind: EventKind::VoucherRelease,
                    amount: m.prize,
                });
            }
        }
        let awaiting = self
            .restriction
            .is_some_and(|r| r.awaiting_deposit() && amount >= r.deposit);
        if awaiting {
            if let Some(event) = self.release_escrow()? {
                events.push(event);
            }
            self.restriction = None;
        }
        Ok(events)
    }

    /// Debit an approved withdrawal from the withdrawable balance.
    ///
    /// # Errors
    /// Returns [`LedgerError::AmountNotPositive`] for non-positive amounts
    /// and [`LedgerError::InsufficientBalance`] when the balance no longer
    /// covers the request.
    pub fn debit_withdrawal(&mut self, amount: Money) -> Result<LedgerEvent, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::AmountNotPositive);
        }
        if amount > self.milestone_amount {
            return Err(LedgerError::InsufficientBalance);
        }
        self.milestone_amount = sub(self.milestone_amount, amount)?;
        let debit = amount.checked_neg().ok_or(LedgerError::Overflow)?;
        Ok(LedgerEvent {
            kind: EventKind::Withdrawal,
            amount: debit,
        })
    }

    /// Apply a direct admin mutation to one of the money fields.
    ///
    /// Returns the audit event for the change, or `None` when the mutation
    /// is a no-op.
    ///
    /// # Errors
    /// Returns [`LedgerError::NegativeBalance`] when the result would be
    /// negative and [`LedgerError::Overflow`] on arithmetic failure.
    pub fn apply_money_adjust(
        &mut self,
        field: MoneyField,
        op: AdjustOp,
        amount: Money,
    ) -> Result<Option<LedgerEvent>, LedgerError> {
        let current = self.money_field(field);
        let next = match op {
            AdjustOp::Set => amount,
            AdjustOp::Add => current.checked_add(amount).ok_or(LedgerError::Overflow)?,
            AdjustOp::Reset => Money::ZERO,
        };
        if next.is_negative() {
            return Err(LedgerError::NegativeBalance);
        }
        let delta = next.checked_sub(current).ok_or(LedgerError::Overflow)?;
        *self.money_field_mut(field) = next;
        if delta == Money::ZERO {
            return Ok(None);
        }
        Ok(Some(LedgerEvent {
            kind: EventKind::AdminAdjust,
            amount: delta,
        }))
    }

    /// Apply a direct admin mutation to the points counter.
    ///
    /// # Errors
    /// Returns [`LedgerError::NegativeBalance`] when the result would be
    /// negative and [`LedgerError::Overflow`] on arithmetic failure.
    pub fn apply_points_adjust(&mut self, op: AdjustOp, value: i32) -> Result<(), LedgerError> {
        let next = match op {
            AdjustOp::Set => value,
            AdjustOp::Add => self.points.checked_add(value).ok_or(LedgerError::Overflow)?,
            AdjustOp::Reset => 0,
        };
        if next < 0 {
            return Err(LedgerError::NegativeBalance);
        }
        self.points = next;
        Ok(())
    }

    /// Impose a restricted-earning mode, replacing any existing one.
    ///
    /// Balances are untouched at imposition time; earnings already escrowed
    /// under a previous restriction stay in escrow.
    ///
    /// # Errors
    /// Returns [`LedgerError::AmountNotPositive`] for a non-positive quota
    /// or commission, and [`LedgerError::NegativeBalance`] for a negative
    /// required deposit.
    pub fn impose_restriction(
        &mut self,
        ads_limit: i32,
        deposit: Money,
        commission: Money,
    ) -> Result<(), LedgerError> {
        if ads_limit <= 0 || !commission.is_positive() {
            return Err(LedgerError::AmountNotPositive);
        }
        if deposit.is_negative() {
            return Err(LedgerError::NegativeBalance);
        }
        self.restriction = Some(Restriction {
            ads_limit,
            deposit,
            commission,
            completed: 0,
        });
        Ok(())
    }

    /// Lift the current restriction, releasing any escrow without a deposit.
    ///
    /// Returns the release event when escrow was held, or `None` when there
    /// was nothing to release. Calling without a restriction is a no-op.
    ///
    /// # Errors
    /// Returns [`LedgerError::Overflow`] on arithmetic failure.
    pub fn lift_restriction(&mut self) -> Result<Option<LedgerEvent>, LedgerError> {
        if self.restriction.take().is_none() {
            return Ok(None);
        }
        self.release_escrow()
    }

    /// Configure (or replace) the ongoing milestone.
    ///
    /// # Errors
    /// Returns [`LedgerError::AccountLocked`] while a voucher prize is
    /// pending and [`LedgerError::AmountNotPositive`] for a non-positive
    /// target or prize.
    pub fn set_milestone(&mut self, milestone: Milestone) -> Result<(), LedgerError> {
        if self.locked {
            return Err(LedgerError::AccountLocked);
        }
        if milestone.target <= 0 || !milestone.prize.is_positive() {
            return Err(LedgerError::AmountNotPositive);
        }
        self.milestone = Some(milestone);
        Ok(())
    }

    fn apply_restricted_click(&mut self, r: Restriction) -> Result<Vec<LedgerEvent>, LedgerError> {
        self.destination_amount = add(self.destination_amount, r.commission)?;
        self.milestone_reward = add(self.milestone_reward, r.commission)?;
        self.bump_counters()?;
        self.restriction = Some(Restriction {
            completed: r.completed.checked_add(1).ok_or(LedgerError::Overflow)?,
            ..r
        });
        Ok(vec![LedgerEvent {
            kind: EventKind::RestrictionCommission,
            amount: r.commission,
        }])
    }

    /// Resolve the ongoing milestone if the click counter has reached it.
    fn resolve_milestone(&mut self) -> Result<Option<LedgerEvent>, LedgerError> {
        let Some(m) = self.milestone else {
            return Ok(None);
        };
        if self.total_ads_completed < m.target {
            return Ok(None);
        }
        match m.kind {
            MilestoneKind::Bonus => {
                self.milestone_amount = add(self.milestone_amount, m.prize)?;
                self.milestone = None;
                Ok(Some(LedgerEvent {
                    kind: EventKind::MilestoneBonus,
                    amount: m.prize,
                }))
            }
            MilestoneKind::Voucher => {
                // Prize stays pending on the milestone until a deposit.
                self.locked = true;
                Ok(None)
            }
        }
    }

    /// Move the full escrow into the withdrawable balance.
    fn release_escrow(&mut self) -> Result<Option<LedgerEvent>, LedgerError> {
        if !self.destination_amount.is_positive() {
            return Ok(None);
        }
        let escrow = self.destination_amount;
        self.milestone_amount = add(self.milestone_amount, escrow)?;
        self.destination_amount = Money::ZERO;
        Ok(Some(LedgerEvent {
            kind: EventKind::RestrictionRelease,
            amount: escrow,
        }))
    }

    fn bump_counters(&mut self) -> Result<(), LedgerError> {
        self.total_ads_completed = self
            .total_ads_completed
            .checked_add(1)
            .ok_or(LedgerError::Overflow)?;
        self.points = self.points.checked_add(1).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    const fn money_field(&self, field: MoneyField) -> Money {
        match field {
            MoneyField::MilestoneAmount => self.milestone_amount,
            MoneyField::MilestoneReward => self.milestone_reward,
            MoneyField::DestinationAmount => self.destination_amount,
        }
    }

    const fn money_field_mut(&mut self, field: MoneyField) -> &mut Money {
        match field {
            MoneyField::MilestoneAmount => &mut self.milestone_amount,
            MoneyField::MilestoneReward => &mut self.milestone_reward,
            MoneyField::DestinationAmount => &mut self.destination_amount,
        }
    }
}

/// Checked balance addition.
fn add(a: Money, b: Money) -> Result<Money, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::Overflow)
}

/// Checked balance subtraction.
fn sub(a: Money, b: Money) -> Result<Money, LedgerError> {
    a.checked_sub(b).ok_or(LedgerError::Overflow)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn money(s: &str) -> Money { s.parse().expect("money literal") }

    #[test]
    fn click_credits_balance_reward_and_counters() {
        let mut state = AccountState::default();
        let events = state.apply_click(money("0.25")).expect("click");
        assert_eq!(
            events,
            vec![LedgerEvent {
                kind: EventKind::AdClick,
                amount: money("0.25"),
            }]
        );
        assert_eq!(state.milestone_amount, money("0.25"));
        assert_eq!(state.milestone_reward, money("0.25"));
        assert_eq!(state.points, 1);
        assert_eq!(state.total_ads_completed, 1);
    }

    #[rstest]
    #[case(Money::ZERO)]
    #[case(money("-0.10"))]
    fn click_rejects_non_positive_price(#[case] price: Money) {
        let mut state = AccountState::default();
        assert_eq!(state.apply_click(price), Err(LedgerError::AmountNotPositive));
    }

    #[test]
    fn locked_account_cannot_click() {
        let mut state = AccountState {
            locked: true,
            ..AccountState::default()
        };
        assert_eq!(
            state.apply_click(money("0.25")),
            Err(LedgerError::AccountLocked)
        );
        assert_eq!(state.total_ads_completed, 0);
    }

    #[test]
    fn bonus_milestone_adds_prize_without_clearing_balance() {
        let mut state = AccountState {
            milestone_amount: money("5.00"),
            total_ads_completed: 1,
            milestone: Some(Milestone {
                target: 2,
                kind: MilestoneKind::Bonus,
                prize: money("10.00"),
            }),
            ..AccountState::default()
        };
        let events = state.apply_click(money("0.50")).expect("click");
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, EventKind::MilestoneBonus);
        assert_eq!(state.milestone_amount, money("15.50"));
        assert!(state.milestone.is_none());
        assert!(!state.locked);
    }

    #[test]
    fn voucher_milestone_locks_until_deposit() {
        let mut state = AccountState {
            milestone: Some(Milestone {
                target: 1,
                kind: MilestoneKind::Voucher,
                prize: money("20.00"),
            }),
            ..AccountState::default()
        };
        let events = state.apply_click(money("0.50")).expect("click");
        assert_eq!(events.len(), 1);
        assert!(state.locked);
        assert!(state.milestone.is_some(), "prize still pending");
        assert_eq!(
            state.apply_click(money("0.50")),
            Err(LedgerError::AccountLocked)
        );

        let events = state.apply_deposit(money("1.00")).expect("deposit");
        assert_eq!(events[0].kind, EventKind::Deposit);
        assert_eq!(events[1].kind, EventKind::VoucherRelease);
        assert_eq!(events[1].amount, money("20.00"));
        assert!(!state.locked);
        assert!(state.milestone.is_none());
        assert_eq!(state.milestone_amount, money("20.50"));
    }

    #[test]
    fn restricted_clicks_escrow_commission_and_pause_milestones() {
        let mut state = AccountState {
            milestone: Some(Milestone {
                target: 1,
                kind: MilestoneKind::Bonus,
                prize: money("99.00"),
            }),
            ..AccountState::default()
        };
        state
            .impose_restriction(2, money("50.00"), money("0.10"))
            .expect("impose");

        let events = state.apply_click(money("1.00")).expect("click");
        assert_eq!(events[0].kind, EventKind::RestrictionCommission);
        assert_eq!(events[0].amount, money("0.10"));
        assert_eq!(state.milestone_amount, Money::ZERO, "no direct credit");
        assert_eq!(state.destination_amount, money("0.10"));
        assert!(state.milestone.is_some(), "milestone paused, not resolved");

        state.apply_click(money("1.00")).expect("second click");
        assert_eq!(
            state.apply_click(money("1.00")),
            Err(LedgerError::AwaitingDeposit)
        );
    }

    #[test]
    fn small_deposit_keeps_escrow_held() {
        let mut state = AccountState::default();
        state
            .impose_restriction(1, money("50.00"), money("0.10"))
            .expect("impose");
        state.apply_click(money("1.00")).expect("click");

        let events = state.apply_deposit(money("10.00")).expect("deposit");
        assert_eq!(events.len(), 1, "escrow stays held");
        assert_eq!(state.destination_amount, money("0.10"));
        assert!(state.restriction.is_some());
    }

    #[test]
    fn qualifying_deposit_releases_escrow() {
        let mut state = AccountState::default();
        state
            .impose_restriction(1, money("50.00"), money("0.10"))
            .expect("impose");
        state.apply_click(money("1.00")).expect("click");

        let events = state.apply_deposit(money("50.00")).expect("deposit");
        assert_eq!(events[1].kind, EventKind::RestrictionRelease);
        assert_eq!(events[1].amount, money("0.10"));
        assert_eq!(state.milestone_amount, money("0.10"));
        assert_eq!(state.destination_amount, Money::ZERO);
        assert!(state.restriction.is_none());
    }

    #[test]
    fn lifting_restriction_releases_escrow_without_deposit() {
        let mut state = AccountState::default();
        state
            .impose_restriction(3, money("50.00"), money("0.25"))
            .expect("impose");
        state.apply_click(money("1.00")).expect("click");

        let event = state.lift_restriction().expect("lift").expect("release");
        assert_eq!(event.kind, EventKind::RestrictionRelease);
        assert_eq!(state.milestone_amount, money("0.25"));
        assert!(state.restriction.is_none());

        assert_eq!(state.lift_restriction(), Ok(None), "second lift is a no-op");
    }

    #[test]
    fn withdrawal_debits_and_guards_balance() {
        let mut state = AccountState {
            milestone_amount: money("10.00"),
            ..AccountState::default()
        };
        let event = state.debit_withdrawal(money("4.00")).expect("debit");
        assert_eq!(event.amount, money("-4.00"));
        assert_eq!(state.milestone_amount, money("6.00"));
        assert_eq!(
            state.debit_withdrawal(money("6.01")),
            Err(LedgerError::InsufficientBalance)
        );
    }

    #[rstest]
    #[case(AdjustOp::Set, "7.00", "7.00")]
    #[case(AdjustOp::Add, "2.50", "12.50")]
    #[case(AdjustOp::Reset, "0.00", "0.00")]
    fn admin_adjust_mutates_balance(
        #[case] op: AdjustOp,
        #[case] amount: &str,
        #[case] expected: &str,
    ) {
        let mut state = AccountState {
            milestone_amount: money("10.00"),
            ..AccountState::default()
        };
        state
            .apply_money_adjust(MoneyField::MilestoneAmount, op, money(amount))
            .expect("adjust");
        assert_eq!(state.milestone_amount, money(expected));
    }

    #[test]
    fn admin_adjust_rejects_negative_result() {
        let mut state = AccountState::default();
        assert_eq!(
            state.apply_money_adjust(MoneyField::MilestoneAmount, AdjustOp::Set, money("-1.00")),
            Err(LedgerError::NegativeBalance)
        );
        assert_eq!(
            state.apply_money_adjust(MoneyField::MilestoneReward, AdjustOp::Add, money("-0.01")),
            Err(LedgerError::NegativeBalance)
        );
    }

    #[test]
    fn set_milestone_rejected_while_locked() {
        let mut state = AccountState {
            locked: true,
            ..AccountState::default()
        };
        let milestone = Milestone {
            target: 5,
            kind: MilestoneKind::Bonus,
            prize: money("1.00"),
        };
        assert_eq!(
            state.set_milestone(milestone),
            Err(LedgerError::AccountLocked)
        );
    }

    /// Sum of primary-balance events must always equal the final balance.
    fn primary_delta(events: &[LedgerEvent]) -> i64 {
        events
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    EventKind::AdClick
                        | EventKind::MilestoneBonus
                        | EventKind::VoucherRelease
                        | EventKind::RestrictionRelease
                        | EventKind::Withdrawal
                        | EventKind::AdminAdjust
                )
            })
            .map(|e| e.amount.minor_units())
            .sum()
    }

    proptest! {
        #[test]
        fn events_reconcile_with_primary_balance(
            prices in proptest::collection::vec(1i64..=10_000, 1..40),
            deposit_every in 1usize..5,
        ) {
            let mut state = AccountState::default();
            state.set_milestone(Milestone {
                target: 5,
                kind: MilestoneKind::Voucher,
                prize: Money::from_minor(5_000),
            }).expect("milestone");

            let mut total: i64 = 0;
            for (i, price) in prices.iter().enumerate() {
                match state.apply_click(Money::from_minor(*price)) {
                    Ok(events) => total += primary_delta(&events),
                    Err(LedgerError::AccountLocked | LedgerError::AwaitingDeposit) => {
                        let events = state
                            .apply_deposit(Money::from_minor(100_000))
                            .expect("deposit");
                        total += primary_delta(&events);
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {e}"),
                }
                if i % deposit_every == 0 && state.restriction.is_none() && i % 7 == 3 {
                    state.impose_restriction(2, Money::from_minor(1_000), Money::from_minor(50))
                        .expect("impose");
                }
            }
            prop_assert_eq!(state.milestone_amount.minor_units(), total);
            prop_assert!(!state.milestone_amount.is_negative());
            prop_assert!(!state.destination_amount.is_negative());
            prop_assert!(!state.milestone_reward.is_negative());
        }
    }
}
