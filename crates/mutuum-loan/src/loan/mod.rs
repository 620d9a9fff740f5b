//! The loan state machine.

mod installment;
mod settlement;

pub use installment::Installment;
pub use settlement::{AnticipationResult, Settlement, SettlementAllocation};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};
use tracing::debug;

use mutuum_core::cashflow::{CashFlow, CashFlowEntry, CashFlowItem, Category};
use mutuum_core::time::{DateTime, TimeContext};
use mutuum_core::types::{InterestRate, Money};
use mutuum_tvm as tvm;

use crate::error::{LoanError, LoanResult};
use crate::schedule::{PaymentSchedule, PaymentScheduleEntry};
use crate::scheduler::Scheduler;
use crate::tax::{Tax, TaxResult};

/// Default fine rate: 2% of the missed installment.
const DEFAULT_FINE_RATE: Decimal = dec!(0.02);

/// How mora interest compounds for days past the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MoraStrategy {
    /// Mora accrues on principal plus the regular interest already accrued.
    #[default]
    Compound,
    /// Mora accrues on principal only.
    Simple,
}

/// Tax results computed once from the original schedule.
#[derive(Debug, Clone)]
struct TaxSummary {
    total: Money,
    by_name: Vec<(String, TaxResult)>,
}

/// A non-anticipated installment's position in the repayment plan.
#[derive(Debug, Clone, Copy)]
struct Milestone {
    number: u32,
    due_date: DateTime,
    cumulative_principal: Decimal,
}

/// A personal loan modeled as a state machine.
///
/// The loan owns its schedule inputs, an append-only stream of recorded
/// payments, applied fines, and a shared [`TimeContext`]. Everything else —
/// balances, installments, settlements, rebuilt schedules — is derived on
/// read, observed at the context's current time. Payments recorded with a
/// future or past `payment_date` become visible only when `now()` reaches
/// them, which is what makes [`Warp`](crate::Warp) observation work.
///
/// # Example
///
/// ```rust
/// use mutuum_core::prelude::*;
/// use mutuum_loan::Loan;
/// use rust_decimal_macros::dec;
///
/// let due_dates = vec![
///     DateTime::from_ymd(2024, 2, 1).unwrap(),
///     DateTime::from_ymd(2024, 3, 1).unwrap(),
/// ];
/// let mut loan = Loan::new(
///     Money::new(dec!(10000)),
///     InterestRate::parse("6% a").unwrap(),
///     due_dates,
///     Some(DateTime::from_ymd(2024, 1, 1).unwrap()),
/// )
/// .unwrap();
///
/// let settlement = loan
///     .record_payment(Money::new(dec!(5000)), DateTime::from_ymd(2024, 2, 1).unwrap())
///     .unwrap();
/// assert!(settlement.principal_paid.is_positive());
/// ```
#[derive(Debug, Clone)]
pub struct Loan {
    principal: Money,
    interest_rate: InterestRate,
    due_dates: Vec<DateTime>,
    disbursement_date: DateTime,
    scheduler: Scheduler,
    fine_rate: Decimal,
    grace_period_days: i64,
    mora_interest_rate: InterestRate,
    mora_strategy: MoraStrategy,
    taxes: Vec<Arc<dyn Tax>>,
    ctx: Arc<TimeContext>,
    original_schedule: PaymentSchedule,
    expected_items: Option<Vec<CashFlowItem>>,
    payments: Vec<CashFlowItem>,
    payment_offsets: Vec<usize>,
    schedule_entries: Vec<PaymentScheduleEntry>,
    fine_items: Vec<CashFlowItem>,
    fines_applied: BTreeMap<DateTime, Money>,
    anticipated: BTreeSet<u32>,
    anticipation_targets: BTreeMap<usize, Vec<u32>>,
    tax_cache: OnceLock<TaxSummary>,
}

impl Loan {
    /// Creates a loan.
    ///
    /// `due_dates` are sorted; the disbursement defaults to thirty days
    /// before the first due date and must otherwise be strictly before it.
    /// Fine rate defaults to 2%, grace period to zero, mora rate to the
    /// contract rate with the compound strategy, and the scheduler to
    /// [`Scheduler::Price`].
    ///
    /// # Errors
    ///
    /// Returns `LoanError::InvalidInput` on an empty date list, a
    /// non-positive principal, or a disbursement on or after the first due
    /// date.
    pub fn new(
        principal: Money,
        interest_rate: InterestRate,
        due_dates: Vec<DateTime>,
        disbursement_date: Option<DateTime>,
    ) -> LoanResult<Self> {
        if due_dates.is_empty() {
            return Err(LoanError::invalid_input("at least one due date is required"));
        }
        if !principal.is_positive() {
            return Err(LoanError::invalid_input("principal must be positive"));
        }

        let mut due_dates = due_dates;
        due_dates.sort();

        let disbursement_date = disbursement_date.unwrap_or_else(|| due_dates[0].add_days(-30));
        if disbursement_date >= due_dates[0] {
            return Err(LoanError::invalid_input(
                "disbursement date must be strictly before the first due date",
            ));
        }

        let scheduler = Scheduler::default();
        let original_schedule =
            scheduler.generate(principal, &interest_rate, &due_dates, disbursement_date)?;

        Ok(Self {
            principal,
            mora_interest_rate: interest_rate.clone(),
            interest_rate,
            due_dates,
            disbursement_date,
            scheduler,
            fine_rate: DEFAULT_FINE_RATE,
            grace_period_days: 0,
            mora_strategy: MoraStrategy::default(),
            taxes: Vec::new(),
            ctx: Arc::new(TimeContext::new()),
            original_schedule,
            expected_items: None,
            payments: Vec::new(),
            payment_offsets: Vec::new(),
            schedule_entries: Vec::new(),
            fine_items: Vec::new(),
            fines_applied: BTreeMap::new(),
            anticipated: BTreeSet::new(),
            anticipation_targets: BTreeMap::new(),
            tax_cache: OnceLock::new(),
        })
    }

    /// Switches the amortization system and rebuilds the original schedule.
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> LoanResult<Self> {
        self.scheduler = scheduler;
        self.original_schedule = scheduler.generate(
            self.principal,
            &self.interest_rate,
            &self.due_dates,
            self.disbursement_date,
        )?;
        self.tax_cache = OnceLock::new();
        self.expected_items = None;
        Ok(self)
    }

    /// Sets the fine rate charged on missed installments.
    pub fn with_fine_rate(mut self, fine_rate: Decimal) -> LoanResult<Self> {
        if fine_rate < Decimal::ZERO {
            return Err(LoanError::invalid_input("fine rate must be non-negative"));
        }
        if fine_rate > Decimal::ONE {
            return Err(LoanError::invalid_input("fine rate must not exceed 1"));
        }
        self.fine_rate = fine_rate;
        Ok(self)
    }

    /// Sets the grace period before a payment counts as late.
    pub fn with_grace_period_days(mut self, days: i64) -> LoanResult<Self> {
        if days < 0 {
            return Err(LoanError::invalid_input(
                "grace period days must be non-negative",
            ));
        }
        self.grace_period_days = days;
        Ok(self)
    }

    /// Sets the rate applied to days beyond the due date.
    #[must_use]
    pub fn with_mora_rate(mut self, rate: InterestRate) -> Self {
        self.mora_interest_rate = rate;
        self
    }

    /// Sets the mora compounding strategy.
    #[must_use]
    pub fn with_mora_strategy(mut self, strategy: MoraStrategy) -> Self {
        self.mora_strategy = strategy;
        self
    }

    /// Attaches per-installment taxes.
    #[must_use]
    pub fn with_taxes(mut self, taxes: Vec<Arc<dyn Tax>>) -> Self {
        self.taxes = taxes;
        self.tax_cache = OnceLock::new();
        self.expected_items = None;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The loan amount.
    pub fn principal(&self) -> Money {
        self.principal
    }

    /// The contract interest rate.
    pub fn interest_rate(&self) -> &InterestRate {
        &self.interest_rate
    }

    /// The sorted due dates.
    pub fn due_dates(&self) -> &[DateTime] {
        &self.due_dates
    }

    /// When the funds were released.
    pub fn disbursement_date(&self) -> DateTime {
        self.disbursement_date
    }

    /// The amortization system in use.
    pub fn scheduler(&self) -> Scheduler {
        self.scheduler
    }

    /// The fine rate on missed installments.
    pub fn fine_rate(&self) -> Decimal {
        self.fine_rate
    }

    /// Days after a due date before a payment counts as late.
    pub fn grace_period_days(&self) -> i64 {
        self.grace_period_days
    }

    /// The rate applied to days beyond the due date.
    pub fn mora_interest_rate(&self) -> &InterestRate {
        &self.mora_interest_rate
    }

    /// The mora compounding strategy.
    pub fn mora_strategy(&self) -> MoraStrategy {
        self.mora_strategy
    }

    /// The shared time context.
    pub fn time_context(&self) -> &Arc<TimeContext> {
        &self.ctx
    }

    /// The current time as this loan observes it.
    pub fn now(&self) -> DateTime {
        self.ctx.now()
    }

    /// The immutable schedule computed from the construction inputs.
    pub fn get_original_schedule(&self) -> &PaymentSchedule {
        &self.original_schedule
    }

    /// The scheduled payment amount for one of the loan's due dates.
    ///
    /// # Errors
    ///
    /// Returns `LoanError::InvalidInput` for a date outside the plan.
    pub fn get_expected_payment_amount(&self, due_date: DateTime) -> LoanResult<Money> {
        self.original_schedule
            .entry_for_due_date(due_date)
            .map(|entry| entry.payment_amount)
            .ok_or_else(|| {
                LoanError::invalid_input(format!(
                    "due date {due_date} is not in loan's due dates"
                ))
            })
    }

    // ------------------------------------------------------------------
    // Payment grouping (positional, never by datetime)
    // ------------------------------------------------------------------

    fn group_count(&self) -> usize {
        self.payment_offsets.len()
    }

    fn group_items(&self, index: usize) -> &[CashFlowItem] {
        let start = self.payment_offsets[index];
        let end = self
            .payment_offsets
            .get(index + 1)
            .copied()
            .unwrap_or(self.payments.len());
        &self.payments[start..end]
    }

    fn group_payment_date(&self, index: usize) -> DateTime {
        self.group_items(index)[0].initial().datetime()
    }

    fn group_sum(&self, index: usize, category: Category) -> Money {
        self.group_items(index)
            .iter()
            .map(CashFlowItem::initial)
            .filter(|entry| entry.category() == category)
            .map(CashFlowEntry::amount)
            .sum()
    }

    fn groups_upto(&self, as_of: DateTime) -> impl Iterator<Item = usize> + '_ {
        (0..self.group_count()).filter(move |&i| self.group_payment_date(i) <= as_of)
    }

    // ------------------------------------------------------------------
    // Balances and time-filtered state
    // ------------------------------------------------------------------

    fn total_principal_paid_as_of(&self, as_of: DateTime) -> Money {
        self.groups_upto(as_of)
            .map(|i| self.group_sum(i, Category::ActualPrincipal))
            .sum()
    }

    fn ordinary_principal_paid_as_of(&self, as_of: DateTime) -> Money {
        self.groups_upto(as_of)
            .filter(|i| !self.anticipation_targets.contains_key(i))
            .map(|i| self.group_sum(i, Category::ActualPrincipal))
            .sum()
    }

    fn fine_paid_as_of(&self, as_of: DateTime) -> Money {
        self.groups_upto(as_of)
            .map(|i| self.group_sum(i, Category::ActualFine))
            .sum()
    }

    fn principal_balance_as_of(&self, as_of: DateTime) -> Money {
        let remaining = self.principal - self.total_principal_paid_as_of(as_of);
        remaining.max(Money::zero())
    }

    /// Outstanding principal, ignoring accrued interest and fines.
    pub fn principal_balance(&self) -> Money {
        self.principal_balance_as_of(self.now())
    }

    fn last_payment_date_as_of(&self, as_of: DateTime) -> DateTime {
        self.groups_upto(as_of)
            .map(|i| self.group_payment_date(i))
            .max()
            .unwrap_or(self.disbursement_date)
    }

    /// The most recent payment date visible now, or the disbursement date
    /// before any payment.
    pub fn last_payment_date(&self) -> DateTime {
        self.last_payment_date_as_of(self.now())
    }

    /// Whole days since the last visible payment (or disbursement).
    pub fn days_since_last_payment(&self, as_of: Option<DateTime>) -> i64 {
        let at = as_of.unwrap_or_else(|| self.now());
        self.last_payment_date_as_of(at).days_between(&at)
    }

    fn interest_cutoff_as_of(&self, as_of: DateTime) -> DateTime {
        self.groups_upto(as_of)
            .map(|i| self.schedule_entries[i].due_date)
            .fold(self.disbursement_date, DateTime::max)
    }

    /// Splits an accrual window into regular days (up to the next unpaid
    /// due date) and mora days (beyond it).
    fn interest_window(
        &self,
        cutoff: DateTime,
        next_due: Option<DateTime>,
        until: DateTime,
    ) -> (i64, i64) {
        match next_due {
            Some(due) if until > due => {
                let regular = cutoff.days_between(&due).max(0);
                let mora_start = cutoff.max(due);
                let mora = mora_start.days_between(&until).max(0);
                (regular, mora)
            }
            _ => (cutoff.days_between(&until).max(0), 0),
        }
    }

    /// Regular and mora interest on a principal over the given windows.
    fn interest_components(
        &self,
        principal: Money,
        regular_days: i64,
        mora_days: i64,
    ) -> (Money, Money) {
        let regular = self.interest_rate.accrue(&principal, regular_days) - principal;
        let mora_base = match self.mora_strategy {
            MoraStrategy::Compound => principal + regular,
            MoraStrategy::Simple => principal,
        };
        let mora = self.mora_interest_rate.accrue(&mora_base, mora_days) - mora_base;
        (regular, mora)
    }

    fn accrued_interest_as_of(&self, as_of: DateTime) -> Money {
        let principal = self.principal_balance_as_of(as_of);
        if principal.is_zero() {
            return Money::zero();
        }
        let cutoff = self.interest_cutoff_as_of(as_of);
        let next_due = self.next_unpaid_due_date_as_of(as_of);
        let (regular_days, mora_days) = self.interest_window(cutoff, next_due, as_of);
        let (regular, mora) = self.interest_components(principal, regular_days, mora_days);
        regular + mora
    }

    /// Interest accrued since the last interest cutoff, mora included.
    pub fn accrued_interest(&self) -> Money {
        self.accrued_interest_as_of(self.now())
    }

    /// Sum of every fine levied so far.
    pub fn total_fines(&self) -> Money {
        self.fines_applied.values().copied().sum()
    }

    /// Fines applied per due date.
    pub fn fines_applied(&self) -> &BTreeMap<DateTime, Money> {
        &self.fines_applied
    }

    fn outstanding_fines_as_of(&self, as_of: DateTime) -> Money {
        let outstanding = self.total_fines() - self.fine_paid_as_of(as_of);
        outstanding.max(Money::zero())
    }

    /// Fines levied but not yet paid.
    pub fn outstanding_fines(&self) -> Money {
        self.outstanding_fines_as_of(self.now())
    }

    /// Everything owed right now: principal, accrued interest, and
    /// outstanding fines.
    pub fn current_balance(&self) -> Money {
        let now = self.now();
        self.principal_balance_as_of(now)
            + self.accrued_interest_as_of(now)
            + self.outstanding_fines_as_of(now)
    }

    /// Whether the principal and every fine have been settled.
    pub fn is_paid_off(&self) -> bool {
        let now = self.now();
        self.principal_balance_as_of(now).is_zero()
            && self.outstanding_fines_as_of(now).is_zero()
    }

    // ------------------------------------------------------------------
    // Due-date coverage
    // ------------------------------------------------------------------

    /// The repayment plan positions still in play, in due-date order, with
    /// cumulative principal milestones. Anticipated installments are out.
    fn milestones(&self) -> Vec<Milestone> {
        let mut cumulative = Decimal::ZERO;
        self.original_schedule
            .iter()
            .filter(|entry| !self.anticipated.contains(&entry.payment_number))
            .map(|entry| {
                cumulative += entry.principal_payment.raw();
                Milestone {
                    number: entry.payment_number,
                    due_date: entry.due_date,
                    cumulative_principal: cumulative,
                }
            })
            .collect()
    }

    /// How many due dates the principal paid so far covers.
    ///
    /// Coverage compares the remaining principal against the original
    /// schedule's balance milestones — never the number of payment calls —
    /// so partial and oversized payments project correctly.
    fn covered_count_as_of(&self, as_of: DateTime) -> usize {
        let paid = self.ordinary_principal_paid_as_of(as_of);
        self.milestones()
            .iter()
            .take_while(|m| paid >= Money::new(m.cumulative_principal))
            .count()
    }

    fn next_unpaid_due_date_as_of(&self, as_of: DateTime) -> Option<DateTime> {
        let covered = self.covered_count_as_of(as_of);
        self.milestones().get(covered).map(|m| m.due_date)
    }

    /// The earliest due date not yet covered by principal payments.
    pub fn next_unpaid_due_date(&self) -> Option<DateTime> {
        self.next_unpaid_due_date_as_of(self.now())
    }

    // ------------------------------------------------------------------
    // Fines
    // ------------------------------------------------------------------

    /// Whether a payment for `due_date` counts as late at `check_date`.
    ///
    /// Late means strictly beyond the due date plus the grace period: the
    /// last grace day itself is still on time.
    pub fn is_payment_late(&self, due_date: DateTime, check_date: DateTime) -> bool {
        check_date > due_date.add_days(self.grace_period_days)
    }

    /// Fines that `calculate_late_fines(as_of)` would apply, without
    /// mutating anything.
    fn pending_fines(&self, as_of: DateTime) -> Vec<(u32, DateTime, Money)> {
        let milestones = self.milestones();
        self.original_schedule
            .iter()
            .filter(|entry| !self.anticipated.contains(&entry.payment_number))
            .filter(|entry| !self.fines_applied.contains_key(&entry.due_date))
            .filter(|entry| self.is_payment_late(entry.due_date, as_of))
            .filter(|entry| {
                // No fine when the installment was settled by its deadline
                let deadline = entry.due_date.add_days(self.grace_period_days);
                let position = milestones
                    .iter()
                    .position(|m| m.number == entry.payment_number)
                    .unwrap_or(usize::MAX);
                self.covered_count_as_of(deadline) <= position
            })
            .map(|entry| {
                let fine = Money::new(entry.payment_amount.raw() * self.fine_rate);
                (entry.payment_number, entry.due_date, fine)
            })
            .collect()
    }

    /// Levies fines for every due date that is late as of the given date.
    ///
    /// Idempotent per due date: the `fines_applied` map is the
    /// deduplication guard, so repeated calls apply nothing new. Each fine
    /// is 2% (or the configured rate) of the *original* scheduled payment
    /// and emits a `fine_applied` entry dated at the end of the grace
    /// period. Returns the newly applied total.
    pub fn calculate_late_fines(&mut self, as_of: DateTime) -> Money {
        let pending = self.pending_fines(as_of);
        self.commit_fines(pending)
    }

    fn commit_fines(&mut self, pending: Vec<(u32, DateTime, Money)>) -> Money {
        let mut newly_applied = Money::zero();
        for (number, due_date, fine) in pending {
            debug!(installment = number, %fine, "applying late fine");
            self.fines_applied.insert(due_date, fine);
            self.fine_items.push(CashFlowItem::new(
                CashFlowEntry::new(
                    fine,
                    due_date.add_days(self.grace_period_days),
                    Some(format!("Late fine for installment {number}")),
                    Category::FineApplied,
                ),
                Arc::clone(&self.ctx),
            ));
            newly_applied += fine;
        }
        newly_applied
    }

    // ------------------------------------------------------------------
    // Payment recording
    // ------------------------------------------------------------------

    /// Records a payment dated `payment_date`, accruing interest to the
    /// same date.
    pub fn record_payment(
        &mut self,
        amount: Money,
        payment_date: DateTime,
    ) -> LoanResult<Settlement> {
        self.record_payment_detailed(amount, payment_date, None, None, None)
    }

    /// Records a payment under the full three-date model.
    ///
    /// `payment_date` is when funds moved, `interest_date` is the accrual
    /// cutoff (defaults to the payment date), and `processing_date` is the
    /// audit timestamp (defaults to now). Allocation follows the strict
    /// priority fines → regular interest → mora interest → principal, and
    /// either the full set of items is appended or none.
    ///
    /// # Errors
    ///
    /// - `LoanError::PaidOff` when nothing is owed any more
    /// - `LoanError::InvalidInput` for a non-positive amount
    /// - `LoanError::OverPayment` when the amount exceeds everything owed
    pub fn record_payment_detailed(
        &mut self,
        amount: Money,
        payment_date: DateTime,
        interest_date: Option<DateTime>,
        processing_date: Option<DateTime>,
        description: Option<String>,
    ) -> LoanResult<Settlement> {
        let interest_date = interest_date.unwrap_or(payment_date);
        let processing_date = processing_date.unwrap_or_else(|| self.now());
        self.apply_payment(
            amount,
            payment_date,
            interest_date,
            processing_date,
            description,
            None,
        )
    }

    /// Pays toward the next unpaid installment at the current time.
    ///
    /// Interest is charged through the installment's due date even when the
    /// payment happens earlier — the scheduled full-period interest, with
    /// no early-payment discount (that is what
    /// [`anticipate_payment`](Self::anticipate_payment) is for).
    pub fn pay_installment(&mut self, amount: Money) -> LoanResult<Settlement> {
        let now = self.now();
        let next_due = self.next_unpaid_due_date_as_of(now).ok_or_else(|| {
            if self.is_paid_off() {
                LoanError::PaidOff
            } else {
                LoanError::invalid_input("all due dates have been paid")
            }
        })?;
        let interest_date = now.max(next_due);
        self.apply_payment(amount, now, interest_date, now, None, None)
    }

    /// Pays early, charging interest only for the days actually elapsed.
    ///
    /// Without `installments` the remainder after interest reduces the
    /// principal against the current unpaid due date. With `installments`,
    /// the targeted installments are removed from the plan: their expected
    /// entries are tombstoned as of now and they no longer participate in
    /// coverage or projection.
    pub fn anticipate_payment(
        &mut self,
        amount: Money,
        installments: Option<&[u32]>,
    ) -> LoanResult<Settlement> {
        let now = self.now();
        let targets = match installments {
            Some(numbers) => {
                self.validate_anticipation_targets(numbers)?;
                let mut sorted = numbers.to_vec();
                sorted.sort_unstable();
                Some(sorted)
            }
            None => None,
        };
        self.apply_payment(amount, now, now, now, None, targets)
    }

    /// Prices the early settlement of a set of installments.
    ///
    /// The amount is the sum of the selected installments' scheduled
    /// payments discounted to now at the contract daily rate, so
    /// anticipating every remaining installment costs exactly the current
    /// balance.
    ///
    /// # Errors
    ///
    /// Returns `LoanError::InvalidInput` for out-of-range, duplicate, or
    /// already-settled installment numbers.
    pub fn calculate_anticipation(&self, installments: &[u32]) -> LoanResult<AnticipationResult> {
        self.validate_anticipation_targets(installments)?;

        let now = self.now();
        let daily = self.interest_rate.to_daily().as_decimal();
        let views = self.installments();

        let mut numbers = installments.to_vec();
        numbers.sort_unstable();

        let mut amount = Money::zero();
        let mut selected = Vec::with_capacity(numbers.len());
        for &number in &numbers {
            let entry = &self.original_schedule[(number - 1) as usize];
            let days = now.days_between(&entry.due_date).max(0);
            let discounted = entry.payment_amount.raw()
                / crate::scheduler::compound_growth(daily, days);
            amount += Money::new(discounted);
            selected.push(views[(number - 1) as usize].clone());
        }

        Ok(AnticipationResult {
            amount,
            installments: selected,
        })
    }

    fn validate_anticipation_targets(&self, installments: &[u32]) -> LoanResult<()> {
        if installments.is_empty() {
            return Err(LoanError::invalid_input("no installments selected"));
        }
        let unique: BTreeSet<u32> = installments.iter().copied().collect();
        if unique.len() != installments.len() {
            return Err(LoanError::invalid_input("duplicate installment numbers"));
        }

        let now = self.now();
        let milestones = self.milestones();
        let covered: BTreeSet<u32> = milestones
            .iter()
            .take(self.covered_count_as_of(now))
            .map(|m| m.number)
            .collect();

        for &number in installments {
            if number == 0 || number as usize > self.original_schedule.len() {
                return Err(LoanError::invalid_input(format!(
                    "installment number {number} is out of range"
                )));
            }
            if self.anticipated.contains(&number) || covered.contains(&number) {
                return Err(LoanError::invalid_input(format!(
                    "installment {number} is already paid"
                )));
            }
        }
        Ok(())
    }

    /// The shared allocation path behind every payment method.
    fn apply_payment(
        &mut self,
        amount: Money,
        payment_date: DateTime,
        interest_date: DateTime,
        processing_date: DateTime,
        description: Option<String>,
        targets: Option<Vec<u32>>,
    ) -> LoanResult<Settlement> {
        if !amount.is_positive() {
            return Err(LoanError::invalid_input("payment amount must be positive"));
        }
        if self.principal_balance_as_of(payment_date).is_zero()
            && self.outstanding_fines_as_of(payment_date).is_zero()
        {
            return Err(LoanError::PaidOff);
        }

        // Snapshot everything against payment_date before touching state,
        // so recording future-dated payments in sequence cannot inflate the
        // accrual window.
        let pending = self.pending_fines(payment_date);
        let pending_total: Money = pending.iter().map(|(_, _, fine)| *fine).sum();
        let principal_balance = self.principal_balance_as_of(payment_date);
        let cutoff = self.interest_cutoff_as_of(payment_date);
        let next_due = self.next_unpaid_due_date_as_of(payment_date);
        let fines_due = self.outstanding_fines_as_of(payment_date) + pending_total;

        let (regular_days, mora_days) = self.interest_window(cutoff, next_due, interest_date);
        let (regular_due, mora_due) =
            self.interest_components(principal_balance, regular_days, mora_days);

        let mut remaining = amount;
        let fine_paid = remaining.min(fines_due);
        remaining -= fine_paid;
        let regular_paid = remaining.min(regular_due);
        remaining -= regular_paid;
        let mora_paid = remaining.min(mora_due);
        remaining -= mora_paid;

        if targets.is_none() && remaining > principal_balance {
            return Err(LoanError::OverPayment {
                attempted: amount,
                maximum: fines_due + regular_due + mora_due + principal_balance,
            });
        }
        let principal_paid = remaining.min(principal_balance);

        // Commit: fines first, then the payment's full item set.
        self.commit_fines(pending);

        let start = self.payments.len();
        let components = [
            (fine_paid, Category::ActualFine),
            (regular_paid, Category::ActualInterest),
            (mora_paid, Category::ActualMoraInterest),
            (principal_paid, Category::ActualPrincipal),
        ];
        for (component, category) in components {
            if component.is_zero() {
                continue;
            }
            self.payments.push(CashFlowItem::new(
                CashFlowEntry::new(component, payment_date, description.clone(), category),
                Arc::clone(&self.ctx),
            ));
        }

        let group_index = self.payment_offsets.len();
        self.payment_offsets.push(start);
        self.schedule_entries.push(PaymentScheduleEntry {
            payment_number: group_index as u32 + 1,
            due_date: interest_date,
            days_in_period: regular_days + mora_days,
            beginning_balance: principal_balance,
            payment_amount: amount,
            principal_payment: principal_paid,
            interest_payment: regular_paid + mora_paid,
            ending_balance: principal_balance - principal_paid,
        });

        if let Some(numbers) = targets {
            let now = self.now();
            let dues: Vec<DateTime> = numbers
                .iter()
                .map(|&n| self.original_schedule[(n - 1) as usize].due_date)
                .collect();
            for item in self.expected_items_mut().iter_mut() {
                let (category, datetime) = {
                    let entry = item.initial();
                    (entry.category(), entry.datetime())
                };
                let removable = matches!(
                    category,
                    Category::ExpectedInterest | Category::ExpectedPrincipal
                );
                if removable && dues.contains(&datetime) {
                    item.delete(now);
                }
            }
            for &number in &numbers {
                self.anticipated.insert(number);
            }
            self.anticipation_targets.insert(group_index, numbers);
        }

        debug!(
            %amount,
            %payment_date,
            %interest_date,
            %processing_date,
            %fine_paid,
            interest = %regular_paid,
            mora = %mora_paid,
            principal = %principal_paid,
            "payment recorded"
        );

        let settlement = self
            .settlements_replay(None)
            .swap_remove(group_index);
        Ok(settlement)
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    /// Rebuilds every settlement from the cash-flow stream, optionally
    /// limited to payments visible at `as_of`.
    fn settlements_replay(&self, as_of: Option<DateTime>) -> Vec<Settlement> {
        let milestones = self.milestones();
        let mut ordinary_cursor = Decimal::ZERO;
        let mut principal_through = Money::zero();
        let mut settlements = Vec::new();

        for group in 0..self.group_count() {
            let payment_date = self.group_payment_date(group);
            if as_of.is_some_and(|limit| payment_date > limit) {
                continue;
            }

            let fine = self.group_sum(group, Category::ActualFine);
            let interest = self.group_sum(group, Category::ActualInterest);
            let mora = self.group_sum(group, Category::ActualMoraInterest);
            let principal = self.group_sum(group, Category::ActualPrincipal);

            let mut allocations = if let Some(numbers) = self.anticipation_targets.get(&group)
            {
                self.anticipation_allocations(numbers, principal)
            } else {
                Self::milestone_allocations(&milestones, &mut ordinary_cursor, principal)
            };

            if allocations.is_empty() {
                // Fine- or interest-only payment: attach to the current
                // target installment
                let index = milestones
                    .iter()
                    .position(|m| Money::new(ordinary_cursor) < Money::new(m.cumulative_principal))
                    .unwrap_or(milestones.len().saturating_sub(1));
                if let Some(target) = milestones.get(index) {
                    allocations.push(SettlementAllocation::principal_slice(
                        target.number,
                        Money::zero(),
                        false,
                    ));
                }
            }
            if let Some(first) = allocations.first_mut() {
                first.fine = fine;
                first.interest = interest;
                first.mora = mora;
            }

            principal_through += principal;
            let remaining_balance = (self.principal - principal_through).max(Money::zero());

            settlements.push(Settlement {
                payment_amount: fine + interest + mora + principal,
                payment_date,
                fine_paid: fine,
                interest_paid: interest,
                mora_paid: mora,
                principal_paid: principal,
                remaining_balance,
                allocations,
            });
        }

        settlements
    }

    /// Slices a payment's principal across the original-schedule
    /// milestones, advancing the shared cursor.
    fn milestone_allocations(
        milestones: &[Milestone],
        cursor: &mut Decimal,
        principal: Money,
    ) -> Vec<SettlementAllocation> {
        let mut allocations = Vec::new();
        let mut left = principal.raw();
        let mut index = milestones
            .iter()
            .position(|m| Money::new(*cursor) < Money::new(m.cumulative_principal))
            .unwrap_or(milestones.len());

        while left > Decimal::ZERO && index < milestones.len() {
            let need = milestones[index].cumulative_principal - *cursor;
            let slice = left.min(need);
            *cursor += slice;
            left -= slice;

            let covered =
                Money::new(*cursor) >= Money::new(milestones[index].cumulative_principal);
            allocations.push(SettlementAllocation::principal_slice(
                milestones[index].number,
                Money::new(slice),
                covered,
            ));
            if covered {
                index += 1;
            } else {
                break;
            }
        }

        if left > Decimal::ZERO {
            // Rounding spill beyond the final milestone
            *cursor += left;
            if let Some(last) = allocations.last_mut() {
                last.principal += Money::new(left);
            }
        }

        allocations
    }

    /// Attributes a targeted anticipation's principal across the selected
    /// installments, proportional to their scheduled principal.
    fn anticipation_allocations(
        &self,
        numbers: &[u32],
        principal: Money,
    ) -> Vec<SettlementAllocation> {
        let total_expected: Decimal = numbers
            .iter()
            .map(|&n| self.original_schedule[(n - 1) as usize].principal_payment.raw())
            .sum();
        let mut allocations = Vec::with_capacity(numbers.len());
        let mut allocated = Decimal::ZERO;

        for (position, &number) in numbers.iter().enumerate() {
            let share = if position == numbers.len() - 1 || total_expected.is_zero() {
                principal.raw() - allocated
            } else {
                let expected =
                    self.original_schedule[(number - 1) as usize].principal_payment.raw();
                principal.raw() * expected / total_expected
            };
            allocated += share;
            allocations.push(SettlementAllocation::principal_slice(
                number,
                Money::new(share),
                true,
            ));
        }

        allocations
    }

    /// Every settlement visible at the current time, reconstructed from the
    /// cash-flow stream.
    pub fn settlements(&self) -> Vec<Settlement> {
        self.settlements_replay(Some(self.now()))
    }

    /// The live installment view: original schedule expectations combined
    /// with everything attributed from actual payments.
    pub fn installments(&self) -> Vec<Installment> {
        let now = self.now();
        let settlements = self.settlements_replay(Some(now));

        let mut attributed: BTreeMap<u32, Vec<SettlementAllocation>> = BTreeMap::new();
        for settlement in &settlements {
            for allocation in &settlement.allocations {
                attributed
                    .entry(allocation.installment_number)
                    .or_default()
                    .push(allocation.clone());
            }
        }

        let milestones = self.milestones();
        let current_target = milestones
            .get(self.covered_count_as_of(now))
            .map(|m| m.number);

        let overdue_mora = current_target
            .filter(|_| {
                self.next_unpaid_due_date_as_of(now)
                    .is_some_and(|due| now > due)
            })
            .map(|_| {
                let principal = self.principal_balance_as_of(now);
                let cutoff = self.interest_cutoff_as_of(now);
                let next_due = self.next_unpaid_due_date_as_of(now);
                let (regular_days, mora_days) = self.interest_window(cutoff, next_due, now);
                let (_, mora) = self.interest_components(principal, regular_days, mora_days);
                mora
            })
            .unwrap_or_else(Money::zero);

        self.original_schedule
            .iter()
            .map(|entry| {
                let allocations = attributed
                    .remove(&entry.payment_number)
                    .unwrap_or_default();
                let expected_fine = self
                    .fines_applied
                    .get(&entry.due_date)
                    .copied()
                    .unwrap_or_else(Money::zero);
                let expected_mora = if current_target == Some(entry.payment_number) {
                    overdue_mora
                } else {
                    allocations.iter().map(|a| a.mora).sum()
                };
                Installment::from_schedule_entry(entry, allocations, expected_mora, expected_fine)
            })
            .collect()
    }

    /// The realized past plus a fresh projection over the remaining due
    /// dates.
    ///
    /// Past entries come from actual payments in order; the projection runs
    /// the loan's scheduler over the uncovered, non-anticipated due dates
    /// with the remaining principal, using the last payment date as its
    /// disbursement reference.
    pub fn get_amortization_schedule(&self) -> LoanResult<PaymentSchedule> {
        let now = self.now();

        let mut entries: Vec<PaymentScheduleEntry> = self
            .groups_upto(now)
            .map(|i| self.schedule_entries[i].clone())
            .collect();

        let milestones = self.milestones();
        let covered = self.covered_count_as_of(now);
        let remaining_dates: Vec<DateTime> = milestones[covered.min(milestones.len())..]
            .iter()
            .map(|m| m.due_date)
            .collect();

        let remaining_principal = self.principal_balance_as_of(now);
        if !remaining_dates.is_empty() && remaining_principal.is_positive() {
            let reference = self.last_payment_date_as_of(now);
            let projection = self.scheduler.generate(
                remaining_principal,
                &self.interest_rate,
                &remaining_dates,
                reference,
            )?;
            entries.extend(projection.iter().cloned());
        }

        for (index, entry) in entries.iter_mut().enumerate() {
            entry.payment_number = index as u32 + 1;
        }
        Ok(PaymentSchedule::new(entries))
    }

    // ------------------------------------------------------------------
    // Cash flows
    // ------------------------------------------------------------------

    fn build_expected_items(&self) -> Vec<CashFlowItem> {
        let mut entries = vec![CashFlowEntry::new(
            self.principal,
            self.disbursement_date,
            Some("Loan disbursement".to_string()),
            Category::ExpectedDisbursement,
        )];

        let total_tax = self.total_tax();
        if total_tax.is_positive() {
            entries.push(CashFlowEntry::new(
                -total_tax,
                self.disbursement_date,
                Some("Tax withheld at disbursement".to_string()),
                Category::ExpectedTax,
            ));
        }

        for entry in &self.original_schedule {
            entries.push(CashFlowEntry::new(
                -entry.interest_payment,
                entry.due_date,
                Some(format!("Interest payment {}", entry.payment_number)),
                Category::ExpectedInterest,
            ));
            entries.push(CashFlowEntry::new(
                -entry.principal_payment,
                entry.due_date,
                Some(format!("Principal payment {}", entry.payment_number)),
                Category::ExpectedPrincipal,
            ));
        }

        entries
            .into_iter()
            .map(|entry| CashFlowItem::new(entry, Arc::clone(&self.ctx)))
            .collect()
    }

    fn expected_items_mut(&mut self) -> &mut Vec<CashFlowItem> {
        if self.expected_items.is_none() {
            self.expected_items = Some(self.build_expected_items());
        }
        self.expected_items.as_mut().expect("just initialized")
    }

    /// The expected flow: disbursement in, tax out (when present), then the
    /// scheduled interest and principal components out.
    ///
    /// Installments removed by a targeted anticipation stay tombstoned in
    /// the returned flow.
    pub fn generate_expected_cash_flow(&self) -> CashFlow {
        match &self.expected_items {
            Some(items) => CashFlow::new(items.clone()),
            None => CashFlow::new(self.build_expected_items()),
        }
    }

    /// The actual flow: the disbursement in, every recorded payment item
    /// out, and the fines levied along the way.
    pub fn get_actual_cash_flow(&self) -> CashFlow {
        let mut items = vec![CashFlowItem::new(
            CashFlowEntry::new(
                self.principal,
                self.disbursement_date,
                Some("Loan disbursement".to_string()),
                Category::ExpectedDisbursement,
            ),
            Arc::clone(&self.ctx),
        )];

        for item in &self.payments {
            let entry = item.initial();
            items.push(CashFlowItem::new(
                CashFlowEntry::new(
                    -entry.amount(),
                    entry.datetime(),
                    entry.description().map(str::to_string),
                    entry.category(),
                ),
                Arc::clone(&self.ctx),
            ));
        }
        items.extend(self.fine_items.iter().cloned());

        CashFlow::new(items)
    }

    // ------------------------------------------------------------------
    // Taxes
    // ------------------------------------------------------------------

    fn tax_summary(&self) -> &TaxSummary {
        self.tax_cache.get_or_init(|| {
            let mut total = Money::zero();
            let mut by_name = Vec::with_capacity(self.taxes.len());
            for tax in &self.taxes {
                let result = tax.calculate(&self.original_schedule, self.disbursement_date);
                total += result.total;
                by_name.push((tax.name().to_string(), result));
            }
            TaxSummary { total, by_name }
        })
    }

    /// Total tax over the original schedule; zero without taxes.
    pub fn total_tax(&self) -> Money {
        self.tax_summary().total
    }

    /// What the borrower actually receives: principal minus total tax.
    pub fn net_disbursement(&self) -> Money {
        self.principal - self.total_tax()
    }

    /// Per-tax results keyed by tax name.
    pub fn tax_amounts(&self) -> &[(String, TaxResult)] {
        &self.tax_summary().by_name
    }

    // ------------------------------------------------------------------
    // TVM
    // ------------------------------------------------------------------

    /// Present value of the expected flow at a given discount rate.
    pub fn present_value(&self, discount_rate: &InterestRate) -> Money {
        tvm::present_value(&self.generate_expected_cash_flow(), discount_rate, None)
    }

    /// Internal rate of return of the expected flow.
    ///
    /// For an untouched loan this recovers the contract rate.
    pub fn irr(&self) -> LoanResult<InterestRate> {
        Ok(tvm::internal_rate_of_return(
            &self.generate_expected_cash_flow(),
            None,
            self.interest_rate.year_size(),
        )?)
    }

    // ------------------------------------------------------------------
    // Cloning for warps
    // ------------------------------------------------------------------

    /// Deep-clones the loan with a fresh, independent time context.
    ///
    /// Every cash-flow item in the clone is rebound to the new context, so
    /// overriding the clone's clock can never leak into the original (or
    /// vice versa).
    #[must_use]
    pub fn deep_clone(&self) -> Loan {
        let mut clone = self.clone();
        let fresh = Arc::new(self.ctx.as_ref().clone());
        clone.ctx = Arc::clone(&fresh);
        for item in &mut clone.payments {
            item.rebind_context(Arc::clone(&fresh));
        }
        for item in &mut clone.fine_items {
            item.rebind_context(Arc::clone(&fresh));
        }
        if let Some(items) = &mut clone.expected_items {
            for item in items {
                item.rebind_context(Arc::clone(&fresh));
            }
        }
        clone
    }
}
