//! Greedy debt settlement over shared expenses

use bigdecimal::{BigDecimal, RoundingMode};

use crate::settlement::{
    BalanceTable, InvalidExpensePolicy, RejectedExpense, SettlementOptions, SettlementReport,
};
use crate::traits::*;
use crate::types::*;

/// Balances produced by the first stage of a run
#[derive(Debug, Clone)]
pub struct BalanceComputation {
    pub table: BalanceTable,
    /// Records left out under [`InvalidExpensePolicy::Skip`]
    pub rejected: Vec<RejectedExpense>,
}

/// Debt settlement engine
///
/// Stateless between calls: every run builds its own balance table from the
/// roster and expenses it is given, so one engine can be shared freely.
pub struct SettlementEngine {
    options: SettlementOptions,
    validator: Box<dyn ExpenseValidator>,
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SettlementEngine {
    /// Create an engine with default options and validation
    pub fn new() -> Self {
        Self::with_options(SettlementOptions::default())
    }

    pub fn with_options(options: SettlementOptions) -> Self {
        Self {
            options,
            validator: Box::new(DefaultExpenseValidator),
        }
    }

    /// Create an engine with a custom validator
    pub fn with_validator(
        options: SettlementOptions,
        validator: Box<dyn ExpenseValidator>,
    ) -> Self {
        Self { options, validator }
    }

    pub fn options(&self) -> &SettlementOptions {
        &self.options
    }

    /// Validate every record and accumulate the balances of the valid ones
    pub fn compute_balances(
        &self,
        roster: &[ParticipantId],
        expenses: &[ExpenseRecord],
    ) -> SettlementResult<BalanceComputation> {
        self.options.validate()?;

        let mut table = BalanceTable::with_roster(roster);
        let mut rejected = Vec::new();
        let mut pooled = BigDecimal::from(0);

        for expense in expenses {
            // The table is left untouched when a record fails to apply
            let checked = self
                .validator
                .validate_expense(expense)
                .and_then(|_| self.validator.validate_participants(expense, roster))
                .and_then(|_| table.apply_expense(expense));

            if let Err(err) = checked {
                match self.options.invalid_expense_policy {
                    InvalidExpensePolicy::Reject => return Err(err),
                    InvalidExpensePolicy::Skip => {
                        tracing::warn!(expense_id = %expense.id, error = %err, "skipping expense");
                        rejected.push(RejectedExpense {
                            expense_id: expense.id.clone(),
                            reason: err.to_string(),
                        });
                        continue;
                    }
                }
            }

            if expense.payer == Payer::Pooled {
                pooled += &expense.amount;
            }
        }

        // Pooled expenses debit their targets without crediting anyone; inexact
        // shares such as 100 / 3 leave a residue far below any currency unit
        let residue_bound = BigDecimal::from(1) / BigDecimal::from(1_000_000_000u64);
        debug_assert!(
            (table.total() + &pooled).abs() < residue_bound,
            "balances do not sum to zero: {}",
            table.total()
        );

        Ok(BalanceComputation { table, rejected })
    }

    /// Compute the transfers settling all balances
    pub fn settle(
        &self,
        roster: &[ParticipantId],
        expenses: &[ExpenseRecord],
    ) -> SettlementResult<Vec<Transfer>> {
        let computation = self.compute_balances(roster, expenses)?;
        Ok(self.match_balances(&computation.table))
    }

    /// Settle and return the balances and skipped records alongside the transfers
    pub fn settle_report(
        &self,
        roster: &[ParticipantId],
        expenses: &[ExpenseRecord],
    ) -> SettlementResult<SettlementReport> {
        let BalanceComputation { table, rejected } = self.compute_balances(roster, expenses)?;
        let transfers = self.match_balances(&table);

        Ok(SettlementReport {
            balances: table.to_balances(),
            transfers,
            rejected,
        })
    }

    /// Pair debtors with creditors, largest first, until one side runs out
    pub fn match_balances(&self, table: &BalanceTable) -> Vec<Transfer> {
        let zero = BigDecimal::from(0);
        let tolerance = if self.options.tolerance < zero {
            &zero
        } else {
            &self.options.tolerance
        };
        let negative_tolerance = -tolerance.clone();

        let mut debtors: Vec<(ParticipantId, BigDecimal)> = table
            .iter()
            .filter(|(_, balance)| **balance < negative_tolerance)
            .map(|(id, balance)| (id.clone(), balance.clone()))
            .collect();
        let mut creditors: Vec<(ParticipantId, BigDecimal)> = table
            .iter()
            .filter(|(_, balance)| *balance > tolerance)
            .map(|(id, balance)| (id.clone(), balance.clone()))
            .collect();

        // Stable sorts: equal balances keep table order
        debtors.sort_by(|a, b| a.1.cmp(&b.1));
        creditors.sort_by(|a, b| b.1.cmp(&a.1));

        let mut transfers = Vec::new();
        let mut i = 0;
        let mut j = 0;

        while i < creditors.len() && j < debtors.len() {
            let credit = creditors[i].1.clone();
            let debt = debtors[j].1.abs();
            let amount = credit.min(debt);

            let rounded = self.round(&amount);
            if rounded > BigDecimal::from(0) {
                transfers.push(Transfer {
                    from: debtors[j].0.clone(),
                    to: creditors[i].0.clone(),
                    amount: rounded,
                });
            } else {
                tracing::trace!(
                    from = %debtors[j].0,
                    to = %creditors[i].0,
                    %amount,
                    "step rounds to zero, no transfer emitted"
                );
            }

            creditors[i].1 -= &amount;
            debtors[j].1 += &amount;

            // Exact arithmetic leaves one side at zero, so a zero tolerance still advances
            if creditors[i].1 <= *tolerance {
                i += 1;
            }
            if debtors[j].1.abs() <= *tolerance {
                j += 1;
            }
        }

        tracing::debug!(
            participants = table.len(),
            debtors = debtors.len(),
            creditors = creditors.len(),
            transfers = transfers.len(),
            "settlement computed"
        );

        transfers
    }

    fn round(&self, amount: &BigDecimal) -> BigDecimal {
        amount.with_scale_round(self.options.rounding_scale, RoundingMode::HalfUp)
    }
}

/// Settle with default options
pub fn settle(
    roster: &[ParticipantId],
    expenses: &[ExpenseRecord],
) -> SettlementResult<Vec<Transfer>> {
    SettlementEngine::new().settle(roster, expenses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::StrictExpenseValidator;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn ids(ids: &[&str]) -> Vec<ParticipantId> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn expense(amount: &str, payer: &str, targets: &[&str]) -> ExpenseRecord {
        ExpenseRecord::new(
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            "Shared cost".to_string(),
            BigDecimal::from_str(amount).unwrap(),
            Payer::from(payer),
            ids(targets),
        )
    }

    fn transfer(from: &str, to: &str, amount: i64) -> Transfer {
        Transfer {
            from: from.to_string(),
            to: to.to_string(),
            amount: BigDecimal::from(amount),
        }
    }

    fn total(transfers: &[Transfer]) -> BigDecimal {
        transfers.iter().map(|t| &t.amount).sum()
    }

    #[test]
    fn test_payer_among_targets() {
        let roster = ids(&["a", "b", "c"]);
        let transfers = settle(&roster, &[expense("90", "a", &["a", "b", "c"])]).unwrap();

        assert_eq!(
            transfers,
            vec![transfer("b", "a", 30), transfer("c", "a", 30)]
        );
    }

    #[test]
    fn test_payer_excluded_from_split() {
        let roster = ids(&["a", "b", "c"]);
        let transfers = settle(&roster, &[expense("100", "a", &["b", "c"])]).unwrap();

        assert_eq!(transfers.len(), 2);
        assert!(transfers.iter().all(|t| t.to == "a"));
        assert_eq!(total(&transfers), BigDecimal::from(100));
    }

    #[test]
    fn test_mutual_expenses_cancel() {
        let roster = ids(&["a", "b"]);
        let transfers = settle(
            &roster,
            &[
                expense("50", "a", &["a", "b"]),
                expense("50", "b", &["a", "b"]),
            ],
        )
        .unwrap();

        assert!(transfers.is_empty());
    }

    #[test]
    fn test_empty_roster_and_expenses() {
        assert!(settle(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_empty_targets_rejected() {
        let roster = ids(&["a", "b"]);
        let err = settle(
            &roster,
            &[expense("50", "a", &["a", "b"]), expense("90", "a", &[])],
        )
        .unwrap_err();

        assert!(matches!(
            err,
            SettlementError::InvalidExpense {
                reason: InvalidExpenseReason::EmptyTargets,
                ..
            }
        ));
    }

    #[test]
    fn test_skip_policy_reports_rejected() {
        let engine = SettlementEngine::with_options(SettlementOptions::permissive());
        let roster = ids(&["a", "b"]);
        let bad = expense("-10", "a", &["b"]);
        let report = engine
            .settle_report(&roster, &[expense("40", "a", &["a", "b"]), bad.clone()])
            .unwrap();

        assert_eq!(report.transfers, vec![transfer("b", "a", 20)]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].expense_id, bad.id);
    }

    #[test]
    fn test_fractional_shares_round_to_whole_units() {
        let roster = ids(&["a", "b", "c", "d"]);
        let transfers = settle(&roster, &[expense("100", "a", &["a", "b", "c"])]).unwrap();

        assert_eq!(
            transfers,
            vec![transfer("b", "a", 33), transfer("c", "a", 33)]
        );
    }

    #[test]
    fn test_rounding_scale_keeps_cents() {
        let engine =
            SettlementEngine::with_options(SettlementOptions::default().with_rounding_scale(2));
        let roster = ids(&["a", "b", "c"]);
        let transfers = engine
            .settle(&roster, &[expense("100", "a", &["a", "b", "c"])])
            .unwrap();

        assert_eq!(transfers[0].amount, BigDecimal::from_str("33.33").unwrap());
        assert_eq!(transfers[1].amount, BigDecimal::from_str("33.33").unwrap());
    }

    #[test]
    fn test_half_unit_rounds_up() {
        let roster = ids(&["a", "b"]);
        let transfers = settle(&roster, &[expense("10.5", "a", &["b"])]).unwrap();
        assert_eq!(transfers, vec![transfer("b", "a", 11)]);
    }

    #[test]
    fn test_sub_unit_step_emits_nothing() {
        let roster = ids(&["a", "b"]);
        let transfers = settle(&roster, &[expense("0.4", "a", &["b"])]).unwrap();
        assert!(transfers.is_empty());
    }

    #[test]
    fn test_largest_debts_matched_first() {
        let roster = ids(&["a", "b", "c", "d"]);
        let transfers = settle(
            &roster,
            &[
                expense("70", "a", &["c"]),
                expense("30", "b", &["d"]),
                expense("10", "a", &["d"]),
            ],
        )
        .unwrap();

        // a: +80, b: +30, c: -70, d: -40
        assert_eq!(
            transfers,
            vec![
                transfer("c", "a", 70),
                transfer("d", "a", 10),
                transfer("d", "b", 30),
            ]
        );
    }

    #[test]
    fn test_pooled_expense() {
        let roster = ids(&["a", "b", "c"]);
        let transfers = settle(
            &roster,
            &[
                expense("60", "a", &["a", "b", "c"]),
                expense("30", "ALL", &["a", "b", "c"]),
            ],
        )
        .unwrap();

        // a: +30, b: -30, c: -30; the pool shortfall stays unmatched
        assert_eq!(transfers, vec![transfer("b", "a", 30)]);
    }

    #[test]
    fn test_unknown_participant_tolerated_by_default() {
        let roster = ids(&["a"]);
        let transfers = settle(&roster, &[expense("20", "a", &["x"])]).unwrap();
        assert_eq!(transfers, vec![transfer("x", "a", 20)]);
    }

    #[test]
    fn test_strict_validator_rejects_unknown_participant() {
        let engine = SettlementEngine::with_validator(
            SettlementOptions::default(),
            Box::new(StrictExpenseValidator),
        );
        let err = engine
            .settle(&ids(&["a"]), &[expense("20", "a", &["x"])])
            .unwrap_err();

        assert!(matches!(err, SettlementError::UnknownParticipant { .. }));
    }

    #[test]
    fn test_zero_tolerance_settles_exactly() {
        let engine = SettlementEngine::with_options(
            SettlementOptions::default().with_tolerance(BigDecimal::from(0)),
        );
        let roster = ids(&["a", "b", "c"]);
        let transfers = engine
            .settle(
                &roster,
                &[
                    expense("50", "a", &["b"]),
                    expense("0.005", "c", &["a"]),
                ],
            )
            .unwrap();

        // a: +49.995, b: -50, c: +0.005
        assert_eq!(transfers, vec![transfer("b", "a", 50)]);
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let engine = SettlementEngine::with_options(
            SettlementOptions::default().with_tolerance(BigDecimal::from(-1)),
        );
        let err = engine
            .settle(&ids(&["a", "b"]), &[expense("50", "a", &["b"])])
            .unwrap_err();

        assert!(matches!(err, SettlementError::Validation(_)));
    }

    #[test]
    fn test_matching_clamps_negative_tolerance() {
        let roster = ids(&["a", "b"]);
        let table = SettlementEngine::new()
            .compute_balances(&roster, &[expense("50", "a", &["b"])])
            .unwrap()
            .table;
        let engine = SettlementEngine::with_options(
            SettlementOptions::default().with_tolerance(BigDecimal::from(-1)),
        );

        assert_eq!(engine.match_balances(&table), vec![transfer("b", "a", 50)]);
    }

    struct LenientValidator;

    impl ExpenseValidator for LenientValidator {
        fn validate_expense(&self, _expense: &ExpenseRecord) -> SettlementResult<()> {
            Ok(())
        }

        fn validate_participants(
            &self,
            _expense: &ExpenseRecord,
            _roster: &[ParticipantId],
        ) -> SettlementResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_skip_policy_covers_unappliable_records() {
        let engine = SettlementEngine::with_validator(
            SettlementOptions::permissive(),
            Box::new(LenientValidator),
        );
        let roster = ids(&["a", "b"]);
        let bad = expense("90", "a", &[]);
        let report = engine
            .settle_report(&roster, &[bad.clone(), expense("40", "a", &["b"])])
            .unwrap();

        assert_eq!(report.transfers, vec![transfer("b", "a", 40)]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].expense_id, bad.id);
        assert_eq!(report.balance_of("a"), Some(&BigDecimal::from(40)));
    }

    #[test]
    fn test_deterministic_output() {
        let roster = ids(&["a", "b", "c", "d", "e"]);
        let expenses = vec![
            expense("120", "a", &["a", "b", "c", "d", "e"]),
            expense("45.50", "c", &["b", "e"]),
            expense("80", "d", &["a", "c"]),
        ];

        let first = settle(&roster, &expenses).unwrap();
        let second = settle(&roster, &expenses).unwrap();
        assert_eq!(first, second);
    }
}
