//! Concept catalog.
//!
//! The catalog maps each canonical metric ([`ConceptGroup`]) to the ordered list of
//! source concepts that may report it. It is static data built once and shared by every
//! normalization.
//!
//! Synonyms are listed most-preferred first. A concept belongs to at most one group; when
//! a custom catalog lists it twice the first group wins.

use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::debug;

use crate::{
    request::StatementType,
    types::{Category, local_name},
};

/// A canonical metric and the concepts that report it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConceptGroup {
    /// Stable identifier of the group.
    pub key: &'static str,
    /// Category the metric is displayed under.
    pub category: Category,
    /// Display label, unique within the category.
    pub label: &'static str,
    /// Sort order within the category (lower first).
    pub order: u32,
    /// Concepts reporting this metric, most preferred first.
    pub synonyms: &'static [&'static str],
    /// Concepts whose value may stand in when no synonym is reported.
    ///
    /// Substitutes never assign facts to this group.
    pub substitutes: &'static [&'static str],
}

impl ConceptGroup {
    /// Creates a group without substitutes.
    #[must_use]
    pub const fn new(
        key: &'static str,
        category: Category,
        label: &'static str,
        order: u32,
        synonyms: &'static [&'static str],
    ) -> Self {
        Self {
            key,
            category,
            label,
            order,
            synonyms,
            substitutes: &[],
        }
    }

    /// Sets the substitute concepts of this group.
    #[must_use]
    pub const fn with_substitutes(mut self, substitutes: &'static [&'static str]) -> Self {
        self.substitutes = substitutes;
        self
    }

    /// Returns the metric key (`Category_Label`).
    #[must_use]
    pub fn metric_key(&self) -> String {
        format!("{}_{}", self.category, self.label)
    }

    /// Returns the synonym rank of `concept` (0 = preferred), ignoring its namespace.
    #[must_use]
    pub fn synonym_rank(&self, concept: &str) -> Option<usize> {
        let name = local_name(concept);
        self.synonyms.iter().position(|s| *s == name)
    }
}

/// Lookup structure over a list of [`ConceptGroup`]s.
#[derive(Debug)]
pub struct ConceptCatalog {
    groups: Vec<ConceptGroup>,
    by_concept: HashMap<&'static str, usize>,
}

impl ConceptCatalog {
    /// Builds a catalog from groups listed in catalog order.
    #[must_use]
    pub fn new(groups: Vec<ConceptGroup>) -> Self {
        let mut by_concept = HashMap::new();
        for (index, group) in groups.iter().enumerate() {
            for synonym in group.synonyms {
                if let Some(first) = by_concept.get(synonym) {
                    let first: &ConceptGroup = &groups[*first];
                    debug!(
                        concept = %synonym,
                        kept = first.key,
                        ignored = group.key,
                        "Concept listed in two groups, keeping the first"
                    );
                    continue;
                }
                by_concept.insert(*synonym, index);
            }
        }
        Self { groups, by_concept }
    }

    /// Returns the shared built-in catalog.
    pub fn standard() -> &'static Self {
        static STANDARD: LazyLock<ConceptCatalog> =
            LazyLock::new(|| ConceptCatalog::new(STANDARD_GROUPS.to_vec()));
        &STANDARD
    }

    /// Returns all groups in catalog order.
    #[must_use]
    pub fn groups(&self) -> &[ConceptGroup] {
        &self.groups
    }

    /// Returns the catalog position and group whose synonyms contain `concept`.
    ///
    /// The taxonomy prefix of `concept` is ignored.
    #[must_use]
    pub fn group_for(&self, concept: &str) -> Option<(usize, &ConceptGroup)> {
        self.by_concept
            .get(local_name(concept))
            .map(|&index| (index, &self.groups[index]))
    }

    /// Returns the groups that take part in `statement_type`, in catalog order.
    pub fn groups_for(
        &self,
        statement_type: StatementType,
    ) -> impl Iterator<Item = (usize, &ConceptGroup)> + '_ {
        self.groups
            .iter()
            .enumerate()
            .filter(move |(_, group)| statement_type.includes(group.category))
    }

    /// Returns the number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if the catalog has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

use Category::{
    Assets, Eps, Equity, FinancingCashFlow, Income, InvestingCashFlow, Liabilities,
    OperatingCashFlow, Revenue,
};

/// Built-in groups, in catalog order.
const STANDARD_GROUPS: &[ConceptGroup] = &[
    // Assets, most liquid first
    ConceptGroup::new("TotalAssets", Assets, "Total Assets", 0, &["Assets", "TotalAssets"]),
    ConceptGroup::new(
        "CurrentAssets",
        Assets,
        "Current Assets",
        10,
        &["AssetsCurrent", "CurrentAssets"],
    ),
    ConceptGroup::new(
        "Cash",
        Assets,
        "Cash and Cash Equivalents",
        20,
        &["CashAndCashEquivalentsAtCarryingValue", "CashAndCashEquivalents"],
    ),
    ConceptGroup::new(
        "ShortTermInvestments",
        Assets,
        "Short-Term Investments",
        30,
        &["ShortTermInvestments", "InvestmentsShortTerm", "MarketableSecuritiesCurrent"],
    ),
    ConceptGroup::new(
        "AccountsReceivable",
        Assets,
        "Accounts Receivable",
        40,
        &["AccountsReceivableNetCurrent", "AccountsReceivableNet", "AccountsReceivable"],
    ),
    ConceptGroup::new("Inventory", Assets, "Inventory", 50, &["InventoryNet", "Inventory"]),
    ConceptGroup::new(
        "PrepaidExpense",
        Assets,
        "Prepaid Expenses and Other Current Assets",
        60,
        &["PrepaidExpenseAndOtherAssetsCurrent"],
    ),
    ConceptGroup::new(
        "OtherCurrentAssets",
        Assets,
        "Other Current Assets",
        70,
        &["OtherAssetsCurrent"],
    ),
    ConceptGroup::new(
        "NoncurrentAssets",
        Assets,
        "Non-Current Assets",
        100,
        &["AssetsNoncurrent", "NoncurrentAssets"],
    ),
    ConceptGroup::new(
        "PropertyPlantEquipment",
        Assets,
        "Property, Plant and Equipment",
        110,
        &["PropertyPlantAndEquipmentNet", "PropertyPlantAndEquipment"],
    ),
    ConceptGroup::new("Goodwill", Assets, "Goodwill", 120, &["Goodwill"]),
    ConceptGroup::new(
        "IntangibleAssets",
        Assets,
        "Intangible Assets",
        130,
        &["IntangibleAssetsNetExcludingGoodwill", "IntangibleAssetsNet"],
    ),
    ConceptGroup::new(
        "LongTermInvestments",
        Assets,
        "Long-Term Investments",
        140,
        &["LongTermInvestments", "InvestmentsLongTerm", "MarketableSecuritiesNoncurrent"],
    ),
    ConceptGroup::new(
        "OtherNoncurrentAssets",
        Assets,
        "Other Non-Current Assets",
        150,
        &["OtherAssetsNoncurrent"],
    ),
    // Liabilities, current before non-current
    ConceptGroup::new(
        "TotalLiabilities",
        Liabilities,
        "Total Liabilities",
        0,
        &["Liabilities", "TotalLiabilities"],
    ),
    ConceptGroup::new(
        "CurrentLiabilities",
        Liabilities,
        "Current Liabilities",
        10,
        &["LiabilitiesCurrent", "CurrentLiabilities"],
    ),
    ConceptGroup::new(
        "AccountsPayableCurrent",
        Liabilities,
        "Accounts Payable (Current)",
        20,
        &[
            "AccountsPayableCurrent",
            "AccountsPayableTradeCurrent",
            "AccountsPayableAndAccruedLiabilitiesCurrent",
        ],
    ),
    ConceptGroup::new(
        "AccountsPayable",
        Liabilities,
        "Accounts Payable (Total)",
        25,
        &["AccountsPayable", "AccountsPayableAndAccruedLiabilitiesCurrentAndNoncurrent"],
    )
    .with_substitutes(&["AccountsPayableCurrent", "AccountsPayableTradeCurrent"]),
    ConceptGroup::new(
        "AccruedLiabilities",
        Liabilities,
        "Accrued Liabilities",
        30,
        &["AccruedLiabilitiesCurrent", "AccruedLiabilities", "AccruedExpenses"],
    ),
    ConceptGroup::new(
        "DeferredRevenueCurrent",
        Liabilities,
        "Deferred Revenue (Current)",
        40,
        &["DeferredRevenueCurrent", "ContractWithCustomerLiabilityCurrent"],
    ),
    ConceptGroup::new(
        "DeferredRevenue",
        Liabilities,
        "Deferred Revenue",
        45,
        &["DeferredRevenue", "ContractWithCustomerLiability"],
    ),
    ConceptGroup::new(
        "ShortTermDebt",
        Liabilities,
        "Short-Term Debt",
        50,
        &["ShortTermBorrowings", "ShortTermDebt", "DebtCurrent", "NotesPayable", "LineOfCredit"],
    ),
    ConceptGroup::new(
        "CommercialPaper",
        Liabilities,
        "Commercial Paper",
        55,
        &["CommercialPaper"],
    ),
    ConceptGroup::new(
        "AccruedIncomeTaxes",
        Liabilities,
        "Accrued Income Taxes",
        60,
        &["AccruedIncomeTaxesCurrent"],
    ),
    ConceptGroup::new(
        "OtherCurrentLiabilities",
        Liabilities,
        "Other Current Liabilities",
        70,
        &["OtherLiabilitiesCurrent"],
    ),
    ConceptGroup::new(
        "NoncurrentLiabilities",
        Liabilities,
        "Non-Current Liabilities",
        100,
        &["LiabilitiesNoncurrent", "NoncurrentLiabilities"],
    ),
    ConceptGroup::new(
        "LongTermDebt",
        Liabilities,
        "Total Debt",
        110,
        &["LongTermDebt", "DebtLongTerm"],
    ),
    ConceptGroup::new(
        "LongTermDebtNoncurrent",
        Liabilities,
        "Long-Term Debt",
        120,
        &["LongTermDebtNoncurrent"],
    ),
    ConceptGroup::new(
        "DeferredRevenueNoncurrent",
        Liabilities,
        "Deferred Revenue (Non-Current)",
        130,
        &["DeferredRevenueNoncurrent", "ContractWithCustomerLiabilityNoncurrent"],
    ),
    ConceptGroup::new(
        "DeferredTaxLiabilities",
        Liabilities,
        "Deferred Tax Liabilities",
        140,
        &["DeferredTaxLiabilitiesNoncurrent", "DeferredIncomeTaxLiabilitiesNet"],
    ),
    ConceptGroup::new(
        "OtherNoncurrentLiabilities",
        Liabilities,
        "Other Non-Current Liabilities",
        150,
        &["OtherLiabilitiesNoncurrent"],
    ),
    // Equity
    ConceptGroup::new(
        "StockholdersEquity",
        Equity,
        "Stockholders' Equity",
        0,
        &["StockholdersEquity", "TotalEquity"],
    ),
    ConceptGroup::new(
        "TotalEquity",
        Equity,
        "Total Equity",
        5,
        &["StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest", "Equity"],
    ),
    ConceptGroup::new(
        "EquityAttributableToParent",
        Equity,
        "Equity Attributable to Parent",
        8,
        &["EquityAttributableToOwnersOfParent", "EquityAttributableToParent"],
    ),
    ConceptGroup::new(
        "CommonStock",
        Equity,
        "Common Stock",
        10,
        &["CommonStockValue", "CommonStocksIncludingAdditionalPaidInCapital"],
    ),
    ConceptGroup::new(
        "AdditionalPaidInCapital",
        Equity,
        "Additional Paid-In Capital",
        15,
        &["AdditionalPaidInCapital", "AdditionalPaidInCapitalCommonStock"],
    ),
    ConceptGroup::new(
        "TreasuryStock",
        Equity,
        "Treasury Stock",
        18,
        &["TreasuryStockValue", "TreasuryStockCommonValue", "TreasuryStock"],
    ),
    ConceptGroup::new(
        "RetainedEarnings",
        Equity,
        "Retained Earnings",
        20,
        &["RetainedEarningsAccumulatedDeficit", "RetainedEarnings"],
    ),
    ConceptGroup::new(
        "AccumulatedOtherComprehensiveIncome",
        Equity,
        "Accumulated Other Comprehensive Income",
        30,
        &["AccumulatedOtherComprehensiveIncomeLossNetOfTax"],
    ),
    ConceptGroup::new(
        "NoncontrollingInterest",
        Equity,
        "Noncontrolling Interest",
        40,
        &["MinorityInterest", "EquityAttributableToNoncontrollingInterest", "NoncontrollingInterests"],
    ),
    ConceptGroup::new(
        "PreferredStock",
        Equity,
        "Preferred Stock",
        50,
        &["PreferredStockValue"],
    ),
    // Revenue
    ConceptGroup::new(
        "TotalRevenue",
        Revenue,
        "Total Revenue",
        0,
        &[
            "Revenues",
            "TotalRevenue",
            "RevenueFromContractWithCustomerExcludingAssessedTax",
            "RevenueFromContractWithCustomerIncludingAssessedTax",
            "RevenueFromContractWithCustomer",
            "SalesRevenueNet",
            "NetSales",
            "Revenue",
        ],
    ),
    ConceptGroup::new(
        "InterestAndDividendIncome",
        Revenue,
        "Interest and Dividend Income",
        30,
        &["InterestAndDividendIncomeOperating"],
    ),
    // Income, in presentation order from gross profit down to net income
    ConceptGroup::new("GrossProfit", Income, "Gross Profit", 20, &["GrossProfit"]),
    ConceptGroup::new(
        "CostOfRevenue",
        Income,
        "Cost of Revenue",
        25,
        &["CostOfRevenue", "CostOfGoodsAndServicesSold", "CostOfSales"],
    ),
    ConceptGroup::new(
        "SellingGeneralAdministrative",
        Income,
        "SG&A Expenses",
        35,
        &["SellingGeneralAndAdministrativeExpense"],
    ),
    ConceptGroup::new(
        "ResearchDevelopment",
        Income,
        "R&D Expenses",
        40,
        &["ResearchAndDevelopmentExpense"],
    ),
    ConceptGroup::new(
        "OperatingIncome",
        Income,
        "Operating Income",
        45,
        &["OperatingIncomeLoss", "ProfitLossFromOperatingActivities"],
    ),
    ConceptGroup::new(
        "InterestExpense",
        Income,
        "Interest Expense",
        50,
        &["InterestExpense", "InterestExpenseNonoperating"],
    ),
    ConceptGroup::new(
        "PretaxIncome",
        Income,
        "Income Before Taxes",
        52,
        &[
            "IncomeLossFromContinuingOperationsBeforeIncomeTaxesExtraordinaryItemsNoncontrollingInterest",
            "IncomeLossFromContinuingOperationsBeforeIncomeTaxes",
            "ProfitLossBeforeTax",
        ],
    ),
    ConceptGroup::new(
        "IncomeTax",
        Income,
        "Income Tax Expense",
        55,
        &["IncomeTaxExpenseBenefit", "IncomeTaxExpenseContinuingOperations"],
    ),
    ConceptGroup::new(
        "NetIncome",
        Income,
        "Net Income",
        60,
        &["NetIncomeLoss", "NetIncome", "ProfitLoss"],
    ),
    ConceptGroup::new(
        "NetIncomeToCommon",
        Income,
        "Net Income to Common Stockholders",
        65,
        &["NetIncomeLossAvailableToCommonStockholdersBasic"],
    ),
    ConceptGroup::new(
        "ComprehensiveIncome",
        Income,
        "Comprehensive Income",
        70,
        &["ComprehensiveIncomeNetOfTax"],
    ),
    // EPS
    ConceptGroup::new(
        "EpsBasic",
        Eps,
        "EPS (Basic)",
        0,
        &["EarningsPerShareBasic", "BasicEarningsLossPerShare"],
    ),
    ConceptGroup::new(
        "EpsDiluted",
        Eps,
        "EPS (Diluted)",
        10,
        &["EarningsPerShareDiluted", "DilutedEarningsLossPerShare"],
    ),
    ConceptGroup::new(
        "EpsContinuingBasic",
        Eps,
        "EPS from Continuing Operations (Basic)",
        20,
        &["IncomeLossFromContinuingOperationsPerBasicShare"],
    ),
    ConceptGroup::new(
        "EpsContinuingDiluted",
        Eps,
        "EPS from Continuing Operations (Diluted)",
        30,
        &["IncomeLossFromContinuingOperationsPerDilutedShare"],
    ),
    ConceptGroup::new(
        "EpsDiscontinuedBasic",
        Eps,
        "EPS from Discontinued Operations (Basic)",
        40,
        &["IncomeLossFromDiscontinuedOperationsNetOfTaxPerBasicShare"],
    ),
    ConceptGroup::new(
        "EpsDiscontinuedDiluted",
        Eps,
        "EPS from Discontinued Operations (Diluted)",
        50,
        &["IncomeLossFromDiscontinuedOperationsNetOfTaxPerDilutedShare"],
    ),
    // Cash flow
    ConceptGroup::new(
        "OperatingCashFlow",
        OperatingCashFlow,
        "Net Cash from Operations",
        0,
        &[
            "NetCashProvidedByUsedInOperatingActivities",
            "NetCashProvidedByOperatingActivities",
            "NetCashUsedInOperatingActivities",
            "CashFlowsFromUsedInOperatingActivities",
            "CashFlowsFromOperatingActivities",
            "OperatingCashFlow",
        ],
    ),
    ConceptGroup::new(
        "DepreciationAmortization",
        OperatingCashFlow,
        "Depreciation and Amortization",
        10,
        &["DepreciationDepletionAndAmortization", "DepreciationAndAmortization"],
    ),
    ConceptGroup::new(
        "ShareBasedCompensation",
        OperatingCashFlow,
        "Share-Based Compensation",
        20,
        &["ShareBasedCompensation", "AllocatedShareBasedCompensationExpense"],
    ),
    ConceptGroup::new(
        "InvestingCashFlow",
        InvestingCashFlow,
        "Net Cash from Investing",
        0,
        &[
            "NetCashProvidedByUsedInInvestingActivities",
            "NetCashProvidedByInvestingActivities",
            "NetCashUsedInInvestingActivities",
            "CashFlowsFromUsedInInvestingActivities",
            "CashFlowsFromInvestingActivities",
            "InvestingCashFlow",
        ],
    ),
    ConceptGroup::new(
        "CapitalExpenditures",
        InvestingCashFlow,
        "Capital Expenditures",
        10,
        &["PaymentsToAcquirePropertyPlantAndEquipment", "PurchaseOfPropertyPlantAndEquipment"],
    ),
    ConceptGroup::new(
        "Acquisitions",
        InvestingCashFlow,
        "Acquisitions",
        20,
        &["PaymentsToAcquireBusinessesNetOfCashAcquired"],
    ),
    ConceptGroup::new(
        "FinancingCashFlow",
        FinancingCashFlow,
        "Net Cash from Financing",
        0,
        &[
            "NetCashProvidedByUsedInFinancingActivities",
            "NetCashProvidedByFinancingActivities",
            "NetCashUsedInFinancingActivities",
            "CashFlowsFromUsedInFinancingActivities",
            "CashFlowsFromFinancingActivities",
            "FinancingCashFlow",
        ],
    ),
    ConceptGroup::new(
        "DividendsPaid",
        FinancingCashFlow,
        "Dividends Paid",
        10,
        &["PaymentsOfDividends", "PaymentsOfDividendsCommonStock", "DividendsPaid"],
    ),
    ConceptGroup::new(
        "ShareRepurchases",
        FinancingCashFlow,
        "Share Repurchases",
        20,
        &["PaymentsForRepurchaseOfCommonStock"],
    ),
    ConceptGroup::new(
        "DebtIssuance",
        FinancingCashFlow,
        "Debt Issuance",
        30,
        &["ProceedsFromIssuanceOfLongTermDebt"],
    ),
    ConceptGroup::new(
        "DebtRepayment",
        FinancingCashFlow,
        "Debt Repayment",
        40,
        &["RepaymentsOfLongTermDebt"],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_no_concept_in_two_groups() {
        let mut seen = HashSet::new();
        for group in STANDARD_GROUPS {
            for synonym in group.synonyms {
                assert!(seen.insert(*synonym), "{synonym} listed twice");
            }
        }
    }

    #[test]
    fn test_labels_unique_per_category() {
        let mut seen = HashSet::new();
        for group in ConceptCatalog::standard().groups() {
            assert!(seen.insert(group.metric_key()), "{} duplicated", group.metric_key());
        }
        let keys: HashSet<_> = STANDARD_GROUPS.iter().map(|g| g.key).collect();
        assert_eq!(keys.len(), STANDARD_GROUPS.len());
    }

    #[test]
    fn test_group_lookup_ignores_namespace() {
        let catalog = ConceptCatalog::standard();
        let (_, group) = catalog.group_for("us-gaap:AssetsCurrent").unwrap();
        assert_eq!(group.key, "CurrentAssets");
        let (_, group) = catalog.group_for("ifrs-full:ProfitLoss").unwrap();
        assert_eq!(group.key, "NetIncome");
        assert_eq!(group.synonym_rank("ifrs-full:ProfitLoss"), Some(2));
        assert!(catalog.group_for("us-gaap:SomethingUnlisted").is_none());
    }

    #[test]
    fn test_substitutes_do_not_partition() {
        let catalog = ConceptCatalog::standard();
        let (_, group) = catalog.group_for("AccountsPayableCurrent").unwrap();
        assert_eq!(group.key, "AccountsPayableCurrent");

        let (_, total) = catalog.group_for("AccountsPayable").unwrap();
        assert_eq!(total.substitutes, &["AccountsPayableCurrent", "AccountsPayableTradeCurrent"]);
        assert_eq!(total.metric_key(), "Liabilities_Accounts Payable (Total)");
    }

    #[test]
    fn test_groups_for_statement() {
        let catalog = ConceptCatalog::standard();
        assert!(
            catalog
                .groups_for(StatementType::Bs)
                .all(|(_, g)| matches!(g.category, Assets | Liabilities | Equity))
        );
        assert!(
            catalog
                .groups_for(StatementType::Cf)
                .any(|(_, g)| g.key == "CapitalExpenditures")
        );
        assert_eq!(catalog.groups_for(StatementType::All).count(), catalog.len());
    }

    #[test]
    fn test_first_group_wins() {
        let catalog = ConceptCatalog::new(vec![
            ConceptGroup::new("A", Assets, "A", 0, &["Shared"]),
            ConceptGroup::new("B", Assets, "B", 1, &["Shared", "Own"]),
        ]);
        assert_eq!(catalog.group_for("Shared").unwrap().1.key, "A");
        assert_eq!(catalog.group_for("Own").unwrap().1.key, "B");
    }
}
