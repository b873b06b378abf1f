//! Levelised cost of fuel and the project's cash flows.
//!
//! Capital and indirect costs fall in year zero, before the plant starts operating. Operating
//! costs, fuel output and revenue fall in project years 1 to N. All amounts are discounted to
//! year zero.
use crate::cost::{CostBreakdown, OperatingCostCategory};
use crate::error::{EngineResult, ensure_config};
use crate::finance::{capital_recovery_factor, discount_factor, present_value};
use crate::projection::AnnualSummary;
use crate::units::{Dimensionless, Mass, Money, MoneyPerMass};
use indexmap::IndexMap;
use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Proportions of the depreciable base written off in each year under 5-year MACRS
const MACRS_5: [f64; 6] = [0.20, 0.32, 0.192, 0.1152, 0.1152, 0.0576];

/// Proportions of the depreciable base written off in each year under 7-year MACRS
const MACRS_7: [f64; 8] = [
    0.1429, 0.2449, 0.1749, 0.1249, 0.0893, 0.0892, 0.0893, 0.0446,
];

/// A component of the levelised cost
#[derive(Display, EnumIter, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CostComponent {
    /// Capital costs
    Capex,
    /// EPC and land procurement
    IndirectCosts,
    /// Operation and maintenance
    OperatingCosts,
    /// Electricity bought
    ElectricityPurchase,
    /// Surplus electricity sold
    ElectricitySale,
    /// Electrolyser stack replacements
    StackReplacement,
    /// Battery replacements
    BatteryReplacement,
    /// Water
    Water,
    /// CO₂ feedstock
    Feedstock,
    /// Additional upfront and annual costs
    AdditionalCosts,
    /// Oxygen sold
    OxygenSale,
}

impl From<OperatingCostCategory> for CostComponent {
    fn from(category: OperatingCostCategory) -> Self {
        match category {
            OperatingCostCategory::SolarOm
            | OperatingCostCategory::WindOm
            | OperatingCostCategory::BatteryOm
            | OperatingCostCategory::ElectrolyserOm
            | OperatingCostCategory::SynthesisOm => Self::OperatingCosts,
            OperatingCostCategory::ElectricityPurchase => Self::ElectricityPurchase,
            OperatingCostCategory::ElectricitySale => Self::ElectricitySale,
            OperatingCostCategory::StackReplacement => Self::StackReplacement,
            OperatingCostCategory::BatteryReplacement => Self::BatteryReplacement,
            OperatingCostCategory::Water => Self::Water,
            OperatingCostCategory::Feedstock => Self::Feedstock,
            OperatingCostCategory::AdditionalCosts => Self::AdditionalCosts,
            OperatingCostCategory::OxygenSale => Self::OxygenSale,
        }
    }
}

/// How the depreciable base is written off for tax purposes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepreciationProfile {
    /// Equal amounts over the given number of years
    StraightLine {
        /// Number of years
        period: u32,
    },
    /// 5-year Modified Accelerated Cost Recovery System
    Macrs5,
    /// 7-year Modified Accelerated Cost Recovery System
    Macrs7,
}

impl DepreciationProfile {
    /// Proportion of the depreciable base written off in the given project year
    pub fn rate(&self, year: u32) -> Dimensionless {
        let index = (year as usize).wrapping_sub(1);
        let rate = match self {
            Self::StraightLine { period } if year >= 1 && year <= *period => 1.0 / *period as f64,
            Self::StraightLine { .. } => 0.0,
            Self::Macrs5 => MACRS_5.get(index).copied().unwrap_or(0.0),
            Self::Macrs7 => MACRS_7.get(index).copied().unwrap_or(0.0),
        };

        Dimensionless(rate)
    }
}

/// Financing and tax assumptions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancingParameters {
    /// Rate at which future amounts are discounted
    pub discount_rate: Dimensionless,
    /// Price at which fuel is sold
    pub fuel_price: MoneyPerMass,
    /// Proportion of the upfront investment paid with equity
    pub equity_share: Dimensionless,
    /// Interest rate on the loan covering the rest of the investment
    pub loan_interest_rate: Dimensionless,
    /// Years over which the loan is repaid
    pub loan_term: u32,
    /// Tax rate on profits
    pub tax_rate: Dimensionless,
    /// Depreciation for tax purposes
    pub depreciation: DepreciationProfile,
    /// Value recovered at the end of the project as a proportion of capital and indirect costs
    pub salvage_rate: Dimensionless,
    /// Cost of decommissioning as a proportion of capital and indirect costs
    pub decommissioning_rate: Dimensionless,
}

/// The levelised cost and its breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct LevelisedCost {
    /// Levelised cost per kg of fuel
    pub levelised_cost: MoneyPerMass,
    /// Contribution of each component, summing to the levelised cost
    pub waterfall: IndexMap<CostComponent, MoneyPerMass>,
}

/// Calculate the levelised cost of fuel.
///
/// # Arguments
///
/// * `costs` - The plant's costs
/// * `annual` - Plant operation in each project year
/// * `discount_rate` - Rate at which future amounts are discounted
///
/// # Returns
///
/// The levelised cost or an error if no fuel is produced.
pub fn levelised_cost(
    costs: &CostBreakdown,
    annual: &[AnnualSummary],
    discount_rate: Dimensionless,
) -> EngineResult<LevelisedCost> {
    let discounted_fuel: Mass = annual
        .iter()
        .map(|summary| summary.fuel_output * discount_factor(summary.year, discount_rate))
        .sum();
    ensure_config!(
        discounted_fuel > Mass(0.0),
        "Cannot calculate levelised cost as the plant produces no fuel"
    );

    let mut present_values: IndexMap<CostComponent, Money> =
        CostComponent::iter().map(|component| (component, Money(0.0))).collect();
    present_values[&CostComponent::Capex] = costs.total_capex();
    present_values[&CostComponent::IndirectCosts] = costs.total_indirect();
    present_values[&CostComponent::AdditionalCosts] = costs.additional_upfront;
    for year in &costs.annual {
        for (category, cost) in &year.costs {
            present_values[&CostComponent::from(*category)] +=
                present_value(*cost, year.year, discount_rate);
        }
    }

    let total: Money = present_values.values().copied().sum();
    let waterfall = present_values
        .into_iter()
        .map(|(component, value)| (component, value / discounted_fuel))
        .collect();

    Ok(LevelisedCost {
        levelised_cost: total / discounted_fuel,
        waterfall,
    })
}

/// Cash flows in one year of the project.
///
/// Year zero is the construction year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowYear {
    /// Project year
    pub year: u32,
    /// Revenue from fuel sales
    pub fuel_sales: Money,
    /// Net operating costs, after by-product sales
    pub operating_costs: Money,
    /// Equity invested
    pub equity_investment: Money,
    /// Loan repayment, including interest
    pub loan_repayment: Money,
    /// Interest portion of the loan repayment
    pub interest: Money,
    /// Depreciation for tax purposes
    pub depreciation: Money,
    /// Tax paid
    pub tax: Money,
    /// Value recovered at the end of the project
    pub salvage: Money,
    /// Cost of decommissioning at the end of the project
    pub decommissioning: Money,
    /// Net cash flow to equity
    pub net_cash_flow: Money,
    /// Net cash flow discounted to year zero
    pub discounted_cash_flow: Money,
    /// Running total of discounted cash flow
    pub cumulative_discounted_cash_flow: Money,
}

impl CashFlowYear {
    fn new(year: u32) -> Self {
        Self {
            year,
            fuel_sales: Money(0.0),
            operating_costs: Money(0.0),
            equity_investment: Money(0.0),
            loan_repayment: Money(0.0),
            interest: Money(0.0),
            depreciation: Money(0.0),
            tax: Money(0.0),
            salvage: Money(0.0),
            decommissioning: Money(0.0),
            net_cash_flow: Money(0.0),
            discounted_cash_flow: Money(0.0),
            cumulative_discounted_cash_flow: Money(0.0),
        }
    }

    /// A copy with every amount rounded to whole currency units, for display
    pub fn rounded(&self) -> Self {
        Self {
            year: self.year,
            fuel_sales: self.fuel_sales.round(),
            operating_costs: self.operating_costs.round(),
            equity_investment: self.equity_investment.round(),
            loan_repayment: self.loan_repayment.round(),
            interest: self.interest.round(),
            depreciation: self.depreciation.round(),
            tax: self.tax.round(),
            salvage: self.salvage.round(),
            decommissioning: self.decommissioning.round(),
            net_cash_flow: self.net_cash_flow.round(),
            discounted_cash_flow: self.discounted_cash_flow.round(),
            cumulative_discounted_cash_flow: self.cumulative_discounted_cash_flow.round(),
        }
    }
}

/// Calculate the project's cash flows, from year zero to the end of the project.
///
/// Equity pays its share of the upfront investment in year zero. The rest is a loan repaid in
/// equal instalments. If the loan term runs past the end of the project, the remaining balance is
/// repaid in the final year.
pub fn cash_flows(
    costs: &CostBreakdown,
    annual: &[AnnualSummary],
    financing: &FinancingParameters,
) -> EngineResult<Vec<CashFlowYear>> {
    let upfront = costs.upfront_investment();
    let equity = upfront * financing.equity_share;
    let debt = upfront - equity;
    ensure_config!(
        debt <= Money(0.0) || financing.loan_term > 0,
        "Loan term must be at least one year when the investment is not fully funded by equity"
    );
    if let DepreciationProfile::StraightLine { period } = financing.depreciation {
        ensure_config!(period > 0, "Depreciation period must be at least one year");
    }

    let depreciable = costs.total_capex() + costs.total_indirect();
    let repayment = debt * capital_recovery_factor(financing.loan_term, financing.loan_interest_rate);
    let project_life = annual.iter().map(|summary| summary.year).max().unwrap_or(0);

    let mut flows = Vec::with_capacity(annual.len() + 1);
    let mut construction = CashFlowYear::new(0);
    construction.equity_investment = equity;
    construction.net_cash_flow = -equity;
    flows.push(construction);

    let mut loan_balance = debt;
    for (summary, year_costs) in annual.iter().zip(&costs.annual) {
        let year = summary.year;
        let mut flow = CashFlowYear::new(year);
        flow.fuel_sales = financing.fuel_price * summary.fuel_output;
        flow.operating_costs = year_costs.total();

        if year <= financing.loan_term && loan_balance > Money(0.0) {
            flow.interest = loan_balance * financing.loan_interest_rate;
            flow.loan_repayment = repayment;
            loan_balance = loan_balance - (repayment - flow.interest);
        }

        if year == project_life && loan_balance > Money(0.0) {
            // Debt still outstanding when the project ends is settled in full
            flow.loan_repayment += loan_balance;
            loan_balance = Money(0.0);
        }

        flow.depreciation = depreciable * financing.depreciation.rate(year);
        let taxable = flow.fuel_sales - flow.operating_costs - flow.interest - flow.depreciation;
        if taxable > Money(0.0) {
            flow.tax = taxable * financing.tax_rate;
        }

        if year == project_life {
            flow.salvage = depreciable * financing.salvage_rate;
            flow.decommissioning = depreciable * financing.decommissioning_rate;
        }

        flow.net_cash_flow = flow.fuel_sales - flow.operating_costs - flow.loan_repayment
            - flow.tax
            + flow.salvage
            - flow.decommissioning;
        flows.push(flow);
    }

    let mut cumulative = Money(0.0);
    for flow in &mut flows {
        flow.discounted_cash_flow =
            present_value(flow.net_cash_flow, flow.year, financing.discount_rate);
        cumulative += flow.discounted_cash_flow;
        flow.cumulative_discounted_cash_flow = cumulative;
    }

    Ok(flows)
}

/// The financial outcome of a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialResult {
    /// Levelised cost per kg of fuel
    pub levelised_cost: MoneyPerMass,
    /// Contribution of each component to the levelised cost
    pub waterfall: IndexMap<CostComponent, MoneyPerMass>,
    /// Cash flows from year zero to the end of the project
    pub cash_flows: Vec<CashFlowYear>,
    /// Total discounted cash flow over the project
    pub net_profit: Money,
    /// Net profit as a proportion of capital and indirect costs
    pub return_on_investment: Dimensionless,
    /// First year in which cumulative discounted cash flow is not negative
    pub payback_year: Option<u32>,
}

/// Calculate the levelised cost and cash flows of a scenario.
///
/// If there are no capital or indirect costs, the return on investment is zero.
pub fn financial_result(
    costs: &CostBreakdown,
    annual: &[AnnualSummary],
    financing: &FinancingParameters,
) -> EngineResult<FinancialResult> {
    let LevelisedCost {
        levelised_cost,
        waterfall,
    } = levelised_cost(costs, annual, financing.discount_rate)?;
    let cash_flows = cash_flows(costs, annual, financing)?;

    let net_profit = cash_flows
        .last()
        .map_or(Money(0.0), |flow| flow.cumulative_discounted_cash_flow);
    let investment = costs.total_capex() + costs.total_indirect();
    let return_on_investment = if investment > Money(0.0) {
        net_profit / investment
    } else {
        Dimensionless(0.0)
    };
    let payback_year = cash_flows
        .iter()
        .find(|flow| flow.cumulative_discounted_cash_flow >= Money(0.0))
        .map(|flow| flow.year);

    Ok(FinancialResult {
        levelised_cost,
        waterfall,
        cash_flows,
        net_profit,
        return_on_investment,
        payback_year,
    })
}
