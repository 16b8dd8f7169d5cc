//! Cash and position bookkeeping for the single-position long-only account.

use super::state::{SimState, SimulatorConfig};
use crate::domain::{Bar, EquityPoint, Position, TradeRecord};

/// Cash plus the state machine. Fills always happen at the bar's close.
#[derive(Debug, Clone)]
pub struct Account {
    cash: f64,
    state: SimState,
    commission_rate: f64,
    slippage_rate: f64,
    position_size_pct: f64,
    lot_size: u64,
}

impl Account {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self {
            cash: config.initial_capital,
            state: SimState::Flat,
            commission_rate: config.commission_rate,
            slippage_rate: config.slippage_rate,
            position_size_pct: config.position_size_pct,
            lot_size: config.lot_size.max(1),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    fn cost_rate(&self) -> f64 {
        self.commission_rate + self.slippage_rate
    }

    /// Shares affordable at `price` including entry costs, rounded down to the lot size.
    pub fn affordable_shares(&self, price: f64) -> u64 {
        let unit = price * (1.0 + self.cost_rate());
        if unit <= 0.0 {
            return 0;
        }
        let budget = self.cash * self.position_size_pct;
        let mut shares = (budget / unit).floor() as u64;
        shares -= shares % self.lot_size;
        // Guard against floor() rounding past the budget.
        while shares > 0 && shares as f64 * unit > self.cash {
            shares = shares.saturating_sub(self.lot_size);
        }
        shares
    }

    /// Open a position at the bar's close. Returns false (no-op) when already
    /// long or when the cash cannot buy one lot.
    pub fn enter(&mut self, bar: &Bar, bar_index: usize) -> bool {
        if !self.state.is_flat() {
            return false;
        }
        let shares = self.affordable_shares(bar.close);
        if shares == 0 {
            return false;
        }
        let cost = shares as f64 * bar.close * (1.0 + self.cost_rate());
        self.cash -= cost;
        self.state = SimState::Long(Position {
            shares,
            entry_price: bar.close,
            entry_date: bar.date,
            entry_bar: bar_index,
            entry_cost: cost,
        });
        true
    }

    /// Close the open position at the bar's close. Returns `None` when flat.
    pub fn exit(&mut self, bar: &Bar, bar_index: usize) -> Option<TradeRecord> {
        let position = match std::mem::replace(&mut self.state, SimState::Flat) {
            SimState::Long(p) => p,
            SimState::Flat => return None,
        };
        let shares = position.shares as f64;
        let proceeds = shares * bar.close * (1.0 - self.cost_rate());
        self.cash += proceeds;

        let pnl = proceeds - position.entry_cost;
        let gross_pnl = (bar.close - position.entry_price) * shares;
        // Fees of both legs, priced directly so a zero rate gives exactly zero.
        let costs = shares * (position.entry_price + bar.close) * self.cost_rate();
        Some(TradeRecord {
            entry_date: position.entry_date,
            entry_price: position.entry_price,
            exit_date: bar.date,
            exit_price: bar.close,
            shares: position.shares,
            pnl,
            pnl_pct: if position.entry_cost > 0.0 {
                pnl / position.entry_cost * 100.0
            } else {
                0.0
            },
            holding_days: (bar.date - position.entry_date).num_days(),
            entry_bar: position.entry_bar,
            exit_bar: bar_index,
            bars_held: bar_index - position.entry_bar,
            gross_pnl,
            costs,
        })
    }

    /// Mark-to-market snapshot at the bar's close.
    pub fn mark(&self, bar: &Bar) -> EquityPoint {
        let position_value = self
            .state
            .position()
            .map(|p| p.market_value(bar.close))
            .unwrap_or(0.0);
        EquityPoint::new(bar.date, self.cash, position_value, bar.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn enter_spends_cost_inclusive_cash() {
        let bars = make_bars(&[100.0]);
        let cfg = SimulatorConfig::new(10_000.0, 0.001, 0.001);
        let mut acct = Account::new(&cfg);
        assert!(acct.enter(&bars[0], 0));
        // unit = 100.2 → floor(10000 / 100.2) = 99 shares
        let pos = acct.state().position().unwrap().clone();
        assert_eq!(pos.shares, 99);
        assert_approx(acct.cash(), 10_000.0 - 99.0 * 100.2, 1e-9);
        assert_approx(pos.entry_cost, 99.0 * 100.2, 1e-9);
    }

    #[test]
    fn second_enter_is_noop() {
        let bars = make_bars(&[100.0, 90.0]);
        let mut acct = Account::new(&SimulatorConfig::frictionless(10_000.0));
        assert!(acct.enter(&bars[0], 0));
        let cash = acct.cash();
        let shares = acct.state().position().unwrap().shares;
        assert!(!acct.enter(&bars[1], 1));
        assert_eq!(acct.cash(), cash);
        assert_eq!(acct.state().position().unwrap().shares, shares);
    }

    #[test]
    fn insufficient_capital_skips() {
        let bars = make_bars(&[500.0]);
        let mut acct = Account::new(&SimulatorConfig::frictionless(100.0));
        assert!(!acct.enter(&bars[0], 0));
        assert!(acct.state().is_flat());
        assert_eq!(acct.cash(), 100.0);
    }

    #[test]
    fn lot_size_rounds_down() {
        let bars = make_bars(&[10.0]);
        let mut cfg = SimulatorConfig::frictionless(2_550.0);
        cfg.lot_size = 100;
        let mut acct = Account::new(&cfg);
        assert!(acct.enter(&bars[0], 0));
        assert_eq!(acct.state().position().unwrap().shares, 200);
    }

    #[test]
    fn exit_records_net_pnl() {
        let mut bars = make_bars(&[100.0, 110.0]);
        bars[1].date = bars[0].date + chrono::Duration::days(7);
        let cfg = SimulatorConfig::new(10_000.0, 0.001, 0.0);
        let mut acct = Account::new(&cfg);
        acct.enter(&bars[0], 0);
        let trade = acct.exit(&bars[1], 1).unwrap();

        let shares = trade.shares as f64;
        let entry_cost = shares * 100.0 * 1.001;
        let proceeds = shares * 110.0 * 0.999;
        assert_approx(trade.pnl, proceeds - entry_cost, 1e-9);
        assert_approx(trade.gross_pnl, shares * 10.0, 1e-9);
        assert_approx(trade.costs, trade.gross_pnl - trade.pnl, 1e-9);
        assert_approx(trade.pnl_pct, trade.pnl / entry_cost * 100.0, 1e-9);
        assert_eq!(trade.holding_days, 7);
        assert_eq!(trade.bars_held, 1);
        assert!(acct.state().is_flat());
    }

    #[test]
    fn frictionless_round_trip_has_zero_costs() {
        let bars = make_bars(&[97.31, 103.87, 88.19]);
        let mut acct = Account::new(&SimulatorConfig::frictionless(25_000.0));
        acct.enter(&bars[0], 0);
        let up = acct.exit(&bars[1], 1).unwrap();
        acct.enter(&bars[1], 1);
        let down = acct.exit(&bars[2], 2).unwrap();
        assert_eq!(up.costs, 0.0);
        assert_eq!(down.costs, 0.0);
    }

    #[test]
    fn costs_are_the_fees_of_both_legs() {
        let bars = make_bars(&[97.31, 88.19]);
        let mut acct = Account::new(&SimulatorConfig::new(25_000.0, 0.0007, 0.0011));
        acct.enter(&bars[0], 0);
        let trade = acct.exit(&bars[1], 1).unwrap();
        let shares = trade.shares as f64;
        assert_approx(trade.costs, shares * (97.31 + 88.19) * 0.0018, 1e-9);
        assert!(trade.costs > 0.0);
    }

    #[test]
    fn exit_while_flat_is_noop() {
        let bars = make_bars(&[100.0]);
        let mut acct = Account::new(&SimulatorConfig::frictionless(1_000.0));
        assert!(acct.exit(&bars[0], 0).is_none());
        assert_eq!(acct.cash(), 1_000.0);
    }

    #[test]
    fn mark_conserves_equity() {
        let bars = make_bars(&[100.0, 105.0]);
        let mut acct = Account::new(&SimulatorConfig::new(10_000.0, 0.0003, 0.001));
        acct.enter(&bars[0], 0);
        let point = acct.mark(&bars[1]);
        assert_approx(point.equity, point.cash + point.position_value, 1e-9);
        assert_approx(point.close, 105.0, 1e-12);
    }
}
