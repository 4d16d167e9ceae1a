pub mod breakdown;
pub mod equity;
pub mod metrics;
pub mod pnl;

pub use breakdown::{daily_summaries, monthly_pnl, pnl_by_symbol, DailySummary, MonthlyPnl, SymbolPnl};
pub use equity::{equity_curve, EquityPoint};
pub use metrics::{calculate_metrics, PerformanceMetrics};
pub use pnl::{realized_pnl, risk_reward_ratio};
