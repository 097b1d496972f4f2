// Progress reconciliation and forecasting for BOQ activities.
//
// The engine modules (`calendar`, `matcher`, `lookahead`, `zones`) are pure
// functions of the collections handed to them. Everything that touches the
// filesystem lives in `loader`, `output` and `config`.
pub mod calendar;
pub mod config;
pub mod error;
pub mod loader;
pub mod lookahead;
pub mod matcher;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
pub mod zones;

pub use calendar::WorkCalendar;
pub use config::EngineConfig;
pub use error::BoqError;
pub use lookahead::{forecast_activity, forecast_portfolio, forecast_project, LookaheadOptions};
pub use matcher::{KpiMatcher, NameMatch};
pub use zones::ZoneEngine;
