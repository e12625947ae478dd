pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod gates;
pub mod logging;
pub mod models;
pub mod plan;

pub use engine::{Engine, GateSource};
pub use error::{ConfigError, PlanError};
pub use plan::{parse, parse_plan, parse_plan_content, ParsedPlan, Plan};
