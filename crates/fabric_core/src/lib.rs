//! Fabric core: command planning, result mapping and the front-end state machine.
//!
//! Nothing in this crate performs I/O.
mod builder;
mod effect;
mod msg;
mod operation;
mod outcome;
mod plan;
mod platform;
mod result;
mod state;
mod update;
mod vendors;
mod view_model;

pub use builder::{
    build, prepare, BuildError, CONTEXT_FLAG, MODEL_FLAG, PATTERN_FLAG, QUERY_FLAG, URL_FLAG,
};
pub use effect::Effect;
pub use msg::{Action, Msg};
pub use operation::{Operation, PatternArgs};
pub use outcome::{ExecutionOutcome, ExitKind};
pub use plan::{ExecutionPlan, Stage, StructuredRequest};
pub use platform::{resolve, Platform, QuoteStyle, ResolvedPlatform, ShellInvocation, UnsupportedPlatform};
pub use result::{
    legacy_notification, map_build_error, map_outcome, map_unsupported, Notification,
    NotificationLevel, UserResult, EMPTY_OUTPUT_MESSAGE, NO_PATTERN_MESSAGE,
};
pub use state::AppState;
pub use update::update;
pub use vendors::{parse_model_listing, parse_vendor_listing, ModelEntry};
pub use view_model::AppViewModel;
