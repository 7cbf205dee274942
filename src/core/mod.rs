pub mod reporting;
pub mod sweep;
pub mod templates;
pub mod workflow;

pub use crate::domain::model::{ActionKind, CheckInRequest, OperatorContext, PresentationEvent};
pub use crate::domain::ports::{
    ActionLogStore, Clock, PrebookingStore, PresentationSink, SystemClock, VehicleStore,
};
pub use crate::utils::error::Result;
