//! Client side of the diagnosis flow: HTTP access, the step-by-step wizard
//! state and the on-device history.

pub mod api;
pub mod flow;
pub mod history;

pub use api::{DiagnoseApi, HttpDiagnoseClient};
pub use flow::{DiagnoseFlow, FlowStep};
pub use history::{HistoryEntry, HistoryStore};
