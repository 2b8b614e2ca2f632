//! Application orchestration — state, event channel, input handling and
//! background requests.

pub mod event;
pub mod handler;
pub mod net_runtime;
pub mod state;
