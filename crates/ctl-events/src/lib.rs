//! The stateful half of the control-channel event delivery core: interest
//! tracking, queued dispatch, and the in-process state bus, plus the
//! external collaborator traits that keep all three decoupled from
//! sockets and router internals.

pub mod bus;
pub mod collab;
pub mod core;
pub mod dispatcher;
pub mod getinfo;
pub mod orconn;
pub mod registry;

pub use bus::{OrConnStateMsg, StateBus, StateListener};
pub use collab::{ArmingEffects, Collaborators, ConnectionSource, ControlClient, LogPendingDrain, LogSeverity, LogSeverityControl, MainloopHandle, NodeTable, PeriodicScheduler};
pub use core::{EventCore, initialize};
pub use dispatcher::EventDispatcher;
pub use orconn::{OrConnIdentity, OrConnReason, OrConnStatus, emit_orconn_event};
pub use registry::InterestRegistry;
