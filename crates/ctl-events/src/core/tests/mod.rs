//! Unit tests for the event-delivery core.

mod dispatch_ordering;
mod helpers;
mod interest_and_arming;
