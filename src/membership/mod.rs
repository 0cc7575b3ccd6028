//! Membership feeds for the report poller
//!
//! A membership source turns cluster join/leave events into
//! [`ReportPoller::add_peer`](crate::poller::ReportPoller::add_peer) and
//! [`ReportPoller::remove_peer`](crate::poller::ReportPoller::remove_peer) calls.

mod events;
mod static_source;

pub use events::{MembershipEvent, apply_event, follow_events};
pub use static_source::StaticMembership;
