//! Background Tasks Module
//!
//! Contains the tasks a cache runs on its own.
//!
//! # Tasks
//! - TTL Sweeper: deletes expired entries at the configured interval

mod sweeper;

pub(crate) use sweeper::{spawn_sweeper, SweeperGuard};
