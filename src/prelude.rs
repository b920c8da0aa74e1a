//! Commonly used items for convenient importing.
//!
//! ```rust
//! use pannkaka::prelude::*;
//!
//! let stack = CallStack::current();
//! stack.push(StaticDescription::new("starting up")).unwrap();
//! assert_eq!(stack.pop().unwrap().to_string(), "starting up");
//! ```

pub use crate::{
    CallStack, CallStackError, Frame,
    description::{Adapted, Description, Descriptive, StaticDescription},
    scheduler::{Scheduler, SchedulerExt},
};
