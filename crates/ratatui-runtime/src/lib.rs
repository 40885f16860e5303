//! Terminal runtime for fixed-rate simulations.
//!
//! [`Runtime::run`] owns the terminal and drives an [`App`] with three kinds of
//! events: fixed-rate ticks, paced renders, and [`ControlSignal`]s decoded from
//! terminal input. Pending input is always handled before the next tick, so a quit
//! request takes effect between ticks and never interrupts one.

pub use self::{
    app::App,
    event_loop::RenderMode,
    runtime::Runtime,
    signal::ControlSignal,
};

mod app;
mod event;
mod event_loop;
mod runtime;
mod signal;
