//! A classic grid snake game: a tick-driven simulation engine plus a
//! crossterm front end. The engine lives behind plain data types so it can
//! be driven and inspected without a terminal.

pub mod engine;
pub mod grid;
pub mod storage;
pub mod ui;
