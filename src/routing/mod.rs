//! Routing module
//!
//! Maps request paths to handler actions through an ordered route table.

mod table;

pub use table::{RouteAction, RouteTable};
