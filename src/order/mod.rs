mod core;

pub use core::OrderBook;
