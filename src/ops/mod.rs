pub mod filter;
pub mod route_ops;
pub mod sort;
