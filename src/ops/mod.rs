pub mod filter;
pub mod scan;
pub mod sort;
pub mod task_ops;
