pub mod pool;
pub mod postgres;
