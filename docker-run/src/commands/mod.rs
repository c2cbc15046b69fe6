pub mod cleanup;
pub mod exec;
