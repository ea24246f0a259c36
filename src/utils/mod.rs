pub mod paths;
pub mod proc;
