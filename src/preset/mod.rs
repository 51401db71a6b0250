pub mod backend;
pub mod gqn;
