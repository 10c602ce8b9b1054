pub mod events;
pub mod operation;
