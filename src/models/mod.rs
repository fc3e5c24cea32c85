pub mod changeset;
pub mod event;
