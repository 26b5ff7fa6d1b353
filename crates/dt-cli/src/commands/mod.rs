pub mod can_undo;
pub mod dispatch;
pub mod history;
pub mod undo;
pub mod validate;
