pub mod clock;
pub mod logs;
pub mod text;
