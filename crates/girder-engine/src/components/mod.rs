pub mod entity;
pub mod template;
