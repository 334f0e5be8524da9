#![forbid(unsafe_code)]

pub mod banner;
pub mod statusbar;
pub mod toasts;
pub mod topbar;
