pub mod app;
pub mod check;
pub mod commands;
pub mod dispatch;
pub mod env;
pub mod list;
pub mod output;
pub mod run;
pub mod runtime;
