pub mod classify;
pub mod cli;
pub mod config;
pub mod convert;
pub mod credentials;
pub mod error;
pub mod filter;
pub mod generate;
pub mod processor;
pub mod remote;
pub mod sheet;
pub mod translate;
pub mod ui;
