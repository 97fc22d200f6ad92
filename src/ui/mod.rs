pub mod cli;
pub mod config;
pub mod dashboard;
pub mod output;
pub mod prompter;
pub mod report;
pub mod template;
pub mod wizard;
