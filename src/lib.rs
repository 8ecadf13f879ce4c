pub mod aggregate;
pub mod infra;
pub mod publish;
pub mod records;
pub mod report;
pub mod run;
pub mod services;
