pub mod app;
pub mod cli;
pub mod csv_loader;
