mod config;
mod mongo;
mod reports;
mod writes;
