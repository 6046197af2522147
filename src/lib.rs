pub mod catalog;
pub mod config;
pub mod conjunction;
pub mod ingestion;
pub mod schedule;
pub mod screening;
pub mod web;
