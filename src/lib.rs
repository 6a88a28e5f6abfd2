pub mod app;
pub mod config;
pub mod demo;
pub mod error;
pub mod form;
pub mod kanban_board;
pub mod logging;
pub mod notify;
pub mod pages;
pub mod projections;
pub mod projects;
pub mod record;
pub mod routes;
pub mod schema;
pub mod services;
pub mod tasks;
pub mod team;
pub mod ui;
