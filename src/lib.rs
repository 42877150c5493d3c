// src/lib.rs

pub mod app;
pub mod bootstrap;
pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod services;
