//! Northwind product catalog: a CRUD REST service over a relational store,
//! plus a terminal view of the product list.

pub mod app_system;
pub mod config;
pub mod domain;
pub mod http;
pub mod product_service;
pub mod store;
pub mod view;

#[cfg(test)]
mod mock_framework;
