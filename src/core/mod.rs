//! Core data types shared by every layer.
//!
//! - [`Catalog`]: a tabular song catalog with an arbitrary schema
//! - [`CellValue`]: one scalar cell (text, number or missing)
//! - [`ColumnRole`], [`ColumnRoleMap`]: semantic column bindings
//! - [`IssueKind`]: classification of non-fatal problems
//! - [`AppConfig`]: well-known paths and runtime options
//!
//! [`Catalog`]: catalog::Catalog
//! [`CellValue`]: cell::CellValue
//! [`ColumnRole`]: types::ColumnRole
//! [`ColumnRoleMap`]: types::ColumnRoleMap
//! [`IssueKind`]: types::IssueKind
//! [`AppConfig`]: config::AppConfig

pub mod catalog;
pub mod cell;
pub mod config;
pub mod types;
