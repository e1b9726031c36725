//! Web server for browser-based genre prediction.
//!
//! This module provides an interactive web interface using Axum.
//! Users can paste lyrics, run batch predictions over a CSV, upload their own
//! song catalog and play the songs of a predicted genre.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! lyrics-genre serve
//!
//! # Custom port and auto-open browser
//! lyrics-genre serve --port 3000 --open
//!
//! # Bind to all interfaces
//! lyrics-genre serve --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /` - Main page
//! - `GET /api/status` - Model artifact and metadata status
//! - `POST /api/predict` - Predict from lyrics text (multipart form)
//! - `POST /api/batch` - Predict every row of a CSV (multipart form)
//! - `GET /api/browse?genre=&limit=` - List catalog songs of a genre
//! - `POST /api/catalog` - Upload a catalog that replaces the local one
//! - `GET /api/audio?row=N` - Local audio bytes of a catalog row

pub mod server;
