//! # Worker Offload Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Front-end ↔ broker ↔ workers
//!     ├── offload_flow.rs   # service-level round trips
//!     └── http_flow.rs      # the same flows through the REST surface
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wo-tests
//! cargo test -p wo-tests integration::http_flow
//! ```

pub mod integration;
