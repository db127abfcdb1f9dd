// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! aro-services: the native service layer of §4.6-4.8 — the BSD-sockets
//! HTTP server (with WebSocket upgrade), the raw TCP socket server, and the
//! file monitor — plus the [`manager::NativeServiceManager`] that wires them
//! into `aro-core`'s [`aro_core::ServiceManager`] trait.

pub mod file_monitor;
pub mod http;
pub mod manager;
pub mod route;
pub mod tcp;
pub mod ws;

pub use file_monitor::FileMonitor;
pub use http::{HttpDispatch, HttpServer, RequestHandler};
pub use manager::NativeServiceManager;
pub use route::{RouteEntry, RouteTable};
pub use tcp::TcpServer;
