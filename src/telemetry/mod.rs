// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tracing initialization.
//!
//! One-shot setup of the global `tracing` subscriber. The filter is taken
//! from `RUST_LOG` when set, otherwise from the configured default level.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Telemetry configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub default_directive: String,
    /// Enable ANSI colors in log output.
    pub ansi_colors: bool,
    /// Include the event target (module path) in output.
    pub include_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_directive: "warn".to_string(),
            ansi_colors: true,
            include_target: false,
        }
    }
}

impl TelemetryConfig {
    /// Verbose configuration used by the `--verbose` flag.
    pub fn verbose() -> Self {
        Self {
            default_directive: "mini_agent=debug,info".to_string(),
            include_target: true,
            ..Self::default()
        }
    }

    /// Quiet configuration for test harnesses.
    pub fn testing() -> Self {
        Self {
            default_directive: "error".to_string(),
            ansi_colors: false,
            ..Self::default()
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once: subsequent calls are no-ops because the
/// global subscriber is already set.
pub fn init_telemetry(config: &TelemetryConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
