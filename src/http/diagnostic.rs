//! Diagnostic handler: waits, then answers.
//!
//! # Responsibilities
//! - Accept only `GET` on exactly its mount path
//! - Block the worker thread for the configured delay
//! - Map an interrupted wait to a 500 with body `Interrupted`
//!
//! Used to exercise the filter chain and body decorator with controlled
//! timing and controlled failure.

use std::time::Duration;

use axum::http::{Method, StatusCode};

use crate::config::DiagnosticConfig;
use crate::http::canned::{canned_respond, respond, MessageKey, TEXT_PLAIN_UTF8};
use crate::http::exchange::{Exchange, ExchangeError};
use crate::http::filter::Handler;

pub const DONE_BODY: &[u8] = b"Done";
pub const INTERRUPTED_BODY: &[u8] = b"Interrupted";

#[derive(Debug, Clone)]
pub struct DiagnosticHandler {
    mount_path: String,
    delay: Duration,
}

impl DiagnosticHandler {
    pub fn new(mount_path: impl Into<String>, delay: Duration) -> Self {
        Self {
            mount_path: mount_path.into(),
            delay,
        }
    }

    pub fn from_config(config: &DiagnosticConfig) -> Self {
        Self::new(config.mount_path.clone(), Duration::from_millis(config.delay_ms))
    }

    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }
}

impl Handler for DiagnosticHandler {
    fn name(&self) -> &str {
        "DiagnosticHandler"
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<(), ExchangeError> {
        if exchange.method() != Method::GET {
            canned_respond(exchange, StatusCode::METHOD_NOT_ALLOWED, MessageKey::MethodNotAllowed)?;
            return Ok(());
        }
        if exchange.path() != self.mount_path {
            canned_respond(exchange, StatusCode::NOT_FOUND, MessageKey::NotFound)?;
            return Ok(());
        }

        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "Diagnostic wait");
        if exchange.interrupt().sleep(self.delay).is_err() {
            tracing::info!(path = %exchange.path(), "Diagnostic wait interrupted");
            if exchange.is_committed() {
                tracing::warn!("Response already committed; leaving it in place");
                return Ok(());
            }
            respond(
                exchange,
                StatusCode::INTERNAL_SERVER_ERROR,
                TEXT_PLAIN_UTF8,
                INTERRUPTED_BODY,
            )?;
            return Ok(());
        }

        respond(exchange, StatusCode::OK, TEXT_PLAIN_UTF8, DONE_BODY)?;
        Ok(())
    }
}
