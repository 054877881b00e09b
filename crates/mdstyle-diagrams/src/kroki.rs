//! Kroki diagram rendering with parallel HTTP requests.
//!
//! Each diagram is a POST of its source to `{kroki_url}/{endpoint}/{format}`.
//! Requests run on the rayon thread pool; failures are collected per diagram
//! so one broken diagram does not hide the others.

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use rayon::prelude::*;
use ureq::Agent;

use crate::language::{DiagramFormat, DiagramLanguage};

/// Diagram to render.
#[derive(Debug, Clone)]
pub struct DiagramRequest {
    pub index: usize,
    pub source: String,
    pub language: DiagramLanguage,
    pub format: DiagramFormat,
}

/// Rendered diagram body: SVG markup or a PNG data URI.
#[derive(Debug)]
pub struct RenderedDiagram {
    pub index: usize,
    pub body: String,
}

/// Single diagram rendering error.
#[derive(Debug, thiserror::Error)]
#[error("diagram {index}: {kind}")]
pub struct DiagramError {
    pub index: usize,
    pub kind: DiagramErrorKind,
}

/// Kind of diagram rendering error.
#[derive(Debug, thiserror::Error)]
pub enum DiagramErrorKind {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("invalid PNG data")]
    InvalidPng,
}

impl DiagramError {
    fn new(index: usize, kind: DiagramErrorKind) -> Self {
        Self { index, kind }
    }
}

/// Result of rendering diagrams with partial failures.
#[derive(Debug)]
pub struct PartialRenderResult {
    pub rendered: Vec<RenderedDiagram>,
    pub errors: Vec<DiagramError>,
}

/// Create an HTTP agent with the given timeout.
///
/// HTTP error statuses are returned as responses so the error body can be
/// shown to the user.
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Extract width and height from PNG image data.
///
/// PNG format: 8-byte signature, then IHDR chunk with width/height at bytes 16-24.
fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 || &data[0..8] != b"\x89PNG\r\n\x1a\n" {
        return None;
    }
    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((width, height))
}

/// Send a diagram to Kroki and return the response body.
fn send_diagram_request(
    agent: &Agent,
    diagram: &DiagramRequest,
    server_url: &str,
) -> Result<Vec<u8>, DiagramError> {
    let url = format!(
        "{server_url}/{}/{}",
        diagram.language.kroki_endpoint(),
        diagram.format.as_str()
    );

    let response = agent
        .post(&url)
        .header("Content-Type", "text/plain")
        .send(diagram.source.as_bytes())
        .map_err(|e| DiagramError::new(diagram.index, DiagramErrorKind::Http(e.to_string())))?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(DiagramError::new(
            diagram.index,
            DiagramErrorKind::Http(format!("HTTP {status}: {}", error_body.trim())),
        ));
    }

    body.read_to_vec()
        .map_err(|e| DiagramError::new(diagram.index, DiagramErrorKind::Io(e.to_string())))
}

fn render_one(
    agent: &Agent,
    diagram: &DiagramRequest,
    server_url: &str,
) -> Result<RenderedDiagram, DiagramError> {
    let data = send_diagram_request(agent, diagram, server_url)?;
    let body = match diagram.format {
        DiagramFormat::Svg => String::from_utf8(data).map_err(|e| {
            DiagramError::new(
                diagram.index,
                DiagramErrorKind::Io(format!("invalid UTF-8 in SVG: {e}")),
            )
        })?,
        DiagramFormat::Png => png_data_uri(&data)
            .ok_or_else(|| DiagramError::new(diagram.index, DiagramErrorKind::InvalidPng))?,
    };

    Ok(RenderedDiagram {
        index: diagram.index,
        body,
    })
}

/// Encode PNG bytes as a data URI, rejecting non-PNG data.
fn png_data_uri(data: &[u8]) -> Option<String> {
    png_dimensions(data)?;
    Some(format!(
        "data:image/png;base64,{}",
        BASE64_STANDARD.encode(data)
    ))
}

/// Render all diagrams in parallel, returning partial results on failure.
#[must_use]
pub fn render_all(
    diagrams: &[DiagramRequest],
    server_url: &str,
    agent: &Agent,
) -> PartialRenderResult {
    let server_url = server_url.trim_end_matches('/');

    let results: Vec<_> = diagrams
        .par_iter()
        .map(|d| render_one(agent, d, server_url))
        .collect();

    let mut rendered = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(item) => rendered.push(item),
            Err(error) => errors.push(error),
        }
    }
    PartialRenderResult { rendered, errors }
}
