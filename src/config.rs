//! Configuration for the slide viewer.
//!
//! Two layers:
//! - [`ViewerConfig`]: library-level settings passed explicitly into the
//!   controller and the rendering surface manager (there is no global,
//!   library-wide renderer state).
//! - [`Cli`]: command-line arguments for the `slide-viewer` binary, with
//!   environment variable fallbacks using the `VIEWER_` prefix.
//!
//! # Environment Variables
//!
//! - `VIEWER_API_ROOT` - Base URL of the metadata REST API (required)
//! - `VIEWER_TOKEN` - Authentication token sent as `Girder-Token`
//! - `VIEWER_RENDERER` - Preferred renderer (default: gl)
//! - `VIEWER_FALLBACK_RENDERER` - Renderer used when the preferred one is unavailable (default: canvas)
//! - `VIEWER_FILE_LOOKUP_LIMIT` - Files inspected per plain item (default: 1)

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

// =============================================================================
// Default Values
// =============================================================================

/// Container size used when the host reports no size.
pub const DEFAULT_CONTAINER_SIZE: u32 = 100;

/// Number of files inspected when looking for an image in a plain item.
pub const DEFAULT_FILE_LOOKUP_LIMIT: u32 = 1;

/// How long the failure alert stays visible.
pub const DEFAULT_ALERT_TIMEOUT_MS: u64 = 5000;

/// Default tile layer maximum zoom level.
pub const DEFAULT_MAX_LEVEL: u32 = 10;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

// =============================================================================
// Renderer Configuration
// =============================================================================

/// Rendering backends a surface can be created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Renderer {
    /// Hardware-accelerated GL renderer
    Gl,
    /// 2D canvas renderer
    Canvas,
}

/// Renderer selection, scoped to one controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RendererConfig {
    /// Renderer requested for new surfaces and layers
    pub preferred: Renderer,
    /// Renderer substituted when the preferred one cannot be created
    pub fallback: Renderer,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            preferred: Renderer::Gl,
            fallback: Renderer::Canvas,
        }
    }
}

// =============================================================================
// Viewer Configuration
// =============================================================================

/// Library configuration for one viewer instance.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub renderer: RendererConfig,

    /// Maximum number of files listed when resolving a plain item
    pub file_lookup_limit: u32,

    /// Pixel size assumed when the container reports zero
    pub default_container_size: u32,

    /// Display duration of failure alerts
    pub alert_timeout: Duration,

    /// Whether tile fetches carry credentials
    pub use_credentials: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            renderer: RendererConfig::default(),
            file_lookup_limit: DEFAULT_FILE_LOOKUP_LIMIT,
            default_container_size: DEFAULT_CONTAINER_SIZE,
            alert_timeout: Duration::from_millis(DEFAULT_ALERT_TIMEOUT_MS),
            use_credentials: true,
        }
    }
}

impl ViewerConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.file_lookup_limit == 0 {
            return Err("file_lookup_limit must be greater than 0".to_string());
        }
        if self.default_container_size == 0 {
            return Err("default_container_size must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn with_renderer(mut self, renderer: RendererConfig) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_file_lookup_limit(mut self, limit: u32) -> Self {
        self.file_lookup_limit = limit;
        self
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// Slide Viewer - resolve server-held images into a viewing surface.
#[derive(Parser, Debug, Clone)]
#[command(name = "slide-viewer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the metadata REST API (e.g. https://host/api/v1).
    #[arg(long, global = true, env = "VIEWER_API_ROOT", default_value = "")]
    pub api_root: String,

    /// Authentication token sent with every request.
    #[arg(long, global = true, env = "VIEWER_TOKEN")]
    pub token: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Resolve an item and print the resulting surface, layer and viewport.
    Resolve(ResolveConfig),

    /// Check connectivity to the metadata API.
    Check(CheckConfig),
}

/// Arguments of the `resolve` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ResolveConfig {
    /// Identifier of the item to display.
    pub item_id: String,

    /// Container width in pixels.
    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    /// Container height in pixels.
    #[arg(long, default_value_t = 768)]
    pub height: u32,

    /// Preferred renderer.
    #[arg(long, value_enum, default_value_t = Renderer::Gl, env = "VIEWER_RENDERER")]
    pub renderer: Renderer,

    /// Renderer used when the preferred one is unavailable.
    #[arg(long, value_enum, default_value_t = Renderer::Canvas, env = "VIEWER_FALLBACK_RENDERER")]
    pub fallback_renderer: Renderer,

    /// Files inspected when looking for an image in a plain item.
    #[arg(long, default_value_t = DEFAULT_FILE_LOOKUP_LIMIT, env = "VIEWER_FILE_LOOKUP_LIMIT")]
    pub file_lookup_limit: u32,

    /// Annotation ids to display on top of the imagery.
    #[arg(long = "annotation")]
    pub annotations: Vec<String>,
}

impl ResolveConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.item_id.is_empty() {
            return Err("item id must not be empty".to_string());
        }
        if self.width == 0 || self.height == 0 {
            return Err("width and height must be greater than 0".to_string());
        }
        self.viewer_config().validate()
    }

    /// Library configuration derived from the arguments.
    pub fn viewer_config(&self) -> ViewerConfig {
        ViewerConfig::default()
            .with_renderer(RendererConfig {
                preferred: self.renderer,
                fallback: self.fallback_renderer,
            })
            .with_file_lookup_limit(self.file_lookup_limit)
    }
}

/// Arguments of the `check` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    /// Item to look up as part of the check.
    #[arg(long)]
    pub item: Option<String>,
}

impl Cli {
    /// Validate the global arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_root.is_empty() {
            return Err("API root is required. Set --api-root or VIEWER_API_ROOT".to_string());
        }
        url::Url::parse(&self.api_root)
            .map_err(|e| format!("Invalid API root '{}': {}", self.api_root, e))?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
