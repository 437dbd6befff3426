//! MCP server implementation for battery pack sizing.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Handling tool calls and other requests
//! 3. **Shutdown**: EOF on stdin, SIGINT or SIGTERM
//!
//! # Tools
//!
//! - `size_pack_direct`: smallest S and P by ceiling division
//! - `size_pack_by_preference`: bounded S×P search under a layout preference
//! - `render_pack_schematic`: ASCII diagram of an S×P grid

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::config::{Config, DefaultsConfig};
use crate::mcp::protocol::{
    parse_message, ErrorCode, IncomingMessage, JsonRpcError, JsonRpcErrorData,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION,
    SERVER_NAME,
};
use crate::mcp::transport::StdioTransport;
use crate::pack::{
    report, CapacityUnit, LayoutPreference, PackInputs, PackRequirement, PackSizer, PackSizing,
    SizingError,
};
use crate::schematic::{self, SchematicOptions, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH};

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<Value>,
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Creates a successful result holding pretty-printed JSON.
    #[must_use]
    pub fn json(value: &Value) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::text(text),
            Err(e) => Self::error(format!("Failed to serialise result: {e}")),
        }
    }

    /// Returns the text of the first content item.
    #[must_use]
    pub fn first_text(&self) -> &str {
        match self.content.first() {
            Some(ToolContent::Text { text }) => text.as_str(),
            None => "",
        }
    }
}

/// Settings the server applies to every tool call.
#[derive(Debug, Clone, Default)]
pub struct ServerSettings {
    /// Sizer carrying the search bounds.
    pub sizer: PackSizer,
    /// Values used for omitted optional inputs.
    pub defaults: DefaultsConfig,
    /// Schematic limits used when the caller gives none.
    pub schematic: SchematicOptions,
}

impl ServerSettings {
    /// Builds server settings from a validated configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            sizer: PackSizer::with_bounds(config.search.bounds()),
            defaults: config.defaults.clone(),
            schematic: config.schematic.options(),
        }
    }
}

/// The MCP server for battery pack sizing.
pub struct McpServer<R = tokio::io::BufReader<tokio::io::Stdin>, W = tokio::io::Stdout> {
    /// Current server state.
    state: ServerState,
    /// The transport layer.
    transport: StdioTransport<R, W>,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
    /// Sizing defaults and limits.
    settings: ServerSettings,
}

impl McpServer {
    /// Creates a new MCP server on stdin/stdout.
    #[must_use]
    pub fn new(settings: ServerSettings) -> Self {
        Self::with_transport(settings, StdioTransport::new())
    }
}

impl<R, W> McpServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new MCP server on the given transport.
    #[must_use]
    pub const fn with_transport(settings: ServerSettings, transport: StdioTransport<R, W>) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport,
            protocol_version: None,
            settings,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Consumes the server and returns the transport.
    pub fn into_transport(self) -> StdioTransport<R, W> {
        self.transport
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Runs the main loop until the input is exhausted, without signal handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run_until_eof(&mut self) -> std::io::Result<()> {
        loop {
            let line_result = self.transport.read_line().await;
            if self.handle_transport_result(line_result).await? {
                return Ok(());
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(std::io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(std::io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles the result from transport read.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: std::io::Result<Option<String>>,
    ) -> std::io::Result<bool> {
        let Some(line) = line_result? else {
            tracing::info!("Input closed, shutting down");
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        match parse_message(&line) {
            Ok(IncomingMessage::Request(req)) => {
                let response = self.handle_request(&req);
                match response {
                    Ok(resp) => self.transport.write_message(&resp).await?,
                    Err(error) => self.transport.write_message(&error).await?,
                }
            }
            Ok(IncomingMessage::Notification(notif)) => self.handle_notification(&notif),
            Err(error) => self.transport.write_message(&error).await?,
        }

        Ok(self.state == ServerState::ShuttingDown)
    }

    /// Dispatches a request to its handler.
    fn handle_request(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        tracing::debug!(id = %req.id, method = %req.method, "Request received");

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req),
            "tools/list" => self.handle_tools_list(req),
            "tools/call" => self.handle_tools_call(req),
            "ping" => Ok(JsonRpcResponse::success(req.id.clone(), json!({}))),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        }
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            tracing::info!("Client initialised, server running");
            self.state = ServerState::Running;
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::invalid_request(
                Some(req.id.clone()),
                "Server already initialised",
            ));
        }

        let params: InitializeParams = req.parse_params("initialize")?;
        tracing::info!(
            client_version = %params.protocol_version,
            "Initialising MCP session"
        );

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();
        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Initialising;

        let capabilities = ServerCapabilities {
            tools: ToolCapabilities::default(),
        };
        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": capabilities,
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let result = json!({
            "tools": tool_definitions(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/call request.
    fn handle_tools_call(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ToolCallParams = req.parse_params("tool call")?;
        tracing::info!(tool = %params.name, "Tool call");

        let result = call_tool(&self.settings, &params.name, &params.arguments);

        let result_value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(
                req.id.clone(),
                "Internal error: failed to serialise result",
            )
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), result_value))
    }

    /// Ensures the server is in the Running state.
    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::new(
                Some(id.clone()),
                JsonRpcErrorData::with_message(ErrorCode::InvalidRequest, "Server not initialised"),
            ));
        }
        Ok(())
    }
}

/// Runs a tool by name.
///
/// Unknown tools and bad arguments come back as error results rather than
/// protocol errors, so the client can show them.
#[must_use]
pub fn call_tool(settings: &ServerSettings, name: &str, arguments: &Value) -> ToolCallResult {
    match name {
        "size_pack_direct" => call_size_pack_direct(settings, arguments),
        "size_pack_by_preference" => call_size_pack_by_preference(settings, arguments),
        "render_pack_schematic" => call_render_pack_schematic(settings, arguments),
        _ => ToolCallResult::error(format!("Unknown tool: {name}")),
    }
}

/// Returns the list of available tools.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    let pack_properties = json!({
        "target_capacity": {
            "type": "number",
            "description": "Usable capacity the pack must deliver after losses"
        },
        "capacity_unit": {
            "type": "string",
            "enum": ["mAh", "Ah"],
            "description": "Unit of target_capacity (default: from config, normally mAh)"
        },
        "target_voltage": {
            "type": "number",
            "description": "Minimum pack voltage in volts"
        },
        "cell_capacity_mah": {
            "type": "number",
            "description": "Rated capacity of a single cell in mAh"
        },
        "cell_voltage": {
            "type": "number",
            "description": "Nominal voltage of a single cell in volts (e.g. 3.6 or 3.7 for Li-ion)"
        },
        "loss_percent": {
            "type": "number",
            "description": "System losses in percent, 0 <= loss < 100 (default: 20)"
        },
        "variation_percent": {
            "type": "number",
            "description": "Share of the rated cell capacity actually delivered, in percent (default: 100)"
        },
        "include_schematic": {
            "type": "boolean",
            "description": "Also return an ASCII schematic of the layout (default: false)"
        }
    });
    let pack_required = json!(["target_capacity", "target_voltage", "cell_capacity_mah", "cell_voltage"]);

    let mut preference_properties = pack_properties.clone();
    if let Some(props) = preference_properties.as_object_mut() {
        props.insert(
            "preference".to_string(),
            json!({
                "type": "string",
                "enum": ["balanced", "more-series", "more-parallel"],
                "description": "balanced: fewest cells; more-series: longest series string; \
                                more-parallel: most parallel strings"
            }),
        );
    }

    vec![
        ToolDefinition {
            name: "size_pack_direct",
            description: "Work out how many cylindrical cells a battery pack needs. Returns the \
                          smallest series count (S) that reaches the target voltage and the \
                          smallest parallel count (P) that covers the target capacity after \
                          losses, with total cells, required capacity and pack energy in Wh.",
            input_schema: json!({
                "type": "object",
                "properties": pack_properties,
                "required": pack_required,
            }),
        },
        ToolDefinition {
            name: "size_pack_by_preference",
            description: "Search every layout up to the configured S×P bound (20×20 by \
                          default) and return the one that meets both targets and best fits \
                          the layout preference. The result's status field is \"success\" \
                          with the chosen layout, or \"infeasible\" when nothing in the \
                          bound meets the targets (not an error).",
            input_schema: json!({
                "type": "object",
                "properties": preference_properties,
                "required": ["target_capacity", "target_voltage", "cell_capacity_mah", "cell_voltage", "preference"],
            }),
        },
        ToolDefinition {
            name: "render_pack_schematic",
            description: "Render an ASCII schematic of a pack with the given series and \
                          parallel counts. Long strings and tall packs are shortened to fit.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "series_count": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Cells per series string (S)"
                    },
                    "parallel_count": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Number of parallel strings (P)"
                    },
                    "max_width": {
                        "type": "integer",
                        "minimum": MIN_WIDTH,
                        "maximum": MAX_WIDTH,
                        "description": "Optional: maximum diagram width in characters (clamped to the allowed range)"
                    },
                    "max_height": {
                        "type": "integer",
                        "minimum": MIN_HEIGHT,
                        "maximum": MAX_HEIGHT,
                        "description": "Optional: maximum diagram height in lines (clamped to the allowed range)"
                    }
                },
                "required": ["series_count", "parallel_count"]
            }),
        },
    ]
}

fn call_size_pack_direct(settings: &ServerSettings, arguments: &Value) -> ToolCallResult {
    let req = match parse_requirement(&settings.defaults, arguments) {
        Ok(req) => req,
        Err(message) => return ToolCallResult::error(message),
    };

    match settings.sizer.size_direct(&req) {
        Ok(sizing) => {
            let mut result = sizing_json("direct", &req, &sizing);
            attach_schematic(&mut result, settings, arguments, &sizing);
            ToolCallResult::json(&result)
        }
        Err(e) => sizing_failed(&e),
    }
}

fn call_size_pack_by_preference(settings: &ServerSettings, arguments: &Value) -> ToolCallResult {
    let Some(preference_str) = arguments.get("preference").and_then(Value::as_str) else {
        return ToolCallResult::error("Missing required parameter: preference");
    };
    let Some(preference) = LayoutPreference::from_str_loose(preference_str) else {
        return ToolCallResult::error(format!(
            "Invalid preference '{preference_str}'. Valid preferences: balanced, more-series, more-parallel"
        ));
    };

    let req = match parse_requirement(&settings.defaults, arguments) {
        Ok(req) => req,
        Err(message) => return ToolCallResult::error(message),
    };

    match settings.sizer.size_by_preference(&req, preference) {
        Ok(Some(sizing)) => {
            let mut result = sizing_json("preference", &req, &sizing);
            result["preference"] = json!(preference.to_string());
            result["feasible"] = json!(true);
            attach_schematic(&mut result, settings, arguments, &sizing);
            ToolCallResult::json(&result)
        }
        Ok(None) => {
            let bounds = settings.sizer.bounds();
            ToolCallResult::json(&json!({
                "status": "infeasible",
                "mode": "preference",
                "preference": preference.to_string(),
                "feasible": false,
                "requirement": req,
                "search_bounds": bounds,
                "message": format!(
                    "No layout up to {}S{}P meets both the voltage and capacity targets",
                    bounds.max_series, bounds.max_parallel
                ),
            }))
        }
        Err(e) => sizing_failed(&e),
    }
}

fn call_render_pack_schematic(settings: &ServerSettings, arguments: &Value) -> ToolCallResult {
    let series = match require_count(arguments, "series_count") {
        Ok(n) => n,
        Err(message) => return ToolCallResult::error(message),
    };
    let parallel = match require_count(arguments, "parallel_count") {
        Ok(n) => n,
        Err(message) => return ToolCallResult::error(message),
    };

    let options = schematic_options(settings, arguments);
    let render = schematic::render_ascii(series, parallel, &options);

    ToolCallResult::json(&json!({
        "status": "success",
        "series_count": series,
        "parallel_count": parallel,
        "total_cells": u64::from(series) * u64::from(parallel),
        "max_width": options.max_width,
        "max_height": options.max_height,
        "render": render,
    }))
}

/// Builds a requirement from tool arguments, filling omitted optional values
/// from the configured defaults.
fn parse_requirement(defaults: &DefaultsConfig, arguments: &Value) -> Result<PackRequirement, String> {
    let capacity_unit = match arguments.get("capacity_unit") {
        None | Some(Value::Null) => defaults.capacity_unit,
        Some(value) => value
            .as_str()
            .and_then(CapacityUnit::from_str_loose)
            .ok_or_else(|| format!("Invalid capacity_unit {value}. Valid units: mAh, Ah"))?,
    };

    let inputs = PackInputs {
        target_capacity: require_number(arguments, "target_capacity")?,
        capacity_unit,
        target_voltage_v: require_number(arguments, "target_voltage")?,
        cell_capacity_mah: require_number(arguments, "cell_capacity_mah")?,
        cell_nominal_voltage_v: require_number(arguments, "cell_voltage")?,
        loss_percent: optional_number(arguments, "loss_percent", defaults.loss_percent)?,
        variation_percent: optional_number(
            arguments,
            "variation_percent",
            defaults.variation_percent,
        )?,
    };

    inputs.to_requirement().map_err(|e| format!("Invalid input: {e}"))
}

fn require_number(arguments: &Value, name: &str) -> Result<f64, String> {
    match arguments.get(name) {
        None | Some(Value::Null) => Err(format!("Missing required parameter: {name}")),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| format!("Parameter {name} must be a number")),
    }
}

fn optional_number(arguments: &Value, name: &str, default: f64) -> Result<f64, String> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(_) => require_number(arguments, name),
    }
}

fn require_count(arguments: &Value, name: &str) -> Result<u32, String> {
    let Some(value) = arguments.get(name) else {
        return Err(format!("Missing required parameter: {name}"));
    };
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| n >= 1)
        .ok_or_else(|| format!("Parameter {name} must be a positive integer"))
}

fn schematic_options(settings: &ServerSettings, arguments: &Value) -> SchematicOptions {
    let limit = |name: &str, default: usize| {
        arguments
            .get(name)
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(default)
    };

    SchematicOptions {
        max_width: limit("max_width", settings.schematic.max_width),
        max_height: limit("max_height", settings.schematic.max_height),
    }
    .clamped()
}

fn sizing_json(mode: &str, req: &PackRequirement, sizing: &PackSizing) -> Value {
    json!({
        "status": "success",
        "mode": mode,
        "layout": sizing.layout(),
        "requirement": req,
        "sizing": sizing,
        "summary": report::summary(req, sizing),
    })
}

fn attach_schematic(
    result: &mut Value,
    settings: &ServerSettings,
    arguments: &Value,
    sizing: &PackSizing,
) {
    let wanted = arguments
        .get("include_schematic")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if wanted {
        let options = schematic_options(settings, arguments);
        result["schematic"] = json!(schematic::render_ascii(
            sizing.series_count,
            sizing.parallel_count,
            &options
        ));
    }
}

fn sizing_failed(error: &SizingError) -> ToolCallResult {
    tracing::warn!(error = %error, "Pack sizing failed");
    ToolCallResult::error(format!("Sizing failed: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_args() -> Value {
        json!({
            "target_capacity": 10000,
            "target_voltage": 36,
            "cell_capacity_mah": 3000,
            "cell_voltage": 3.7,
            "loss_percent": 20
        })
    }

    fn parse_result(result: &ToolCallResult) -> Value {
        serde_json::from_str(result.first_text()).unwrap()
    }

    #[test]
    fn server_initial_state() {
        let server = McpServer::new(ServerSettings::default());
        assert_eq!(server.state(), ServerState::AwaitingInit);
        assert_eq!(server.protocol_version(), None);
    }

    #[test]
    fn tool_definitions_valid() {
        let tools = tool_definitions();
        assert_eq!(tools.len(), 3);

        for tool in &tools {
            assert!(!tool.name.is_empty());
            assert!(tool.input_schema.is_object());
            assert!(tool.input_schema["required"].is_array());
        }
    }

    #[test]
    fn tool_call_result_text() {
        let result = ToolCallResult::text("Hello, world!");
        assert!(!result.is_error);
        assert_eq!(result.first_text(), "Hello, world!");
    }

    #[test]
    fn tool_call_result_error() {
        let result = ToolCallResult::error("Something went wrong");
        assert!(result.is_error);
        assert_eq!(result.first_text(), "Something went wrong");
    }

    #[test]
    fn direct_tool_sizes_scenario() {
        let result = call_tool(&ServerSettings::default(), "size_pack_direct", &scenario_args());
        assert!(!result.is_error, "{}", result.first_text());

        let value = parse_result(&result);
        assert_eq!(value["layout"], "10S5P");
        assert_eq!(value["sizing"]["total_cells"], 50);
        assert!((value["sizing"]["pack_energy_wh"].as_f64().unwrap() - 555.0).abs() < 1e-9);
        assert!(value.get("schematic").is_none());
    }

    #[test]
    fn direct_tool_uses_default_loss() {
        let mut args = scenario_args();
        args.as_object_mut().unwrap().remove("loss_percent");

        let value = parse_result(&call_tool(
            &ServerSettings::default(),
            "size_pack_direct",
            &args,
        ));
        assert!((value["requirement"]["loss_percent"].as_f64().unwrap() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn direct_tool_converts_amp_hours() {
        let mut args = scenario_args();
        args["target_capacity"] = json!(10);
        args["capacity_unit"] = json!("Ah");

        let value = parse_result(&call_tool(
            &ServerSettings::default(),
            "size_pack_direct",
            &args,
        ));
        assert_eq!(value["layout"], "10S5P");
    }

    #[test]
    fn direct_tool_attaches_schematic() {
        let mut args = scenario_args();
        args["include_schematic"] = json!(true);

        let value = parse_result(&call_tool(
            &ServerSettings::default(),
            "size_pack_direct",
            &args,
        ));
        let render = value["schematic"].as_str().unwrap();
        assert!(render.starts_with("Pack: 10S5P (50 cells)"));
    }

    #[test]
    fn direct_tool_reports_invalid_loss() {
        let mut args = scenario_args();
        args["loss_percent"] = json!(100);

        let result = call_tool(&ServerSettings::default(), "size_pack_direct", &args);
        assert!(result.is_error);
        assert!(result.first_text().contains("loss percentage"));
    }

    #[test]
    fn direct_tool_reports_missing_parameter() {
        let result = call_tool(
            &ServerSettings::default(),
            "size_pack_direct",
            &json!({"target_capacity": 1000}),
        );
        assert!(result.is_error);
        assert!(result.first_text().contains("target_voltage"));
    }

    #[test]
    fn direct_tool_rejects_string_number() {
        let mut args = scenario_args();
        args["cell_voltage"] = json!("3.7");

        let result = call_tool(&ServerSettings::default(), "size_pack_direct", &args);
        assert!(result.is_error);
        assert!(result.first_text().contains("must be a number"));
    }

    #[test]
    fn preference_tool_more_series() {
        let mut args = scenario_args();
        args["preference"] = json!("more-series");

        let value = parse_result(&call_tool(
            &ServerSettings::default(),
            "size_pack_by_preference",
            &args,
        ));
        assert_eq!(value["feasible"], true);
        assert_eq!(value["layout"], "20S5P");
        assert_eq!(value["preference"], "more-series");
    }

    #[test]
    fn preference_tool_reports_infeasible() {
        let mut args = scenario_args();
        args["target_voltage"] = json!(1000);
        args["preference"] = json!("balanced");

        let result = call_tool(&ServerSettings::default(), "size_pack_by_preference", &args);
        assert!(!result.is_error);

        let value = parse_result(&result);
        assert_eq!(value["feasible"], false);
        assert_eq!(value["status"], "infeasible");
        assert_eq!(value["search_bounds"]["max_series"], 20);
    }

    #[test]
    fn preference_tool_rejects_unknown_preference() {
        let mut args = scenario_args();
        args["preference"] = json!("square");

        let result = call_tool(&ServerSettings::default(), "size_pack_by_preference", &args);
        assert!(result.is_error);
        assert!(result.first_text().contains("square"));
    }

    #[test]
    fn schematic_tool_renders() {
        let result = call_tool(
            &ServerSettings::default(),
            "render_pack_schematic",
            &json!({"series_count": 3, "parallel_count": 2}),
        );
        let value = parse_result(&result);
        assert_eq!(value["total_cells"], 6);
        assert!(value["render"]
            .as_str()
            .unwrap()
            .contains("(+)-+-[#]-[#]-[#]-+-(-)"));
    }

    #[test]
    fn schematic_tool_caps_requested_limits() {
        let result = call_tool(
            &ServerSettings::default(),
            "render_pack_schematic",
            &json!({
                "series_count": 3000,
                "parallel_count": 3000,
                "max_width": 1_000_000_000_u64,
                "max_height": 1_000_000_000_u64
            }),
        );
        assert!(!result.is_error);

        let value = parse_result(&result);
        assert_eq!(value["max_width"], MAX_WIDTH);
        assert_eq!(value["max_height"], MAX_HEIGHT);
        assert_eq!(value["total_cells"], 9_000_000);

        let render = value["render"].as_str().unwrap();
        assert!(render.lines().count() <= MAX_HEIGHT + 2);
        assert!(render.len() < (MAX_WIDTH + 1) * (MAX_HEIGHT + 2));
    }

    #[test]
    fn preference_tool_description_names_status() {
        let tools = tool_definitions();
        let search = tools
            .iter()
            .find(|tool| tool.name == "size_pack_by_preference")
            .unwrap();
        assert!(search.description.contains("status"));
        assert!(search.description.contains("infeasible"));
    }

    #[test]
    fn schematic_tool_rejects_zero_count() {
        let result = call_tool(
            &ServerSettings::default(),
            "render_pack_schematic",
            &json!({"series_count": 0, "parallel_count": 2}),
        );
        assert!(result.is_error);
        assert!(result.first_text().contains("series_count"));
    }

    #[test]
    fn unknown_tool() {
        let result = call_tool(&ServerSettings::default(), "make_coffee", &json!({}));
        assert!(result.is_error);
        assert_eq!(result.first_text(), "Unknown tool: make_coffee");
    }
}
