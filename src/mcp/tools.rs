//! MCP Tools Implementation
//!
//! The mock full-stack tools exposed to assistants. None of them perform I/O:
//! each handler echoes its arguments back through a fixed template or a mock
//! JSON result.

use crate::mcp::McpServer;
use crate::mcp::protocol::*;
use crate::mcp::server::ToolHandler;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use tracing::debug;

type Arguments = HashMap<String, Value>;

/// A supplied argument is echoed as given, whatever its JSON type
fn required<'a>(args: &'a Arguments, key: &str) -> Result<&'a Value> {
    args.get(key)
        .ok_or_else(|| anyhow!("Missing required parameter: {}", key))
}

fn optional(args: &Arguments, key: &str, default: Value) -> Value {
    args.get(key).cloned().unwrap_or(default)
}

/// Text form of an argument: strings raw, anything else as compact JSON
fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `null`, `false`, zero and empty strings, arrays and objects
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// Wrap a mock result in the fenced JSON block every JSON-returning tool uses
fn json_block(heading: &str, result: &Value) -> Result<CallToolResult> {
    let body = serde_json::to_string_pretty(result)?;
    Ok(CallToolResult::text(format!(
        "{}:\n```json\n{}\n```",
        heading, body
    )))
}

/// Generates a React component from a name, props and JSX body
pub struct CreateComponentHandler;

impl CreateComponentHandler {
    pub const NAME: &'static str = "create_nextjs_component";

    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: Self::NAME.to_string(),
            description: Some(
                "Create a new React component with TypeScript and Tailwind".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Component name"},
                    "props": {"type": "object", "description": "Component props"},
                    "content": {"type": "string", "description": "Component JSX content"}
                },
                "required": ["name", "content"]
            }),
        }
    }

    /// Render the component source
    ///
    /// String prop values are written as-is (they are TypeScript types);
    /// anything else is written as compact JSON.
    #[inline]
    pub fn render_component(name: &str, props: &Map<String, Value>, content: &str) -> String {
        let prop_lines = props
            .iter()
            .map(|(key, value)| match value {
                Value::String(ty) => format!("  {}: {}", key, ty),
                other => format!("  {}: {}", key, other),
            })
            .collect::<Vec<_>>()
            .join("\n");
        let prop_names = props.keys().map(String::as_str).collect::<Vec<_>>().join(", ");

        format!(
            "'use client'

import {{ useState }} from 'react'

interface {name}Props {{
{prop_lines}
}}

export function {name}({{ {prop_names} }}: {name}Props) {{
  return (
    <>
      {content}
    </>
  )
}}
"
        )
    }
}

#[async_trait]
impl ToolHandler for CreateComponentHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();

        let name = display(required(&args, "name")?);
        // Props that are not an object contribute no fields.
        let props = args
            .get("props")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let content = display(&optional(&args, "content", json!("// Component content")));

        debug!("Creating component {} with {} props", name, props.len());

        let code = Self::render_component(&name, &props, &content);
        Ok(CallToolResult::text(format!(
            "Created component {}:\n\n```typescript\n{}\n```",
            name, code
        )))
    }
}

/// Answers database queries with a mock success payload
pub struct QuerySupabaseHandler;

impl QuerySupabaseHandler {
    pub const NAME: &'static str = "query_supabase";

    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: Self::NAME.to_string(),
            description: Some("Query Supabase database".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "table": {"type": "string", "description": "Table name"},
                    "query": {
                        "type": "string",
                        "description": "Query type: select, insert, update, delete"
                    },
                    "filters": {"type": "object", "description": "Query filters"},
                    "data": {"type": "object", "description": "Data for insert/update"}
                },
                "required": ["table", "query"]
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for QuerySupabaseHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();

        let table = required(&args, "table")?;
        let operation = required(&args, "query")?;

        debug!(
            "Mock {} on table {} with filters {}",
            operation,
            table,
            optional(&args, "filters", json!({}))
        );

        let data = match args.get("data") {
            Some(data) if !is_blank(data) => data.clone(),
            _ => json!({"id": 1, "example": "data"}),
        };

        let result = json!({
            "status": "success",
            "operation": operation,
            "table": table,
            "affected_rows": 1,
            "data": data
        });

        json_block("Executed Supabase query", &result)
    }
}

/// Pretends to generate an image and run it through the converter
pub struct GenerateImageHandler;

impl GenerateImageHandler {
    pub const NAME: &'static str = "generate_and_process_image";

    const DEFAULT_QUALITY: i64 = 85;
    const UPLOAD_TARGET: &'static str = "supabase://images/ai-generated/image.webp";

    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: Self::NAME.to_string(),
            description: Some("Generate AI image and process through converter".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "prompt": {"type": "string", "description": "Image generation prompt"},
                    "size": {"type": "string", "enum": ["1024x1024", "1792x1024", "1024x1792"]},
                    "format": {"type": "string", "enum": ["webp", "jpeg", "png"]},
                    "quality": {"type": "integer", "minimum": 1, "maximum": 100}
                },
                "required": ["prompt"]
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for GenerateImageHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();

        let prompt = display(required(&args, "prompt")?);
        let size = optional(&args, "size", json!("1024x1024"));
        let format = optional(&args, "format", json!("webp"));
        let quality = optional(&args, "quality", json!(Self::DEFAULT_QUALITY));

        debug!("Mock image generation: size={}, format={}", size, format);

        let result = json!({
            "generated": format!("AI image from prompt: {}", prompt),
            "size": size,
            "processed": {
                "format": format,
                "quality": quality,
                "optimized": true
            },
            "uploaded_to": Self::UPLOAD_TARGET
        });

        json_block("Generated and processed image", &result)
    }
}

/// Reports a deployment to the requested environment
pub struct DeployHandler;

impl DeployHandler {
    pub const NAME: &'static str = "deploy_to_vercel";

    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: Self::NAME.to_string(),
            description: Some("Deploy the application to Vercel".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "environment": {"type": "string", "enum": ["preview", "production"]},
                    "message": {"type": "string", "description": "Deployment message"}
                },
                "required": ["environment"]
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for DeployHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();

        let environment = required(&args, "environment")?;
        let message = optional(&args, "message", json!("Deployed via MCP"));

        debug!("Mock deployment to {}", environment);

        let result = json!({
            "status": "deployed",
            "environment": environment,
            "url": format!("https://your-app-{}.vercel.app", display(environment)),
            "message": message
        });

        json_block("Deployment complete", &result)
    }
}

/// Register the four stack tools, in the order clients see them listed
#[inline]
pub async fn register_stack_tools(server: &McpServer) {
    server
        .register_tool(
            CreateComponentHandler::tool_definition(),
            CreateComponentHandler,
        )
        .await;
    server
        .register_tool(QuerySupabaseHandler::tool_definition(), QuerySupabaseHandler)
        .await;
    server
        .register_tool(GenerateImageHandler::tool_definition(), GenerateImageHandler)
        .await;
    server
        .register_tool(DeployHandler::tool_definition(), DeployHandler)
        .await;
}
