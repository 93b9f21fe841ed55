//! MCP tool and server unit tests

#[cfg(test)]
mod tool_definition_tests {
    use crate::mcp::tools::{
        CreateComponentHandler, DeployHandler, GenerateImageHandler, QuerySupabaseHandler,
    };

    #[test]
    fn create_component_tool_definition() {
        let tool = CreateComponentHandler::tool_definition();

        assert_eq!(tool.name, "create_nextjs_component");
        assert_eq!(
            tool.description,
            Some("Create a new React component with TypeScript and Tailwind".to_string())
        );

        let schema = tool.input_schema;
        let properties = schema["properties"].as_object().expect("has properties");
        assert!(properties.contains_key("name"));
        assert!(properties.contains_key("props"));
        assert!(properties.contains_key("content"));

        let required = schema["required"].as_array().expect("has required array");
        assert_eq!(required.len(), 2);
        assert_eq!(required[0], "name");
        assert_eq!(required[1], "content");
    }

    #[test]
    fn query_supabase_tool_definition() {
        let tool = QuerySupabaseHandler::tool_definition();
        let schema = tool.input_schema;

        assert_eq!(tool.name, "query_supabase");
        assert_eq!(schema["properties"]["filters"]["type"], "object");
        assert_eq!(schema["required"], serde_json::json!(["table", "query"]));
    }

    #[test]
    fn image_tool_enumerates_sizes_and_formats() {
        let schema = GenerateImageHandler::tool_definition().input_schema;

        let sizes = schema["properties"]["size"]["enum"]
            .as_array()
            .expect("size enum");
        assert_eq!(sizes.len(), 3);
        assert_eq!(schema["properties"]["format"]["enum"][2], "png");
        assert_eq!(schema["properties"]["quality"]["minimum"], 1);
        assert_eq!(schema["properties"]["quality"]["maximum"], 100);
    }

    #[test]
    fn deploy_tool_requires_environment() {
        let tool = DeployHandler::tool_definition();

        assert_eq!(tool.name, "deploy_to_vercel");
        assert_eq!(
            tool.input_schema["properties"]["environment"]["enum"],
            serde_json::json!(["preview", "production"])
        );
        assert_eq!(tool.input_schema["required"][0], "environment");
    }
}

#[cfg(test)]
mod tool_handler_tests {
    use crate::mcp::protocol::{CallToolParams, CallToolResult, ToolContent};
    use crate::mcp::server::ToolHandler;
    use crate::mcp::tools::{
        CreateComponentHandler, DeployHandler, GenerateImageHandler, QuerySupabaseHandler,
    };
    use serde_json::{Value, json};

    fn params(name: &str, arguments: Value) -> CallToolParams {
        serde_json::from_value(json!({"name": name, "arguments": arguments}))
            .expect("valid call params")
    }

    fn text_of(result: &CallToolResult) -> &str {
        assert_eq!(result.content.len(), 1);
        let ToolContent::Text { text } = &result.content[0];
        text
    }

    /// Pull the JSON document out of a fenced ```json block
    fn fenced_json(text: &str) -> Value {
        let start = text.find("```json\n").expect("opening fence") + "```json\n".len();
        let end = text.rfind("\n```").expect("closing fence");
        serde_json::from_str(text.get(start..end).expect("fence bounds")).expect("valid json")
    }

    #[tokio::test]
    async fn component_echoes_name_and_props() {
        let result = CreateComponentHandler
            .handle(params(
                "create_nextjs_component",
                json!({
                    "name": "PriceTag",
                    "props": {"amount": "number", "currency": "string"},
                    "content": "<span>{amount} {currency}</span>"
                }),
            ))
            .await
            .expect("component renders");

        assert_eq!(result.is_error, Some(false));
        let text = text_of(&result);
        assert!(text.starts_with("Created component PriceTag:\n\n```typescript\n'use client'"));
        assert!(text.contains("interface PriceTagProps {\n  amount: number\n  currency: string\n}"));
        assert!(
            text.contains("export function PriceTag({ amount, currency }: PriceTagProps) {")
        );
        assert!(text.contains("      <span>{amount} {currency}</span>\n"));
        assert!(text.ends_with("}\n\n```"));
    }

    #[tokio::test]
    async fn component_defaults_props_and_content() {
        let result = CreateComponentHandler
            .handle(params("create_nextjs_component", json!({"name": "Empty"})))
            .await
            .expect("component renders");

        let text = text_of(&result);
        assert!(text.contains("interface EmptyProps {\n\n}"));
        assert!(text.contains("export function Empty({  }: EmptyProps) {"));
        assert!(text.contains("// Component content"));
    }

    #[test]
    fn non_string_props_render_as_json() {
        let props = json!({"count": 3, "tags": ["a"]});
        let code = CreateComponentHandler::render_component(
            "Counter",
            props.as_object().expect("object"),
            "{count}",
        );

        assert!(code.contains("  count: 3\n  tags: [\"a\"]"));
    }

    #[tokio::test]
    async fn component_without_name_fails() {
        let result = CreateComponentHandler
            .handle(params("create_nextjs_component", json!({"content": "<div/>"})))
            .await;

        let err = result.expect_err("name is required");
        assert!(err.to_string().contains("name"));
    }

    #[tokio::test]
    async fn query_returns_mock_rows() {
        let result = QuerySupabaseHandler
            .handle(params(
                "query_supabase",
                json!({"table": "products", "query": "select"}),
            ))
            .await
            .expect("query succeeds");

        let text = text_of(&result);
        assert!(text.starts_with("Executed Supabase query:\n```json\n"));
        let body = fenced_json(text);
        assert_eq!(body["status"], "success");
        assert_eq!(body["operation"], "select");
        assert_eq!(body["table"], "products");
        assert_eq!(body["affected_rows"], 1);
        assert_eq!(body["data"], json!({"id": 1, "example": "data"}));
    }

    #[tokio::test]
    async fn query_echoes_supplied_data() {
        let result = QuerySupabaseHandler
            .handle(params(
                "query_supabase",
                json!({
                    "table": "products",
                    "query": "insert",
                    "data": {"name": "Lamp", "price": 12.5}
                }),
            ))
            .await
            .expect("query succeeds");

        let body = fenced_json(text_of(&result));
        assert_eq!(body["data"], json!({"name": "Lamp", "price": 12.5}));
    }

    #[tokio::test]
    async fn query_with_empty_data_uses_example_row() {
        let result = QuerySupabaseHandler
            .handle(params(
                "query_supabase",
                json!({"table": "orders", "query": "update", "data": {}}),
            ))
            .await
            .expect("query succeeds");

        let body = fenced_json(text_of(&result));
        assert_eq!(body["data"]["example"], "data");
    }

    #[tokio::test]
    async fn query_json_keeps_field_order() {
        let result = QuerySupabaseHandler
            .handle(params("query_supabase", json!({"table": "t", "query": "delete"})))
            .await
            .expect("query succeeds");

        let text = text_of(&result);
        let status = text.find("\"status\"").expect("status");
        let operation = text.find("\"operation\"").expect("operation");
        let data = text.find("\"data\"").expect("data");
        assert!(status < operation && operation < data);
        assert!(text.contains("\n  \"affected_rows\": 1,\n"));
    }

    #[tokio::test]
    async fn query_requires_table() {
        let result = QuerySupabaseHandler
            .handle(params("query_supabase", json!({"query": "select"})))
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn image_applies_defaults() {
        let result = GenerateImageHandler
            .handle(params(
                "generate_and_process_image",
                json!({"prompt": "a red bicycle"}),
            ))
            .await
            .expect("image succeeds");

        let text = text_of(&result);
        assert!(text.starts_with("Generated and processed image:\n"));
        let body = fenced_json(text);
        assert_eq!(body["generated"], "AI image from prompt: a red bicycle");
        assert_eq!(body["size"], "1024x1024");
        assert_eq!(body["processed"]["format"], "webp");
        assert_eq!(body["processed"]["quality"], 85);
        assert_eq!(body["processed"]["optimized"], true);
        assert_eq!(
            body["uploaded_to"],
            "supabase://images/ai-generated/image.webp"
        );
    }

    #[tokio::test]
    async fn image_honours_overrides() {
        let result = GenerateImageHandler
            .handle(params(
                "generate_and_process_image",
                json!({"prompt": "skyline", "size": "1792x1024", "format": "png", "quality": 40}),
            ))
            .await
            .expect("image succeeds");

        let body = fenced_json(text_of(&result));
        assert_eq!(body["size"], "1792x1024");
        assert_eq!(body["processed"]["format"], "png");
        assert_eq!(body["processed"]["quality"], 40);
    }

    #[tokio::test]
    async fn image_echoes_values_of_any_type() {
        let result = GenerateImageHandler
            .handle(params(
                "generate_and_process_image",
                json!({"prompt": "dunes", "size": 512, "quality": 90.5}),
            ))
            .await
            .expect("image succeeds");

        let body = fenced_json(text_of(&result));
        assert_eq!(body["size"], 512);
        assert_eq!(body["processed"]["quality"], 90.5);

        let result = GenerateImageHandler
            .handle(params(
                "generate_and_process_image",
                json!({"prompt": "dunes", "quality": "90"}),
            ))
            .await
            .expect("image succeeds");
        assert_eq!(fenced_json(text_of(&result))["processed"]["quality"], "90");
    }

    #[tokio::test]
    async fn query_echoes_non_object_data() {
        let result = QuerySupabaseHandler
            .handle(params(
                "query_supabase",
                json!({"table": "orders", "query": "insert", "data": [{"id": 7}]}),
            ))
            .await
            .expect("query succeeds");

        assert_eq!(fenced_json(text_of(&result))["data"], json!([{"id": 7}]));
    }

    #[tokio::test]
    async fn query_blank_data_uses_example_row() {
        for blank in [json!(null), json!([]), json!(""), json!(0), json!(false)] {
            let result = QuerySupabaseHandler
                .handle(params(
                    "query_supabase",
                    json!({"table": "orders", "query": "select", "data": blank}),
                ))
                .await
                .expect("query succeeds");

            assert_eq!(
                fenced_json(text_of(&result))["data"],
                json!({"id": 1, "example": "data"})
            );
        }
    }

    #[tokio::test]
    async fn deploy_builds_environment_url() {
        let result = DeployHandler
            .handle(params("deploy_to_vercel", json!({"environment": "preview"})))
            .await
            .expect("deploy succeeds");

        let text = text_of(&result);
        assert!(text.starts_with("Deployment complete:\n"));
        let body = fenced_json(text);
        assert_eq!(body["status"], "deployed");
        assert_eq!(body["environment"], "preview");
        assert_eq!(body["url"], "https://your-app-preview.vercel.app");
        assert_eq!(body["message"], "Deployed via MCP");
    }

    #[tokio::test]
    async fn deploy_keeps_custom_message() {
        let result = DeployHandler
            .handle(params(
                "deploy_to_vercel",
                json!({"environment": "production", "message": "release 1.2"}),
            ))
            .await
            .expect("deploy succeeds");

        let body = fenced_json(text_of(&result));
        assert_eq!(body["url"], "https://your-app-production.vercel.app");
        assert_eq!(body["message"], "release 1.2");
    }

    #[tokio::test]
    async fn handlers_accept_missing_arguments_object() {
        let call = CallToolParams {
            name: "deploy_to_vercel".to_string(),
            arguments: None,
        };

        let err = DeployHandler.handle(call).await.expect_err("environment required");
        assert!(err.to_string().contains("environment"));
    }
}

#[cfg(test)]
mod server_dispatch_tests {
    use crate::config::ServerConfig;
    use crate::mcp::build_stack_server;
    use crate::mcp::protocol::{CallToolParams, ToolContent};
    use crate::mcp::resources::{COMPONENTS_URI, CONFIG_URI, SCHEMA_URI};
    use crate::mcp::server::ConnectionState;

    #[tokio::test]
    async fn stack_server_registers_everything() {
        let server = build_stack_server(&ServerConfig::default()).await;
        let health = server.health_status().await;

        assert_eq!(health.tools_registered, 4);
        assert_eq!(health.resources_registered, 3);
        assert_eq!(health.connection_state, ConnectionState::Uninitialized);
        assert_eq!(server.server_info.name, "unified-stack");
    }

    #[tokio::test]
    async fn tools_listed_in_registration_order() {
        let server = build_stack_server(&ServerConfig::default()).await;
        let names: Vec<String> = server
            .tools
            .read()
            .await
            .iter()
            .map(|t| t.name.clone())
            .collect();

        assert_eq!(
            names,
            vec![
                "create_nextjs_component",
                "query_supabase",
                "generate_and_process_image",
                "deploy_to_vercel"
            ]
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_not_an_error() {
        let server = build_stack_server(&ServerConfig::default()).await;
        let result = server
            .call_tool(CallToolParams {
                name: "format_disk".to_string(),
                arguments: None,
            })
            .await
            .expect("unknown tool still answers");

        assert_eq!(result.is_error, Some(false));
        let ToolContent::Text { text } = &result.content[0];
        assert_eq!(text, "Unknown tool: format_disk");
    }

    #[tokio::test]
    async fn resources_read_back_their_payloads() {
        let server = build_stack_server(&ServerConfig::default()).await;

        let config = server.read_resource(CONFIG_URI).await.expect("config");
        assert!(config.text.contains("\"framework\": \"Next.js 15\""));
        assert_eq!(config.mime_type.as_deref(), Some("application/json"));

        let schema = server.read_resource(SCHEMA_URI).await.expect("schema");
        assert!(schema.text.starts_with("model Product {"));

        let components = server.read_resource(COMPONENTS_URI).await.expect("components");
        assert!(components.text.contains("\"ProductCard\""));
    }

    #[tokio::test]
    async fn unknown_resource_reports_not_found() {
        let server = build_stack_server(&ServerConfig::default()).await;
        let contents = server
            .read_resource("stack://secrets")
            .await
            .expect("unknown resource still answers");

        assert_eq!(contents.uri, "stack://secrets");
        assert_eq!(contents.text, "Resource not found: stack://secrets");
    }
}
