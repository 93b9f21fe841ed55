//! Static stack resources
//!
//! Three read-only documents describing the application stack. Payloads are
//! fixed at compile time; nothing is read from disk.

use crate::mcp::McpServer;
use crate::mcp::protocol::{Resource, ResourceContents};
use crate::mcp::server::ResourceHandler;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

pub const CONFIG_URI: &str = "stack://config";
pub const SCHEMA_URI: &str = "stack://schema";
pub const COMPONENTS_URI: &str = "stack://components";

const PRODUCT_SCHEMA: &str = "model Product {
  id          String   @id @default(cuid())
  name        String
  description String?
  price       Decimal  @db.Decimal(10, 2)
  image       String?
  createdAt   DateTime @default(now())
  updatedAt   DateTime @updatedAt
}";

/// Which of the stack documents a handler serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackResource {
    Config,
    Schema,
    Components,
}

impl StackResource {
    pub const ALL: [Self; 3] = [Self::Config, Self::Schema, Self::Components];

    #[inline]
    pub fn uri(self) -> &'static str {
        match self {
            Self::Config => CONFIG_URI,
            Self::Schema => SCHEMA_URI,
            Self::Components => COMPONENTS_URI,
        }
    }

    #[inline]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Config | Self::Components => "application/json",
            Self::Schema => "text/plain",
        }
    }

    #[inline]
    pub fn definition(self) -> Resource {
        let (name, description) = match self {
            Self::Config => (
                "Stack Configuration",
                "Current stack configuration and environment",
            ),
            Self::Schema => ("Database Schema", "Prisma database schema"),
            Self::Components => ("Component Library", "Available UI components"),
        };

        Resource {
            uri: self.uri().to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            mime_type: Some(self.mime_type().to_string()),
        }
    }

    /// Render the document body
    #[inline]
    pub fn render(self) -> Result<String> {
        let text = match self {
            Self::Config => serde_json::to_string_pretty(&json!({
                "framework": "Next.js 15",
                "ui": "Tailwind CSS + shadcn/ui",
                "database": "Supabase (PostgreSQL)",
                "orm": "Prisma",
                "ai": ["Claude API", "OpenAI DALL-E 3"],
                "deployment": "Vercel"
            }))?,
            Self::Schema => PRODUCT_SCHEMA.to_string(),
            Self::Components => serde_json::to_string_pretty(&json!({
                "ui": ["Button", "Card", "Dialog", "Form", "Table"],
                "custom": ["ImageConverter", "AIGenerator", "ProductCard"],
                "layouts": ["Header", "Footer", "Sidebar"]
            }))?,
        };
        Ok(text)
    }
}

#[async_trait]
impl ResourceHandler for StackResource {
    #[inline]
    async fn handle(&self, uri: &str) -> Result<ResourceContents> {
        Ok(ResourceContents {
            uri: uri.to_string(),
            mime_type: Some(self.mime_type().to_string()),
            text: self.render()?,
        })
    }
}

/// Register the stack resources with the server
#[inline]
pub async fn register_stack_resources(server: &McpServer) {
    for resource in StackResource::ALL {
        server
            .register_resource(resource.definition(), resource)
            .await;
    }
}
