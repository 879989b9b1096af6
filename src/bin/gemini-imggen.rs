use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use gemini_imggen::{
    logging::LoggingConfig, GeminiHttpClient, ImagePipeline, McpServer, ServerConfig,
    ToolRegistry, GENERATE_FROM_IMAGE, GENERATE_FROM_TEXT,
};
use serde_json::json;

#[derive(Parser)]
#[command(
    name = "gemini-imggen",
    version,
    about = "Gemini image generation MCP server",
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve MCP over stdio (default)
    Serve,
    /// Print the tool catalogue as JSON
    Tools {
        #[arg(long)]
        compact: bool,
    },
    /// Generate an image from a text prompt and print its path
    Generate {
        #[arg(long)]
        prompt: String,
    },
    /// Generate an image from an input image and a prompt and print its path
    Transform {
        #[arg(long)]
        input_image: PathBuf,
        #[arg(long)]
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    LoggingConfig::init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => handle_serve().await?,
        Command::Tools { compact } => handle_tools(compact)?,
        Command::Generate { prompt } => {
            handle_call(GENERATE_FROM_TEXT, json!({ "prompt": prompt })).await?
        }
        Command::Transform {
            input_image,
            prompt,
        } => {
            handle_call(
                GENERATE_FROM_IMAGE,
                json!({
                    "input_image_path": input_image.to_string_lossy(),
                    "prompt": prompt,
                }),
            )
            .await?
        }
    }
    Ok(())
}

fn build_pipeline() -> anyhow::Result<ImagePipeline> {
    let config = ServerConfig::from_env()?;
    let client = GeminiHttpClient::from_config(&config)?;
    Ok(ImagePipeline::new(&config, Arc::new(client))?)
}

async fn handle_serve() -> anyhow::Result<()> {
    let server = McpServer::new(build_pipeline()?);
    server.serve_stdio().await?;
    Ok(())
}

fn handle_tools(compact: bool) -> anyhow::Result<()> {
    let tools: Vec<_> = ToolRegistry::new()
        .list_tools()
        .iter()
        .map(|manifest| manifest.descriptor())
        .collect();
    let value = json!(tools);

    let content = if compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    println!("{content}");
    Ok(())
}

async fn handle_call(tool: &str, arguments: serde_json::Value) -> anyhow::Result<()> {
    let pipeline = build_pipeline()?;
    let path = pipeline.call_tool(tool, arguments).await?;
    println!("{path}");
    Ok(())
}
