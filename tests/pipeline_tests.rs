mod common;

use std::fs;
use std::sync::Arc;

use anyhow::Result as AnyResult;
use base64::{engine::general_purpose, Engine as _};
use chrono::{TimeZone, Utc};
use gemini_imggen::{
    ErrorKind, ImagePipeline, InlinePayload, ModelPart, ModelResponse, Operation,
    ResponseModality, ServerConfig, GENERATE_FROM_IMAGE, GENERATE_FROM_TEXT,
};
use serde_json::json;
use tempfile::tempdir;

use common::{image_response, pipeline_for, RecordingClient};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3];

#[tokio::test]
async fn text_to_image_writes_decoded_base64_payload() -> AnyResult<()> {
    let out = tempdir()?;
    let encoded = general_purpose::STANDARD.encode(PNG_BYTES);
    let client = RecordingClient::responding(image_response(InlinePayload::Base64(encoded)));
    let pipeline = pipeline_for(out.path(), Arc::clone(&client));

    let path = pipeline
        .call_tool(GENERATE_FROM_TEXT, json!({"prompt": "a lighthouse at dusk"}))
        .await?;

    let written = std::path::Path::new(&path);
    assert!(written.is_absolute());
    assert!(path.ends_with(".png"));
    assert_eq!(written.parent(), Some(fs::canonicalize(out.path())?.as_path()));
    assert_eq!(fs::read(written)?, PNG_BYTES);

    let request = client.last_request().await.expect("model called");
    assert_eq!(request.model, "gemini-2.5-flash-image");
    assert_eq!(
        request.parts,
        vec![ModelPart::Text("a lighthouse at dusk".to_string())]
    );
    assert_eq!(request.response_modalities, vec![ResponseModality::Image]);
    Ok(())
}

#[tokio::test]
async fn raw_byte_payload_is_written_unchanged() -> AnyResult<()> {
    let out = tempdir()?;
    let client = RecordingClient::responding(image_response(InlinePayload::Bytes(
        PNG_BYTES.to_vec(),
    )));
    let pipeline = pipeline_for(out.path(), client);

    let path = pipeline
        .call_tool(GENERATE_FROM_TEXT, json!({"prompt": "raw"}))
        .await?;
    assert_eq!(fs::read(path)?, PNG_BYTES);
    Ok(())
}

#[tokio::test]
async fn relative_output_dir_still_yields_absolute_path() -> AnyResult<()> {
    let scratch = tempfile::tempdir_in(".")?;
    let relative = std::path::Path::new(".").join(scratch.path().file_name().expect("dir name"));
    assert!(relative.is_relative());

    let pipeline = pipeline_for(
        &relative,
        RecordingClient::responding(image_response(PNG_BYTES.to_vec().into())),
    );
    let path = pipeline
        .call_tool(GENERATE_FROM_TEXT, json!({"prompt": "relative"}))
        .await?;

    let written = std::path::Path::new(&path);
    assert!(written.is_absolute());
    assert_eq!(written.parent(), Some(fs::canonicalize(scratch.path())?.as_path()));
    assert_eq!(fs::read(written)?, PNG_BYTES);
    Ok(())
}

#[tokio::test]
async fn missing_output_dir_is_created_up_front() -> AnyResult<()> {
    let root = tempdir()?;
    let nested = root.path().join("renders").join("today");

    let pipeline = pipeline_for(
        &nested,
        RecordingClient::responding(image_response(PNG_BYTES.to_vec().into())),
    );
    assert!(nested.is_dir());

    let path = pipeline
        .call_tool(GENERATE_FROM_TEXT, json!({"prompt": "nested"}))
        .await?;
    assert_eq!(fs::read(path)?, PNG_BYTES);
    Ok(())
}

#[tokio::test]
async fn unusable_output_dir_is_a_config_error() -> AnyResult<()> {
    let root = tempdir()?;
    let blocker = root.path().join("not-a-dir");
    fs::write(&blocker, b"x")?;

    let config = ServerConfig::new("test-key", blocker.join("out"));
    let err = match ImagePipeline::new(&config, RecordingClient::responding(ModelResponse::default())) {
        Ok(_) => panic!("output dir under a regular file"),
        Err(err) => err,
    };
    assert_eq!(err.kind(), ErrorKind::Config);
    Ok(())
}

#[tokio::test]
async fn missing_prompt_fails_before_model_call() -> AnyResult<()> {
    let out = tempdir()?;
    let client = RecordingClient::responding(image_response(PNG_BYTES.to_vec().into()));
    let pipeline = pipeline_for(out.path(), Arc::clone(&client));

    let err = pipeline
        .call_tool(GENERATE_FROM_TEXT, json!({}))
        .await
        .expect_err("prompt missing");
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.operation(), Some(Operation::Generation));

    let input = out.path().join("source.png");
    fs::write(&input, PNG_BYTES)?;
    let err = pipeline
        .call_tool(
            GENERATE_FROM_IMAGE,
            json!({"input_image_path": input.to_string_lossy()}),
        )
        .await
        .expect_err("prompt missing");
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.operation(), Some(Operation::Transformation));

    assert_eq!(client.calls().await, 0);
    Ok(())
}

#[tokio::test]
async fn unknown_tool_is_rejected() -> AnyResult<()> {
    let out = tempdir()?;
    let client = RecordingClient::responding(ModelResponse::default());
    let pipeline = pipeline_for(out.path(), Arc::clone(&client));

    let err = pipeline
        .call_tool("generate_video", json!({"prompt": "x"}))
        .await
        .expect_err("unknown tool");
    assert_eq!(err.kind(), ErrorKind::UnknownTool);
    assert!(err.to_string().contains("generate_video"));
    assert_eq!(client.calls().await, 0);
    Ok(())
}

#[tokio::test]
async fn nonexistent_source_is_input_not_found() -> AnyResult<()> {
    let out = tempdir()?;
    let client = RecordingClient::responding(image_response(PNG_BYTES.to_vec().into()));
    let pipeline = pipeline_for(out.path(), Arc::clone(&client));

    let missing = out.path().join("does-not-exist.png");
    let err = pipeline
        .call_tool(
            GENERATE_FROM_IMAGE,
            json!({"input_image_path": missing.to_string_lossy(), "prompt": "p"}),
        )
        .await
        .expect_err("missing source");
    assert_eq!(err.kind(), ErrorKind::InputNotFound);
    assert_eq!(client.calls().await, 0);
    Ok(())
}

#[tokio::test]
async fn directory_source_is_input_not_a_file() -> AnyResult<()> {
    let out = tempdir()?;
    let client = RecordingClient::responding(image_response(PNG_BYTES.to_vec().into()));
    let pipeline = pipeline_for(out.path(), Arc::clone(&client));

    let err = pipeline
        .call_tool(
            GENERATE_FROM_IMAGE,
            json!({"input_image_path": out.path().to_string_lossy(), "prompt": "p"}),
        )
        .await
        .expect_err("directory source");
    assert_eq!(err.kind(), ErrorKind::InputNotAFile);
    assert_eq!(client.calls().await, 0);
    Ok(())
}

#[tokio::test]
async fn image_to_image_sends_binary_part_before_text() -> AnyResult<()> {
    let out = tempdir()?;
    let input_dir = tempdir()?;
    let input = input_dir.path().join("Photo.JPG");
    fs::write(&input, b"jpeg-bytes")?;

    let client = RecordingClient::responding(image_response(PNG_BYTES.to_vec().into()));
    let pipeline = pipeline_for(out.path(), Arc::clone(&client));

    let path = pipeline
        .call_tool(
            GENERATE_FROM_IMAGE,
            json!({"input_image_path": input.to_string_lossy(), "prompt": "watercolor"}),
        )
        .await?;
    assert_eq!(fs::read(path)?, PNG_BYTES);

    let request = client.last_request().await.expect("model called");
    assert_eq!(
        request.parts,
        vec![
            ModelPart::InlineData {
                mime_type: "image/jpeg".to_string(),
                data: b"jpeg-bytes".to_vec(),
            },
            ModelPart::Text("watercolor".to_string()),
        ]
    );
    assert_eq!(request.response_modalities, vec![ResponseModality::Image]);
    Ok(())
}

#[tokio::test]
async fn empty_source_file_is_invalid_argument() -> AnyResult<()> {
    let out = tempdir()?;
    let input = out.path().join("empty.webp");
    fs::write(&input, b"")?;
    let client = RecordingClient::responding(image_response(PNG_BYTES.to_vec().into()));
    let pipeline = pipeline_for(out.path(), Arc::clone(&client));

    let err = pipeline
        .call_tool(
            GENERATE_FROM_IMAGE,
            json!({"input_image_path": input.to_string_lossy(), "prompt": "p"}),
        )
        .await
        .expect_err("empty source");
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(client.calls().await, 0);
    Ok(())
}

#[tokio::test]
async fn response_without_candidates_or_image_fails() -> AnyResult<()> {
    let out = tempdir()?;

    let pipeline = pipeline_for(
        out.path(),
        RecordingClient::responding(ModelResponse::default()),
    );
    let err = pipeline
        .call_tool(GENERATE_FROM_TEXT, json!({"prompt": "p"}))
        .await
        .expect_err("no candidates");
    assert_eq!(err.kind(), ErrorKind::NoCandidates);

    let text_only: ModelResponse = serde_json::from_value(json!({
        "candidates": [{"content": {"parts": [{"text": "I cannot draw that"}]}}]
    }))?;
    let pipeline = pipeline_for(out.path(), RecordingClient::responding(text_only));
    let err = pipeline
        .call_tool(GENERATE_FROM_TEXT, json!({"prompt": "p"}))
        .await
        .expect_err("no image");
    assert_eq!(err.kind(), ErrorKind::NoImageData);

    assert_eq!(fs::read_dir(out.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn client_failure_surfaces_as_wrapped_generation_failure() -> AnyResult<()> {
    let out = tempdir()?;
    let pipeline = pipeline_for(out.path(), RecordingClient::failing("quota exceeded"));

    let err = pipeline
        .call_tool(GENERATE_FROM_TEXT, json!({"prompt": "p"}))
        .await
        .expect_err("client failure");
    assert_eq!(err.kind(), ErrorKind::GenerationFailed);

    let message = err.to_string();
    assert!(message.starts_with("image generation failed: GenerationFailed"));
    assert!(message.contains("RecordingClient: quota exceeded"));
    assert!(message.contains("Trace:"));
    assert!(message.contains("tool: generate_image_from_text"));
    Ok(())
}

#[tokio::test]
async fn same_second_invocations_overwrite_one_file() -> AnyResult<()> {
    let out = tempdir()?;
    let fixed = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

    let first = pipeline_for(
        out.path(),
        RecordingClient::responding(image_response(b"first".to_vec().into())),
    )
    .with_clock(Arc::new(move || fixed));
    let second = pipeline_for(
        out.path(),
        RecordingClient::responding(image_response(b"second".to_vec().into())),
    )
    .with_clock(Arc::new(move || fixed));

    let path_a = first
        .call_tool(GENERATE_FROM_TEXT, json!({"prompt": "a"}))
        .await?;
    let path_b = second
        .call_tool(GENERATE_FROM_TEXT, json!({"prompt": "b"}))
        .await?;

    assert_eq!(path_a, path_b);
    assert!(path_a.ends_with("20250102T030405Z.png"));
    assert_eq!(fs::read(&path_b)?, b"second");
    assert_eq!(fs::read_dir(out.path())?.count(), 1);
    Ok(())
}
