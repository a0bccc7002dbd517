use serde_json::{Map, Value};
use crate::core::errors::ApiError;

pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(chunking) = expect_optional_object(root, "chunking")? {
        validate_u64_field(
            chunking,
            "chunking.chunk_size",
            "chunk_size",
            1,
            1_000_000,
        )?;
        validate_u64_field(
            chunking,
            "chunking.chunk_overlap",
            "chunk_overlap",
            0,
            1_000_000,
        )?;
        validate_optional_string_field(chunking, "chunking.separator", "separator")?;

        let size = chunking.get("chunk_size").and_then(Value::as_u64);
        let overlap = chunking.get("chunk_overlap").and_then(Value::as_u64);
        if let (Some(size), Some(overlap)) = (size, overlap) {
            if overlap >= size {
                return Err(ApiError::Configuration(format!(
                    "Invalid config at 'chunking.chunk_overlap': {} must be smaller than chunk_size {}",
                    overlap, size
                )));
            }
        }
    }

    if let Some(retrieval) = expect_optional_object(root, "retrieval")? {
        validate_u64_field(retrieval, "retrieval.top_k", "top_k", 1, 1_000)?;
    }

    if let Some(conversation) = expect_optional_object(root, "conversation")? {
        validate_optional_string_field(
            conversation,
            "conversation.system_prompt",
            "system_prompt",
        )?;
        if !matches!(conversation.get("max_history_turns"), None | Some(Value::Null)) {
            validate_u64_field(
                conversation,
                "conversation.max_history_turns",
                "max_history_turns",
                0,
                100_000,
            )?;
        }
        validate_bool_field(
            conversation,
            "conversation.condense_question",
            "condense_question",
        )?;
        validate_bool_field(
            conversation,
            "conversation.include_citations",
            "include_citations",
        )?;
    }

    if let Some(llm) = expect_optional_object(root, "llm")? {
        validate_optional_string_field(llm, "llm.provider", "provider")?;
        if let Some(provider) = llm.get("provider").and_then(Value::as_str) {
            if !matches!(provider, "gemini" | "openai") {
                return Err(ApiError::Configuration(format!(
                    "Invalid config at 'llm.provider': unknown provider '{}'",
                    provider
                )));
            }
        }
        validate_optional_string_field(llm, "llm.base_url", "base_url")?;
        validate_optional_string_field(llm, "llm.chat_model", "chat_model")?;
        validate_optional_string_field(llm, "llm.embedding_model", "embedding_model")?;
        validate_u64_field(
            llm,
            "llm.embedding_batch_size",
            "embedding_batch_size",
            1,
            10_000,
        )?;
        validate_u64_field(
            llm,
            "llm.embedding_timeout_secs",
            "embedding_timeout_secs",
            1,
            86_400,
        )?;
        validate_u64_field(
            llm,
            "llm.generation_timeout_secs",
            "generation_timeout_secs",
            1,
            86_400,
        )?;
    }

    if let Some(web) = expect_optional_object(root, "web")? {
        validate_u64_field(web, "web.timeout_secs", "timeout_secs", 1, 86_400)?;
        validate_u64_field(web, "web.max_bytes", "max_bytes", 1, 100_000_000)?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ApiError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(config_type_error(key, "object")),
    }
}

fn validate_bool_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_bool().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "boolean"))
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ApiError::Configuration(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.is_null() || value.as_str().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "string"))
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ApiError::Configuration(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::Configuration(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
