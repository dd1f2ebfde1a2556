use super::*;
use crate::RagError;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn config_for(server: &MockServer) -> OpenAiConfig {
    OpenAiConfig {
        base_url: format!("{}/v1/", server.uri()),
        embedding_model: "test-embedder".to_string(),
        ..OpenAiConfig::default()
    }
}

/// Answers with one vector per input, listed in reverse order. Each vector
/// is `[input length, 0.0, ...]` padded to the requested width.
fn reversed_embeddings(request: &Request) -> ResponseTemplate {
    let body: Value = serde_json::from_slice(&request.body).expect("request body is json");
    let dimensions = body["dimensions"].as_u64().expect("dimensions present") as usize;
    let inputs = body["input"].as_array().expect("input is an array");

    let data: Vec<Value> = inputs
        .iter()
        .enumerate()
        .rev()
        .map(|(index, input)| {
            let mut embedding = vec![0.0_f64; dimensions];
            embedding[0] = input.as_str().expect("input is a string").len() as f64;
            json!({ "object": "embedding", "index": index, "embedding": embedding })
        })
        .collect();

    ResponseTemplate::new(200).set_body_json(json!({ "object": "list", "data": data }))
}

async fn embed_blocking(
    client: OpenAiEmbeddingClient,
    inputs: Vec<String>,
    dimensions: u32,
) -> Result<IndexedEmbeddings> {
    tokio::task::spawn_blocking(move || client.embed(&inputs, dimensions))
        .await
        .expect("blocking task completes")
}

#[test]
fn blank_api_key_fails_before_network() {
    let result = OpenAiEmbeddingClient::new(&OpenAiConfig::default(), " ");
    assert!(matches!(result, Err(RagError::Configuration(_))));
}

#[test]
fn client_configuration() {
    let config = OpenAiConfig {
        embedding_model: "text-embedding-3-large".to_string(),
        batch_size: 16,
        ..OpenAiConfig::default()
    };
    let client = OpenAiEmbeddingClient::new(&config, "sk-test").expect("client builds");
    assert_eq!(client.model(), "text-embedding-3-large");
    assert_eq!(client.batch_size, 16);
    assert_eq!(client.with_batch_size(0).batch_size, 1);
}

#[test]
fn empty_input_skips_request() {
    let config = OpenAiConfig {
        base_url: "http://127.0.0.1:9/v1/".to_string(),
        ..OpenAiConfig::default()
    };
    let client = OpenAiEmbeddingClient::new(&config, "sk-test").expect("client builds");
    let embeddings = client.embed(&[], 8).expect("no request is made");
    assert!(embeddings.is_empty());
}

#[tokio::test]
async fn embeddings_are_keyed_by_input_position() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(reversed_embeddings)
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiEmbeddingClient::new(&config_for(&server), "sk-test").expect("client builds");
    let inputs = vec!["a".to_string(), "bb".to_string(), "ccc".to_string()];
    let embeddings = embed_blocking(client, inputs, 4)
        .await
        .expect("embedding succeeds");

    assert_eq!(embeddings.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    for (position, vector) in &embeddings {
        assert_eq!(vector.len(), 4);
        assert_eq!(vector[0], (position + 1) as f32);
    }
}

#[tokio::test]
async fn request_body_carries_model_and_dimensions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(wiremock::matchers::body_json(json!({
            "input": ["hello"],
            "model": "test-embedder",
            "dimensions": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "index": 0, "embedding": [0.1, 0.2, 0.3] }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiEmbeddingClient::new(&config_for(&server), "sk-test").expect("client builds");
    let embeddings = embed_blocking(client, vec!["hello".to_string()], 3)
        .await
        .expect("embedding succeeds");

    assert_eq!(embeddings.get(&0), Some(&vec![0.1, 0.2, 0.3]));
}

#[tokio::test]
async fn batches_are_offset_to_global_positions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(reversed_embeddings)
        .expect(3)
        .mount(&server)
        .await;

    let client = OpenAiEmbeddingClient::new(&config_for(&server), "sk-test")
        .expect("client builds")
        .with_batch_size(2);
    let inputs: Vec<String> = (1..=5).map(|n| "x".repeat(n)).collect();
    let embeddings = embed_blocking(client, inputs, 2)
        .await
        .expect("embedding succeeds");

    assert_eq!(embeddings.len(), 5);
    for (position, vector) in &embeddings {
        assert_eq!(vector[0], (position + 1) as f32);
    }
}

#[tokio::test]
async fn non_success_status_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let client = OpenAiEmbeddingClient::new(&config_for(&server), "sk-test").expect("client builds");
    let result = embed_blocking(client, vec!["a".to_string()], 2).await;

    match result {
        Err(RagError::Upstream { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn short_response_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "index": 0, "embedding": [0.1, 0.2] }]
        })))
        .mount(&server)
        .await;

    let client = OpenAiEmbeddingClient::new(&config_for(&server), "sk-test").expect("client builds");
    let inputs = vec!["a".to_string(), "b".to_string()];
    let result = embed_blocking(client, inputs, 2).await;

    assert!(matches!(result, Err(RagError::Upstream { status: 200, .. })));
}

#[tokio::test]
async fn malformed_response_keeps_its_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(203).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = OpenAiEmbeddingClient::new(&config_for(&server), "sk-test").expect("client builds");
    let result = embed_blocking(client, vec!["a".to_string()], 2).await;

    assert!(matches!(result, Err(RagError::Upstream { status: 203, .. })));
}

#[tokio::test]
async fn empty_data_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "object": "list" })))
        .mount(&server)
        .await;

    let client = OpenAiEmbeddingClient::new(&config_for(&server), "sk-test").expect("client builds");
    let result = embed_blocking(client, vec!["a".to_string()], 2).await;

    assert!(matches!(result, Err(RagError::Upstream { .. })));
}

#[test]
fn wrong_dimensions_are_rejected() {
    let data = vec![EmbeddingData {
        embedding: vec![0.1, 0.2, 0.3],
        index: 0,
    }];
    let message = order_by_index(data, 1, 2).expect_err("width mismatch");
    assert!(message.contains("3 dimensions"));
}

#[test]
fn duplicate_and_out_of_range_indices_are_rejected() {
    let duplicate = vec![
        EmbeddingData {
            embedding: vec![0.1],
            index: 0,
        },
        EmbeddingData {
            embedding: vec![0.2],
            index: 0,
        },
    ];
    assert!(order_by_index(duplicate, 2, 1).is_err());

    let out_of_range = vec![EmbeddingData {
        embedding: vec![0.1],
        index: 3,
    }];
    assert!(order_by_index(out_of_range, 1, 1).is_err());
}

#[test]
fn vectors_are_reordered_by_index() {
    let data = vec![
        EmbeddingData {
            embedding: vec![2.0],
            index: 1,
        },
        EmbeddingData {
            embedding: vec![1.0],
            index: 0,
        },
    ];
    let ordered = order_by_index(data, 2, 1).expect("complete response");
    assert_eq!(ordered, vec![vec![1.0], vec![2.0]]);
}
