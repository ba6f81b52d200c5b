//! End-to-end tests against a mock SPARQL endpoint over real HTTP.

use fetcher::{FetcherConfig, QueryResults, SparqlEndpointFetcher};
use futures::TryStreamExt;
use oxrdf::{Literal, NamedNode, Term};
use protocol::{RequestMethod, SparqlError, SPARQL_RESULTS_JSON, TURTLE};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

fn endpoint(server: &MockServer) -> String {
    format!("{}/sparql", server.uri())
}

async fn mount_error(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn select_streams_one_binding_set_per_row() -> anyhow::Result<()> {
    init_tracing();
    let server = MockServer::start().await;
    let query = "SELECT ?s ?label WHERE { ?s ?p ?label }";
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .and(query_param("query", query))
        .and(header("accept", SPARQL_RESULTS_JSON))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"head":{"vars":["s","label"]},"results":{"bindings":[
                {"s":{"type":"uri","value":"http://ex.org/a"},"label":{"type":"literal","value":"hello","xml:lang":"en"}},
                {"s":{"type":"bnode","value":"b1"}},
                {"label":{"type":"literal","value":"42","datatype":"http://www.w3.org/2001/XMLSchema#integer"}}
            ]}}"#,
            SPARQL_RESULTS_JSON,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = SparqlEndpointFetcher::new()?;
    let rows: Vec<_> = fetcher
        .fetch_rows(&endpoint(&server), query)
        .await?
        .try_collect()
        .await?;

    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0].get("?s"),
        Some(&Term::from(NamedNode::new("http://ex.org/a")?))
    );
    assert_eq!(
        rows[0].get("?label"),
        Some(&Term::from(Literal::new_language_tagged_literal(
            "hello", "en"
        )?))
    );
    assert_eq!(rows[1].keys().collect::<Vec<_>>(), vec!["?s"]);
    assert!(matches!(rows[1].get("?s"), Some(Term::BlankNode(_))));
    assert_eq!(
        rows[2].get("?label"),
        Some(&Term::from(Literal::new_typed_literal(
            "42",
            NamedNode::new("http://www.w3.org/2001/XMLSchema#integer")?
        )))
    );
    Ok(())
}

#[tokio::test]
async fn ask_resolves_to_the_answer() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"boolean": true}"#, SPARQL_RESULTS_JSON))
        .mount(&server)
        .await;

    let answer = SparqlEndpointFetcher::new()?
        .fetch_boolean(&endpoint(&server), "ASK { ?s ?p ?o }")
        .await?;

    assert!(answer);
    Ok(())
}

#[tokio::test]
async fn ask_without_an_answer_is_rejected() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", SPARQL_RESULTS_JSON))
        .mount(&server)
        .await;

    let result = SparqlEndpointFetcher::new()?
        .fetch_boolean(&endpoint(&server), "ASK { ?s ?p ?o }")
        .await;

    let error = result.unwrap_err();
    assert_eq!(error, SparqlError::MissingAnswer);
    assert_eq!(error.to_string(), "No valid ASK response");
    Ok(())
}

#[tokio::test]
async fn ask_with_an_empty_body_is_rejected() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = SparqlEndpointFetcher::new()?
        .fetch_boolean(&endpoint(&server), "ASK { ?s ?p ?o }")
        .await;

    assert_eq!(result, Err(SparqlError::MissingAnswer));
    Ok(())
}

#[tokio::test]
async fn construct_streams_turtle_triples() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .and(header("accept", TURTLE))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "@prefix ex: <http://ex.org/> .\nex:a ex:knows ex:b , ex:c .\n",
            TURTLE,
        ))
        .mount(&server)
        .await;

    let triples: Vec<_> = SparqlEndpointFetcher::new()?
        .fetch_triples(
            &endpoint(&server),
            "CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }",
        )
        .await?
        .try_collect()
        .await?;

    assert_eq!(triples.len(), 2);
    assert_eq!(triples[0].object, Term::from(NamedNode::new("http://ex.org/b")?));
    assert_eq!(triples[1].object, Term::from(NamedNode::new("http://ex.org/c")?));
    Ok(())
}

#[tokio::test]
async fn fetch_runs_describe_through_the_graph_pipeline() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .and(header("accept", TURTLE))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<http://ex.org/x> <http://ex.org/p> \"v\" .\n",
            TURTLE,
        ))
        .mount(&server)
        .await;

    let results = SparqlEndpointFetcher::new()?
        .fetch(&endpoint(&server), "DESCRIBE <http://ex.org/x>")
        .await?;

    let triples = match results {
        QueryResults::Triples(triples) => triples,
        other => panic!("expected triples, got {other:?}"),
    };
    let triples: Vec<_> = triples.try_collect().await?;
    assert_eq!(triples.len(), 1);
    Ok(())
}

#[tokio::test]
async fn server_errors_name_the_endpoint_and_status() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_error(&server).await;
    let fetcher = SparqlEndpointFetcher::new()?;
    let endpoint = endpoint(&server);

    let assert_protocol = |error: SparqlError| {
        let message = error.to_string();
        assert!(message.contains(&endpoint), "{message}");
        assert!(message.contains("Internal Server Error"), "{message}");
        assert!(matches!(error, SparqlError::Protocol { status: 500, .. }));
    };

    let mut rows = fetcher.fetch_rows(&endpoint, "SELECT * WHERE { ?s ?p ?o }").await?;
    assert_protocol(rows.try_next().await.unwrap_err());

    assert_protocol(
        fetcher
            .fetch_boolean(&endpoint, "ASK { ?s ?p ?o }")
            .await
            .unwrap_err(),
    );

    let mut triples = fetcher
        .fetch_triples(&endpoint, "CONSTRUCT WHERE { ?s ?p ?o }")
        .await?;
    assert_protocol(triples.try_next().await.unwrap_err());
    Ok(())
}

#[tokio::test]
async fn post_sends_a_form_body_and_extra_params() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sparql"))
        .and(query_param("timeout", "5000"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(header("authorization", "Bearer token"))
        .and(body_string("query=ASK%20%7B%7D"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"boolean": false}"#, SPARQL_RESULTS_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = FetcherConfig {
        method: RequestMethod::Post,
        ..FetcherConfig::default()
    };
    config
        .default_headers
        .insert("Authorization".to_string(), "Bearer token".to_string());
    config
        .additional_url_params
        .insert("timeout".to_string(), "5000".to_string());

    let fetcher = SparqlEndpointFetcher::builder().config(config).build()?;

    assert!(!fetcher.fetch_boolean(&endpoint(&server), "ASK {}").await?);
    Ok(())
}

#[tokio::test]
async fn updates_are_posted_as_sparql_update() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/update"))
        .and(header("content-type", "application/sparql-update"))
        .and(body_string("INSERT DATA { <http://ex.org/s> <http://ex.org/p> 1 }"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    SparqlEndpointFetcher::new()?
        .fetch_update(
            &format!("{}/update", server.uri()),
            "INSERT DATA { <http://ex.org/s> <http://ex.org/p> 1 }",
        )
        .await?;
    Ok(())
}

#[tokio::test]
async fn unreachable_endpoint_fails_the_call() -> anyhow::Result<()> {
    let result = SparqlEndpointFetcher::new()?
        .fetch_rows("http://127.0.0.1:1/sparql", "SELECT * WHERE { ?s ?p ?o }")
        .await;

    let error = result.err().expect("connection should fail");
    assert!(matches!(error, SparqlError::Transport(_)));
    assert!(matches!(
        error.retry_policy(),
        protocol::RetryPolicy::Retryable { .. }
    ));
    Ok(())
}
