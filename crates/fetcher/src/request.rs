//! Request construction for query and update operations.

use protocol::{HttpRequest, RequestMethod, FORM_URLENCODED, SPARQL_UPDATE};

use crate::config::FetcherConfig;

/// Percent-encodes `params` as `k1=v1&k2=v2`.
fn encode_params<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    params
        .into_iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Appends an encoded parameter string to `endpoint`, joining with `&` when the
/// endpoint already carries a query string.
fn with_query_string(endpoint: &str, encoded: &str) -> String {
    if encoded.is_empty() {
        endpoint.to_string()
    } else if endpoint.contains('?') {
        format!("{endpoint}&{encoded}")
    } else {
        format!("{endpoint}?{encoded}")
    }
}

fn additional_params(config: &FetcherConfig) -> impl Iterator<Item = (&str, &str)> {
    config
        .additional_url_params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
}

fn with_default_headers(mut request: HttpRequest, config: &FetcherConfig) -> HttpRequest {
    for (name, value) in &config.default_headers {
        if request.header(name).is_none() {
            request = request.with_header(name.as_str(), value.as_str());
        }
    }
    request
}

/// Builds the request for a query whose response should be `accept`.
///
/// GET: `<endpoint>?query=<encoded>[&extra...]`.
/// POST: form body `query=<encoded>`, extra parameters stay in the URL.
pub(crate) fn query_request(
    config: &FetcherConfig,
    endpoint: &str,
    query: &str,
    accept: &str,
) -> HttpRequest {
    let request = match config.method {
        RequestMethod::Get => {
            let params = std::iter::once(("query", query)).chain(additional_params(config));
            HttpRequest::get(with_query_string(endpoint, &encode_params(params)))
        }
        RequestMethod::Post => HttpRequest::post(
            with_query_string(endpoint, &encode_params(additional_params(config))),
            FORM_URLENCODED,
            encode_params([("query", query)]),
        ),
    };

    with_default_headers(request.with_header("Accept", accept), config)
}

/// Builds the request for a SPARQL update: the update text is posted verbatim.
pub(crate) fn update_request(config: &FetcherConfig, endpoint: &str, update: &str) -> HttpRequest {
    let request = HttpRequest::post(
        with_query_string(endpoint, &encode_params(additional_params(config))),
        SPARQL_UPDATE,
        update.to_string(),
    );

    with_default_headers(request, config)
}
