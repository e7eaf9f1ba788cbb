//! Verify path encoding, request building and error details against JSON
//! test vectors stored in `test-vectors/`.
//!
//! Request bodies are compared as parsed JSON, not raw strings.

use cloudfs_core::{
    encode_path, ApiClient, ApiResponse, ClientConfig, HttpMethod, HttpRequest, HttpResponse,
    HttpTransport, TransportError,
};

/// Replays one simulated response for every request.
struct Replay(HttpResponse);

impl HttpTransport for Replay {
    fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(self.0.clone())
    }
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn arg(args: &serde_json::Value, i: usize) -> &str {
    args[i].as_str().unwrap()
}

fn build(client: &ApiClient, operation: &str, args: &serde_json::Value) -> HttpRequest {
    match operation {
        "upload_file" => client.build_upload_file(arg(args, 0), arg(args, 1), b"payload"),
        "file_details" => client.build_file_details(arg(args, 0)),
        "download" => client.build_download(arg(args, 0)),
        "download_by_id" => client.build_download_by_id(arg(args, 0)),
        "create_folder" => client.build_create_folder(arg(args, 0), arg(args, 1)).unwrap(),
        other => panic!("unknown operation: {other}"),
    }
}

fn call(client: &ApiClient, operation: &str) -> ApiResponse {
    match operation {
        "upload_file" => client.upload_file("/Shared/Docs/", "a.pdf", b"payload"),
        "file_details" => client.file_details("/Shared/Docs/a.pdf"),
        "download" => client.download("/Shared/Docs/a.pdf"),
        "download_by_id" => client.download_by_id("abc123"),
        "create_folder" => client.create_folder("/Shared/", "Docs"),
        other => panic!("unknown operation: {other}"),
    }
    .unwrap()
}

// ---------------------------------------------------------------------------
// Path encoding
// ---------------------------------------------------------------------------

#[test]
fn encode_path_vectors() {
    let raw = include_str!("../../test-vectors/encode_path.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = case["input"].as_str().unwrap();
        let expected = case["expected"].as_str().unwrap();
        assert_eq!(encode_path(input), expected, "{name}");
    }
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

#[test]
fn request_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();
    let token = vectors["token"].as_str().unwrap();

    let client = ApiClient::with_transport(
        ClientConfig::new("acme", token),
        Replay(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
        }),
    );
    assert_eq!(client.base_url(), base_url);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected_request"];
        let req = build(&client, case["operation"].as_str().unwrap(), &case["args"]);

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{base_url}{}", expected["path"].as_str().unwrap()), "{name}: url");
        assert_eq!(
            req.header("Authorization"),
            Some(format!("Bearer {token}").as_str()),
            "{name}: authorization"
        );
        assert_eq!(req.header("Content-Type"), expected["content_type"].as_str(), "{name}: content type");

        if let Some(body) = expected.get("body") {
            let sent: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&sent, body, "{name}: body");
        }
        if req.method == HttpMethod::Get {
            assert!(req.body.is_none(), "{name}: GET must not carry a body");
        }
    }
}

// ---------------------------------------------------------------------------
// Error details
// ---------------------------------------------------------------------------

#[test]
fn error_detail_vectors() {
    let raw = include_str!("../../test-vectors/error_details.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let headers = sim["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let pair = h.as_array().unwrap();
                (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
            })
            .collect();
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers,
            body: sim["body"].as_str().unwrap().as_bytes().to_vec(),
        };

        let client = ApiClient::with_transport(ClientConfig::new("acme", "t0k3n"), Replay(response.clone()));
        let resp = call(&client, case["operation"].as_str().unwrap());
        assert!(resp.is_error(), "{name}: is_error");

        let details = resp.error_details().unwrap();
        let expected = &case["expected"];
        assert_eq!(details.status_code, response.status, "{name}: status");
        assert_eq!(details.raw_body, response.body, "{name}: raw body");
        assert_eq!(
            details.status_code_text,
            expected["status_code_text"].as_str().unwrap(),
            "{name}: status text"
        );
        assert_eq!(
            details.json_body.unwrap_or(serde_json::Value::Null),
            expected["json_body"],
            "{name}: json body"
        );
        assert_eq!(
            details.api_exception_code.as_deref(),
            expected["api_exception_code"].as_str(),
            "{name}: vendor code"
        );
    }
}
