use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use nucleo::AnalysisConfigBuilder;
use nucleo::common::storage::LocalStore;
use nucleo::engine::client::{
    AnalysisClient, CannedClient, ClientError, GeminiClient, GenerateRequest, build_payload,
    extract_text,
};
use nucleo::engine::config::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use nucleo::engine::history::HistoryLog;
use nucleo::engine::model::{AnalysisType, PersonalData};
use nucleo::engine::prompt::builtin_template;
use nucleo::engine::session::{AnalysisInput, AnalysisSession, GENERIC_FAILURE};
use serde_json::json;
use tempfile::tempdir;

fn request<'a>(prompt: &'a str) -> GenerateRequest<'a> {
    GenerateRequest {
        model: DEFAULT_MODEL,
        system_instruction: "Você é o NÚCLEO.",
        temperature: 0.2,
        prompt,
    }
}

/// Answers a single request on a local port with `status` and `body`.
/// The handle yields the request that was received, lowercased.
fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request
    });
    (endpoint, handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut request = String::new();
    let mut length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
            break;
        }
        let line = line.to_ascii_lowercase();
        if let Some(value) = line.strip_prefix("content-length:") {
            length = value.trim().parse().unwrap();
        }
        request.push_str(&line);
    }
    let mut body = vec![0; length];
    reader.read_exact(&mut body).unwrap();
    request + &String::from_utf8_lossy(&body)
}

fn local_client(endpoint: &str) -> GeminiClient {
    GeminiClient::new("test-key".into(), endpoint, Duration::from_secs(5)).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = serde_json::to_value(build_payload(&request("DADOS"))).unwrap();
        assert_eq!(
            payload,
            json!({
                "systemInstruction": { "parts": [{ "text": "Você é o NÚCLEO." }] },
                "contents": [{ "role": "user", "parts": [{ "text": "DADOS" }] }],
                "generationConfig": { "temperature": 0.2_f32 }
            })
        );
    }

    #[test]
    fn test_extract_concatenates_first_candidate() {
        let body = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "### STATUS" }, { "text": " GERAL" }] } },
                { "content": { "parts": [{ "text": "ignorado" }] } }
            ]
        })
        .to_string();
        assert_eq!(extract_text(&body).unwrap().as_deref(), Some("### STATUS GERAL"));
    }

    #[test]
    fn test_extract_empty_answers() {
        for body in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{ "content": { "parts": [] } }] }),
            json!({ "candidates": [{ "content": { "parts": [{ "text": "  \n" }] } }] }),
            json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
        ] {
            assert_eq!(extract_text(&body.to_string()).unwrap(), None, "{body}");
        }
    }

    #[test]
    fn test_extract_rejects_non_json() {
        assert!(matches!(
            extract_text("<html>bad gateway</html>"),
            Err(ClientError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_api_key() {
        let config = AnalysisConfigBuilder::default()
            .kind(AnalysisType::Business)
            .system_instruction("x")
            .api_key(None::<String>)
            .api_key_env("MY_KEY")
            .build()
            .unwrap();
        match GeminiClient::from_config(&config) {
            Err(ClientError::MissingApiKey(var)) => assert_eq!(var, "MY_KEY"),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("client built without a key"),
        }
    }

    #[test]
    fn test_client_builds_with_key() {
        let client = GeminiClient::new("k".into(), DEFAULT_ENDPOINT, Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_canned_client() {
        let req = request("p");
        assert_eq!(
            CannedClient::new("resposta").generate(&req).unwrap().as_deref(),
            Some("resposta")
        );
        assert_eq!(CannedClient::new("   ").generate(&req).unwrap(), None);
        assert_eq!(CannedClient::empty().generate(&req).unwrap(), None);
    }

    #[test]
    fn test_generate_posts_and_extracts() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "### STATUS GERAL" }] } }]
        })
        .to_string();
        let (endpoint, server) = serve_once("200 OK", &body);

        let text = local_client(&endpoint).generate(&request("DADOS")).unwrap();
        assert_eq!(text.as_deref(), Some("### STATUS GERAL"));

        let received = server.join().unwrap();
        assert!(received.starts_with(&format!(
            "post /models/{}:generatecontent ",
            DEFAULT_MODEL
        )));
        assert!(received.contains("x-goog-api-key: test-key"));
        assert!(received.contains("\"dados\""));
    }

    #[test]
    fn test_generate_reports_error_status_and_message() {
        let body = json!({
            "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
        })
        .to_string();
        let (endpoint, server) = serve_once("400 Bad Request", &body);

        match local_client(&endpoint).generate(&request("p")) {
            Err(ClientError::Status { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid.");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_generate_error_without_json_body_keeps_raw_text() {
        let (endpoint, server) = serve_once("502 Bad Gateway", "upstream down");
        match local_client(&endpoint).generate(&request("p")) {
            Err(ClientError::Status { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_generate_rejects_undecodable_body() {
        let (endpoint, server) = serve_once("200 OK", "<html>ok</html>");
        assert!(matches!(
            local_client(&endpoint).generate(&request("p")),
            Err(ClientError::Decode(_))
        ));
        server.join().unwrap();
    }

    #[test]
    fn test_session_hides_http_errors_and_saves_nothing() {
        let body = json!({ "error": { "message": "quota exceeded" } }).to_string();
        let (endpoint, server) = serve_once("429 Too Many Requests", &body);

        let config = AnalysisConfigBuilder::default()
            .kind(AnalysisType::Personal)
            .system_instruction("x")
            .api_key(Some("test-key".to_string()))
            .endpoint(endpoint)
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let client = GeminiClient::from_config(&config).unwrap();
        let session = AnalysisSession::new(config, builtin_template(AnalysisType::Personal));
        let input = AnalysisInput::Personal(PersonalData {
            period: "Abril 2024".into(),
            income: 4000.0,
            ..Default::default()
        });

        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let err = session.run(&client, &input, Some(&store)).unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE);
        assert!(HistoryLog::load(&store).unwrap().is_empty());
        server.join().unwrap();
    }
}
