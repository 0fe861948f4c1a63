//! Local HTTP backend double for client tests.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tiny_http::{Header, Response, Server};

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct ScriptedResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl ScriptedResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn csv(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/csv",
            body: body.as_bytes().to_vec(),
        }
    }
}

/// Answers requests in order with the scripted responses, then stops.
pub struct MockBackend {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl MockBackend {
    pub fn serve(responses: Vec<ScriptedResponse>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        let handle = thread::spawn(move || {
            for scripted in responses {
                let Ok(Some(mut req)) = server.recv_timeout(Duration::from_secs(5)) else {
                    return;
                };
                let mut body = Vec::new();
                let _ = req.as_reader().read_to_end(&mut body);
                let content_type = req
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Content-Type"))
                    .map(|h| h.value.as_str().to_string());
                recorded.lock().unwrap().push(RecordedRequest {
                    method: req.method().to_string(),
                    url: req.url().to_string(),
                    content_type,
                    body,
                });
                let header =
                    Header::from_bytes(&b"Content-Type"[..], scripted.content_type.as_bytes())
                        .unwrap();
                let response = Response::from_data(scripted.body)
                    .with_status_code(scripted.status)
                    .with_header(header);
                let _ = req.respond(response);
            }
        });

        Self {
            url: format!("http://127.0.0.1:{port}"),
            requests,
            handle: Some(handle),
        }
    }

    /// Waits for the server thread and returns everything it received.
    pub fn finish(mut self) -> Vec<RecordedRequest> {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        let requests = self.requests.lock().unwrap();
        requests.clone()
    }
}

/// A base URL nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
