//! Loopback stand-in for the robot's HTTP API.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tiny_http::{Header, Response, Server};

pub const TURNING: &str = r#"{"distance":12.5,"irLeft":1,"irRight":0,"movement":"Turning","speed":40,"wifiStrength":-55}"#;

struct Shared {
    data_status: u16,
    data_body: String,
    requests: Vec<String>,
}

pub struct FakeRobot {
    server: Arc<Server>,
    shared: Arc<Mutex<Shared>>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    base_url: String,
}

impl FakeRobot {
    pub fn start() -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind fake robot"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("fake robot listens on ip");
        let shared = Arc::new(Mutex::new(Shared {
            data_status: 200,
            data_body: TURNING.to_string(),
            requests: Vec::new(),
        }));
        let stop = Arc::new(AtomicBool::new(false));
        let thread = {
            let server = Arc::clone(&server);
            let shared = Arc::clone(&shared);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let Ok(Some(request)) = server.recv_timeout(Duration::from_millis(20)) else {
                        continue;
                    };
                    let url = request.url().to_string();
                    let (status, body) = {
                        let mut shared = shared.lock().expect("fake robot state");
                        shared.requests.push(url.clone());
                        if url == "/data" {
                            (shared.data_status, shared.data_body.clone())
                        } else if url.starts_with("/command?") {
                            (200, "OK".to_string())
                        } else {
                            (404, "not found".to_string())
                        }
                    };
                    let response = Response::from_string(body)
                        .with_status_code(status)
                        .with_header(
                            Header::from_bytes("Content-Type", "application/json")
                                .expect("content type header"),
                        );
                    let _ = request.respond(response);
                }
            })
        };
        Self {
            server,
            shared,
            stop,
            thread: Some(thread),
            base_url: format!("http://{addr}"),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn reply_with(&self, status: u16, body: &str) {
        let mut shared = self.shared.lock().expect("fake robot state");
        shared.data_status = status;
        shared.data_body = body.to_string();
    }

    pub fn requests(&self) -> Vec<String> {
        self.shared.lock().expect("fake robot state").requests.clone()
    }

    /// Every `/command` query string in arrival order.
    pub fn commands(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|url| url.strip_prefix("/command?").map(str::to_string))
            .collect()
    }
}

impl Drop for FakeRobot {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        self.server.unblock();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
