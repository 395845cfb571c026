//! Scripted in-memory [`Transport`] for tests.

use crate::provider::client::ProviderClient;
use crate::provider::error::TransportError;
use crate::provider::transport::Transport;
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    Body(String),
    Status(StatusCode),
}

#[derive(Debug, Default)]
struct Script {
    pending: VecDeque<Reply>,
    // Repeated once `pending` runs dry.
    last: Option<Reply>,
    calls: usize,
}

/// Replies are consumed in order per URL; the final reply repeats forever.
/// Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct FakeTransport {
    scripts: Mutex<HashMap<String, Script>>,
    unknown_calls: Mutex<usize>,
    delay: Option<Duration>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, url: &str, body: &str) -> Self {
        self.with_replies(url, vec![Reply::Body(body.to_string())])
    }

    pub fn with_status(self, url: &str, status: StatusCode) -> Self {
        self.with_replies(url, vec![Reply::Status(status)])
    }

    pub fn with_replies(self, url: &str, replies: Vec<Reply>) -> Self {
        self.scripts.lock().insert(
            url.to_string(),
            Script {
                pending: replies.into(),
                last: None,
                calls: 0,
            },
        );
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.scripts.lock().get(url).map_or(0, |s| s.calls)
    }

    pub fn total_calls(&self) -> usize {
        let scripted: usize = self.scripts.lock().values().map(|s| s.calls).sum();
        scripted + *self.unknown_calls.lock()
    }
}

impl Transport for FakeTransport {
    fn fetch_text(&self, url: &str) -> Result<String, TransportError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let reply = {
            let mut scripts = self.scripts.lock();
            match scripts.get_mut(url) {
                Some(script) => {
                    script.calls += 1;
                    if let Some(next) = script.pending.pop_front() {
                        script.last = Some(next);
                    }
                    script.last.clone()
                }
                None => None,
            }
        };

        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Status(status)) => Err(TransportError::HttpStatus {
                url: url.to_string(),
                status,
            }),
            None => {
                *self.unknown_calls.lock() += 1;
                Err(TransportError::HttpStatus {
                    url: url.to_string(),
                    status: StatusCode::NOT_FOUND,
                })
            }
        }
    }
}

pub const TEST_BASE_URL: &str = "http://test";
pub const PROVINCES_URL: &str = "http://test/city3jdata/china.html";
pub const JIANGSU_CITIES_URL: &str = "http://test/city3jdata/provshi/10119.html";
pub const BEIJING_CITIES_URL: &str = "http://test/city3jdata/provshi/10101.html";
pub const SUZHOU_COUNTIES_URL: &str = "http://test/city3jdata/station/1011904.html";
pub const KUNSHAN_WEATHER_URL: &str = "http://test/sk/101190404.html";
pub const KUNSHAN_WEATHER: &str = r#"{"weatherinfo":{"city":"昆山","cityid":"101190404","temp":"15.8","WD":"东南风","WS":"2级","SD":"81%"}}"#;

/// Two provinces, with Jiangsu / Suzhou / Kunshan fully resolvable.
pub fn jiangsu_fixture() -> FakeTransport {
    FakeTransport::new()
        .with_body(PROVINCES_URL, r#"{"10101":"北京","10119":"江苏"}"#)
        .with_body(JIANGSU_CITIES_URL, r#"{"01":"南京","04":"苏州"}"#)
        .with_body(BEIJING_CITIES_URL, r#"{"01":"北京"}"#)
        .with_body(
            SUZHOU_COUNTIES_URL,
            r#"{"01":"苏州","02":"常熟","04":"昆山","05":"吴江"}"#,
        )
        .with_body(KUNSHAN_WEATHER_URL, KUNSHAN_WEATHER)
}

pub fn client_for(transport: &Arc<FakeTransport>) -> ProviderClient {
    ProviderClient::new(transport.clone(), TEST_BASE_URL)
}
