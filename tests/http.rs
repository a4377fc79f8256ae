use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use skinprove::scheduler::last_day_of_month;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct MutationResponse {
    affected_dates: Vec<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct Scheduled {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct DayRoutine {
    #[serde(rename = "AM")]
    am: Vec<Scheduled>,
    #[serde(rename = "PM")]
    pm: Vec<Scheduled>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("skinprove_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/schedule")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_skinprove"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("ROLLING_WINDOW_DAYS", "7")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn post(client: &Client, url: String, body: Value) -> reqwest::Response {
    client.post(url).json(&body).send().await.unwrap()
}

async fn routine(client: &Client, base_url: &str, date: NaiveDate) -> DayRoutine {
    client
        .get(format!("{base_url}/api/routines/{date}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_schedule_daily_then_cascade_delete() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;
    let today = today();
    let remaining = (last_day_of_month(today) - today).num_days() as usize + 1;

    let resp = post(
        &client,
        format!("{base}/api/schedule/select"),
        json!({ "date": today, "slot": "PM", "product_id": 3 }),
    )
    .await;
    assert!(resp.status().is_success());

    let resp = post(&client, format!("{base}/api/schedule/rule"), json!({ "frequency": "daily" })).await;
    assert!(resp.status().is_success());

    let committed: MutationResponse = post(&client, format!("{base}/api/schedule/commit"), json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(committed.affected_dates.len(), remaining);
    assert_eq!(committed.affected_dates.first(), Some(&today));
    assert!(committed.affected_dates.iter().all(|d| *d <= last_day_of_month(today)));

    let day = routine(&client, base, today).await;
    assert!(day.pm.iter().any(|p| p.id == 3));
    assert!(!day.am.iter().any(|p| p.id == 3));

    // Flow is back to idle, so a second commit has nothing to apply.
    let resp = post(&client, format!("{base}/api/schedule/commit"), json!({})).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = post(
        &client,
        format!("{base}/api/deletion/request"),
        json!({ "date": today, "slot": "PM", "product_id": 3 }),
    )
    .await;
    assert!(resp.status().is_success());

    let removed: MutationResponse = post(&client, format!("{base}/api/deletion/confirm"), json!({ "cascade": true }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(removed.affected_dates.len(), remaining);
    let day = routine(&client, base, today).await;
    assert!(!day.pm.iter().any(|p| p.id == 3));
}

#[tokio::test]
async fn http_single_day_delete_keeps_other_days() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;
    let today = today();

    post(
        &client,
        format!("{base}/api/schedule/select"),
        json!({ "date": today, "slot": "PM", "product_id": 4 }),
    )
    .await;
    post(&client, format!("{base}/api/schedule/rule"), json!({ "frequency": "daily" })).await;
    let committed: MutationResponse = post(&client, format!("{base}/api/schedule/commit"), json!({}))
        .await
        .json()
        .await
        .unwrap();

    post(
        &client,
        format!("{base}/api/deletion/request"),
        json!({ "date": today, "slot": "PM", "product_id": 4 }),
    )
    .await;
    let removed: MutationResponse = post(&client, format!("{base}/api/deletion/confirm"), json!({ "cascade": false }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(removed.affected_dates, vec![today]);

    if let Some(later) = committed.affected_dates.get(1) {
        let day = routine(&client, base, *later).await;
        assert!(day.pm.iter().any(|p| p.id == 4));
    }

    // A cancelled request leaves nothing to confirm.
    post(
        &client,
        format!("{base}/api/deletion/request"),
        json!({ "date": committed.affected_dates.last().copied().unwrap_or(today), "slot": "PM", "product_id": 4 }),
    )
    .await;
    post(&client, format!("{base}/api/deletion/cancel"), json!({})).await;
    let resp = post(&client, format!("{base}/api/deletion/confirm"), json!({ "cascade": true })).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn http_back_keeps_product_and_custom_days_are_coerced() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let resp = post(
        &client,
        format!("{base}/api/schedule/select"),
        json!({ "date": today(), "slot": "AM", "product_id": 2 }),
    )
    .await;
    assert!(resp.status().is_success());

    let flow: Value = post(
        &client,
        format!("{base}/api/schedule/rule"),
        json!({ "frequency": "custom", "custom_days": "abc" }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(flow["state"], "rule_configured");
    assert_eq!(flow["rule"]["frequency"], "custom");
    assert_eq!(flow["rule"]["days"], 1);

    let flow: Value = post(&client, format!("{base}/api/schedule/back"), json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(flow["state"], "product_selected");
    assert_eq!(flow["product"]["id"], 2);

    let resp = post(&client, format!("{base}/api/schedule/rule"), json!({ "frequency": "fortnightly" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let flow: Value = post(&client, format!("{base}/api/schedule/cancel"), json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(flow["state"], "idle");
}

#[tokio::test]
async fn http_unknown_products_are_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    // Product 7 exists in the catalog but is not on the seeded shelf.
    let resp = post(
        &client,
        format!("{base}/api/schedule/select"),
        json!({ "date": today(), "slot": "AM", "product_id": 7 }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = post(
        &client,
        format!("{base}/api/deletion/request"),
        json!({ "date": today(), "slot": "PM", "product_id": 7 }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .get(format!("{base}/api/routines/not-a-date"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_shelf_and_catalog() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let serums: Vec<Value> = client
        .get(format!("{base}/api/products?category=Serum&q=lumina"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<u64> = serums.iter().filter_map(|p| p["id"].as_u64()).collect();
    assert_eq!(ids, vec![2, 5]);

    let shelf: Vec<Value> = post(&client, format!("{base}/api/shelf"), json!({ "product_id": 6 }))
        .await
        .json()
        .await
        .unwrap();
    assert!(shelf.iter().any(|item| item["product"]["id"] == 6));
    let size = shelf.len();

    let again: Vec<Value> = post(&client, format!("{base}/api/shelf"), json!({ "product_id": 6 }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(again.len(), size);

    let resp = client.delete(format!("{base}/api/shelf/6")).send().await.unwrap();
    assert!(resp.status().is_success());
    let resp = client.delete(format!("{base}/api/shelf/6")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = post(&client, format!("{base}/api/shelf"), json!({ "product_id": 999 })).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_photo_updates_progress() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;
    let date = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();

    let photo: Value = post(
        &client,
        format!("{base}/api/photos"),
        json!({ "date": date, "skin_rating": 15, "notes": " calm " }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(photo["skin_rating"], 10);
    assert_eq!(photo["notes"], "calm");

    let progress: Value = client
        .get(format!("{base}/api/progress"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["window"], 7);
    let daily = progress["daily_averages"].as_array().unwrap();
    let oldest = daily.last().unwrap();
    assert_eq!(oldest["date"], "2001-01-01");
    assert_eq!(oldest["rating"], 10.0);
    assert_eq!(progress["chart"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn http_profile_partial_update() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let profile: Value = client
        .put(format!("{base}/api/profile"))
        .json(&json!({ "skin_type": "oily", "notifications": { "product_recommendations": true } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["skin_type"], "oily");
    assert_eq!(profile["name"], "Sarah Johnson");
    assert_eq!(profile["notifications"]["product_recommendations"], true);
    assert_eq!(profile["notifications"]["routine_reminders"], true);
}

#[tokio::test]
async fn http_dashboard_and_index() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let dashboard: Value = post(
        &client,
        format!("{base}/api/dashboard/toggle"),
        json!({ "slot": "AM", "product_id": 1 }),
    )
    .await
    .json()
    .await
    .unwrap();
    let cleanser = dashboard["today"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["id"] == 1)
        .cloned()
        .unwrap();
    let completed = cleanser["completed"].as_bool().unwrap();

    let dashboard: Value = post(
        &client,
        format!("{base}/api/dashboard/toggle"),
        json!({ "slot": "AM", "product_id": 1 }),
    )
    .await
    .json()
    .await
    .unwrap();
    let cleanser = dashboard["today"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["id"] == 1)
        .cloned()
        .unwrap();
    assert_eq!(cleanser["completed"].as_bool(), Some(!completed));

    let month: Value = client
        .get(format!("{base}/api/calendar"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let first = month["days"][0]["date"].as_str().unwrap().to_string();
    assert!(first.ends_with("-01"));

    let html = client.get(format!("{base}/")).send().await.unwrap().text().await.unwrap();
    assert!(html.contains("Morning Routine"));
    assert!(html.contains("Gentle Foaming Cleanser"));
}
