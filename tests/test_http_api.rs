//! End-to-end test of the HTTP API: issue, approve and look up certificates
//! against an in-process server bound to an ephemeral port.

use acadi_certificates::crypto::TokenCodec;
use acadi_certificates::{transport, AuthService, CertificateService};
use serde_json::{json, Value};

const STUDENT: &str = "0x1234567890abcdef1234567890abcdef12345678";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start(enforce_roles: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let app_state = transport::http::AppState::new(
            CertificateService::new("Mock University"),
            AuthService::new(TokenCodec::new("test-secret", 3600)),
            enforce_roles,
        );
        let router = transport::http::create_router(app_state);

        // Bind to an ephemeral port so parallel tests don't collide.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            handle,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value, token: Option<&str>) -> (u16, Value) {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn bafy1() -> Value {
    json!({
        "id": "bafy1",
        "studentAddress": STUDENT,
        "name": "A",
        "degree": "BSc",
        "major": "CS",
        "year": "2024"
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_issue_then_admin_verify() -> Result<(), Box<dyn std::error::Error>> {
    let server = TestServer::start(false).await?;

    let (status, health) = server.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(health["success"], true);
    assert_eq!(health["data"]["certificates"], 0);

    // --- ISSUE ---
    let (status, receipt) = server.post("/cert/issue", bafy1(), None).await;
    assert_eq!(status, 200, "issue failed: {}", receipt);
    assert_eq!(receipt["id"], "bafy1");
    let tx = receipt["transactionId"].as_str().unwrap().to_string();
    assert!(tx.starts_with("0x"));
    assert_eq!(tx.len(), 66);

    // --- PENDING ---
    let (status, pending) = server.get("/cert/pending").await;
    assert_eq!(status, 200);
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], "bafy1");
    assert_eq!(pending[0]["valid"], false);
    assert_eq!(pending[0]["issuer"], "Mock University");

    // --- ADMIN VERIFY ---
    let (status, record) = server
        .post("/cert/admin-verify", json!({ "id": "bafy1" }), None)
        .await;
    assert_eq!(status, 200, "verify failed: {}", record);
    assert_eq!(record["valid"], true);
    assert_eq!(record["transactionId"], tx.as_str());

    let (_, pending) = server.get("/cert/pending").await;
    assert!(pending.as_array().unwrap().is_empty());

    // Re-verifying is accepted and leaves the record as it was.
    let (status, again) = server
        .post("/cert/admin-verify", json!({ "cid": "bafy1" }), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(again, record);

    // --- LOOKUPS ---
    let (status, by_cid) = server.get("/cert/cid/bafy1").await;
    assert_eq!(status, 200);
    assert_eq!(by_cid, record);

    let (status, by_tx) = server.get(&format!("/cert/tx/{}", tx)).await;
    assert_eq!(status, 200);
    assert_eq!(by_tx["id"], "bafy1");

    // --- DASHBOARD FEEDS ---
    // Address matching ignores case.
    let (status, mine) = server
        .get(&format!("/student/certificates?address={}", STUDENT.to_uppercase()))
        .await;
    assert_eq!(status, 200);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (status, activity) = server.get("/issuer/activity").await;
    assert_eq!(status, 200);
    let activity = activity.as_array().unwrap();
    assert_eq!(activity.len(), 2);
    assert_eq!(activity[0]["type"], "VERIFY");
    assert_eq!(activity[1]["type"], "ISSUE");
    assert_eq!(activity[1]["summary"], "A • BSc");

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_issue_rejections() -> Result<(), Box<dyn std::error::Error>> {
    let server = TestServer::start(false).await?;

    let mut no_name = bafy1();
    no_name["name"] = json!("");
    let (status, body) = server.post("/cert/issue", no_name, None).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "name is required");

    let mut bad_address = bafy1();
    bad_address["studentAddress"] = json!("0x123");
    let (status, body) = server.post("/cert/issue", bad_address, None).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid student address");

    // Numeric year and an absent student address are accepted.
    let (status, _) = server
        .post(
            "/cert/issue",
            json!({ "id": "bafy2", "name": "B", "degree": "MSc", "major": "Math", "year": 2023 }),
            None,
        )
        .await;
    assert_eq!(status, 200);

    let (status, _) = server.post("/cert/issue", bafy1(), None).await;
    assert_eq!(status, 200);
    let (status, body) = server.post("/cert/issue", bafy1(), None).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Certificate already issued: bafy1");

    // Body that is not JSON at all.
    let resp = server
        .client
        .post(server.url("/cert/issue"))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 422);

    let (_, health) = server.get("/health").await;
    assert_eq!(health["data"]["certificates"], 2);
    assert_eq!(health["data"]["pending"], 2);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_lookup_and_verify_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let server = TestServer::start(false).await?;

    let (status, body) = server.get("/cert/cid/nope").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Certificate not found for CID: nope");

    let (status, body) = server.get("/cert/tx/0xdead").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Certificate not found for TX: 0xdead");

    let (status, _) = server
        .post("/cert/admin-verify", json!({ "id": "nope" }), None)
        .await;
    assert_eq!(status, 404);

    let (status, body) = server
        .post("/cert/admin-verify", json!({ "id": "  " }), None)
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "id is required");

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_wallet_and_email_sign_in() -> Result<(), Box<dyn std::error::Error>> {
    let server = TestServer::start(false).await?;

    let (status, body) = server
        .post("/auth/nonce", json!({ "address": STUDENT }), None)
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Address and role required");

    let (status, body) = server
        .post("/auth/nonce", json!({ "address": STUDENT, "role": "student" }), None)
        .await;
    assert_eq!(status, 200);
    let nonce = body["nonce"].as_str().unwrap().to_string();
    assert!(!nonce.is_empty());

    let signed = json!({
        "address": STUDENT,
        "role": "student",
        "signature": "0xsig",
        "message": format!("Sign in to Acadi: {}", nonce)
    });
    let (status, body) = server.post("/auth/verify", signed.clone(), None).await;
    assert_eq!(status, 200);
    assert_eq!(body["role"], "student");
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);

    // The nonce was consumed.
    let (status, body) = server.post("/auth/verify", signed, None).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Nonce not found");

    let (status, body) = server
        .post("/auth/login", json!({ "email": "reg@uni.edu", "role": "issuer" }), None)
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Missing data");

    let (status, body) = server
        .post(
            "/auth/login",
            json!({ "email": "reg@uni.edu", "password": "pw", "role": "issuer" }),
            None,
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["role"], "issuer");

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_role_enforcement() -> Result<(), Box<dyn std::error::Error>> {
    let server = TestServer::start(true).await?;

    let (status, _) = server.post("/cert/issue", bafy1(), None).await;
    assert_eq!(status, 401);

    let (_, body) = server
        .post(
            "/auth/login",
            json!({ "email": "reg@uni.edu", "password": "pw", "role": "issuer" }),
            None,
        )
        .await;
    let issuer_token = body["token"].as_str().unwrap().to_string();

    let (_, body) = server
        .post(
            "/auth/login",
            json!({ "email": "ops@uni.edu", "password": "pw", "role": "admin" }),
            None,
        )
        .await;
    let admin_token = body["token"].as_str().unwrap().to_string();

    let (status, _) = server
        .post("/cert/issue", bafy1(), Some("not.a.token"))
        .await;
    assert_eq!(status, 401);

    let (status, _) = server
        .post("/cert/issue", bafy1(), Some(&issuer_token))
        .await;
    assert_eq!(status, 200);

    // Issuers may not approve.
    let (status, body) = server
        .post("/cert/admin-verify", json!({ "id": "bafy1" }), Some(&issuer_token))
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["success"], false);

    let (status, record) = server
        .post("/cert/admin-verify", json!({ "id": "bafy1" }), Some(&admin_token))
        .await;
    assert_eq!(status, 200);
    assert_eq!(record["valid"], true);

    // Reads stay open.
    let (status, _) = server.get("/cert/cid/bafy1").await;
    assert_eq!(status, 200);

    Ok(())
}
