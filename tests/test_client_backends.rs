//! Drives the same scenario through every `CertificateApi` backend.

use acadi_certificates::app::auth_service::{LoginRequest, NonceRequest, SignatureRequest};
use acadi_certificates::crypto::TokenCodec;
use acadi_certificates::domain::session::{guard, GuardOutcome, Route};
use acadi_certificates::infra::{BackendKind, Config};
use acadi_certificates::storage::SnapshotFile;
use acadi_certificates::{
    connect, transport, AuthService, CertificateApi, CertificateService, LocalClient,
    MemoryClient, RemoteClient, Role, Session, SessionStore, Submission,
};

const STUDENT: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

fn submission(id: &str) -> Submission {
    Submission {
        id: id.to_string(),
        student_address: Some(STUDENT.to_string()),
        name: "Ada".to_string(),
        degree: "BSc".to_string(),
        major: "CS".to_string(),
        year: "2024".to_string(),
        issuer: None,
    }
}

async fn issue_verify_lookup(api: &dyn CertificateApi) {
    let receipt = api
        .issue_certificate(submission("bafy1"), None)
        .await
        .unwrap();
    assert_eq!(receipt.id, "bafy1");

    let pending = api.pending_certificates().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert!(!pending[0].verified);

    let dup = api
        .issue_certificate(submission("bafy1"), None)
        .await
        .unwrap_err();
    assert!(dup.to_string().contains("Certificate already issued: bafy1"), "{}", dup);

    let record = api.admin_verify("bafy1", None).await.unwrap();
    assert!(record.verified);
    assert!(api.pending_certificates().await.unwrap().is_empty());

    let by_tx = api.lookup_by_tx(&receipt.transaction_id).await.unwrap();
    assert_eq!(by_tx, record);
    assert_eq!(api.lookup_by_id("bafy1").await.unwrap(), record);

    let missing = api.lookup_by_id("nope").await.unwrap_err();
    assert!(missing.is_not_found(), "{}", missing);
    let missing = api.admin_verify("nope", None).await.unwrap_err();
    assert!(missing.is_not_found(), "{}", missing);

    let mine = api.my_certificates(Some(STUDENT), None).await.unwrap();
    assert_eq!(mine.len(), 1);
    let other = api
        .my_certificates(Some("0x0000000000000000000000000000000000000000"), None)
        .await
        .unwrap();
    assert!(other.is_empty());

    let activity = api.issuer_activity(None).await.unwrap();
    assert_eq!(activity.len(), 2);
    assert_eq!(activity[0].id, "bafy1");
}

async fn wallet_sign_in(api: &dyn CertificateApi) {
    let nonce = api
        .request_nonce(NonceRequest {
            address: STUDENT.to_string(),
            role: "student".to_string(),
        })
        .await
        .unwrap()
        .nonce;
    let resp = api
        .verify_signature(SignatureRequest {
            address: STUDENT.to_string(),
            role: "student".to_string(),
            signature: "0x".to_string(),
            message: format!("Sign in to Acadi: {}", nonce),
        })
        .await
        .unwrap();
    assert_eq!(resp.role, Some(Role::Student));
    assert!(!resp.token.is_empty());

    let err = api
        .email_login(LoginRequest {
            email: "reg@uni.edu".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Missing data"), "{}", err);
}

#[tokio::test]
async fn test_memory_backend() {
    let api = MemoryClient::default();
    assert_eq!(api.backend(), BackendKind::Memory);
    issue_verify_lookup(&api).await;
    wallet_sign_in(&api).await;
}

#[tokio::test]
async fn test_local_backend_persists_between_clients() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mockdb.json");

    let first = LocalClient::new(
        SnapshotFile::new(&path),
        "Mock University",
        AuthService::new(TokenCodec::with_random_key(3600)),
    );
    assert_eq!(first.backend(), BackendKind::Local);
    issue_verify_lookup(&first).await;
    wallet_sign_in(&first).await;

    // A second client on the same file sees the first one's writes.
    let second = LocalClient::new(
        SnapshotFile::new(&path),
        "Mock University",
        AuthService::new(TokenCodec::with_random_key(3600)),
    );
    let record = second.lookup_by_id("bafy1").await.unwrap();
    assert!(record.verified);
    assert_eq!(second.issuer_activity(None).await.unwrap().len(), 2);

    // A client on a different file does not.
    let isolated = LocalClient::new(
        SnapshotFile::new(dir.path().join("other.json")),
        "Mock University",
        AuthService::new(TokenCodec::with_random_key(3600)),
    );
    assert!(isolated.lookup_by_id("bafy1").await.unwrap_err().is_not_found());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_remote_backend() -> Result<(), Box<dyn std::error::Error>> {
    let app_state = transport::http::AppState::new(
        CertificateService::new("Mock University"),
        AuthService::new(TokenCodec::new("test-secret", 3600)),
        false,
    );
    let router = transport::http::create_router(app_state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let api = RemoteClient::new(&format!("http://127.0.0.1:{}/", port))?;
    assert_eq!(api.base_url(), format!("http://127.0.0.1:{}", port));
    assert_eq!(api.backend(), BackendKind::Remote);
    issue_verify_lookup(&api).await;
    wallet_sign_in(&api).await;

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_connect_selects_backend_and_cli_session_flow() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        backend: BackendKind::Local,
        local_db_path: dir.path().join("db.json"),
        session_path: dir.path().join("auth.json"),
        ..Config::default()
    };
    let api = connect(&config).unwrap();
    assert_eq!(api.backend(), BackendKind::Local);

    // Signed-out users are sent to sign-in before reaching the issuer view.
    let mut session = SessionStore::open(&config.session_path).unwrap();
    assert_eq!(
        guard(session.current(), Route::Issuer),
        GuardOutcome::Redirect(Route::SignIn)
    );

    let resp = api
        .email_login(LoginRequest {
            email: "reg@uni.edu".to_string(),
            password: "pw".to_string(),
            role: "issuer".to_string(),
        })
        .await
        .unwrap();
    session
        .login(Session {
            token: resp.token,
            role: Role::Issuer,
            address: None,
            email: Some("reg@uni.edu".to_string()),
        })
        .unwrap();
    assert_eq!(guard(session.current(), Route::Issuer), GuardOutcome::Allow);

    let mut blank = submission("");
    let id = blank.ensure_id().to_string();
    let receipt = api.issue_certificate(blank, session.token()).await.unwrap();
    assert_eq!(receipt.id, id);

    // The session survives a restart of the CLI.
    let reopened = SessionStore::open(&config.session_path).unwrap();
    assert_eq!(reopened.role(), Role::Issuer);
    assert_eq!(
        guard(reopened.current(), Route::Verifier),
        GuardOutcome::Redirect(Route::Dashboard)
    );
}

#[tokio::test]
async fn test_default_backend_persists_between_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        local_db_path: dir.path().join("db.json"),
        ..Config::default()
    };

    // Each `acadi` run builds a fresh client from the same configuration.
    let first_run = connect(&config).unwrap();
    first_run
        .issue_certificate(submission("bafy7"), None)
        .await
        .unwrap();
    drop(first_run);

    let second_run = connect(&config).unwrap();
    let pending = second_run.pending_certificates().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "bafy7");
}
