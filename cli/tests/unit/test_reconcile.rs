//! Reconciler unit tests

use std::path::PathBuf;
use std::time::Duration;

use serde_json::{json, Value};

use tidesync::errors::SyncError;
use tidesync::reconcile::definition::Definition;
use tidesync::reconcile::spec::DeployMode;
use tidesync::reconcile::{Decision, ReconcileOptions, Reconciler, Summary};
use tidesync::watch::WatchOptions;

use crate::common::{auth_ok, ok, session, MockNet};

fn fast_options() -> ReconcileOptions {
    ReconcileOptions {
        mode: DeployMode::Compose,
        dry_run: false,
        watch: WatchOptions {
            poll_interval: Duration::from_millis(1),
            raw_result: true,
        },
    }
}

fn definition(name: &str, document: Value) -> Definition {
    Definition {
        name: name.to_string(),
        path: PathBuf::from(format!("{name}.yaml")),
        document,
    }
}

#[tokio::test]
async fn missing_app_is_created_and_its_job_watched() {
    let document = json!({"services": {"web": {"image": "nginx"}}});
    let net = MockNet::new(vec![
        auth_ok(),
        ok("app.query", json!([])),
        ok("app.create", json!(12)),
        ok("core.get_jobs", json!({"id": 12, "state": "SUCCESS"})),
    ]);
    let mut session = session(&net);
    let mut reconciler = Reconciler::new(&mut session, fast_options());
    let mut summary = Summary::default();

    let decision = reconciler
        .reconcile(&definition("web", document.clone()), &mut summary)
        .await
        .unwrap();

    assert_eq!(decision, Decision::Create);
    assert_eq!(
        summary,
        Summary {
            created: 1,
            ..Default::default()
        }
    );

    let calls = net.calls();
    assert_eq!(calls[1].1[0], json!([["name", "=", "web"]]));
    assert_eq!(calls[2].0, "app.create");
    assert_eq!(
        calls[2].1[0],
        json!({
            "app_name": "web",
            "custom_app": true,
            "custom_compose_config": document,
        })
    );
}

#[tokio::test]
async fn equivalent_config_is_skipped() {
    // Same document modulo key order and (sortable) list order.
    let desired = json!({"services": {"web": {"image": "nginx"}}, "ports": ["b", "a"]});
    let current = json!({"ports": ["a", "b"], "services": {"web": {"image": "nginx"}}});

    let net = MockNet::new(vec![
        auth_ok(),
        ok("app.query", json!([{"name": "web"}])),
        ok("app.config", current),
    ]);
    let mut session = session(&net);
    let mut reconciler = Reconciler::new(&mut session, fast_options());
    let mut summary = Summary::default();

    let decision = reconciler
        .reconcile(&definition("web", desired), &mut summary)
        .await
        .unwrap();

    assert_eq!(decision, Decision::Skip);
    assert_eq!(summary.skipped, 1);
    assert!(net.exhausted(), "no mutating calls were made");
    assert_eq!(net.methods(), vec!["auth.login", "app.query", "app.config"]);
}

#[tokio::test]
async fn drifted_config_is_updated_and_its_job_watched() {
    let desired = json!({"services": {"web": {"image": "nginx:1.28"}}});
    let current = json!({"services": {"web": {"image": "nginx:1.27"}}});

    let net = MockNet::new(vec![
        auth_ok(),
        ok("app.query", json!([{"name": "web"}])),
        ok("app.config", current),
        ok("app.update", json!(99)),
        ok("core.get_jobs", json!({"id": 99, "state": "SUCCESS"})),
    ]);
    let mut session = session(&net);
    let mut reconciler = Reconciler::new(&mut session, fast_options());
    let mut summary = Summary::default();

    let decision = reconciler
        .reconcile(&definition("web", desired.clone()), &mut summary)
        .await
        .unwrap();

    assert_eq!(decision, Decision::Update);
    assert_eq!(summary.updated, 1);

    let calls = net.calls();
    assert_eq!(calls[3].0, "app.update");
    assert_eq!(calls[3].1[0], json!("web"));
    assert_eq!(calls[3].1[1], json!({"custom_compose_config": desired}));
}

#[tokio::test]
async fn failed_job_is_recorded_but_not_fatal() {
    let net = MockNet::new(vec![
        auth_ok(),
        ok("app.query", json!([])),
        ok("app.create", json!(12)),
        ok(
            "core.get_jobs",
            json!({"id": 12, "state": "FAILED", "error": "no such image"}),
        ),
    ]);
    let mut session = session(&net);
    let mut reconciler = Reconciler::new(&mut session, fast_options());
    let mut summary = Summary::default();

    let result = reconciler
        .reconcile(&definition("web", json!({"services": {}})), &mut summary)
        .await;

    assert!(result.is_ok(), "job failure is data, not an error");
    assert_eq!(summary.failed_jobs, 1);
    assert!(!summary.ok());
}

#[tokio::test]
async fn dry_run_announces_without_mutating() {
    let net = MockNet::new(vec![auth_ok(), ok("app.query", json!([]))]);
    let mut session = session(&net);
    let options = ReconcileOptions {
        dry_run: true,
        ..fast_options()
    };
    let mut reconciler = Reconciler::new(&mut session, options);
    let mut summary = Summary::default();

    let decision = reconciler
        .reconcile(&definition("web", json!({"services": {}})), &mut summary)
        .await
        .unwrap();

    assert_eq!(decision, Decision::Create);
    assert!(net.exhausted(), "no app.create was issued");
}

#[tokio::test]
async fn values_mode_sends_flat_payloads() {
    let document = json!({"replicas": 2});
    let net = MockNet::new(vec![
        auth_ok(),
        ok("app.query", json!([])),
        ok("app.create", json!(3)),
        ok("core.get_jobs", json!({"id": 3, "state": "SUCCESS"})),
    ]);
    let mut session = session(&net);
    let options = ReconcileOptions {
        mode: DeployMode::Values,
        ..fast_options()
    };
    let mut reconciler = Reconciler::new(&mut session, options);
    let mut summary = Summary::default();

    reconciler
        .reconcile(&definition("db", document.clone()), &mut summary)
        .await
        .unwrap();

    let calls = net.calls();
    assert_eq!(calls[2].1[0], document, "catalog creates send the document flat");
}

#[tokio::test]
async fn preflight_passes_a_running_runtime() {
    let net = MockNet::new(vec![auth_ok(), ok("docker.status", json!({"status": "RUNNING"}))]);
    let mut session = session(&net);
    let mut reconciler = Reconciler::new(&mut session, fast_options());

    assert!(reconciler.preflight().await.is_ok());
}

#[tokio::test]
async fn preflight_rejects_an_unconfigured_runtime() {
    let net = MockNet::new(vec![
        auth_ok(),
        ok("docker.status", json!({"status": "UNCONFIGURED"})),
    ]);
    let mut session = session(&net);
    let mut reconciler = Reconciler::new(&mut session, fast_options());

    match reconciler.preflight().await {
        Err(SyncError::RuntimeNotReady(message)) => {
            assert!(message.contains("UNCONFIGURED"));
        }
        other => panic!("expected RuntimeNotReady, got {other:?}"),
    }
}

#[tokio::test]
async fn preflight_reports_unknown_states_verbatim() {
    let net = MockNet::new(vec![
        auth_ok(),
        ok("docker.status", json!({"status": "INITIALIZING"})),
    ]);
    let mut session = session(&net);
    let mut reconciler = Reconciler::new(&mut session, fast_options());

    match reconciler.preflight().await {
        Err(SyncError::RuntimeNotReady(message)) => {
            assert!(message.contains("INITIALIZING"));
        }
        other => panic!("expected RuntimeNotReady, got {other:?}"),
    }
}

#[tokio::test]
async fn run_processes_a_directory_in_lexicographic_order() {
    let dir = tempfile::tempdir().unwrap();
    let db_doc = json!({"services": {"db": {"image": "postgres"}}});
    std::fs::write(
        dir.path().join("a-db.json"),
        serde_json::to_string(&db_doc).unwrap(),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("b-web.yaml"),
        "services:\n  web:\n    image: nginx\n",
    )
    .unwrap();

    let net = MockNet::new(vec![
        auth_ok(),
        ok("docker.status", json!({"status": "RUNNING"})),
        // a-db.json: exists, config identical -> skip
        ok("app.query", json!([{"name": "a-db"}])),
        ok("app.config", db_doc),
        // b-web.yaml: missing -> create
        ok("app.query", json!([])),
        ok("app.create", json!(5)),
        ok("core.get_jobs", json!({"id": 5, "state": "SUCCESS"})),
    ]);
    let mut session = session(&net);
    let mut reconciler = Reconciler::new(&mut session, fast_options());

    let summary = reconciler.run(dir.path()).await.unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(summary.skipped, 1);
    assert!(summary.ok());

    let calls = net.calls();
    assert_eq!(calls[2].1[0], json!([["name", "=", "a-db"]]));
    assert_eq!(calls[4].1[0], json!([["name", "=", "b-web"]]));
    assert!(net.exhausted());
}

#[tokio::test]
async fn invalid_definition_aborts_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("app.txt"), "not a definition").unwrap();

    let net = MockNet::new(vec![
        auth_ok(),
        ok("docker.status", json!({"status": "RUNNING"})),
    ]);
    let mut session = session(&net);
    let mut reconciler = Reconciler::new(&mut session, fast_options());

    match reconciler.run(dir.path()).await {
        Err(SyncError::InvalidDefinition(message)) => {
            assert!(message.contains("app.txt"));
            assert!(message.contains(".yaml"));
        }
        other => panic!("expected InvalidDefinition, got {other:?}"),
    }
}
