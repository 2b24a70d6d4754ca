//! Activation behavior of the scheduler wrapper.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use stowage_core::{RemoteCache, TasksRunner};
use stowage_credentials::{CredentialError, SAS_TOKEN_ENV_VAR};
use stowage_runner::{Error, RemoteCacheOptions, run_tasks};

/// Scheduler double that records whether the capability was injected and
/// returns the task count as its outcome.
#[derive(Default)]
struct RecordingScheduler {
    invoked: AtomicBool,
    saw_remote_cache: AtomicBool,
}

#[async_trait]
impl TasksRunner<String, &'static str> for RecordingScheduler {
    type Outcome = usize;

    async fn run(
        &self,
        tasks: Vec<String>,
        _context: &'static str,
        remote_cache: Option<Arc<dyn RemoteCache>>,
    ) -> usize {
        self.invoked.store(true, Ordering::SeqCst);
        self.saw_remote_cache
            .store(remote_cache.is_some(), Ordering::SeqCst);
        tasks.len()
    }
}

fn tasks() -> Vec<String> {
    vec!["app:build".to_string(), "app:test".to_string()]
}

#[tokio::test]
async fn no_credentials_means_local_only_run() {
    let scheduler = RecordingScheduler::default();
    let options = RemoteCacheOptions::new("acct", "cache");

    let outcome = temp_env::async_with_vars([(SAS_TOKEN_ENV_VAR, None::<&str>)], async {
        run_tasks(&scheduler, tasks(), "run-ctx", &options).await
    })
    .await
    .unwrap();

    assert_eq!(outcome, 2);
    assert!(!scheduler.saw_remote_cache.load(Ordering::SeqCst));
}

#[tokio::test]
async fn explicit_token_activates_remote_caching() {
    let scheduler = RecordingScheduler::default();
    let mut options = RemoteCacheOptions::new("acct", "cache");
    options.sas_token = Some("?sv=2024&sig=abc".to_string());

    let outcome = run_tasks(&scheduler, tasks(), "run-ctx", &options)
        .await
        .unwrap();

    assert_eq!(outcome, 2);
    assert!(scheduler.saw_remote_cache.load(Ordering::SeqCst));
}

#[tokio::test]
async fn env_token_activates_remote_caching() {
    let scheduler = RecordingScheduler::default();
    let options = RemoteCacheOptions::new("acct", "cache");

    let outcome = temp_env::async_with_vars([(SAS_TOKEN_ENV_VAR, Some("sv=2024&sig=env"))], async {
        run_tasks(&scheduler, tasks(), "run-ctx", &options).await
    })
    .await
    .unwrap();

    assert_eq!(outcome, 2);
    assert!(scheduler.saw_remote_cache.load(Ordering::SeqCst));
}

#[tokio::test]
async fn unusable_explicit_token_aborts_before_any_task() {
    let scheduler = RecordingScheduler::default();
    let mut options = RemoteCacheOptions::new("acct", "cache");
    options.sas_token = Some(String::new());

    let result = temp_env::async_with_vars([(SAS_TOKEN_ENV_VAR, None::<&str>)], async {
        run_tasks(&scheduler, tasks(), "run-ctx", &options).await
    })
    .await;

    assert!(matches!(
        result,
        Err(Error::Credentials(CredentialError::MissingCredential))
    ));
    // The scheduler was never invoked.
    assert!(!scheduler.invoked.load(Ordering::SeqCst));
}

#[test]
fn options_deserialize_from_runner_config() {
    let options: RemoteCacheOptions = serde_json::from_str(
        r#"{"storageAccount": "acct", "storageContainer": "nx-cache", "sasToken": "?sig=x"}"#,
    )
    .unwrap();
    assert_eq!(options.storage_account, "acct");
    assert_eq!(options.storage_container, "nx-cache");
    assert_eq!(options.sas_token.as_deref(), Some("?sig=x"));
    assert_eq!(options.timeout_secs, 3600);
}
