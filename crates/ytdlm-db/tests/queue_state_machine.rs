//! Queue state machine scenarios against a file-backed `SQLite` store.

use std::path::Path;

use tempfile::TempDir;
use ytdlm_core::{DownloadStatus, QueueError, QueueService};
use ytdlm_db::{CoreFactory, create_schema, setup_database};

async fn open_queue(path: &Path) -> QueueService {
    let pool = CoreFactory::create_pool(path).await.unwrap();
    CoreFactory::build_queue(pool)
}

fn store_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("data").join("yt_dl_manager.db")
}

#[tokio::test]
async fn enqueue_twice_yields_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let queue = open_queue(&store_path(&dir)).await;

    let first = queue.enqueue("https://x.test/a").await.unwrap();
    assert_eq!(first.record.id, 1);
    assert!(!first.already_existed);

    let second = queue.enqueue("https://x.test/a").await.unwrap();
    assert_eq!(second.record.id, 1);
    assert!(second.already_existed);

    assert_eq!(queue.stats().await.unwrap().total(), 1);
}

#[tokio::test]
async fn pending_records_come_back_in_request_order() {
    let dir = tempfile::tempdir().unwrap();
    let queue = open_queue(&store_path(&dir)).await;

    let urls = ["https://x.test/1", "https://x.test/2", "https://x.test/3"];
    for url in urls {
        queue.enqueue(url).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let pending = queue.get_pending(None).await.unwrap();
    let got: Vec<_> = pending.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(got, urls);
}

#[tokio::test]
async fn three_failures_exhaust_the_budget() {
    let dir = tempfile::tempdir().unwrap();
    let queue = open_queue(&store_path(&dir)).await;
    let max_retries = 3;

    let id = queue.enqueue("https://x.test/a").await.unwrap().record.id;
    for attempt in 1..=3 {
        queue.mark_downloading(id).await.unwrap();
        let failed = queue.mark_failed(id).await.unwrap();
        assert_eq!(failed.retries, attempt);
        assert_eq!(failed.status, DownloadStatus::Failed);
        assert!(failed.terminal_fields_consistent());

        if failed.retries < max_retries {
            queue.retry(id).await.unwrap();
        }
    }

    let record = queue.get(id).await.unwrap().unwrap();
    assert_eq!(record.status, DownloadStatus::Failed);
    assert_eq!(record.retries, 3);
    assert!(queue.get_pending(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn successful_download_persists_terminal_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    let queue = open_queue(&path).await;

    let id = queue.enqueue("https://x.test/a").await.unwrap().record.id;
    queue.mark_downloading(id).await.unwrap();
    queue
        .mark_downloaded(id, "downloads/youtube/title.mp4", "youtube")
        .await
        .unwrap();

    // Reopen to prove the fields reached the file.
    let reopened = open_queue(&path).await;
    let record = reopened.get(id).await.unwrap().unwrap();
    assert_eq!(record.status, DownloadStatus::Downloaded);
    assert_eq!(record.final_filename.as_deref(), Some("downloads/youtube/title.mp4"));
    assert_eq!(record.extractor.as_deref(), Some("youtube"));
    assert!(record.timestamp_downloaded.is_some());
    assert!(record.terminal_fields_consistent());
}

#[tokio::test]
async fn missing_id_mutates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let queue = open_queue(&store_path(&dir)).await;
    queue.enqueue("https://x.test/a").await.unwrap();
    let before = queue.stats().await.unwrap();

    assert!(matches!(
        queue.mark_downloading(404).await,
        Err(QueueError::RecordNotFound(404))
    ));
    assert!(matches!(
        queue.mark_downloaded(404, "f", "x").await,
        Err(QueueError::RecordNotFound(404))
    ));
    assert!(matches!(
        queue.mark_failed(404).await,
        Err(QueueError::RecordNotFound(404))
    ));

    assert_eq!(queue.stats().await.unwrap(), before);
}

#[tokio::test]
async fn only_one_worker_wins_the_claim() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    let worker_a = open_queue(&path).await;
    let worker_b = open_queue(&path).await;

    let id = worker_a.enqueue("https://x.test/a").await.unwrap().record.id;

    let (a, b) = tokio::join!(worker_a.mark_downloading(id), worker_b.mark_downloading(id));
    let wins = [a.is_ok(), b.is_ok()].into_iter().filter(|ok| *ok).count();
    assert_eq!(wins, 1);

    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(
        loser,
        Err(QueueError::InvalidTransition {
            from: DownloadStatus::Downloading,
            to: DownloadStatus::Downloading,
            ..
        })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_enqueues_of_one_url_create_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    let mut queues = Vec::new();
    for _ in 0..4 {
        queues.push(open_queue(&path).await);
    }

    let mut tasks = Vec::new();
    for queue in &queues {
        for _ in 0..8 {
            let queue = queue.clone();
            tasks.push(tokio::spawn(async move {
                queue.enqueue("https://x.test/same").await
            }));
        }
    }

    let mut created = 0;
    let mut ids = std::collections::BTreeSet::new();
    for task in tasks {
        let outcome = task.await.unwrap().unwrap();
        if !outcome.already_existed {
            created += 1;
        }
        ids.insert(outcome.record.id);
    }

    assert_eq!(created, 1);
    assert_eq!(ids.len(), 1);
    assert_eq!(queues[0].stats().await.unwrap().total(), 1);
}

#[tokio::test]
async fn schema_init_twice_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);

    let pool = setup_database(&path).await.unwrap();
    let queue = CoreFactory::build_queue(pool.clone());
    queue.enqueue("https://x.test/a").await.unwrap();

    create_schema(&pool).await.unwrap();
    pool.close().await;

    let queue = open_queue(&path).await;
    assert_eq!(queue.stats().await.unwrap().pending, 1);
}

#[tokio::test]
async fn redownload_reset_keeps_retry_counter() {
    let dir = tempfile::tempdir().unwrap();
    let queue = open_queue(&store_path(&dir)).await;

    let id = queue.enqueue("https://x.test/a").await.unwrap().record.id;
    queue.mark_downloading(id).await.unwrap();
    queue.mark_failed(id).await.unwrap();
    queue.retry(id).await.unwrap();
    queue.mark_downloading(id).await.unwrap();
    queue.mark_downloaded(id, "a.webm", "generic").await.unwrap();

    let reset = queue.reset_for_redownload(id).await.unwrap();
    assert_eq!(reset.status, DownloadStatus::Pending);
    assert_eq!(reset.retries, 1);
    assert!(reset.terminal_fields_consistent());

    assert_eq!(queue.search("x.test").await.unwrap().len(), 1);
    assert!(queue.delete(id).await.unwrap());
    assert!(queue.get(id).await.unwrap().is_none());
}
