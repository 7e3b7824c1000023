//! Test support: a scripted in-process Master and mock collaborators
//!
//! The scripted Master binds a real TCP listener and answers each framed
//! worker message through a closure, recording everything it saw, so the
//! loops can be exercised end to end against the real wire format.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use gantry_client::wire;
use gantry_core::domain::job::{JobPayload, Node};
use gantry_core::domain::log::{LogRef, WORKER_LOG_NAME};
use gantry_core::domain::status::JobOutcome;
use gantry_core::proto::{MasterMessage, WorkerMessage, WorkerMessageType};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::config::Config;
use crate::service::{BlobStore, ByteStream, Job, JobFactory};
use crate::supervisor::Worker;

/// A payload whose node carries a worker log sink
pub fn payload_with_worker_log(command: &str) -> JobPayload {
    JobPayload::new(Node::new(Uuid::new_v4(), command).with_log(LogRef::new(WORKER_LOG_NAME)))
}

/// Config aimed at a scripted master, with tick intervals tight enough
/// for tests
pub fn test_config(addr: SocketAddr) -> Config {
    let mut config = Config::new("test-worker", addr.ip().to_string(), addr.port());
    config.heartbeat_interval = Duration::from_millis(10);
    config.runner_interval = Duration::from_millis(10);
    config.io_timeout = Duration::from_secs(2);
    config
}

/// Builds a worker wired to a freshly spawned scripted master
pub async fn test_worker<F>(
    job: Arc<MockJob>,
    blobs: Arc<MockBlobStore>,
    reply: F,
) -> (Arc<Worker>, ScriptedMaster)
where
    F: FnMut(&WorkerMessage) -> MasterMessage + Send + 'static,
{
    let master = ScriptedMaster::spawn(reply).await;
    let config = test_config(master.addr);
    let worker = Arc::new(Worker::new(config, MockJobFactory::new(job), blobs));
    (worker, master)
}

/// Polls a condition until it holds, panicking after ten seconds
pub async fn wait_until(mut predicate: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while !predicate() {
        if tokio::time::Instant::now() > deadline {
            panic!("condition not reached within 10s");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// An in-process Master scripted by a reply closure
pub struct ScriptedMaster {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<WorkerMessage>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl ScriptedMaster {
    /// Binds an ephemeral port and starts answering
    pub async fn spawn<F>(reply: F) -> Self
    where
        F: FnMut(&WorkerMessage) -> MasterMessage + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Self::with_listener(listener, reply)
    }

    /// Binds a specific address; used to bring a master "back up"
    pub async fn spawn_on<F>(addr: SocketAddr, reply: F) -> Self
    where
        F: FnMut(&WorkerMessage) -> MasterMessage + Send + 'static,
    {
        let listener = TcpListener::bind(addr).await.unwrap();
        Self::with_listener(listener, reply)
    }

    fn with_listener<F>(listener: TcpListener, mut reply: F) -> Self
    where
        F: FnMut(&WorkerMessage) -> MasterMessage + Send + 'static,
    {
        let addr = listener.local_addr().unwrap();
        let seen: Arc<Mutex<Vec<WorkerMessage>>> = Arc::default();
        let recorded = Arc::clone(&seen);

        let handle = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let Ok(frame) = wire::read_message(&mut stream).await else {
                    continue;
                };
                let Ok(message) = wire::decode::<WorkerMessage>(&frame) else {
                    continue;
                };

                let answer = reply(&message);
                recorded.lock().unwrap().push(message);

                let payload = wire::encode(&answer).unwrap();
                let _ = wire::write_message(&mut stream, &payload).await;
            }
        });

        Self { addr, seen, handle }
    }

    /// Messages of one type seen so far, in arrival order
    pub fn received(&self, message_type: WorkerMessageType) -> Vec<WorkerMessage> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|message| message.message_type == message_type)
            .cloned()
            .collect()
    }

    pub fn count(&self, message_type: WorkerMessageType) -> usize {
        self.received(message_type).len()
    }

    /// Stops accepting; connects start failing as if the master went down
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for ScriptedMaster {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A scriptable job: instant, blocking-until-released, or crashing
pub struct MockJob {
    outcome: JobOutcome,
    crash_message: Option<String>,
    blocking: bool,
    kill_count: AtomicUsize,
    release_signal: Notify,
    kill_signal: Notify,
}

impl MockJob {
    fn build(outcome: JobOutcome, crash_message: Option<String>, blocking: bool) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            crash_message,
            blocking,
            kill_count: AtomicUsize::new(0),
            release_signal: Notify::new(),
            kill_signal: Notify::new(),
        })
    }

    /// Completes immediately with the given outcome
    pub fn instant(outcome: JobOutcome) -> Arc<Self> {
        Self::build(outcome, None, false)
    }

    /// Blocks until released or killed; a kill makes it report FAILED
    pub fn blocking(outcome: JobOutcome) -> Arc<Self> {
        Self::build(outcome, None, true)
    }

    /// Crashes immediately with the given error message
    pub fn crashing(message: &str) -> Arc<Self> {
        Self::build(JobOutcome::Failed, Some(message.to_string()), false)
    }

    /// Lets a blocking job complete naturally
    pub fn release(&self) {
        self.release_signal.notify_one();
    }

    pub fn kill_count(&self) -> usize {
        self.kill_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Job for MockJob {
    async fn run(&self) -> Result<JobOutcome> {
        if self.blocking {
            tokio::select! {
                _ = self.release_signal.notified() => {}
                _ = self.kill_signal.notified() => return Ok(JobOutcome::Failed),
            }
        }

        match &self.crash_message {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(self.outcome),
        }
    }

    fn kill(&self) {
        self.kill_count.fetch_add(1, Ordering::SeqCst);
        self.kill_signal.notify_one();
    }
}

/// Hands out the same mock job for every payload
pub struct MockJobFactory {
    job: Arc<MockJob>,
}

impl MockJobFactory {
    pub fn new(job: Arc<MockJob>) -> Arc<Self> {
        Arc::new(Self { job })
    }
}

impl JobFactory for MockJobFactory {
    fn build(&self, _payload: &JobPayload) -> Result<Arc<dyn Job>> {
        let job: Arc<dyn Job> = self.job.clone();
        Ok(job)
    }
}

/// Records uploads in memory; resource ids are `res-<index>`
pub struct MockBlobStore {
    uploads: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MockBlobStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            uploads: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        })
    }

    /// A store whose uploads all fail
    pub fn failing() -> Arc<Self> {
        let store = Self::new();
        store.fail.store(true, Ordering::SeqCst);
        store
    }

    /// Uploaded contents, in upload order
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    /// The resource id the n-th upload was stored under
    pub fn resource_id_of(&self, index: usize) -> String {
        format!("res-{index}")
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn upload_stream(&self, mut stream: ByteStream) -> Result<String> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("blob store unavailable");
        }

        let mut content = Vec::new();
        stream.read_to_end(&mut content).await?;

        let mut uploads = self.uploads.lock().unwrap();
        let resource_id = format!("res-{}", uploads.len());
        uploads.push(String::from_utf8_lossy(&content).into_owned());
        Ok(resource_id)
    }
}
