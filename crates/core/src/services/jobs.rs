//! In-process job runner for at-most-once background work.
//!
//! Stream fan-out and local notifications run here. Remote delivery does
//! not: it goes through the persistent queue behind
//! [`ActivityDelivery`](crate::services::delivery::ActivityDelivery).

use std::sync::Arc;

use fanout_common::{AppError, AppResult, config::JobsConfig};
use tokio::{
    sync::{Semaphore, mpsc},
    task::JoinHandle,
};
use tracing::{debug, error, info};

use crate::services::{notification::NotificationService, stream_fanout::StreamFanoutWorker};

/// Job types that can be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Publish a rendered payload to the live timelines of a status audience.
    StreamFanout {
        payload: String,
        status_id: String,
        account_id: String,
    },
    /// Notify a local account of an activity.
    LocalNotification {
        account_id: String,
        activity_id: String,
        activity_type: String,
        from_account_id: String,
    },
}

/// Job sender for enqueueing jobs.
#[derive(Clone)]
pub struct JobSender {
    sender: mpsc::Sender<Job>,
}

impl JobSender {
    /// Enqueue a job without waiting. A full or closed queue drops the job.
    pub fn enqueue(&self, job: Job) -> AppResult<()> {
        self.sender.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => AppError::Queue("Job queue is full".to_string()),
            mpsc::error::TrySendError::Closed(_) => {
                AppError::Queue("Job queue is closed".to_string())
            }
        })
    }

    /// Enqueue a stream fan-out job.
    pub fn stream_fanout(&self, payload: String, status_id: &str, account_id: &str) -> AppResult<()> {
        self.enqueue(Job::StreamFanout {
            payload,
            status_id: status_id.to_string(),
            account_id: account_id.to_string(),
        })
    }

    /// Enqueue a local notification job.
    pub fn local_notification(
        &self,
        account_id: &str,
        activity_id: &str,
        activity_type: &str,
        from_account_id: &str,
    ) -> AppResult<()> {
        self.enqueue(Job::LocalNotification {
            account_id: account_id.to_string(),
            activity_id: activity_id.to_string(),
            activity_type: activity_type.to_string(),
            from_account_id: from_account_id.to_string(),
        })
    }
}

/// Job worker context containing services needed for job processing.
#[derive(Clone)]
pub struct JobWorkerContext {
    pub stream_fanout: StreamFanoutWorker,
    pub notifications: NotificationService,
}

/// Job processing service.
pub struct JobService {
    sender: mpsc::Sender<Job>,
    receiver: Option<mpsc::Receiver<Job>>,
    workers: usize,
}

impl JobService {
    /// Create a new job service.
    #[must_use]
    pub fn new(config: &JobsConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.buffer.max(1));
        Self {
            sender,
            receiver: Some(receiver),
            workers: config.workers.max(1),
        }
    }

    /// Get a job sender for enqueueing jobs.
    #[must_use]
    pub fn sender(&self) -> JobSender {
        JobSender {
            sender: self.sender.clone(),
        }
    }

    /// Start the job processor with the given context.
    ///
    /// The processor stops once every [`JobSender`] is dropped and the queue
    /// has drained.
    pub fn start(mut self, context: JobWorkerContext) -> AppResult<JoinHandle<()>> {
        let receiver = self
            .receiver
            .take()
            .ok_or_else(|| AppError::Internal("Job service already started".to_string()))?;
        let context = Arc::new(context);
        let workers = self.workers;

        Ok(tokio::spawn(async move {
            info!(workers, "Job worker starting");
            run_job_processor(receiver, context, workers).await;
            info!("Job worker stopped");
        }))
    }
}

/// Run the job processor.
async fn run_job_processor(
    mut receiver: mpsc::Receiver<Job>,
    context: Arc<JobWorkerContext>,
    workers: usize,
) {
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut running = Vec::new();

    while let Some(job) = receiver.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let ctx = context.clone();

        running.push(tokio::spawn(async move {
            let _permit = permit;
            process_job(job, &ctx).await;
        }));
        running.retain(|handle: &JoinHandle<()>| !handle.is_finished());
    }

    for handle in running {
        let _ = handle.await;
    }
}

/// Process a single job.
async fn process_job(job: Job, context: &JobWorkerContext) {
    match job {
        Job::StreamFanout {
            payload,
            status_id,
            account_id,
        } => {
            match context
                .stream_fanout
                .run(&payload, &status_id, &account_id)
                .await
            {
                Ok(()) => debug!(status_id = %status_id, "Stream fan-out done"),
                Err(e) => error!(
                    status_id = %status_id,
                    account_id = %account_id,
                    error = %e,
                    "Stream fan-out failed"
                ),
            }
        }
        Job::LocalNotification {
            account_id,
            activity_id,
            activity_type,
            from_account_id,
        } => {
            match context
                .notifications
                .notify(&account_id, &activity_id, &activity_type, &from_account_id)
                .await
            {
                Ok(_) => debug!(account_id = %account_id, activity_id = %activity_id, "Notification processed"),
                Err(e) => error!(
                    account_id = %account_id,
                    activity_id = %activity_id,
                    error = %e,
                    "Failed to create notification"
                ),
            }
        }
    }
}
