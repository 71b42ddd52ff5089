//! Service graph of the worker process.

use std::{future::Future, io, sync::Arc};

use apalis::layers::retry::RetryPolicy;
use apalis::prelude::*;
use apalis_redis::RedisStorage;
use fanout_common::{AppError, AppResult, Config};
use fanout_core::{
    CacheHydrator, DeliveryService, DistributionScope, JobService, JobWorkerContext,
    NoOpDelivery, NotificationService, PayloadCacheService, ReachResolver, ReactionService,
    RepositoryStore, StatusRenderer, StoreService, StreamBusService, StreamFanoutWorker,
};
use fanout_federation::UrlConfig;
use fanout_queue::{
    DeliverJob, RawDistributionContext, RawDistributionJob, RedisDeliveryService,
    RedisPayloadCache, RedisStreamBus, raw_distribution_worker,
};
use fred::clients::Client as RedisClient;
use fred::interfaces::ClientLike;
use fred::types::config::Config as RedisConfig;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Attempts of a raw distribution job before it is abandoned.
const RAW_DISTRIBUTION_RETRIES: usize = 5;

/// Implementations behind the core seams.
#[derive(Clone)]
pub struct Infrastructure {
    pub store: StoreService,
    pub bus: StreamBusService,
    pub cache: PayloadCacheService,
    pub delivery: DeliveryService,
}

/// Services an embedding request layer calls into.
#[derive(Clone)]
pub struct App {
    pub reactions: ReactionService,
    pub hydrator: CacheHydrator,
    pub reach: ReachResolver,
    pub scope: DistributionScope,
}

/// Background work owned by the process.
pub struct Workers {
    jobs: JoinHandle<()>,
    raw_distribution: Option<(RedisStorage<RawDistributionJob>, RawDistributionContext)>,
}

impl App {
    /// Wire services over `infra` and start the in-process job runner.
    pub fn assemble(config: &Config, infra: &Infrastructure) -> AppResult<(Self, JoinHandle<()>)> {
        let urls = UrlConfig::parse(&config.server.url)?;
        let renderer = StatusRenderer::new(infra.store.clone(), infra.cache.clone(), urls.clone());

        let jobs = JobService::new(&config.jobs);
        let reactions = ReactionService::new(
            infra.store.clone(),
            infra.delivery.clone(),
            infra.cache.clone(),
            jobs.sender(),
            urls,
            config.local_domain()?,
        );

        let handle = jobs.start(JobWorkerContext {
            stream_fanout: StreamFanoutWorker::new(infra.store.clone(), infra.bus.clone()),
            notifications: NotificationService::new(infra.store.clone(), infra.bus.clone()),
        })?;

        let app = Self {
            reactions,
            hydrator: CacheHydrator::new(infra.store.clone(), renderer),
            reach: ReachResolver::new(
                infra.store.clone(),
                config.federation.incompatible_software.clone(),
            ),
            scope: DistributionScope::new(infra.store.clone()),
        };

        Ok((app, handle))
    }

    /// Connect Postgres and Redis, run migrations and wire everything.
    pub async fn build(config: &Config) -> AppResult<(Self, Workers)> {
        let db = fanout_db::init(config).await?;
        info!("Connected to database");

        info!("Running database migrations...");
        fanout_db::migrate(&db).await?;
        info!("Migrations completed");

        let store: StoreService = Arc::new(RepositoryStore::new(Arc::new(db)));

        let redis_config = RedisConfig::from_url(&config.redis.url)
            .map_err(|e| AppError::Config(format!("Invalid redis.url: {e}")))?;
        let redis = RedisClient::new(redis_config, None, None, None);
        redis
            .init()
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;
        let redis = Arc::new(redis);
        info!("Connected to Redis");

        let bus: StreamBusService = Arc::new(RedisStreamBus::new(
            redis.clone(),
            config.redis.prefix.clone(),
        ));
        let cache: PayloadCacheService = Arc::new(RedisPayloadCache::new(
            redis,
            config.redis.prefix.clone(),
            config.cache.payload_ttl_secs,
        ));

        let (delivery, raw_distribution) = if config.federation.enabled {
            let client = redis::Client::open(config.redis.url.as_str())
                .map_err(|e| AppError::Redis(e.to_string()))?;
            let conn = redis::aio::ConnectionManager::new(client)
                .await
                .map_err(|e| AppError::Redis(e.to_string()))?;
            let deliver_storage = RedisStorage::<DeliverJob>::new(conn.clone());
            let raw_storage = RedisStorage::<RawDistributionJob>::new(conn);
            info!("Connected to Redis job queue");

            let delivery: DeliveryService =
                Arc::new(RedisDeliveryService::new(deliver_storage, raw_storage.clone()));
            let ctx = RawDistributionContext::new(store.clone(), delivery.clone());
            (delivery, Some((raw_storage, ctx)))
        } else {
            info!("Federation disabled, outbound delivery is off");
            (Arc::new(NoOpDelivery) as DeliveryService, None)
        };

        let infra = Infrastructure {
            store,
            bus,
            cache,
            delivery,
        };
        let (app, jobs) = Self::assemble(config, &infra)?;

        Ok((
            app,
            Workers {
                jobs,
                raw_distribution,
            },
        ))
    }
}

impl Workers {
    /// Run the apalis workers until `shutdown` resolves, then drain the
    /// in-process job runner. `app` is dropped first so no new jobs arrive.
    pub async fn run<S>(self, app: App, shutdown: S) -> AppResult<()>
    where
        S: Future<Output = io::Result<()>> + Send,
    {
        if let Some((storage, ctx)) = self.raw_distribution {
            info!("Starting raw distribution worker...");
            let monitor = Monitor::new().register(
                WorkerBuilder::new("raw-distribution")
                    .enable_tracing()
                    .retry(RetryPolicy::retries(RAW_DISTRIBUTION_RETRIES))
                    .data(ctx)
                    .backend(storage)
                    .build_fn(raw_distribution_worker),
            );

            monitor
                .run_with_signal(shutdown)
                .await
                .map_err(|e| AppError::Queue(format!("Worker monitor failed: {e}")))?;
        } else {
            shutdown
                .await
                .map_err(|e| AppError::Internal(format!("Signal handler failed: {e}")))?;
        }

        drop(app);
        if let Err(e) = self.jobs.await {
            error!(error = %e, "Job runner panicked");
        }

        Ok(())
    }
}
