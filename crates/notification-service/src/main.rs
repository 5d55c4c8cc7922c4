//! Notification service entry point.
//!
//! Wires configuration, storage, cache, channels and the router together,
//! then runs the marketplace event consumer until shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mandilink_shared::{
    cache::Cache,
    config::AppConfig,
    database::Database,
    kafka::KafkaProducer,
    retry::RetryPolicy,
};

use mandilink_notification::dispatch::IdempotencyCache;
use mandilink_notification::{
    DeviceTokenRepository, EventConsumer, EventDispatcher, InAppRepository,
    InMemoryIdempotencyCache, NotificationRouter, PreferenceEvaluator, PreferencesRepository,
    PushChannel, RedisIdempotencyCache, RetentionJob, SmsChannel, SmsLogRepository,
    StubPushProvider, StubSmsProvider, TemplateEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 1. Load configuration
    let config = AppConfig::load("mandilink-notification-service").unwrap_or_else(|e| {
        eprintln!("failed to load config, using defaults: {e}");
        AppConfig::default()
    });

    // 2. Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.observability.log_level.clone()));
    if config.observability.log_format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting mandilink-notification-service...");
    info!(environment = %config.environment, "configuration loaded");

    // 3. Connect storage
    let db = Database::connect(&config.database).await?;
    let pool = db.pool().clone();
    info!("database connection established");

    let cache = Cache::new(&config.redis)?;
    cache.health_check().await?;
    info!("Redis connection established");

    // 4. Repositories
    let prefs_repo = Arc::new(PreferencesRepository::new(pool.clone()));
    let token_repo = Arc::new(DeviceTokenRepository::new(pool.clone()));
    let inapp_repo = Arc::new(InAppRepository::new(pool.clone()));
    let sms_log_repo = Arc::new(SmsLogRepository::new(pool.clone()));
    info!("repositories initialized");

    // 5. Engine components
    let notify_cfg = &config.notification;
    let template_engine = Arc::new(TemplateEngine::with_defaults());
    let evaluator = Arc::new(PreferenceEvaluator::new(
        prefs_repo.clone(),
        notify_cfg.utc_offset_minutes,
    ));

    let sms_channel = Arc::new(SmsChannel::new(
        Arc::new(StubSmsProvider),
        sms_log_repo.clone(),
        template_engine.clone(),
        RetryPolicy::from_seconds(
            notify_cfg.sms_max_attempts,
            &notify_cfg.sms_retry_delays_seconds,
        ),
        notify_cfg.sms_daily_quota,
        notify_cfg.utc_offset_minutes,
    ));

    let push_channel = Arc::new(PushChannel::new(
        Arc::new(StubPushProvider),
        token_repo.clone(),
        evaluator.clone(),
    ));

    let router = Arc::new(NotificationRouter::new(
        evaluator,
        sms_channel,
        push_channel,
        inapp_repo.clone(),
        template_engine,
    ));

    let seen_cache: Arc<dyn IdempotencyCache> = match notify_cfg.idempotency_backend.as_str() {
        "redis" => Arc::new(RedisIdempotencyCache::new(
            cache.clone(),
            Duration::from_secs(notify_cfg.idempotency_ttl_seconds),
        )),
        other => {
            if other != "memory" {
                warn!(backend = other, "unknown idempotency backend, using memory");
            }
            Arc::new(InMemoryIdempotencyCache::new(
                notify_cfg.idempotency_cache_capacity,
            ))
        }
    };

    let dispatcher = Arc::new(EventDispatcher::new(router, inapp_repo.clone(), seen_cache));

    // 6. Retention sweeps in the background
    let retention = RetentionJob::new(
        token_repo.clone(),
        inapp_repo.clone(),
        notify_cfg.device_token_retention_days,
        notify_cfg.inapp_retention_days,
    );
    let retention_interval = notify_cfg.retention_interval_seconds;
    tokio::spawn(retention.run_loop(retention_interval));

    // 7. Consume events until shutdown
    let producer = KafkaProducer::new(&config.kafka)?;
    let consumer = EventConsumer::new(&config, dispatcher, producer)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    consumer.run(shutdown_rx).await?;

    db.close().await;
    info!("mandilink-notification-service stopped");
    Ok(())
}

/// Resolve on SIGTERM (unix) or Ctrl-C
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal as unix_signal};

        let mut sigterm = match unix_signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler, using Ctrl-C only");
                let _ = signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {}
            _ = signal::ctrl_c() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
    }
}
