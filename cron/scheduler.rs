use chinabuyhub::config::Intervals;
use chinabuyhub::error::Error;
use chinabuyhub::hub::{Channel, Hub};
use serenity::http::Http;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

async fn reload_catalog(hub: Arc<Hub>, _http: Arc<Http>) {
    // Errors are logged by the catalog, the previous list stays in place
    let _ = hub.catalog.reload().await;
}

async fn post_offer(hub: Arc<Hub>, http: Arc<Http>) {
    let offers = hub.channel(&http, Channel::Offers);
    let _ = hub.post_next_offer(&offers).await;
}

async fn post_daily_highlight(hub: Arc<Hub>, http: Arc<Http>) {
    let top = hub.channel(&http, Channel::Top);
    let _ = hub.post_daily_highlight(&top).await;
}

async fn post_motivation(hub: Arc<Hub>, http: Arc<Http>) {
    let chat = hub.channel(&http, Channel::Chat);
    if let Err(e) = hub.send_motivation(&chat).await {
        error!("Failed to send motivation message: {:?}", e);
    }
}

async fn post_news(hub: Arc<Hub>, http: Arc<Http>) {
    let chat = hub.channel(&http, Channel::Chat);
    if let Err(e) = hub.send_news(&chat).await {
        error!("Failed to send news message: {:?}", e);
    }
}

/// Wraps `task` in a job that runs every `period`
fn repeated_job<F, Fut>(
    name: &'static str,
    period: Duration,
    hub: &Arc<Hub>,
    http: &Arc<Http>,
    task: F,
) -> Result<Job, JobSchedulerError>
where
    F: Fn(Arc<Hub>, Arc<Http>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let hub = Arc::clone(hub);
    let http = Arc::clone(http);

    Job::new_repeated_async(period, move |job_id: Uuid, _l| {
        let run = task(Arc::clone(&hub), Arc::clone(&http));
        Box::pin(async move {
            debug!("Running job {} ({})", name, job_id);
            run.await;
        })
    })
}

/// Posts the first batch once products are loaded, then unschedules itself
fn seed_job(period: Duration, hub: &Arc<Hub>, http: &Arc<Http>) -> Result<Job, JobSchedulerError> {
    let hub = Arc::clone(hub);
    let http = Arc::clone(http);

    Job::new_repeated_async(period, move |job_id: Uuid, scheduler| {
        let hub = Arc::clone(&hub);
        let http = Arc::clone(&http);
        Box::pin(async move {
            if !hub.is_seeded() {
                let top = hub.channel(&http, Channel::Top);
                let catalog = hub.channel(&http, Channel::Catalog);
                hub.seed(&top, &catalog).await;
            }
            if hub.is_seeded() {
                if let Err(e) = scheduler.remove(&job_id).await {
                    warn!("Failed to remove seed job {}: {:?}", job_id, e);
                }
            }
        })
    })
}

/// Starts every recurring job: catalog reload, offers, daily highlight, chat messages and the seed.
pub async fn start_scheduler(
    hub: Arc<Hub>,
    http: Arc<Http>,
    intervals: Intervals,
) -> Result<JobScheduler, Error> {
    let scheduler = JobScheduler::new().await?;

    let jobs = vec![
        repeated_job("reload", intervals.reload, &hub, &http, reload_catalog)?,
        repeated_job("offer", intervals.offer, &hub, &http, post_offer)?,
        repeated_job("daily", intervals.daily, &hub, &http, post_daily_highlight)?,
        repeated_job("motivation", intervals.motivation, &hub, &http, post_motivation)?,
        repeated_job("news", intervals.news, &hub, &http, post_news)?,
        seed_job(intervals.seed, &hub, &http)?,
    ];

    for job in jobs {
        scheduler.add(job).await?;
    }
    scheduler.start().await?;

    info!(
        "Offers every {:?}, reload every {:?}, daily every {:?}",
        intervals.offer, intervals.reload, intervals.daily
    );
    Ok(scheduler)
}
