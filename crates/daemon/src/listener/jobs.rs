// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handlers that act on the job queue.

use std::sync::Arc;

use forge_core::{parse_features, parse_tech_stack, BuildConfig, JobId};
use forge_engine::{read_tail, LOG_TAIL_CHARS};
use forge_wire::Response;
use tracing::{info, warn};

use super::ListenCtx;

/// Raw submission fields as typed into the request form.
pub(super) struct SubmitForm {
    pub account: String,
    pub app_name: String,
    pub description: String,
    pub tech_stack: String,
    pub design: String,
    pub features: String,
}

impl SubmitForm {
    pub(super) fn into_config(self, ctx: &ListenCtx) -> Result<BuildConfig, String> {
        let account = ctx.accounts.get(&self.account).map_err(|e| e.to_string())?;
        let app_name = self.app_name.trim();
        if app_name.is_empty() {
            return Err("app name is required".to_string());
        }
        if forge_core::slugify(app_name).is_empty() {
            return Err(format!("app name '{}' has no usable characters", app_name));
        }
        let mut config = BuildConfig::new(app_name, self.description.trim(), account.clone())
            .tech_stack(parse_tech_stack(&self.tech_stack))
            .features(parse_features(&self.features));
        let design = self.design.trim();
        if !design.is_empty() {
            config = config.design(design);
        }
        Ok(config)
    }
}

pub(super) fn submit(ctx: &ListenCtx, form: SubmitForm) -> Response {
    let config = match form.into_config(ctx) {
        Ok(config) => config,
        Err(message) => {
            warn!(%message, "submission rejected");
            return Response::Error { message };
        }
    };
    let job_id = ctx.queue.add(config, Arc::clone(&ctx.sink));
    submitted(ctx, job_id)
}

pub(super) fn cancel(ctx: &ListenCtx) -> Response {
    match ctx.queue.cancel() {
        Some(cancelled) => Response::Cancelled {
            app_name: cancelled.config.app_name.clone(),
            runtime_secs: cancelled.runtime.as_secs(),
        },
        None => Response::NothingRunning,
    }
}

pub(super) fn retry(ctx: &ListenCtx) -> Response {
    match ctx.queue.retry_last(Arc::clone(&ctx.sink)) {
        Some(job_id) => submitted(ctx, job_id),
        None => Response::NothingToRetry,
    }
}

pub(super) async fn last_log(ctx: &ListenCtx) -> Response {
    let Some(path) = ctx.queue.last_outcome().and_then(|last| last.log_path) else {
        return Response::NoLog;
    };
    match read_tail(&path, LOG_TAIL_CHARS).await {
        Ok(tail) => Response::Log { path, tail },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read job log");
            Response::Error { message: format!("cannot read {}: {}", path.display(), e) }
        }
    }
}

/// Position 0 means nothing is ahead of the job.
fn submitted(ctx: &ListenCtx, job_id: JobId) -> Response {
    let snapshot = ctx.queue.status();
    let position = snapshot
        .queued
        .iter()
        .find(|q| q.job_id == job_id)
        .map(|q| q.position)
        .unwrap_or(0);
    info!(%job_id, position, "job submitted");
    Response::Submitted { job_id, position }
}
