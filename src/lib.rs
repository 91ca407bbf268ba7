pub mod clients;
pub mod core;
pub mod errors;
pub mod schemas;
pub mod services;

mod cli;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use crate::clients::{
    BinaryStore, HttpBinaryStore, HttpSubmissionApi, S3BinaryStore, SubmissionApi,
};
use crate::core::config::{Settings, UploadBackend};
use crate::core::state::AppState;
use crate::core::telemetry;
use crate::core::time::SystemClock;
use crate::services::upload_policy::UploadPolicy;

pub async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;

    let api: Arc<dyn SubmissionApi> = Arc::new(
        HttpSubmissionApi::from_settings(&settings)
            .context("failed to build submission service client")?,
    );
    let store: Arc<dyn BinaryStore> = match settings.upload().backend {
        UploadBackend::Http => Arc::new(
            HttpBinaryStore::from_settings(&settings)
                .context("failed to build upload service client")?,
        ),
        UploadBackend::S3 => Arc::new(S3BinaryStore::from_settings(&settings).await?),
    };

    tracing::debug!(
        environment = settings.runtime().environment.as_str(),
        upload_backend = settings.upload().backend.as_str(),
        api_base_url = %settings.api().base_url,
        "Coursework client configured"
    );

    let state =
        AppState::new(api, store, Arc::new(SystemClock), UploadPolicy::from_settings(&settings));

    cli.run(&state).await
}
