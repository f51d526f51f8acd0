use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use s3unzip::s3::S3Client;
use s3unzip::{Handler, S3Event, StorageConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // One client per container, reused by every invocation
    let store = S3Client::from_config(StorageConfig::from_env()).await?;
    let handler = Handler::new(Arc::new(store));

    run(service_fn(|event: LambdaEvent<S3Event>| {
        let handler = handler.clone();
        async move { Ok::<_, Error>(handler.handle_event(event.payload).await?) }
    }))
    .await
}
