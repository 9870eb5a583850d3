use melonly_http::{ClientOptions, MelonlyClient, MelonlyError, Pagination};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("melonly_http=debug")),
        )
        .init();

    let token = std::env::var("MELONLY_TOKEN")?;
    let client = MelonlyClient::with_options(token, ClientOptions::default().with_debug(true))?;

    let info = client.get_server_info().await?;
    println!("server {} ({})", info.name, info.id);

    match client.get_members(Pagination::new(1, 20)).await {
        Ok(page) => {
            println!("page {}/{} of {} members", page.page, page.total_pages, page.total);
            for member in page.data {
                println!("  {} roles={:?}", member.id, member.roles);
            }
        }
        Err(MelonlyError::RateLimit {
            retry_after_seconds,
            reset_timestamp,
            ..
        }) => {
            println!("throttled: retry after {retry_after_seconds:?}s, reset {reset_timestamp:?}");
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
