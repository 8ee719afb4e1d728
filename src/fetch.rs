// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Sequential download of badge images referenced by a markdown document.
//!
//! Downloads run one at a time in document order. A failed item is logged and
//! recorded in the [`FetchSummary`]; it never aborts the remaining batch.

use std::{
    future::Future,
    io::IsTerminal,
    path::{Path, PathBuf},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, info};

use crate::{
    error::{self, Error},
    extract::extract_badge_urls,
    slug::badge_filename,
};

/// Downloads one badge into a destination file.
///
/// Implementations must leave no file behind when they fail.
pub trait BadgeFetch
{
    /// Fetches `url` and stores the body at `destination`.
    fn fetch(&self, url: &str, destination: &Path,) -> impl Future<Output = Result<(), Error,>,>;
}

/// [`BadgeFetch`] implementation backed by an HTTP client.
#[derive(Debug, Clone,)]
pub struct HttpFetcher
{
    client: reqwest::Client,
}

impl HttpFetcher
{
    /// Builds a fetcher with an optional per-request timeout.
    ///
    /// Without a timeout an unresponsive server stalls the batch until the
    /// connection is closed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`](Error::Network) when the HTTP client cannot
    /// be initialized.
    pub fn new(timeout: Option<Duration,>,) -> Result<Self, Error,>
    {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),);
        if let Some(timeout,) = timeout {
            builder = builder.timeout(timeout,);
        }

        Ok(Self {
            client: builder.build()?,
        },)
    }
}

impl BadgeFetch for HttpFetcher
{
    async fn fetch(&self, url: &str, destination: &Path,) -> Result<(), Error,>
    {
        let mut response =
            self.client.get(url,).send().await.map_err(|source| Error::network(url, source,),)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                url:    url.to_owned(),
                status: status.as_u16(),
            },);
        }

        let file = tokio::fs::File::create(destination,)
            .await
            .map_err(|source| error::badge_io_error(destination, source,),)?;
        let mut writer = BufWriter::new(file,);

        if let Err(error,) = stream_body(&mut response, &mut writer, url, destination,).await {
            drop(writer,);
            let _ = tokio::fs::remove_file(destination,).await;
            return Err(error,);
        }

        Ok((),)
    }
}

async fn stream_body(
    response: &mut reqwest::Response,
    writer: &mut BufWriter<tokio::fs::File,>,
    url: &str,
    destination: &Path,
) -> Result<(), Error,>
{
    while let Some(chunk,) = response.chunk().await.map_err(|source| Error::network(url, source,),)? {
        writer.write_all(&chunk,).await.map_err(|source| error::badge_io_error(destination, source,),)?;
    }

    writer.flush().await.map_err(|source| error::badge_io_error(destination, source,),)
}

/// A single download that did not produce a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct FetchFailure
{
    /// Filename the badge would have been stored under.
    pub filename: String,
    /// Requested URL.
    pub url:      String,
    /// Rendered error message.
    pub reason:   String,
}

/// Outcome of a fetch batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
pub struct FetchSummary
{
    /// Number of URLs processed.
    pub attempted:  usize,
    /// Files written, in document order.
    pub downloaded: Vec<PathBuf,>,
    /// Items that failed, in document order.
    pub failures:   Vec<FetchFailure,>,
}

/// Reads `markdown_path`, extracts badge URLs, and downloads them into
/// `assets_dir`.
///
/// # Errors
///
/// Returns [`Error::Io`](Error::Io) when the markdown document cannot be read
/// and the errors of [`fetch_all`].
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use badgesmith::{HttpFetcher, fetch_from_markdown};
///
/// # async fn example() -> Result<(), badgesmith::Error> {
/// let fetcher = HttpFetcher::new(None,)?;
/// let summary = fetch_from_markdown(&fetcher, Path::new("assets.md",), Path::new("assets",),).await?;
/// println!("{} of {} downloaded", summary.downloaded.len(), summary.attempted);
/// # Ok(())
/// # }
/// ```
pub async fn fetch_from_markdown<F,>(
    fetcher: &F,
    markdown_path: &Path,
    assets_dir: &Path,
) -> Result<FetchSummary, Error,>
where
    F: BadgeFetch,
{
    let markdown = tokio::fs::read_to_string(markdown_path,)
        .await
        .map_err(|source| error::io_error(markdown_path, source,),)?;
    let urls = extract_badge_urls(&markdown,);
    info!("Found {} badge images in {}", urls.len(), markdown_path.display());

    fetch_all(fetcher, &urls, assets_dir,).await
}

/// Downloads every URL in order into `assets_dir` as `NN-slug.svg`.
///
/// Individual failures are logged and collected; the batch always runs to
/// completion.
///
/// # Errors
///
/// Returns [`Error::BadgeIo`](Error::BadgeIo) only when `assets_dir` cannot
/// be created.
pub async fn fetch_all<F,>(fetcher: &F, urls: &[String], assets_dir: &Path,) -> Result<FetchSummary, Error,>
where
    F: BadgeFetch,
{
    tokio::fs::create_dir_all(assets_dir,)
        .await
        .map_err(|source| error::badge_io_error(assets_dir, source,),)?;

    let progress = progress_bar(urls.len(),);
    let mut summary = FetchSummary {
        attempted: urls.len(),
        ..FetchSummary::default()
    };

    for (index, url,) in urls.iter().enumerate() {
        let filename = badge_filename(index + 1, url,);
        let destination = assets_dir.join(&filename,);
        progress.set_message(filename.clone(),);
        debug!("Fetching {} -> {}", url, destination.display());

        match fetcher.fetch(url, &destination,).await {
            Ok((),) => {
                info!("Downloaded {}", filename);
                summary.downloaded.push(destination,);
            }
            Err(failure,) => {
                error!("Failed to download {}: {}", filename, failure);
                summary.failures.push(FetchFailure {
                    filename,
                    url: url.clone(),
                    reason: failure.to_string(),
                },);
            }
        }

        progress.inc(1,);
    }

    progress.finish_and_clear();
    info!(
        "Downloaded {} of {} badges into {}",
        summary.downloaded.len(),
        summary.attempted,
        assets_dir.display()
    );

    Ok(summary,)
}

fn progress_bar(length: usize,) -> ProgressBar
{
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new(length as u64,);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}",)
            .unwrap_or_else(|_| ProgressStyle::default_bar(),),
    );
    progress
}
