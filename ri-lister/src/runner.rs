use log::{error, info, warn};
use ri_common::error::{ListingError, RuntimeError};

use crate::cli::Arguments;
use crate::configuration::{Configuration, Settings};
use crate::git;
use crate::http::HttpClient;
use crate::lister::{ImageFilter, ImageLister, ImageRecord};
use crate::rows::RowBuilder;
use crate::source::{GitHubSource, ListingSource};
use crate::writer::CsvOutput;

/// Turn the records into CSV and write the file. Nothing touches the disk before this point.
pub async fn write_records(
    settings: &Settings,
    records: &[ImageRecord],
) -> Result<usize, ListingError> {
    let builder = RowBuilder::new(settings.folder_columns, settings.overflow);
    let mut output = CsvOutput::new(&settings.output, builder.header())?;
    for record in records {
        output.push(builder.build(record).into_fields())?;
    }

    info!(
        "Writing {} rows to {}",
        output.rows(),
        output.destination().display()
    );
    output.persist().await
}

/// Traverse `source` completely, then write the CSV. Returns the number of data rows.
pub async fn run_with_source<S>(settings: &Settings, source: S) -> Result<usize, RuntimeError>
where
    S: ListingSource,
{
    let location = if settings.root_path.is_empty() {
        "/".to_string()
    } else {
        settings.root_path.clone()
    };
    info!(
        "Listing images of {}/{} at {} ({})",
        settings.owner,
        settings.repo,
        location,
        settings.branch.as_deref().unwrap_or("default branch")
    );

    let filter = ImageFilter::new(&settings.image_extensions);
    let mut lister = ImageLister::new(source, filter, settings.link, &settings.root_path);

    let records = lister.collect().await?;
    info!(
        "Found {} images in {} directories",
        records.len(),
        lister.directories_listed()
    );

    if records.is_empty() {
        warn!("No image files found, the output will only contain the header");
    }

    Ok(write_records(settings, &records).await?)
}

pub async fn run(settings: &Settings) -> Result<usize, RuntimeError> {
    let http = HttpClient::new(settings)?;
    if !http.is_authenticated() {
        warn!("No access token given, unauthenticated requests are heavily rate limited");
    }

    let source = GitHubSource::new(http, settings)?;
    run_with_source(settings, source).await
}

async fn _execute(
    arguments: Arguments,
    configuration: Configuration,
) -> Result<usize, RuntimeError> {
    let detected = match &arguments.from_git {
        Some(directory) => {
            let remote = git::detect_remote(directory)?;
            info!(
                "Found GitHub repository {}/{} @ {}",
                remote.owner,
                remote.repo,
                remote.branch.as_deref().unwrap_or("detached HEAD")
            );
            Some(remote)
        }
        None => None,
    };

    let settings = Settings::resolve(arguments, configuration, detected)?;
    let rows = run(&settings).await?;
    info!("Wrote {rows} rows to {}", settings.output.display());

    Ok(rows)
}

/// Resolve the settings and run once. A fatal error is logged before it is returned.
pub async fn execute(
    arguments: Arguments,
    configuration: Configuration,
) -> Result<usize, RuntimeError> {
    _execute(arguments, configuration)
        .await
        .inspect_err(|e| error!("{e}"))
}
