use clap::Args;
use hireboard_console::applications::{
    ApplicationListController, ApplicationStatus, HttpApplicationsBackend, ListView,
    MemoryLocation, SelectionSet, Url, ViewState,
};
use hireboard_console::config::AppConfig;
use hireboard_console::error::AppError;
use hireboard_console::telemetry;
use std::sync::Arc;

const CONSOLE_BASE: &str = "https://console.hireboard.local/employer/applications";

#[derive(Args, Debug)]
pub(crate) struct BrowseArgs {
    /// Console URL, or just its query string (for example `?status=interview&page=2`)
    #[arg(long)]
    pub(crate) location: String,
    /// Override the configured applications API base URL
    #[arg(long)]
    pub(crate) api_url: Option<String>,
}

pub(crate) async fn run_browse(args: BrowseArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(api_url) = args.api_url {
        config.backend.api_url = api_url;
    }
    telemetry::init(&config.telemetry)?;

    let location = Arc::new(MemoryLocation::new(console_url(&args.location)?));
    let backend = Arc::new(HttpApplicationsBackend::new(&config.backend)?);
    let controller = ApplicationListController::mount(backend, location, config.list);

    controller.load().await?;
    render_view(&controller.snapshot(), &controller.selection());
    println!("Canonical URL: {}", controller.current_url());
    Ok(())
}

/// Accepts an absolute URL or a bare query string.
pub(crate) fn console_url(raw: &str) -> Result<Url, AppError> {
    let raw = raw.trim();
    let candidate = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else if raw.is_empty() {
        CONSOLE_BASE.to_string()
    } else {
        format!("{CONSOLE_BASE}?{}", raw.trim_start_matches('?'))
    };
    Url::parse(&candidate)
        .map_err(|err| AppError::InvalidInput(format!("'{raw}' is not a console URL ({err})")))
}

pub(crate) fn render_view(view: &ListView, selection: &SelectionSet) {
    match &view.state {
        ViewState::Loading => println!("Applications: loading"),
        ViewState::Error(message) => println!("Applications unavailable: {message}"),
        ViewState::Empty => println!("No applications match the current filters"),
        ViewState::Ready => {
            println!(
                "Applications page {}/{} ({} total, sorted by {})",
                view.page, view.total_pages, view.total, view.sort
            );
            for record in &view.records {
                println!(
                    "  [{}] {} {:<22} {:<20} {:<12} {}",
                    if selection.contains(&record.id) { "x" } else { " " },
                    record.id,
                    record.applicant_name,
                    record.job_title,
                    record.status.label(),
                    record.applied_at.format("%Y-%m-%d")
                );
            }
        }
    }

    let counts: Vec<String> = ApplicationStatus::ALL
        .into_iter()
        .map(|status| format!("{} {}", status.label(), view.stats.count(status)))
        .collect();
    println!("Stats ({:?}): {}", view.stats.scope, counts.join(" | "));
    if view.selected_count > 0 {
        println!("{} selected", view.selected_count);
    }
    if let Some(notice) = &view.notice {
        println!("Notice: {notice}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_queries_are_placed_on_the_console_path() {
        let url = console_url("?status=offer&page=2").expect("query parses");
        assert_eq!(url.path(), "/employer/applications");
        assert_eq!(url.query(), Some("status=offer&page=2"));

        let url = console_url("").expect("empty parses");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn absolute_urls_are_kept() {
        let url = console_url("https://jobs.example.test/console?sort=status:asc")
            .expect("absolute url parses");
        assert_eq!(url.host_str(), Some("jobs.example.test"));
    }
}
