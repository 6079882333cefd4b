use crate::browse::{console_url, render_view};
use crate::infra::{seeded_backend, DEFAULT_SEED_COUNT};
use clap::Args;
use hireboard_console::applications::{
    ApplicationListController, ApplicationStatus, BulkOutcome, ConfirmationRequest, FilterPatch,
    ListSettings, LocationBar, MemoryLocation, SortKey,
};
use hireboard_console::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of sample applications in the in-memory backend
    #[arg(long, default_value_t = DEFAULT_SEED_COUNT)]
    pub(crate) seed: usize,
    /// Page size used by the walkthrough
    #[arg(long, default_value_t = 8)]
    pub(crate) page_limit: u32,
    /// Answer "no" when the bulk reject asks for confirmation
    #[arg(long)]
    pub(crate) decline: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        seed,
        page_limit,
        decline,
    } = args;
    if page_limit == 0 {
        return Err(AppError::InvalidInput(
            "--page-limit must be positive".to_string(),
        ));
    }

    let backend = Arc::new(seeded_backend(seed));
    let location = Arc::new(MemoryLocation::new(console_url("")?));
    let controller = ApplicationListController::mount(
        backend.clone(),
        location.clone(),
        ListSettings { page_limit },
    );

    println!("Employer application list walkthrough");

    println!("\n1. First page, newest applications first");
    controller.load().await?;
    render_view(&controller.snapshot(), &controller.selection());

    println!("\n2. Filter to pending applications, oldest first");
    controller.set_filter(FilterPatch::new().status(Some(ApplicationStatus::Pending.into())));
    controller.set_sort(SortKey::AppliedAt);
    controller.load().await?;
    render_view(&controller.snapshot(), &controller.selection());
    println!("URL: {}", location.current());

    let first_page = controller.snapshot().records;
    let Some(first) = first_page.first() else {
        println!("\nNo pending applications to act on; walkthrough ends here");
        return Ok(());
    };
    controller.toggle_selection(&first.id);

    println!("\n3. Select one on page 1, then the whole of page 2");
    controller.set_page(2);
    controller.load().await?;
    controller.select_all_on_page();
    render_view(&controller.snapshot(), &controller.selection());
    println!("URL: {}", location.current());

    println!("\n4. Bulk reject the selection");
    let prompt = |request: &ConfirmationRequest| {
        let answer = if decline { "no" } else { "yes" };
        println!("  Confirm: {} -> {answer}", request.message());
        !decline
    };
    match controller
        .bulk_change_selected(ApplicationStatus::Rejected, &prompt)
        .await?
    {
        BulkOutcome::Applied(summary) => {
            println!(
                "  {} moved to {} ({} on this page), {} failed",
                summary.confirmed,
                summary.status,
                summary.patched_on_page,
                summary.failed.len()
            );
        }
        BulkOutcome::Declined => println!("  Declined; nothing was sent"),
        BulkOutcome::NothingSelected => println!("  Nothing selected"),
    }
    render_view(&controller.snapshot(), &controller.selection());

    println!("\n5. Review rejected applications");
    controller.set_filter(FilterPatch::new().status(Some(ApplicationStatus::Rejected.into())));
    controller.load().await?;
    render_view(&controller.snapshot(), &controller.selection());
    println!("URL: {}", location.current());
    println!(
        "\nBackend handled {} list requests over {} applications",
        controller.fetcher().requests_issued(),
        backend.len()
    );

    Ok(())
}
