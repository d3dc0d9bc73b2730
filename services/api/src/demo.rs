use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use creator_match::error::AppError;
use creator_match::marketplace::domain::{
    AccountRole, ApplicationStatus, CampaignStatus, SocialMediaLink, UserId,
};
use creator_match::marketplace::{
    ApplicantView, CampaignDraft, CannedModel, Marketplace, MemoryObjectStorage, MemoryStore,
    ProfileInput, RequestContext, SubmissionPayload,
};

const DEMO_COMPANY: &str = "demo-brand";
const DEMO_PUBLIC_URL: &str = "http://localhost:3000";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of creators that apply to the demo campaign
    #[arg(long, default_value_t = 3)]
    pub(crate) creators: usize,
    /// Select the top-ranked applicant and report the resulting partnership
    #[arg(long)]
    pub(crate) select_top: bool,
    /// How long to wait for background scoring before printing the ranking
    #[arg(long, default_value_t = 2000)]
    pub(crate) wait_ms: u64,
}

fn as_user(id: &str) -> RequestContext {
    RequestContext::authenticated(UserId::from(id))
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        creators,
        select_top,
        wait_ms,
    } = args;

    let store = Arc::new(MemoryStore::new());
    let (marketplace, _dispatcher) = Marketplace::with_scoring_queue(
        store,
        Arc::new(CannedModel::offline()),
        Arc::new(MemoryObjectStorage::new(DEMO_PUBLIC_URL)),
    );

    println!("Creator marketplace demo (offline model)");

    let company = as_user(DEMO_COMPANY);
    marketplace.accounts.set_role(&company, AccountRole::Company)?;
    let campaign = marketplace.campaigns.create(
        &company,
        CampaignDraft {
            title: "Spring Trail Running Collection".to_string(),
            description: "Lightweight trail shoes for weekend runners. Show them on a real route."
                .to_string(),
            criteria: "- Running or outdoor niche\n- At least one active video platform".to_string(),
            budget: 4500.0,
            deadline: "2030-04-30".to_string(),
            status: Some(CampaignStatus::Active),
        },
    )?;
    println!(
        "Published campaign '{}' ({}), budget ${}",
        campaign.title, campaign.id, campaign.budget
    );

    for index in 1..=creators {
        let handle = format!("demo-creator-{index}");
        let creator = as_user(&handle);
        marketplace.accounts.set_role(&creator, AccountRole::Creator)?;
        marketplace.profiles.create_or_update(
            &creator,
            ProfileInput {
                name: format!("Creator {index}"),
                bio: "Trail runs, gear reviews, and race-day vlogs.".to_string(),
                social_media_links: vec![SocialMediaLink {
                    platform: "YouTube".to_string(),
                    url: format!("https://youtube.com/@{handle}"),
                }],
                is_complete: true,
            },
        )?;
        let application = marketplace.submissions.submit(
            &creator,
            &campaign.id,
            SubmissionPayload {
                video_url: Some(format!("https://youtube.com/watch?v={handle}")),
                uploaded_files: None,
            },
        )?;
        println!("  {handle} applied ({})", application.id);
    }

    tokio::time::sleep(Duration::from_millis(wait_ms)).await;

    let ranked = marketplace
        .applications
        .get_ranked_by_campaign(&company, &campaign.id)?;
    render_ranking(&ranked);

    if select_top {
        if let Some(top) = ranked.first() {
            marketplace.applications.update_status(
                &company,
                &top.application.id,
                ApplicationStatus::Selected,
            )?;
            let count = marketplace
                .partnerships
                .count_by_campaign(&company, &campaign.id)?;
            println!(
                "\nSelected {}; partnerships for this campaign: {count}",
                top.application.creator_id
            );
        }
    }

    Ok(())
}

fn render_ranking(ranked: &[ApplicantView]) {
    println!("\nRanked applicants");
    if ranked.is_empty() {
        println!("  (none)");
        return;
    }

    for (position, view) in ranked.iter().enumerate() {
        let name = view
            .profile
            .as_ref()
            .map(|profile| profile.name.as_str())
            .unwrap_or("unknown creator");
        let score = view
            .application
            .fit_score
            .map(|score| format!("{score:.0}/100"))
            .unwrap_or_else(|| "not scored yet".to_string());
        println!(
            "  {}. {name} [{}] {score}",
            position + 1,
            view.application.status.label()
        );
    }
}
