use super::worker::ScoringSnapshot;

/// Render the scoring context: campaign, creator profile, then the submission.
pub fn render_prompt(snapshot: &ScoringSnapshot) -> String {
    let ScoringSnapshot {
        application,
        campaign,
        profile,
    } = snapshot;

    let social_links = profile
        .social_media_links
        .iter()
        .map(|link| format!("- {}: {}", link.platform, link.url))
        .collect::<Vec<_>>()
        .join("\n");

    let submission = match application.video_url.as_deref() {
        Some(url) => format!("**Video URL:** {url}"),
        None => "**Uploaded Files:** See application for details".to_string(),
    };

    let prompt = format!(
        "# Campaign Details\n\
         **Title:** {title}\n\
         **Description:** {description}\n\
         **Budget:** ${budget}\n\
         **Deadline:** {deadline}\n\
         \n\
         **Requirements/Criteria:**\n\
         {criteria}\n\
         \n\
         ---\n\
         \n\
         # Creator Profile\n\
         **Name:** {name}\n\
         **Bio:** {bio}\n\
         \n\
         **Social Media:**\n\
         {social_links}\n\
         \n\
         ---\n\
         \n\
         # Video Submission\n\
         {submission}\n\
         \n\
         ---\n\
         \n\
         Please analyze this creator's profile and submission against the campaign requirements.\n\
         Provide a comprehensive fit score based on their profile quality, social media presence, \
         and how well they match the campaign criteria.",
        title = campaign.title,
        description = campaign.description,
        budget = format_budget(campaign.budget),
        deadline = campaign.deadline,
        criteria = campaign.criteria,
        name = profile.name,
        bio = profile.bio,
    );

    prompt.trim().to_string()
}

/// Format an amount with thousands separators and at most three fraction digits,
/// e.g. `5000.0` -> `5,000` and `1234.5` -> `1,234.5`.
pub fn format_budget(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let thousandths = (amount.abs() * 1000.0).round();
    let whole = (thousandths / 1000.0).trunc();
    let fraction = (thousandths - whole * 1000.0) as u64;

    let digits = format!("{whole:.0}");
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if fraction > 0 {
        let decimals = format!("{fraction:03}");
        grouped.push('.');
        grouped.push_str(decimals.trim_end_matches('0'));
    }

    if amount < 0.0 && thousandths > 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
