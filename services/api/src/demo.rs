use std::sync::Arc;

use clap::Args;

use places::directory::domain::{
    PhotoSubmission, PlaceSubmission, RatingSummary, ReviewSubmission, Viewer,
};
use places::directory::service::DirectoryService;
use places::error::AppError;

use crate::infra::{member_account, staff_account, InMemoryDirectory};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Review ratings to apply in order (1-5)
    #[arg(long, value_delimiter = ',', default_values_t = vec![3, 5, 4])]
    pub(crate) ratings: Vec<i64>,
    /// Keep the last review instead of deleting it at the end
    #[arg(long)]
    pub(crate) keep_last: bool,
}

fn render_rating(summary: RatingSummary) -> String {
    format!("average {:.2} across {} review(s)", summary.average, summary.reviews)
}

/// Walk the listing lifecycle end to end against an in-memory store: submit,
/// publish, review, and show the rating aggregate tracking every change.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = DirectoryService::new(Arc::new(InMemoryDirectory::default()));
    let staff = Viewer::Known(staff_account());
    let member = Viewer::Known(member_account());

    println!("Places directory demo");

    let submission = PlaceSubmission {
        name: "Harbor Grill".to_string(),
        address: "Dock 4".to_string(),
        postal_code: "1100-001".to_string(),
        city: "Lisbon".to_string(),
        state: "Lisbon".to_string(),
        country: "Portugal".to_string(),
        latitude: Some(38.7071),
        longitude: Some(-9.1355),
        email: None,
        phone_number: None,
        website: None,
        description: Some("Charcoal fish by the water.".to_string()),
        active: None,
    };

    let place = service.create_place(&member, submission.clone())?;
    println!("submitted '{}' (id {}, inactive until curated)", place.name, place.id);

    let mut publish = submission;
    publish.active = Some(true);
    let (place, _) = service.update_place(&staff, place.id, publish)?;
    println!("staff published the listing");

    let mut last_review = None;
    for rating in &args.ratings {
        let (review, summary) = service.create_review(
            &member,
            place.id,
            ReviewSubmission {
                rating: Some(*rating),
                comment: format!("Visit #{rating}: worth writing home about."),
                photo_id: None,
            },
        )?;
        println!("review rated {} -> {}", rating, render_rating(summary));
        last_review = Some(review.id);
    }

    if !args.keep_last {
        if let Some(review_id) = last_review {
            let summary = service.delete_review(&member, place.id, review_id)?;
            println!("deleted the last review -> {}", render_rating(summary));
        }
    }

    let photo = service.create_photo(
        &member,
        place.id,
        PhotoSubmission {
            file: "galleries/harbor/night.png".to_string(),
        },
    )?;
    println!("added gallery photo {} ({})", photo.id, photo.file);

    let (results, _) = service.search_places(&Viewer::Anonymous, None, None)?;
    for (place, summary) in &results {
        println!("public listing: {}: {}", place.name, render_rating(*summary));
    }

    Ok(())
}
