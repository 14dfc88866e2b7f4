use chrono::Utc;

use super::common::*;
use crate::directory::domain::{Place, PlaceId, Review, ReviewId, Viewer};
use crate::directory::policy::{active_filter, can_delete_review, place_visible, ActiveFilter};

fn place(active: bool) -> Place {
    Place {
        id: PlaceId(7),
        name: "Cafe Paradiso".to_string(),
        address: "Rua das Flores 12".to_string(),
        postal_code: "4000-123".to_string(),
        city: "Porto".to_string(),
        state: "Porto".to_string(),
        country: "Portugal".to_string(),
        latitude: 41.1496,
        longitude: -8.6110,
        email: None,
        phone_number: None,
        website: None,
        description: None,
        created_at: Utc::now(),
        created_by: alice(),
        active,
    }
}

#[test]
fn active_places_are_visible_to_everyone() {
    let place = place(true);
    assert!(place_visible(&place, &Viewer::Anonymous));
    assert!(place_visible(&place, &viewer(alice())));
    assert!(place_visible(&place, &viewer(staff())));
}

#[test]
fn inactive_places_are_visible_only_to_staff() {
    let place = place(false);
    assert!(!place_visible(&place, &Viewer::Anonymous));
    assert!(!place_visible(&place, &viewer(alice())));
    assert!(place_visible(&place, &viewer(staff())));
}

#[test]
fn non_staff_listing_is_pinned_to_active() {
    assert_eq!(
        active_filter(&Viewer::Anonymous, None).expect("valid"),
        ActiveFilter::Only(true)
    );
    // A token from a non-staff viewer is ignored, not rejected.
    assert_eq!(
        active_filter(&viewer(alice()), Some("false")).expect("valid"),
        ActiveFilter::Only(true)
    );
    assert_eq!(
        active_filter(&viewer(alice()), Some("garbage")).expect("valid"),
        ActiveFilter::Only(true)
    );
}

#[test]
fn staff_listing_defaults_to_everything() {
    assert_eq!(
        active_filter(&viewer(staff()), None).expect("valid"),
        ActiveFilter::Any
    );
    assert_eq!(
        active_filter(&viewer(staff()), Some("")).expect("valid"),
        ActiveFilter::Any
    );
}

#[test]
fn staff_listing_accepts_literal_tokens_only() {
    assert_eq!(
        active_filter(&viewer(staff()), Some("true")).expect("valid"),
        ActiveFilter::Only(true)
    );
    assert_eq!(
        active_filter(&viewer(staff()), Some("false")).expect("valid"),
        ActiveFilter::Only(false)
    );

    let error = active_filter(&viewer(staff()), Some("yes")).expect_err("rejected");
    assert!(error.parameters.contains_key("active"));
}

#[test]
fn only_the_author_may_delete_a_review() {
    let review = Review {
        id: ReviewId(1),
        place_id: PlaceId(7),
        user: alice(),
        date: Utc::now(),
        rating: 4,
        comment: "fixture".to_string(),
        photo: None,
    };

    assert!(can_delete_review(&review, &viewer(alice())));
    assert!(!can_delete_review(&review, &viewer(bob())));
    assert!(!can_delete_review(&review, &Viewer::Anonymous));
    // Staff get no moderation shortcut.
    assert!(!can_delete_review(&review, &viewer(staff())));
}
