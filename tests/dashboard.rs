//! Dashboard view models, admin table states and CSV export.

mod common;

use chrono::{NaiveDate, TimeZone, Utc};
use common::{dashboard, registration};
use tournament_registration_web::logic::{
    filter_registrations, format_date, registrations_csv, table_state, EventFilter,
    PlayerDashboardView, TableState,
};
use tournament_registration_web::models::{EventName, PlayerEvent, Ranking};

#[test]
fn dates_use_day_month_year() {
    assert_eq!(format_date(NaiveDate::from_ymd_opt(2025, 6, 15)), "15 Jun 2025");
    assert_eq!(format_date(None), "Not provided");
}

#[test]
fn player_view_marks_missing_values() {
    let mut d = dashboard(
        7,
        None,
        vec![
            PlayerEvent {
                event: EventName::MixedDoubles,
                partner_id: None,
                partner_name: None,
                ranking: None,
            },
            PlayerEvent {
                event: EventName::WomensDoubles,
                partner_id: Some(8),
                partner_name: Some("Meera".to_string()),
                ranking: Ranking::new(3).ok(),
            },
        ],
    );
    d.player.created_at = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).single();

    let view = PlayerDashboardView::from(&d);

    let value = |label: &str| {
        view.details
            .iter()
            .find(|l| l.label == label)
            .map(|l| l.value.clone())
            .unwrap()
    };
    assert_eq!(value("Date of birth"), "15 Jun 1994");
    assert_eq!(value("Gender"), "Not provided");
    assert_eq!(value("Address"), "Not provided");
    assert_eq!(value("Fee paid"), "No");
    assert_eq!(view.registered_on, "01 Jun 2025");

    assert_eq!(view.events[0].partner, "No partner assigned");
    assert_eq!(view.events[0].ranking, None);
    assert_eq!(view.events[1].partner, "Meera");
    assert_eq!(view.events[1].ranking, Some(3));
}

#[test]
fn singles_events_show_no_partner_and_missing_timestamp_is_not_available() {
    let d = dashboard(
        9,
        None,
        vec![PlayerEvent {
            event: EventName::MensSingles,
            partner_id: None,
            partner_name: None,
            ranking: None,
        }],
    );
    assert_eq!(d.player.created_at, None);

    let view = PlayerDashboardView::from(&d);

    assert_eq!(view.events[0].event, "Men's Singles");
    assert_eq!(view.events[0].partner, "No partner assigned");
    assert_eq!(view.registered_on, "Not available");
}

#[test]
fn admin_table_states() {
    let rows = vec![
        registration(1, "Arjun", EventName::MensSingles, None, None),
        registration(2, "Meera", EventName::WomensSingles, None, None),
    ];
    assert_eq!(table_state(&[], EventFilter::All), TableState::NoData);
    assert_eq!(table_state(&rows, EventFilter::All), TableState::NoEventSelected);
    assert_eq!(
        table_state(&rows, EventFilter::Only(EventName::MixedDoubles)),
        TableState::NoPlayersInEvent
    );
    assert_eq!(
        TableState::NoPlayersInEvent
            .message(EventFilter::Only(EventName::MixedDoubles))
            .as_deref(),
        Some("No players registered for Mixed Doubles yet.")
    );
    assert_eq!(
        table_state(&rows, EventFilter::Only(EventName::MensSingles)),
        TableState::Rows
    );
    assert_eq!(TableState::Rows.message(EventFilter::All), None);
}

#[test]
fn filter_keeps_only_the_selected_event() {
    let rows = vec![
        registration(1, "Arjun", EventName::MensSingles, None, None),
        registration(2, "Meera", EventName::WomensSingles, None, None),
        registration(3, "Dev", EventName::MensSingles, None, None),
    ];
    let only = filter_registrations(&rows, EventFilter::Only(EventName::MensSingles));
    assert_eq!(only.iter().map(|r| r.player_id).collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(filter_registrations(&rows, EventFilter::All).len(), 3);
}

#[test]
fn csv_export_has_header_and_one_line_per_row() {
    let rows = vec![
        registration(1, "Arjun", EventName::MensDoubles, Some((2, "Bilal, Jr")), Some(5)),
        registration(3, "Dev", EventName::MensSingles, None, None),
    ];
    let refs: Vec<_> = rows.iter().collect();

    let csv = registrations_csv(&refs).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(
        lines[0],
        "player_id,player_name,whatsapp_number,email,city,event_name,partner_id,partner_name,ranking"
    );
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("1,Arjun,"));
    assert!(lines[1].contains("Men's Doubles,2,\"Bilal, Jr\",5"));
    assert!(lines[2].ends_with("Men's Singles,,,"));

    let empty = registrations_csv(&[]).unwrap();
    assert_eq!(empty.lines().count(), 1);
}
