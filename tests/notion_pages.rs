use chrono::{Local, TimeZone};
use chrono_tz::America::New_York;
use notion2gcal::components::notion::QueryResponse;
use notion2gcal::components::sync::{EventMapper, Mapping, SkipReason};
use notion2gcal::config::{MapperConfig, PropertyNames};
use notion2gcal::utils::clock::FixedClock;
use serde_json::{json, Value};
use std::sync::Arc;

/// Evaluated on 2023-10-08
fn mapper() -> EventMapper {
    let now = Local.with_ymd_and_hms(2023, 10, 8, 12, 0, 0).unwrap();
    EventMapper::new(&MapperConfig::default(), Arc::new(FixedClock(now))).unwrap()
}

fn page(id: &str, name: &str, status: &str, date: Value) -> Value {
    json!({
        "object": "page",
        "id": id,
        "properties": {
            "Name": { "type": "title", "title": [ { "text": { "content": name } } ] },
            "Status": { "type": "select", "select": { "name": status } },
            "Due Date": { "type": "date", "date": date }
        }
    })
}

fn map_pages(pages: Vec<Value>) -> Vec<Mapping> {
    let response: QueryResponse =
        serde_json::from_value(json!({ "object": "list", "results": pages, "has_more": false }))
            .unwrap();
    let mapper = mapper();
    response
        .results
        .iter()
        .map(|page| mapper.map(&page.to_task(&PropertyNames::default())))
        .collect()
}

fn event_start(mapping: &Mapping) -> String {
    match mapping {
        Mapping::Event(event) => event.start.date_time.to_rfc3339(),
        Mapping::Skipped(reason) => panic!("unexpected skip: {}", reason),
    }
}

#[test]
fn test_query_response_mapping() {
    let mappings = map_pages(vec![
        page("1", "Test Page", "Backlog", json!({ "start": "2022-01-01" })),
        page("2", "Test Page", "In Progress", json!({})),
        page("3", "Test Page", "In Progress", json!({ "start": "2022-01-01", "end": "2022-01-02" })),
        page("4", "Ship report", "In Progress", json!({ "start": "2023-10-09" })),
        page("5", "Ship report", "In Progress", json!({ "start": "2022-01-01" })),
        page("6", "X", "Backlog", json!({ "start": "2099-01-01" })),
        page(
            "7",
            "Test Page",
            "In Progress",
            json!({ "start": "2023-10-08T14:00:00+08:00", "end": "2023-10-08T15:00:00+08:00" }),
        ),
    ]);

    let today_9am = New_York
        .with_ymd_and_hms(2023, 10, 8, 9, 0, 0)
        .unwrap()
        .fixed_offset()
        .to_rfc3339();

    assert_eq!(
        mappings[0],
        Mapping::Skipped(SkipReason::IgnoredStatus("Backlog".to_string()))
    );
    assert_eq!(event_start(&mappings[1]), today_9am);
    assert_eq!(event_start(&mappings[2]), today_9am);
    assert_eq!(event_start(&mappings[3]), "2023-10-09T09:00:00-04:00");
    assert_eq!(event_start(&mappings[4]), today_9am);
    assert!(matches!(mappings[5], Mapping::Skipped(SkipReason::IgnoredStatus(_))));

    match &mappings[6] {
        Mapping::Event(event) => {
            let body = serde_json::to_value(event).unwrap();
            assert_eq!(
                body,
                json!({
                    "summary": "Test Page",
                    "start": {
                        "date": "2023-10-08",
                        "dateTime": "2023-10-08T14:00:00+08:00",
                        "timeZone": "America/New_York"
                    },
                    "end": {
                        "date": "2023-10-08",
                        "dateTime": "2023-10-08T15:00:00+08:00",
                        "timeZone": "America/New_York"
                    },
                    "originalStartTime": {
                        "date": "2023-10-08",
                        "dateTime": "2023-10-08T14:00:00+08:00",
                        "timeZone": "America/New_York"
                    }
                })
            );
        }
        Mapping::Skipped(reason) => panic!("unexpected skip: {}", reason),
    }
}

#[test]
fn test_malformed_page_is_skipped() {
    let mut broken = page("8", "Broken", "In Progress", json!({ "start": "2023-13-45" }));
    let mappings = map_pages(vec![broken.clone()]);
    assert!(matches!(mappings[0], Mapping::Skipped(SkipReason::Malformed(_))));

    // Page without a Status property at all
    broken["properties"]
        .as_object_mut()
        .unwrap()
        .remove("Status");
    let mappings = map_pages(vec![broken]);
    assert!(matches!(mappings[0], Mapping::Skipped(SkipReason::Malformed(_))));
}
