// Integration tests for the query layer and the expect API
//
// Tests cover:
// - all() waiting for a non-empty set vs all_now() returning whatever is there
// - exists() probes answering with bool instead of errors
// - until_visible / until_not_visible helpers
// - expect() auto-retry assertions, negation, and message formats

mod common;
mod fake_page;

use fake_page::{FakeElement, FakePage, Step};
use std::time::Duration;
use vigil_rs::{ElementHandle, Error, Locator, RetryPolicy, expect, query, until_visible};

#[tokio::test(start_paused = true)]
async fn test_all_waits_until_at_least_one_match() {
    common::init_tracing();
    let page = FakePage::new();
    page.script(
        ".grid-row",
        vec![
            Step::Elements(vec![]),
            Step::Elements(vec![FakeElement::new("row 1"), FakeElement::new("row 2")]),
        ],
    );

    let rows = query(&page, Locator::css(".grid-row"))
        .all()
        .await
        .expect("rows render on the second attempt");

    assert_eq!(rows.len(), 2);
    assert_eq!(page.find_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_all_filters_but_never_errors_on_multiplicity() {
    common::init_tracing();
    let page = FakePage::new();
    page.set(
        ".grid-row",
        vec![
            FakeElement::new("row 1"),
            FakeElement::new("row 2").hidden(),
            FakeElement::new("row 3"),
        ],
    );

    let rows = query(&page, Locator::css(".grid-row"))
        .all()
        .await
        .expect("visible rows");
    assert_eq!(rows.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_all_now_returns_empty_without_waiting() {
    common::init_tracing();
    let page = FakePage::new();

    let rows = query(&page, Locator::css(".grid-row"))
        .all_now()
        .await
        .expect("empty is a valid answer");

    assert!(rows.is_empty());
    assert_eq!(page.find_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_all_times_out_when_nothing_ever_renders() {
    common::init_tracing();
    let page = FakePage::new();

    let result = query(&page, Locator::css(".grid-row"))
        .with_timeout(Duration::from_millis(500))
        .with_poll_interval(Duration::from_millis(50))
        .with_message("grid rows after filter change")
        .all()
        .await;

    let err = result.expect_err("no rows");
    assert!(matches!(err, Error::WaitTimeout(_)));
    assert!(
        err.to_string().contains("grid rows after filter change"),
        "got: {err}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_exists_probe_answers_with_bool() {
    common::init_tracing();
    let page = FakePage::new();
    page.set(".toast", vec![FakeElement::new("Saved")]);

    assert!(
        query(&page, Locator::css(".toast"))
            .exists()
            .await
            .expect("probe")
    );
    // Absence is an answer, not an error, and honors the short probe policy
    let started = tokio::time::Instant::now();
    assert!(
        !query(&page, Locator::css(".missing"))
            .exists()
            .await
            .expect("probe")
    );
    assert!(started.elapsed() >= RetryPolicy::probe().timeout);
}

#[tokio::test(start_paused = true)]
async fn test_until_visible_and_until_not_visible_helpers() -> anyhow::Result<()> {
    common::init_tracing();
    let page = FakePage::new();
    page.script(
        ".spinner",
        vec![
            Step::Elements(vec![FakeElement::new("loading")]),
            Step::Elements(vec![FakeElement::new("loading")]),
            Step::Elements(vec![]),
        ],
    );
    page.set("#content", vec![FakeElement::new("ready")]);

    let content = until_visible(&page, Locator::css("#content")).await?;
    assert_eq!(content.text().await?, "ready");

    vigil_rs::until_not_visible(&page, Locator::css(".spinner")).await?;
    Ok(())
}

// ============================================================================
// expect() assertions
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_expect_visibility_and_negation() {
    common::init_tracing();
    let page = FakePage::new();
    page.set("#btn", vec![FakeElement::new("Click me")]);
    page.set("#hidden", vec![FakeElement::new("secret").hidden()]);

    expect(&page, Locator::css("#btn"))
        .to_be_visible()
        .await
        .expect("button is visible");
    expect(&page, Locator::css("#hidden"))
        .to_be_hidden()
        .await
        .expect("hidden element is hidden");
    expect(&page, Locator::css("#btn"))
        .not()
        .to_be_hidden()
        .await
        .expect("negation of hidden");

    let result = expect(&page, Locator::css("#missing"))
        .with_timeout(Duration::from_millis(400))
        .to_be_visible()
        .await;
    let err = result.expect_err("nothing to see");
    assert!(matches!(err, Error::AssertionTimeout(_)));
    assert!(
        err.to_string()
            .contains("Expected element 'css=#missing' to be visible"),
        "got: {err}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_expect_retries_until_text_settles() {
    common::init_tracing();
    let page = FakePage::new();
    page.script(
        ".status",
        vec![
            Step::Elements(vec![FakeElement::new("Saving...")]),
            Step::Elements(vec![FakeElement::new("Saving...")]),
            Step::Elements(vec![FakeElement::new("Saved")]),
        ],
    );

    expect(&page, Locator::css(".status"))
        .to_have_text("Saved")
        .await
        .expect("status settles");
    assert_eq!(page.find_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_expect_text_timeout_reports_actual() {
    common::init_tracing();
    let page = FakePage::new();
    page.set(".status", vec![FakeElement::new("Saving...")]);

    let result = expect(&page, Locator::css(".status"))
        .with_timeout(Duration::from_millis(400))
        .to_have_text("Saved")
        .await;

    let message = result.expect_err("status never settles").to_string();
    assert!(message.contains("to have text 'Saved'"), "got: {message}");
    assert!(message.contains("had 'Saving...'"), "got: {message}");
}

#[tokio::test(start_paused = true)]
async fn test_expect_contain_and_pattern_text() {
    common::init_tracing();
    let page = FakePage::new();
    page.set(".summary", vec![FakeElement::new("42 of 100 rows shown")]);

    expect(&page, Locator::css(".summary"))
        .to_contain_text("100 rows")
        .await
        .expect("substring");
    expect(&page, Locator::css(".summary"))
        .to_match_text(r"^\d+ of \d+ rows")
        .await
        .expect("pattern");

    let invalid = expect(&page, Locator::css(".summary"))
        .to_match_text("[unclosed")
        .await;
    assert!(matches!(invalid, Err(Error::InvalidArgument(_))));
}

#[tokio::test(start_paused = true)]
async fn test_expect_enabled_and_disabled() {
    common::init_tracing();
    let page = FakePage::new();
    page.set("#enabled", vec![FakeElement::new("Go")]);
    page.set("#disabled", vec![FakeElement::new("Stop").disabled()]);

    expect(&page, Locator::css("#enabled"))
        .to_be_enabled()
        .await
        .expect("enabled button");
    expect(&page, Locator::css("#disabled"))
        .to_be_disabled()
        .await
        .expect("disabled button");
}
