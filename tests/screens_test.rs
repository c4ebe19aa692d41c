// ABOUTME: Integration tests for the language, onboarding, saved tasks, and settings screens
// ABOUTME: Also covers which screen a user lands on given their session and profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::Harness;
use stepwise::constants::messages::ONBOARDING_PAGES;
use stepwise::controllers::{resolve_entry, LanguageStep};
use stepwise::errors::ErrorCode;
use stepwise::models::UserPatch;
use stepwise::navigation::{ChatLaunch, Route, TaskHelperLaunch};

// ============================================================================
// Entry gating
// ============================================================================

#[tokio::test]
async fn test_signed_out_users_land_on_welcome() {
    let harness = Harness::signed_out();

    let route = resolve_entry(&harness.session, Route::Home).await.unwrap();
    assert_eq!(route, Route::Welcome);

    let public = resolve_entry(&harness.session, Route::LanguageSelection)
        .await
        .unwrap();
    assert_eq!(public, Route::LanguageSelection);
}

#[tokio::test]
async fn test_new_users_pick_a_language_then_onboard() {
    let harness = Harness::signed_in().await;

    let route = resolve_entry(&harness.session, Route::chat()).await.unwrap();
    assert_eq!(route, Route::LanguageSelection);

    harness.session.update(UserPatch::language("es")).await.unwrap();
    let route = resolve_entry(&harness.session, Route::SavedTasks).await.unwrap();
    assert_eq!(route, Route::Onboarding);
}

#[tokio::test]
async fn test_ready_users_open_what_they_asked_for() {
    let harness = Harness::ready().await;
    let requested = Route::Chat(ChatLaunch::with_prompt("How do I block a number?"));

    let route = resolve_entry(&harness.session, requested.clone()).await.unwrap();

    assert_eq!(route, requested);
}

// ============================================================================
// Language selection
// ============================================================================

#[tokio::test]
async fn test_continue_without_selection_stays() {
    let harness = Harness::signed_in().await;
    let language = harness.context().language();

    assert_eq!(language.continue_().await.unwrap(), LanguageStep::Stay);
    assert!(!harness.user().await.has_language());
}

#[tokio::test]
async fn test_selected_language_is_saved_then_onboarding() {
    let harness = Harness::signed_in().await;
    let mut language = harness.context().language();

    let chosen = language.select("FR").unwrap();
    assert_eq!(chosen.code, "fr");
    assert_eq!(language.selected().map(|l| l.name), Some("Français"));

    let step = language.continue_().await.unwrap();

    assert_eq!(step, LanguageStep::Navigate(Route::Onboarding));
    assert_eq!(harness.user().await.language(), "fr");
}

#[tokio::test]
async fn test_unknown_language_is_rejected() {
    let harness = Harness::signed_in().await;
    let mut language = harness.context().language();

    let error = language.select("xx").unwrap_err();

    assert_eq!(error.code, ErrorCode::InvalidInput);
    assert!(language.selected().is_none());
}

#[tokio::test]
async fn test_language_without_session_asks_for_login() {
    let harness = Harness::signed_out();
    let mut language = harness.context().language();
    language.select("pt").unwrap();

    let LanguageStep::Login(url) = language.continue_().await.unwrap() else {
        panic!("expected a login redirect");
    };

    assert!(url.starts_with("memory://login?from_url="));
    assert!(url.contains("Onboarding"));
}

// ============================================================================
// Onboarding
// ============================================================================

#[tokio::test]
async fn test_onboarding_pages_then_home() {
    let harness = Harness::signed_in().await;
    harness.session.update(UserPatch::language("en")).await.unwrap();
    let mut onboarding = harness.context().onboarding();

    assert_eq!(onboarding.page().title, ONBOARDING_PAGES[0].title);
    onboarding.back();
    assert_eq!(onboarding.page_index(), 0);

    for _ in 1..ONBOARDING_PAGES.len() {
        assert_eq!(onboarding.next().await.unwrap(), None);
    }
    assert!(onboarding.is_last());
    assert!(!harness.user().await.onboarding_completed);

    assert_eq!(onboarding.next().await.unwrap(), Some(Route::Home));
    assert!(harness.user().await.onboarding_completed);
    assert_eq!(
        resolve_entry(&harness.session, Route::Home).await.unwrap(),
        Route::Home
    );
}

#[tokio::test]
async fn test_onboarding_failure_stays_on_last_page() {
    let harness = Harness::signed_in().await;
    let mut onboarding = harness.context().onboarding();
    for _ in 1..ONBOARDING_PAGES.len() {
        onboarding.next().await.unwrap();
    }
    harness.session_gateway.fail_updates(true);

    assert!(onboarding.next().await.is_err());

    assert!(onboarding.is_last());
    assert_eq!(onboarding.page_index(), ONBOARDING_PAGES.len() - 1);
    assert!(!harness.user().await.onboarding_completed);
}

// ============================================================================
// Saved tasks
// ============================================================================

#[tokio::test]
async fn test_saved_tasks_newest_first_and_open() {
    let harness = Harness::ready().await;
    harness.seed_task("Set an alarm", &["Open Clock"]).await;
    let newest = harness
        .seed_task("Share a location", &["Open Maps", "Tap Share"])
        .await;
    let saved_tasks = harness.context().saved_tasks();

    let list = saved_tasks.list().await.unwrap();

    let titles: Vec<&str> = list.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Share a location", "Set an alarm"]);
    assert_eq!(
        saved_tasks.open(&list[0]),
        Route::TaskHelper(TaskHelperLaunch::load(&newest.id))
    );
}

#[tokio::test]
async fn test_saved_tasks_empty() {
    let harness = Harness::ready().await;

    assert!(harness.context().saved_tasks().list().await.unwrap().is_empty());
}

// ============================================================================
// Settings
// ============================================================================

#[tokio::test]
async fn test_settings_view_reflects_profile() {
    let harness = Harness::ready().await;

    let view = harness.context().settings().view().await.unwrap();

    assert_eq!(view.language.code, "en");
    assert_eq!(view.tasks_completed, 0);
    assert_eq!(view.email.as_deref(), Some("pat@example.com"));
}

#[tokio::test]
async fn test_settings_change_language() {
    let harness = Harness::ready().await;
    let settings = harness.context().settings();

    let language = settings.change_language("es").await.unwrap();

    assert_eq!(language.code, "es");
    assert_eq!(settings.view().await.unwrap().language.code, "es");
    assert_eq!(harness.session.language().await, "es");

    let error = settings.change_language("klingon").await.unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
    assert_eq!(harness.user().await.language(), "es");
}

#[tokio::test]
async fn test_logout_returns_to_welcome() {
    let harness = Harness::ready().await;

    let route = harness.context().settings().logout().await;

    assert_eq!(route, Route::Welcome);
    assert!(harness.session.optional_user().await.unwrap().is_none());
    assert_eq!(
        resolve_entry(&harness.session, Route::Settings).await.unwrap(),
        Route::Welcome
    );
}
