//! Editing sessions driving export resolution and persistence.

use std::sync::Arc;
use std::thread;

use reelkit_export::{ExportResolver, Platform, PlatformRegistry, Rejection};
use reelkit_timeline::{
    EditSession, Effect, EffectKind, SharedCatalog, Timeline, TimelineFile, TrackKind,
};

use crate::support::{catalog, init_tracing, secs};

fn session() -> EditSession {
    let catalog: SharedCatalog = Arc::new(catalog());
    EditSession::new(Timeline::new("session"), catalog)
}

#[test]
fn undo_changes_export_verdict() {
    init_tracing();
    let registry = PlatformRegistry::builtin();
    let tiktok = registry.get(Platform::TikTok).unwrap();
    let resolver = ExportResolver::default();

    let mut session = session();
    let track = session.add_track(TrackKind::Video).unwrap();
    let clip = session
        .place_clip(track, "portrait".into(), secs(0), secs(0), secs(2))
        .unwrap();
    let verdict = resolver.resolve(session.timeline(), &**session.catalog(), tiktok);
    assert!(matches!(verdict, Err(Rejection::DurationTooShort { .. })));

    session.trim_clip(clip, secs(0), secs(20)).unwrap();
    let plan = resolver
        .resolve(session.timeline(), &**session.catalog(), tiktok)
        .unwrap();
    assert_eq!(plan.duration, secs(20));

    assert!(session.undo().unwrap());
    let verdict = resolver.resolve(session.timeline(), &**session.catalog(), tiktok);
    assert!(matches!(verdict, Err(Rejection::DurationTooShort { .. })));

    assert!(session.redo().unwrap());
    assert_eq!(
        resolver.resolve(session.timeline(), &**session.catalog(), tiktok),
        Ok(plan)
    );
}

#[test]
fn shared_session_resolves_under_lock() {
    let shared = session().into_shared();
    let track = shared.lock().add_track(TrackKind::Video).unwrap();

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                shared
                    .lock()
                    .place_clip(track, "broll".into(), secs(i * 10), secs(0), secs(10))
                    .unwrap();
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let registry = PlatformRegistry::builtin();
    let session = shared.lock();
    assert_eq!(session.timeline().clip_count(), 4);
    assert_eq!(session.revision(), 5);
    let plan = ExportResolver::default()
        .resolve(
            session.timeline(),
            &**session.catalog(),
            registry.get(Platform::YouTube).unwrap(),
        )
        .unwrap();
    assert_eq!(plan.duration, secs(40));
    assert_eq!(plan.frame_rate.numerator, 24);
}

#[test]
fn saved_session_reopens_identically() {
    let mut session = session();
    let video = session.add_track(TrackKind::Video).unwrap();
    let music = session.add_track(TrackKind::Audio).unwrap();
    let clip = session
        .place_clip(video, "landscape".into(), secs(0), secs(10), secs(70))
        .unwrap();
    session.split_clip(clip, secs(25)).unwrap();
    session
        .place_clip(music, "music".into(), secs(0), secs(0), secs(60))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cut.json");
    session.to_file().save_to_file(&path).unwrap();

    let loaded = TimelineFile::load_from_file(&path).unwrap();
    let reopened = EditSession::open(loaded, Arc::clone(session.catalog())).unwrap();
    assert_eq!(reopened.timeline(), session.timeline());
    assert_eq!(reopened.revision(), 0);
    assert!(!reopened.history().can_undo());

    let registry = PlatformRegistry::builtin();
    let youtube = registry.get(Platform::YouTube).unwrap();
    let resolver = ExportResolver::default();
    assert_eq!(
        resolver.resolve(reopened.timeline(), &**reopened.catalog(), youtube),
        resolver.resolve(session.timeline(), &**session.catalog(), youtube)
    );
}

#[test]
fn reopening_against_smaller_catalog_fails() {
    let mut session = session();
    let track = session.add_track(TrackKind::Video).unwrap();
    session
        .place_clip(track, "broll".into(), secs(0), secs(0), secs(5))
        .unwrap();

    let empty: SharedCatalog = Arc::new(reelkit_core::InMemoryCatalog::new());
    assert!(EditSession::open(session.to_file(), empty).is_err());
}

#[test]
fn global_filters_survive_undo_and_reopen() {
    let mut session = session();
    let track = session.add_track(TrackKind::Video).unwrap();
    session
        .place_clip(track, "landscape".into(), secs(0), secs(0), secs(20))
        .unwrap();
    let grade = session
        .add_global_filter(Effect::new(EffectKind::ColorGrading).with_intensity(0.6), None)
        .unwrap();
    let blur = session
        .add_global_filter(Effect::new(EffectKind::Blur), Some(0))
        .unwrap();
    let order: Vec<_> = session.timeline().global_filters().iter().map(|f| f.id).collect();
    assert_eq!(order, vec![blur, grade]);
    assert_eq!(session.history().undo_label(), Some("Add filter"));

    session.remove_global_filter(blur).unwrap();
    assert!(session.remove_global_filter(blur).is_err());
    assert!(session.undo().unwrap());
    assert_eq!(session.timeline().global_filters()[0].id, blur);

    let reopened = EditSession::open(session.to_file(), Arc::clone(session.catalog())).unwrap();
    assert_eq!(reopened.timeline().global_filters(), session.timeline().global_filters());
}
