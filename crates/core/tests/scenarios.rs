use std::sync::{Arc, Mutex};

use mediabind_core::{
    hints::{Hints, RenderDriver},
    prelude::*,
    software::{SoftwareBackend, SoftwareStore},
    MediaError, Priority, ResourceType, Surface, Texture,
};
use pretty_assertions::assert_eq;

#[test]
fn override_write_replaces_default_value() {
    let hints = Hints::new(Arc::new(SoftwareStore::new()));

    assert!(hints.set::<RenderDriver>(RenderDriver::Software, Priority::Default));
    assert!(hints.set::<RenderDriver>(RenderDriver::OpenGl, Priority::Override));
    assert_eq!(hints.get::<RenderDriver>().unwrap(), Some(RenderDriver::OpenGl));
}

#[test]
fn callback_sees_changes_until_disconnect() {
    let store = Arc::new(SoftwareStore::new());
    let hints = Hints::new(store.clone());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);

    let counter = 7_u32;
    let mut subscription = hints.add_callback::<RenderDriver, _, _>(counter, move |data, change| {
        sink.lock().unwrap().push((
            *data,
            change.old.map(str::to_owned),
            change.new.map(str::to_owned),
        ));
    });

    hints.set::<RenderDriver>(RenderDriver::Software, Priority::Override);
    hints.set::<RenderDriver>(RenderDriver::OpenGl, Priority::Override);

    let last = events.lock().unwrap().last().cloned();
    assert_eq!(
        last,
        Some((7, Some("software".to_string()), Some("opengl".to_string())))
    );

    subscription.disconnect();
    let before = events.lock().unwrap().len();
    hints.set::<RenderDriver>(RenderDriver::Metal, Priority::Override);
    assert_eq!(events.lock().unwrap().len(), before);
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn unreadable_file_fails_without_leaking() {
    let backend = Arc::new(SoftwareBackend::new());
    let err = Surface::load(backend.clone(), "no/such/image.png").unwrap_err();

    match &err {
        MediaError::AllocationFailed { diagnostic, .. } => assert!(!diagnostic.is_empty()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("no/such/image.png"));
    assert_eq!(backend.outstanding(), 0);
}

#[test]
fn failed_second_step_releases_the_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tile.png");
    image::RgbaImage::new(4, 4).save(&path).unwrap();

    let backend = Arc::new(SoftwareBackend::new());
    backend.fail_allocations(ResourceType::Texture, "texture memory exhausted");

    let err = Texture::load(backend.clone(), &path).unwrap_err();
    assert!(matches!(
        err,
        MediaError::AllocationFailed {
            kind: ResourceType::Texture,
            ref diagnostic,
            ..
        } if diagnostic == "texture memory exhausted"
    ));
    assert_eq!(backend.outstanding(), 0);
}

#[test]
fn copied_observers_release_nothing() {
    let backend = Arc::new(SoftwareBackend::new());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hero.png");
    image::RgbaImage::new(2, 3).save(&path).unwrap();

    let texture = Texture::load(backend.clone(), &path).unwrap();
    let raw = texture.raw();
    let views = vec![texture.handle(); 4];
    assert!(views.iter().all(|view| view.width() == 2 && view.is_valid()));
    drop(views);

    assert_eq!(backend.release_count(raw), 0);
    drop(texture);
    assert_eq!(backend.release_count(raw), 1);
}
